// ==========================================
// 员工名录服务 - 记录规范化/校验器实现
// ==========================================
// 规则:
// - full_name: TRIM，非空，≤ 100 字符
// - telegram_nick: TRIM，可选；存在时以 @ 开头且其后至少 1 个字符，≤ 50 字符
// - position / specialization: TRIM + 小写，忽略大小写匹配规范标签
// - city / country: TRIM + 标题格式，须为规范标签
// - about: TRIM，空值视为缺省
// 红线: 各字段独立校验，收集全部错误；不产生部分规范化结果
// ==========================================

use crate::domain::{
    fields, City, ClosedSet, Country, FieldErrors, NormalizedEmployee, Position, RawRecord,
    Specialization,
};
use crate::i18n::{t, t_with_args};
use crate::importer::data_cleaner::DataCleaner as DataCleanerImpl;
use crate::importer::employee_importer_trait::{
    DataCleaner, RecordValidator as RecordValidatorTrait,
};

pub const FULL_NAME_MAX_LEN: usize = 100;
pub const TELEGRAM_NICK_MAX_LEN: usize = 50;

/// 封闭集合字段的规范化方式
#[derive(Debug, Clone, Copy)]
enum LabelMatch {
    IgnoreCase, // TRIM + 小写后匹配
    TitleCase,  // TRIM + 标题格式后精确匹配
}

pub struct RecordValidator {
    cleaner: Box<dyn DataCleaner>,
}

impl Default for RecordValidator {
    fn default() -> Self {
        Self::new(Box::new(DataCleanerImpl))
    }
}

impl RecordValidator {
    pub fn new(cleaner: Box<dyn DataCleaner>) -> Self {
        Self { cleaner }
    }

    fn check_full_name(&self, raw: &RawRecord, errors: &mut FieldErrors) -> Option<String> {
        let value = match raw.get(fields::FULL_NAME) {
            Some(v) => self.cleaner.clean_text(v),
            None => {
                errors.add(fields::FULL_NAME, t("validation.required"));
                return None;
            }
        };

        if value.is_empty() {
            errors.add(fields::FULL_NAME, t("validation.full_name_empty"));
            return None;
        }
        if value.chars().count() > FULL_NAME_MAX_LEN {
            errors.add(fields::FULL_NAME, too_long(FULL_NAME_MAX_LEN));
            return None;
        }
        Some(value)
    }

    /// 外层 None 表示校验失败；内层 None 表示未填写
    fn check_telegram_nick(
        &self,
        raw: &RawRecord,
        errors: &mut FieldErrors,
    ) -> Option<Option<String>> {
        let nick = match self
            .cleaner
            .normalize_null(raw.get(fields::TELEGRAM_NICK).map(String::as_str))
        {
            Some(nick) => nick,
            None => return Some(None),
        };

        let mut failed = false;
        if !nick.starts_with('@') || nick.chars().count() < 2 {
            errors.add(fields::TELEGRAM_NICK, t("validation.telegram_nick_invalid"));
            failed = true;
        }
        if nick.chars().count() > TELEGRAM_NICK_MAX_LEN {
            errors.add(fields::TELEGRAM_NICK, too_long(TELEGRAM_NICK_MAX_LEN));
            failed = true;
        }

        if failed {
            None
        } else {
            Some(Some(nick))
        }
    }

    fn check_label<T: ClosedSet>(
        &self,
        raw: &RawRecord,
        field: &str,
        mode: LabelMatch,
        message_key: &str,
        errors: &mut FieldErrors,
    ) -> Option<T> {
        let value = match raw.get(field) {
            Some(v) => v,
            None => {
                errors.add(field, t("validation.required"));
                return None;
            }
        };

        let matched = match mode {
            LabelMatch::IgnoreCase => T::from_label_ignore_case(&self.cleaner.clean_lowercase(value)),
            LabelMatch::TitleCase => T::from_label(&self.cleaner.clean_title_case(value)),
        };

        if matched.is_none() {
            let allowed = T::allowed_labels();
            errors.add(
                field,
                t_with_args(message_key, &[("allowed", allowed.as_str())]),
            );
        }
        matched
    }
}

impl RecordValidatorTrait for RecordValidator {
    fn normalize(&self, raw: &RawRecord) -> Result<NormalizedEmployee, FieldErrors> {
        let mut errors = FieldErrors::new();

        let full_name = self.check_full_name(raw, &mut errors);
        let position: Option<Position> = self.check_label(
            raw,
            fields::POSITION,
            LabelMatch::IgnoreCase,
            "validation.invalid_position",
            &mut errors,
        );
        let specialization: Option<Specialization> = self.check_label(
            raw,
            fields::SPECIALIZATION,
            LabelMatch::IgnoreCase,
            "validation.invalid_specialization",
            &mut errors,
        );
        let city: Option<City> = self.check_label(
            raw,
            fields::CITY,
            LabelMatch::TitleCase,
            "validation.invalid_city",
            &mut errors,
        );
        let country: Option<Country> = self.check_label(
            raw,
            fields::COUNTRY,
            LabelMatch::TitleCase,
            "validation.invalid_country",
            &mut errors,
        );
        let telegram_nick = self.check_telegram_nick(raw, &mut errors);
        let about = self
            .cleaner
            .normalize_null(raw.get(fields::ABOUT).map(String::as_str));

        match (full_name, position, specialization, city, country, telegram_nick) {
            (
                Some(full_name),
                Some(position),
                Some(specialization),
                Some(city),
                Some(country),
                Some(telegram_nick),
            ) if errors.is_empty() => Ok(NormalizedEmployee {
                full_name,
                position,
                specialization,
                city,
                country,
                telegram_nick,
                about,
            }),
            _ => Err(errors),
        }
    }
}

fn too_long(max: usize) -> String {
    let max = max.to_string();
    t_with_args("validation.too_long", &[("max", max.as_str())])
}
