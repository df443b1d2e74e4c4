// ==========================================
// 员工名录服务 - 数据清洗器实现
// ==========================================
// 职责: TRIM / 小写 / 标题格式 / NULL 标准化
// ==========================================

use crate::importer::employee_importer_trait::DataCleaner as DataCleanerTrait;

pub struct DataCleaner;

impl DataCleanerTrait for DataCleaner {
    fn clean_text(&self, value: &str) -> String {
        value.trim().to_string()
    }

    fn clean_lowercase(&self, value: &str) -> String {
        value.trim().to_lowercase()
    }

    fn clean_title_case(&self, value: &str) -> String {
        let mut result = String::with_capacity(value.len());
        let mut prev_is_alpha = false;

        for ch in value.trim().chars() {
            if ch.is_alphabetic() {
                if prev_is_alpha {
                    result.extend(ch.to_lowercase());
                } else {
                    result.extend(ch.to_uppercase());
                }
                prev_is_alpha = true;
            } else {
                result.push(ch);
                prev_is_alpha = false;
            }
        }

        result
    }

    fn normalize_null(&self, value: Option<&str>) -> Option<String> {
        value.and_then(|v| {
            let trimmed = v.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            }
        })
    }
}
