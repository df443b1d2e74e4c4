// ==========================================
// 员工名录服务 - 员工领域模型
// ==========================================
// 职责: 工作地点/员工实体、导入中间结构、导入结果
// 红线: location 为受保护引用；manager 为弱引用（删除上级时置空）
// ==========================================

use crate::domain::types::{City, Country, Position, Specialization};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;

pub type EmployeeId = i64;
pub type LocationId = i64;
pub type UserId = i64;

/// 原始记录（字段名 → 原始字符串，允许缺键）
pub type RawRecord = HashMap<String, String>;

// ==========================================
// 字段名常量
// ==========================================
pub mod fields {
    pub const FULL_NAME: &str = "full_name";
    pub const POSITION: &str = "position";
    pub const SPECIALIZATION: &str = "specialization";
    pub const CITY: &str = "city";
    pub const COUNTRY: &str = "country";
    pub const TELEGRAM_NICK: &str = "telegram_nick";
    pub const ABOUT: &str = "about";
    pub const LOCATION: &str = "location";
    pub const NON_FIELD_ERRORS: &str = "non_field_errors";
}

// ==========================================
// Location - 工作地点
// ==========================================
// 自然键: city（唯一）
// 导入流程只读，不创建
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub id: LocationId,
    pub city: String,
    pub country: String,
}

impl Location {
    /// 完整地址（"城市, 国家"）
    pub fn full(&self) -> String {
        format!("{}, {}", self.city, self.country)
    }
}

// ==========================================
// Employee - 员工
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Employee {
    pub id: EmployeeId,
    pub full_name: String,
    pub position: Position,
    pub specialization: Specialization,
    pub location: Location,
    pub telegram_nick: Option<String>,
    pub about: Option<String>,
    pub manager_id: Option<EmployeeId>, // 弱引用
    pub user_id: Option<UserId>,        // 关联外部用户账号（一对一）
    pub created_at: DateTime<Utc>,
}

// ==========================================
// NewEmployee - 待落库员工
// ==========================================
#[derive(Debug, Clone)]
pub struct NewEmployee {
    pub full_name: String,
    pub position: Position,
    pub specialization: Specialization,
    pub location_id: LocationId,
    pub telegram_nick: Option<String>,
    pub about: Option<String>,
    pub manager_id: Option<EmployeeId>,
    pub created_at: DateTime<Utc>,
}

// ==========================================
// NormalizedEmployee - 规范化后的记录
// ==========================================
// 用途: 校验器输出，所有字段均已规范化
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedEmployee {
    pub full_name: String,
    pub position: Position,
    pub specialization: Specialization,
    pub city: City,
    pub country: Country,
    pub telegram_nick: Option<String>,
    pub about: Option<String>,
}

// ==========================================
// DecodedRecord - 解码后的原始行
// ==========================================
#[derive(Debug, Clone)]
pub struct DecodedRecord {
    pub line: usize, // 原始行号（CSV 表头为第 1 行）
    pub fields: RawRecord,
}

// ==========================================
// FieldErrors - 字段级错误集合
// ==========================================
// 字段名 → 错误消息列表（有序，便于稳定输出）
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(field: &str, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// 是否仅包含指定字段的错误
    pub fn only_fields(&self, allowed: &[&str]) -> bool {
        !self.is_empty() && self.fields().all(|f| allowed.contains(&f))
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .0
            .iter()
            .map(|(field, messages)| format!("{}: {}", field, messages.join("; ")))
            .collect();
        f.write_str(&parts.join(" | "))
    }
}

// ==========================================
// EmployeeView - 员工详情视图
// ==========================================
// 用途: 单条创建返回值 / 详情查询
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeView {
    pub id: EmployeeId,
    pub full_name: String,
    pub position: Position,
    pub specialization: Specialization,
    pub manager_id: Option<EmployeeId>,
    pub manager_full_name: Option<String>,
    pub location_full: String,
    pub telegram_nick: Option<String>,
    pub about: Option<String>,
}

impl EmployeeView {
    pub fn from_employee(employee: &Employee, manager_full_name: Option<String>) -> Self {
        Self {
            id: employee.id,
            full_name: employee.full_name.clone(),
            position: employee.position,
            specialization: employee.specialization,
            manager_id: employee.manager_id,
            manager_full_name,
            location_full: employee.location.full(),
            telegram_nick: employee.telegram_nick.clone(),
            about: employee.about.clone(),
        }
    }
}

// ==========================================
// 批量导入结果
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineError {
    pub line: usize,
    pub errors: FieldErrors,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchResult {
    pub created_count: usize,
    pub errors: Vec<LineError>,
}

impl BatchResult {
    pub fn committed(created_count: usize) -> Self {
        Self {
            created_count,
            errors: Vec::new(),
        }
    }

    /// 整批回滚：created_count 恒为 0
    pub fn rolled_back(errors: Vec<LineError>) -> Self {
        Self {
            created_count: 0,
            errors,
        }
    }

    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }
}

// ==========================================
// 调用方身份 / 代理上级
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CallerIdentity {
    Anonymous,
    User { user_id: UserId },
}

/// 调用方自身对应的员工（作为新员工的上级）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActingManager {
    pub id: EmployeeId,
    pub full_name: String,
}

impl From<&Employee> for ActingManager {
    fn from(employee: &Employee) -> Self {
        Self {
            id: employee.id,
            full_name: employee.full_name.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_errors_collects_per_field() {
        let mut errors = FieldErrors::new();
        errors.add(fields::FULL_NAME, "a");
        errors.add(fields::FULL_NAME, "b");
        errors.add(fields::CITY, "c");

        assert_eq!(errors.len(), 2);
        assert_eq!(errors.get(fields::FULL_NAME).unwrap().len(), 2);
        assert!(errors.only_fields(&[fields::FULL_NAME, fields::CITY]));
        assert!(!errors.only_fields(&[fields::CITY]));
        assert!(!FieldErrors::new().only_fields(&[fields::CITY]));
    }

    #[test]
    fn test_field_errors_serialize_as_object() {
        let errors = FieldErrors::single(fields::TELEGRAM_NICK, "bad");
        let json = serde_json::to_value(&errors).unwrap();
        assert_eq!(json, serde_json::json!({ "telegram_nick": ["bad"] }));
    }

    #[test]
    fn test_location_full() {
        let location = Location {
            id: 1,
            city: "Москва".to_string(),
            country: "Россия".to_string(),
        };
        assert_eq!(location.full(), "Москва, Россия");
    }

    #[test]
    fn test_batch_result_rolled_back_has_zero_created() {
        let result = BatchResult::rolled_back(vec![LineError {
            line: 3,
            errors: FieldErrors::single(fields::TELEGRAM_NICK, "bad"),
        }]);
        assert_eq!(result.created_count, 0);
        assert!(!result.is_success());
        assert!(BatchResult::committed(2).is_success());
    }
}
