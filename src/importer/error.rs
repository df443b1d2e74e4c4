// ==========================================
// 员工名录服务 - 导入模块错误类型
// ==========================================
// 工具: thiserror 派生宏
// 分类: 校验 / 地点不存在 / 解码 / 持久化（均为可恢复、可上报）
// ==========================================

use crate::domain::{fields, FieldErrors};
use crate::i18n::{t, t_with_args};
use crate::repository::RepositoryError;
use thiserror::Error;

/// 导入模块错误类型
#[derive(Error, Debug)]
pub enum ImportError {
    // ===== 文件相关错误 =====
    #[error("文件不存在: {0}")]
    FileNotFound(String),

    #[error("文件格式不支持: {0}（仅支持 .csv/.json）")]
    UnsupportedFormat(String),

    #[error("文件读取失败: {0}")]
    FileReadError(String),

    // ===== 解码错误（整批未处理） =====
    #[error("输入解码失败: {0}")]
    Decode(String),

    // ===== 记录级错误 =====
    #[error("字段校验失败: {0}")]
    Validation(FieldErrors),

    #[error("工作地点不存在: {city}, {country}")]
    LocationNotFound {
        city: String,
        country: String,
        errors: FieldErrors,
    },

    // ===== 数据库错误 =====
    #[error("持久化失败: {0}")]
    Persistence(#[from] RepositoryError),

    // ===== 配置错误 =====
    #[error("配置读取失败 (key: {key}): {message}")]
    ConfigReadError { key: String, message: String },

    // ===== 通用错误 =====
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ImportError {
    /// 转换为字段级错误集合（用于批量结果中的行错误）
    pub fn into_field_errors(self) -> FieldErrors {
        match self {
            ImportError::Validation(errors) => errors,
            ImportError::LocationNotFound { errors, .. } => errors,
            other => FieldErrors::single(fields::NON_FIELD_ERRORS, other.user_message()),
        }
    }

    /// 面向调用方的本地化消息（随当前 locale）
    ///
    /// Display 文本仅用于日志；批量结果与 API 负载使用本方法
    pub fn user_message(&self) -> String {
        match self {
            ImportError::FileNotFound(path) => {
                t_with_args("import.file_not_found", &[("path", path.as_str())])
            }
            ImportError::UnsupportedFormat(path) => {
                t_with_args("import.unsupported_format", &[("path", path.as_str())])
            }
            ImportError::FileReadError(detail) => {
                t_with_args("import.file_read_failed", &[("detail", detail.as_str())])
            }
            ImportError::Decode(detail) => {
                t_with_args("import.decode_failed", &[("detail", detail.as_str())])
            }
            ImportError::Validation(errors) => errors.to_string(),
            ImportError::LocationNotFound { city, country, .. } => t_with_args(
                "import.location_not_found",
                &[("city", city.as_str()), ("country", country.as_str())],
            ),
            ImportError::Persistence(RepositoryError::ForeignKeyViolation(_)) => {
                t("import.reference_missing")
            }
            ImportError::Persistence(RepositoryError::UniqueConstraintViolation(_)) => {
                t("import.duplicate_record")
            }
            ImportError::Persistence(RepositoryError::DatabaseTransactionError(_)) => {
                t("import.database_busy")
            }
            ImportError::Persistence(_) | ImportError::Other(_) => t("import.persistence_failed"),
            ImportError::ConfigReadError { key, .. } => {
                t_with_args("import.config_invalid", &[("key", key.as_str())])
            }
        }
    }

    /// 是否为记录级错误（校验失败 / 地点不存在）
    pub fn is_record_error(&self) -> bool {
        matches!(
            self,
            ImportError::Validation(_) | ImportError::LocationNotFound { .. }
        )
    }

    pub fn is_persistence(&self) -> bool {
        matches!(self, ImportError::Persistence(_))
    }
}

// 实现 From<std::io::Error>
impl From<std::io::Error> for ImportError {
    fn from(err: std::io::Error) -> Self {
        ImportError::FileReadError(err.to_string())
    }
}

// 实现 From<rusqlite::Error>
impl From<rusqlite::Error> for ImportError {
    fn from(err: rusqlite::Error) -> Self {
        ImportError::Persistence(RepositoryError::from(err))
    }
}

// 实现 From<csv::Error>
impl From<csv::Error> for ImportError {
    fn from(err: csv::Error) -> Self {
        if err.is_io_error() {
            ImportError::FileReadError(err.to_string())
        } else {
            ImportError::Decode(err.to_string())
        }
    }
}

// 实现 From<serde_json::Error>
impl From<serde_json::Error> for ImportError {
    fn from(err: serde_json::Error) -> Self {
        if err.is_io() {
            ImportError::FileReadError(err.to_string())
        } else {
            ImportError::Decode(err.to_string())
        }
    }
}

/// Result 类型别名
pub type ImportResult<T> = Result<T, ImportError>;
