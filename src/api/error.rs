// ==========================================
// 员工名录服务 - API层错误类型
// ==========================================
// 职责: 定义API层错误类型，转换导入层/仓储层错误
// 要求: 携带结构化负载，传输层无需字符串匹配即可区分状态码
// ==========================================

use crate::domain::FieldErrors;
use crate::importer::ImportError;
use crate::repository::error::RepositoryError;
use thiserror::Error;

/// API层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    // ==========================================
    // 记录级错误
    // ==========================================
    #[error("数据验证失败: {0}")]
    ValidationError(FieldErrors),

    #[error("工作地点不存在: {city}, {country}")]
    LocationNotFound {
        city: String,
        country: String,
        errors: FieldErrors,
    },

    // ==========================================
    // 输入错误
    // ==========================================
    #[error("无效输入: {0}")]
    InvalidInput(String),

    #[error("输入解码失败: {0}")]
    DecodeError(String),

    #[error("资源未找到: {0}")]
    NotFound(String),

    // ==========================================
    // 数据访问错误
    // ==========================================
    #[error("持久化失败: {0}")]
    PersistenceError(String),

    #[error("业务规则违反: {0}")]
    BusinessRuleViolation(String),

    #[error("数据库错误: {0}")]
    DatabaseError(String),

    #[error("数据库连接失败: {0}")]
    DatabaseConnectionError(String),

    #[error("数据库事务失败: {0}")]
    DatabaseTransactionError(String),

    // ==========================================
    // 通用错误
    // ==========================================
    #[error("配置错误: {0}")]
    ConfigError(String),

    #[error("内部错误: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ApiError {
    /// 建议的 HTTP 状态码
    pub fn http_status(&self) -> u16 {
        match self {
            ApiError::ValidationError(_)
            | ApiError::LocationNotFound { .. }
            | ApiError::InvalidInput(_)
            | ApiError::DecodeError(_) => 400,
            ApiError::NotFound(_) => 404,
            ApiError::BusinessRuleViolation(_) => 409,
            _ => 500,
        }
    }

    /// 字段级错误（仅记录级错误携带）
    pub fn field_errors(&self) -> Option<&FieldErrors> {
        match self {
            ApiError::ValidationError(errors) => Some(errors),
            ApiError::LocationNotFound { errors, .. } => Some(errors),
            _ => None,
        }
    }
}

// ==========================================
// 从 RepositoryError 转换
// ==========================================
impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound { entity, id } => {
                ApiError::NotFound(format!("{}(id={})不存在", entity, id))
            }
            RepositoryError::DatabaseTransactionError(msg) => {
                ApiError::DatabaseTransactionError(msg)
            }
            RepositoryError::DatabaseQueryError(msg) => ApiError::DatabaseError(msg),
            RepositoryError::UniqueConstraintViolation(msg) => {
                ApiError::BusinessRuleViolation(format!("唯一约束违反: {}", msg))
            }
            RepositoryError::ForeignKeyViolation(msg) => {
                ApiError::BusinessRuleViolation(format!("外键约束违反: {}", msg))
            }
            RepositoryError::InternalError(msg) => ApiError::InternalError(msg),
            RepositoryError::Other(err) => ApiError::Other(err),
        }
    }
}

// ==========================================
// 从 ImportError 转换
// ==========================================
impl From<ImportError> for ApiError {
    fn from(err: ImportError) -> Self {
        let message = err.user_message();
        match err {
            ImportError::Validation(errors) => ApiError::ValidationError(errors),
            ImportError::LocationNotFound {
                city,
                country,
                errors,
            } => ApiError::LocationNotFound {
                city,
                country,
                errors,
            },
            ImportError::Decode(_) => ApiError::DecodeError(message),
            ImportError::FileNotFound(_) => ApiError::NotFound(message),
            ImportError::UnsupportedFormat(_) | ImportError::FileReadError(_) => {
                ApiError::InvalidInput(message)
            }
            ImportError::Persistence(_) => ApiError::PersistenceError(message),
            ImportError::ConfigReadError { .. } => ApiError::ConfigError(message),
            ImportError::Other(err) => ApiError::Other(err),
        }
    }
}

// ==========================================
// 从 tokio JoinError 转换（阻塞任务 panic / 取消）
// ==========================================
impl From<tokio::task::JoinError> for ApiError {
    fn from(err: tokio::task::JoinError) -> Self {
        ApiError::InternalError(format!("后台任务失败: {}", err))
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;
