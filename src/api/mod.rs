// ==========================================
// 员工名录服务 - API 层
// ==========================================
// 职责: 提供业务 API 接口,供传输层（HTTP 等）调用
// ==========================================

pub mod employee_api;
pub mod error;

// 重导出核心类型
pub use employee_api::EmployeeApi;
pub use error::{ApiError, ApiResult};
