// ==========================================
// 员工名录服务 - 应用层
// ==========================================
// 职责: 启动装配（数据库、配置、API 实例）
// ==========================================

pub mod state;

// 重导出
pub use state::{get_default_db_path, AppState, DB_PATH_ENV};
