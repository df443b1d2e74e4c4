// ==========================================
// 员工名录服务 - 核心库
// ==========================================
// 技术栈: Rust + SQLite
// 系统定位: 员工名录的录入核心（校验 / 规范化 / 单条与整批导入）
// ==========================================

// 初始化国际化系统
rust_i18n::i18n!("locales", fallback = "en");

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 导入层 - 外部数据
pub mod importer;

// 配置层 - 系统配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一）
pub mod db;

// 日志系统
pub mod logging;

// 国际化
pub mod i18n;

// API 层 - 业务接口
pub mod api;

// 应用层 - 启动装配
pub mod app;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{City, ClosedSet, Country, Position, Specialization};

// 领域实体
pub use domain::{
    ActingManager, BatchResult, CallerIdentity, Employee, EmployeeView, FieldErrors, LineError,
    Location, RawRecord,
};

// 导入
pub use importer::{EmployeeImporter, EmployeeImporterImpl, ImportError, InputEncoding};

// API
pub use api::{ApiError, EmployeeApi};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "员工名录服务";
