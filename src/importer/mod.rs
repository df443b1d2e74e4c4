// ==========================================
// 员工名录服务 - 导入层
// ==========================================
// 职责: 外部员工数据导入（单条 / 批量）
// 支持: CSV, JSON
// ==========================================

// 模块声明
pub mod data_cleaner;
pub mod employee_importer_impl;
pub mod employee_importer_trait;
pub mod error;
pub mod file_parser;
pub mod location_resolver;
pub mod record_validator;

// 重导出核心类型
pub use data_cleaner::DataCleaner as DataCleanerImpl;
pub use employee_importer_impl::EmployeeImporterImpl;
pub use error::{ImportError, ImportResult};
pub use file_parser::{decode_records, CsvDecoder, InputEncoding, JsonDecoder};
pub use location_resolver::LocationResolver as LocationResolverImpl;
pub use record_validator::RecordValidator as RecordValidatorImpl;

// 重导出 Trait 接口
pub use employee_importer_trait::{DataCleaner, EmployeeImporter, LocationResolver, RecordValidator};
