// ==========================================
// 员工名录服务 - 员工导入器 Trait 定义
// ==========================================
// 职责: 定义导入流程各组件的接口（不包含实现）
// 流程: 解码 → 规范化/校验 → 地点解析 → 落库
// ==========================================

use crate::domain::{
    ActingManager, BatchResult, City, Country, DecodedRecord, Employee, FieldErrors, Location,
    NormalizedEmployee, RawRecord,
};
use crate::importer::error::ImportResult;
use crate::importer::file_parser::InputEncoding;
use crate::repository::EmployeeImportSession;
use std::io::Read;
use std::path::Path;

// ==========================================
// EmployeeImporter Trait
// ==========================================
// 用途: 导入流程编排
// 实现者: EmployeeImporterImpl
pub trait EmployeeImporter: Send + Sync {
    /// 导入单条记录（独立事务）
    ///
    /// # 返回
    /// - Ok(Employee): 新建员工
    /// - Err(Validation / LocationNotFound / Persistence)
    fn import_one(
        &self,
        raw: &RawRecord,
        acting_manager: Option<&ActingManager>,
    ) -> ImportResult<Employee>;

    /// 批量导入（解码 + 整批单事务）
    ///
    /// # 返回
    /// - Ok(BatchResult): 全部成功（已提交）或首个失败行（已整批回滚）
    /// - Err(Decode 等): 解码失败，未做任何持久化
    fn import_batch<Rd: Read>(
        &self,
        input: Rd,
        encoding: InputEncoding,
        acting_manager: Option<&ActingManager>,
    ) -> ImportResult<BatchResult>;

    /// 批量导入已解码记录
    fn import_records(
        &self,
        records: Vec<DecodedRecord>,
        acting_manager: Option<&ActingManager>,
    ) -> ImportResult<BatchResult>;

    /// 从文件批量导入（按扩展名选择编码）
    fn import_file<P: AsRef<Path>>(
        &self,
        file_path: P,
        acting_manager: Option<&ActingManager>,
    ) -> ImportResult<BatchResult>;
}

// ==========================================
// DataCleaner Trait
// ==========================================
// 用途: 字符串清洗原语
pub trait DataCleaner: Send + Sync {
    /// TRIM
    fn clean_text(&self, value: &str) -> String;

    /// TRIM + 小写
    fn clean_lowercase(&self, value: &str) -> String;

    /// TRIM + 标题格式（每个单词首字母大写，其余小写）
    ///
    /// # 示例
    /// - "  санкт-петербург " → "Санкт-Петербург"
    fn clean_title_case(&self, value: &str) -> String;

    /// NULL 标准化（空字符串/纯空白 → None，其余 TRIM）
    fn normalize_null(&self, value: Option<&str>) -> Option<String>;
}

// ==========================================
// RecordValidator Trait
// ==========================================
// 用途: 单条原始记录的规范化与校验
// 规则: 各字段独立校验，收集全部错误后再失败
pub trait RecordValidator: Send + Sync {
    fn normalize(&self, raw: &RawRecord) -> Result<NormalizedEmployee, FieldErrors>;
}

// ==========================================
// LocationResolver Trait
// ==========================================
// 用途: (city, country) → 已存在的 Location
// 红线: 只读，不自动创建
pub trait LocationResolver: Send + Sync {
    fn resolve(
        &self,
        session: &dyn EmployeeImportSession,
        city: City,
        country: Country,
    ) -> ImportResult<Location>;
}
