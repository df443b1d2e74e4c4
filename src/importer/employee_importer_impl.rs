// ==========================================
// 员工名录服务 - 员工导入器实现
// ==========================================
// 职责: 整合导入流程，从原始记录到数据库
// 流程: 解码 → 规范化/校验 → 地点解析 → 构造实体 → 落库
// 红线: 批量导入整批单事务，首个失败行即整批回滚
// 红线: 上级恒为调用方本人对应的员工，忽略输入中的 manager 列
// ==========================================

use crate::config::{config_keys, ImportConfigReader};
use crate::domain::{
    fields, ActingManager, BatchResult, DecodedRecord, Employee, FieldErrors, LineError,
    NewEmployee, RawRecord,
};
use crate::importer::data_cleaner::DataCleaner as DataCleanerImpl;
use crate::importer::employee_importer_trait::{
    DataCleaner, EmployeeImporter, LocationResolver, RecordValidator,
};
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::file_parser::{decode_records, InputEncoding};
use crate::importer::location_resolver::LocationResolver as LocationResolverImpl;
use crate::importer::record_validator::RecordValidator as RecordValidatorImpl;
use crate::repository::{EmployeeImportRepository, EmployeeImportSession};
use chrono::Utc;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use std::time::Instant;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

// ==========================================
// EmployeeImporterImpl - 员工导入器实现
// ==========================================
pub struct EmployeeImporterImpl<R, C>
where
    R: EmployeeImportRepository,
    C: ImportConfigReader,
{
    // 数据访问层
    import_repo: R,

    // 配置读取器
    config: C,

    // 导入组件
    validator: Box<dyn RecordValidator>,
    location_resolver: Box<dyn LocationResolver>,
}

impl<R, C> EmployeeImporterImpl<R, C>
where
    R: EmployeeImportRepository,
    C: ImportConfigReader,
{
    /// 创建新的 EmployeeImporter 实例
    ///
    /// # 参数
    /// - import_repo: 导入数据仓储（提供事务边界）
    /// - config: 配置读取器
    /// - validator: 记录规范化/校验器
    /// - location_resolver: 工作地点解析器
    pub fn new(
        import_repo: R,
        config: C,
        validator: Box<dyn RecordValidator>,
        location_resolver: Box<dyn LocationResolver>,
    ) -> Self {
        Self {
            import_repo,
            config,
            validator,
            location_resolver,
        }
    }

    /// 使用默认组件创建
    pub fn with_default_components(import_repo: R, config: C) -> Self {
        Self::new(
            import_repo,
            config,
            Box::new(RecordValidatorImpl::default()),
            Box::new(LocationResolverImpl),
        )
    }

    /// 在给定会话中创建一名员工
    ///
    /// 步骤逐一短路：校验 → 地点解析 → 构造 → 落库
    fn create_in_session(
        &self,
        session: &dyn EmployeeImportSession,
        raw: &RawRecord,
        acting_manager: Option<&ActingManager>,
    ) -> ImportResult<Employee> {
        // === 步骤 1: 规范化/校验 ===
        let normalized = self
            .validator
            .normalize(raw)
            .map_err(|errors| classify_field_errors(raw, errors))?;

        // === 步骤 2: 地点解析 ===
        let location =
            self.location_resolver
                .resolve(session, normalized.city, normalized.country)?;

        // === 步骤 3: 构造实体 ===
        let new_employee = NewEmployee {
            full_name: normalized.full_name,
            position: normalized.position,
            specialization: normalized.specialization,
            location_id: location.id,
            telegram_nick: normalized.telegram_nick,
            about: normalized.about,
            manager_id: acting_manager.map(|m| m.id),
            created_at: Utc::now(),
        };

        // === 步骤 4: 落库 ===
        let employee = session.insert_employee(&new_employee)?;
        Ok(employee)
    }

    fn read_config<T>(
        &self,
        key: &str,
        read: impl FnOnce(&C) -> Result<T, Box<dyn std::error::Error>>,
    ) -> ImportResult<T> {
        read(&self.config).map_err(|e| {
            error!(config_key = key, error = %e, "配置读取失败");
            ImportError::ConfigReadError {
                key: key.to_string(),
                message: e.to_string(),
            }
        })
    }

    /// 整批单事务导入已解码记录
    fn import_decoded(
        &self,
        batch_id: &str,
        records: Vec<DecodedRecord>,
        acting_manager: Option<&ActingManager>,
    ) -> ImportResult<BatchResult> {
        let start_time = Instant::now();
        let total_rows = records.len();

        let max_rows = self.read_config(config_keys::IMPORT_MAX_BATCH_ROWS, |c| {
            c.get_max_batch_rows()
        })?;
        if total_rows > max_rows {
            warn!(batch_id, total_rows, max_rows, "批次行数超过上限");
            return Err(ImportError::Decode(format!(
                "批次行数 {} 超过上限 {}",
                total_rows, max_rows
            )));
        }

        // 失败行号；事务内写入，事务外读取
        let mut failed_line: Option<usize> = None;

        let outcome = self.import_repo.in_transaction(|session| {
            let mut created = 0usize;
            for record in &records {
                match self.create_in_session(session, &record.fields, acting_manager) {
                    Ok(employee) => {
                        created += 1;
                        debug!(batch_id, line = record.line, employee_id = employee.id, "行导入成功");
                    }
                    Err(e) => {
                        failed_line = Some(record.line);
                        return Err(e);
                    }
                }
            }
            Ok(created)
        });

        let elapsed_ms = start_time.elapsed().as_millis() as u64;
        match (outcome, failed_line) {
            (Ok(created_count), _) => {
                info!(batch_id, created_count, elapsed_ms, "批量导入已提交");
                Ok(BatchResult::committed(created_count))
            }
            (Err(e), Some(line)) => {
                if e.is_record_error() {
                    warn!(batch_id, line, error = %e, "行校验失败，整批回滚");
                } else {
                    error!(batch_id, line, error = %e, "行落库失败，整批回滚");
                }
                Ok(BatchResult::rolled_back(vec![LineError {
                    line,
                    errors: e.into_field_errors(),
                }]))
            }
            (Err(e), None) => {
                error!(batch_id, error = %e, elapsed_ms, "批量导入事务失败");
                Err(e)
            }
        }
    }
}

impl<R, C> EmployeeImporter for EmployeeImporterImpl<R, C>
where
    R: EmployeeImportRepository,
    C: ImportConfigReader,
{
    #[instrument(skip_all, fields(manager_id = acting_manager.map(|m| m.id)))]
    fn import_one(
        &self,
        raw: &RawRecord,
        acting_manager: Option<&ActingManager>,
    ) -> ImportResult<Employee> {
        let result = self
            .import_repo
            .in_transaction(|session| self.create_in_session(session, raw, acting_manager));

        match &result {
            Ok(employee) => info!(employee_id = employee.id, "员工已创建"),
            Err(e) if e.is_record_error() => warn!(error = %e, "员工记录校验失败"),
            Err(e) => error!(error = %e, "员工创建失败"),
        }
        result
    }

    #[instrument(skip_all, fields(encoding = %encoding))]
    fn import_batch<Rd: Read>(
        &self,
        input: Rd,
        encoding: InputEncoding,
        acting_manager: Option<&ActingManager>,
    ) -> ImportResult<BatchResult> {
        let batch_id = Uuid::new_v4().to_string();
        info!(batch_id = %batch_id, "开始批量导入");

        // === 步骤 1: 解码（失败则整批未处理） ===
        let delimiter = self.read_config(config_keys::IMPORT_CSV_DELIMITER, |c| {
            c.get_csv_delimiter()
        })?;
        let records = decode_records(input, encoding, delimiter).map_err(|e| {
            warn!(batch_id = %batch_id, error = %e, "输入解码失败");
            e
        })?;
        info!(batch_id = %batch_id, total_rows = records.len(), "解码完成");

        // === 步骤 2: 整批单事务导入 ===
        self.import_decoded(&batch_id, records, acting_manager)
    }

    fn import_records(
        &self,
        records: Vec<DecodedRecord>,
        acting_manager: Option<&ActingManager>,
    ) -> ImportResult<BatchResult> {
        let batch_id = Uuid::new_v4().to_string();
        info!(batch_id = %batch_id, total_rows = records.len(), "开始批量导入（已解码记录）");
        self.import_decoded(&batch_id, records, acting_manager)
    }

    #[instrument(skip_all, fields(file_path = %file_path.as_ref().display()))]
    fn import_file<P: AsRef<Path>>(
        &self,
        file_path: P,
        acting_manager: Option<&ActingManager>,
    ) -> ImportResult<BatchResult> {
        let path = file_path.as_ref();

        let encoding = InputEncoding::from_path(path).map_err(|e| {
            warn!(error = %e, "输入文件不可用");
            e
        })?;
        let file = File::open(path)?;

        self.import_batch(BufReader::new(file), encoding, acting_manager)
    }
}

/// 地点字段分类
///
/// - city 在场但不在封闭集合内 → LocationNotFound（保留全部字段错误）
/// - city/country 均在场且仅二者出错 → LocationNotFound
/// - 其余 → Validation
fn classify_field_errors(raw: &RawRecord, errors: FieldErrors) -> ImportError {
    let cleaner = DataCleanerImpl;
    let city = cleaner.normalize_null(raw.get(fields::CITY).map(String::as_str));
    let country = cleaner.normalize_null(raw.get(fields::COUNTRY).map(String::as_str));

    let city_rejected = city.is_some() && errors.contains(fields::CITY);
    let only_location_rejected = city.is_some()
        && country.is_some()
        && errors.only_fields(&[fields::CITY, fields::COUNTRY]);

    match city {
        Some(city) if city_rejected || only_location_rejected => ImportError::LocationNotFound {
            city: cleaner.clean_title_case(&city),
            country: country
                .map(|c| cleaner.clean_title_case(&c))
                .unwrap_or_default(),
            errors,
        },
        _ => ImportError::Validation(errors),
    }
}
