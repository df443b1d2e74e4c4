// ==========================================
// 员工名录服务 - 员工 API
// ==========================================
// 职责: 封装员工创建/批量导入/详情查询，供传输层调用
// 约束: SQLite 阻塞操作统一放入 spawn_blocking
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::config::ConfigManager;
use crate::db::open_sqlite_connection;
use crate::domain::{
    ActingManager, BatchResult, CallerIdentity, EmployeeId, EmployeeView, RawRecord,
};
use crate::importer::{EmployeeImporter, EmployeeImporterImpl, InputEncoding};
use crate::repository::{EmployeeImportRepositoryImpl, EmployeeRepository, RepositoryResult};
use rusqlite::Connection;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tracing::{debug, info};

type SqliteEmployeeImporter = EmployeeImporterImpl<EmployeeImportRepositoryImpl, ConfigManager>;

/// 员工API
#[derive(Clone)]
pub struct EmployeeApi {
    conn: Arc<Mutex<Connection>>,
}

impl EmployeeApi {
    /// 创建新的EmployeeApi实例（独立连接）
    pub fn new(db_path: &str) -> ApiResult<Self> {
        let conn = open_sqlite_connection(db_path)
            .map_err(|e| ApiError::DatabaseConnectionError(e.to_string()))?;
        Ok(Self::from_connection(Arc::new(Mutex::new(conn))))
    }

    /// 从共享连接创建
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 创建单个员工
    ///
    /// # 参数
    /// - record: 原始字段（字段名 → 字符串）
    /// - caller: 调用方身份（决定新员工的上级）
    ///
    /// # 返回
    /// - Ok(EmployeeView): 新建员工详情
    /// - Err(ApiError): ValidationError / LocationNotFound / PersistenceError 等
    pub async fn create_employee(
        &self,
        record: RawRecord,
        caller: CallerIdentity,
    ) -> ApiResult<EmployeeView> {
        let conn = self.conn.clone();

        tokio::task::spawn_blocking(move || -> ApiResult<EmployeeView> {
            let acting_manager = resolve_acting_manager(&conn, caller)?;
            let importer = build_importer(&conn)?;

            let employee = importer.import_one(&record, acting_manager.as_ref())?;
            Ok(EmployeeView::from_employee(
                &employee,
                acting_manager.map(|m| m.full_name),
            ))
        })
        .await?
    }

    /// 批量上传员工（请求体字节流）
    ///
    /// # 返回
    /// - Ok(BatchResult): 成功（created_count = N）或整批回滚（errors 非空）
    /// - Err(ApiError::DecodeError): 输入结构错误，未做任何持久化
    pub async fn upload_employees(
        &self,
        body: Vec<u8>,
        encoding: InputEncoding,
        caller: CallerIdentity,
    ) -> ApiResult<BatchResult> {
        let conn = self.conn.clone();
        debug!(bytes = body.len(), encoding = %encoding, "收到批量上传");

        tokio::task::spawn_blocking(move || -> ApiResult<BatchResult> {
            let acting_manager = resolve_acting_manager(&conn, caller)?;
            let importer = build_importer(&conn)?;

            let result =
                importer.import_batch(body.as_slice(), encoding, acting_manager.as_ref())?;
            Ok(result)
        })
        .await?
    }

    /// 从服务器本地文件批量导入（按扩展名选择编码）
    pub async fn import_employees_file(
        &self,
        file_path: impl Into<PathBuf>,
        caller: CallerIdentity,
    ) -> ApiResult<BatchResult> {
        let conn = self.conn.clone();
        let file_path = file_path.into();

        tokio::task::spawn_blocking(move || -> ApiResult<BatchResult> {
            let acting_manager = resolve_acting_manager(&conn, caller)?;
            let importer = build_importer(&conn)?;

            let result = importer.import_file(&file_path, acting_manager.as_ref())?;
            info!(
                file_path = %file_path.display(),
                created_count = result.created_count,
                "文件导入结束"
            );
            Ok(result)
        })
        .await?
    }

    /// 查询员工详情
    pub async fn get_employee(&self, id: EmployeeId) -> ApiResult<EmployeeView> {
        let conn = self.conn.clone();

        tokio::task::spawn_blocking(move || -> ApiResult<EmployeeView> {
            EmployeeRepository::from_connection(conn)
                .find_view_by_id(id)?
                .ok_or_else(|| ApiError::NotFound(format!("Employee(id={})不存在", id)))
        })
        .await?
    }

    /// 解析调用方身份对应的员工
    pub async fn acting_manager(&self, caller: CallerIdentity) -> ApiResult<Option<ActingManager>> {
        let conn = self.conn.clone();
        tokio::task::spawn_blocking(move || -> ApiResult<Option<ActingManager>> {
            Ok(resolve_acting_manager(&conn, caller)?)
        })
        .await?
    }
}

/// 匿名调用方或未关联员工的用户 → None
fn resolve_acting_manager(
    conn: &Arc<Mutex<Connection>>,
    caller: CallerIdentity,
) -> RepositoryResult<Option<ActingManager>> {
    match caller {
        CallerIdentity::Anonymous => Ok(None),
        CallerIdentity::User { user_id } => {
            let employee = EmployeeRepository::from_connection(conn.clone()).find_by_user_id(user_id)?;
            if employee.is_none() {
                debug!(user_id, "调用方未关联员工，不设置上级");
            }
            Ok(employee.as_ref().map(ActingManager::from))
        }
    }
}

fn build_importer(conn: &Arc<Mutex<Connection>>) -> ApiResult<SqliteEmployeeImporter> {
    let config = ConfigManager::from_connection(conn.clone())
        .map_err(|e| ApiError::ConfigError(e.to_string()))?;
    Ok(EmployeeImporterImpl::with_default_components(
        EmployeeImportRepositoryImpl::from_connection(conn.clone()),
        config,
    ))
}
