// ==========================================
// 员工名录服务 - 员工导入 Repository 实现
// ==========================================
// 职责: 基于 rusqlite 的事务化导入数据访问
// 隔离: BEGIN IMMEDIATE，写锁在事务开始时获取；
//       并发写入方等待 busy_timeout，超时则报持久化错误
// ==========================================

use crate::db::{lock_connection, open_sqlite_connection};
use crate::domain::{Employee, Location, NewEmployee};
use crate::repository::employee_import_repo::{EmployeeImportRepository, EmployeeImportSession};
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::{employee_repo, location_repo};
use rusqlite::{Connection, Transaction, TransactionBehavior};
use std::sync::{Arc, Mutex};
use tracing::{debug, warn};

// ==========================================
// SqliteImportSession - 事务内会话
// ==========================================
struct SqliteImportSession<'a> {
    tx: &'a Transaction<'a>,
}

impl EmployeeImportSession for SqliteImportSession<'_> {
    fn find_location(&self, city: &str, country: &str) -> RepositoryResult<Option<Location>> {
        location_repo::find_by_city_and_country(self.tx, city, country)
    }

    fn insert_employee(&self, employee: &NewEmployee) -> RepositoryResult<Employee> {
        employee_repo::insert(self.tx, employee)
    }
}

// ==========================================
// EmployeeImportRepositoryImpl
// ==========================================
pub struct EmployeeImportRepositoryImpl {
    conn: Arc<Mutex<Connection>>,
}

impl EmployeeImportRepositoryImpl {
    /// 创建新的 Repository 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建仓储实例
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }
}

impl EmployeeImportRepository for EmployeeImportRepositoryImpl {
    fn in_transaction<T, E, F>(&self, work: F) -> Result<T, E>
    where
        F: FnOnce(&dyn EmployeeImportSession) -> Result<T, E>,
        E: From<RepositoryError>,
    {
        let conn = lock_connection(&self.conn);

        let tx = Transaction::new_unchecked(&conn, TransactionBehavior::Immediate)
            .map_err(RepositoryError::from)?;
        debug!("导入事务已开始");

        let outcome = work(&SqliteImportSession { tx: &tx });

        match outcome {
            Ok(value) => {
                tx.commit().map_err(|e| {
                    let err = RepositoryError::from(e);
                    RepositoryError::DatabaseTransactionError(format!("提交失败: {}", err))
                })?;
                debug!("导入事务已提交");
                Ok(value)
            }
            Err(e) => {
                if let Err(rollback_err) = tx.rollback() {
                    warn!(error = %rollback_err, "导入事务回滚失败");
                }
                debug!("导入事务已回滚");
                Err(e)
            }
        }
    }
}
