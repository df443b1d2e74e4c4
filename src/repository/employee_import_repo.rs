// ==========================================
// 员工名录服务 - 员工导入 Repository Trait
// ==========================================
// 职责: 定义导入流程的事务化数据访问接口（不包含业务逻辑）
// 红线: 一次调用 = 一个事务；闭包返回 Err 即整体回滚
// ==========================================

use crate::domain::{Employee, Location, NewEmployee};
use crate::repository::error::{RepositoryError, RepositoryResult};

// ==========================================
// EmployeeImportSession Trait
// ==========================================
// 用途: 事务内可见的数据访问操作
// 实现者: SqliteImportSession
pub trait EmployeeImportSession {
    /// 按 (city, country) 精确查询工作地点
    fn find_location(&self, city: &str, country: &str) -> RepositoryResult<Option<Location>>;

    /// 插入员工并返回完整实体
    fn insert_employee(&self, employee: &NewEmployee) -> RepositoryResult<Employee>;
}

// ==========================================
// EmployeeImportRepository Trait
// ==========================================
// 用途: 提供事务边界
// 实现者: EmployeeImportRepositoryImpl（使用 rusqlite）
pub trait EmployeeImportRepository: Send + Sync {
    /// 在单个事务中执行 work
    ///
    /// # 返回
    /// - Ok(T): work 成功且事务已提交
    /// - Err(E): work 失败（事务已回滚）或提交失败
    fn in_transaction<T, E, F>(&self, work: F) -> Result<T, E>
    where
        F: FnOnce(&dyn EmployeeImportSession) -> Result<T, E>,
        E: From<RepositoryError>;
}
