// ==========================================
// 员工名录服务 - 员工仓储
// ==========================================
// 职责: employee 表数据访问
// 红线: 不含业务逻辑（规范化/校验在导入层完成）
// ==========================================

use crate::db::{lock_connection, open_sqlite_connection};
use crate::domain::{
    ClosedSet, Employee, EmployeeId, EmployeeView, Location, NewEmployee, Position,
    Specialization, UserId,
};
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::{DateTime, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::sync::{Arc, Mutex};

const EMPLOYEE_SELECT: &str = r#"
    SELECT e.id, e.full_name, e.position, e.specialization,
           e.telegram_nick, e.about, e.manager_id, e.user_id, e.created_at,
           l.id, l.city, l.country
    FROM employee e
    JOIN location l ON l.id = e.location_id
"#;

fn parse_label<T: ClosedSet>(row: &Row, idx: usize) -> rusqlite::Result<T> {
    let raw: String = row.get(idx)?;
    T::from_label(&raw).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            idx,
            Type::Text,
            format!("未知取值: {}", raw).into(),
        )
    })
}

fn map_employee_row(row: &Row) -> rusqlite::Result<Employee> {
    let position: Position = parse_label(row, 2)?;
    let specialization: Specialization = parse_label(row, 3)?;
    let created_at: DateTime<Utc> = row.get(8)?;

    Ok(Employee {
        id: row.get(0)?,
        full_name: row.get(1)?,
        position,
        specialization,
        telegram_nick: row.get(4)?,
        about: row.get(5)?,
        manager_id: row.get(6)?,
        user_id: row.get(7)?,
        created_at,
        location: Location {
            id: row.get(9)?,
            city: row.get(10)?,
            country: row.get(11)?,
        },
    })
}

pub(crate) fn find_by_id(conn: &Connection, id: EmployeeId) -> RepositoryResult<Option<Employee>> {
    let sql = format!("{} WHERE e.id = ?1", EMPLOYEE_SELECT);
    let employee = conn
        .query_row(&sql, params![id], map_employee_row)
        .optional()?;
    Ok(employee)
}

/// 插入员工并回读完整实体
pub(crate) fn insert(conn: &Connection, employee: &NewEmployee) -> RepositoryResult<Employee> {
    conn.execute(
        r#"
        INSERT INTO employee (
            full_name, position, specialization, location_id,
            telegram_nick, about, manager_id, created_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
        "#,
        params![
            employee.full_name,
            employee.position.label(),
            employee.specialization.label(),
            employee.location_id,
            employee.telegram_nick,
            employee.about,
            employee.manager_id,
            employee.created_at,
        ],
    )?;

    let id = conn.last_insert_rowid();
    find_by_id(conn, id)?.ok_or_else(|| {
        RepositoryError::InternalError(format!("插入后回读失败: employee id={}", id))
    })
}

// ==========================================
// EmployeeRepository - 员工仓储
// ==========================================
pub struct EmployeeRepository {
    conn: Arc<Mutex<Connection>>,
}

impl EmployeeRepository {
    /// 创建新的 EmployeeRepository 实例
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

    fn get_conn(&self) -> std::sync::MutexGuard<'_, Connection> {
        lock_connection(&self.conn)
    }

    pub fn insert(&self, employee: &NewEmployee) -> RepositoryResult<Employee> {
        let conn = self.get_conn();
        insert(&conn, employee)
    }

    pub fn find_by_id(&self, id: EmployeeId) -> RepositoryResult<Option<Employee>> {
        let conn = self.get_conn();
        find_by_id(&conn, id)
    }

    /// 详情视图（含上级姓名与完整地址）
    pub fn find_view_by_id(&self, id: EmployeeId) -> RepositoryResult<Option<EmployeeView>> {
        let conn = self.get_conn();
        let employee = match find_by_id(&conn, id)? {
            Some(e) => e,
            None => return Ok(None),
        };

        let manager_full_name = match employee.manager_id {
            Some(manager_id) => conn
                .query_row(
                    "SELECT full_name FROM employee WHERE id = ?1",
                    params![manager_id],
                    |row| row.get::<_, String>(0),
                )
                .optional()?,
            None => None,
        };

        Ok(Some(EmployeeView::from_employee(&employee, manager_full_name)))
    }

    /// 按关联用户查询员工（调用方身份解析）
    pub fn find_by_user_id(&self, user_id: UserId) -> RepositoryResult<Option<Employee>> {
        let conn = self.get_conn();
        let sql = format!("{} WHERE e.user_id = ?1", EMPLOYEE_SELECT);
        let employee = conn
            .query_row(&sql, params![user_id], map_employee_row)
            .optional()?;
        Ok(employee)
    }

    /// 查询某上级的直接下属（按姓名排序）
    pub fn list_by_manager(&self, manager_id: EmployeeId) -> RepositoryResult<Vec<Employee>> {
        let conn = self.get_conn();
        let sql = format!(
            "{} WHERE e.manager_id = ?1 ORDER BY e.full_name, e.id",
            EMPLOYEE_SELECT
        );
        let mut stmt = conn.prepare(&sql)?;
        let employees = stmt
            .query_map(params![manager_id], map_employee_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(employees)
    }

    pub fn count(&self) -> RepositoryResult<usize> {
        let conn = self.get_conn();
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM employee", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    /// 关联外部用户账号（一对一，重复关联返回唯一约束错误）
    pub fn link_user(&self, id: EmployeeId, user_id: UserId) -> RepositoryResult<()> {
        let conn = self.get_conn();
        let affected = conn.execute(
            "UPDATE employee SET user_id = ?1 WHERE id = ?2",
            params![user_id, id],
        )?;
        if affected == 0 {
            return Err(RepositoryError::NotFound {
                entity: "Employee".to_string(),
                id: id.to_string(),
            });
        }
        Ok(())
    }

    /// 删除员工；其下属的 manager_id 自动置空
    pub fn delete(&self, id: EmployeeId) -> RepositoryResult<()> {
        let conn = self.get_conn();
        let affected = conn.execute("DELETE FROM employee WHERE id = ?1", params![id])?;
        if affected == 0 {
            return Err(RepositoryError::NotFound {
                entity: "Employee".to_string(),
                id: id.to_string(),
            });
        }
        Ok(())
    }
}
