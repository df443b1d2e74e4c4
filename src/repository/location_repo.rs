// ==========================================
// 员工名录服务 - 工作地点仓储
// ==========================================
// 职责: location 表数据访问
// 红线: 导入流程只读；新增仅用于部署预置
// 红线: 被员工引用的地点不可删除（ON DELETE RESTRICT）
// ==========================================

use crate::db::{lock_connection, open_sqlite_connection};
use crate::domain::{Location, LocationId};
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::sync::{Arc, Mutex};

const LOCATION_COLUMNS: &str = "id, city, country";

fn map_location_row(row: &Row) -> rusqlite::Result<Location> {
    Ok(Location {
        id: row.get(0)?,
        city: row.get(1)?,
        country: row.get(2)?,
    })
}

/// 按 (city, country) 精确匹配查询
///
/// city 命中但 country 不同 → None
pub(crate) fn find_by_city_and_country(
    conn: &Connection,
    city: &str,
    country: &str,
) -> RepositoryResult<Option<Location>> {
    let sql = format!(
        "SELECT {} FROM location WHERE city = ?1 AND country = ?2",
        LOCATION_COLUMNS
    );
    let location = conn
        .query_row(&sql, params![city, country], map_location_row)
        .optional()?;
    Ok(location)
}

// ==========================================
// LocationRepository - 工作地点仓储
// ==========================================
pub struct LocationRepository {
    conn: Arc<Mutex<Connection>>,
}

impl LocationRepository {
    /// 创建新的 LocationRepository 实例
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

    pub fn find_by_city_and_country(
        &self,
        city: &str,
        country: &str,
    ) -> RepositoryResult<Option<Location>> {
        let conn = self.get_conn();
        find_by_city_and_country(&conn, city, country)
    }

    /// 按自然键 city 查询
    pub fn find_by_city(&self, city: &str) -> RepositoryResult<Option<Location>> {
        let conn = self.get_conn();
        let sql = format!("SELECT {} FROM location WHERE city = ?1", LOCATION_COLUMNS);
        let location = conn
            .query_row(&sql, params![city], map_location_row)
            .optional()?;
        Ok(location)
    }

    pub fn list_all(&self) -> RepositoryResult<Vec<Location>> {
        let conn = self.get_conn();
        let sql = format!("SELECT {} FROM location ORDER BY id", LOCATION_COLUMNS);
        let mut stmt = conn.prepare(&sql)?;
        let locations = stmt
            .query_map([], map_location_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(locations)
    }

    /// 新增工作地点（city 唯一，重复时返回唯一约束错误）
    pub fn insert(&self, city: &str, country: &str) -> RepositoryResult<Location> {
        let conn = self.get_conn();
        conn.execute(
            "INSERT INTO location (city, country) VALUES (?1, ?2)",
            params![city, country],
        )?;
        Ok(Location {
            id: conn.last_insert_rowid(),
            city: city.to_string(),
            country: country.to_string(),
        })
    }

    /// 删除工作地点
    ///
    /// # 返回
    /// - Err(ForeignKeyViolation): 仍被员工引用
    /// - Err(NotFound): 地点不存在
    pub fn delete(&self, id: LocationId) -> RepositoryResult<()> {
        let conn = self.get_conn();
        let affected = conn.execute("DELETE FROM location WHERE id = ?1", params![id])?;
        if affected == 0 {
            return Err(RepositoryError::NotFound {
                entity: "Location".to_string(),
                id: id.to_string(),
            });
        }
        Ok(())
    }
}
