// ==========================================
// 员工名录服务 - SQLite 连接初始化
// ==========================================
// 目标:
// - 统一所有 Connection::open 的 PRAGMA 行为（外键 / busy_timeout）
// - 幂等建表 + 预置工作地点
// ==========================================

use crate::domain::{ClosedSet, SEEDED_LOCATIONS};
use rusqlite::{params, Connection, OptionalExtension};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;
use tracing::warn;

/// 默认 busy_timeout（毫秒）
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// 当前代码所期望的 schema_version
pub const CURRENT_SCHEMA_VERSION: i64 = 1;

const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER PRIMARY KEY,
    applied_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS location (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    city TEXT NOT NULL UNIQUE,
    country TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS employee (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    full_name TEXT NOT NULL,
    position TEXT NOT NULL,
    specialization TEXT NOT NULL,
    location_id INTEGER NOT NULL REFERENCES location(id) ON DELETE RESTRICT,
    telegram_nick TEXT,
    about TEXT,
    manager_id INTEGER REFERENCES employee(id) ON DELETE SET NULL,
    user_id INTEGER UNIQUE,
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_employee_manager ON employee(manager_id);
CREATE INDEX IF NOT EXISTS idx_employee_location ON employee(location_id);

CREATE TABLE IF NOT EXISTS config_kv (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL,
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);
"#;

/// 配置 SQLite 连接的统一 PRAGMA
///
/// 说明：
/// - foreign_keys 需要"每个连接"单独开启
/// - busy_timeout 需要"每个连接"单独配置
pub fn configure_sqlite_connection(conn: &Connection) -> rusqlite::Result<()> {
    configure_sqlite_connection_with_timeout(conn, DEFAULT_BUSY_TIMEOUT_MS)
}

/// 配置 SQLite 连接（指定 busy_timeout 毫秒数）
pub fn configure_sqlite_connection_with_timeout(
    conn: &Connection,
    busy_timeout_ms: u64,
) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(Duration::from_millis(busy_timeout_ms))?;
    Ok(())
}

/// 打开 SQLite 连接并应用统一配置
pub fn open_sqlite_connection(db_path: &str) -> rusqlite::Result<Connection> {
    open_sqlite_connection_with_timeout(db_path, DEFAULT_BUSY_TIMEOUT_MS)
}

/// 打开 SQLite 连接（指定 busy_timeout 毫秒数）
pub fn open_sqlite_connection_with_timeout(
    db_path: &str,
    busy_timeout_ms: u64,
) -> rusqlite::Result<Connection> {
    let conn = Connection::open(db_path)?;
    configure_sqlite_connection_with_timeout(&conn, busy_timeout_ms)?;
    Ok(conn)
}

/// 获取共享连接
///
/// 持锁线程 panic 会毒化互斥锁；此处恢复守卫并清除毒化标记，
/// 残留的未结束事务先回滚，后续调用不受影响
pub fn lock_connection(conn: &Mutex<Connection>) -> MutexGuard<'_, Connection> {
    conn.lock().unwrap_or_else(|poisoned| {
        warn!("共享连接锁已毒化，恢复使用");
        let guard = poisoned.into_inner();
        conn.clear_poison();
        if !guard.is_autocommit() {
            if let Err(e) = guard.execute_batch("ROLLBACK") {
                warn!(error = %e, "残留事务回滚失败");
            }
        }
        guard
    })
}

/// 建表（幂等）并记录 schema_version
pub fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(SCHEMA_SQL)?;
    conn.execute(
        "INSERT OR IGNORE INTO schema_version (version) VALUES (?1)",
        params![CURRENT_SCHEMA_VERSION],
    )?;
    Ok(())
}

/// 预置工作地点（INSERT OR IGNORE，按 city 自然键去重）
///
/// # 返回
/// - 本次新插入的地点数量
pub fn seed_locations(conn: &Connection) -> rusqlite::Result<usize> {
    let mut inserted = 0;
    for (city, country) in SEEDED_LOCATIONS {
        inserted += conn.execute(
            "INSERT OR IGNORE INTO location (city, country) VALUES (?1, ?2)",
            params![city.label(), country.label()],
        )?;
    }
    Ok(inserted)
}

/// 读取 schema_version（若表不存在则返回 None）
pub fn read_schema_version(conn: &Connection) -> rusqlite::Result<Option<i64>> {
    let has_table: bool = conn
        .query_row(
            "SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version' LIMIT 1",
            [],
            |_row| Ok(true),
        )
        .optional()?
        .unwrap_or(false);

    if !has_table {
        return Ok(None);
    }

    let v: Option<i64> =
        conn.query_row("SELECT MAX(version) FROM schema_version", [], |row| row.get(0))?;
    Ok(v)
}
