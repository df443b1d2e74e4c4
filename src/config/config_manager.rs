// ==========================================
// 员工名录服务 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、覆写
// 存储: config_kv 表 (key-value)
// ==========================================

use crate::config::import_config_trait::ImportConfigReader;
use crate::db::{lock_connection, open_sqlite_connection};
use rusqlite::{params, Connection, OptionalExtension};
use serde_json::json;
use std::collections::BTreeMap;
use std::error::Error;
use std::sync::{Arc, Mutex};

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 创建新的 ConfigManager 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> Result<Self, Box<dyn Error>> {
        let conn = open_sqlite_connection(db_path)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建 ConfigManager
    ///
    /// 说明：为保证连接行为一致，会对传入连接再次应用统一 PRAGMA（幂等）。
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Result<Self, Box<dyn Error>> {
        {
            let conn_guard = lock_connection(&conn);
            crate::db::configure_sqlite_connection(&conn_guard)?;
        }

        Ok(Self { conn })
    }

    /// 从 config_kv 表读取配置值
    ///
    /// # 返回
    /// - Some(String): 配置值
    /// - None: 配置不存在
    pub fn get_config_value(&self, key: &str) -> Result<Option<String>, Box<dyn Error>> {
        let conn = lock_connection(&self.conn);

        let value = conn
            .query_row(
                "SELECT value FROM config_kv WHERE key = ?1",
                params![key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;

        Ok(value)
    }

    /// 写入配置值（存在则覆写）
    pub fn set_config_value(&self, key: &str, value: &str) -> Result<(), Box<dyn Error>> {
        let conn = lock_connection(&self.conn);

        conn.execute(
            "INSERT INTO config_kv (key, value, updated_at) VALUES (?1, ?2, datetime('now'))
             ON CONFLICT(key) DO UPDATE SET value = ?2, updated_at = datetime('now')",
            params![key, value],
        )?;

        Ok(())
    }

    /// 从 config_kv 表读取配置值，带默认值
    fn get_config_or_default(&self, key: &str, default: &str) -> Result<String, Box<dyn Error>> {
        Ok(self
            .get_config_value(key)?
            .unwrap_or_else(|| default.to_string()))
    }

    /// 获取所有配置的快照（JSON格式，按键排序）
    pub fn get_config_snapshot(&self) -> Result<String, Box<dyn Error>> {
        let conn = lock_connection(&self.conn);

        let mut stmt = conn.prepare("SELECT key, value FROM config_kv ORDER BY key")?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        let mut config_map: BTreeMap<String, String> = BTreeMap::new();
        for row in rows {
            let (key, value) = row?;
            config_map.insert(key, value);
        }

        Ok(serde_json::to_string(&json!(config_map))?)
    }
}

// ==========================================
// ImportConfigReader Trait 实现
// ==========================================
impl ImportConfigReader for ConfigManager {
    fn get_max_batch_rows(&self) -> Result<usize, Box<dyn Error>> {
        let value = self.get_config_or_default(
            config_keys::IMPORT_MAX_BATCH_ROWS,
            &defaults::MAX_BATCH_ROWS.to_string(),
        )?;
        let rows = value.trim().parse::<usize>().map_err(|e| {
            format!(
                "配置值格式错误 (key: {}, value: {}): {}",
                config_keys::IMPORT_MAX_BATCH_ROWS,
                value,
                e
            )
        })?;
        if rows == 0 {
            return Err(format!(
                "配置值格式错误 (key: {}, value: {}): 必须大于 0",
                config_keys::IMPORT_MAX_BATCH_ROWS,
                value
            )
            .into());
        }
        Ok(rows)
    }

    fn get_csv_delimiter(&self) -> Result<u8, Box<dyn Error>> {
        let value = self.get_config_or_default(config_keys::IMPORT_CSV_DELIMITER, ",")?;
        // 制表符等空白分隔符不能 trim
        match value.as_bytes() {
            [b] if b.is_ascii() => Ok(*b),
            _ => Err(format!(
                "配置值格式错误 (key: {}, value: {:?}): 须为单个 ASCII 字符",
                config_keys::IMPORT_CSV_DELIMITER,
                value
            )
            .into()),
        }
    }

    fn get_locale(&self) -> Result<String, Box<dyn Error>> {
        let value = self.get_config_or_default(config_keys::I18N_LOCALE, defaults::LOCALE)?;
        let value = value.trim();
        if value.is_empty() {
            return Ok(defaults::LOCALE.to_string());
        }
        Ok(value.to_string())
    }
}

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    // ===== 导入 =====
    pub const IMPORT_MAX_BATCH_ROWS: &str = "import.max_batch_rows";
    pub const IMPORT_CSV_DELIMITER: &str = "import.csv_delimiter";

    // ===== 国际化 =====
    pub const I18N_LOCALE: &str = "i18n.locale";
}

// ==========================================
// 默认值
// ==========================================
pub mod defaults {
    pub const MAX_BATCH_ROWS: usize = 10_000;
    pub const LOCALE: &str = "en";
}
