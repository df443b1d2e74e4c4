// ==========================================
// 员工名录服务 - 应用状态
// ==========================================
// 职责: 管理应用级别的共享状态和API实例
// ==========================================

use std::sync::{Arc, Mutex};

use crate::api::EmployeeApi;
use crate::config::{config_keys, ConfigManager, ImportConfigReader};
use crate::db::{init_schema, open_sqlite_connection, seed_locations};
use crate::repository::{EmployeeRepository, LocationRepository};

/// 数据库路径环境变量
pub const DB_PATH_ENV: &str = "EMPLOYEE_DIRECTORY_DB_PATH";

/// 应用状态
///
/// 包含所有API实例和共享资源
pub struct AppState {
    /// 数据库路径
    pub db_path: String,

    /// 员工API
    pub employee_api: Arc<EmployeeApi>,

    /// 员工仓储（详情/下属查询）
    pub employee_repo: Arc<EmployeeRepository>,

    /// 工作地点仓储
    pub location_repo: Arc<LocationRepository>,

    /// 配置管理器
    pub config_manager: Arc<ConfigManager>,
}

impl AppState {
    /// 创建新的AppState实例
    ///
    /// # 说明
    /// 该方法会：
    /// 1. 打开数据库并建表（幂等）
    /// 2. 预置工作地点
    /// 3. 按配置设置消息语言
    /// 4. 创建所有API实例
    pub fn new(db_path: String) -> Result<Self, String> {
        tracing::info!("初始化AppState，数据库路径: {}", db_path);

        // 创建数据库连接（共享连接）
        let conn = open_sqlite_connection(&db_path)
            .map_err(|e| format!("无法打开数据库: {}", e))?;
        init_schema(&conn).map_err(|e| format!("建表失败: {}", e))?;
        let seeded = seed_locations(&conn).map_err(|e| format!("预置工作地点失败: {}", e))?;
        if seeded > 0 {
            tracing::info!(seeded, "已预置工作地点");
        }
        let conn = Arc::new(Mutex::new(conn));

        // ==========================================
        // 配置
        // ==========================================
        let config_manager = Arc::new(
            ConfigManager::from_connection(conn.clone())
                .map_err(|e| format!("无法创建ConfigManager: {}", e))?,
        );
        // 仅在显式配置时切换语言（locale 为进程级全局状态）
        match config_manager.get_config_value(config_keys::I18N_LOCALE) {
            Ok(Some(_)) => match config_manager.get_locale() {
                Ok(locale) => {
                    tracing::info!(locale = %locale, "消息语言已设置");
                    crate::i18n::set_locale(&locale);
                }
                Err(e) => tracing::warn!("消息语言配置读取失败，使用默认语言: {}", e),
            },
            Ok(None) => {}
            Err(e) => tracing::warn!("消息语言配置读取失败，使用默认语言: {}", e),
        }

        // ==========================================
        // 初始化Repository / API层
        // ==========================================
        let employee_repo = Arc::new(EmployeeRepository::from_connection(conn.clone()));
        let location_repo = Arc::new(LocationRepository::from_connection(conn.clone()));
        let employee_api = Arc::new(EmployeeApi::from_connection(conn));

        tracing::info!("AppState初始化完成");

        Ok(Self {
            db_path,
            employee_api,
            employee_repo,
            location_repo,
            config_manager,
        })
    }
}

/// 获取默认数据库路径
///
/// 优先级: 环境变量 → 用户数据目录 → 当前目录
pub fn get_default_db_path() -> String {
    use std::path::PathBuf;

    // 允许通过环境变量显式指定 DB 路径（便于调试/测试/CI）
    if let Ok(path) = std::env::var(DB_PATH_ENV) {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    let mut path = PathBuf::from("./employee_directory.db");

    // 尝试获取用户数据目录
    if let Some(data_dir) = dirs::data_dir() {
        let dir = data_dir.join("employee-directory");
        // 目录创建失败时退回当前目录
        if std::fs::create_dir_all(&dir).is_ok() {
            path = dir.join("employee_directory.db");
        }
    }

    path.to_string_lossy().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_default_db_path() {
        let path = get_default_db_path();
        assert!(!path.is_empty());
        assert!(path.ends_with(".db") || std::env::var(DB_PATH_ENV).is_ok());
    }

    #[test]
    fn test_app_state_bootstraps_database() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("state.db").to_string_lossy().to_string();

        let state = AppState::new(db_path.clone()).unwrap();
        assert_eq!(state.location_repo.list_all().unwrap().len(), 3);
        assert_eq!(state.employee_repo.count().unwrap(), 0);

        // 重复初始化幂等
        drop(state);
        let state = AppState::new(db_path).unwrap();
        assert_eq!(state.location_repo.list_all().unwrap().len(), 3);
    }
}
