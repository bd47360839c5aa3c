// ==========================================
// 变压器试验记录 - 应用状态
// ==========================================
// 职责: 管理应用级别的共享资源（数据库连接、配置、API 实例）
// ==========================================

use std::sync::{Arc, Mutex};

use rusqlite::Connection;

use crate::api::ProjectApi;
use crate::config::{ConfigManager, SheetConfig};
use crate::db::{
    ensure_schema, open_sqlite_connection, read_schema_version, CURRENT_SCHEMA_VERSION,
};
use crate::repository::{ProjectRepository, SqliteProjectRepository};

/// 数据库路径环境变量
pub const DB_PATH_ENV: &str = "TEST_SHEET_DB";

/// 用户数据目录下的应用目录名
const APP_DIR_NAME: &str = "transformer-test-sheet";

/// 默认数据库文件名
const DB_FILE_NAME: &str = "test_sheets.db";

/// 应用状态
///
/// 项目仓储与配置管理器共享同一数据库连接
pub struct AppState {
    /// 数据库路径
    pub db_path: String,

    /// 已加载的配置
    pub config: SheetConfig,

    /// 配置管理器
    pub config_manager: Arc<ConfigManager>,

    /// 项目仓储
    pub project_repo: Arc<dyn ProjectRepository>,

    /// 项目API
    pub project_api: Arc<ProjectApi>,
}

impl AppState {
    /// 创建新的AppState实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    ///
    /// # 返回
    /// - Ok(AppState): 成功创建
    /// - Err(String): 初始化失败
    pub fn new(db_path: String) -> Result<Self, String> {
        tracing::info!("初始化AppState，数据库路径: {}", db_path);

        let conn = open_sqlite_connection(&db_path)
            .map_err(|e| format!("无法打开数据库: {}", e))?;
        ensure_schema(&conn).map_err(|e| format!("无法初始化数据库结构: {}", e))?;
        check_schema_version(&conn);
        let conn = Arc::new(Mutex::new(conn));

        let config_manager = Arc::new(
            ConfigManager::from_connection(Arc::clone(&conn))
                .map_err(|e| format!("无法初始化ConfigManager: {}", e))?,
        );
        let config = config_manager
            .load_sheet_config()
            .map_err(|e| format!("无法加载配置: {}", e))?;
        tracing::info!(
            "配置已加载: debounce={:?}, default_tap_range={}, default_ref_temp={}",
            config.debounce,
            config.default_tap_range,
            config.default_ref_temp
        );

        let project_repo: Arc<dyn ProjectRepository> = Arc::new(
            SqliteProjectRepository::from_connection(conn)
                .map_err(|e| format!("无法初始化ProjectRepository: {}", e))?,
        );
        let project_api = Arc::new(ProjectApi::new(Arc::clone(&project_repo), config.clone()));

        tracing::info!("AppState初始化完成");
        Ok(Self {
            db_path,
            config,
            config_manager,
            project_repo,
            project_api,
        })
    }
}

/// 校验数据库结构版本
///
/// 版本不一致时仅告警（继续运行），返回是否与当前版本一致
fn check_schema_version(conn: &Connection) -> bool {
    match read_schema_version(conn) {
        Ok(Some(version)) if version == CURRENT_SCHEMA_VERSION => {
            tracing::debug!("数据库结构版本: {}", version);
            true
        }
        Ok(Some(version)) => {
            tracing::warn!(
                "数据库结构版本不一致: db={}, expected={}",
                version,
                CURRENT_SCHEMA_VERSION
            );
            false
        }
        Ok(None) => {
            tracing::warn!("数据库缺少结构版本记录");
            false
        }
        Err(e) => {
            tracing::warn!("读取数据库结构版本失败: {}", e);
            false
        }
    }
}

// ==========================================

/// 获取默认数据库路径
///
/// # 返回
/// - 环境变量 TEST_SHEET_DB 非空时使用其值
/// - 否则: 用户数据目录/transformer-test-sheet/test_sheets.db
/// - 无用户数据目录时: ./test_sheets.db
pub fn get_default_db_path() -> String {
    if let Ok(path) = std::env::var(DB_PATH_ENV) {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    match dirs::data_dir() {
        Some(data_dir) => {
            let dir = data_dir.join(APP_DIR_NAME);
            // 目录创建失败时由打开数据库处报告
            std::fs::create_dir_all(&dir).ok();
            dir.join(DB_FILE_NAME).to_string_lossy().to_string()
        }
        None => format!("./{}", DB_FILE_NAME),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_default_db_path() {
        let path = get_default_db_path();
        assert!(path.ends_with(".db"));
    }

    #[tokio::test]
    async fn test_app_state_new() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("state.db").to_string_lossy().to_string();

        let state = AppState::new(db_path.clone()).unwrap();
        assert_eq!(state.db_path, db_path);
        assert_eq!(state.config, SheetConfig::default());

        let project = state.project_api.create_project("local").await.unwrap();
        let listed = state.project_repo.list_by_owner("local").await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, project.id);
    }

    #[test]
    fn test_check_schema_version() {
        let conn = open_sqlite_connection(":memory:").unwrap();
        assert!(!check_schema_version(&conn));

        ensure_schema(&conn).unwrap();
        assert!(check_schema_version(&conn));

        conn.execute(
            "INSERT INTO schema_version (version) VALUES (?1)",
            [CURRENT_SCHEMA_VERSION + 1],
        )
        .unwrap();
        assert!(!check_schema_version(&conn));
    }

    #[test]
    fn test_app_state_opens_db_with_newer_schema_version() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("future.db").to_string_lossy().to_string();
        {
            let conn = open_sqlite_connection(&db_path).unwrap();
            ensure_schema(&conn).unwrap();
            conn.execute(
                "INSERT INTO schema_version (version) VALUES (?1)",
                [CURRENT_SCHEMA_VERSION + 1],
            )
            .unwrap();
        }

        // 版本不一致只告警，不阻止启动
        let state = AppState::new(db_path);
        assert!(state.is_ok());
    }
}
