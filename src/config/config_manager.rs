// ==========================================
// 变压器试验记录 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、覆写管理
// 存储: config_kv 表 (key-value + scope)
// ==========================================

use crate::db::{configure_sqlite_connection, ensure_schema, open_sqlite_connection};
use crate::domain::MAX_TAP_RANGE;
use crate::repository::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

// ==========================================
// 配置键
// ==========================================
pub mod config_keys {
    /// 防抖静默期（毫秒）
    pub const DEBOUNCE_MS: &str = "persistence.debounce_ms";
    /// 新项目的默认分接范围
    pub const DEFAULT_TAP_RANGE: &str = "project.default_tap_range";
    /// 新项目的默认参考温度 (°C)
    pub const DEFAULT_REF_TEMP: &str = "project.default_ref_temp";
}

/// 默认值
pub const DEFAULT_DEBOUNCE_MS: u64 = 1000;
pub const DEFAULT_TAP_RANGE: u8 = 5;
pub const DEFAULT_REF_TEMP: &str = "75";

// ==========================================
// SheetConfig - 类型化配置
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetConfig {
    pub debounce: Duration,
    pub default_tap_range: u8,
    pub default_ref_temp: String,
}

impl Default for SheetConfig {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(DEFAULT_DEBOUNCE_MS),
            default_tap_range: DEFAULT_TAP_RANGE,
            default_ref_temp: DEFAULT_REF_TEMP.to_string(),
        }
    }
}

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
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)
            .map_err(|e| RepositoryError::DatabaseConnectionError(e.to_string()))?;
        ensure_schema(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建 ConfigManager
    ///
    /// 说明：为保证连接行为一致，会对传入连接再次应用统一 PRAGMA（幂等）。
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> RepositoryResult<Self> {
        {
            let guard = conn
                .lock()
                .map_err(|e| RepositoryError::LockError(e.to_string()))?;
            configure_sqlite_connection(&guard)?;
            ensure_schema(&guard)?;
        }
        Ok(Self { conn })
    }

    /// 从 config_kv 表读取配置值（scope_id='global'）
    ///
    /// # 返回
    /// - Some(String): 配置值
    /// - None: 配置不存在
    pub fn get_config_value(&self, key: &str) -> RepositoryResult<Option<String>> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))?;

        let value = conn
            .query_row(
                "SELECT value FROM config_kv WHERE scope_id = 'global' AND key = ?1",
                params![key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    /// 写入配置值（存在则覆盖）
    pub fn set_config_value(&self, key: &str, value: &str) -> RepositoryResult<()> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))?;

        conn.execute(
            r#"
            INSERT INTO config_kv (scope_id, key, value, updated_at)
            VALUES ('global', ?1, ?2, datetime('now'))
            ON CONFLICT(scope_id, key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            "#,
            params![key, value],
        )?;
        tracing::info!("配置已更新: {}={}", key, value);
        Ok(())
    }

    /// 获取所有 global 配置
    pub fn list_configs(&self) -> RepositoryResult<HashMap<String, String>> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))?;

        let mut stmt =
            conn.prepare("SELECT key, value FROM config_kv WHERE scope_id = 'global' ORDER BY key")?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        let mut configs = HashMap::new();
        for row in rows {
            let (key, value) = row?;
            configs.insert(key, value);
        }
        Ok(configs)
    }

    /// 读取并解析配置；缺失或非法时使用默认值
    fn get_parsed_or_default<T, F>(&self, key: &str, default: T, parse: F) -> RepositoryResult<T>
    where
        F: FnOnce(&str) -> Option<T>,
    {
        match self.get_config_value(key)? {
            None => Ok(default),
            Some(raw) => match parse(raw.trim()) {
                Some(value) => Ok(value),
                None => {
                    tracing::warn!("配置值非法，使用默认值: {}={}", key, raw);
                    Ok(default)
                }
            },
        }
    }

    /// 加载类型化配置
    pub fn load_sheet_config(&self) -> RepositoryResult<SheetConfig> {
        let debounce_ms = self.get_parsed_or_default(
            config_keys::DEBOUNCE_MS,
            DEFAULT_DEBOUNCE_MS,
            |raw| raw.parse::<u64>().ok().filter(|ms| *ms > 0),
        )?;
        let default_tap_range = self.get_parsed_or_default(
            config_keys::DEFAULT_TAP_RANGE,
            DEFAULT_TAP_RANGE,
            |raw| raw.parse::<u8>().ok().map(|n| n.min(MAX_TAP_RANGE)),
        )?;
        let default_ref_temp = self.get_parsed_or_default(
            config_keys::DEFAULT_REF_TEMP,
            DEFAULT_REF_TEMP.to_string(),
            |raw| crate::engine::numeric::parse_value(raw).map(|_| raw.to_string()),
        )?;

        Ok(SheetConfig {
            debounce: Duration::from_millis(debounce_ms),
            default_tap_range,
            default_ref_temp,
        })
    }
}
