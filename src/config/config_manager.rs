// ==========================================
// 食物库导入器 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、覆写
// 存储: config_kv 表 (key-value + scope)
// ==========================================

use crate::config::import_config_trait::ImportConfigReader;
use crate::config::import_settings::{
    DEFAULT_BATCH_DELAY_MS, DEFAULT_BATCH_SIZE, DEFAULT_MAPPING_CACHE_TTL_SECS,
    DEFAULT_MAX_DISPLAYED_ERRORS,
};
use crate::db::{configure_sqlite_connection, open_sqlite_connection};
use crate::domain::types::{BatchFailurePolicy, NumericPolicy};
use crate::importer::error::{ImportError, ImportResult};
use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::HashMap;
use std::str::FromStr;
use std::sync::{Arc, Mutex, MutexGuard};

// ==========================================
// 配置键
// ==========================================
pub mod config_keys {
    pub const BATCH_SIZE: &str = "import/batch_size";
    pub const BATCH_DELAY_MS: &str = "import/batch_delay_ms";
    pub const MAPPING_CACHE_TTL_SECS: &str = "import/mapping_cache_ttl_secs";
    pub const NUMERIC_POLICY: &str = "import/numeric_policy";
    pub const BATCH_FAILURE_POLICY: &str = "import/batch_failure_policy";
    pub const MAX_DISPLAYED_ERRORS: &str = "import/max_displayed_errors";
}

const GLOBAL_SCOPE: &str = "global";

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
    pub fn new(db_path: &str) -> ImportResult<Self> {
        let conn = open_sqlite_connection(db_path).map_err(|e| ImportError::ConfigReadError {
            key: "*".to_string(),
            message: e.to_string(),
        })?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建 ConfigManager
    ///
    /// 说明：为保证连接行为一致，会对传入连接再次应用统一 PRAGMA（幂等）。
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> ImportResult<Self> {
        {
            let guard = Self::lock(&conn, "*")?;
            configure_sqlite_connection(&guard).map_err(|e| ImportError::ConfigReadError {
                key: "*".to_string(),
                message: e.to_string(),
            })?;
        }

        Ok(Self { conn })
    }

    fn lock<'a>(
        conn: &'a Arc<Mutex<Connection>>,
        key: &str,
    ) -> ImportResult<MutexGuard<'a, Connection>> {
        conn.lock().map_err(|e| ImportError::ConfigReadError {
            key: key.to_string(),
            message: format!("锁获取失败: {}", e),
        })
    }

    /// 从 config_kv 表读取配置值（scope_id='global'）
    ///
    /// # 返回
    /// - Some(String): 配置值
    /// - None: 配置不存在
    pub fn get_config_value(&self, key: &str) -> ImportResult<Option<String>> {
        let conn = Self::lock(&self.conn, key)?;

        conn.query_row(
            "SELECT value FROM config_kv WHERE scope_id = ?1 AND key = ?2",
            params![GLOBAL_SCOPE, key],
            |row| row.get::<_, String>(0),
        )
        .optional()
        .map_err(|e| ImportError::ConfigReadError {
            key: key.to_string(),
            message: e.to_string(),
        })
    }

    /// 写入 global scope 的配置值（UPSERT）
    pub fn set_config_value(&self, key: &str, value: &str) -> ImportResult<()> {
        let conn = Self::lock(&self.conn, key)?;

        conn.execute(
            "INSERT INTO config_kv (scope_id, key, value) VALUES (?1, ?2, ?3)
             ON CONFLICT(scope_id, key) DO UPDATE SET value = ?3, updated_at = datetime('now')",
            params![GLOBAL_SCOPE, key, value],
        )
        .map_err(|e| ImportError::ConfigReadError {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        Ok(())
    }

    /// 获取所有 global 配置的快照
    pub fn get_config_snapshot(&self) -> ImportResult<HashMap<String, String>> {
        let conn = Self::lock(&self.conn, "*")?;
        let to_err = |e: rusqlite::Error| ImportError::ConfigReadError {
            key: "*".to_string(),
            message: e.to_string(),
        };

        let mut stmt = conn
            .prepare("SELECT key, value FROM config_kv WHERE scope_id = ?1 ORDER BY key")
            .map_err(to_err)?;
        let rows = stmt
            .query_map(params![GLOBAL_SCOPE], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
            })
            .map_err(to_err)?;

        let mut snapshot = HashMap::new();
        for row in rows {
            let (key, value) = row.map_err(to_err)?;
            snapshot.insert(key, value);
        }
        Ok(snapshot)
    }

    /// 读取并解析数值配置，缺失时返回默认值
    fn get_parsed_or_default<T>(&self, key: &str, default: T) -> ImportResult<T>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        match self.get_config_value(key)? {
            None => Ok(default),
            Some(raw) => raw
                .trim()
                .parse::<T>()
                .map_err(|e| ImportError::ConfigValueError {
                    key: key.to_string(),
                    value: raw.clone(),
                    message: e.to_string(),
                }),
        }
    }
}

#[async_trait]
impl ImportConfigReader for ConfigManager {
    async fn get_batch_size(&self) -> ImportResult<usize> {
        let size = self.get_parsed_or_default(config_keys::BATCH_SIZE, DEFAULT_BATCH_SIZE)?;
        if size == 0 {
            return Err(ImportError::ConfigValueError {
                key: config_keys::BATCH_SIZE.to_string(),
                value: "0".to_string(),
                message: "batch_size 必须 >= 1".to_string(),
            });
        }
        Ok(size)
    }

    async fn get_batch_delay_ms(&self) -> ImportResult<u64> {
        self.get_parsed_or_default(config_keys::BATCH_DELAY_MS, DEFAULT_BATCH_DELAY_MS)
    }

    async fn get_batch_failure_policy(&self) -> ImportResult<BatchFailurePolicy> {
        match self.get_config_value(config_keys::BATCH_FAILURE_POLICY)? {
            None => Ok(BatchFailurePolicy::default()),
            Some(raw) => {
                BatchFailurePolicy::parse(&raw).ok_or_else(|| ImportError::ConfigValueError {
                    key: config_keys::BATCH_FAILURE_POLICY.to_string(),
                    value: raw.clone(),
                    message: "期望 FAIL_BATCH 或 RETRY_PER_ROW".to_string(),
                })
            }
        }
    }

    async fn get_numeric_policy(&self) -> ImportResult<NumericPolicy> {
        match self.get_config_value(config_keys::NUMERIC_POLICY)? {
            None => Ok(NumericPolicy::default()),
            Some(raw) => NumericPolicy::parse(&raw).ok_or_else(|| ImportError::ConfigValueError {
                key: config_keys::NUMERIC_POLICY.to_string(),
                value: raw.clone(),
                message: "期望 LENIENT 或 STRICT".to_string(),
            }),
        }
    }

    async fn get_mapping_cache_ttl_secs(&self) -> ImportResult<u64> {
        self.get_parsed_or_default(
            config_keys::MAPPING_CACHE_TTL_SECS,
            DEFAULT_MAPPING_CACHE_TTL_SECS,
        )
    }

    async fn get_max_displayed_errors(&self) -> ImportResult<usize> {
        self.get_parsed_or_default(
            config_keys::MAX_DISPLAYED_ERRORS,
            DEFAULT_MAX_DISPLAYED_ERRORS,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ImportSettings;
    use crate::db::init_schema;
    use std::time::Duration;

    fn setup_config() -> ConfigManager {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        ConfigManager::from_connection(Arc::new(Mutex::new(conn))).unwrap()
    }

    #[tokio::test]
    async fn test_defaults_when_missing() {
        let config = setup_config();
        let settings = ImportSettings::load(&config).await.unwrap();

        assert_eq!(settings, ImportSettings::default());
        assert_eq!(config.get_mapping_cache_ttl_secs().await.unwrap(), 300);
    }

    #[tokio::test]
    async fn test_overrides_are_read() {
        let config = setup_config();
        config.set_config_value(config_keys::BATCH_SIZE, "25").unwrap();
        config.set_config_value(config_keys::BATCH_DELAY_MS, "0").unwrap();
        config.set_config_value(config_keys::NUMERIC_POLICY, "strict").unwrap();
        config
            .set_config_value(config_keys::BATCH_FAILURE_POLICY, "RETRY_PER_ROW")
            .unwrap();

        let settings = ImportSettings::load(&config).await.unwrap();
        assert_eq!(settings.batch_size, 25);
        assert_eq!(settings.batch_delay, Duration::ZERO);
        assert_eq!(settings.numeric_policy, NumericPolicy::Strict);
        assert_eq!(settings.batch_failure_policy, BatchFailurePolicy::RetryPerRow);

        let snapshot = config.get_config_snapshot().unwrap();
        assert_eq!(snapshot.get(config_keys::BATCH_SIZE).map(String::as_str), Some("25"));
    }

    #[tokio::test]
    async fn test_invalid_values_rejected() {
        let config = setup_config();
        config.set_config_value(config_keys::BATCH_SIZE, "0").unwrap();
        assert!(matches!(
            config.get_batch_size().await,
            Err(ImportError::ConfigValueError { .. })
        ));

        config.set_config_value(config_keys::BATCH_DELAY_MS, "abc").unwrap();
        assert!(matches!(
            config.get_batch_delay_ms().await,
            Err(ImportError::ConfigValueError { .. })
        ));

        config.set_config_value(config_keys::NUMERIC_POLICY, "fuzzy").unwrap();
        assert!(config.get_numeric_policy().await.is_err());
    }
}
