// ==========================================
// 食物库导入器 - 应用状态
// ==========================================
// 职责: 共享数据库连接、配置、映射表缓存，装配导入器
// ==========================================

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use rusqlite::Connection;

use crate::config::{ConfigManager, ImportConfigReader};
use crate::db::{init_schema, open_sqlite_connection};
use crate::importer::{
    DataCleanerImpl, DqValidatorImpl, FoodImporterImpl, ImportResult, MappingCache, RefreshPolicy,
    TextFileParser,
};
use crate::repository::{FoodImportRepositoryImpl, MappingRepositoryImpl, RepositoryError};

/// 默认装配的导入器类型
pub type DefaultFoodImporter =
    FoodImporterImpl<FoodImportRepositoryImpl, MappingRepositoryImpl, ConfigManager>;

/// 数据库路径环境变量
pub const DB_PATH_ENV: &str = "FOOD_IMPORTER_DB_PATH";

/// 应用状态
///
/// 同一个 AppState 装配出的导入器共享连接与映射表缓存
pub struct AppState {
    /// 数据库路径
    pub db_path: String,

    conn: Arc<Mutex<Connection>>,

    /// 配置管理器
    pub config: Arc<ConfigManager>,

    mapping_cache: Arc<MappingCache<MappingRepositoryImpl>>,
}

impl AppState {
    /// 打开数据库、建表并初始化共享组件
    pub async fn new(db_path: String) -> ImportResult<Self> {
        tracing::info!("初始化AppState，数据库路径: {}", db_path);

        let conn = open_sqlite_connection(&db_path)
            .map_err(|e| RepositoryError::DatabaseConnectionError(e.to_string()))?;
        init_schema(&conn).map_err(|e| RepositoryError::DatabaseQueryError(e.to_string()))?;
        let conn = Arc::new(Mutex::new(conn));

        let config = Arc::new(ConfigManager::from_connection(conn.clone())?);
        let ttl_secs = config.get_mapping_cache_ttl_secs().await?;

        let mapping_cache = Arc::new(MappingCache::new(
            MappingRepositoryImpl::from_connection(conn.clone()),
            RefreshPolicy::from_secs(ttl_secs),
        ));

        Ok(Self {
            db_path,
            conn,
            config,
            mapping_cache,
        })
    }

    /// 装配一个导入器（共享连接与映射表缓存）
    pub fn build_importer(&self) -> ImportResult<DefaultFoodImporter> {
        let config = ConfigManager::from_connection(self.conn.clone())?;
        Ok(FoodImporterImpl::new(
            FoodImportRepositoryImpl::from_connection(self.conn.clone()),
            self.mapping_cache.clone(),
            config,
            Box::new(TextFileParser),
            Box::new(DataCleanerImpl),
            Box::new(DqValidatorImpl::default()),
        ))
    }

    /// 读取报告展示错误条数上限
    pub async fn max_displayed_errors(&self) -> ImportResult<usize> {
        self.config.get_max_displayed_errors().await
    }
}

/// 获取默认数据库路径
///
/// 优先级: 环境变量 FOOD_IMPORTER_DB_PATH → 用户数据目录 → 当前目录
pub fn get_default_db_path() -> String {
    // 允许通过环境变量显式指定 DB 路径（便于调试/测试/CI）
    if let Ok(path) = std::env::var(DB_PATH_ENV) {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    let mut path = PathBuf::from("./food_importer.db");

    if let Some(data_dir) = dirs::data_dir() {
        let dir = data_dir.join("food-importer");
        // 目录创建失败时回退到当前目录
        if std::fs::create_dir_all(&dir).is_ok() {
            path = dir.join("food_importer.db");
        }
    }

    path.to_string_lossy().to_string()
}
