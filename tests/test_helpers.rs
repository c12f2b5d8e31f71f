// ==========================================
// 测试辅助函数
// ==========================================
// 职责: 提供测试所需的数据库初始化、CSV 文件生成、
//       Mock 配置与可注入故障的 Repository
// ==========================================

#![allow(dead_code)]

use async_trait::async_trait;
use food_importer::config::{config_keys, ConfigManager, ImportConfigReader};
use food_importer::db::{init_schema, open_sqlite_connection};
use food_importer::domain::types::{BatchFailurePolicy, NumericPolicy};
use food_importer::domain::{FoodRecord, ImportBatch};
use food_importer::importer::{
    DataCleanerImpl, DqValidatorImpl, FoodImporterImpl, ImportResult, MappingCache,
    RefreshPolicy, TextFileParser,
};
use food_importer::repository::{
    FoodImportRepository, FoodImportRepositoryImpl, MappingRepositoryImpl, RepositoryError,
    RepositoryResult,
};
use rusqlite::Connection;
use std::error::Error;
use std::io::Write;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tempfile::{Builder, NamedTempFile};

/// 创建临时测试数据库并初始化 schema
///
/// # 返回
/// - NamedTempFile: 临时数据库文件（需要保持存活）
/// - String: 数据库文件路径
pub fn create_test_db() -> Result<(NamedTempFile, String), Box<dyn Error>> {
    let temp_file = NamedTempFile::new()?;
    let db_path = temp_file.path().to_string_lossy().to_string();

    let conn = open_sqlite_connection(&db_path)?;
    init_schema(&conn)?;

    Ok((temp_file, db_path))
}

/// 打开测试数据库连接（共享）
pub fn open_test_connection(db_path: &str) -> Result<Arc<Mutex<Connection>>, Box<dyn Error>> {
    Ok(Arc::new(Mutex::new(open_sqlite_connection(db_path)?)))
}

/// 插入测试配置数据（关闭批次停顿）
pub fn insert_test_config(conn: &Connection) -> Result<(), Box<dyn Error>> {
    conn.execute(
        "INSERT OR REPLACE INTO config_kv (scope_id, key, value) VALUES ('global', ?1, '0')",
        [config_keys::BATCH_DELAY_MS],
    )?;
    Ok(())
}

/// 写入临时 CSV 文件
pub fn write_temp_csv(content: &str) -> Result<NamedTempFile, Box<dyn Error>> {
    let mut file = Builder::new().suffix(".csv").tempfile()?;
    file.write_all(content.as_bytes())?;
    file.flush()?;
    Ok(file)
}

/// 生成 `nom;kcal;proteines` 文件内容
///
/// empty_name_rows 为数据行序号（从 1 开始），对应行名称留空
pub fn build_semicolon_csv(rows: usize, empty_name_rows: &[usize]) -> String {
    let mut content = String::from("nom;kcal;proteines\n");
    for i in 1..=rows {
        let name = if empty_name_rows.contains(&i) {
            String::new()
        } else {
            format!("Aliment {}", i)
        };
        content.push_str(&format!("{};{};{},5\n", name, 10 * i, i));
    }
    content
}

/// 创建使用 ConfigManager 的导入器（共享同一连接）
pub fn create_test_importer(
    conn: Arc<Mutex<Connection>>,
) -> FoodImporterImpl<FoodImportRepositoryImpl, MappingRepositoryImpl, ConfigManager> {
    let config = ConfigManager::from_connection(conn.clone()).expect("Failed to create ConfigManager");
    let cache = Arc::new(MappingCache::new(
        MappingRepositoryImpl::from_connection(conn.clone()),
        RefreshPolicy::from_secs(300),
    ));

    FoodImporterImpl::new(
        FoodImportRepositoryImpl::from_connection(conn),
        cache,
        config,
        Box::new(TextFileParser),
        Box::new(DataCleanerImpl),
        Box::new(DqValidatorImpl::default()),
    )
}

/// 创建自定义 Repository / 配置的导入器
pub fn create_importer_with<R, C>(
    repo: R,
    config: C,
    conn: Arc<Mutex<Connection>>,
) -> FoodImporterImpl<R, MappingRepositoryImpl, C>
where
    R: FoodImportRepository,
    C: ImportConfigReader,
{
    let cache = Arc::new(MappingCache::new(
        MappingRepositoryImpl::from_connection(conn),
        RefreshPolicy::from_secs(300),
    ));

    FoodImporterImpl::new(
        repo,
        cache,
        config,
        Box::new(TextFileParser),
        Box::new(DataCleanerImpl),
        Box::new(DqValidatorImpl::default()),
    )
}

// ==========================================
// MockConfig - 内存配置
// ==========================================
#[derive(Debug, Clone)]
pub struct MockConfig {
    pub batch_size: usize,
    pub batch_delay_ms: u64,
    pub numeric_policy: NumericPolicy,
    pub batch_failure_policy: BatchFailurePolicy,
    pub max_displayed_errors: usize,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            batch_size: 10,
            batch_delay_ms: 0,
            numeric_policy: NumericPolicy::Lenient,
            batch_failure_policy: BatchFailurePolicy::FailWholeBatch,
            max_displayed_errors: 10,
        }
    }
}

impl MockConfig {
    pub fn with_batch_failure_policy(policy: BatchFailurePolicy) -> Self {
        Self {
            batch_failure_policy: policy,
            ..Self::default()
        }
    }
}

#[async_trait]
impl ImportConfigReader for MockConfig {
    async fn get_batch_size(&self) -> ImportResult<usize> {
        Ok(self.batch_size)
    }

    async fn get_batch_delay_ms(&self) -> ImportResult<u64> {
        Ok(self.batch_delay_ms)
    }

    async fn get_batch_failure_policy(&self) -> ImportResult<BatchFailurePolicy> {
        Ok(self.batch_failure_policy)
    }

    async fn get_numeric_policy(&self) -> ImportResult<NumericPolicy> {
        Ok(self.numeric_policy)
    }

    async fn get_mapping_cache_ttl_secs(&self) -> ImportResult<u64> {
        Ok(300)
    }

    async fn get_max_displayed_errors(&self) -> ImportResult<usize> {
        Ok(self.max_displayed_errors)
    }
}

// ==========================================
// FlakyFoodRepository - 批量写入必定失败的 Repository
// ==========================================
// 逐条写入委托给真实 Repository，名称在 reject_names 中的记录写入失败
pub struct FlakyFoodRepository {
    inner: FoodImportRepositoryImpl,
    reject_names: Vec<String>,
    pub batch_calls: AtomicUsize,
    pub row_calls: AtomicUsize,
}

impl FlakyFoodRepository {
    pub fn new(conn: Arc<Mutex<Connection>>, reject_names: &[&str]) -> Self {
        Self {
            inner: FoodImportRepositoryImpl::from_connection(conn),
            reject_names: reject_names.iter().map(|s| s.to_string()).collect(),
            batch_calls: AtomicUsize::new(0),
            row_calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl FoodImportRepository for FlakyFoodRepository {
    async fn insert_food_batch(
        &self,
        _batch_id: &str,
        _foods: &[FoodRecord],
    ) -> RepositoryResult<usize> {
        self.batch_calls.fetch_add(1, Ordering::SeqCst);
        Err(RepositoryError::DatabaseConnectionError(
            "backend indisponible".to_string(),
        ))
    }

    async fn insert_food(&self, batch_id: &str, food: &FoodRecord) -> RepositoryResult<()> {
        self.row_calls.fetch_add(1, Ordering::SeqCst);
        if self.reject_names.contains(&food.name) {
            return Err(RepositoryError::ConstraintViolation(format!(
                "rejected: {}",
                food.name
            )));
        }
        self.inner.insert_food(batch_id, food).await
    }

    async fn count_foods(&self) -> RepositoryResult<usize> {
        self.inner.count_foods().await
    }

    async fn find_food_by_name(&self, name: &str) -> RepositoryResult<Option<FoodRecord>> {
        self.inner.find_food_by_name(name).await
    }

    async fn insert_import_batch(&self, batch: &ImportBatch) -> RepositoryResult<()> {
        self.inner.insert_import_batch(batch).await
    }

    async fn get_recent_batches(&self, limit: usize) -> RepositoryResult<Vec<ImportBatch>> {
        self.inner.get_recent_batches(limit).await
    }
}
