// ==========================================
// 食物库导入器 - 导入参数快照
// ==========================================
// 导入开始时读取一次，整个导入过程中保持不变
// ==========================================

use crate::config::import_config_trait::ImportConfigReader;
use crate::domain::types::{BatchFailurePolicy, NumericPolicy};
use crate::importer::error::ImportResult;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_BATCH_SIZE: usize = 10;
pub const DEFAULT_BATCH_DELAY_MS: u64 = 100;
pub const DEFAULT_MAPPING_CACHE_TTL_SECS: u64 = 300;
pub const DEFAULT_MAX_DISPLAYED_ERRORS: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportSettings {
    pub batch_size: usize,
    pub batch_delay: Duration,
    pub numeric_policy: NumericPolicy,
    pub batch_failure_policy: BatchFailurePolicy,
}

impl Default for ImportSettings {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            batch_delay: Duration::from_millis(DEFAULT_BATCH_DELAY_MS),
            numeric_policy: NumericPolicy::Lenient,
            batch_failure_policy: BatchFailurePolicy::FailWholeBatch,
        }
    }
}

impl ImportSettings {
    /// 从配置读取器加载全部参数
    pub async fn load<C: ImportConfigReader + ?Sized>(config: &C) -> ImportResult<Self> {
        Ok(Self {
            batch_size: config.get_batch_size().await?,
            batch_delay: Duration::from_millis(config.get_batch_delay_ms().await?),
            numeric_policy: config.get_numeric_policy().await?,
            batch_failure_policy: config.get_batch_failure_policy().await?,
        })
    }
}
