// ==========================================
// 食物库导入器 - 导入配置读取 Trait
// ==========================================
// 职责: 定义导入模块所需的配置读取接口（不包含实现）
// 红线: 不包含配置写入、不包含业务逻辑
// ==========================================

use crate::domain::types::{BatchFailurePolicy, NumericPolicy};
use crate::importer::error::ImportResult;
use async_trait::async_trait;

// ==========================================
// ImportConfigReader Trait
// ==========================================
// 用途: 导入模块所需的配置读取接口
// 实现者: ConfigManager（从 config_kv 表读取）
#[async_trait]
pub trait ImportConfigReader: Send + Sync {
    // ===== 批处理配置 =====

    /// 获取每批写入的行数
    ///
    /// # 默认值
    /// - 10
    async fn get_batch_size(&self) -> ImportResult<usize>;

    /// 获取批次之间的固定停顿（毫秒）
    ///
    /// # 默认值
    /// - 100
    async fn get_batch_delay_ms(&self) -> ImportResult<u64>;

    /// 获取批量写入失败时的归因策略
    ///
    /// # 默认值
    /// - FAIL_BATCH
    async fn get_batch_failure_policy(&self) -> ImportResult<BatchFailurePolicy>;

    // ===== 解析配置 =====

    /// 获取数值解析策略
    ///
    /// # 默认值
    /// - LENIENT
    async fn get_numeric_policy(&self) -> ImportResult<NumericPolicy>;

    /// 获取映射表缓存有效期（秒）
    ///
    /// # 默认值
    /// - 300
    async fn get_mapping_cache_ttl_secs(&self) -> ImportResult<u64>;

    // ===== 报告配置 =====

    /// 获取报告中展示的最大错误条数
    ///
    /// # 默认值
    /// - 10
    async fn get_max_displayed_errors(&self) -> ImportResult<usize>;
}
