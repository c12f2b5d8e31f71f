// ==========================================
// 食物库导入器 - 食物导入 Repository Trait
// ==========================================
// 职责: 定义导入相关数据访问接口（不包含业务逻辑）
// 红线: Repository 不含业务规则，只做数据 CRUD
// ==========================================

use crate::domain::food::{FoodRecord, ImportBatch};
use crate::repository::error::RepositoryResult;
use async_trait::async_trait;

// ==========================================
// FoodImportRepository Trait
// ==========================================
// 用途: foods / import_batch 数据访问
// 实现者: FoodImportRepositoryImpl（使用 rusqlite）
#[async_trait]
pub trait FoodImportRepository: Send + Sync {
    // ===== 批量写入（事务化）=====

    /// 批量插入食物（单次写入）
    ///
    /// # 参数
    /// - batch_id: 导入批次 ID
    /// - foods: 已通过校验的食物记录
    ///
    /// # 返回
    /// - Ok(usize): 成功插入的记录数
    /// - Err: 数据库错误（整个批次回滚，不存在部分成功）
    async fn insert_food_batch(
        &self,
        batch_id: &str,
        foods: &[FoodRecord],
    ) -> RepositoryResult<usize>;

    /// 插入单条食物
    async fn insert_food(&self, batch_id: &str, food: &FoodRecord) -> RepositoryResult<()>;

    // ===== 查询 =====

    /// 统计 foods 表记录数
    async fn count_foods(&self) -> RepositoryResult<usize>;

    /// 按名称查询食物
    async fn find_food_by_name(&self, name: &str) -> RepositoryResult<Option<FoodRecord>>;

    // ===== 批次管理 =====

    /// 插入导入批次记录
    async fn insert_import_batch(&self, batch: &ImportBatch) -> RepositoryResult<()>;

    /// 查询最近的导入批次
    ///
    /// # 参数
    /// - limit: 返回记录数限制
    async fn get_recent_batches(&self, limit: usize) -> RepositoryResult<Vec<ImportBatch>>;
}
