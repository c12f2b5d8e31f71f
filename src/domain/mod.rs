// ==========================================
// 食物库导入器 - 领域模型层
// ==========================================
// 职责: 定义领域实体与类型
// 红线: 不含数据访问逻辑,不含导入流程逻辑
// ==========================================

pub mod food;
pub mod types;

// 重导出核心类型
pub use food::{
    ColumnMapping, FoodRecord, ImportBatch, ImportOutcome, ImportRowError, ImportStats,
    SourceLine, ValidationOutcome,
};
pub use types::{BatchFailurePolicy, FieldKind, FoodCategory, NumericPolicy, Separator};
