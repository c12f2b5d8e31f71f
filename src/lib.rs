// ==========================================
// 食物库导入器 - 核心库
// ==========================================
// 技术栈: Rust + SQLite
// 功能: 分隔文本营养数据表 → 表头识别 → 行校验 → 分批入库
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 导入层 - 外部数据
pub mod importer;

// 配置层 - 导入参数
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一/建表）
pub mod db;

// 日志系统
pub mod logging;

// 应用层 - 组件装配
pub mod app;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{BatchFailurePolicy, FieldKind, FoodCategory, NumericPolicy, Separator};

// 领域实体
pub use domain::{
    ColumnMapping, FoodRecord, ImportBatch, ImportOutcome, ImportRowError, ImportStats,
};

// 导入器
pub use importer::{FoodImporter, FoodImporterImpl, ImportError, ImportReport, ImportResult};

// 应用
pub use app::{get_default_db_path, AppState};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "食物库导入器";
