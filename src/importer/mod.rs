// ==========================================
// 食物库导入器 - 导入层
// ==========================================
// 职责: 分隔文本营养数据导入
// 支持: CSV / TXT（Tab / 分号 / 逗号分隔）
// ==========================================

// 模块声明
pub mod category_mapper;
pub mod data_cleaner;
pub mod dq_validator;
pub mod error;
pub mod field_mapper;
pub mod file_parser;
pub mod food_importer_impl;
pub mod food_importer_trait;
pub mod mapping_cache;
pub mod report;

// 重导出核心类型
pub use category_mapper::CategoryMapper;
pub use data_cleaner::DataCleaner as DataCleanerImpl;
pub use dq_validator::DqValidator as DqValidatorImpl;
pub use error::{ImportError, ImportResult};
pub use field_mapper::ColumnMapper;
pub use file_parser::TextFileParser;
pub use food_importer_impl::{FoodImporterImpl, ProgressCallback};
pub use mapping_cache::{Clock, ManualClock, MappingCache, RefreshPolicy, SystemClock};
pub use report::ImportReport;

// 重导出 Trait 接口
pub use food_importer_trait::{DataCleaner, FileParser, FoodImporter, RowValidator};
