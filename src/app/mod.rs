// ==========================================
// 食物库导入器 - 应用层
// ==========================================
// 职责: 组件装配，连接命令行入口与导入管道
// ==========================================

pub mod state;

// 重导出
pub use state::{get_default_db_path, AppState, DefaultFoodImporter, DB_PATH_ENV};
