// ==========================================
// 食物库导入器 - 导入 Trait
// ==========================================
// 职责: 定义导入管道各阶段接口（不包含实现）
// 管道: 文件读取 → 表头映射 → 行解析/清洗 → 行校验 → 分批落库
// ==========================================

use crate::domain::food::{FoodRecord, ImportOutcome, ValidationOutcome};
use crate::domain::types::NumericPolicy;
use crate::importer::data_cleaner::NumericParseError;
use crate::importer::error::ImportResult;
use async_trait::async_trait;
use std::path::Path;

// ==========================================
// FoodImporter Trait
// ==========================================
// 用途: 食物导入主接口
// 实现者: FoodImporterImpl
#[async_trait]
pub trait FoodImporter: Send + Sync {
    /// 从文件导入食物数据
    ///
    /// # 参数
    /// - file_path: 文本文件路径（.csv / .txt）
    ///
    /// # 返回
    /// - Ok(ImportOutcome): 成功条数、统计、行级错误、耗时
    /// - Err: 文件不存在、空文件、缺少名称列等致命错误
    async fn import_from_file<P: AsRef<Path> + Send>(
        &self,
        file_path: P,
    ) -> ImportResult<ImportOutcome>;

    /// 从已读取的文本导入
    ///
    /// # 参数
    /// - content: 完整文件内容
    /// - file_name: 源文件名（仅用于批次记录）
    ///
    /// # 导入流程
    /// 1. 按行切分（跳过空行，保留原始行号）
    /// 2. 表头分隔符探测 + 列映射
    /// 3. 逐行解析、数值清洗、分类映射、校验
    /// 4. 按批次写入，批次之间固定停顿
    /// 5. 记录导入批次
    async fn import_from_text(
        &self,
        content: &str,
        file_name: Option<&str>,
    ) -> ImportResult<ImportOutcome>;
}

// ==========================================
// FileParser Trait
// ==========================================
// 用途: 文件读取接口
// 实现者: TextFileParser
pub trait FileParser: Send + Sync {
    /// 读取文件为文本
    ///
    /// # 返回
    /// - Ok(String): 已去除 BOM 的文件内容
    /// - Err: 文件不存在、扩展名不支持、读取失败
    fn read_to_text(&self, file_path: &Path) -> ImportResult<String>;
}

// ==========================================
// DataCleaner Trait
// ==========================================
// 用途: 数据清洗接口
// 实现者: DataCleaner
pub trait DataCleaner: Send + Sync {
    /// 解析营养素数值
    ///
    /// # 参数
    /// - raw: 原始单元格文本
    /// - policy: 无法解析时的处理策略
    fn parse_numeric(&self, raw: &str, policy: NumericPolicy) -> Result<f64, NumericParseError>;
}

// ==========================================
// RowValidator Trait
// ==========================================
// 用途: 候选记录校验接口
// 实现者: DqValidator
pub trait RowValidator: Send + Sync {
    /// 校验候选记录，返回全部未通过的原因
    fn validate_food(&self, food: &FoodRecord) -> ValidationOutcome;
}
