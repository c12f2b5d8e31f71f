// ==========================================
// 食物库导入器 - 食物数据导入器实现
// ==========================================
// 职责: 整合导入流程，从文本到数据库
// 流程: 切分 → 表头映射 → 行解析/清洗 → 分类映射 → 校验 → 分批落库 → 批次记录
// 错误: 空文件 / 缺少名称列 → 致命；其余均为行级错误
// ==========================================

use crate::config::{ImportConfigReader, ImportSettings};
use crate::domain::food::{
    ColumnMapping, FoodRecord, ImportBatch, ImportOutcome, ImportRowError, ImportStats,
    SourceLine,
};
use crate::domain::types::{BatchFailurePolicy, FieldKind, NumericPolicy, Separator};
use crate::importer::category_mapper::CategoryMapper;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::file_parser::{detect_separator, parse_line, split_lines};
use crate::importer::food_importer_trait::{DataCleaner, FileParser, FoodImporter, RowValidator};
use crate::importer::mapping_cache::MappingCache;
use crate::repository::mapping_repo::MappingRepository;
use crate::repository::FoodImportRepository;
use chrono::Utc;
use serde_json::{json, Value};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

/// 进度回调（每个批次结束后调用）
pub type ProgressCallback = Box<dyn Fn(&ImportStats) + Send + Sync>;

// ==========================================
// FoodImporterImpl - 食物数据导入器实现
// ==========================================
pub struct FoodImporterImpl<R, M, C>
where
    R: FoodImportRepository,
    M: MappingRepository,
    C: ImportConfigReader,
{
    // 数据访问层
    food_repo: R,

    // 映射表缓存（可在多个导入器间共享）
    mapping_cache: Arc<MappingCache<M>>,

    // 配置读取器
    config: C,

    // 导入组件
    file_parser: Box<dyn FileParser>,
    data_cleaner: Box<dyn DataCleaner>,
    row_validator: Box<dyn RowValidator>,

    progress: Option<ProgressCallback>,
}

impl<R, M, C> FoodImporterImpl<R, M, C>
where
    R: FoodImportRepository,
    M: MappingRepository,
    C: ImportConfigReader,
{
    /// 创建新的 FoodImporter 实例
    ///
    /// # 参数
    /// - food_repo: 食物数据仓储
    /// - mapping_cache: 映射表缓存
    /// - config: 配置读取器
    /// - file_parser: 文件读取器
    /// - data_cleaner: 数据清洗器
    /// - row_validator: 行校验器
    pub fn new(
        food_repo: R,
        mapping_cache: Arc<MappingCache<M>>,
        config: C,
        file_parser: Box<dyn FileParser>,
        data_cleaner: Box<dyn DataCleaner>,
        row_validator: Box<dyn RowValidator>,
    ) -> Self {
        Self {
            food_repo,
            mapping_cache,
            config,
            file_parser,
            data_cleaner,
            row_validator,
            progress: None,
        }
    }

    /// 注册进度回调
    pub fn with_progress_callback(mut self, callback: ProgressCallback) -> Self {
        self.progress = Some(callback);
        self
    }

    pub fn food_repo(&self) -> &R {
        &self.food_repo
    }

    /// 解析单行为候选记录
    ///
    /// # 返回
    /// - Ok(FoodRecord): 通过校验的记录
    /// - Err(ImportRowError): 行级错误（不中止导入）
    fn build_record(
        &self,
        line: &SourceLine,
        separator: Separator,
        mapping: &ColumnMapping,
        name_idx: usize,
        category_mapper: &CategoryMapper,
        policy: NumericPolicy,
    ) -> Result<FoodRecord, ImportRowError> {
        let fields = parse_line(&line.text, separator);

        // 任一已识别列缺失即视为行过短
        let expected = mapping.max_index().unwrap_or(name_idx) + 1;
        if fields.len() < expected {
            return Err(ImportRowError {
                row: line.line_number,
                error: format!(
                    "Ligne mal formée: {} champ(s), au moins {} attendu(s)",
                    fields.len(),
                    expected
                ),
                data: json!(fields),
            });
        }

        let name = fields[name_idx].trim();
        if name.is_empty() {
            return Err(ImportRowError {
                row: line.line_number,
                error: "Nom manquant".to_string(),
                data: json!(fields),
            });
        }

        let category = category_mapper.map_category(cell(&fields, mapping, FieldKind::Category));
        let mut food = FoodRecord::new(name, category);

        let mut reasons = Vec::new();
        for kind in FieldKind::NUTRIENTS {
            match self
                .data_cleaner
                .parse_numeric(cell(&fields, mapping, kind), policy)
            {
                Ok(value) => food.set_nutrient(kind, value.max(0.0)),
                Err(e) => reasons.push(format!("{}: {}", kind, e)),
            }
        }

        let outcome = self.row_validator.validate_food(&food);
        let mut all_reasons = outcome.reasons;
        all_reasons.extend(reasons);

        if !all_reasons.is_empty() {
            return Err(ImportRowError {
                row: line.line_number,
                error: all_reasons.join("; "),
                data: record_json(&food),
            });
        }

        Ok(food)
    }

    /// 写入一个批次的有效记录
    ///
    /// # 返回
    /// - 成功写入的条数；失败的记录追加到 errors
    async fn write_batch(
        &self,
        batch_id: &str,
        valid: Vec<(usize, FoodRecord)>,
        policy: BatchFailurePolicy,
        errors: &mut Vec<ImportRowError>,
    ) -> usize {
        if valid.is_empty() {
            return 0;
        }

        let (rows, foods): (Vec<usize>, Vec<FoodRecord>) = valid.into_iter().unzip();

        let batch_err = match self.food_repo.insert_food_batch(batch_id, &foods).await {
            Ok(count) => return count,
            Err(e) => e,
        };

        warn!(
            batch_id = %batch_id,
            rows = foods.len(),
            error = %batch_err,
            policy = ?policy,
            "批量写入失败"
        );

        match policy {
            BatchFailurePolicy::FailWholeBatch => {
                for (row, food) in rows.into_iter().zip(foods.iter()) {
                    errors.push(ImportRowError {
                        row,
                        error: format!("Erreur d'insertion: {}", batch_err),
                        data: record_json(food),
                    });
                }
                0
            }
            BatchFailurePolicy::RetryPerRow => {
                let mut inserted = 0;
                for (row, food) in rows.into_iter().zip(foods.iter()) {
                    match self.food_repo.insert_food(batch_id, food).await {
                        Ok(()) => inserted += 1,
                        Err(e) => {
                            debug!(row = row, error = %e, "逐条写入失败");
                            errors.push(ImportRowError {
                                row,
                                error: format!("Erreur d'insertion: {}", e),
                                data: record_json(food),
                            });
                        }
                    }
                }
                inserted
            }
        }
    }

    fn report_progress(&self, stats: &ImportStats) {
        if let Some(callback) = &self.progress {
            callback(stats);
        }
    }

    /// 记录导入批次（失败不影响导入结果）
    async fn record_batch(&self, outcome: &ImportOutcome, file_name: Option<&str>) {
        let errors_json = if outcome.errors.is_empty() {
            None
        } else {
            serde_json::to_string(&outcome.errors).ok()
        };

        let batch = ImportBatch {
            batch_id: outcome.batch_id.clone(),
            file_name: file_name.map(str::to_string),
            total_rows: outcome.stats.total as i64,
            success_rows: outcome.successful as i64,
            error_rows: outcome.errors.len() as i64,
            imported_at: Utc::now(),
            elapsed_ms: outcome.elapsed_time.as_millis() as i64,
            errors_json,
        };

        if let Err(e) = self.food_repo.insert_import_batch(&batch).await {
            warn!(batch_id = %batch.batch_id, error = %e, "导入批次记录写入失败");
        }
    }
}

/// 取字段对应单元格；列缺失或行过短时为空串
fn cell<'a>(fields: &'a [String], mapping: &ColumnMapping, kind: FieldKind) -> &'a str {
    mapping
        .get(kind)
        .and_then(|idx| fields.get(idx))
        .map(String::as_str)
        .unwrap_or("")
}

fn record_json(food: &FoodRecord) -> Value {
    serde_json::to_value(food).unwrap_or(Value::Null)
}

#[async_trait::async_trait]
impl<R, M, C> FoodImporter for FoodImporterImpl<R, M, C>
where
    R: FoodImportRepository + Send + Sync,
    M: MappingRepository + Send + Sync,
    C: ImportConfigReader + Send + Sync,
{
    #[instrument(skip(self, file_path))]
    async fn import_from_file<P: AsRef<Path> + Send>(
        &self,
        file_path: P,
    ) -> ImportResult<ImportOutcome> {
        let path = file_path.as_ref();
        info!(file_path = %path.display(), "读取导入文件");

        let content = self.file_parser.read_to_text(path)?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().to_string());

        self.import_from_text(&content, file_name.as_deref()).await
    }

    #[instrument(skip(self, content), fields(batch_id))]
    async fn import_from_text(
        &self,
        content: &str,
        file_name: Option<&str>,
    ) -> ImportResult<ImportOutcome> {
        let start_time = Instant::now();
        let batch_id = Uuid::new_v4().to_string();
        tracing::Span::current().record("batch_id", batch_id.as_str());

        // === 步骤 1: 切分 ===
        let lines = split_lines(content);
        if lines.len() < 2 {
            warn!(lines = lines.len(), "文件为空或只有表头");
            return Err(ImportError::EmptyFile);
        }

        let settings = ImportSettings::load(&self.config).await?;
        let batch_size = settings.batch_size.max(1);
        info!(
            batch_id = %batch_id,
            data_rows = lines.len() - 1,
            batch_size = batch_size,
            "开始导入食物数据"
        );

        // === 步骤 2: 表头映射 ===
        let header = &lines[0];
        let separator = detect_separator(&header.text);
        let headers = parse_line(&header.text, separator);
        let column_mapper = self.mapping_cache.column_mapper().await;
        let (mapping, name_idx) = column_mapper.resolve_headers(&headers)?;
        let category_mapper = self.mapping_cache.category_mapper().await;
        debug!(
            separator = ?separator,
            resolved_columns = mapping.resolved_count(),
            "表头映射完成"
        );

        // === 步骤 3: 分批解析 + 写入 ===
        let data_lines = &lines[1..];
        let mut stats = ImportStats::new(data_lines.len());
        let mut errors: Vec<ImportRowError> = Vec::new();

        for (batch_idx, chunk) in data_lines.chunks(batch_size).enumerate() {
            if batch_idx > 0 && !settings.batch_delay.is_zero() {
                tokio::time::sleep(settings.batch_delay).await;
            }

            let mut valid = Vec::with_capacity(chunk.len());
            for line in chunk {
                match self.build_record(
                    line,
                    separator,
                    &mapping,
                    name_idx,
                    &category_mapper,
                    settings.numeric_policy,
                ) {
                    Ok(food) => valid.push((line.line_number, food)),
                    Err(row_error) => {
                        debug!(row = row_error.row, error = %row_error.error, "行校验失败");
                        errors.push(row_error);
                    }
                }
            }

            let inserted = self
                .write_batch(&batch_id, valid, settings.batch_failure_policy, &mut errors)
                .await;

            stats.processed += chunk.len();
            stats.successful += inserted;
            stats.errors = errors.len();
            self.report_progress(&stats);

            debug!(
                batch = batch_idx + 1,
                processed = stats.processed,
                total = stats.total,
                "批次完成"
            );
        }

        let outcome = ImportOutcome {
            batch_id: batch_id.clone(),
            successful: stats.successful,
            stats,
            errors,
            elapsed_time: start_time.elapsed(),
        };

        // === 步骤 4: 批次记录 ===
        self.record_batch(&outcome, file_name).await;

        info!(
            batch_id = %batch_id,
            successful = outcome.successful,
            errors = outcome.errors.len(),
            elapsed_ms = outcome.elapsed_time.as_millis() as u64,
            "导入完成"
        );

        Ok(outcome)
    }
}
