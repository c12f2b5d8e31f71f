// ==========================================
// 食物库导入器 - 导入报告
// ==========================================
// 职责: 导入结果摘要、错误列表截断展示、错误明细导出 CSV
// ==========================================

use crate::domain::food::{ImportOutcome, ImportRowError};
use crate::importer::error::ImportResult;
use serde::Serialize;
use std::io::Write;
use std::path::Path;

/// 错误明细 CSV 行
#[derive(Debug, Serialize)]
struct ErrorCsvRow<'a> {
    row: usize,
    error: &'a str,
    data: String,
}

pub struct ImportReport<'a> {
    outcome: &'a ImportOutcome,
    max_displayed_errors: usize,
}

impl<'a> ImportReport<'a> {
    pub fn new(outcome: &'a ImportOutcome, max_displayed_errors: usize) -> Self {
        Self {
            outcome,
            max_displayed_errors,
        }
    }

    /// 摘要行
    pub fn summary(&self) -> String {
        let stats = &self.outcome.stats;
        format!(
            "{} aliment(s) importé(s) sur {} ligne(s), {} erreur(s) en {:.1}s",
            self.outcome.successful,
            stats.total,
            self.outcome.errors.len(),
            self.outcome.elapsed_time.as_secs_f64()
        )
    }

    /// 展示用错误行（超过上限时追加剩余条数）
    pub fn error_lines(&self) -> Vec<String> {
        let errors = &self.outcome.errors;
        let mut lines: Vec<String> = errors
            .iter()
            .take(self.max_displayed_errors)
            .map(format_error)
            .collect();

        if errors.len() > self.max_displayed_errors {
            lines.push(format!(
                "... et {} autre(s) erreur(s)",
                errors.len() - self.max_displayed_errors
            ));
        }
        lines
    }

    /// 写出全部错误明细（列: row, error, data）
    pub fn write_errors_csv<W: Write>(&self, writer: W) -> ImportResult<()> {
        let mut csv_writer = csv::Writer::from_writer(writer);
        for error in &self.outcome.errors {
            csv_writer.serialize(ErrorCsvRow {
                row: error.row,
                error: &error.error,
                data: error.data.to_string(),
            })?;
        }
        csv_writer.flush()?;
        Ok(())
    }

    pub fn write_errors_csv_to_path(&self, path: &Path) -> ImportResult<()> {
        let file = std::fs::File::create(path)?;
        self.write_errors_csv(file)
    }
}

fn format_error(error: &ImportRowError) -> String {
    format!("Ligne {}: {}", error.row, error.error)
}
