// ==========================================
// 食物库导入器 - 食物领域模型
// ==========================================
// 职责: 候选食物记录、列映射、行级错误、导入统计、导入批次
// ==========================================

use crate::domain::types::FieldKind;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

// ==========================================
// ColumnMapping - 列映射
// ==========================================
// 每个槽位为表头下标，None 表示文件中不存在该列
// 构建后只读
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnMapping {
    pub name: Option<usize>,
    pub category: Option<usize>,
    pub calories: Option<usize>,
    pub protein: Option<usize>,
    pub carbs: Option<usize>,
    pub fat: Option<usize>,
    pub fiber: Option<usize>,
    pub calcium: Option<usize>,
    pub iron: Option<usize>,
    pub magnesium: Option<usize>,
    pub potassium: Option<usize>,
    pub sodium: Option<usize>,
    pub vitamin_c: Option<usize>,
    pub vitamin_d: Option<usize>,
    pub salt: Option<usize>,
}

impl ColumnMapping {
    pub fn get(&self, kind: FieldKind) -> Option<usize> {
        match kind {
            FieldKind::Name => self.name,
            FieldKind::Category => self.category,
            FieldKind::Calories => self.calories,
            FieldKind::Protein => self.protein,
            FieldKind::Carbs => self.carbs,
            FieldKind::Fat => self.fat,
            FieldKind::Fiber => self.fiber,
            FieldKind::Calcium => self.calcium,
            FieldKind::Iron => self.iron,
            FieldKind::Magnesium => self.magnesium,
            FieldKind::Potassium => self.potassium,
            FieldKind::Sodium => self.sodium,
            FieldKind::VitaminC => self.vitamin_c,
            FieldKind::VitaminD => self.vitamin_d,
            FieldKind::Salt => self.salt,
        }
    }

    pub fn set(&mut self, kind: FieldKind, index: Option<usize>) {
        let slot = match kind {
            FieldKind::Name => &mut self.name,
            FieldKind::Category => &mut self.category,
            FieldKind::Calories => &mut self.calories,
            FieldKind::Protein => &mut self.protein,
            FieldKind::Carbs => &mut self.carbs,
            FieldKind::Fat => &mut self.fat,
            FieldKind::Fiber => &mut self.fiber,
            FieldKind::Calcium => &mut self.calcium,
            FieldKind::Iron => &mut self.iron,
            FieldKind::Magnesium => &mut self.magnesium,
            FieldKind::Potassium => &mut self.potassium,
            FieldKind::Sodium => &mut self.sodium,
            FieldKind::VitaminC => &mut self.vitamin_c,
            FieldKind::VitaminD => &mut self.vitamin_d,
            FieldKind::Salt => &mut self.salt,
        };
        *slot = index;
    }

    /// 已识别的列数
    pub fn resolved_count(&self) -> usize {
        FieldKind::ALL
            .iter()
            .filter(|kind| self.get(**kind).is_some())
            .count()
    }

    /// 已识别列中的最大下标；数据行字段数须大于该值
    pub fn max_index(&self) -> Option<usize> {
        FieldKind::ALL.iter().filter_map(|kind| self.get(*kind)).max()
    }
}

// ==========================================
// FoodRecord - 候选食物记录
// ==========================================
// 营养素均 >= 0，保留两位小数
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FoodRecord {
    pub name: String,
    pub category: String,
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
    pub fiber: f64,
    pub calcium: f64,
    pub iron: f64,
    pub magnesium: f64,
    pub potassium: f64,
    pub sodium: f64,
    pub vitamin_c: f64,
    pub vitamin_d: f64,
    pub salt: f64,
}

impl FoodRecord {
    /// 以名称和分类创建记录，营养素全部为 0
    pub fn new(name: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            category: category.into(),
            ..Default::default()
        }
    }

    pub fn nutrient(&self, kind: FieldKind) -> Option<f64> {
        match kind {
            FieldKind::Calories => Some(self.calories),
            FieldKind::Protein => Some(self.protein),
            FieldKind::Carbs => Some(self.carbs),
            FieldKind::Fat => Some(self.fat),
            FieldKind::Fiber => Some(self.fiber),
            FieldKind::Calcium => Some(self.calcium),
            FieldKind::Iron => Some(self.iron),
            FieldKind::Magnesium => Some(self.magnesium),
            FieldKind::Potassium => Some(self.potassium),
            FieldKind::Sodium => Some(self.sodium),
            FieldKind::VitaminC => Some(self.vitamin_c),
            FieldKind::VitaminD => Some(self.vitamin_d),
            FieldKind::Salt => Some(self.salt),
            FieldKind::Name | FieldKind::Category => None,
        }
    }

    /// 写入营养素值（name / category 忽略）
    pub fn set_nutrient(&mut self, kind: FieldKind, value: f64) {
        let slot = match kind {
            FieldKind::Calories => &mut self.calories,
            FieldKind::Protein => &mut self.protein,
            FieldKind::Carbs => &mut self.carbs,
            FieldKind::Fat => &mut self.fat,
            FieldKind::Fiber => &mut self.fiber,
            FieldKind::Calcium => &mut self.calcium,
            FieldKind::Iron => &mut self.iron,
            FieldKind::Magnesium => &mut self.magnesium,
            FieldKind::Potassium => &mut self.potassium,
            FieldKind::Sodium => &mut self.sodium,
            FieldKind::VitaminC => &mut self.vitamin_c,
            FieldKind::VitaminD => &mut self.vitamin_d,
            FieldKind::Salt => &mut self.salt,
            FieldKind::Name | FieldKind::Category => return,
        };
        *slot = value;
    }
}

// ==========================================
// SourceLine - 带原始行号的文本行
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLine {
    pub line_number: usize, // 原始文件行号（从 1 开始，含表头）
    pub text: String,
}

// ==========================================
// ImportRowError - 行级错误
// ==========================================
// 只追加，不修改
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportRowError {
    pub row: usize,               // 原始文件行号
    pub error: String,            // 错误原因
    pub data: serde_json::Value,  // 原始行或部分解析的记录
}

// ==========================================
// ValidationOutcome - 行校验结果
// ==========================================
// reasons 为空即通过；多条原因同时保留
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationOutcome {
    pub reasons: Vec<String>,
}

impl ValidationOutcome {
    pub fn is_valid(&self) -> bool {
        self.reasons.is_empty()
    }

    /// 原因拼接为单条错误信息
    pub fn message(&self) -> String {
        self.reasons.join("; ")
    }
}

// ==========================================
// ImportStats - 导入统计
// ==========================================
// 每个批次结束后更新，计数单调不减
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportStats {
    pub total: usize,
    pub processed: usize,
    pub successful: usize,
    pub errors: usize,
}

impl ImportStats {
    pub fn new(total: usize) -> Self {
        Self {
            total,
            ..Default::default()
        }
    }

    /// 进度百分比（0-100）
    pub fn progress_percent(&self) -> f64 {
        if self.total == 0 {
            return 100.0;
        }
        (self.processed as f64 / self.total as f64 * 100.0).min(100.0)
    }
}

// ==========================================
// ImportBatch - 导入批次记录
// ==========================================
// 对齐: import_batch 表
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportBatch {
    pub batch_id: String,                   // 批次 ID（UUID）
    pub file_name: Option<String>,          // 源文件名
    pub total_rows: i64,                    // 数据行数
    pub success_rows: i64,                  // 成功写入行数
    pub error_rows: i64,                    // 行级错误数
    pub imported_at: DateTime<Utc>,         // 导入完成时间
    pub elapsed_ms: i64,                    // 导入耗时（毫秒）
    pub errors_json: Option<String>,        // 行级错误 JSON
}

// ==========================================
// ImportOutcome - 导入结果
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportOutcome {
    pub batch_id: String,
    pub successful: usize,
    pub stats: ImportStats,
    pub errors: Vec<ImportRowError>,
    pub elapsed_time: Duration,
}
