// ==========================================
// 食物库导入器 - 行校验器实现
// ==========================================
// 职责: 候选记录名称质量校验
// 规则: 非空 / 非纯数字 / 不含损坏标记 / 长度区间
// 说明: 所有未通过的规则同时报告
// ==========================================

use crate::domain::food::{FoodRecord, ValidationOutcome};
use crate::importer::food_importer_trait::RowValidator;

pub const DEFAULT_NAME_MIN_CHARS: usize = 2;
pub const DEFAULT_NAME_MAX_CHARS: usize = 200;

/// 损坏数据标记（导出工具拼接失败时残留）
pub const CORRUPTION_MARKER: &str = ":::";

pub struct DqValidator {
    name_min_chars: usize,
    name_max_chars: usize,
}

impl DqValidator {
    pub fn new(name_min_chars: usize, name_max_chars: usize) -> Self {
        Self {
            name_min_chars,
            name_max_chars,
        }
    }
}

impl Default for DqValidator {
    fn default() -> Self {
        Self::new(DEFAULT_NAME_MIN_CHARS, DEFAULT_NAME_MAX_CHARS)
    }
}

impl RowValidator for DqValidator {
    fn validate_food(&self, food: &FoodRecord) -> ValidationOutcome {
        let mut reasons = Vec::new();
        let name = food.name.trim();

        if name.is_empty() {
            reasons.push("Nom vide".to_string());
        }

        if is_purely_numeric(name) {
            reasons.push("Nom purement numérique".to_string());
        }

        if name.contains(CORRUPTION_MARKER) {
            reasons.push(format!("Nom corrompu (contient '{}')", CORRUPTION_MARKER));
        }

        let len = name.chars().count();
        if len < self.name_min_chars {
            reasons.push(format!(
                "Nom trop court (< {} caractères)",
                self.name_min_chars
            ));
        }
        if len > self.name_max_chars {
            reasons.push(format!(
                "Nom trop long (> {} caractères)",
                self.name_max_chars
            ));
        }

        ValidationOutcome { reasons }
    }
}

/// 仅由数字、小数点、逗号、负号、空格组成（至少一个数字）
fn is_purely_numeric(name: &str) -> bool {
    name.chars().any(|c| c.is_ascii_digit())
        && name
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '.' | ',' | '-' | ' '))
}
