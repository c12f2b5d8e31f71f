// ==========================================
// 食物库导入器 - 数据清洗器实现
// ==========================================
// 职责: 标签标准化（小写/去重音/压缩空白）
//       营养素数值解析（小数逗号/占位符/范围截断/两位小数）
// ==========================================

use crate::domain::types::NumericPolicy;
use crate::importer::food_importer_trait::DataCleaner as DataCleanerTrait;
use thiserror::Error;

/// 数值绝对值上限
pub const NUMERIC_LIMIT: f64 = 999_999.0;

/// 视为 0 的占位文本（比较前已 trim + 小写）
const ZERO_TOKENS: [&str; 5] = ["", "-", "traces", "<", "nd"];

/// 严格模式下的数值解析失败
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("valeur numérique invalide '{raw}'")]
pub struct NumericParseError {
    pub raw: String,
}

pub struct DataCleaner;

impl DataCleanerTrait for DataCleaner {
    fn parse_numeric(&self, raw: &str, policy: NumericPolicy) -> Result<f64, NumericParseError> {
        parse_numeric_value(raw, policy)
    }
}

/// 标签标准化: 小写、去重音、压缩空白
///
/// 表头、别名、分类均使用同一规则，保证比较对称
pub fn normalize_label(value: &str) -> String {
    let mut folded = String::with_capacity(value.len());
    for c in value.to_lowercase().chars() {
        match fold_accent(c) {
            Some(replacement) => folded.push_str(replacement),
            None => folded.push(c),
        }
    }
    folded.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// 法语常见带重音字符 → ASCII
fn fold_accent(c: char) -> Option<&'static str> {
    let replacement = match c {
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' => "a",
        'ç' => "c",
        'è' | 'é' | 'ê' | 'ë' => "e",
        'ì' | 'í' | 'î' | 'ï' => "i",
        'ñ' => "n",
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' => "o",
        'ù' | 'ú' | 'û' | 'ü' => "u",
        'ý' | 'ÿ' => "y",
        'œ' => "oe",
        'æ' => "ae",
        _ => return None,
    };
    Some(replacement)
}

/// 解析营养素数值
///
/// # 规则
/// 1. "" / "-" / "traces" / "<" / "nd" → 0
/// 2. 逗号 → 点号，仅保留数字、点号、负号
/// 3. 整体解析，不取前缀（"5-"、"1.2.3" 视为无法解析）: Lenient → 0，Strict → Err
/// 4. 截断到 [-999999, 999999]，保留两位小数
pub fn parse_numeric_value(raw: &str, policy: NumericPolicy) -> Result<f64, NumericParseError> {
    let trimmed = raw.trim();
    if ZERO_TOKENS.contains(&trimmed.to_lowercase().as_str()) {
        return Ok(0.0);
    }

    let cleaned: String = trimmed
        .replace(',', ".")
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect();

    let value = match cleaned.parse::<f64>() {
        Ok(v) if v.is_finite() => v,
        _ => {
            return match policy {
                NumericPolicy::Lenient => Ok(0.0),
                NumericPolicy::Strict => Err(NumericParseError {
                    raw: trimmed.to_string(),
                }),
            }
        }
    };

    Ok(round2(value.clamp(-NUMERIC_LIMIT, NUMERIC_LIMIT)))
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
