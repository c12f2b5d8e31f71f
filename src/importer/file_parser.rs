// ==========================================
// 食物库导入器 - 文件解析器实现
// ==========================================
// 职责: 文件读取、按行切分、分隔符探测、单行拆分
// 支持: 分隔文本 (.csv / .txt)，分隔符 Tab / 分号 / 逗号
// ==========================================

use crate::domain::food::SourceLine;
use crate::domain::types::Separator;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::food_importer_trait::FileParser;
use std::path::Path;
use tracing::warn;

pub const SUPPORTED_EXTENSIONS: [&str; 2] = ["csv", "txt"];

const UTF8_BOM: char = '\u{feff}';

// ==========================================
// TextFileParser 实现
// ==========================================
pub struct TextFileParser;

impl FileParser for TextFileParser {
    fn read_to_text(&self, file_path: &Path) -> ImportResult<String> {
        // 检查文件存在
        if !file_path.exists() {
            return Err(ImportError::FileNotFound(file_path.display().to_string()));
        }

        // 检查扩展名
        let ext = file_path
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        if !SUPPORTED_EXTENSIONS.contains(&ext.as_str()) {
            return Err(ImportError::UnsupportedFormat(ext));
        }

        let bytes = std::fs::read(file_path)?;
        let text = match String::from_utf8(bytes) {
            Ok(text) => text,
            Err(e) => {
                // 非 UTF-8 文件按 Latin-1 逐字节解码
                warn!(
                    file = %file_path.display(),
                    "文件不是有效的 UTF-8，按 Latin-1 解码"
                );
                e.into_bytes().iter().map(|b| char::from(*b)).collect()
            }
        };

        Ok(text.trim_start_matches(UTF8_BOM).to_string())
    }
}

/// 按行切分并 trim，跳过空白行
///
/// 行号为原始文件行号（从 1 开始），空白行不占用新行号
pub fn split_lines(content: &str) -> Vec<SourceLine> {
    content
        .trim_start_matches(UTF8_BOM)
        .lines()
        .enumerate()
        .map(|(idx, line)| (idx + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty())
        .map(|(line_number, line)| SourceLine {
            line_number,
            text: line.to_string(),
        })
        .collect()
}

/// 探测表头行的分隔符
///
/// 出现次数最多者胜出；平局按 Tab > 分号 > 逗号
pub fn detect_separator(header_line: &str) -> Separator {
    let mut best = Separator::Tab;
    let mut best_count = 0;
    for candidate in Separator::CANDIDATES {
        let count = header_line.matches(candidate.as_char()).count();
        if count > best_count {
            best = candidate;
            best_count = count;
        }
    }
    best
}

/// 拆分单行
///
/// - 引号内的分隔符不拆分，引号字符保留到字段清理阶段
/// - 每个字段 trim，去掉首尾各一个双引号后再 trim
/// - 不处理 "" 转义
pub fn parse_line(line: &str, separator: Separator) -> Vec<String> {
    let sep = separator.as_char();
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;

    for c in line.chars() {
        if c == '"' {
            in_quotes = !in_quotes;
            current.push(c);
        } else if c == sep && !in_quotes {
            fields.push(clean_field(&current));
            current.clear();
        } else {
            current.push(c);
        }
    }
    fields.push(clean_field(&current));

    fields
}

fn clean_field(raw: &str) -> String {
    let trimmed = raw.trim();
    let trimmed = trimmed.strip_prefix('"').unwrap_or(trimmed);
    let trimmed = trimmed.strip_suffix('"').unwrap_or(trimmed);
    trimmed.trim().to_string()
}
