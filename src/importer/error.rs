// ==========================================
// 食物库导入器 - 导入模块错误类型
// ==========================================
// 工具: thiserror 派生宏
// 说明: 此处仅为致命错误（中止整个导入）
//       行级错误见 domain::food::ImportRowError
// ==========================================

use crate::repository::RepositoryError;
use thiserror::Error;

/// 导入模块错误类型
#[derive(Error, Debug)]
pub enum ImportError {
    // ===== 文件相关错误 =====
    #[error("Fichier introuvable: {0}")]
    FileNotFound(String),

    #[error("Format de fichier non supporté: {0} (seuls .csv/.txt sont acceptés)")]
    UnsupportedFormat(String),

    #[error("Lecture du fichier impossible: {0}")]
    FileReadError(String),

    #[error("Fichier vide ou invalide")]
    EmptyFile,

    // ===== 列映射错误 =====
    #[error("Colonne du nom introuvable. En-têtes disponibles: {}", .headers.join(", "))]
    NameColumnMissing { headers: Vec<String> },

    // ===== 配置错误 =====
    #[error("Lecture de la configuration impossible (key: {key}): {message}")]
    ConfigReadError { key: String, message: String },

    #[error("Valeur de configuration invalide (key: {key}, value: {value}): {message}")]
    ConfigValueError {
        key: String,
        value: String,
        message: String,
    },

    // ===== 数据库错误 =====
    #[error("Erreur base de données: {0}")]
    Repository(#[from] RepositoryError),

    // ===== 通用错误 =====
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// 实现 From<std::io::Error>
impl From<std::io::Error> for ImportError {
    fn from(err: std::io::Error) -> Self {
        ImportError::FileReadError(err.to_string())
    }
}

// 实现 From<csv::Error>
impl From<csv::Error> for ImportError {
    fn from(err: csv::Error) -> Self {
        ImportError::FileReadError(err.to_string())
    }
}

/// Result 类型别名
pub type ImportResult<T> = Result<T, ImportError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_column_missing_lists_headers() {
        let err = ImportError::NameColumnMissing {
            headers: vec!["kcal".to_string(), "proteines".to_string()],
        };
        let msg = err.to_string();
        assert!(msg.contains("kcal, proteines"));
    }

    #[test]
    fn test_empty_file_message() {
        assert_eq!(ImportError::EmptyFile.to_string(), "Fichier vide ou invalide");
    }
}
