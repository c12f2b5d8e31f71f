// ==========================================
// 食物库导入器 - 映射参考表 Repository
// ==========================================
// 职责: 读取/维护列名别名表与分类映射表
// 表: column_mappings(field_type, variant)
//     category_mappings(raw_category, category)
// ==========================================

use crate::domain::types::FieldKind;
use crate::repository::error::{RepositoryError, RepositoryResult};
use async_trait::async_trait;
use rusqlite::{params, Connection};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::warn;

// ==========================================
// MappingRepository Trait
// ==========================================
#[async_trait]
pub trait MappingRepository: Send + Sync {
    /// 读取列名别名表
    ///
    /// # 返回
    /// - HashMap<FieldKind, Vec<String>>: 字段 → 别名列表（原样，未标准化）
    async fn fetch_column_aliases(&self) -> RepositoryResult<HashMap<FieldKind, Vec<String>>>;

    /// 读取分类映射表
    ///
    /// # 返回
    /// - HashMap<String, String>: 原始分类 → 目标分类
    async fn fetch_category_mappings(&self) -> RepositoryResult<HashMap<String, String>>;

    /// 新增列名别名（已存在则忽略）
    async fn upsert_column_alias(&self, kind: FieldKind, variant: &str) -> RepositoryResult<()>;

    /// 新增或覆盖分类映射
    async fn upsert_category_mapping(&self, raw: &str, category: &str) -> RepositoryResult<()>;
}

// ==========================================
// MappingRepositoryImpl
// ==========================================
pub struct MappingRepositoryImpl {
    conn: Arc<Mutex<Connection>>,
}

impl MappingRepositoryImpl {
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }
}

#[async_trait]
impl MappingRepository for MappingRepositoryImpl {
    async fn fetch_column_aliases(&self) -> RepositoryResult<HashMap<FieldKind, Vec<String>>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            "SELECT field_type, variant FROM column_mappings ORDER BY field_type, rowid",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        let mut aliases: HashMap<FieldKind, Vec<String>> = HashMap::new();
        for row in rows {
            let (field_type, variant) = row?;
            match FieldKind::parse(&field_type) {
                Some(kind) => aliases.entry(kind).or_default().push(variant),
                None => warn!(field_type = %field_type, "未知列类型，忽略该别名"),
            }
        }

        Ok(aliases)
    }

    async fn fetch_category_mappings(&self) -> RepositoryResult<HashMap<String, String>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare("SELECT raw_category, category FROM category_mappings")?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        let mut mappings = HashMap::new();
        for row in rows {
            let (raw, category) = row?;
            mappings.insert(raw, category);
        }

        Ok(mappings)
    }

    async fn upsert_column_alias(&self, kind: FieldKind, variant: &str) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            "INSERT OR IGNORE INTO column_mappings (field_type, variant) VALUES (?1, ?2)",
            params![kind.as_str(), variant],
        )?;
        Ok(())
    }

    async fn upsert_category_mapping(&self, raw: &str, category: &str) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            "INSERT INTO category_mappings (raw_category, category) VALUES (?1, ?2)
             ON CONFLICT(raw_category) DO UPDATE SET category = ?2",
            params![raw, category],
        )?;
        Ok(())
    }
}
