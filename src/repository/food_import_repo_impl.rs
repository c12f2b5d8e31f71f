// ==========================================
// 食物库导入器 - 食物导入 Repository 实现
// ==========================================
// 职责: 实现导入相关数据访问（使用 rusqlite）
// 红线: Repository 不含业务规则，只做数据 CRUD
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::food::{FoodRecord, ImportBatch};
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::food_import_repo::FoodImportRepository;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row, Transaction};
use std::sync::{Arc, Mutex, MutexGuard};
use uuid::Uuid;

const INSERT_FOOD_SQL: &str = r#"
    INSERT INTO foods (
        food_id, name, category, calories, protein, carbs, fat, fiber,
        calcium, iron, magnesium, potassium, sodium, vitamin_c, vitamin_d, salt,
        import_batch_id, created_at
    ) VALUES (
        ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18
    )
"#;

// ==========================================
// FoodImportRepositoryImpl
// ==========================================
pub struct FoodImportRepositoryImpl {
    conn: Arc<Mutex<Connection>>,
}

impl FoodImportRepositoryImpl {
    /// 创建新的 Repository 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建（与 MappingRepositoryImpl / ConfigManager 共享连接）
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 在事务中批量插入食物
    fn insert_foods_tx(
        tx: &Transaction,
        batch_id: &str,
        foods: &[FoodRecord],
    ) -> RepositoryResult<usize> {
        let mut stmt = tx.prepare(INSERT_FOOD_SQL)?;
        let created_at = Utc::now().to_rfc3339();

        let mut count = 0;
        for food in foods {
            stmt.execute(params![
                Uuid::new_v4().to_string(),
                food.name,
                food.category,
                food.calories,
                food.protein,
                food.carbs,
                food.fat,
                food.fiber,
                food.calcium,
                food.iron,
                food.magnesium,
                food.potassium,
                food.sodium,
                food.vitamin_c,
                food.vitamin_d,
                food.salt,
                batch_id,
                created_at,
            ])?;
            count += 1;
        }

        Ok(count)
    }

    fn map_food_row(row: &Row) -> rusqlite::Result<FoodRecord> {
        Ok(FoodRecord {
            name: row.get(0)?,
            category: row.get(1)?,
            calories: row.get(2)?,
            protein: row.get(3)?,
            carbs: row.get(4)?,
            fat: row.get(5)?,
            fiber: row.get(6)?,
            calcium: row.get(7)?,
            iron: row.get(8)?,
            magnesium: row.get(9)?,
            potassium: row.get(10)?,
            sodium: row.get(11)?,
            vitamin_c: row.get(12)?,
            vitamin_d: row.get(13)?,
            salt: row.get(14)?,
        })
    }

    fn parse_timestamp(raw: &str) -> RepositoryResult<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(raw)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| RepositoryError::FieldValueError {
                field: "imported_at".to_string(),
                message: format!("{}: {}", raw, e),
            })
    }
}

#[async_trait]
impl FoodImportRepository for FoodImportRepositoryImpl {
    /// 批量插入食物（事务化）
    async fn insert_food_batch(
        &self,
        batch_id: &str,
        foods: &[FoodRecord],
    ) -> RepositoryResult<usize> {
        if foods.is_empty() {
            return Ok(0);
        }

        let conn = self.get_conn()?;
        let tx = conn.unchecked_transaction()?;

        // 出错时 tx 被 drop，自动回滚
        let count = Self::insert_foods_tx(&tx, batch_id, foods)?;

        tx.commit()?;
        Ok(count)
    }

    async fn insert_food(&self, batch_id: &str, food: &FoodRecord) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let tx = conn.unchecked_transaction()?;
        Self::insert_foods_tx(&tx, batch_id, std::slice::from_ref(food))?;
        tx.commit()?;
        Ok(())
    }

    async fn count_foods(&self) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM foods", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    async fn find_food_by_name(&self, name: &str) -> RepositoryResult<Option<FoodRecord>> {
        let conn = self.get_conn()?;
        let food = conn
            .query_row(
                r#"
                SELECT name, category, calories, protein, carbs, fat, fiber,
                       calcium, iron, magnesium, potassium, sodium, vitamin_c, vitamin_d, salt
                FROM foods WHERE name = ?1
                "#,
                params![name],
                Self::map_food_row,
            )
            .optional()?;
        Ok(food)
    }

    async fn insert_import_batch(&self, batch: &ImportBatch) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO import_batch (
                batch_id, file_name, total_rows, success_rows, error_rows,
                imported_at, elapsed_ms, errors_json
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
            params![
                batch.batch_id,
                batch.file_name,
                batch.total_rows,
                batch.success_rows,
                batch.error_rows,
                batch.imported_at.to_rfc3339(),
                batch.elapsed_ms,
                batch.errors_json,
            ],
        )?;
        Ok(())
    }

    async fn get_recent_batches(&self, limit: usize) -> RepositoryResult<Vec<ImportBatch>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT batch_id, file_name, total_rows, success_rows, error_rows,
                   imported_at, elapsed_ms, errors_json
            FROM import_batch
            ORDER BY imported_at DESC
            LIMIT ?1
            "#,
        )?;

        let rows = stmt.query_map(params![limit as i64], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, Option<String>>(1)?,
                row.get::<_, i64>(2)?,
                row.get::<_, i64>(3)?,
                row.get::<_, i64>(4)?,
                row.get::<_, String>(5)?,
                row.get::<_, i64>(6)?,
                row.get::<_, Option<String>>(7)?,
            ))
        })?;

        let mut batches = Vec::new();
        for row in rows {
            let (batch_id, file_name, total, success, errors, imported_at, elapsed, json) = row?;
            batches.push(ImportBatch {
                batch_id,
                file_name,
                total_rows: total,
                success_rows: success,
                error_rows: errors,
                imported_at: Self::parse_timestamp(&imported_at)?,
                elapsed_ms: elapsed,
                errors_json: json,
            });
        }

        Ok(batches)
    }
}
