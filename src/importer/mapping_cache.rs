// ==========================================
// 食物库导入器 - 映射表缓存
// ==========================================
// 职责: 列名别名表 / 分类映射表的带有效期缓存
// 策略: 过期后下次读取时刷新；读取失败使用内置映射且不写入缓存
// 并发: 检查与写入各自短暂持锁，刷新期间不持锁
//       并发刷新可能重复读取参考表，结果一致
// ==========================================

use crate::importer::category_mapper::CategoryMapper;
use crate::importer::field_mapper::ColumnMapper;
use crate::repository::mapping_repo::MappingRepository;
use chrono::{DateTime, Duration, Utc};
use std::sync::{Arc, Mutex};
use tracing::{debug, warn};

// ==========================================
// Clock - 时间源
// ==========================================
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// 手动推进的时钟（测试用）
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    pub fn advance(&self, by: Duration) {
        if let Ok(mut now) = self.now.lock() {
            *now += by;
        }
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        match self.now.lock() {
            Ok(now) => *now,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }
}

// ==========================================
// RefreshPolicy - 刷新策略
// ==========================================
// 有效期上限: 一年
const MAX_TTL_SECS: i64 = 365 * 24 * 3600;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshPolicy {
    pub ttl: Duration,
}

impl RefreshPolicy {
    pub fn from_secs(secs: u64) -> Self {
        let secs = i64::try_from(secs).unwrap_or(MAX_TTL_SECS).min(MAX_TTL_SECS);
        Self {
            ttl: Duration::seconds(secs),
        }
    }
}

// ==========================================
// TimedCache - 单值带有效期缓存
// ==========================================
struct CacheEntry<T> {
    value: T,
    fetched_at: DateTime<Utc>,
}

pub struct TimedCache<T: Clone> {
    slot: Mutex<Option<CacheEntry<T>>>,
    policy: RefreshPolicy,
    clock: Arc<dyn Clock>,
}

impl<T: Clone> TimedCache<T> {
    pub fn new(policy: RefreshPolicy, clock: Arc<dyn Clock>) -> Self {
        Self {
            slot: Mutex::new(None),
            policy,
            clock,
        }
    }

    /// 未过期时返回缓存值
    pub fn get_fresh(&self) -> Option<T> {
        let now = self.clock.now();
        let slot = self.slot.lock().ok()?;
        let value = slot
            .as_ref()
            .filter(|entry| now - entry.fetched_at < self.policy.ttl)
            .map(|entry| entry.value.clone());
        value
    }

    pub fn store(&self, value: T) {
        let fetched_at = self.clock.now();
        if let Ok(mut slot) = self.slot.lock() {
            *slot = Some(CacheEntry { value, fetched_at });
        }
    }

    pub fn invalidate(&self) {
        if let Ok(mut slot) = self.slot.lock() {
            *slot = None;
        }
    }
}

// ==========================================
// MappingCache - 映射表缓存
// ==========================================
// 通过 Arc 在多个导入器之间共享
pub struct MappingCache<M: MappingRepository> {
    repo: M,
    columns: TimedCache<Arc<ColumnMapper>>,
    categories: TimedCache<Arc<CategoryMapper>>,
}

impl<M: MappingRepository> MappingCache<M> {
    pub fn new(repo: M, policy: RefreshPolicy) -> Self {
        Self::with_clock(repo, policy, Arc::new(SystemClock))
    }

    pub fn with_clock(repo: M, policy: RefreshPolicy, clock: Arc<dyn Clock>) -> Self {
        Self {
            repo,
            columns: TimedCache::new(policy, clock.clone()),
            categories: TimedCache::new(policy, clock),
        }
    }

    /// 获取列映射器
    ///
    /// 缓存有效 → 直接返回；否则读取参考表
    /// 参考表读取失败 → 内置别名（不缓存，下次重试）
    pub async fn column_mapper(&self) -> Arc<ColumnMapper> {
        if let Some(mapper) = self.columns.get_fresh() {
            return mapper;
        }

        match self.repo.fetch_column_aliases().await {
            Ok(table) => {
                debug!(fields = table.len(), "列名别名表已刷新");
                let mapper = Arc::new(ColumnMapper::new(table));
                self.columns.store(mapper.clone());
                mapper
            }
            Err(e) => {
                warn!(error = %e, "列名别名表读取失败，使用内置别名");
                Arc::new(ColumnMapper::with_defaults())
            }
        }
    }

    /// 获取分类映射器
    ///
    /// 参考表为空或读取失败 → 内置映射表（不缓存）
    pub async fn category_mapper(&self) -> Arc<CategoryMapper> {
        if let Some(mapper) = self.categories.get_fresh() {
            return mapper;
        }

        match self.repo.fetch_category_mappings().await {
            Ok(table) if !table.is_empty() => {
                debug!(entries = table.len(), "分类映射表已刷新");
                let mapper = Arc::new(CategoryMapper::new(table));
                self.categories.store(mapper.clone());
                mapper
            }
            Ok(_) => {
                debug!("分类映射表为空，使用内置映射");
                Arc::new(CategoryMapper::with_defaults())
            }
            Err(e) => {
                warn!(error = %e, "分类映射表读取失败，使用内置映射");
                Arc::new(CategoryMapper::with_defaults())
            }
        }
    }

    /// 清空两张表的缓存（参考表被修改后调用）
    pub fn invalidate_all(&self) {
        self.columns.invalidate();
        self.categories.invalidate();
    }
}
