// ==========================================
// 食物库导入器 - 分类映射实现
// ==========================================
// 职责: 自由文本分类 → 内置分类
// 顺序: 映射表精确匹配 → 关键词包含匹配 → snacks
// 红线: 永不失败
// ==========================================

use crate::domain::types::FoodCategory;
use crate::importer::data_cleaner::normalize_label;
use std::collections::HashMap;

// ==========================================
// 关键词规则（按顺序匹配，首个命中生效）
// ==========================================
// snacks 先于 beverages: "gateaux" 含 "eaux"
const KEYWORD_RULES: &[(FoodCategory, &[&str])] = &[
    (
        FoodCategory::Proteins,
        &[
            "viande",
            "poisson",
            "oeuf",
            "volaille",
            "charcuterie",
            "fruits de mer",
            "crustace",
            "mollusque",
        ],
    ),
    (FoodCategory::Vegetables, &["legume", "salade", "crudite"]),
    (FoodCategory::Fruits, &["fruit"]),
    (
        FoodCategory::Starches,
        &[
            "cereale",
            "pain",
            "pate",
            "riz",
            "feculent",
            "pomme de terre",
            "legumineuse",
        ],
    ),
    (
        FoodCategory::Dairy,
        &["lait", "fromage", "yaourt", "laitier", "creme"],
    ),
    (FoodCategory::Fats, &["huile", "beurre", "matiere grasse", "margarine"]),
    (
        FoodCategory::Snacks,
        &["sucre", "gateau", "biscuit", "confiserie", "chocolat", "dessert"],
    ),
    (FoodCategory::Beverages, &["boisson", "jus", "eaux", "eau", "soda", "cafe", "the"]),
];

/// 内置分类映射表（CIQUAL 主要分组）
pub fn default_category_table() -> HashMap<String, String> {
    let entries: [(&str, FoodCategory); 14] = [
        ("entrees et plats composes", FoodCategory::Snacks),
        ("fruits, legumes, legumineuses et oleagineux", FoodCategory::Vegetables),
        ("fruits", FoodCategory::Fruits),
        ("legumes", FoodCategory::Vegetables),
        ("produits cerealiers", FoodCategory::Starches),
        ("viandes, oeufs, poissons et assimiles", FoodCategory::Proteins),
        ("viandes cuites", FoodCategory::Proteins),
        ("poissons cuits", FoodCategory::Proteins),
        ("produits laitiers et assimiles", FoodCategory::Dairy),
        ("eaux et autres boissons", FoodCategory::Beverages),
        ("produits sucres", FoodCategory::Snacks),
        ("glaces et sorbets", FoodCategory::Snacks),
        ("matieres grasses", FoodCategory::Fats),
        ("aides culinaires et ingredients divers", FoodCategory::Snacks),
    ];
    entries
        .iter()
        .map(|(raw, category)| (raw.to_string(), category.as_str().to_string()))
        .collect()
}

// ==========================================
// CategoryMapper
// ==========================================
#[derive(Debug, Clone)]
pub struct CategoryMapper {
    table: HashMap<String, String>, // 标准化原始分类 → 目标分类
}

impl CategoryMapper {
    /// 以映射表构建（键统一标准化）
    pub fn new(table: HashMap<String, String>) -> Self {
        let table = table
            .into_iter()
            .map(|(raw, category)| (normalize_label(&raw), category.trim().to_string()))
            .filter(|(raw, category)| !raw.is_empty() && !category.is_empty())
            .collect();
        Self { table }
    }

    /// 使用内置映射表构建
    pub fn with_defaults() -> Self {
        Self::new(default_category_table())
    }

    /// 映射原始分类文本
    pub fn map_category(&self, raw: &str) -> String {
        let normalized = normalize_label(raw);
        if normalized.is_empty() {
            return FoodCategory::default().as_str().to_string();
        }

        if let Some(category) = self.table.get(&normalized) {
            return category.clone();
        }

        keyword_category(&normalized).as_str().to_string()
    }
}

impl Default for CategoryMapper {
    fn default() -> Self {
        Self::with_defaults()
    }
}

/// 关键词包含匹配（输入已标准化）
fn keyword_category(normalized: &str) -> FoodCategory {
    KEYWORD_RULES
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| contains_keyword(normalized, k)))
        .map(|(category, _)| *category)
        .unwrap_or_default()
}

// 短关键词（<= 3 字符）按整词匹配，避免 "the" 命中 "methode"
fn contains_keyword(text: &str, keyword: &str) -> bool {
    if keyword.chars().count() > 3 {
        return text.contains(keyword);
    }
    text.split(|c: char| !c.is_alphanumeric())
        .any(|word| word == keyword)
}
