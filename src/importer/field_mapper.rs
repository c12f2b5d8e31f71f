// ==========================================
// 食物库导入器 - 表头列映射实现
// ==========================================
// 职责: 将表头单元格解析为各字段的列下标
// 匹配: 标准化后（小写/去重音/压缩空白）精确相等
// 别名来源: 参考表（缓存）优先，缺失字段使用内置别名
// ==========================================

use crate::domain::food::ColumnMapping;
use crate::domain::types::FieldKind;
use crate::importer::data_cleaner::normalize_label;
use crate::importer::error::{ImportError, ImportResult};
use std::collections::HashMap;
use tracing::debug;

// ==========================================
// 内置别名（法/英同义词 + CIQUAL 表头）
// ==========================================
fn builtin_aliases(kind: FieldKind) -> &'static [&'static str] {
    match kind {
        FieldKind::Name => &[
            "nom",
            "name",
            "aliment",
            "nom aliment",
            "nom de l'aliment",
            "food",
            "food name",
            "libelle",
            "alim_nom_fr",
            "alim_nom_eng",
        ],
        FieldKind::Category => &[
            "categorie",
            "category",
            "groupe",
            "famille",
            "type",
            "alim_grp_nom_fr",
            "alim_ssgrp_nom_fr",
        ],
        FieldKind::Calories => &[
            "kcal",
            "calories",
            "energie",
            "energie (kcal)",
            "energie (kcal/100 g)",
            "energy",
            "energie, reglement ue n° 1169/2011 (kcal/100 g)",
            "energie, n x facteur jones, avec fibres (kcal/100 g)",
        ],
        FieldKind::Protein => &[
            "proteines",
            "protein",
            "proteins",
            "proteines (g)",
            "proteines (g/100 g)",
            "proteines, n x facteur de jones (g/100 g)",
            "proteines, n x 6.25 (g/100 g)",
        ],
        FieldKind::Carbs => &[
            "glucides",
            "carbs",
            "carbohydrates",
            "glucides (g)",
            "glucides (g/100 g)",
        ],
        FieldKind::Fat => &[
            "lipides",
            "fat",
            "graisses",
            "matieres grasses",
            "lipides (g)",
            "lipides (g/100 g)",
        ],
        FieldKind::Fiber => &[
            "fibres",
            "fiber",
            "fibre",
            "fibres (g)",
            "fibres alimentaires (g/100 g)",
        ],
        FieldKind::Calcium => &["calcium", "calcium (mg)", "calcium (mg/100 g)"],
        FieldKind::Iron => &["fer", "iron", "fer (mg)", "fer (mg/100 g)"],
        FieldKind::Magnesium => &["magnesium", "magnesium (mg)", "magnesium (mg/100 g)"],
        FieldKind::Potassium => &["potassium", "potassium (mg)", "potassium (mg/100 g)"],
        FieldKind::Sodium => &["sodium", "sodium (mg)", "sodium (mg/100 g)"],
        FieldKind::VitaminC => &[
            "vitamine c",
            "vitamin c",
            "vit c",
            "vitamine c (mg)",
            "vitamine c (mg/100 g)",
        ],
        FieldKind::VitaminD => &[
            "vitamine d",
            "vitamin d",
            "vit d",
            "vitamine d (µg)",
            "vitamine d (µg/100 g)",
        ],
        FieldKind::Salt => &[
            "sel",
            "salt",
            "sel (g)",
            "sel chlorure de sodium (g/100 g)",
        ],
    }
}

// ==========================================
// ColumnMapper
// ==========================================
// 构建后只读；别名均已标准化
#[derive(Debug, Clone)]
pub struct ColumnMapper {
    aliases: HashMap<FieldKind, Vec<String>>,
}

impl ColumnMapper {
    /// 使用内置别名构建
    pub fn with_defaults() -> Self {
        Self::new(HashMap::new())
    }

    /// 以参考表别名构建
    ///
    /// 参考表中存在的字段整体替换内置别名，不存在的字段回退到内置别名
    pub fn new(table: HashMap<FieldKind, Vec<String>>) -> Self {
        let mut aliases = HashMap::with_capacity(FieldKind::ALL.len());
        for kind in FieldKind::ALL {
            let variants: Vec<String> = match table.get(&kind) {
                Some(list) if !list.is_empty() => list.iter().map(|v| normalize_label(v)).collect(),
                _ => builtin_aliases(kind)
                    .iter()
                    .map(|v| normalize_label(v))
                    .collect(),
            };
            aliases.insert(kind, variants);
        }
        Self { aliases }
    }

    /// 某字段的已标准化别名
    pub fn variants(&self, kind: FieldKind) -> &[String] {
        self.aliases.get(&kind).map(Vec::as_slice).unwrap_or(&[])
    }

    /// 在已标准化的表头中查找字段列下标
    ///
    /// 返回第一个匹配任一别名的表头单元格
    pub fn find_column(&self, normalized_headers: &[String], kind: FieldKind) -> Option<usize> {
        let variants = self.variants(kind);
        normalized_headers
            .iter()
            .position(|header| variants.iter().any(|v| v == header))
    }

    /// 解析完整表头
    ///
    /// # 返回
    /// - Ok(ColumnMapping): 各字段列下标
    /// - Err(NameColumnMissing): 名称列无法识别（列出原始表头）
    pub fn map_headers(&self, headers: &[String]) -> ImportResult<ColumnMapping> {
        self.resolve_headers(headers).map(|(mapping, _)| mapping)
    }

    /// 解析完整表头，同时返回名称列下标
    pub fn resolve_headers(&self, headers: &[String]) -> ImportResult<(ColumnMapping, usize)> {
        let normalized: Vec<String> = headers.iter().map(|h| normalize_label(h)).collect();

        let name_idx = self
            .find_column(&normalized, FieldKind::Name)
            .ok_or_else(|| ImportError::NameColumnMissing {
                headers: headers.to_vec(),
            })?;

        let mut mapping = ColumnMapping::default();
        for kind in FieldKind::ALL {
            mapping.set(kind, self.find_column(&normalized, kind));
        }

        debug!(
            resolved = mapping.resolved_count(),
            headers = headers.len(),
            "表头映射完成"
        );
        Ok((mapping, name_idx))
    }
}

impl Default for ColumnMapper {
    fn default() -> Self {
        Self::with_defaults()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_map_simple_french_headers() {
        let mapper = ColumnMapper::with_defaults();
        let mapping = mapper.map_headers(&headers(&["nom", "kcal", "proteines"])).unwrap();

        assert_eq!(mapping.name, Some(0));
        assert_eq!(mapping.calories, Some(1));
        assert_eq!(mapping.protein, Some(2));
        assert_eq!(mapping.category, None);
        assert_eq!(mapping.salt, None);
    }

    #[test]
    fn test_match_is_case_and_accent_insensitive() {
        let mapper = ColumnMapper::with_defaults();
        let mapping = mapper
            .map_headers(&headers(&[
                "NOM",
                "Catégorie",
                "Protéines",
                "Magnésium",
                "Vitamine  C",
            ]))
            .unwrap();

        assert_eq!(mapping.name, Some(0));
        assert_eq!(mapping.category, Some(1));
        assert_eq!(mapping.protein, Some(2));
        assert_eq!(mapping.magnesium, Some(3));
        assert_eq!(mapping.vitamin_c, Some(4));
    }

    #[test]
    fn test_ciqual_headers() {
        let mapper = ColumnMapper::with_defaults();
        let mapping = mapper
            .map_headers(&headers(&[
                "alim_grp_nom_fr",
                "alim_nom_fr",
                "Energie, Règlement UE N° 1169/2011 (kcal/100 g)",
                "Protéines, N x facteur de Jones (g/100 g)",
                "Sel chlorure de sodium (g/100 g)",
            ]))
            .unwrap();

        assert_eq!(mapping.category, Some(0));
        assert_eq!(mapping.name, Some(1));
        assert_eq!(mapping.calories, Some(2));
        assert_eq!(mapping.protein, Some(3));
        assert_eq!(mapping.salt, Some(4));
    }

    #[test]
    fn test_first_matching_header_wins() {
        let mapper = ColumnMapper::with_defaults();
        let (mapping, name_idx) = mapper.resolve_headers(&headers(&["name", "nom"])).unwrap();
        assert_eq!(name_idx, 0);
        assert_eq!(mapping.name, Some(0));
    }

    #[test]
    fn test_missing_name_column_lists_headers() {
        let mapper = ColumnMapper::with_defaults();
        let err = mapper.map_headers(&headers(&["kcal", "proteines"])).unwrap_err();

        match &err {
            ImportError::NameColumnMissing { headers } => {
                assert_eq!(headers, &vec!["kcal".to_string(), "proteines".to_string()]);
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert!(err.to_string().contains("kcal, proteines"));
    }

    #[test]
    fn test_table_aliases_replace_builtin_per_field() {
        let mut table = HashMap::new();
        table.insert(FieldKind::Name, vec!["Produit".to_string()]);
        let mapper = ColumnMapper::new(table);

        // name 只接受参考表别名
        assert!(mapper.map_headers(&headers(&["nom", "kcal"])).is_err());

        // 其余字段仍使用内置别名
        let mapping = mapper.map_headers(&headers(&["produit", "kcal"])).unwrap();
        assert_eq!(mapping.name, Some(0));
        assert_eq!(mapping.calories, Some(1));
    }
}
