// ==========================================
// 食物库导入器 - 领域类型定义
// ==========================================
// 职责: 字段类型、分隔符、食物分类、导入策略枚举
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// FieldKind - 可识别的列类型
// ==========================================
// name 为必填列，其余均可缺失
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Name,
    Category,
    Calories,
    Protein,
    Carbs,
    Fat,
    Fiber,
    Calcium,
    Iron,
    Magnesium,
    Potassium,
    Sodium,
    VitaminC,
    VitaminD,
    Salt,
}

impl FieldKind {
    /// 全部列类型（固定顺序）
    pub const ALL: [FieldKind; 15] = [
        FieldKind::Name,
        FieldKind::Category,
        FieldKind::Calories,
        FieldKind::Protein,
        FieldKind::Carbs,
        FieldKind::Fat,
        FieldKind::Fiber,
        FieldKind::Calcium,
        FieldKind::Iron,
        FieldKind::Magnesium,
        FieldKind::Potassium,
        FieldKind::Sodium,
        FieldKind::VitaminC,
        FieldKind::VitaminD,
        FieldKind::Salt,
    ];

    /// 营养素列（不含 name / category）
    pub const NUTRIENTS: [FieldKind; 13] = [
        FieldKind::Calories,
        FieldKind::Protein,
        FieldKind::Carbs,
        FieldKind::Fat,
        FieldKind::Fiber,
        FieldKind::Calcium,
        FieldKind::Iron,
        FieldKind::Magnesium,
        FieldKind::Potassium,
        FieldKind::Sodium,
        FieldKind::VitaminC,
        FieldKind::VitaminD,
        FieldKind::Salt,
    ];

    /// 数据库 / 映射表中使用的字段键
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldKind::Name => "name",
            FieldKind::Category => "category",
            FieldKind::Calories => "calories",
            FieldKind::Protein => "protein",
            FieldKind::Carbs => "carbs",
            FieldKind::Fat => "fat",
            FieldKind::Fiber => "fiber",
            FieldKind::Calcium => "calcium",
            FieldKind::Iron => "iron",
            FieldKind::Magnesium => "magnesium",
            FieldKind::Potassium => "potassium",
            FieldKind::Sodium => "sodium",
            FieldKind::VitaminC => "vitamin_c",
            FieldKind::VitaminD => "vitamin_d",
            FieldKind::Salt => "salt",
        }
    }

    /// 从字段键解析（未知键返回 None）
    pub fn parse(key: &str) -> Option<FieldKind> {
        let key = key.trim().to_lowercase();
        FieldKind::ALL.iter().copied().find(|k| k.as_str() == key)
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ==========================================
// Separator - 列分隔符
// ==========================================
// 候选顺序即平局时的优先顺序
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Separator {
    Tab,
    Semicolon,
    Comma,
}

impl Separator {
    pub const CANDIDATES: [Separator; 3] = [Separator::Tab, Separator::Semicolon, Separator::Comma];

    pub fn as_char(&self) -> char {
        match self {
            Separator::Tab => '\t',
            Separator::Semicolon => ';',
            Separator::Comma => ',',
        }
    }
}

// ==========================================
// FoodCategory - 内置食物分类
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FoodCategory {
    Proteins,
    Vegetables,
    Fruits,
    Starches,
    Dairy,
    Fats,
    Beverages,
    #[default]
    Snacks,
}

impl FoodCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            FoodCategory::Proteins => "proteins",
            FoodCategory::Vegetables => "vegetables",
            FoodCategory::Fruits => "fruits",
            FoodCategory::Starches => "starches",
            FoodCategory::Dairy => "dairy",
            FoodCategory::Fats => "fats",
            FoodCategory::Beverages => "beverages",
            FoodCategory::Snacks => "snacks",
        }
    }
}

// ==========================================
// NumericPolicy - 数值解析策略
// ==========================================
// Lenient: 无法解析的文本按 0 处理
// Strict: 无法解析的文本记为行级错误
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NumericPolicy {
    #[default]
    Lenient,
    Strict,
}

impl NumericPolicy {
    pub fn parse(value: &str) -> Option<NumericPolicy> {
        match value.trim().to_uppercase().as_str() {
            "LENIENT" => Some(NumericPolicy::Lenient),
            "STRICT" => Some(NumericPolicy::Strict),
            _ => None,
        }
    }
}

// ==========================================
// BatchFailurePolicy - 批量写入失败的归因策略
// ==========================================
// FailWholeBatch: 批次内所有记录共享同一错误
// RetryPerRow: 逐条重写，精确记录失败行
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BatchFailurePolicy {
    #[default]
    FailWholeBatch,
    RetryPerRow,
}

impl BatchFailurePolicy {
    pub fn parse(value: &str) -> Option<BatchFailurePolicy> {
        match value.trim().to_uppercase().as_str() {
            "FAIL_BATCH" | "FAIL_WHOLE_BATCH" => Some(BatchFailurePolicy::FailWholeBatch),
            "RETRY_PER_ROW" => Some(BatchFailurePolicy::RetryPerRow),
            _ => None,
        }
    }
}
