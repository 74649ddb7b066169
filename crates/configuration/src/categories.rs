use serde::{Deserialize, Serialize};

/// Parent assigned to a product/service label that no rule matches.
pub const FALLBACK_CATEGORY: &str = "其它";

/// One entry of the ordered category rule table.
///
/// A label belongs to `parent` if its normalized text contains any of the
/// normalized `keywords`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRule {
    pub parent: String,
    pub keywords: Vec<String>,
}

impl CategoryRule {
    pub fn new(parent: &str, keywords: &[&str]) -> Self {
        Self {
            parent: parent.to_string(),
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
        }
    }
}

/// Settings for the category inference engine.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CategorySettings {
    /// Parent used when no rule matches.
    pub fallback: String,
    /// Evaluated top to bottom, first match wins.
    pub rules: Vec<CategoryRule>,
}

impl Default for CategorySettings {
    fn default() -> Self {
        Self {
            fallback: FALLBACK_CATEGORY.to_string(),
            rules: default_rules(),
        }
    }
}

/// The built-in rule table for energy-storage product labels.
///
/// Order matters. Narrow categories come before broad ones that share tokens:
/// battery recycling precedes electrochemical storage, and the chemical rule
/// precedes the thermal one so that "合成甲烷" is not read as heat storage.
pub fn default_rules() -> Vec<CategoryRule> {
    vec![
        CategoryRule::new(
            "電池循環經濟",
            &["二次生命電池", "電池回收", "回收再利用", "循環經濟", "電池循環", "電池再利用"],
        ),
        CategoryRule::new(
            "儲能系統整合",
            &[
                "儲能專案開發與營運商",
                "儲能專案開發",
                "儲能專案營運",
                "專案開發與營運",
                "專案開發營運商",
                "專案營運",
            ],
        ),
        CategoryRule::new(
            "儲能系統整合",
            &["系統整合", "儲能系統整合", "系統集成", "系統整合服務"],
        ),
        CategoryRule::new(
            "設備供應安裝",
            &["設備供應安裝", "EPC", "設備安裝", "工程總承包", "設備供應"],
        ),
        CategoryRule::new(
            "電化學儲能",
            &[
                "鋰離子電池",
                "鋰硫電池",
                "鈉離子電池",
                "金屬空氣電池",
                "固態電池",
                "液流電池",
                "超級電容",
                "電化學儲能",
                "鋰電池",
                "鈉電池",
            ],
        ),
        CategoryRule::new(
            "機械儲能",
            &[
                "重力儲能",
                "飛輪儲能",
                "抽蓄水力",
                "抽蓄水力儲能",
                "壓縮空氣儲能",
                "空氣儲能",
                "飛輪",
                "抽蓄",
                "重力",
            ],
        ),
        CategoryRule::new(
            "化學儲能",
            &["綠氨", "電轉氫", "Power-to-Hydrogen", "電轉氣", "合成甲烷", "甲烷儲能", "氫能儲能"],
        ),
        CategoryRule::new(
            "熱能儲能",
            &[
                "熱化學儲能",
                "顯熱儲能",
                "潛熱儲能",
                "固態熱電池",
                "熱能儲能",
                "地壓地熱儲能",
                "地熱儲能",
            ],
        ),
        CategoryRule::new("電磁儲能", &["電磁儲能", "超導磁儲能", "超導儲能"]),
    ]
}
