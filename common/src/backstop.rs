//! キーワード補正モジュール
//!
//! LLMが集合外のカテゴリや "Other" を返した明細に対し、
//! 品名のキーワードから決定的にカテゴリを補う。
//! 集合内の確定カテゴリは上書きしない。

use crate::category::Category;
use crate::error::{Error, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};

/// ルール定義（JSON入出力用）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleSpec {
    pub keywords: Vec<String>,
    pub category: Category,
}

/// コンパイル済みルール
#[derive(Debug, Clone)]
pub struct KeywordRule {
    pattern: Regex,
    category: Category,
}

impl KeywordRule {
    /// キーワード群から単語境界・大文字小文字無視のパターンを作る
    pub fn new(keywords: &[&str], category: Category) -> Result<Self> {
        let words: Vec<String> = keywords
            .iter()
            .map(|k| k.trim())
            .filter(|k| !k.is_empty())
            .map(regex::escape)
            .collect();
        if words.is_empty() {
            return Err(Error::InvalidRule(format!(
                "no keywords for category {}",
                category
            )));
        }
        let pattern = Regex::new(&format!(r"(?i)\b({})\b", words.join("|")))
            .map_err(|e| Error::InvalidRule(e.to_string()))?;
        Ok(Self { pattern, category })
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn matches(&self, item_name: &str) -> bool {
        self.pattern.is_match(item_name)
    }
}

/// 順序付きキーワードルール表（先に一致したルールが優先）
#[derive(Debug, Clone)]
pub struct KeywordBackstop {
    rules: Vec<KeywordRule>,
}

/// 組み込みルール（インドの食料品向け）
const DEFAULT_RULES: &[(&[&str], Category)] = &[
    (&["rice", "basmati"], Category::Grains),
    (&["atta", "flour", "maida"], Category::Flour),
    (
        &["paneer", "curd", "yogurt", "butter", "milk", "perugu", "dahi"],
        Category::Dairy,
    ),
    (
        &["dal", "toor", "masoor", "chana", "urad", "moong", "peas"],
        Category::Pulses,
    ),
    (
        &["tomato", "potato", "aloo", "banana", "apple", "onion"],
        Category::Produce,
    ),
    (&["detergent", "soap", "dishwash", "cleaner"], Category::Household),
    (&["oil", "sunflower", "mustard", "groundnut", "refined"], Category::Oils),
    (&["sugar", "jaggery", "gur"], Category::Sweeteners),
    (&["salt"], Category::Essentials),
    (&["biscuit", "namkeen", "chips", "snack"], Category::Snacks),
    (
        &["tea", "coffee", "cola", "juice", "tropicana", "soda"],
        Category::Beverages,
    ),
    (
        &["turmeric", "chilli", "cumin", "jeera", "coriander", "dhania"],
        Category::Spices,
    ),
];

impl Default for KeywordBackstop {
    fn default() -> Self {
        let rules = DEFAULT_RULES
            .iter()
            .map(|(keywords, category)| {
                KeywordRule::new(keywords, *category).expect("built-in rule must compile")
            })
            .collect();
        Self { rules }
    }
}

impl KeywordBackstop {
    /// ルール定義からルール表を構築
    pub fn from_specs(specs: &[RuleSpec]) -> Result<Self> {
        let rules = specs
            .iter()
            .map(|spec| {
                let keywords: Vec<&str> = spec.keywords.iter().map(String::as_str).collect();
                KeywordRule::new(&keywords, spec.category)
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { rules })
    }

    /// JSON文字列から読み込み
    pub fn from_json(json: &str) -> Result<Self> {
        let specs: Vec<RuleSpec> = serde_json::from_str(json)?;
        Self::from_specs(&specs)
    }

    /// JSONファイルから読み込み
    pub fn from_file(path: &std::path::Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn rules(&self) -> &[KeywordRule] {
        &self.rules
    }

    /// 品名に最初に一致したルールのカテゴリ
    pub fn lookup(&self, item_name: &str) -> Option<Category> {
        self.rules
            .iter()
            .find(|rule| rule.matches(item_name))
            .map(KeywordRule::category)
    }

    /// 予測カテゴリを補正する
    ///
    /// 予測が集合外または "Other" のときだけ生の品名でルールを評価し、
    /// 一致しなければ予測をそのまま返す。
    pub fn correct(&self, item_name: &str, predicted: &str) -> String {
        if Category::is_confident(predicted) {
            return predicted.to_string();
        }
        match self.lookup(item_name) {
            Some(category) => category.as_str().to_string(),
            None => predicted.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rescues_other_prediction() {
        let backstop = KeywordBackstop::default();
        assert_eq!(backstop.correct("Detergent Powder 1kg", "Other"), "Household");
    }

    #[test]
    fn test_rescues_out_of_set_prediction() {
        let backstop = KeywordBackstop::default();
        assert_eq!(backstop.correct("Aloo 1kg", "Vegetables"), "Produce");
        assert_eq!(backstop.correct("Perugu 500ml", ""), "Dairy");
    }

    #[test]
    fn test_keeps_confident_prediction() {
        let backstop = KeywordBackstop::default();
        assert_eq!(backstop.correct("Tomato 1kg", "Produce"), "Produce");
        // "Soap" は Household に一致するが、確定予測は上書きしない
        assert_eq!(backstop.correct("Neem Soap", "Protein"), "Protein");
    }

    #[test]
    fn test_no_match_returns_prediction_unchanged() {
        let backstop = KeywordBackstop::default();
        assert_eq!(backstop.correct("Unknown Widget", "Other"), "Other");
        assert_eq!(backstop.correct("Unknown Widget", "Gadgets"), "Gadgets");
    }

    #[test]
    fn test_first_rule_wins() {
        let backstop = KeywordBackstop::default();
        // rice(Grains) と flour(Flour) の両方に一致 → 先のルール
        assert_eq!(backstop.correct("Rice Flour 500g", "Other"), "Grains");
        // butter(Dairy) と biscuit(Snacks)
        assert_eq!(backstop.correct("Butter Biscuit", "Other"), "Dairy");
    }

    #[test]
    fn test_word_boundary_and_case() {
        let backstop = KeywordBackstop::default();
        assert_eq!(backstop.correct("BASMATI", "Other"), "Grains");
        // "teapot" は "tea" に単語境界で一致しない
        assert_eq!(backstop.correct("teapot", "Other"), "Other");
        // "oil" は "toilet" に一致しない
        assert_eq!(backstop.lookup("toilet paper"), None);
    }

    #[test]
    fn test_custom_rules_from_json() {
        let json = r#"[
            {"keywords": ["egg", "chicken"], "category": "Protein"},
            {"keywords": ["bread", "pav"], "category": "Bakery"}
        ]"#;
        let backstop = KeywordBackstop::from_json(json).unwrap();
        let categories: Vec<_> = backstop.rules().iter().map(KeywordRule::category).collect();
        assert_eq!(categories, vec![Category::Protein, Category::Bakery]);
        assert_eq!(backstop.correct("Chicken Curry Cut", "Other"), "Protein");
        assert_eq!(backstop.correct("Pav 6 pc", "Snacks"), "Snacks");
        assert_eq!(backstop.correct("Basmati Rice", "Other"), "Other");
    }

    #[test]
    fn test_custom_rule_keywords_are_escaped() {
        let json = r#"[{"keywords": ["c++"], "category": "Other"}, {"keywords": ["a.b"], "category": "Snacks"}]"#;
        let backstop = KeywordBackstop::from_json(json).unwrap();
        assert_eq!(backstop.lookup("axb"), None);
        assert_eq!(backstop.lookup("a.b"), Some(Category::Snacks));
    }

    #[test]
    fn test_rule_without_keywords_is_rejected() {
        let json = r#"[{"keywords": ["  "], "category": "Dairy"}]"#;
        let result = KeywordBackstop::from_json(json);
        assert!(matches!(result, Err(Error::InvalidRule(_))));
    }

    #[test]
    fn test_unknown_category_is_rejected() {
        let json = r#"[{"keywords": ["veg"], "category": "Vegetables"}]"#;
        assert!(KeywordBackstop::from_json(json).is_err());
    }
}
