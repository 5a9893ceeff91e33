//! 分類・評価の型定義
//!
//! CLIと評価ハーネスで共有される型:
//! - Item: 分類対象の明細（入力）
//! - TestCase / TestItem: 正解ラベル付きテストケース
//! - ModelOutput: LLMが返すカテゴリ別の明細（検証はしない）

use crate::category::Category;
use serde::{Deserialize, Deserializer, Serialize};

/// 分類対象の明細
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient::opt_number")]
    pub qty: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient::opt_string")]
    pub unit: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient::opt_number")]
    pub price: Option<f64>,
}

impl Item {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }
}

/// 正解カテゴリ付きの明細
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TestItem {
    #[serde(flatten)]
    pub item: Item,

    #[serde(default)]
    pub expected_category: Category,
}

impl TestItem {
    pub fn new(name: impl Into<String>, expected: Category) -> Self {
        Self {
            item: Item::named(name),
            expected_category: expected,
        }
    }
}

/// テストケース（正解ラベル付きの明細バッチ）
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TestCase {
    pub id: String,
    #[serde(default)]
    pub items: Vec<TestItem>,
}

impl TestCase {
    /// 分類リクエスト用の明細（正解ラベルは含めない）
    pub fn input_items(&self) -> Vec<Item> {
        self.items.iter().map(|t| t.item.clone()).collect()
    }
}

/// LLM出力中の明細
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputItem {
    #[serde(deserialize_with = "lenient::string")]
    pub name: String,
    #[serde(deserialize_with = "lenient::number")]
    pub qty: f64,
    #[serde(deserialize_with = "lenient::string")]
    pub unit: String,
    #[serde(deserialize_with = "lenient::number")]
    pub price: f64,
}

/// LLM出力のカテゴリグループ
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CategoryGroup {
    /// カテゴリ名（集合外の値もそのまま保持）
    #[serde(deserialize_with = "lenient::group_name")]
    pub name: String,
    #[serde(deserialize_with = "lenient::vec")]
    pub items: Vec<OutputItem>,
    #[serde(deserialize_with = "lenient::number")]
    pub subtotal: f64,
}

impl Default for CategoryGroup {
    fn default() -> Self {
        Self {
            name: Category::Other.as_str().to_string(),
            items: Vec::new(),
            subtotal: 0.0,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Totals {
    #[serde(deserialize_with = "lenient::number")]
    pub grand_total: f64,
}

/// LLMの分類結果
///
/// 小計・合計はモデルの申告値をそのまま受け入れる。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelOutput {
    #[serde(deserialize_with = "lenient::vec")]
    pub categories: Vec<CategoryGroup>,
    pub totals: Totals,
}

impl ModelOutput {
    /// 修復不能時の既定値（カテゴリなし・合計0）
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn item_count(&self) -> usize {
        self.categories.iter().map(|c| c.items.len()).sum()
    }
}

/// LLM出力の型揺れ（数値が文字列、null 等）を吸収するデシリアライザ
mod lenient {
    use super::*;
    use serde_json::Value;

    fn value_to_number(value: &Value) -> Option<f64> {
        match value {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            _ => None,
        }
    }

    fn value_to_string(value: Value) -> Option<String> {
        match value {
            Value::String(s) => Some(s),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }

    pub fn number<'de, D: Deserializer<'de>>(d: D) -> Result<f64, D::Error> {
        let value = Value::deserialize(d)?;
        Ok(value_to_number(&value).unwrap_or(0.0))
    }

    pub fn opt_number<'de, D: Deserializer<'de>>(d: D) -> Result<Option<f64>, D::Error> {
        let value = Value::deserialize(d)?;
        Ok(value_to_number(&value))
    }

    pub fn string<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
        let value = Value::deserialize(d)?;
        Ok(value_to_string(value).unwrap_or_default())
    }

    pub fn opt_string<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
        let value = Value::deserialize(d)?;
        Ok(value_to_string(value))
    }

    /// null のリストは空として扱う
    pub fn vec<'de, D, T>(d: D) -> Result<Vec<T>, D::Error>
    where
        D: Deserializer<'de>,
        T: Deserialize<'de>,
    {
        Ok(Option::<Vec<T>>::deserialize(d)?.unwrap_or_default())
    }

    pub fn group_name<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
        let value = Value::deserialize(d)?;
        Ok(value_to_string(value).unwrap_or_else(|| Category::Other.as_str().to_string()))
    }
}
