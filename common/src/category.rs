//! 食料品カテゴリ（閉じた分類体系）

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 分類先カテゴリ
///
/// 並び順は表示用のみ。モデル出力の文字列はこの集合に含まれない場合がある。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Category {
    Dairy,
    Bakery,
    Produce,
    Pulses,
    Grains,
    Flour,
    Household,
    Protein,
    Beverages,
    Spices,
    Sweeteners,
    Essentials,
    Oils,
    Snacks,
    #[default]
    Other,
}

impl Category {
    /// 全カテゴリ（表示順）
    pub const ALL: [Category; 15] = [
        Category::Dairy,
        Category::Bakery,
        Category::Produce,
        Category::Pulses,
        Category::Grains,
        Category::Flour,
        Category::Household,
        Category::Protein,
        Category::Beverages,
        Category::Spices,
        Category::Sweeteners,
        Category::Essentials,
        Category::Oils,
        Category::Snacks,
        Category::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Dairy => "Dairy",
            Category::Bakery => "Bakery",
            Category::Produce => "Produce",
            Category::Pulses => "Pulses",
            Category::Grains => "Grains",
            Category::Flour => "Flour",
            Category::Household => "Household",
            Category::Protein => "Protein",
            Category::Beverages => "Beverages",
            Category::Spices => "Spices",
            Category::Sweeteners => "Sweeteners",
            Category::Essentials => "Essentials",
            Category::Oils => "Oils",
            Category::Snacks => "Snacks",
            Category::Other => "Other",
        }
    }

    /// 確定的なカテゴリか（集合内かつ Other 以外）
    pub fn is_confident(name: &str) -> bool {
        matches!(name.parse::<Category>(), Ok(c) if c != Category::Other)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    /// 完全一致（大文字小文字を区別）
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .iter()
            .copied()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| format!("Unknown category: {}", s))
    }
}
