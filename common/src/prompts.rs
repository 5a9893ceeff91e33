//! プロンプト生成モジュール
//!
//! - PromptGuide: 対応表ヒントと few-shot 例（起動時に一度だけ構築）
//! - build_categorize_prompt: カテゴリ分類用プロンプト
//! - build_repair_prompt: 壊れたJSONの修復依頼プロンプト
//!
//! 同じ入力からは常にバイト単位で同じプロンプトを生成する
//! （タイムスタンプや順序の揺れを含めない）。

use crate::category::Category;
use crate::types::Item;

/// 表記揺れ・地域語のヒント（"Rice/Basmati → Grains" 形式）
#[derive(Debug, Clone, PartialEq)]
pub struct MappingHint {
    pub terms: String,
    pub category: Category,
}

/// few-shot 例（入力文字列 → カテゴリ）
#[derive(Debug, Clone, PartialEq)]
pub struct FewShot {
    pub input: String,
    pub category: Category,
}

/// プロンプトに埋め込む誘導データ
#[derive(Debug, Clone, PartialEq)]
pub struct PromptGuide {
    pub hints: Vec<MappingHint>,
    pub few_shots: Vec<FewShot>,
}

impl Default for PromptGuide {
    fn default() -> Self {
        let hint = |terms: &str, category| MappingHint {
            terms: terms.to_string(),
            category,
        };
        let shot = |input: &str, category| FewShot {
            input: input.to_string(),
            category,
        };

        Self {
            hints: vec![
                hint("Rice/Basmati", Category::Grains),
                hint("Atta/Flour/Maida", Category::Flour),
                hint("Paneer/Curd/Yogurt/Butter/Milk/Perugu", Category::Dairy),
                hint("Dal/Toor/Masoor/Chana/Peas (dry)", Category::Pulses),
                hint("Tomato/Potato/Aloo/Banana/Apple", Category::Produce),
                hint("Detergent/Soap/Dishwash/Cleaner", Category::Household),
                hint("Oil (Sunflower/Mustard/Groundnut/Refined)", Category::Oils),
                hint("Sugar/Jaggery", Category::Sweeteners),
                hint("Salt", Category::Essentials),
                hint("Biscuits/Namkeen/Chips", Category::Snacks),
                hint("Tea/Coffee/Soft drinks/Juices", Category::Beverages),
                hint("Turmeric/Chilli/Cumin/Coriander (dry)", Category::Spices),
            ],
            few_shots: vec![
                shot("Basmati Rice 5kg", Category::Grains),
                shot("Atta (Whole Wheat) 5kg", Category::Flour),
                shot("Paneer 200g", Category::Dairy),
                shot("Detergent Powder 1kg", Category::Household),
                shot("Tomato 1kg", Category::Produce),
                shot("Doodh 1L", Category::Dairy),
                shot("Aloo 1kg", Category::Produce),
                shot("Perugu 500ml", Category::Dairy),
            ],
        }
    }
}

impl PromptGuide {
    fn render_hints(&self) -> String {
        let lines = self
            .hints
            .iter()
            .map(|h| format!("- {} → {}", h.terms, h.category))
            .collect::<Vec<_>>()
            .join("\n");
        format!("Mapping hints (India):\n{}", lines)
    }

    fn render_few_shots(&self) -> String {
        let lines = self
            .few_shots
            .iter()
            .map(|s| format!("- \"{}\" → \"{}\"", s.input, s.category))
            .collect::<Vec<_>>()
            .join("\n");
        format!("Examples:\n{}", lines)
    }
}

/// カテゴリ分類プロンプト生成
///
/// # Arguments
/// * `guide` - ヒントと few-shot 例
/// * `categories` - 分類先カテゴリ（そのまま列挙される）
/// * `items` - 分類対象の明細バッチ
pub fn build_categorize_prompt(guide: &PromptGuide, categories: &[Category], items: &[Item]) -> String {
    let names: Vec<&str> = categories.iter().map(|c| c.as_str()).collect();
    let cats = serde_json::to_string(&names).unwrap_or_default();
    let items_json = serde_json::to_string(items).unwrap_or_default();
    let hints = guide.render_hints();
    let few = guide.render_few_shots();

    format!(
        r#"You are a grocery insights engine.
Task: Categorize each item into one of these categories:
{cats}

Be robust to spelling mistakes and Indian languages (Hindi/Telugu).
Use these hints:
{hints}

Few-shot:
{few}

Return STRICT JSON only in this schema:
{{
  "categories":[
    {{"name":"<category>","items":[{{"name":"","qty":0,"unit":"","price":0}}],"subtotal":0}}
  ],
  "totals":{{"grand_total":0}}
}}
Numeric fields default to 0 when unknown.

Input items: {items_json}
"#
    )
}

/// JSON修復プロンプト生成
pub fn build_repair_prompt(broken: &str) -> String {
    format!("Return only valid JSON (no text). Fix this to valid JSON:\n{}", broken)
}
