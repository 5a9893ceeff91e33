//! 採点モジュール
//!
//! LLM出力を「正規化品名 → 補正後カテゴリ」に平坦化し、
//! テストケースの正解カテゴリと完全一致で比較する。

use crate::backstop::KeywordBackstop;
use crate::category::Category;
use crate::normalizer::normalize;
use crate::types::{ModelOutput, TestCase};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// 正規化品名 → 予測カテゴリ
pub type PredictionMap = HashMap<String, String>;

/// 明細ごとの判定
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemVerdict {
    pub item_name: String,
    pub expected: Category,
    pub predicted: String,
    pub ok: bool,
}

/// テストケースの採点結果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseScore {
    /// 正解数 / 明細数（明細0件なら 0.0）
    pub accuracy: f64,
    pub items: Vec<ItemVerdict>,
}

impl CaseScore {
    pub fn mismatches(&self) -> impl Iterator<Item = &ItemVerdict> {
        self.items.iter().filter(|v| !v.ok)
    }

    pub fn correct_count(&self) -> usize {
        self.items.iter().filter(|v| v.ok).count()
    }
}

/// LLM出力を予測マップに平坦化（補正を適用）
///
/// 同じ正規化キーが複数回出た場合は後勝ち。正規化後に空になる品名は無視する。
pub fn build_prediction_map(output: &ModelOutput, backstop: &KeywordBackstop) -> PredictionMap {
    let mut map = PredictionMap::new();
    for group in &output.categories {
        for item in &group.items {
            let key = normalize(&item.name);
            if key.is_empty() {
                continue;
            }
            map.insert(key, backstop.correct(&item.name, &group.name));
        }
    }
    map
}

/// テストケースを採点する
pub fn score_case(test_case: &TestCase, output: &ModelOutput, backstop: &KeywordBackstop) -> CaseScore {
    let predictions = build_prediction_map(output, backstop);

    let items: Vec<ItemVerdict> = test_case
        .items
        .iter()
        .map(|t| {
            let predicted = predictions
                .get(&normalize(&t.item.name))
                .cloned()
                .unwrap_or_else(|| Category::Other.as_str().to_string());
            let ok = predicted == t.expected_category.as_str();
            ItemVerdict {
                item_name: t.item.name.clone(),
                expected: t.expected_category,
                predicted,
                ok,
            }
        })
        .collect();

    let total = items.len();
    let correct = items.iter().filter(|v| v.ok).count();
    let accuracy = if total == 0 {
        0.0
    } else {
        correct as f64 / total as f64
    };

    CaseScore { accuracy, items }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CategoryGroup, OutputItem, TestItem};

    fn group(name: &str, items: &[&str]) -> CategoryGroup {
        CategoryGroup {
            name: name.to_string(),
            items: items
                .iter()
                .map(|n| OutputItem {
                    name: n.to_string(),
                    ..Default::default()
                })
                .collect(),
            subtotal: 0.0,
        }
    }

    fn output(groups: Vec<CategoryGroup>) -> ModelOutput {
        ModelOutput {
            categories: groups,
            ..Default::default()
        }
    }

    #[test]
    fn test_omitted_item_defaults_to_other_and_matches() {
        let tc = TestCase {
            id: "t1".into(),
            items: vec![
                TestItem::new("Basmati Rice 5kg", Category::Grains),
                TestItem::new("Unknown Widget", Category::Other),
            ],
        };
        let out = output(vec![group("Grains", &["Basmati Rice 5kg"])]);
        let score = score_case(&tc, &out, &KeywordBackstop::default());
        assert_eq!(score.accuracy, 1.0);
        assert_eq!(score.items[1].predicted, "Other");
    }

    #[test]
    fn test_omitted_item_with_non_other_expectation_misses() {
        let tc = TestCase {
            id: "t2".into(),
            items: vec![
                TestItem::new("Basmati Rice 5kg", Category::Grains),
                TestItem::new("Unknown Widget", Category::Household),
            ],
        };
        let out = output(vec![group("Grains", &["Basmati Rice 5kg"])]);
        let score = score_case(&tc, &out, &KeywordBackstop::default());
        assert_eq!(score.accuracy, 0.5);
        let misses: Vec<_> = score.mismatches().collect();
        assert_eq!(misses.len(), 1);
        assert_eq!(misses[0].item_name, "Unknown Widget");
        assert_eq!(misses[0].expected, Category::Household);
        assert_eq!(misses[0].predicted, "Other");
    }

    #[test]
    fn test_empty_case_scores_zero() {
        let tc = TestCase {
            id: "empty".into(),
            items: vec![],
        };
        let score = score_case(&tc, &ModelOutput::empty(), &KeywordBackstop::default());
        assert_eq!(score.accuracy, 0.0);
        assert!(score.items.is_empty());
    }

    #[test]
    fn test_matching_uses_normalized_names() {
        let tc = TestCase {
            id: "t3".into(),
            items: vec![TestItem::new("Atta (Whole Wheat) 5kg", Category::Flour)],
        };
        let out = output(vec![group("Flour", &["atta whole-wheat 10 kg"])]);
        let score = score_case(&tc, &out, &KeywordBackstop::default());
        assert_eq!(score.accuracy, 1.0);
    }

    #[test]
    fn test_backstop_applied_while_flattening() {
        let out = output(vec![
            group("Other", &["Detergent Powder 1kg"]),
            group("Vegetables", &["Aloo 1kg", "Mystery Leaf"]),
        ]);
        let map = build_prediction_map(&out, &KeywordBackstop::default());
        assert_eq!(map["detergent powder"], "Household");
        assert_eq!(map["aloo"], "Produce");
        // 一致なし → 集合外の値のまま（採点では不一致）
        assert_eq!(map["mystery leaf"], "Vegetables");
    }

    #[test]
    fn test_out_of_set_category_does_not_count_as_other() {
        let tc = TestCase {
            id: "t4".into(),
            items: vec![TestItem::new("Phone Charger", Category::Other)],
        };
        let out = output(vec![group("Electronics", &["Phone Charger"])]);
        let score = score_case(&tc, &out, &KeywordBackstop::default());
        // 補正ルールに一致しない集合外カテゴリはそのまま不一致
        assert_eq!(score.items[0].predicted, "Electronics");
        assert!(!score.items[0].ok);
        assert_eq!(score.accuracy, 0.0);
    }

    #[test]
    fn test_duplicate_key_last_write_wins() {
        let out = output(vec![
            group("Dairy", &["Paneer 200g"]),
            group("Protein", &["paneer"]),
        ]);
        let map = build_prediction_map(&out, &KeywordBackstop::default());
        assert_eq!(map.len(), 1);
        assert_eq!(map["paneer"], "Protein");
    }

    #[test]
    fn test_empty_normalized_names_are_skipped() {
        let out = output(vec![group("Dairy", &["", "500ml"])]);
        let map = build_prediction_map(&out, &KeywordBackstop::default());
        assert!(map.is_empty());
    }

    #[test]
    fn test_out_of_set_prediction_never_matches() {
        let tc = TestCase {
            id: "t4".into(),
            items: vec![TestItem::new("Mystery Leaf", Category::Produce)],
        };
        let out = output(vec![group("Vegetables", &["Mystery Leaf"])]);
        let score = score_case(&tc, &out, &KeywordBackstop::default());
        assert_eq!(score.accuracy, 0.0);
        assert_eq!(score.correct_count(), 0);
    }
}
