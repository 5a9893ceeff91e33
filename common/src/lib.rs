//! Grocery Eval Common Library
//!
//! 食料品アイテム分類の純粋ロジック（I/Oなし）:
//! 正規化・キーワード補正・プロンプト生成・レスポンス解析・採点

pub mod backstop;
pub mod category;
pub mod error;
pub mod normalizer;
pub mod parser;
pub mod prompts;
pub mod scorer;
pub mod types;

pub use backstop::{KeywordBackstop, KeywordRule, RuleSpec};
pub use category::Category;
pub use error::{Error, Result};
pub use normalizer::normalize;
pub use parser::{extract_object, parse_direct, parse_extracted, parse_model_output, ParseStage};
pub use prompts::{build_categorize_prompt, build_repair_prompt, PromptGuide};
pub use scorer::{build_prediction_map, score_case, CaseScore, ItemVerdict, PredictionMap};
pub use types::{CategoryGroup, Item, ModelOutput, OutputItem, TestCase, TestItem, Totals};
