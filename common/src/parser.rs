//! LLMレスポンスパーサー
//!
//! 修復カスケードのうち、ネットワークを伴わない段階:
//! 1. レスポンス全体をそのまま ModelOutput としてパース
//! 2. 最初の `{` から最後の `}` までを切り出してパース
//!
//! 3段目（修復リクエスト）と4段目（空の既定値）は呼び出し側が行う。

use crate::error::{Error, Result};
use crate::types::ModelOutput;
use serde::{Deserialize, Serialize};

/// どの段階で結果を得たか
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParseStage {
    Direct,
    Extracted,
    Repaired,
    Fallback,
}

impl std::fmt::Display for ParseStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseStage::Direct => write!(f, "direct"),
            ParseStage::Extracted => write!(f, "extracted"),
            ParseStage::Repaired => write!(f, "repaired"),
            ParseStage::Fallback => write!(f, "fallback"),
        }
    }
}

/// 段階1: そのままパース
pub fn parse_direct(text: &str) -> Result<ModelOutput> {
    serde_json::from_str(text).map_err(|e| Error::Parse(format!("direct parse failed: {}", e)))
}

/// 最初の `{` から最後の `}` までを抽出
///
/// # Examples
/// ```
/// use grocery_eval_common::extract_object;
///
/// let text = "Sure! {\"categories\": []} Hope this helps.";
/// assert_eq!(extract_object(text).unwrap(), "{\"categories\": []}");
/// ```
pub fn extract_object(text: &str) -> Result<&str> {
    let start = text.find('{');
    let end = text.rfind('}');
    match (start, end) {
        (Some(start), Some(end)) if end > start => Ok(&text[start..=end]),
        _ => Err(Error::Parse("JSON object not found".into())),
    }
}

/// 段階2: 抽出した部分文字列をパース
pub fn parse_extracted(text: &str) -> Result<ModelOutput> {
    let inner = extract_object(text)?;
    serde_json::from_str(inner).map_err(|e| Error::Parse(format!("extracted parse failed: {}", e)))
}

/// 段階1→2を順に試す
pub fn parse_model_output(text: &str) -> Result<(ModelOutput, ParseStage)> {
    parse_direct(text)
        .map(|out| (out, ParseStage::Direct))
        .or_else(|_| parse_extracted(text).map(|out| (out, ParseStage::Extracted)))
}
