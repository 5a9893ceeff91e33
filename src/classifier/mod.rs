mod ollama;

pub use ollama::OllamaClient;

use crate::error::Result;
use grocery_eval_common::{Item, ModelOutput, ParseStage};
use std::future::Future;
use std::time::Duration;

/// 1バッチ分の分類結果
#[derive(Debug, Clone)]
pub struct Classification {
    pub output: ModelOutput,
    /// 分類リクエストの所要時間（修復リクエストは含まない）
    pub latency: Duration,
    pub stage: ParseStage,
}

/// 明細バッチをカテゴリ分類するもの
///
/// ハーネスはこのトレイト越しにLLMを呼ぶ。
pub trait Classifier: Send + Sync {
    fn classify(&self, items: &[Item]) -> impl Future<Output = Result<Classification>> + Send;
}
