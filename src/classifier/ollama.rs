//! Ollama互換 補完エンドポイント連携
//!
//! 修復カスケード:
//! 1. レスポンスをそのままパース
//! 2. 最初の `{` 〜最後の `}` を切り出してパース
//! 3. モデルにJSON修復を1回だけ依頼してパース
//! 4. それでも駄目なら空の既定値
//!
//! 1・2は共通パーサー、3・4はここで行う。

use super::{Classification, Classifier};
use crate::config::Config;
use crate::error::{EvalError, Result};
use grocery_eval_common::{
    build_categorize_prompt, build_repair_prompt, parse_model_output, Category, Item, ModelOutput,
    ParseStage, PromptGuide,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    response: Option<String>,
}

/// 補完エンドポイントのクライアント
#[derive(Debug, Clone)]
pub struct OllamaClient {
    http: reqwest::Client,
    endpoint: String,
    model: String,
    num_ctx: u32,
    timeout: Duration,
    repair_timeout: Duration,
    guide: PromptGuide,
    categories: Vec<Category>,
}

impl OllamaClient {
    pub fn new(config: &Config, guide: PromptGuide) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(format!("grocery-eval/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| EvalError::Config(format!("HTTPクライアント生成に失敗: {}", e)))?;

        Ok(Self {
            http,
            endpoint: config.endpoint.clone(),
            model: config.model.clone(),
            num_ctx: config.num_ctx,
            timeout: config.timeout(),
            repair_timeout: config.repair_timeout(),
            guide,
            categories: Category::ALL.to_vec(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// 送信予定のプロンプト（確認用）
    pub fn prompt_for(&self, items: &[Item]) -> String {
        build_categorize_prompt(&self.guide, &self.categories, items)
    }

    /// 段階3: 修復リクエスト
    ///
    /// 通信エラー・非2xx・パース失敗はすべて Err（呼び出し側で既定値に縮退）。
    pub async fn repair(&self, broken: &str) -> Result<ModelOutput> {
        let prompt = build_repair_prompt(broken);
        let options = json!({ "temperature": 0.0 });
        let text = self
            .generate(&prompt, options, self.repair_timeout)
            .await?
            .unwrap_or_else(|| "{}".to_string());

        let (output, _) = parse_model_output(&text)?;
        Ok(output)
    }

    async fn generate(&self, prompt: &str, options: Value, timeout: Duration) -> Result<Option<String>> {
        let body = json!({
            "model": self.model,
            "prompt": prompt,
            "stream": false,
            "format": "json",
            "options": options,
        });

        debug!(endpoint = %self.endpoint, prompt_chars = prompt.len(), "completion request");

        let response = self
            .http
            .post(&self.endpoint)
            .timeout(timeout)
            .json(&body)
            .send()
            .await
            .map_err(|e| self.request_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(EvalError::Http {
                status: status.as_u16(),
                body,
            });
        }

        let payload: GenerateResponse = response
            .json()
            .await
            .map_err(|e| EvalError::ApiParse(format!("レスポンス形式が不正: {}", e)))?;

        debug!(
            response_chars = payload.response.as_deref().map(str::len).unwrap_or(0),
            "completion response"
        );

        Ok(payload.response)
    }

    fn request_error(&self, e: reqwest::Error) -> EvalError {
        if e.is_connect() {
            EvalError::EndpointUnreachable(format!("{} ({})", self.endpoint, e))
        } else if e.is_timeout() {
            EvalError::ApiCall(format!("タイムアウト: {}", e))
        } else {
            EvalError::ApiCall(e.to_string())
        }
    }
}

impl Classifier for OllamaClient {
    async fn classify(&self, items: &[Item]) -> Result<Classification> {
        let prompt = self.prompt_for(items);
        let options = json!({ "temperature": 0.0, "num_ctx": self.num_ctx });

        let started = Instant::now();
        let text = self.generate(&prompt, options, self.timeout).await?.unwrap_or_default();
        let latency = started.elapsed();

        if let Ok((output, stage)) = parse_model_output(&text) {
            return Ok(Classification { output, latency, stage });
        }

        warn!(response_chars = text.len(), "unparseable model output, requesting repair");
        let (output, stage) = match self.repair(&text).await {
            Ok(output) => (output, ParseStage::Repaired),
            Err(e) => {
                warn!(error = %e, "repair failed, using empty result");
                (ModelOutput::empty(), ParseStage::Fallback)
            }
        };

        Ok(Classification { output, latency, stage })
    }
}
