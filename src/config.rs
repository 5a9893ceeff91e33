use crate::error::{EvalError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_ENDPOINT: &str = "http://localhost:11434/api/generate";
pub const DEFAULT_MODEL: &str = "gemma3:1b-it-qat";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 補完エンドポイント（Ollama /api/generate 互換）
    pub endpoint: String,
    pub model: String,
    /// コンテキスト長（num_ctx）
    pub num_ctx: u32,
    /// 分類リクエストのタイムアウト
    pub timeout_seconds: u64,
    /// 修復リクエストのタイムアウト
    pub repair_timeout_seconds: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.into(),
            model: DEFAULT_MODEL.into(),
            num_ctx: 8192,
            timeout_seconds: 240, // ローカルモデルの遅さを許容
            repair_timeout_seconds: 120,
        }
    }
}

impl Config {
    /// 設定ファイル → 環境変数の順に読み込む
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        let config = if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            serde_json::from_str(&content)?
        } else {
            Self::default()
        };

        Ok(config.with_env_overrides())
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(&config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| EvalError::Config("ホームディレクトリが見つかりません".into()))?;
        Ok(home.join(".config").join("grocery-eval").join("config.json"))
    }

    fn with_env_overrides(self) -> Self {
        self.with_overrides(
            std::env::var("OLLAMA_URL").ok(),
            std::env::var("GROCERY_EVAL_MODEL").ok(),
        )
    }

    /// 空でない値だけ上書きする
    fn with_overrides(mut self, endpoint: Option<String>, model: Option<String>) -> Self {
        if let Some(url) = endpoint.filter(|v| !v.trim().is_empty()) {
            self.endpoint = url;
        }
        if let Some(model) = model.filter(|v| !v.trim().is_empty()) {
            self.model = model;
        }
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    pub fn repair_timeout(&self) -> Duration {
        Duration::from_secs(self.repair_timeout_seconds)
    }
}
