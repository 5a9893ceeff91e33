use thiserror::Error;

#[derive(Error, Debug)]
pub enum EvalError {
    #[error("設定エラー: {0}")]
    Config(String),

    #[error("テストケースファイルが見つかりません: {0}（評価対象のJSONを配置するか --tests で指定してください）")]
    TestsNotFound(String),

    #[error("テストケースファイルが不正: {0}")]
    TestsInvalid(String),

    #[error("LLMエンドポイントに接続できません: {0}（Ollamaが起動しモデルが取得済みか確認してください）")]
    EndpointUnreachable(String),

    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("API呼び出しエラー: {0}")]
    ApiCall(String),

    #[error("APIレスポンスのパースに失敗: {0}")]
    ApiParse(String),

    #[error("JSON解析エラー: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSVエラー: {0}")]
    Csv(#[from] csv::Error),

    #[error("IOエラー: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Common(#[from] grocery_eval_common::Error),
}

impl EvalError {
    /// 評価全体を中断すべきエラーか
    ///
    /// テストケースの欠落とエンドポイント不達のみ。その他はケース単位で縮退する。
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            EvalError::TestsNotFound(_) | EvalError::TestsInvalid(_) | EvalError::EndpointUnreachable(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, EvalError>;
