use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "grocery-eval")]
#[command(about = "食料品アイテムのLLMカテゴリ分類・精度評価ツール", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// LLM接続の上書き指定
#[derive(Args, Clone, Debug, Default)]
pub struct ModelArgs {
    /// モデル名（設定ファイル・環境変数より優先）
    #[arg(long)]
    pub model: Option<String>,

    /// 補完エンドポイントURL
    #[arg(long)]
    pub url: Option<String>,

    /// キーワード補正ルールJSON（組み込みルールを置き換え）
    #[arg(long)]
    pub rules: Option<PathBuf>,
}

/// 分類対象の明細指定
#[derive(Args, Clone, Debug, Default)]
pub struct ItemsArgs {
    /// 明細JSONファイル（["名前", ...] または [{"name": ...}, ...]）
    #[arg(required_unless_present = "item", conflicts_with = "item")]
    pub input: Option<PathBuf>,

    /// 品名を直接指定（複数可）
    #[arg(short, long)]
    pub item: Vec<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// テストケースを分類・採点してCSVを出力
    Run {
        /// テストケースJSONファイル
        #[arg(short, long, default_value = "tests_items.json")]
        tests: PathBuf,

        /// 出力CSV（毎回上書き）
        #[arg(short, long, default_value = "results_items.csv")]
        output: PathBuf,

        /// 明細ごとの判定を書き出すJSON
        #[arg(long)]
        details: Option<PathBuf>,

        /// 同時に評価するテストケース数
        #[arg(short, long, default_value = "1")]
        jobs: usize,

        #[command(flatten)]
        model: ModelArgs,
    },

    /// 明細を分類して結果を表示
    Classify {
        #[command(flatten)]
        items: ItemsArgs,

        /// 結果をJSONで出力
        #[arg(long)]
        json: bool,

        #[command(flatten)]
        model: ModelArgs,
    },

    /// 送信されるプロンプトを表示（LLMは呼ばない）
    Prompt {
        #[command(flatten)]
        items: ItemsArgs,
    },

    /// 出力済みCSVのサマリーを表示
    Report {
        /// 結果CSVファイル
        #[arg(default_value = "results_items.csv")]
        input: PathBuf,
    },

    /// 設定を表示/編集
    Config {
        /// モデル名を設定
        #[arg(long)]
        set_model: Option<String>,

        /// エンドポイントURLを設定
        #[arg(long)]
        set_url: Option<String>,

        /// 設定を表示
        #[arg(long)]
        show: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_run_defaults() {
        let cli = Cli::try_parse_from(["grocery-eval", "run"]).unwrap();
        match cli.command {
            Commands::Run { tests, output, details, jobs, model } => {
                assert_eq!(tests, PathBuf::from("tests_items.json"));
                assert_eq!(output, PathBuf::from("results_items.csv"));
                assert!(details.is_none());
                assert_eq!(jobs, 1);
                assert!(model.model.is_none());
            }
            _ => panic!("Expected Run"),
        }
    }

    #[test]
    fn test_classify_with_items() {
        let cli = Cli::try_parse_from([
            "grocery-eval", "-v", "classify", "-i", "Aloo 1kg", "-i", "Perugu 500ml", "--model", "gemma3:4b",
        ])
        .unwrap();
        assert!(cli.verbose);
        match cli.command {
            Commands::Classify { items, json, model } => {
                assert_eq!(items.item, vec!["Aloo 1kg", "Perugu 500ml"]);
                assert!(items.input.is_none());
                assert!(!json);
                assert_eq!(model.model.as_deref(), Some("gemma3:4b"));
            }
            _ => panic!("Expected Classify"),
        }
    }

    #[test]
    fn test_prompt_requires_items() {
        assert!(Cli::try_parse_from(["grocery-eval", "prompt"]).is_err());
        assert!(Cli::try_parse_from(["grocery-eval", "prompt", "items.json"]).is_ok());
    }
}
