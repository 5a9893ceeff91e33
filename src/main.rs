use anyhow::Context;
use clap::Parser;
use grocery_eval::{classifier, cli, config, harness, report, testset};
use classifier::{Classifier, OllamaClient};
use cli::{Cli, Commands, ItemsArgs, ModelArgs};
use config::Config;
use grocery_eval_common::{KeywordBackstop, PromptGuide};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli).await {
        eprintln!("ERROR: {:#}", e);
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "info,grocery_eval=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = Config::load().context("設定の読み込みに失敗")?;

    match cli.command {
        Commands::Run { tests, output, details, jobs, model } => {
            println!("🛒 grocery-eval - 分類精度評価\n");

            // 1. テストケース読み込み
            println!("[1/3] テストケースを読み込み中...");
            let cases = testset::load_test_cases(&tests)?;
            println!("✔ {}件のテストケース\n", cases.len());

            // 2. 分類・採点
            let (client, backstop) = build_pipeline(&config, &model)?;
            println!(
                "[2/3] 分類中... (model: {}, endpoint: {}, jobs: {})",
                client.model(),
                client.endpoint(),
                jobs.max(1)
            );
            let options = harness::RunOptions {
                jobs,
                show_progress: !cli.verbose,
            };
            let result = harness::run(cases, Arc::new(client.clone()), Arc::new(backstop), &options).await?;
            println!("✔ 分類完了\n");

            for outcome in &result.outcomes {
                for line in report::mismatch_lines(outcome) {
                    println!("{}", line);
                }
            }

            // 3. 結果保存
            println!("\n[3/3] 結果を保存中...");
            report::write_csv(&output, &result.report)
                .with_context(|| format!("CSVの書き込みに失敗: {}", output.display()))?;
            if let Some(details_path) = details {
                report::write_details(&details_path, client.model(), &result.outcomes)
                    .with_context(|| format!("詳細JSONの書き込みに失敗: {}", details_path.display()))?;
                println!("✔ 詳細を保存: {}", details_path.display());
            }

            println!();
            for line in result.report.summary_lines() {
                println!("{}", line);
            }
            println!("CSV saved: {}", output.display());
        }

        Commands::Classify { items, json, model } => {
            let items = read_items(&items)?;
            let (client, backstop) = build_pipeline(&config, &model)?;

            let classification = client.classify(&items).await?;

            if json {
                println!("{}", serde_json::to_string_pretty(&classification.output)?);
            } else {
                for group in &classification.output.categories {
                    println!("{}:", group.name);
                    for item in &group.items {
                        let corrected = backstop.correct(&item.name, &group.name);
                        if corrected == group.name {
                            println!("  - {}", item.name);
                        } else {
                            println!("  - {} → {} (補正)", item.name, corrected);
                        }
                    }
                }
                println!(
                    "\n({}件, {:.2}秒, parse: {})",
                    classification.output.item_count(),
                    classification.latency.as_secs_f64(),
                    classification.stage
                );
            }
        }

        Commands::Prompt { items } => {
            let items = read_items(&items)?;
            let client = OllamaClient::new(&config, PromptGuide::default())?;
            println!("{}", client.prompt_for(&items));
        }

        Commands::Report { input } => {
            let report = report::read_csv(&input)
                .with_context(|| format!("CSVの読み込みに失敗: {}", input.display()))?;
            for row in &report.rows {
                println!(
                    "  {:<20} items={:<4} accuracy={:.3} latency={:.2}s",
                    row.test_id, row.items_count, row.accuracy, row.latency_sec
                );
            }
            println!();
            for line in report.summary_lines() {
                println!("{}", line);
            }
        }

        Commands::Config { set_model, set_url, show } => {
            let mut config = config;

            if set_model.is_some() || set_url.is_some() {
                if let Some(model) = set_model {
                    config.model = model;
                }
                if let Some(url) = set_url {
                    config.endpoint = url;
                }
                config.save()?;
                println!("✔ 設定を保存しました: {}", Config::config_path()?.display());
            }

            if show {
                println!("設定:");
                println!("  エンドポイント: {}", config.endpoint);
                println!("  モデル: {}", config.model);
                println!("  num_ctx: {}", config.num_ctx);
                println!("  タイムアウト: {}秒 (修復: {}秒)", config.timeout_seconds, config.repair_timeout_seconds);
            }
        }
    }

    Ok(())
}

/// 設定とCLI指定からクライアントと補正ルールを組み立てる
fn build_pipeline(config: &Config, args: &ModelArgs) -> anyhow::Result<(OllamaClient, KeywordBackstop)> {
    let mut config = config.clone();
    if let Some(model) = &args.model {
        config.model = model.clone();
    }
    if let Some(url) = &args.url {
        config.endpoint = url.clone();
    }

    let backstop = match &args.rules {
        Some(path) => KeywordBackstop::from_file(path)
            .with_context(|| format!("補正ルールの読み込みに失敗: {}", path.display()))?,
        None => KeywordBackstop::default(),
    };

    let client = OllamaClient::new(&config, PromptGuide::default())?;
    Ok((client, backstop))
}

fn read_items(args: &ItemsArgs) -> anyhow::Result<Vec<grocery_eval_common::Item>> {
    match &args.input {
        Some(path) => testset::load_items(path)
            .with_context(|| format!("明細ファイルの読み込みに失敗: {}", path.display())),
        None => Ok(args
            .item
            .iter()
            .map(|name| grocery_eval_common::Item::named(name.as_str()))
            .collect()),
    }
}
