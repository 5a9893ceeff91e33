//! 評価ハーネス
//!
//! テストケースごとに 分類 → 採点 → 集計 を行う。
//! ケース単位の失敗は空の出力で採点して続行し、
//! エンドポイント不達のみ評価全体を中断する。

use crate::classifier::Classifier;
use crate::error::{EvalError, Result};
use crate::report::{CaseOutcome, Report, ScoreRow};
use grocery_eval_common::{score_case, KeywordBackstop, ModelOutput, ParseStage, TestCase};
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{info, warn};

#[derive(Debug, Clone)]
pub struct RunOptions {
    /// 同時に分類するテストケース数（1で逐次）
    pub jobs: usize,
    pub show_progress: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            jobs: 1,
            show_progress: false,
        }
    }
}

/// 評価結果（ケース順）
#[derive(Debug, Clone)]
pub struct RunResult {
    pub report: Report,
    pub outcomes: Vec<CaseOutcome>,
}

/// テストケース1件を評価する
pub async fn evaluate_case<C: Classifier>(
    classifier: &C,
    backstop: &KeywordBackstop,
    case: &TestCase,
) -> Result<CaseOutcome> {
    let items = case.input_items();

    match classifier.classify(&items).await {
        Ok(classification) => {
            let score = score_case(case, &classification.output, backstop);
            let row = ScoreRow::new(
                &case.id,
                case.items.len(),
                score.accuracy,
                classification.latency.as_secs_f64(),
            );
            Ok(CaseOutcome {
                row,
                score,
                stage: classification.stage,
                error: None,
            })
        }
        Err(e) if e.is_fatal() => Err(e),
        Err(e) => {
            warn!(case = %case.id, error = %e, "classification failed, scoring against empty output");
            let score = score_case(case, &ModelOutput::empty(), backstop);
            let row = ScoreRow::new(&case.id, case.items.len(), score.accuracy, 0.0);
            Ok(CaseOutcome {
                row,
                score,
                stage: ParseStage::Fallback,
                error: Some(e.to_string()),
            })
        }
    }
}

/// 全テストケースを評価する
pub async fn run<C: Classifier + 'static>(
    cases: Vec<TestCase>,
    classifier: Arc<C>,
    backstop: Arc<KeywordBackstop>,
    options: &RunOptions,
) -> Result<RunResult> {
    let progress = progress_bar(cases.len(), options.show_progress);
    let jobs = options.jobs.max(1);
    info!(cases = cases.len(), jobs, "evaluation started");

    let outcomes = if jobs == 1 {
        let mut outcomes = Vec::with_capacity(cases.len());
        for case in &cases {
            progress.set_message(case.id.clone());
            let outcome = evaluate_case(classifier.as_ref(), &backstop, case).await;
            progress.inc(1);
            outcomes.push(outcome.inspect_err(|_| progress.abandon())?);
        }
        outcomes
    } else {
        run_concurrent(cases, classifier, backstop, jobs, &progress).await?
    };

    progress.finish_and_clear();

    let report = Report::new(outcomes.iter().map(|o| o.row.clone()).collect());
    Ok(RunResult { report, outcomes })
}

/// 最大 `jobs` 件を並行に分類し、結果はケース順に並べ直す
async fn run_concurrent<C: Classifier + 'static>(
    cases: Vec<TestCase>,
    classifier: Arc<C>,
    backstop: Arc<KeywordBackstop>,
    jobs: usize,
    progress: &ProgressBar,
) -> Result<Vec<CaseOutcome>> {
    let semaphore = Arc::new(Semaphore::new(jobs));
    let mut tasks = JoinSet::new();
    let total = cases.len();

    for (index, case) in cases.into_iter().enumerate() {
        let classifier = Arc::clone(&classifier);
        let backstop = Arc::clone(&backstop);
        let semaphore = Arc::clone(&semaphore);
        tasks.spawn(async move {
            let _permit = semaphore
                .acquire_owned()
                .await
                .map_err(|e| EvalError::ApiCall(e.to_string()))?;
            let outcome = evaluate_case(classifier.as_ref(), &backstop, &case).await?;
            Ok::<_, EvalError>((index, outcome))
        });
    }

    // 集計はこのタスクだけが行う
    let mut slots: Vec<Option<CaseOutcome>> = vec![None; total];
    while let Some(joined) = tasks.join_next().await {
        let (index, outcome) = match joined {
            Ok(Ok(done)) => done,
            Ok(Err(e)) => {
                tasks.abort_all();
                progress.abandon();
                return Err(e);
            }
            Err(e) => {
                tasks.abort_all();
                progress.abandon();
                return Err(EvalError::ApiCall(format!("評価タスクが異常終了: {}", e)));
            }
        };
        progress.set_message(outcome.row.test_id.clone());
        progress.inc(1);
        slots[index] = Some(outcome);
    }

    Ok(slots.into_iter().flatten().collect())
}

fn progress_bar(len: usize, visible: bool) -> ProgressBar {
    if !visible {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::new(len as u64);
    if let Ok(style) = ProgressStyle::with_template("  {bar:30} {pos}/{len} {msg}") {
        bar.set_style(style);
    }
    bar
}
