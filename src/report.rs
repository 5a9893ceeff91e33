//! 評価レポート
//!
//! - CSV: `test_id,items_count,accuracy,latency_sec`（実行ごとに上書き）
//! - 詳細JSON: 明細ごとの判定とパース段階（任意）

use crate::error::Result;
use grocery_eval_common::{CaseScore, ParseStage};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// テストケース1件の集計行
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreRow {
    pub test_id: String,
    pub items_count: usize,
    /// 小数3桁に丸めた精度
    pub accuracy: f64,
    /// 小数2桁に丸めた秒数
    pub latency_sec: f64,
}

impl ScoreRow {
    pub fn new(test_id: impl Into<String>, items_count: usize, accuracy: f64, latency_sec: f64) -> Self {
        Self {
            test_id: test_id.into(),
            items_count,
            accuracy: round_to(accuracy, 3),
            latency_sec: round_to(latency_sec, 2),
        }
    }
}

/// テストケース1件の評価結果（詳細）
#[derive(Debug, Clone, Serialize)]
pub struct CaseOutcome {
    pub row: ScoreRow,
    pub score: CaseScore,
    pub stage: ParseStage,
    /// ケース単位で縮退した場合のエラー
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// 評価全体のレポート
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Report {
    pub rows: Vec<ScoreRow>,
}

impl Report {
    pub fn new(rows: Vec<ScoreRow>) -> Self {
        Self { rows }
    }

    pub fn case_count(&self) -> usize {
        self.rows.len()
    }

    /// 行の精度（丸め後）の平均。0件なら 0.0
    pub fn mean_accuracy(&self) -> f64 {
        mean(self.rows.iter().map(|r| r.accuracy))
    }

    /// 行のレイテンシ（丸め後）の平均。0件なら 0.0
    pub fn mean_latency(&self) -> f64 {
        mean(self.rows.iter().map(|r| r.latency_sec))
    }

    /// コンソール用サマリー
    pub fn summary_lines(&self) -> Vec<String> {
        vec![
            "=== Summary ===".to_string(),
            format!("Cases: {}", self.case_count()),
            format!("Overall accuracy: {:.3}", self.mean_accuracy()),
            format!("Average latency (s): {:.2}", self.mean_latency()),
        ]
    }
}

#[derive(Serialize)]
struct DetailsFile<'a> {
    generated_at: String,
    model: &'a str,
    cases: &'a [CaseOutcome],
}

fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, count) = values.fold((0.0, 0usize), |(s, c), v| (s + v, c + 1));
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

/// CSVを書き出す（既存ファイルは上書き）
pub fn write_csv(path: &Path, report: &Report) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_path(path)?;

    // 0件でもヘッダーは出力する
    if report.rows.is_empty() {
        writer.write_record(["test_id", "items_count", "accuracy", "latency_sec"])?;
    }
    for row in &report.rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

/// CSVを読み込む
pub fn read_csv(path: &Path) -> Result<Report> {
    let mut reader = csv::ReaderBuilder::new().has_headers(true).from_path(path)?;
    let rows = reader
        .deserialize::<ScoreRow>()
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(Report::new(rows))
}

/// 詳細JSONを書き出す
pub fn write_details(path: &Path, model: &str, outcomes: &[CaseOutcome]) -> Result<()> {
    let details = DetailsFile {
        generated_at: chrono::Local::now().to_rfc3339(),
        model,
        cases: outcomes,
    };
    let json = serde_json::to_string_pretty(&details)?;
    std::fs::write(path, json)?;
    Ok(())
}

/// 不一致明細の表示行（不一致が無ければ空）
pub fn mismatch_lines(outcome: &CaseOutcome) -> Vec<String> {
    let mismatches: Vec<_> = outcome.score.mismatches().collect();
    if mismatches.is_empty() {
        return Vec::new();
    }

    let mut lines = vec![format!("[{}] mismatches:", outcome.row.test_id)];
    lines.extend(mismatches.iter().map(|m| {
        format!("  - {}: expected {} | got {}", m.item_name, m.expected, m.predicted)
    }));
    lines
}
