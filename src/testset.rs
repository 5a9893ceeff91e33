//! テストケースの読み込み

use crate::error::{EvalError, Result};
use grocery_eval_common::{Item, TestCase};
use std::path::Path;

/// テストケースJSON（`[{"id": ..., "items": [...]}]`）を読み込む
///
/// ファイルが無い・読めない・形式不正はいずれも起動時の致命的エラー。
pub fn load_test_cases(path: &Path) -> Result<Vec<TestCase>> {
    if !path.exists() {
        return Err(EvalError::TestsNotFound(path.display().to_string()));
    }

    let content = std::fs::read_to_string(path)
        .map_err(|e| EvalError::TestsInvalid(format!("{}: {}", path.display(), e)))?;
    let cases: Vec<TestCase> = serde_json::from_str(&content)
        .map_err(|e| EvalError::TestsInvalid(format!("{}: {}", path.display(), e)))?;

    Ok(cases)
}

/// 分類対象の明細を読み込む（`[{"name": ...}]` または `["name", ...]`）
pub fn load_items(path: &Path) -> Result<Vec<Item>> {
    let content = std::fs::read_to_string(path)?;
    let value: serde_json::Value = serde_json::from_str(&content)?;

    let items = match value {
        serde_json::Value::Array(values) if values.iter().all(|v| v.is_string()) => values
            .into_iter()
            .filter_map(|v| v.as_str().map(Item::named))
            .collect(),
        other => serde_json::from_value(other)?,
    };

    Ok(items)
}
