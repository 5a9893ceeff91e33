//! エラーケーステスト
//!
//! 各種エラー条件でのエラーハンドリングを検証

use grocery_eval::error::EvalError;
use grocery_eval::testset;
use std::path::Path;
use tempfile::tempdir;

/// 存在しないテストケースファイル
#[test]
fn test_missing_tests_file() {
    let result = testset::load_test_cases(Path::new("/nonexistent/path/tests_items.json"));
    assert!(result.is_err());

    let err = result.unwrap_err();
    assert!(matches!(err, EvalError::TestsNotFound(_)));
    assert!(err.is_fatal());
}

/// 空配列のテストケースはエラーではない
#[test]
fn test_empty_tests_file() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("tests_items.json");
    std::fs::write(&path, "[]").unwrap();

    let cases = testset::load_test_cases(&path).unwrap();
    assert!(cases.is_empty());
}

/// 正解カテゴリが集合外のテストケースは不正扱い
#[test]
fn test_unknown_expected_category() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("tests_items.json");
    std::fs::write(
        &path,
        r#"[{"id": "x", "items": [{"name": "Okra", "expected_category": "Vegetables"}]}]"#,
    )
    .unwrap();

    let err = testset::load_test_cases(&path).unwrap_err();
    assert!(matches!(err, EvalError::TestsInvalid(_)));
}

/// EvalErrorのDisplay実装確認
#[test]
fn test_error_display() {
    let errors = vec![
        EvalError::Config("テスト設定エラー".to_string()),
        EvalError::TestsNotFound("tests_items.json".to_string()),
        EvalError::TestsInvalid("tests_items.json: EOF".to_string()),
        EvalError::EndpointUnreachable("http://localhost:11434/api/generate".to_string()),
        EvalError::Http { status: 503, body: "loading model".to_string() },
        EvalError::ApiCall("タイムアウト".to_string()),
        EvalError::ApiParse("レスポンス形式が不正".to_string()),
    ];

    for err in errors {
        let display = format!("{}", err);
        assert!(!display.is_empty(), "エラーメッセージが空: {:?}", err);
    }
}

/// 致命的エラーの区別
#[test]
fn test_fatal_classification() {
    assert!(EvalError::EndpointUnreachable("x".into()).is_fatal());
    assert!(EvalError::TestsNotFound("x".into()).is_fatal());
    assert!(!EvalError::Http { status: 500, body: String::new() }.is_fatal());
    assert!(!EvalError::ApiParse("x".into()).is_fatal());
    assert!(!EvalError::ApiCall("x".into()).is_fatal());
}

/// 接続エラーのメッセージはOllamaの確認を促す
#[test]
fn test_unreachable_message() {
    let err = EvalError::EndpointUnreachable("http://localhost:11434/api/generate".into());
    let display = format!("{}", err);
    assert!(display.contains("localhost:11434"));
    assert!(display.contains("Ollama"));
}

/// HTTPエラーの表示
#[test]
fn test_http_error_display() {
    let err = EvalError::Http { status: 404, body: "model not found".into() };
    assert_eq!(format!("{}", err), "HTTP 404: model not found");
}

/// IOエラーからの変換
#[test]
fn test_io_error_conversion() {
    let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
    let err: EvalError = io_err.into();

    assert!(matches!(err, EvalError::Io(_)));
    let display = format!("{}", err);
    assert!(display.contains("IO"));
}

/// common::Errorからの変換（透過的エラー）
#[test]
fn test_common_error_conversion() {
    let common_err = grocery_eval_common::Error::Parse("JSON object not found".to_string());
    let err: EvalError = common_err.into();

    assert!(matches!(err, EvalError::Common(_)));
    assert_eq!(format!("{}", err), "Parse error: JSON object not found");
}
