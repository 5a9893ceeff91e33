//! 品名の正規化
//!
//! 予測と正解を突き合わせるキーとして使う。
//! 小文字化 → 記号除去 → 数量・単位の除去 → 空白の整理。

use regex::Regex;

lazy_static::lazy_static! {
    // ハイフン・括弧
    static ref PUNCT_RE: Regex = Regex::new(r"[\-()]").unwrap();
    // "1kg", "500 g", "2l", "12 pc", "1 bunch" 等
    static ref QTY_UNIT_RE: Regex =
        Regex::new(r"\b\d+(\.\d+)?\s*(kg|g|l|ml|pc|pcs|bunch|dozen)\b").unwrap();
    // "2x100g" 等
    static ref MULTIPACK_RE: Regex = Regex::new(r"\b\d+x\d+(g|ml)\b").unwrap();
    static ref SPACE_RE: Regex = Regex::new(r"\s+").unwrap();
}

/// 品名を正規化する
///
/// 冪等: `normalize(&normalize(s)) == normalize(s)`
///
/// # Examples
/// ```
/// use grocery_eval_common::normalize;
///
/// assert_eq!(normalize("Atta (Whole Wheat) 5kg"), "atta whole wheat");
/// ```
pub fn normalize(raw: &str) -> String {
    let lowered = raw.to_lowercase();
    let mut current = PUNCT_RE.replace_all(&lowered, " ").into_owned();

    // 除去で新たな数量トークンが隣接することがあるため不動点まで繰り返す
    loop {
        let next = strip_pass(&current);
        if next == current {
            return next;
        }
        current = next;
    }
}

fn strip_pass(s: &str) -> String {
    let s = QTY_UNIT_RE.replace_all(s, "");
    let s = MULTIPACK_RE.replace_all(&s, "");
    let s = SPACE_RE.replace_all(&s, " ");
    s.trim().to_string()
}
