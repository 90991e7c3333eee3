//! 出品名の正規化
//!
//! - 先頭のロット番号（`12. `）を除去
//! - 末尾の注記（`(grafted plant)`）を除去
//! - 前後の空白を除去
//!
//! 変化がなくなるまで繰り返すため、`normalize(normalize(x)) == normalize(x)` が成り立つ。

use regex::Regex;

/// 出品名を検索語に変換
pub fn normalize(raw: &str) -> String {
    let mut current = raw.trim().to_string();

    loop {
        let next = strip_once(&current);
        if next == current {
            return current;
        }
        current = next;
    }
}

fn strip_once(name: &str) -> String {
    lazy_static::lazy_static! {
        // 12. Debutante
        static ref LOT_NUMBER_RE: Regex = Regex::new(r"^\d+\.\s*").unwrap();
        // Pink Perfection (grafted plant)
        static ref ANNOTATION_RE: Regex = Regex::new(r"\s*\([^)]*\)\s*$").unwrap();
    }

    let without_number = LOT_NUMBER_RE.replace(name, "");
    let without_annotation = ANNOTATION_RE.replace(&without_number, "");
    without_annotation.trim().to_string()
}
