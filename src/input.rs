//! 出品リストの読み込み

use crate::error::{AuctionError, Result};
use std::path::Path;

/// 出品リストを読み込む（空行は除外）
pub fn read_entries(path: &Path) -> Result<Vec<String>> {
    if !path.exists() {
        return Err(AuctionError::FileNotFound(path.display().to_string()));
    }

    let content = std::fs::read_to_string(path)
        .map_err(|e| AuctionError::InputRead(format!("{}: {}", path.display(), e)))?;

    Ok(parse_entries(&content))
}

/// テキストを出品行に分解
///
/// 行末の空白は除去し、先頭の空白は残す。
pub fn parse_entries(content: &str) -> Vec<String> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);

    content
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| line.trim_end().to_string())
        .collect()
}
