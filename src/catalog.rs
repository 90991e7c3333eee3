//! 品種カタログファイルの読み込み
//!
//! Excel系（xlsx/xlsm/xlsb/xls/ods）は先頭シート、CSVはそのまま読み込む。
//! いずれも1行目をヘッダーとして扱う。

use crate::error::{AuctionError, Result};
use calamine::{open_workbook_auto, Data, Reader};
use camellia_auction_common::ReferenceCatalog;
use std::path::Path;
use tracing::{debug, warn};

const WORKBOOK_EXTENSIONS: &[&str] = &["xlsx", "xlsm", "xlsb", "xls", "ods"];

/// カタログを読み込む
pub fn load_catalog(path: &Path) -> Result<ReferenceCatalog> {
    if !path.exists() {
        return Err(AuctionError::FileNotFound(path.display().to_string()));
    }

    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();

    let catalog = if ext == "csv" {
        let content = std::fs::read_to_string(path)
            .map_err(|e| AuctionError::CatalogLoad(format!("{}: {}", path.display(), e)))?;
        ReferenceCatalog::from_csv_str(&content)?
    } else if WORKBOOK_EXTENSIONS.contains(&ext.as_str()) {
        load_workbook(path)?
    } else {
        return Err(AuctionError::CatalogLoad(format!(
            "未対応の形式です: {}（xlsx/xls/ods/csv）",
            path.display()
        )));
    };

    report_issues(&catalog);
    debug!(records = catalog.len(), columns = ?catalog.columns(), "カタログ読み込み完了");

    Ok(catalog)
}

fn load_workbook(path: &Path) -> Result<ReferenceCatalog> {
    let mut workbook = open_workbook_auto(path)
        .map_err(|e| AuctionError::CatalogLoad(format!("{}: {}", path.display(), e)))?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| AuctionError::CatalogLoad(format!("{}: シートがありません", path.display())))?
        .map_err(|e| AuctionError::CatalogLoad(format!("{}: {}", path.display(), e)))?;

    let mut rows = range
        .rows()
        .map(|row| row.iter().map(cell_to_string).collect::<Vec<_>>());

    let header = rows
        .next()
        .ok_or_else(|| AuctionError::CatalogLoad(format!("{}: ヘッダー行がありません", path.display())))?;

    // 完全な空行は除外
    let rows: Vec<Vec<String>> = rows
        .filter(|row| row.iter().any(|cell| !cell.trim().is_empty()))
        .collect();

    Ok(ReferenceCatalog::from_rows(header, rows)?)
}

fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Float(f) => format_number(*f),
        Data::Int(i) => i.to_string(),
        Data::Bool(b) => b.to_string(),
        other => other.to_string(),
    }
}

/// 整数値の浮動小数は小数部なしで表記（id 12.0 → "12"）
pub fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}

fn report_issues(catalog: &ReferenceCatalog) {
    let issues = catalog.issues();

    if issues.missing_name > 0 {
        debug!(rows = issues.missing_name, "nameが空の行を除外");
    }
    for name in &issues.missing_id {
        warn!(name = %name, "idが空のため照合対象から除外");
    }
    for id in &issues.duplicate_ids {
        warn!(id = %id, "idが重複しています（画像ファイル名が衝突します）");
    }
}
