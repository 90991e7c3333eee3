pub mod csv;
pub mod excel;

use crate::cli::ExportFormat;
use crate::error::Result;
use crate::pipeline::Reconciliation;
use std::path::{Path, PathBuf};

pub const SEARCH_TERM_COLUMN: &str = "search_term";
pub const MATCH_SCORE_COLUMN: &str = "match_score";
pub const AUDIT_COLUMNS: [&str; 4] = ["original", "cleaned", "matched_name", "score"];

/// スコアの表記（100.0 → "100"）
pub fn format_score(score: f64) -> String {
    format!("{}", score)
}

/// 照合結果表の列名（カタログ列 + search_term, match_score）
pub fn matched_columns(reconciliation: &Reconciliation) -> Vec<String> {
    let mut columns = reconciliation.columns.clone();
    columns.push(SEARCH_TERM_COLUMN.to_string());
    columns.push(MATCH_SCORE_COLUMN.to_string());
    columns
}

fn output_path_for_format(output: &Path, extension: &str) -> PathBuf {
    output.with_extension(extension)
}

/// 照合結果表と照合対応表を出力し、書き込んだパスを返す
pub fn export_reconciliation(
    reconciliation: &Reconciliation,
    format: &ExportFormat,
    output: &Path,
    match_list: &Path,
) -> Result<Vec<PathBuf>> {
    let mut written = Vec::new();

    if matches!(format, ExportFormat::Csv | ExportFormat::Both) {
        let output_path = output_path_for_format(output, "csv");
        let match_list_path = output_path_for_format(match_list, "csv");

        csv::write_matched(reconciliation, &output_path)?;
        csv::write_audit(reconciliation, &match_list_path)?;
        written.push(output_path);
        written.push(match_list_path);
    }

    if matches!(format, ExportFormat::Excel | ExportFormat::Both) {
        let output_path = output_path_for_format(output, "xlsx");
        let match_list_path = output_path_for_format(match_list, "xlsx");

        excel::write_matched(reconciliation, &output_path)?;
        excel::write_audit(reconciliation, &match_list_path)?;
        written.push(output_path);
        written.push(match_list_path);
    }

    Ok(written)
}
