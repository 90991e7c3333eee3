//! CSV出力

use super::{format_score, matched_columns, AUDIT_COLUMNS};
use crate::error::{AuctionError, Result};
use crate::pipeline::Reconciliation;
use camellia_auction_common::csv::format_record;
use std::path::Path;

/// 照合結果表の内容を生成
pub fn matched_to_string(reconciliation: &Reconciliation) -> String {
    let mut out = String::new();
    out.push_str(&format_record(&matched_columns(reconciliation)));
    out.push('\n');

    for row in &reconciliation.matched {
        let mut fields = row.record.fields.clone();
        fields.push(row.search_term.clone());
        fields.push(format_score(row.match_score));
        out.push_str(&format_record(&fields));
        out.push('\n');
    }

    out
}

/// 照合対応表の内容を生成
pub fn audit_to_string(reconciliation: &Reconciliation) -> String {
    let mut out = String::new();
    out.push_str(&format_record(&AUDIT_COLUMNS));
    out.push('\n');

    for row in &reconciliation.audit {
        let score = format_score(row.score);
        let fields = [
            row.original.as_str(),
            row.cleaned.as_str(),
            row.matched_name.as_str(),
            score.as_str(),
        ];
        out.push_str(&format_record(&fields));
        out.push('\n');
    }

    out
}

pub fn write_matched(reconciliation: &Reconciliation, path: &Path) -> Result<()> {
    write_file(path, &matched_to_string(reconciliation))
}

pub fn write_audit(reconciliation: &Reconciliation, path: &Path) -> Result<()> {
    write_file(path, &audit_to_string(reconciliation))
}

fn write_file(path: &Path, content: &str) -> Result<()> {
    std::fs::write(path, content)
        .map_err(|e| AuctionError::OutputWrite(format!("{}: {}", path.display(), e)))
}
