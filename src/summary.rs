//! 実行結果のサマリ表示とJSONレポート

use crate::error::{AuctionError, Result};
use crate::export::format_score;
use crate::pipeline::Reconciliation;
use std::fmt::Write as _;
use std::path::Path;

/// コンソール用サマリを生成
pub fn render_summary(reconciliation: &Reconciliation) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "照合: {}件 / {}件", reconciliation.matched.len(), reconciliation.audit.len());

    let _ = writeln!(out, "\n未照合 ({}件):", reconciliation.unmatched.len());
    for entry in &reconciliation.unmatched {
        match &entry.best_guess {
            Some(guess) => {
                let _ = writeln!(
                    out,
                    "  {} -> 最有力候補: {} (スコア: {})",
                    entry.query,
                    guess,
                    format_score(entry.score)
                );
            }
            None => {
                let _ = writeln!(out, "  {} -> 候補なし", entry.query);
            }
        }
    }

    let _ = writeln!(out, "\n画像なし ({}件):", reconciliation.missing_images.len());
    for missing in &reconciliation.missing_images {
        let _ = writeln!(out, "  {} (id: {})", missing.name, missing.id);
        let _ = writeln!(out, "    URL: {}", missing.primary_url);
        let _ = writeln!(out, "    予備URL: {}", missing.backup_url);
    }

    out
}

/// 照合結果全体をJSONで保存
pub fn write_json_report(reconciliation: &Reconciliation, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(reconciliation)?;
    std::fs::write(path, json)
        .map_err(|e| AuctionError::OutputWrite(format!("{}: {}", path.display(), e)))
}
