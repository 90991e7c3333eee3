//! ファジー照合
//!
//! 検索語とカタログ全品種名の類似度（0-100）を計算し、最高スコアの候補を選ぶ。
//! 同点の場合はカタログ内で先に出現した品種を採用する。

use crate::catalog::ReferenceCatalog;
use crate::types::MatchResult;

/// 採用閾値
pub const DEFAULT_THRESHOLD: f64 = 85.0;

/// 類似度を計算（挿入・削除のみの編集距離ベース）
///
/// `100 * (1 - indel(a, b) / (len(a) + len(b)))`
pub fn ratio(a: &str, b: &str) -> f64 {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();
    let total = a_chars.len() + b_chars.len();

    if total == 0 {
        return 100.0;
    }

    let distance = indel_distance(&a_chars, &b_chars);
    100.0 * (1.0 - distance as f64 / total as f64)
}

/// 挿入・削除の最小回数
fn indel_distance(a: &[char], b: &[char]) -> usize {
    a.len() + b.len() - 2 * lcs_length(a, b)
}

/// 最長共通部分列の長さ
fn lcs_length(a: &[char], b: &[char]) -> usize {
    if a.is_empty() || b.is_empty() {
        return 0;
    }

    let mut prev = vec![0usize; b.len() + 1];
    let mut curr = vec![0usize; b.len() + 1];

    for &ca in a {
        for (j, &cb) in b.iter().enumerate() {
            curr[j + 1] = if ca == cb {
                prev[j] + 1
            } else {
                curr[j].max(prev[j + 1])
            };
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}

/// 最高スコアの候補（カタログ内位置, スコア）
pub fn best_match(query: &str, catalog: &ReferenceCatalog) -> Option<(usize, f64)> {
    let mut best: Option<(usize, f64)> = None;

    for (index, record) in catalog.records().iter().enumerate() {
        let score = ratio(query, &record.name);
        // 同点は先勝ち
        if best.map_or(true, |(_, best_score)| score > best_score) {
            best = Some((index, score));
        }
    }

    best
}

/// 出品1件を照合
pub fn match_query(
    original: &str,
    query: &str,
    catalog: &ReferenceCatalog,
    threshold: f64,
) -> MatchResult {
    match best_match(query, catalog) {
        Some((index, score)) => MatchResult {
            original: original.to_string(),
            query: query.to_string(),
            candidate: catalog.get(index).map(|r| r.name.clone()),
            record_index: Some(index),
            score,
            accepted: score >= threshold,
        },
        None => MatchResult {
            original: original.to_string(),
            query: query.to_string(),
            candidate: None,
            record_index: None,
            score: 0.0,
            accepted: false,
        },
    }
}
