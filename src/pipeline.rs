//! 照合パイプライン
//!
//! 出品ごとの状態遷移:
//! - 正規化 → 照合 → 採用 / 不採用
//! - 採用 → 画像取得 → 完了 / 画像なし（どちらも照合済みとして出力）
//! - 不採用 → 未照合リストへ（最有力候補とスコアを保持）
//!
//! 監査表は全出品を入力順に1行ずつ持つ。

use crate::fetcher::{ImageFetchOutcome, ImageFetcher, ImageSource};
use camellia_auction_common::{
    match_query, normalize, AuditRow, MatchResult, MatchedRow, ReferenceCatalog, ReferenceRecord,
    DEFAULT_THRESHOLD,
};
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use serde::Serialize;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, warn};

/// 出品1件の最終状態
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum EntryOutcome {
    /// 照合済み・画像保存済み
    Complete { path: PathBuf },
    /// 照合済み・画像取得失敗
    ImageMissing { primary_url: String, backup_url: String },
    /// 照合済み・画像取得なし
    Matched,
    /// 閾値未満または候補なし
    Rejected,
}

/// 未照合の出品
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Unmatched {
    pub original: String,
    pub query: String,
    pub best_guess: Option<String>,
    pub score: f64,
}

/// 画像が取得できなかった出品
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MissingImage {
    pub id: String,
    pub name: String,
    pub primary_url: String,
    pub backup_url: String,
    pub reason: String,
}

/// 照合結果一式
#[derive(Debug, Clone, Default, Serialize)]
pub struct Reconciliation {
    /// カタログの列名
    pub columns: Vec<String>,
    /// 採用された照合（入力順）
    pub matched: Vec<MatchedRow>,
    /// 全出品の監査表（入力順）
    pub audit: Vec<AuditRow>,
    /// 出品ごとの最終状態（audit と同じ並び）
    pub outcomes: Vec<EntryOutcome>,
    pub unmatched: Vec<Unmatched>,
    pub missing_images: Vec<MissingImage>,
}

impl Reconciliation {
    pub fn images_saved(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, EntryOutcome::Complete { .. }))
            .count()
    }
}

#[derive(Debug, Clone)]
pub struct ReconcileOptions {
    pub threshold: f64,
    /// 画像取得の同時実行数（1以下で逐次）
    pub jobs: usize,
    pub show_progress: bool,
}

impl Default for ReconcileOptions {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            jobs: 1,
            show_progress: false,
        }
    }
}

/// 全出品を正規化して照合（入力順を維持）
pub fn match_entries(entries: &[String], catalog: &ReferenceCatalog, threshold: f64) -> Vec<MatchResult> {
    entries
        .par_iter()
        .map(|raw| {
            let query = normalize(raw);
            match_query(raw, &query, catalog, threshold)
        })
        .collect()
}

/// 採用された品種の画像を取得
///
/// 画像ファイルは `id` ごとに1つなので、同じ `id` の品種は1回だけ取得して結果を共有する。
/// 結果はカタログ内位置で返す。
pub async fn fetch_images<S>(
    fetcher: Arc<ImageFetcher<S>>,
    catalog: &ReferenceCatalog,
    results: &[MatchResult],
    jobs: usize,
    progress: &ProgressBar,
) -> HashMap<usize, ImageFetchOutcome>
where
    S: ImageSource + 'static,
{
    let mut owners: HashMap<&str, usize> = HashMap::new();
    let mut targets: Vec<(usize, ReferenceRecord)> = Vec::new();
    let mut shared: Vec<(usize, usize)> = Vec::new();

    for index in results.iter().filter_map(|r| r.accepted_index()) {
        let Some(record) = catalog.get(index) else {
            continue;
        };
        match owners.get(record.id.as_str()) {
            Some(&owner) if owner == index => {}
            Some(&owner) => shared.push((index, owner)),
            None => {
                owners.insert(record.id.as_str(), index);
                targets.push((index, record.clone()));
            }
        }
    }

    progress.set_length(targets.len() as u64);
    let mut outcomes = fetch_targets(fetcher, targets, jobs, progress).await;

    for (index, owner) in shared {
        if let Some(outcome) = outcomes.get(&owner).cloned() {
            outcomes.insert(index, outcome);
        }
    }

    outcomes
}

async fn fetch_targets<S>(
    fetcher: Arc<ImageFetcher<S>>,
    targets: Vec<(usize, ReferenceRecord)>,
    jobs: usize,
    progress: &ProgressBar,
) -> HashMap<usize, ImageFetchOutcome>
where
    S: ImageSource + 'static,
{
    let mut outcomes = HashMap::with_capacity(targets.len());

    if jobs <= 1 {
        for (index, record) in targets {
            progress.set_message(record.name.clone());
            let outcome = fetcher.fetch(&record).await;
            outcomes.insert(index, outcome);
            progress.inc(1);
        }
        return outcomes;
    }

    let semaphore = Arc::new(Semaphore::new(jobs));
    let mut tasks = JoinSet::new();
    let mut pending: HashMap<usize, ReferenceRecord> = HashMap::new();

    for (index, record) in targets {
        pending.insert(index, record.clone());
        let fetcher = Arc::clone(&fetcher);
        let semaphore = Arc::clone(&semaphore);
        tasks.spawn(async move {
            let _permit = semaphore.acquire_owned().await.ok();
            let outcome = fetcher.fetch(&record).await;
            (index, outcome)
        });
    }

    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((index, outcome)) => {
                pending.remove(&index);
                outcomes.insert(index, outcome);
                progress.inc(1);
            }
            Err(e) => warn!(error = %e, "画像取得タスクが異常終了"),
        }
    }

    // 異常終了したタスクの品種は取得失敗として扱う
    for (index, record) in pending {
        outcomes.insert(index, fetcher.failed(&record, "画像取得タスクが異常終了"));
    }

    outcomes
}

/// 照合結果と画像取得結果を集約
pub fn assemble(
    catalog: &ReferenceCatalog,
    results: Vec<MatchResult>,
    images: Option<&HashMap<usize, ImageFetchOutcome>>,
) -> Reconciliation {
    let mut reconciliation = Reconciliation {
        columns: catalog.columns().to_vec(),
        ..Default::default()
    };

    for result in results {
        debug!(query = %result.query, candidate = ?result.candidate, score = result.score, accepted = result.accepted, "照合");
        reconciliation.audit.push(AuditRow::from(&result));

        let accepted = result
            .accepted_index()
            .and_then(|index| catalog.get(index).map(|record| (index, record)));

        let outcome = match accepted {
            Some((index, record)) => {
                reconciliation.matched.push(MatchedRow {
                    record: record.clone(),
                    search_term: result.query.clone(),
                    match_score: result.score,
                });

                match images.and_then(|m| m.get(&index)) {
                    Some(ImageFetchOutcome::Fetched { path }) => EntryOutcome::Complete { path: path.clone() },
                    Some(ImageFetchOutcome::Failed { primary_url, backup_url, reason, .. }) => {
                        reconciliation.missing_images.push(MissingImage {
                            id: record.id.clone(),
                            name: record.name.clone(),
                            primary_url: primary_url.clone(),
                            backup_url: backup_url.clone(),
                            reason: reason.clone(),
                        });
                        EntryOutcome::ImageMissing {
                            primary_url: primary_url.clone(),
                            backup_url: backup_url.clone(),
                        }
                    }
                    None => EntryOutcome::Matched,
                }
            }
            None => {
                reconciliation.unmatched.push(Unmatched {
                    original: result.original.clone(),
                    query: result.query.clone(),
                    best_guess: result.candidate.clone(),
                    score: result.score,
                });
                EntryOutcome::Rejected
            }
        };

        reconciliation.outcomes.push(outcome);
    }

    reconciliation
}

/// 照合から画像取得まで一括実行
///
/// `fetcher` が None の場合は画像を取得しない。
pub async fn reconcile<S>(
    entries: &[String],
    catalog: &ReferenceCatalog,
    fetcher: Option<Arc<ImageFetcher<S>>>,
    options: &ReconcileOptions,
) -> Reconciliation
where
    S: ImageSource + 'static,
{
    let results = match_entries(entries, catalog, options.threshold);

    let Some(fetcher) = fetcher else {
        return assemble(catalog, results, None);
    };

    let progress = if options.show_progress {
        fetch_progress_bar()
    } else {
        ProgressBar::hidden()
    };

    let images = fetch_images(fetcher, catalog, &results, options.jobs, &progress).await;
    progress.finish_and_clear();

    assemble(catalog, results, Some(&images))
}

/// 画像取得なしで照合
pub fn reconcile_without_images(
    entries: &[String],
    catalog: &ReferenceCatalog,
    threshold: f64,
) -> Reconciliation {
    let results = match_entries(entries, catalog, threshold);
    assemble(catalog, results, None)
}

fn fetch_progress_bar() -> ProgressBar {
    let progress = ProgressBar::new(0);
    if let Ok(style) = ProgressStyle::default_bar()
        .template("  🌸 [{elapsed_precise}] {bar:30.green/blue} {pos}/{len} {msg}")
    {
        progress.set_style(style.progress_chars("█▉▊▋▌▍▎▏  "));
    }
    progress
}
