//! 照合パイプラインの統合テスト
//!
//! 画像取得はメモリ上の取得元で代替する。

use camellia_auction::fetcher::{image_url, FetchError, ImageFetchOutcome, ImageFetcher, ImageSource};
use camellia_auction::pipeline::{self, EntryOutcome, ReconcileOptions};
use camellia_auction_common::ReferenceCatalog;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tempfile::tempdir;

const PRIMARY: &str = "https://primary.example/images/";
const BACKUP: &str = "https://backup.example/images/";
const JPEG: &[u8] = &[0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, b'J', b'F', b'I', b'F', 0x00];

/// URL → 応答データ（未登録は404）
#[derive(Clone, Default)]
struct MemorySource {
    responses: HashMap<String, Vec<u8>>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl MemorySource {
    fn with(mut self, url: String, body: &[u8]) -> Self {
        self.responses.insert(url, body.to_vec());
        self
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

impl ImageSource for MemorySource {
    async fn get(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        self.calls.lock().unwrap().push(url.to_string());
        self.responses.get(url).cloned().ok_or(FetchError::Status(404))
    }
}

fn primary(name: &str) -> String {
    image_url(PRIMARY, name)
}

fn backup(name: &str) -> String {
    image_url(BACKUP, name)
}

fn catalog() -> ReferenceCatalog {
    ReferenceCatalog::from_csv_str("id,name\n1,Debutante\n2,Pink Perfection\n").unwrap()
}

fn entries(lines: &[&str]) -> Vec<String> {
    lines.iter().map(|s| s.to_string()).collect()
}

fn fetcher(source: MemorySource, dir: &std::path::Path) -> Arc<ImageFetcher<MemorySource>> {
    let fetcher = ImageFetcher::new(source, PRIMARY, BACKUP, dir.join("images"));
    fetcher.prepare().unwrap();
    Arc::new(fetcher)
}

/// 典型例: 1件照合・1件未照合
#[tokio::test]
async fn test_end_to_end_scenario() {
    let dir = tempdir().unwrap();
    let source = MemorySource::default().with(primary("Debutante"), JPEG);
    let fetcher = fetcher(source.clone(), dir.path());

    let lines = entries(&["1. Debutante", "Unknown Flower Xyz123"]);
    let rec = pipeline::reconcile(&lines, &catalog(), Some(fetcher), &ReconcileOptions::default()).await;

    assert_eq!(rec.matched.len(), 1);
    assert_eq!(rec.matched[0].record.id, "1");
    assert_eq!(rec.matched[0].match_score, 100.0);
    assert_eq!(rec.matched[0].search_term, "Debutante");

    assert_eq!(rec.audit.len(), 2);
    assert_eq!(rec.audit[0].original, "1. Debutante");
    assert_eq!(rec.audit[1].original, "Unknown Flower Xyz123");
    assert!(rec.audit[1].score < 85.0);

    assert_eq!(rec.unmatched.len(), 1);
    assert!(rec.unmatched[0].best_guess.is_some());
    assert!(rec.missing_images.is_empty());

    let image = dir.path().join("images").join("1.jpg");
    assert_eq!(std::fs::read(&image).unwrap(), JPEG);
    assert_eq!(rec.outcomes[0], EntryOutcome::Complete { path: image });
    assert_eq!(rec.outcomes[1], EntryOutcome::Rejected);

    // 未照合の出品は取得しない
    assert_eq!(source.calls(), vec![primary("Debutante")]);
}

/// 優先URL失敗 → 予備URL成功
#[tokio::test]
async fn test_backup_used_when_primary_fails() {
    let dir = tempdir().unwrap();
    let source = MemorySource::default().with(backup("Pink Perfection"), JPEG);
    let fetcher = fetcher(source.clone(), dir.path());

    let rec = pipeline::reconcile(
        &entries(&["Pink Perfection (grafted plant)"]),
        &catalog(),
        Some(fetcher),
        &ReconcileOptions::default(),
    )
    .await;

    assert!(rec.missing_images.is_empty());
    assert_eq!(rec.images_saved(), 1);
    assert!(dir.path().join("images").join("2.jpg").exists());
    assert_eq!(source.calls(), vec![primary("Pink Perfection"), backup("Pink Perfection")]);

    let files: Vec<_> = std::fs::read_dir(dir.path().join("images")).unwrap().collect();
    assert_eq!(files.len(), 1);
}

/// 両方失敗 → 画像なしリストに記録、ファイルは作らない
#[tokio::test]
async fn test_both_sources_fail() {
    let dir = tempdir().unwrap();
    let source = MemorySource::default();
    let fetcher = fetcher(source, dir.path());

    let rec = pipeline::reconcile(&entries(&["Debutante"]), &catalog(), Some(fetcher), &ReconcileOptions::default()).await;

    // 画像がなくても照合済みとして出力される
    assert_eq!(rec.matched.len(), 1);
    assert_eq!(rec.missing_images.len(), 1);
    assert_eq!(rec.missing_images[0].primary_url, primary("Debutante"));
    assert_eq!(rec.missing_images[0].backup_url, backup("Debutante"));
    assert!(matches!(rec.outcomes[0], EntryOutcome::ImageMissing { .. }));

    let files: Vec<_> = std::fs::read_dir(dir.path().join("images")).unwrap().collect();
    assert!(files.is_empty(), "ファイルが作成されている: {:?}", files);
}

/// 画像でないレスポンスは失敗扱い
#[tokio::test]
async fn test_non_image_body_rejected() {
    let dir = tempdir().unwrap();
    let source = MemorySource::default()
        .with(primary("Debutante"), b"<html>404</html>")
        .with(backup("Debutante"), b"");
    let fetcher = fetcher(source, dir.path());

    let outcome = fetcher.fetch(catalog().get(0).unwrap()).await;
    assert!(matches!(outcome, ImageFetchOutcome::Failed { .. }));
    assert!(!dir.path().join("images").join("1.jpg").exists());
}

/// 画像チェック無効時は内容を問わず保存
#[tokio::test]
async fn test_verification_disabled() {
    let dir = tempdir().unwrap();
    let source = MemorySource::default().with(primary("Debutante"), b"not really a jpeg");
    let fetcher = ImageFetcher::new(source, PRIMARY, BACKUP, dir.path()).with_verification(false);

    let outcome = fetcher.fetch(catalog().get(0).unwrap()).await;
    assert_eq!(outcome, ImageFetchOutcome::Fetched { path: dir.path().join("1.jpg") });
}

/// 既存ファイルは上書き
#[tokio::test]
async fn test_existing_image_overwritten() {
    let dir = tempdir().unwrap();
    let source = MemorySource::default().with(primary("Debutante"), JPEG);
    let fetcher = fetcher(source, dir.path());
    let path = dir.path().join("images").join("1.jpg");
    std::fs::write(&path, b"stale").unwrap();

    let outcome = fetcher.fetch(catalog().get(0).unwrap()).await;
    assert!(outcome.is_fetched());
    assert_eq!(std::fs::read(&path).unwrap(), JPEG);
}

/// 同じ品種の出品が複数あっても取得は1回
#[tokio::test]
async fn test_same_record_fetched_once() {
    let dir = tempdir().unwrap();
    let source = MemorySource::default().with(primary("Debutante"), JPEG);
    let fetcher = fetcher(source.clone(), dir.path());

    let lines = entries(&["1. Debutante", "2. Debutante (grafted)", "3. Debutante"]);
    let rec = pipeline::reconcile(&lines, &catalog(), Some(fetcher), &ReconcileOptions::default()).await;

    assert_eq!(rec.matched.len(), 3);
    assert_eq!(rec.images_saved(), 3);
    assert_eq!(source.calls().len(), 1);
}

/// 並列取得でも出力は入力順、失敗は他の出品に影響しない
#[tokio::test]
async fn test_parallel_fetch_keeps_input_order() {
    let dir = tempdir().unwrap();
    let names: Vec<String> = (1..=12).map(|i| format!("Cultivar {:02}", i)).collect();

    let mut csv = String::from("id,name\n");
    let mut source = MemorySource::default();
    for (i, name) in names.iter().enumerate() {
        csv.push_str(&format!("{},{}\n", i + 1, name));
        // 3の倍数は画像なし
        if (i + 1) % 3 != 0 {
            source = source.with(primary(name), JPEG);
        }
    }
    let catalog = ReferenceCatalog::from_csv_str(&csv).unwrap();
    let fetcher = fetcher(source.clone(), dir.path());

    let lines: Vec<String> = names.iter().rev().enumerate().map(|(i, n)| format!("{}. {}", i + 1, n)).collect();
    let options = ReconcileOptions {
        jobs: 4,
        ..Default::default()
    };
    let rec = pipeline::reconcile(&lines, &catalog, Some(fetcher), &options).await;

    assert_eq!(rec.audit.len(), 12);
    for (row, line) in rec.audit.iter().zip(&lines) {
        assert_eq!(&row.original, line);
    }
    assert_eq!(rec.matched.len(), 12);
    assert_eq!(rec.matched[0].record.name, "Cultivar 12");
    assert_eq!(rec.missing_images.len(), 4);
    assert_eq!(rec.images_saved(), 8);
    // 優先8件 + 失敗4件×2
    assert_eq!(source.calls().len(), 16);
}

/// 同じidの品種は並列取得でも1回だけ書き込み、結果を共有する
#[tokio::test]
async fn test_shared_id_fetched_once_in_parallel() {
    let dir = tempdir().unwrap();
    let names: Vec<String> = (1..=8).map(|i| format!("Variety {:02}", i)).collect();

    let mut csv = String::from("id,name\n");
    let mut source = MemorySource::default();
    for name in &names {
        csv.push_str(&format!("7,{}\n", name));
        source = source.with(primary(name), JPEG);
    }
    let catalog = ReferenceCatalog::from_csv_str(&csv).unwrap();
    let options = ReconcileOptions {
        jobs: 8,
        ..Default::default()
    };

    for _ in 0..10 {
        let fetcher = fetcher(source.clone(), dir.path());
        let rec = pipeline::reconcile(&names, &catalog, Some(fetcher), &options).await;

        assert_eq!(rec.matched.len(), 8);
        assert!(rec.missing_images.is_empty());
        assert_eq!(rec.images_saved(), 8);
        for outcome in &rec.outcomes {
            assert_eq!(
                outcome,
                &EntryOutcome::Complete {
                    path: dir.path().join("images").join("7.jpg")
                }
            );
        }
    }

    assert_eq!(source.calls().len(), 10);
    assert!(dir.path().join("images").join("7.jpg").exists());
    assert!(!dir.path().join("images").join("7.jpg.part").exists());
}

/// 同じ入力なら同じ結果
#[test]
fn test_reconcile_is_deterministic() {
    let catalog = ReferenceCatalog::from_csv_str("id,name\n1,Debutante\n2,Debutante\n3,Debutant\n").unwrap();
    let lines = entries(&["Debutante", "Debutantes", "Debu"]);

    let first = pipeline::reconcile_without_images(&lines, &catalog, 85.0);
    for _ in 0..5 {
        let again = pipeline::reconcile_without_images(&lines, &catalog, 85.0);
        assert_eq!(again.audit, first.audit);
        assert_eq!(again.matched, first.matched);
    }
    assert_eq!(first.matched[0].record.id, "1");
}
