//! 画像取得モジュール
//!
//! 照合済みの品種について、優先URL → 予備URLの順に画像を取得し
//! `<images_dir>/<id>.jpg` に保存する。
//! 取得失敗はエラーではなく `ImageFetchOutcome::Failed` として返す。

mod http;

pub use http::HttpImageSource;

use crate::config::Config;
use crate::error::{AuctionError, Result};
use camellia_auction_common::ReferenceRecord;
use serde::Serialize;
use std::future::Future;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

/// 画像の取得元
pub trait ImageSource: Send + Sync {
    /// URLの内容を取得（2xx以外は失敗）
    fn get(&self, url: &str) -> impl Future<Output = std::result::Result<Vec<u8>, FetchError>> + Send;
}

/// 1回の取得試行の失敗理由
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("通信エラー: {0}")]
    Transport(String),

    #[error("HTTPステータス {0}")]
    Status(u16),

    #[error("レスポンスが空です")]
    EmptyBody,

    #[error("画像データではありません")]
    NotAnImage,

    #[error("保存に失敗: {0}")]
    Write(#[from] std::io::Error),
}

/// 1品種の画像取得結果
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ImageFetchOutcome {
    Fetched { path: PathBuf },
    Failed {
        record: ReferenceRecord,
        primary_url: String,
        backup_url: String,
        reason: String,
    },
}

impl ImageFetchOutcome {
    pub fn is_fetched(&self) -> bool {
        matches!(self, ImageFetchOutcome::Fetched { .. })
    }
}

/// 画像URLを生成（`/` を含めて全てエンコード）
pub fn image_url(base_url: &str, name: &str) -> String {
    format!("{}{}", base_url, urlencoding::encode(&format!("{}.jpg", name)))
}

pub struct ImageFetcher<S> {
    source: S,
    primary_base_url: String,
    backup_base_url: String,
    images_dir: PathBuf,
    verify_images: bool,
}

impl<S: ImageSource> ImageFetcher<S> {
    pub fn new(
        source: S,
        primary_base_url: impl Into<String>,
        backup_base_url: impl Into<String>,
        images_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            source,
            primary_base_url: primary_base_url.into(),
            backup_base_url: backup_base_url.into(),
            images_dir: images_dir.into(),
            verify_images: true,
        }
    }

    pub fn from_config(source: S, config: &Config) -> Self {
        Self::new(
            source,
            config.primary_base_url.clone(),
            config.backup_base_url.clone(),
            config.images_dir.clone(),
        )
        .with_verification(config.verify_images)
    }

    pub fn with_verification(mut self, verify_images: bool) -> Self {
        self.verify_images = verify_images;
        self
    }

    pub fn images_dir(&self) -> &Path {
        &self.images_dir
    }

    /// 保存先フォルダを用意
    pub fn prepare(&self) -> Result<()> {
        std::fs::create_dir_all(&self.images_dir)
            .map_err(|e| AuctionError::ImagesDir(format!("{}: {}", self.images_dir.display(), e)))
    }

    pub fn local_path(&self, record: &ReferenceRecord) -> PathBuf {
        self.images_dir.join(format!("{}.jpg", record.id))
    }

    /// 画像を取得して保存
    pub async fn fetch(&self, record: &ReferenceRecord) -> ImageFetchOutcome {
        let local_path = self.local_path(record);

        let primary_url = image_url(&self.primary_base_url, &record.name);
        match self.download(&primary_url, &local_path).await {
            Ok(()) => {
                debug!(name = %record.name, path = %local_path.display(), "画像を保存");
                return ImageFetchOutcome::Fetched { path: local_path };
            }
            Err(e) => {
                warn!(name = %record.name, url = %primary_url, error = %e, "優先URLで取得失敗、予備URLを試行");
            }
        }

        let backup_url = image_url(&self.backup_base_url, &record.name);
        match self.download(&backup_url, &local_path).await {
            Ok(()) => {
                debug!(name = %record.name, path = %local_path.display(), "予備URLから画像を保存");
                ImageFetchOutcome::Fetched { path: local_path }
            }
            Err(e) => {
                warn!(name = %record.name, url = %backup_url, error = %e, "予備URLでも取得失敗");
                ImageFetchOutcome::Failed {
                    record: record.clone(),
                    primary_url,
                    backup_url,
                    reason: e.to_string(),
                }
            }
        }
    }

    /// 取得できなかった場合の結果を生成
    pub fn failed(&self, record: &ReferenceRecord, reason: impl Into<String>) -> ImageFetchOutcome {
        ImageFetchOutcome::Failed {
            record: record.clone(),
            primary_url: image_url(&self.primary_base_url, &record.name),
            backup_url: image_url(&self.backup_base_url, &record.name),
            reason: reason.into(),
        }
    }

    async fn download(&self, url: &str, dest: &Path) -> std::result::Result<(), FetchError> {
        let bytes = self.source.get(url).await?;

        if self.verify_images {
            verify_image(&bytes)?;
        }

        write_atomically(dest, &bytes).await?;
        Ok(())
    }
}

fn verify_image(bytes: &[u8]) -> std::result::Result<(), FetchError> {
    if bytes.is_empty() {
        return Err(FetchError::EmptyBody);
    }
    image::guess_format(bytes).map_err(|_| FetchError::NotAnImage)?;
    Ok(())
}

/// `.part` に書き込んでから置き換える（失敗時は `.part` を削除）
async fn write_atomically(dest: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let part = part_path(dest);

    let result = async {
        tokio::fs::write(&part, bytes).await?;
        tokio::fs::rename(&part, dest).await
    }
    .await;

    if result.is_err() {
        if let Err(e) = tokio::fs::remove_file(&part).await {
            debug!(path = %part.display(), error = %e, "一時ファイルを削除できません");
        }
    }

    result
}

fn part_path(dest: &Path) -> PathBuf {
    let mut name = dest.as_os_str().to_owned();
    name.push(".part");
    PathBuf::from(name)
}
