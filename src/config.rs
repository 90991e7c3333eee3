use crate::error::{AuctionError, Result};
use camellia_auction_common::DEFAULT_THRESHOLD;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const DEFAULT_PRIMARY_BASE_URL: &str =
    "https://www.atlanticcoastcamelliasociety.org/Camelliae%20Floris%20Bibliotheca/images/";
pub const DEFAULT_BACKUP_BASE_URL: &str =
    "https://www.socalcamelliasociety.org/Camelliae%20Floris%20Bibliotheca/images/";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub primary_base_url: String,
    pub backup_base_url: String,
    pub images_dir: PathBuf,
    pub catalog_path: PathBuf,
    pub threshold: f64,
    pub timeout_seconds: u64,
    /// 取得したデータが画像かどうか確認する
    pub verify_images: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_config()
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = serde_json::from_str(&content)?;
            config.validate()?;
            Ok(config)
        } else {
            Ok(Self::default_config())
        }
    }

    pub fn save(&self) -> Result<()> {
        self.validate()?;
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(&config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| AuctionError::Config("ホームディレクトリが見つかりません".into()))?;
        Ok(home.join(".config").join("camellia-auction").join("config.json"))
    }

    fn default_config() -> Self {
        Self {
            primary_base_url: DEFAULT_PRIMARY_BASE_URL.into(),
            backup_base_url: DEFAULT_BACKUP_BASE_URL.into(),
            images_dir: PathBuf::from("images"),
            catalog_path: PathBuf::from("ACCS - 2026.xlsx"),
            threshold: DEFAULT_THRESHOLD,
            timeout_seconds: 30,
            verify_images: true,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !(0.0..=100.0).contains(&self.threshold) {
            return Err(AuctionError::Config(format!(
                "閾値は0〜100で指定してください: {}",
                self.threshold
            )));
        }
        for url in [&self.primary_base_url, &self.backup_base_url] {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(AuctionError::Config(format!("URLが不正です: {}", url)));
            }
        }
        if self.timeout_seconds == 0 {
            return Err(AuctionError::Config("タイムアウトは1秒以上にしてください".into()));
        }
        Ok(())
    }
}
