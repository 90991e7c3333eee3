//! HTTP経由の画像取得

use super::{FetchError, ImageSource};
use crate::error::{AuctionError, Result};
use reqwest::Client;
use std::time::Duration;

pub struct HttpImageSource {
    client: Client,
}

impl HttpImageSource {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("camellia-auction/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| AuctionError::HttpClient(e.to_string()))?;

        Ok(Self { client })
    }
}

impl ImageSource for HttpImageSource {
    async fn get(&self, url: &str) -> std::result::Result<Vec<u8>, FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        Ok(bytes.to_vec())
    }
}
