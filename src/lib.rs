//! オークション出品リストとツバキ品種カタログの照合・画像取得

pub mod catalog;
pub mod cli;
pub mod config;
pub mod error;
pub mod export;
pub mod fetcher;
pub mod input;
pub mod pipeline;
pub mod summary;
