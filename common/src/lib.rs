//! Camellia Auction Common Library
//!
//! 出品リストと品種カタログの照合ロジック（I/Oなし）

pub mod types;
pub mod error;
pub mod normalizer;
pub mod matcher;
pub mod catalog;
pub mod csv;

pub use types::{AuditRow, MatchResult, MatchedRow, ReferenceRecord};
pub use error::{Error, Result};
pub use normalizer::normalize;
pub use matcher::{best_match, match_query, ratio, DEFAULT_THRESHOLD};
pub use catalog::{CatalogIssues, ReferenceCatalog};
