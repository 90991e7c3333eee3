//! 照合処理の型定義
//!
//! - ReferenceRecord: カタログの1品種
//! - MatchResult: 出品1件の照合結果
//! - MatchedRow: 採用された照合（出力表の1行）
//! - AuditRow: 監査用の対応表（全出品1行ずつ）

use serde::{Deserialize, Serialize};

/// カタログの1行
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceRecord {
    /// 画像ファイル名に使う識別子
    pub id: String,
    /// 品種名（空でない）
    pub name: String,
    /// カタログ列順の全セル値（id, nameを含む）
    pub fields: Vec<String>,
}

/// 出品1件の照合結果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    /// 入力行そのまま
    pub original: String,
    /// 正規化後の検索語
    pub query: String,
    /// 最高スコアの候補名（カタログが空ならNone）
    pub candidate: Option<String>,
    /// 候補のカタログ内位置
    pub record_index: Option<usize>,
    /// 類似度 0-100
    pub score: f64,
    /// score >= 閾値
    pub accepted: bool,
}

impl MatchResult {
    /// 採用された場合のみレコード位置を返す
    pub fn accepted_index(&self) -> Option<usize> {
        if self.accepted {
            self.record_index
        } else {
            None
        }
    }
}

/// 照合済み出力表の1行
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchedRow {
    pub record: ReferenceRecord,
    pub search_term: String,
    pub match_score: f64,
}

/// 監査表の1行
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditRow {
    pub original: String,
    pub cleaned: String,
    /// 採用名、閾値未満なら最有力候補、候補なしなら空
    pub matched_name: String,
    pub score: f64,
}

impl From<&MatchResult> for AuditRow {
    fn from(result: &MatchResult) -> Self {
        Self {
            original: result.original.clone(),
            cleaned: result.query.clone(),
            matched_name: result.candidate.clone().unwrap_or_default(),
            score: result.score,
        }
    }
}
