//! 品種カタログ
//!
//! ヘッダー行 + データ行からメモリ上のカタログを構築する。
//! name が空の行は照合対象から除外する。

use crate::csv::parse_csv;
use crate::error::{Error, Result};
use crate::types::ReferenceRecord;
use std::collections::HashSet;

pub const ID_COLUMN: &str = "id";
pub const NAME_COLUMN: &str = "name";

/// 読み込み時に見つかった問題
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CatalogIssues {
    /// name が空で除外した行数
    pub missing_name: usize,
    /// id が空で除外した品種名
    pub missing_id: Vec<String>,
    /// 重複していたid
    pub duplicate_ids: Vec<String>,
}

impl CatalogIssues {
    pub fn is_empty(&self) -> bool {
        self.missing_name == 0 && self.missing_id.is_empty() && self.duplicate_ids.is_empty()
    }
}

/// 照合対象の品種一覧
#[derive(Debug, Clone, Default)]
pub struct ReferenceCatalog {
    columns: Vec<String>,
    records: Vec<ReferenceRecord>,
    issues: CatalogIssues,
}

impl ReferenceCatalog {
    /// ヘッダーと行データから構築
    pub fn from_rows(header: Vec<String>, rows: Vec<Vec<String>>) -> Result<Self> {
        let columns: Vec<String> = header.into_iter().map(|h| h.trim().to_string()).collect();

        let id_col = column_position(&columns, ID_COLUMN)?;
        let name_col = column_position(&columns, NAME_COLUMN)?;

        let mut records = Vec::with_capacity(rows.len());
        let mut issues = CatalogIssues::default();
        let mut seen_ids = HashSet::new();

        for mut fields in rows {
            // 列数をヘッダーに揃える
            fields.resize(columns.len(), String::new());

            let name = fields[name_col].clone();
            if name.trim().is_empty() {
                issues.missing_name += 1;
                continue;
            }

            let id = fields[id_col].trim().to_string();
            if id.is_empty() {
                issues.missing_id.push(name);
                continue;
            }

            if !seen_ids.insert(id.clone()) {
                issues.duplicate_ids.push(id.clone());
            }

            records.push(ReferenceRecord { id, name, fields });
        }

        Ok(Self {
            columns,
            records,
            issues,
        })
    }

    /// CSV文字列から構築（先頭行がヘッダー）
    pub fn from_csv_str(content: &str) -> Result<Self> {
        let mut rows = parse_csv(content)?.into_iter();
        let header = rows
            .next()
            .ok_or_else(|| Error::Catalog("ヘッダー行がありません".into()))?;
        Self::from_rows(header, rows.collect())
    }

    /// 列名（カタログ順）
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn records(&self) -> &[ReferenceRecord] {
        &self.records
    }

    pub fn get(&self, index: usize) -> Option<&ReferenceRecord> {
        self.records.get(index)
    }

    /// 品種名が一致する最初のレコード
    pub fn find_by_name(&self, name: &str) -> Option<&ReferenceRecord> {
        self.records.iter().find(|r| r.name == name)
    }

    pub fn issues(&self) -> &CatalogIssues {
        &self.issues
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

fn column_position(columns: &[String], wanted: &str) -> Result<usize> {
    columns
        .iter()
        .position(|c| c == wanted)
        .ok_or_else(|| Error::Catalog(format!("{}列がありません（列: {}）", wanted, columns.join(", "))))
}
