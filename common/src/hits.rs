//! 評価結果（ヒットテーブル）
//!
//! 1行 = (Collection, Record, Concept|XPath, Content) の生の評価出力。

use crate::error::{Error, Result};
use crate::table::Table;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::io::Read;
use std::path::Path;

/// 集計の対象領域
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Domain {
    /// 制御語彙としてのドキュメンテーション概念
    #[default]
    Concept,
    /// 生の構造パス
    XPath,
}

impl Domain {
    /// ヒットテーブル・集計表のキー列名
    pub fn key_column(self) -> &'static str {
        match self {
            Domain::Concept => "Concept",
            Domain::XPath => "XPath",
        }
    }

    /// 集計表の出現回数列名
    pub fn count_column(self) -> &'static str {
        match self {
            Domain::Concept => "ConceptCount",
            Domain::XPath => "XPathCount",
        }
    }
}

impl std::str::FromStr for Domain {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "concept" | "concepts" => Ok(Domain::Concept),
            "xpath" | "xpaths" | "element" => Ok(Domain::XPath),
            _ => Err(format!("Unknown domain: {}. Use concept or xpath", s)),
        }
    }
}

impl std::fmt::Display for Domain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key_column())
    }
}

/// 評価結果の1行
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct HitRecord {
    #[serde(rename = "Collection")]
    pub collection: String,
    #[serde(rename = "Record")]
    pub record: String,
    /// 概念名またはXPath
    #[serde(rename = "Concept", alias = "XPath")]
    pub term: String,
    #[serde(rename = "Content", default)]
    pub content: String,
    #[serde(rename = "Dialect", default)]
    pub dialect: String,
}

impl HitRecord {
    pub fn new(collection: &str, record: &str, term: &str, content: &str, dialect: &str) -> Self {
        Self {
            collection: collection.to_string(),
            record: record.to_string(),
            term: term.to_string(),
            content: content.to_string(),
            dialect: dialect.to_string(),
        }
    }
}

/// 領域付きのヒットテーブル
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HitTable {
    pub domain: Domain,
    pub hits: Vec<HitRecord>,
}

impl HitTable {
    pub fn new(domain: Domain, hits: Vec<HitRecord>) -> Self {
        Self { domain, hits }
    }

    pub fn read_csv(path: &Path, domain: Domain) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file, domain, &path.display().to_string())
    }

    /// CSVから読み込み
    ///
    /// 列の順序は問わないが `Collection`, `Record` と領域のキー列は必須。
    pub fn from_reader<R: Read>(reader: R, domain: Domain, source: &str) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(reader);

        let headers = reader.headers()?.clone();
        if headers.is_empty() {
            return Err(Error::EmptyTable(source.to_string()));
        }
        for required in ["Collection", "Record", domain.key_column()] {
            if !headers.iter().any(|h| h == required) {
                return Err(Error::MissingColumn {
                    column: required.to_string(),
                    source_name: source.to_string(),
                });
            }
        }

        let mut hits = Vec::new();
        for record in reader.deserialize() {
            let hit: HitRecord = record?;
            hits.push(hit);
        }

        Ok(Self { domain, hits })
    }

    pub fn len(&self) -> usize {
        self.hits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }

    /// 最初に現れた空でない Dialect
    pub fn dialect(&self) -> Option<&str> {
        self.hits
            .iter()
            .map(|h| h.dialect.as_str())
            .find(|d| !d.is_empty())
    }

    /// 重複を除いたレコード名（出現順）
    pub fn distinct_records(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.hits
            .iter()
            .map(|h| h.record.as_str())
            .filter(|r| seen.insert(*r))
            .collect()
    }

    pub fn to_table(&self) -> Table {
        let mut table = Table::new([
            "Collection",
            "Record",
            self.domain.key_column(),
            "Content",
            "Dialect",
        ]);
        for hit in &self.hits {
            table.push_row(vec![
                hit.collection.clone(),
                hit.record.clone(),
                hit.term.clone(),
                hit.content.clone(),
                hit.dialect.clone(),
            ]);
        }
        table
    }

    pub fn write_csv(&self, path: &Path) -> Result<()> {
        self.to_table().write_csv(path)
    }
}
