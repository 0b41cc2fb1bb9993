//! 方言リファレンス（dialectContains.csv）
//!
//! 先頭列 `Concept` に方言ID、残りの列が既知の概念。1行 = 1方言。
//! セル値はその方言で未出現だった概念の埋め値として使う
//! （空は 0、`-1` は「この方言では該当なし」）。

use crate::error::{Error, Result};
use crate::table::Table;
use std::path::Path;

/// 方言IDの列名
pub const DIALECT_COLUMN: &str = "Concept";

/// 該当なしを表す番兵値
pub const NOT_APPLICABLE: f64 = -1.0;

/// 方言リファレンス全体
#[derive(Debug, Clone)]
pub struct DialectReference {
    table: Table,
}

/// 既知語彙の1項目
#[derive(Debug, Clone, PartialEq)]
pub struct VocabularyEntry {
    pub name: String,
    /// リファレンスのセル値（生の文字列）
    pub raw: String,
}

impl VocabularyEntry {
    /// 出現数行列用の埋め値
    pub fn fill_value(&self) -> f64 {
        self.raw.trim().parse::<f64>().unwrap_or(0.0)
    }

    /// 内容行列用の埋め文字列
    pub fn fill_text(&self) -> String {
        let raw = self.raw.trim();
        if raw.is_empty() {
            "0".to_string()
        } else {
            raw.to_string()
        }
    }
}

/// 特定方言の既知語彙（列順を保持）
#[derive(Debug, Clone, PartialEq)]
pub struct Vocabulary {
    pub dialect: String,
    pub entries: Vec<VocabularyEntry>,
}

impl Vocabulary {
    pub fn get(&self, name: &str) -> Option<&VocabularyEntry> {
        self.entries.iter().find(|e| e.name == name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.name.as_str())
    }
}

impl DialectReference {
    pub fn load(path: &Path) -> Result<Self> {
        Self::from_table(Table::read_csv(path)?)
    }

    pub fn from_table(table: Table) -> Result<Self> {
        table.require_column(DIALECT_COLUMN)?;
        Ok(Self { table })
    }

    /// 登録済みの方言ID
    pub fn dialects(&self) -> Vec<&str> {
        let col = self.table.column(DIALECT_COLUMN).unwrap_or(0);
        self.table
            .rows
            .iter()
            .filter_map(|row| row.get(col).map(String::as_str))
            .collect()
    }

    /// 方言の既知語彙を取得
    pub fn vocabulary(&self, dialect: &str) -> Result<Vocabulary> {
        let key_col = self.table.require_column(DIALECT_COLUMN)?;
        let row = self
            .table
            .rows
            .iter()
            .find(|row| row.get(key_col).map(String::as_str) == Some(dialect))
            .ok_or_else(|| Error::UnknownDialect(dialect.to_string()))?;

        let entries = self
            .table
            .headers
            .iter()
            .enumerate()
            .filter(|(i, name)| *i != key_col && !name.is_empty())
            .map(|(i, name)| VocabularyEntry {
                name: name.clone(),
                raw: row.get(i).cloned().unwrap_or_default(),
            })
            .collect();

        Ok(Vocabulary {
            dialect: dialect.to_string(),
            entries,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference() -> DialectReference {
        let csv = "Concept,Title,Abstract,Purpose,Lineage\n\
                   ISO,0,0,0,0\n\
                   DCITE,0,0,-1,\n";
        DialectReference::from_table(Table::from_reader(csv.as_bytes(), "ref").unwrap()).unwrap()
    }

    #[test]
    fn test_vocabulary_keeps_reference_order() {
        let vocab = reference().vocabulary("ISO").unwrap();
        let names: Vec<&str> = vocab.names().collect();
        assert_eq!(names, vec!["Title", "Abstract", "Purpose", "Lineage"]);
    }

    #[test]
    fn test_fill_values() {
        let vocab = reference().vocabulary("DCITE").unwrap();
        assert_eq!(vocab.get("Purpose").unwrap().fill_value(), NOT_APPLICABLE);
        assert_eq!(vocab.get("Lineage").unwrap().fill_value(), 0.0);
        assert_eq!(vocab.get("Lineage").unwrap().fill_text(), "0");
        assert_eq!(vocab.get("Purpose").unwrap().fill_text(), "-1");
    }

    #[test]
    fn test_unknown_dialect() {
        let err = reference().vocabulary("FGDC").unwrap_err();
        assert!(matches!(err, Error::UnknownDialect(ref d) if d == "FGDC"));
    }

    #[test]
    fn test_dialects() {
        assert_eq!(reference().dialects(), vec!["ISO", "DCITE"]);
    }

    #[test]
    fn test_reference_requires_concept_column() {
        let table = Table::from_reader("Dialect,Title\nISO,0\n".as_bytes(), "bad").unwrap();
        assert!(DialectReference::from_table(table).is_err());
    }
}
