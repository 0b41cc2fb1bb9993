//! CSVテーブル
//!
//! 集計の入出力はすべて「ヘッダ行 + 文字列セル」の表として扱う。
//! 列の並びはCSVのまま保持し、列名で引く。

use crate::error::{Error, Result};
use csv::{ReaderBuilder, WriterBuilder};
use std::io::Read;
use std::path::Path;

/// ヘッダ付きの文字列テーブル
#[derive(Debug, Clone, Default)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
    /// エラーメッセージ用の出所（ファイルパスなど）
    pub source: String,
}

impl PartialEq for Table {
    fn eq(&self, other: &Self) -> bool {
        self.headers == other.headers && self.rows == other.rows
    }
}

impl Table {
    pub fn new<S: Into<String>>(headers: impl IntoIterator<Item = S>) -> Self {
        Self {
            headers: headers.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
            source: "<memory>".to_string(),
        }
    }

    /// CSVファイルを読み込み
    pub fn read_csv(path: &Path) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file, &path.display().to_string())
    }

    /// 任意のリーダーから読み込み
    ///
    /// ヘッダ行が無い（空ファイル）場合は `EmptyTable`。
    /// 列数の足りない行は空文字で埋める。
    pub fn from_reader<R: Read>(reader: R, source: &str) -> Result<Self> {
        let mut reader = ReaderBuilder::new().flexible(true).from_reader(reader);

        let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
        if headers.is_empty() || headers.iter().all(|h| h.is_empty()) {
            return Err(Error::EmptyTable(source.to_string()));
        }

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            let mut row: Vec<String> = record.iter().map(str::to_string).collect();
            if row.len() < headers.len() {
                row.resize(headers.len(), String::new());
            }
            rows.push(row);
        }

        Ok(Self {
            headers,
            rows,
            source: source.to_string(),
        })
    }

    /// CSVとして書き出し（親ディレクトリは作成する）
    pub fn write_csv(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let mut writer = WriterBuilder::new().flexible(true).from_path(path)?;
        self.write_records(&mut writer)?;
        writer.flush()?;
        tracing::debug!(path = %path.display(), rows = self.rows.len(), "table written");
        Ok(())
    }

    fn write_records<W: std::io::Write>(&self, writer: &mut csv::Writer<W>) -> Result<()> {
        writer.write_record(&self.headers)?;
        for row in &self.rows {
            writer.write_record(row)?;
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn width(&self) -> usize {
        self.headers.len()
    }

    pub fn column(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// 必須列のインデックスを取得
    pub fn require_column(&self, name: &str) -> Result<usize> {
        self.column(name).ok_or_else(|| Error::MissingColumn {
            column: name.to_string(),
            source_name: self.source.clone(),
        })
    }

    pub fn push_row(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }

    /// 行 `row` の列 `name` の値
    pub fn value(&self, row: usize, name: &str) -> Option<&str> {
        let col = self.column(name)?;
        self.rows.get(row)?.get(col).map(String::as_str)
    }

    /// 列 `column` が `value` に一致する行だけを残したテーブル
    pub fn filter_rows(&self, column: &str, value: &str) -> Result<Table> {
        let col = self.require_column(column)?;
        Ok(Table {
            headers: self.headers.clone(),
            rows: self
                .rows
                .iter()
                .filter(|row| row.get(col).map(String::as_str) == Some(value))
                .cloned()
                .collect(),
            source: self.source.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_read_pads_short_rows() {
        let csv = "A,B,C\n1,2\n4,5,6\n";
        let table = Table::from_reader(csv.as_bytes(), "test").unwrap();
        assert_eq!(table.headers, vec!["A", "B", "C"]);
        assert_eq!(table.rows[0], vec!["1", "2", ""]);
        assert_eq!(table.value(1, "C"), Some("6"));
    }

    #[test]
    fn test_empty_input_is_error() {
        let result = Table::from_reader("".as_bytes(), "empty.csv");
        assert!(matches!(result, Err(Error::EmptyTable(ref s)) if s == "empty.csv"));
    }

    #[test]
    fn test_require_column_reports_source() {
        let table = Table::from_reader("A,B\n".as_bytes(), "x.csv").unwrap();
        let err = table.require_column("Concept").unwrap_err();
        assert_eq!(err.to_string(), "Missing column 'Concept' in x.csv");
    }

    #[test]
    fn test_write_then_read_creates_parent() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("out.csv");
        let mut table = Table::new(["Concept", "Content"]);
        table.push_row(vec!["Title".into(), "a, \"quoted\" value".into()]);
        table.write_csv(&path).unwrap();

        let loaded = Table::read_csv(&path).unwrap();
        assert_eq!(loaded, table);
        assert_eq!(loaded.source, path.display().to_string());
    }

    #[test]
    fn test_filter_rows() {
        let csv = "Concept,Collection\nTitle,a\nTitle,b\nAbstract,a\n";
        let table = Table::from_reader(csv.as_bytes(), "t").unwrap();
        let filtered = table.filter_rows("Collection", "a").unwrap();
        assert_eq!(filtered.len(), 2);
        assert!(table.filter_rows("Missing", "a").is_err());
    }
}
