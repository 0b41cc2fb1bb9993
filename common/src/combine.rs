//! コレクション横断の結合
//!
//! 複数コレクションの集計CSVを1つの表にまとめる。
//! ピボット系は行 = 概念/XPath、列 = コレクション。

use crate::aggregate::NUMBER_OF_RECORDS;
use crate::error::{Error, Result};
use crate::hits::Domain;
use crate::matrix::PivotMatrix;
use crate::table::Table;
use std::path::{Path, PathBuf};

/// 欠損セルの埋め値
const ZERO: &str = "0";

/// CSVをまとめて読み込み（1つでも失敗したら全体が失敗）
pub fn read_tables<P: AsRef<Path>>(paths: &[P]) -> Result<Vec<Table>> {
    paths.iter().map(|p| Table::read_csv(p.as_ref())).collect()
}

/// `CollectionOccurrence%` のピボット
pub fn combine_occurrence(tables: &[Table], domain: Domain) -> Result<Table> {
    pivot(tables, domain, "CollectionOccurrence%")
}

/// `AverageOccurrencePerRecord` のピボット
pub fn combine_average(tables: &[Table], domain: Domain) -> Result<Table> {
    pivot(tables, domain, "AverageOccurrencePerRecord")
}

/// 集計表を縦に連結
pub fn combine_summaries(tables: &[Table], domain: Domain) -> Result<Table> {
    for table in tables {
        table.require_column(domain.key_column())?;
        table.require_column("Collection")?;
    }
    Ok(concat(tables, "", &[]))
}

/// レコード別出現数行列を縦に連結
///
/// 列は和集合、欠損は 0。`Record`, `Collection` を先頭に置く。
pub fn combine_matrices(tables: &[Table]) -> Result<Table> {
    for table in tables {
        table.require_column("Record")?;
        table.require_column("Collection")?;
    }
    Ok(concat(tables, ZERO, &["Record", "Collection"]))
}

/// ヒットテーブルを縦に連結
pub fn combine_hits(tables: &[Table], domain: Domain) -> Result<Table> {
    for table in tables {
        for column in ["Collection", "Record", domain.key_column()] {
            table.require_column(column)?;
        }
    }
    Ok(concat(tables, "", &[]))
}

/// パスを読み込んで結合し、出力先に書き出す
pub fn combine_files<F>(inputs: &[PathBuf], destination: &Path, combine: F) -> Result<Table>
where
    F: FnOnce(&[Table]) -> Result<Table>,
{
    let tables = read_tables(inputs)?;
    let combined = combine(&tables)?;
    combined.write_csv(destination)?;
    tracing::info!(
        inputs = inputs.len(),
        rows = combined.len(),
        destination = %destination.display(),
        "tables combined"
    );
    Ok(combined)
}

fn pivot(tables: &[Table], domain: Domain, value_column: &str) -> Result<Table> {
    let mut matrix: PivotMatrix<String, String> = PivotMatrix::new();

    for table in tables {
        let key = table.require_column(domain.key_column())?;
        let collection = table.require_column("Collection")?;
        let value = table.require_column(value_column)?;

        for row in &table.rows {
            let cell = |i: usize| row.get(i).map(String::as_str).unwrap_or("");
            let term = cell(key);
            // 合成行はピボットの行キーに混ぜない
            if term.is_empty() || term == NUMBER_OF_RECORDS {
                continue;
            }
            let label = cell(collection);
            if matrix
                .insert(term.to_string(), label, cell(value).to_string())
                .is_some()
            {
                return Err(Error::DuplicateEntry {
                    term: term.to_string(),
                    collection: label.to_string(),
                });
            }
        }
    }

    let mut headers = vec![domain.key_column().to_string()];
    headers.extend(matrix.columns().iter().cloned());
    let mut combined = Table::new(headers);

    let dense = matrix.dense(String::clone, |_, _| ZERO.to_string());
    for (term, cells) in matrix.rows().iter().zip(dense) {
        let mut row = vec![term.clone()];
        row.extend(cells);
        combined.push_row(row);
    }
    Ok(combined)
}

fn concat(tables: &[Table], fill: &str, leading: &[&str]) -> Table {
    let mut headers: Vec<String> = leading.iter().map(|h| h.to_string()).collect();
    for table in tables {
        for header in &table.headers {
            if !headers.contains(header) {
                headers.push(header.clone());
            }
        }
    }

    let mut combined = Table::new(headers.clone());
    for table in tables {
        let mapping: Vec<Option<usize>> = headers.iter().map(|h| table.column(h)).collect();
        for row in &table.rows {
            combined.push_row(
                mapping
                    .iter()
                    .map(|col| match col {
                        Some(i) => row.get(*i).cloned().unwrap_or_default(),
                        None => fill.to_string(),
                    })
                    .collect(),
            );
        }
    }
    combined
}
