//! エラー型定義

use thiserror::Error;

/// 共通エラー型
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Missing column '{column}' in {source_name}")]
    MissingColumn { column: String, source_name: String },

    #[error("Empty table: {0}")]
    EmptyTable(String),

    #[error("Unknown dialect: {0}")]
    UnknownDialect(String),

    #[error("Duplicate entry for '{term}' in collection '{collection}'")]
    DuplicateEntry { term: String, collection: String },

    #[error("Workbook error: {0}")]
    Workbook(String),
}

/// Result型エイリアス
pub type Result<T> = std::result::Result<T, Error>;
