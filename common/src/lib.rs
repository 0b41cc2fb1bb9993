//! MDeval Common Library
//!
//! メタデータ評価結果の集計・結合・ワークブック生成。
//! ネットワークには触れない（CSV とワークブックのみ）。

pub mod aggregate;
pub mod combine;
pub mod dialect;
pub mod error;
pub mod formula;
pub mod hits;
pub mod layout;
pub mod matrix;
pub mod table;

#[cfg(feature = "excel")]
pub mod export;

pub use aggregate::{
    collection_label, concept_content, count_summary, occurrence_matrix, xpath_content,
    CountSummary, OccurrenceMatrix, CONTENT_MISSING, NUMBER_OF_RECORDS,
};
pub use combine::{
    combine_average, combine_files, combine_hits, combine_matrices, combine_occurrence,
    combine_summaries,
};
pub use dialect::{DialectReference, Vocabulary};
pub use error::{Error, Result};
pub use hits::{Domain, HitRecord, HitTable};
pub use matrix::PivotMatrix;
pub use table::Table;

#[cfg(feature = "excel")]
pub use export::{CollectionReport, OrganizationReport};
