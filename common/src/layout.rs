//! レポートのシート名・列幅

/// (先頭列, 末尾列, 幅)
pub type ColumnWidths = &'static [(u16, u16, f64)];

// 単一コレクションレポート
pub const CONCEPT_OCCURRENCE_WIDTHS: ColumnWidths =
    &[(0, 0, 30.0), (1, 1, 25.0), (2, 3, 15.0), (4, 4, 30.0), (5, 5, 25.0)];
pub const XPATH_OCCURRENCE_WIDTHS: ColumnWidths =
    &[(0, 0, 100.0), (1, 1, 30.0), (2, 3, 20.0), (4, 4, 30.0), (5, 5, 25.0)];
pub const CONCEPT_CONTENT_WIDTHS: ColumnWidths =
    &[(0, 2, 25.0), (3, 3, 30.0), (4, 4, 70.0), (5, 5, 20.0)];
pub const XPATH_CONTENT_WIDTHS: ColumnWidths = &[(0, 1, 30.0), (2, 2, 100.0), (3, 3, 20.0)];
pub const CONCEPT_COUNTS_WIDTH: f64 = 20.0;
pub const XPATH_COUNTS_WIDTH: f64 = 30.0;

/// 集計表の CollectionOccurrence% 列
pub const OCCURRENCE_PERCENT_COL: u16 = 5;

// 組織レポート
pub const ANALYSIS_WIDTHS: ColumnWidths = &[(0, 0, 70.0), (1, 1, 20.0)];
pub const PIVOT_KEY_WIDTH: f64 = 50.0;
pub const AVG_CONCEPT_KEY_WIDTH: f64 = 30.0;

/// 分析シートでコレクション列が始まる列（F）
pub const ANALYSIS_FIRST_COLLECTION_COL: u16 = 5;
/// 分析シートで明細表のヘッダがある行（10行目）
pub const ANALYSIS_HEADER_ROW: u32 = 9;
