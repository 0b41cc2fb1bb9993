//! 集計処理
//!
//! ヒットテーブルから
//! - レコード別出現数行列（OccurrenceMatrix）
//! - 概念/XPath別の集計表（CountSummary）
//! - レコード別内容行列
//! を作る。方言の既知語彙は列テンプレートとして先に登録されるため、
//! 今回一度も出現しなかった語彙も必ず列として残る。

use crate::dialect::Vocabulary;
use crate::error::Result;
use crate::hits::{Domain, HitRecord, HitTable};
use crate::matrix::PivotMatrix;
use crate::table::Table;
use std::collections::{BTreeSet, HashMap, HashSet};
use std::path::Path;

/// 集計表先頭の合成行のキー
pub const NUMBER_OF_RECORDS: &str = "Number of Records";

/// XPath内容行列の欠損値
pub const CONTENT_MISSING: &str = "Content is Missing";

/// 内容を連結するときの区切り
const CONTENT_SEPARATOR: &str = ", ";

/// (Collection, Record)
type RecordKey = (String, String);

/// レコード別出現数行列
#[derive(Debug, Clone, PartialEq)]
pub struct OccurrenceMatrix {
    pub domain: Domain,
    /// 概念/XPath列（既知語彙順 → 未登録語彙の辞書順）
    pub terms: Vec<String>,
    pub rows: Vec<OccurrenceRow>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OccurrenceRow {
    pub record: String,
    pub collection: String,
    /// `terms` と同じ並び
    pub counts: Vec<f64>,
}

impl OccurrenceMatrix {
    pub fn get(&self, record: &str, term: &str) -> Option<f64> {
        let col = self.terms.iter().position(|t| t == term)?;
        self.rows
            .iter()
            .find(|r| r.record == record)
            .map(|r| r.counts[col])
    }

    /// `Record, Collection, <terms...>` のテーブル
    pub fn to_table(&self) -> Table {
        let mut headers = vec!["Record".to_string(), "Collection".to_string()];
        headers.extend(self.terms.iter().cloned());
        let mut table = Table::new(headers);
        for row in &self.rows {
            let mut cells = vec![row.record.clone(), row.collection.clone()];
            cells.extend(row.counts.iter().map(|v| format_count(*v)));
            table.push_row(cells);
        }
        table
    }

    pub fn write_csv(&self, path: &Path) -> Result<()> {
        self.to_table().write_csv(path)
    }
}

/// 概念/XPath別の集計表
#[derive(Debug, Clone, PartialEq)]
pub struct CountSummary {
    pub domain: Domain,
    /// `<organization>_<collection>`
    pub collection: String,
    pub number_of_records: usize,
    pub rows: Vec<SummaryRow>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SummaryRow {
    pub term: String,
    /// 全レコードでの出現回数の合計
    pub count: usize,
    /// 1回以上出現したレコード数
    pub record_count: usize,
}

impl SummaryRow {
    pub fn average_per_record(&self, number_of_records: usize) -> f64 {
        ratio(self.count, number_of_records)
    }

    pub fn occurrence_ratio(&self, number_of_records: usize) -> f64 {
        ratio(self.record_count, number_of_records)
    }
}

impl CountSummary {
    pub fn row(&self, term: &str) -> Option<&SummaryRow> {
        self.rows.iter().find(|r| r.term == term)
    }

    /// `<Key>, Collection, <Key>Count, RecordCount, AverageOccurrencePerRecord, CollectionOccurrence%`
    ///
    /// 先頭は合成行 `Number of Records`。XPath ではこの行の比率2列にも
    /// レコード数を入れる（概念は 1.00）。
    pub fn to_table(&self) -> Table {
        let mut table = Table::new([
            self.domain.key_column(),
            "Collection",
            self.domain.count_column(),
            "RecordCount",
            "AverageOccurrencePerRecord",
            "CollectionOccurrence%",
        ]);

        let n = self.number_of_records;
        let synthetic = match self.domain {
            Domain::Concept => format_ratio(ratio(n, n)),
            Domain::XPath => n.to_string(),
        };
        table.push_row(vec![
            NUMBER_OF_RECORDS.to_string(),
            self.collection.clone(),
            n.to_string(),
            n.to_string(),
            synthetic.clone(),
            synthetic,
        ]);

        for row in &self.rows {
            table.push_row(vec![
                row.term.clone(),
                self.collection.clone(),
                row.count.to_string(),
                row.record_count.to_string(),
                format_ratio(row.average_per_record(n)),
                format_ratio(row.occurrence_ratio(n)),
            ]);
        }
        table
    }

    pub fn write_csv(&self, path: &Path) -> Result<()> {
        self.to_table().write_csv(path)
    }
}

/// 集計表の `Collection` ラベル
pub fn collection_label(organization: &str, collection: &str) -> String {
    format!("{}_{}", organization, collection)
}

/// レコード別出現数行列を作成
///
/// 出現しなかったセルは 0。ただし今回どのレコードにも出現しなかった
/// 既知語彙は方言リファレンスの値（`-1` = 該当なし）で埋める。
pub fn occurrence_matrix(hits: &HitTable, vocabulary: Option<&Vocabulary>) -> OccurrenceMatrix {
    let mut matrix: PivotMatrix<RecordKey, f64> = PivotMatrix::new();
    let terms = term_order(hits, vocabulary);
    for term in &terms {
        matrix.add_column(term);
    }

    let mut seen = HashSet::new();
    for hit in valid_hits(hits) {
        seen.insert(hit.term.as_str());
        *matrix.entry((hit.collection.clone(), hit.record.clone()), &hit.term) += 1.0;
    }
    matrix.sort_rows_by(|a, b| a.cmp(b));

    let dense = matrix.dense(
        |v| *v,
        |_, term| {
            if seen.contains(term) {
                0.0
            } else {
                vocabulary
                    .and_then(|v| v.get(term))
                    .map(|e| e.fill_value())
                    .unwrap_or(0.0)
            }
        },
    );

    let rows = matrix
        .rows()
        .iter()
        .zip(dense)
        .map(|((collection, record), counts)| OccurrenceRow {
            record: record.clone(),
            collection: collection.clone(),
            counts,
        })
        .collect();

    OccurrenceMatrix {
        domain: hits.domain,
        terms,
        rows,
    }
}

/// 概念/XPath別の集計表を作成
///
/// レコード数は `Record` の異なり数。
pub fn count_summary(
    hits: &HitTable,
    vocabulary: Option<&Vocabulary>,
    collection_label: &str,
) -> CountSummary {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    let mut records: HashMap<&str, HashSet<&str>> = HashMap::new();
    let mut all_records = HashSet::new();

    for hit in valid_hits(hits) {
        *counts.entry(hit.term.as_str()).or_default() += 1;
        records
            .entry(hit.term.as_str())
            .or_default()
            .insert(hit.record.as_str());
        all_records.insert(hit.record.as_str());
    }

    let rows = term_order(hits, vocabulary)
        .into_iter()
        .map(|term| SummaryRow {
            count: counts.get(term.as_str()).copied().unwrap_or(0),
            record_count: records.get(term.as_str()).map_or(0, HashSet::len),
            term,
        })
        .collect();

    CountSummary {
        domain: hits.domain,
        collection: collection_label.to_string(),
        number_of_records: all_records.len(),
        rows,
    }
}

/// 概念の内容行列
///
/// 欠損セルは既知語彙なら方言リファレンスの値、それ以外は空。
pub fn concept_content(hits: &HitTable, vocabulary: Option<&Vocabulary>) -> Table {
    content_matrix(hits, vocabulary, |term| {
        vocabulary
            .and_then(|v| v.get(term))
            .map(|e| e.fill_text())
            .unwrap_or_default()
    })
}

/// XPathの内容行列（欠損セルは `Content is Missing`）
pub fn xpath_content(hits: &HitTable) -> Table {
    content_matrix(hits, None, |_| CONTENT_MISSING.to_string())
}

fn content_matrix<F>(hits: &HitTable, vocabulary: Option<&Vocabulary>, fill: F) -> Table
where
    F: Fn(&str) -> String,
{
    let mut matrix: PivotMatrix<RecordKey, Vec<String>> = PivotMatrix::new();
    let terms = term_order(hits, vocabulary);
    for term in &terms {
        matrix.add_column(term);
    }
    for hit in valid_hits(hits) {
        matrix
            .entry((hit.collection.clone(), hit.record.clone()), &hit.term)
            .push(hit.content.clone());
    }
    matrix.sort_rows_by(|a, b| a.cmp(b));

    let dense = matrix.dense(|v| v.join(CONTENT_SEPARATOR), |_, term| fill(term));

    let mut headers = vec!["Record".to_string(), "Collection".to_string()];
    headers.extend(terms);
    let mut table = Table::new(headers);
    for ((collection, record), cells) in matrix.rows().iter().zip(dense) {
        let mut row = vec![record.clone(), collection.clone()];
        row.extend(cells);
        table.push_row(row);
    }
    table
}

/// 既知語彙（リファレンス順）→ それ以外の出現語彙（辞書順）
fn term_order(hits: &HitTable, vocabulary: Option<&Vocabulary>) -> Vec<String> {
    let mut terms: Vec<String> = vocabulary
        .map(|v| v.names().map(str::to_string).collect())
        .unwrap_or_default();
    let known: HashSet<&str> = terms.iter().map(String::as_str).collect();
    let extra: BTreeSet<&str> = valid_hits(hits)
        .map(|h| h.term.as_str())
        .filter(|t| !known.contains(t))
        .collect();
    let extra: Vec<String> = extra.into_iter().map(str::to_string).collect();
    terms.extend(extra);
    terms
}

fn has_keys(hit: &HitRecord) -> bool {
    !hit.record.is_empty() && !hit.term.is_empty()
}

fn dropped_hits(hits: &HitTable) -> usize {
    hits.hits.iter().filter(|h| !has_keys(h)).count()
}

/// キーが空の行は集計に含めない
fn valid_hits(hits: &HitTable) -> impl Iterator<Item = &HitRecord> {
    let dropped = dropped_hits(hits);
    if dropped > 0 {
        tracing::debug!(domain = %hits.domain, dropped, "hits without record or term skipped");
    }
    hits.hits.iter().filter(|h| has_keys(h))
}

fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

fn format_ratio(value: f64) -> String {
    format!("{:.2}", value)
}

fn format_count(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::DialectReference;

    fn vocabulary() -> Vocabulary {
        let csv = "Concept,Abstract,Purpose,Lineage\nISO,0,0,-1\n";
        let table = Table::from_reader(csv.as_bytes(), "ref").unwrap();
        DialectReference::from_table(table)
            .unwrap()
            .vocabulary("ISO")
            .unwrap()
    }

    fn example_hits() -> HitTable {
        HitTable::new(
            Domain::Concept,
            vec![
                HitRecord::new("NOAA", "r1.xml", "Abstract", "first", "ISO"),
                HitRecord::new("NOAA", "r1.xml", "Abstract", "second", "ISO"),
                HitRecord::new("NOAA", "r2.xml", "Abstract", "third", "ISO"),
                HitRecord::new("NOAA", "r2.xml", "Abstract", "fourth", "ISO"),
            ],
        )
    }

    #[test]
    fn test_occurrence_matrix_example() {
        let csv = "Concept,Abstract,Purpose\nISO,0,0\n";
        let vocab = DialectReference::from_table(Table::from_reader(csv.as_bytes(), "r").unwrap())
            .unwrap()
            .vocabulary("ISO")
            .unwrap();
        let matrix = occurrence_matrix(&example_hits(), Some(&vocab));
        let table = matrix.to_table();

        assert_eq!(table.headers, vec!["Record", "Collection", "Abstract", "Purpose"]);
        assert_eq!(table.rows[0], vec!["r1.xml", "NOAA", "2", "0"]);
        assert_eq!(table.rows[1], vec!["r2.xml", "NOAA", "2", "0"]);
    }

    #[test]
    fn test_count_summary_example() {
        let csv = "Concept,Abstract,Purpose\nISO,0,0\n";
        let vocab = DialectReference::from_table(Table::from_reader(csv.as_bytes(), "r").unwrap())
            .unwrap()
            .vocabulary("ISO")
            .unwrap();
        let summary = count_summary(&example_hits(), Some(&vocab), "ORG_NOAA");
        let table = summary.to_table();

        assert_eq!(
            table.headers,
            vec![
                "Concept",
                "Collection",
                "ConceptCount",
                "RecordCount",
                "AverageOccurrencePerRecord",
                "CollectionOccurrence%"
            ]
        );
        assert_eq!(table.rows[0], vec!["Number of Records", "ORG_NOAA", "2", "2", "1.00", "1.00"]);
        assert_eq!(table.rows[1], vec!["Abstract", "ORG_NOAA", "4", "2", "2.00", "1.00"]);
        assert_eq!(table.rows[2], vec!["Purpose", "ORG_NOAA", "0", "0", "0.00", "0.00"]);
    }

    #[test]
    fn test_xpath_number_of_records_row_carries_record_count() {
        let hits = HitTable::new(
            Domain::XPath,
            vec![
                HitRecord::new("c", "r1.xml", "/eml/title", "a", "eml"),
                HitRecord::new("c", "r2.xml", "/eml/title", "b", "eml"),
                HitRecord::new("c", "r3.xml", "/eml/@id", "3", "eml"),
            ],
        );
        let table = count_summary(&hits, None, "o_c").to_table();
        assert_eq!(table.rows[0], vec!["Number of Records", "o_c", "3", "3", "3", "3"]);
        assert_eq!(table.rows[1], vec!["/eml/@id", "o_c", "1", "1", "0.33", "0.33"]);
    }

    #[test]
    fn test_unseen_vocabulary_uses_reference_fill() {
        let vocab = vocabulary();
        let matrix = occurrence_matrix(&example_hits(), Some(&vocab));
        assert_eq!(matrix.get("r1.xml", "Purpose"), Some(0.0));
        assert_eq!(matrix.get("r1.xml", "Lineage"), Some(-1.0));
    }

    #[test]
    fn test_seen_term_fills_zero_even_if_not_applicable() {
        let vocab = vocabulary();
        let hits = HitTable::new(
            Domain::Concept,
            vec![
                HitRecord::new("c", "r1.xml", "Lineage", "x", "ISO"),
                HitRecord::new("c", "r2.xml", "Abstract", "y", "ISO"),
            ],
        );
        let matrix = occurrence_matrix(&hits, Some(&vocab));
        assert_eq!(matrix.get("r1.xml", "Lineage"), Some(1.0));
        assert_eq!(matrix.get("r2.xml", "Lineage"), Some(0.0));
    }

    #[test]
    fn test_empty_hits_still_have_vocabulary_columns() {
        let vocab = vocabulary();
        let hits = HitTable::new(Domain::Concept, vec![]);
        let matrix = occurrence_matrix(&hits, Some(&vocab));
        assert_eq!(matrix.terms, vec!["Abstract", "Purpose", "Lineage"]);
        assert!(matrix.rows.is_empty());

        let summary = count_summary(&hits, Some(&vocab), "o_c");
        assert_eq!(summary.number_of_records, 0);
        assert_eq!(summary.rows.len(), 3);
        assert_eq!(summary.to_table().rows[0][4], "0.00");
    }

    #[test]
    fn test_row_sum_matches_hit_rows() {
        let hits = HitTable::new(
            Domain::XPath,
            vec![
                HitRecord::new("c", "b.xml", "/a/b", "1", ""),
                HitRecord::new("c", "b.xml", "/a/b", "2", ""),
                HitRecord::new("c", "b.xml", "/a/b", "3", ""),
                HitRecord::new("c", "a.xml", "/a/c", "4", ""),
                HitRecord::new("c", "a.xml", "/a/b", "5", ""),
            ],
        );
        let matrix = occurrence_matrix(&hits, None);
        assert_eq!(matrix.terms, vec!["/a/b", "/a/c"]);
        // 行は (Collection, Record) 順
        assert_eq!(matrix.rows[0].record, "a.xml");
        assert_eq!(matrix.get("b.xml", "/a/b"), Some(3.0));
        assert_eq!(matrix.get("b.xml", "/a/c"), Some(0.0));
        assert_eq!(matrix.get("a.xml", "/a/b"), Some(1.0));
    }

    #[test]
    fn test_number_of_records_is_distinct_record_count() {
        // `.xml` を含まないレコード名でも数えられる
        let hits = HitTable::new(
            Domain::Concept,
            vec![
                HitRecord::new("c", "rec-1", "Title", "", ""),
                HitRecord::new("c", "rec-1", "Abstract", "", ""),
                HitRecord::new("c", "rec-2", "Title", "", ""),
                HitRecord::new("c", "rec-3", "Abstract", "", ""),
            ],
        );
        let summary = count_summary(&hits, None, "o_c");
        assert_eq!(summary.number_of_records, 3);

        let n = summary.number_of_records;
        for row in &summary.rows {
            let expected = row.record_count as f64 / n as f64;
            assert!((row.occurrence_ratio(n) - expected).abs() < f64::EPSILON);
        }
        let title = summary.row("Title").unwrap();
        assert_eq!((title.count, title.record_count), (2, 2));
        assert_eq!(summary.to_table().rows[1][5], "0.67");
    }

    #[test]
    fn test_blank_keys_are_ignored() {
        let hits = HitTable::new(
            Domain::Concept,
            vec![
                HitRecord::new("c", "r1.xml", "", "orphan", ""),
                HitRecord::new("c", "", "Title", "orphan", ""),
                HitRecord::new("c", "r1.xml", "Title", "kept", ""),
            ],
        );
        assert_eq!(dropped_hits(&hits), 2);
        assert_eq!(valid_hits(&hits).count(), 1);
        let summary = count_summary(&hits, None, "o_c");
        assert_eq!(summary.number_of_records, 1);
        assert_eq!(summary.rows.len(), 1);
        assert_eq!(summary.rows[0].count, 1);
    }

    #[test]
    fn test_concept_content_joins_and_fills() {
        let vocab = vocabulary();
        let table = concept_content(&example_hits(), Some(&vocab));
        assert_eq!(table.headers, vec!["Record", "Collection", "Abstract", "Purpose", "Lineage"]);
        assert_eq!(table.rows[0], vec!["r1.xml", "NOAA", "first, second", "0", "-1"]);
        assert_eq!(table.rows[1][2], "third, fourth");
    }

    #[test]
    fn test_xpath_content_marks_missing() {
        let hits = HitTable::new(
            Domain::XPath,
            vec![
                HitRecord::new("c", "a.xml", "/r/title", "Sea", ""),
                HitRecord::new("c", "b.xml", "/r/date", "2019", ""),
            ],
        );
        let table = xpath_content(&hits);
        assert_eq!(table.headers, vec!["Record", "Collection", "/r/date", "/r/title"]);
        assert_eq!(table.rows[0], vec!["a.xml", "c", CONTENT_MISSING, "Sea"]);
        assert_eq!(table.rows[1], vec!["b.xml", "c", "2019", CONTENT_MISSING]);
    }

    #[test]
    fn test_format_count() {
        assert_eq!(format_count(2.0), "2");
        assert_eq!(format_count(-1.0), "-1");
        assert_eq!(format_count(0.5), "0.5");
    }
}
