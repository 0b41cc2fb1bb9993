//! 組織レポート
//!
//! 複数コレクションを列に並べたワークブック。分析シートの統計値は
//! すべて転記シートを参照する数式で書くので、値を直せば再計算される。
//!
//! シート順:
//! ConceptOccurrenceAnalysis, ConceptOccurrence, AVGconceptOccurrence, [ConceptCounts],
//! XpathOccurrenceAnalysis, XpathOccurrence, AVGxpathOccurrence, [XpathCounts]

use super::workbook::{
    add_status_formats, autofilter_table, named_sheet, save_buffer, set_widths, transcribe,
    wb_err, write_cell, write_formula, write_label, ReportFormats,
};
use super::DomainSheets;
use crate::aggregate::NUMBER_OF_RECORDS;
use crate::error::{Error, Result};
use crate::formula::{self, call, count_if, count_ifs, quote, ratio, Cell, Range};
use crate::hits::Domain;
use crate::layout::*;
use crate::table::Table;
use rust_xlsxwriter::{Format, Workbook, Worksheet};
use std::path::{Path, PathBuf};

/// 分析シート A2..A9 の行ラベル
const ANALYSIS_LABELS: [&str; 8] = [
    NUMBER_OF_RECORDS,
    "Number of Elements / Attributes",
    "Coverage w/r to Repository (CR): number of elements / total number of elements",
    "Average Occurrence Rate",
    "Repository Completeness: Number of elements / number of elements in most complete collection in repository",
    "Homogeneity: Number >= 1 / Total Number of elements in the collection",
    "Partial Elements: Number > 0 and < 1",
    "Collection",
];

/// 1領域の入力表
#[derive(Debug, Clone)]
pub struct OrganizationDomain {
    /// CollectionOccurrence% のピボット
    pub occurrence: Table,
    /// AverageOccurrencePerRecord のピボット
    pub average: Table,
    /// 連結した集計表（任意）
    pub counts: Option<Table>,
}

#[derive(Debug, Clone)]
pub struct OrganizationReportPaths {
    pub concept_occurrence: PathBuf,
    pub concept_average: PathBuf,
    pub concept_counts: Option<PathBuf>,
    pub xpath_occurrence: PathBuf,
    pub xpath_average: PathBuf,
    pub xpath_counts: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct OrganizationReport {
    pub concept: OrganizationDomain,
    pub xpath: OrganizationDomain,
}

impl OrganizationReport {
    pub fn load(paths: &OrganizationReportPaths) -> Result<Self> {
        let optional = |path: &Option<PathBuf>| -> Result<Option<Table>> {
            path.as_deref().map(Table::read_csv).transpose()
        };
        Ok(Self {
            concept: OrganizationDomain {
                occurrence: Table::read_csv(&paths.concept_occurrence)?,
                average: Table::read_csv(&paths.concept_average)?,
                counts: optional(&paths.concept_counts)?,
            },
            xpath: OrganizationDomain {
                occurrence: Table::read_csv(&paths.xpath_occurrence)?,
                average: Table::read_csv(&paths.xpath_average)?,
                counts: optional(&paths.xpath_counts)?,
            },
        })
    }

    pub fn to_buffer(&self) -> Result<Vec<u8>> {
        let formats = ReportFormats::default();
        let mut workbook = Workbook::new();

        for (domain, tables) in [(Domain::Concept, &self.concept), (Domain::XPath, &self.xpath)] {
            for worksheet in domain_sheets(domain, tables, &formats)? {
                workbook.push_worksheet(worksheet);
            }
        }

        workbook
            .save_to_buffer()
            .map_err(wb_err("ワークブック生成エラー"))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let buffer = self.to_buffer()?;
        save_buffer(&buffer, path)?;
        tracing::info!(path = %path.display(), "organization report written");
        Ok(())
    }
}

/// 転記するデータ行数
///
/// XPath は末尾1行を落とす（従来レポートと同じ出力を保つ）。
pub fn occurrence_rows(domain: Domain, occurrence: &Table) -> usize {
    match domain {
        Domain::Concept => occurrence.len(),
        Domain::XPath => occurrence.len().saturating_sub(1),
    }
}

fn domain_sheets(
    domain: Domain,
    tables: &OrganizationDomain,
    formats: &ReportFormats,
) -> Result<Vec<Worksheet>> {
    let names = DomainSheets::for_domain(domain);
    let occurrence = &tables.occurrence;
    let collections = occurrence.width().saturating_sub(1);
    if collections == 0 {
        return Err(Error::EmptyTable(format!(
            "{}: コレクション列がありません",
            occurrence.source
        )));
    }
    let rows = occurrence_rows(domain, occurrence);
    let average_width = match domain {
        Domain::Concept => AVG_CONCEPT_KEY_WIDTH,
        Domain::XPath => PIVOT_KEY_WIDTH,
    };

    let mut sheets = vec![analysis_sheet(domain, &names, tables, rows, formats)?];

    // Occurrence
    let mut sheet = named_sheet(names.occurrence)?;
    set_widths(&mut sheet, &[(0, 0, PIVOT_KEY_WIDTH)])?;
    transcribe(&mut sheet, occurrence, rows, |_| Some(&formats.percent))?;
    autofilter_table(&mut sheet, rows, occurrence.width())?;
    add_status_formats(
        &mut sheet,
        Range::new(1, 1, rows as u32, occurrence.width() as u16 - 1),
        formats,
    )?;
    sheets.push(sheet);

    // AVG
    let average = &tables.average;
    let mut sheet = named_sheet(names.average)?;
    set_widths(&mut sheet, &[(0, 0, average_width)])?;
    transcribe(&mut sheet, average, average.len(), |_| Some(&formats.decimal))?;
    autofilter_table(&mut sheet, average.len(), average.width())?;
    if average.width() > 1 {
        add_status_formats(
            &mut sheet,
            Range::new(1, 1, average.len() as u32, average.width() as u16 - 1),
            formats,
        )?;
    }
    sheets.push(sheet);

    // Counts
    if let Some(counts) = &tables.counts {
        let mut sheet = named_sheet(names.counts)?;
        transcribe(&mut sheet, counts, counts.len(), |_| Some(&formats.integer))?;
        autofilter_table(&mut sheet, counts.len(), counts.width())?;
        sheets.push(sheet);
    }

    Ok(sheets)
}

fn analysis_sheet(
    domain: Domain,
    names: &DomainSheets,
    tables: &OrganizationDomain,
    rows: usize,
    formats: &ReportFormats,
) -> Result<Worksheet> {
    let occurrence = &tables.occurrence;
    let mut sheet = named_sheet(names.analysis)?;
    set_widths(&mut sheet, ANALYSIS_WIDTHS)?;

    let first_col = ANALYSIS_FIRST_COLLECTION_COL;
    let last_col = first_col + occurrence.width() as u16 - 2;
    // 数式が参照する転記シートの行範囲（空でも1行は確保）
    let last_data_row = rows.max(1) as u32;

    // 見出し
    for (i, label) in ANALYSIS_LABELS.iter().enumerate() {
        write_label(&mut sheet, i as u32 + 1, 0, label)?;
    }
    for (col, label) in [(1, "Formulas"), (2, "MIN"), (3, "MAX"), (4, "AVG")] {
        write_label(&mut sheet, 0, col, label)?;
    }

    let number_of_records = records_lookup(domain, names, tables.counts.as_ref())?;

    // コレクション列ごとの統計
    for j in 0..occurrence.width() as u16 - 1 {
        let col = first_col + j;
        let source = Range::column(j + 1, 1, last_data_row).on(names.occurrence);
        let elements = Cell::new(2, col).to_string();
        let header = Cell::new(0, col).to_string();

        let cells: [(u32, String, Option<&Format>); 9] = [
            (0, Cell::new(0, j + 1).on(names.occurrence), None),
            (1, String::new(), None),
            (2, count_if(&source, ">", 0), None),
            (
                3,
                ratio(&elements, &call("COUNTA", &[&source])),
                Some(&formats.percent),
            ),
            (
                4,
                ratio(&call("SUM", &[&source]), &elements),
                Some(&formats.percent),
            ),
            (
                5,
                ratio(
                    &elements,
                    &call("MAX", &[&Range::row(2, first_col, last_col).to_string()]),
                ),
                Some(&formats.percent),
            ),
            (
                6,
                ratio(&count_if(&source, ">=", 1), &elements),
                Some(&formats.percent),
            ),
            (
                7,
                ratio(&count_ifs(&[(&source, ">", 0), (&source, "<", 1)]), &elements),
                Some(&formats.percent),
            ),
            (
                8,
                call(
                    "RIGHT",
                    &[
                        &header,
                        &format!("LEN({})-FIND(\"_\",{})", header, header),
                    ],
                ),
                None,
            ),
        ];
        for (row, body, format) in cells {
            let body = match (row, &number_of_records) {
                (1, Some(lookup)) => lookup(&header),
                (1, None) => continue,
                _ => body,
            };
            write_formula(&mut sheet, row, col, &formula::formula(&body), format)?;
        }
    }

    // 行ごとの MIN / MAX / AVERAGE
    for row in 1..=7u32 {
        let format = if row <= 2 { &formats.integer } else { &formats.percent };
        let across = Range::row(row, first_col, last_col).to_string();
        for (col, function) in [(2, "MIN"), (3, "MAX"), (4, "AVERAGE")] {
            write_formula(
                &mut sheet,
                row,
                col,
                &formula::formula(&call(function, &[&across])),
                Some(format),
            )?;
        }
    }

    // 明細表
    let header_row = ANALYSIS_HEADER_ROW;
    write_cell(&mut sheet, header_row, 0, domain.key_column(), None)?;
    if domain == Domain::XPath {
        write_label(&mut sheet, header_row, 1, "Element Name")?;
    }
    write_label(&mut sheet, header_row, 2, "#Collections")?;
    write_label(&mut sheet, header_row, 3, "# = 100%")?;
    write_label(&mut sheet, header_row, 4, "# >= 100%")?;
    for (j, label) in occurrence.headers.iter().skip(1).enumerate() {
        write_cell(&mut sheet, header_row, first_col + j as u16, label, None)?;
    }

    for (i, values) in occurrence.rows.iter().take(rows).enumerate() {
        let row = header_row + 1 + i as u32;
        let term = values.first().map(String::as_str).unwrap_or_default();
        write_cell(&mut sheet, row, 0, term, None)?;

        if domain == Domain::XPath {
            write_formula(&mut sheet, row, 1, &formula::formula(&element_name(Cell::new(row, 0))), None)?;
        }

        let across = Range::row(row, first_col, last_col).to_string();
        for (col, op, value) in [(2, ">", 0), (3, "=", 1), (4, ">=", 1)] {
            write_formula(&mut sheet, row, col, &formula::formula(&count_if(&across, op, value)), None)?;
        }

        for (j, value) in values.iter().skip(1).enumerate() {
            write_cell(&mut sheet, row, first_col + j as u16, value, Some(&formats.percent))?;
        }
    }

    let last_row = header_row + rows as u32;
    sheet
        .autofilter(header_row, 0, last_row, last_col)
        .map_err(wb_err("オートフィルタ設定エラー"))?;
    add_status_formats(
        &mut sheet,
        Range::new(header_row + 1, first_col, last_row, last_col),
        formats,
    )?;

    Ok(sheet)
}

/// パスの最後の要素を取り出す数式
///
/// `/a/b/@c` → `@c`
pub fn element_name(cell: Cell) -> String {
    let a = cell.to_string();
    format!(
        "MID({a},1+FIND(\"|\",SUBSTITUTE({a},\"/\",\"|\",LEN({a})-LEN(SUBSTITUTE({a},\"/\",\"\")))),100)"
    )
}

type RecordsLookup = Box<dyn Fn(&str) -> String>;

/// 「Number of Records」行の数式（集計表がなければ None）
///
/// 集計表から `Number of Records` 行かつ該当コレクションの件数列を合計する。
fn records_lookup(
    domain: Domain,
    names: &DomainSheets,
    counts: Option<&Table>,
) -> Result<Option<RecordsLookup>> {
    let Some(counts) = counts else {
        return Ok(None);
    };
    let key = counts.require_column(domain.key_column())? as u16;
    let collection = counts.require_column("Collection")? as u16;
    let count = counts.require_column(domain.count_column())? as u16;
    let last = counts.len().max(1) as u32;

    let sheet = names.counts;
    let sum_range = Range::column(count, 1, last).on(sheet);
    let key_range = Range::column(key, 1, last).on(sheet);
    let collection_range = Range::column(collection, 1, last).on(sheet);
    let marker = quote(NUMBER_OF_RECORDS);

    Ok(Some(Box::new(move |header: &str| {
        call(
            "SUMIFS",
            &[&sum_range, &key_range, &marker, &collection_range, header],
        )
    })))
}
