//! 単一コレクションレポート
//!
//! 1コレクション分の集計CSVを6シートのワークブックにまとめる。

use super::workbook::{
    add_status_formats, autofilter_table, named_sheet, save_buffer, set_uniform_width,
    set_widths, transcribe, wb_err, ReportFormats,
};
use super::DomainSheets;
use crate::error::Result;
use crate::formula::Range;
use crate::hits::Domain;
use crate::layout::*;
use crate::table::Table;
use rust_xlsxwriter::{Workbook, Worksheet};
use std::path::{Path, PathBuf};

/// 1領域（概念 or XPath）の入力表
#[derive(Debug, Clone)]
pub struct CollectionDomain {
    /// 集計表（Occurrence シート）
    pub summary: Table,
    /// レコード別出現数行列（Counts シート）
    pub matrix: Table,
    /// 評価結果そのもの（Content シート）
    pub content: Table,
}

/// 入力CSVのパス
#[derive(Debug, Clone)]
pub struct CollectionReportPaths {
    pub concept_summary: PathBuf,
    pub concept_matrix: PathBuf,
    pub concept_content: PathBuf,
    pub xpath_summary: PathBuf,
    pub xpath_matrix: PathBuf,
    pub xpath_content: PathBuf,
}

#[derive(Debug, Clone)]
pub struct CollectionReport {
    pub concept: CollectionDomain,
    pub xpath: CollectionDomain,
}

impl CollectionReport {
    /// 6つのCSVを読み込む（1つでも欠ければエラー）
    pub fn load(paths: &CollectionReportPaths) -> Result<Self> {
        Ok(Self {
            concept: CollectionDomain {
                summary: Table::read_csv(&paths.concept_summary)?,
                matrix: Table::read_csv(&paths.concept_matrix)?,
                content: Table::read_csv(&paths.concept_content)?,
            },
            xpath: CollectionDomain {
                summary: Table::read_csv(&paths.xpath_summary)?,
                matrix: Table::read_csv(&paths.xpath_matrix)?,
                content: Table::read_csv(&paths.xpath_content)?,
            },
        })
    }

    /// ワークブックをバッファに生成
    pub fn to_buffer(&self) -> Result<Vec<u8>> {
        let formats = ReportFormats::default();
        let mut workbook = Workbook::new();

        for (domain, tables) in [(Domain::Concept, &self.concept), (Domain::XPath, &self.xpath)] {
            let sheets = DomainSheets::for_domain(domain);
            workbook.push_worksheet(occurrence_sheet(sheets.occurrence, domain, &tables.summary, &formats)?);
            workbook.push_worksheet(counts_sheet(sheets.counts, domain, &tables.matrix, &formats)?);
            workbook.push_worksheet(content_sheet(sheets.content, domain, &tables.content)?);
        }

        workbook
            .save_to_buffer()
            .map_err(wb_err("ワークブック生成エラー"))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let buffer = self.to_buffer()?;
        save_buffer(&buffer, path)?;
        tracing::info!(path = %path.display(), "collection report written");
        Ok(())
    }
}

fn occurrence_sheet(
    name: &str,
    domain: Domain,
    summary: &Table,
    formats: &ReportFormats,
) -> Result<Worksheet> {
    let mut worksheet = named_sheet(name)?;
    let widths = match domain {
        Domain::Concept => CONCEPT_OCCURRENCE_WIDTHS,
        Domain::XPath => XPATH_OCCURRENCE_WIDTHS,
    };
    set_widths(&mut worksheet, widths)?;

    transcribe(&mut worksheet, summary, summary.len(), |col| {
        (col == OCCURRENCE_PERCENT_COL).then_some(&formats.percent)
    })?;
    autofilter_table(&mut worksheet, summary.len(), summary.width())?;

    // 1行目（Number of Records）は書式の対象外
    let last_row = summary.len() as u32;
    add_status_formats(
        &mut worksheet,
        Range::column(OCCURRENCE_PERCENT_COL, 2, last_row),
        formats,
    )?;
    Ok(worksheet)
}

fn counts_sheet(
    name: &str,
    domain: Domain,
    matrix: &Table,
    formats: &ReportFormats,
) -> Result<Worksheet> {
    let mut worksheet = named_sheet(name)?;
    let width = match domain {
        Domain::Concept => CONCEPT_COUNTS_WIDTH,
        Domain::XPath => XPATH_COUNTS_WIDTH,
    };
    set_uniform_width(&mut worksheet, matrix.width(), width)?;

    transcribe(&mut worksheet, matrix, matrix.len(), |_| None)?;
    autofilter_table(&mut worksheet, matrix.len(), matrix.width())?;

    // Record, Collection の2列を除いた数値部分
    if matrix.width() > 2 && !matrix.is_empty() {
        add_status_formats(
            &mut worksheet,
            Range::new(1, 2, matrix.len() as u32, matrix.width() as u16 - 1),
            formats,
        )?;
    }
    Ok(worksheet)
}

fn content_sheet(name: &str, domain: Domain, content: &Table) -> Result<Worksheet> {
    let mut worksheet = named_sheet(name)?;
    let widths = match domain {
        Domain::Concept => CONCEPT_CONTENT_WIDTHS,
        Domain::XPath => XPATH_CONTENT_WIDTHS,
    };
    set_widths(&mut worksheet, widths)?;

    transcribe(&mut worksheet, content, content.len(), |_| None)?;
    autofilter_table(&mut worksheet, content.len(), content.width())?;
    Ok(worksheet)
}

#[cfg(test)]
mod tests {
    use super::*;
    use calamine::{open_workbook_from_rs, Data, Reader, Xlsx};
    use std::io::Cursor;

    fn table(csv: &str) -> Table {
        Table::from_reader(csv.as_bytes(), "test").unwrap()
    }

    fn sample() -> CollectionReport {
        CollectionReport {
            concept: CollectionDomain {
                summary: table(
                    "Concept,Collection,ConceptCount,RecordCount,AverageOccurrencePerRecord,CollectionOccurrence%\n\
                     Number of Records,ORG_A,2,2,1.00,1.00\n\
                     Abstract,ORG_A,4,2,2.00,1.00\n\
                     Purpose,ORG_A,0,0,0.00,0.00\n",
                ),
                matrix: table("Record,Collection,Abstract,Purpose\nr1.xml,ORG_A,2,0\nr2.xml,ORG_A,2,0\n"),
                content: table("Collection,Record,Concept,Content,Dialect\nA,r1.xml,Abstract,text,eml\n"),
            },
            xpath: CollectionDomain {
                summary: table(
                    "XPath,Collection,XPathCount,RecordCount,AverageOccurrencePerRecord,CollectionOccurrence%\n\
                     Number of Records,ORG_A,1,1,1.00,1.00\n\
                     /eml/dataset/title,ORG_A,1,1,1.00,1.00\n",
                ),
                matrix: table("Record,Collection,/eml/dataset/title\nr1.xml,ORG_A,1\n"),
                content: table("Collection,Record,XPath,Content,Dialect\nA,r1.xml,/eml/dataset/title,T,eml\n"),
            },
        }
    }

    #[test]
    fn test_sheet_order() {
        let buffer = sample().to_buffer().unwrap();
        let workbook: Xlsx<_> = open_workbook_from_rs(Cursor::new(buffer)).unwrap();
        assert_eq!(
            workbook.sheet_names(),
            vec![
                "ConceptOccurrence",
                "ConceptCounts",
                "ConceptContent",
                "XpathOccurrence",
                "XpathCounts",
                "XpathContent",
            ]
        );
    }

    #[test]
    fn test_numbers_and_strings_transcribed() {
        let buffer = sample().to_buffer().unwrap();
        let mut workbook: Xlsx<_> = open_workbook_from_rs(Cursor::new(buffer)).unwrap();
        let range = workbook.worksheet_range("ConceptOccurrence").unwrap();

        assert_eq!(range.get_value((0, 0)), Some(&Data::String("Concept".into())));
        assert_eq!(range.get_value((2, 0)), Some(&Data::String("Abstract".into())));
        assert_eq!(range.get_value((2, 2)), Some(&Data::Float(4.0)));
        assert_eq!(range.get_value((2, 4)), Some(&Data::Float(2.0)));

        let counts = workbook.worksheet_range("ConceptCounts").unwrap();
        assert_eq!(counts.get_size(), (3, 4));
        assert_eq!(counts.get_value((1, 0)), Some(&Data::String("r1.xml".into())));
    }

    #[test]
    fn test_empty_tables_still_render() {
        let mut report = sample();
        report.xpath.matrix = table("Record,Collection\n");
        report.xpath.content = table("Collection,Record,XPath,Content,Dialect\n");
        assert!(report.to_buffer().is_ok());
    }

    #[test]
    fn test_load_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.csv");
        let paths = CollectionReportPaths {
            concept_summary: missing.clone(),
            concept_matrix: missing.clone(),
            concept_content: missing.clone(),
            xpath_summary: missing.clone(),
            xpath_matrix: missing.clone(),
            xpath_content: missing,
        };
        assert!(CollectionReport::load(&paths).is_err());
    }
}
