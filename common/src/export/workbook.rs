//! ワークシート共通処理
//!
//! CSVセルの転記、オートフィルタ、3段階の条件付き書式。

use crate::error::{Error, Result};
use crate::formula::Range;
use crate::table::Table;
use rust_xlsxwriter::*;

/// レポートで使う書式一式
pub struct ReportFormats {
    pub percent: Format,
    pub integer: Format,
    pub decimal: Format,
    /// 値 >= 1
    pub complete: Format,
    /// 値 = 0
    pub warning: Format,
    /// 値 = -1（方言で該当なし）
    pub error: Format,
}

impl Default for ReportFormats {
    fn default() -> Self {
        Self {
            percent: Format::new().set_num_format("0%"),
            integer: Format::new().set_num_format("0"),
            decimal: Format::new().set_num_format("0.00"),
            complete: Format::new()
                .set_background_color(Color::RGB(0xC6EFCE))
                .set_font_color(Color::RGB(0x006100)),
            warning: Format::new()
                .set_background_color(Color::RGB(0xFFEB9C))
                .set_font_color(Color::RGB(0x9C6500)),
            error: Format::new()
                .set_background_color(Color::RGB(0xFFC7CE))
                .set_font_color(Color::RGB(0x9C0006)),
        }
    }
}

/// XlsxError を文脈付きの共通エラーへ
pub(crate) fn wb_err(context: &'static str) -> impl Fn(XlsxError) -> Error {
    move |e| Error::Workbook(format!("{}: {}", context, e))
}

/// 名前付きの空シート
pub(crate) fn named_sheet(name: &str) -> Result<Worksheet> {
    let mut worksheet = Worksheet::new();
    worksheet
        .set_name(name)
        .map_err(wb_err("シート名設定エラー"))?;
    Ok(worksheet)
}

/// 数値として読める文字列は数値セル、それ以外は文字列セル
pub(crate) fn write_cell(
    worksheet: &mut Worksheet,
    row: u32,
    col: u16,
    value: &str,
    format: Option<&Format>,
) -> Result<()> {
    let number = value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|n| n.is_finite());

    let written = match (number, format) {
        (Some(n), Some(f)) => worksheet.write_number_with_format(row, col, n, f),
        (Some(n), None) => worksheet.write_number(row, col, n),
        (None, _) if value.is_empty() => return Ok(()),
        (None, Some(f)) => worksheet.write_string_with_format(row, col, value, f),
        (None, None) => worksheet.write_string(row, col, value),
    };
    written.map_err(wb_err("セル書き込みエラー"))?;
    Ok(())
}

pub(crate) fn write_formula(
    worksheet: &mut Worksheet,
    row: u32,
    col: u16,
    formula: &str,
    format: Option<&Format>,
) -> Result<()> {
    let formula = Formula::new(formula);
    let written = match format {
        Some(f) => worksheet.write_formula_with_format(row, col, formula, f),
        None => worksheet.write_formula(row, col, formula),
    };
    written.map_err(wb_err("数式書き込みエラー"))?;
    Ok(())
}

pub(crate) fn write_label(worksheet: &mut Worksheet, row: u32, col: u16, text: &str) -> Result<()> {
    worksheet
        .write_string(row, col, text)
        .map_err(wb_err("ラベル書き込みエラー"))?;
    Ok(())
}

/// テーブル（ヘッダ行込み）を転記
///
/// `rows` 行目までのデータ行を書く。`format_for(col)` で列ごとの書式。
pub(crate) fn transcribe<'f, F>(
    worksheet: &mut Worksheet,
    table: &Table,
    rows: usize,
    format_for: F,
) -> Result<()>
where
    F: Fn(u16) -> Option<&'f Format>,
{
    for (col, header) in table.headers.iter().enumerate() {
        write_cell(worksheet, 0, col as u16, header, None)?;
    }
    for (i, row) in table.rows.iter().take(rows).enumerate() {
        for (col, value) in row.iter().enumerate() {
            let col = col as u16;
            write_cell(worksheet, i as u32 + 1, col, value, format_for(col))?;
        }
    }
    Ok(())
}

/// 転記済み範囲（ヘッダ + `rows` 行）のオートフィルタ
pub(crate) fn autofilter_table(worksheet: &mut Worksheet, rows: usize, width: usize) -> Result<()> {
    if width == 0 {
        return Ok(());
    }
    worksheet
        .autofilter(0, 0, rows as u32, width as u16 - 1)
        .map_err(wb_err("オートフィルタ設定エラー"))?;
    Ok(())
}

/// 3段階の条件付き書式（>=1 / =0 / =-1）
///
/// 範囲が空（末尾が先頭より前）の場合は何もしない。
pub(crate) fn add_status_formats(
    worksheet: &mut Worksheet,
    range: Range,
    formats: &ReportFormats,
) -> Result<()> {
    if range.last.row < range.first.row || range.last.col < range.first.col {
        return Ok(());
    }

    let rules = [
        (ConditionalFormatCellRule::GreaterThanOrEqualTo(1), &formats.complete),
        (ConditionalFormatCellRule::EqualTo(0), &formats.warning),
        (ConditionalFormatCellRule::EqualTo(-1), &formats.error),
    ];
    for (rule, format) in rules {
        let conditional = ConditionalFormatCell::new()
            .set_rule(rule)
            .set_format(format);
        worksheet
            .add_conditional_format(
                range.first.row,
                range.first.col,
                range.last.row,
                range.last.col,
                &conditional,
            )
            .map_err(wb_err("条件付き書式設定エラー"))?;
    }
    Ok(())
}

pub(crate) fn set_widths(worksheet: &mut Worksheet, widths: &[(u16, u16, f64)]) -> Result<()> {
    for &(first, last, width) in widths {
        for col in first..=last {
            worksheet
                .set_column_width(col, width)
                .map_err(wb_err("列幅設定エラー"))?;
        }
    }
    Ok(())
}

/// 使用中の全列に同じ幅を設定
pub(crate) fn set_uniform_width(worksheet: &mut Worksheet, columns: usize, width: f64) -> Result<()> {
    for col in 0..columns {
        worksheet
            .set_column_width(col as u16, width)
            .map_err(wb_err("列幅設定エラー"))?;
    }
    Ok(())
}

/// ワークブックをファイルへ保存（親ディレクトリは作成する）
pub(crate) fn save_buffer(buffer: &[u8], path: &std::path::Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    std::fs::write(path, buffer)?;
    Ok(())
}
