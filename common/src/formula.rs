//! ワークシート数式の組み立て
//!
//! セル番地・範囲は0始まりの (row, col) から作る。
//! 表示はA1形式（行は1始まり）。

use std::fmt;

/// 列番号 → 列名（0 → A, 25 → Z, 26 → AA）
pub fn column_name(col: u16) -> String {
    let mut n = col as u32 + 1;
    let mut name = Vec::new();
    while n > 0 {
        let rem = ((n - 1) % 26) as u8;
        name.push((b'A' + rem) as char);
        n = (n - 1) / 26;
    }
    name.iter().rev().collect()
}

/// 単一セル
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    pub row: u32,
    pub col: u16,
}

impl Cell {
    pub fn new(row: u32, col: u16) -> Self {
        Self { row, col }
    }

    /// シート修飾付き
    pub fn on(self, sheet: &str) -> String {
        format!("{}!{}", sheet_prefix(sheet), self)
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", column_name(self.col), self.row + 1)
    }
}

/// 矩形範囲
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Range {
    pub first: Cell,
    pub last: Cell,
}

impl Range {
    pub fn new(first_row: u32, first_col: u16, last_row: u32, last_col: u16) -> Self {
        Self {
            first: Cell::new(first_row, first_col),
            last: Cell::new(last_row, last_col),
        }
    }

    /// 1列の範囲
    pub fn column(col: u16, first_row: u32, last_row: u32) -> Self {
        Self::new(first_row, col, last_row, col)
    }

    /// 1行の範囲
    pub fn row(row: u32, first_col: u16, last_col: u16) -> Self {
        Self::new(row, first_col, row, last_col)
    }

    pub fn on(self, sheet: &str) -> String {
        format!("{}!{}", sheet_prefix(sheet), self)
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.first == self.last {
            write!(f, "{}", self.first)
        } else {
            write!(f, "{}:{}", self.first, self.last)
        }
    }
}

/// 英数字と `_` 以外を含むシート名は引用符で囲む
fn sheet_prefix(sheet: &str) -> String {
    if sheet.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        sheet.to_string()
    } else {
        format!("'{}'", sheet.replace('\'', "''"))
    }
}

/// 文字列リテラル
pub fn quote(text: &str) -> String {
    format!("\"{}\"", text.replace('"', "\"\""))
}

/// `FUNC(arg1,arg2,...)`
pub fn call(function: &str, args: &[&str]) -> String {
    format!("{}({})", function, args.join(","))
}

/// `COUNTIF(range,"op"&value)`
pub fn count_if(range: &str, op: &str, value: i32) -> String {
    call("COUNTIF", &[range, &criterion(op, value)])
}

/// `COUNTIFS(range1,"op1"&v1,range2,"op2"&v2,...)`
pub fn count_ifs(conditions: &[(&str, &str, i32)]) -> String {
    let parts: Vec<String> = conditions
        .iter()
        .flat_map(|(range, op, value)| [range.to_string(), criterion(op, *value)])
        .collect();
    let args: Vec<&str> = parts.iter().map(String::as_str).collect();
    call("COUNTIFS", &args)
}

/// `a/b`
pub fn ratio(numerator: &str, denominator: &str) -> String {
    format!("{}/{}", numerator, denominator)
}

fn criterion(op: &str, value: i32) -> String {
    format!("{}&{}", quote(op), value)
}

/// 先頭に `=` を付けた書き込み用文字列
pub fn formula(body: &str) -> String {
    format!("={}", body)
}
