//! レコードのダウンロード
//!
//! 失敗したレコードは記録してスキップし、残りの処理を続ける。

use super::with_xml_extension;
use crate::error::{MdevalError, Result};
use mdeval_common::Table;
use quick_xml::events::Event;
use quick_xml::Reader;
use std::path::{Path, PathBuf};

/// レコード本文の取得元
pub trait RecordSource {
    fn get_text(&self, url: &str) -> Result<String>;
}

impl RecordSource for reqwest::blocking::Client {
    fn get_text(&self, url: &str) -> Result<String> {
        let response = self
            .get(url)
            .send()
            .and_then(|r| r.error_for_status())
            .map_err(|e| MdevalError::Download(format!("{}: {}", url, e)))?;
        response
            .text()
            .map_err(|e| MdevalError::Download(format!("{}: {}", url, e)))
    }
}

#[derive(Debug)]
pub struct SkippedRecord {
    pub url: String,
    pub destination: PathBuf,
    pub reason: MdevalError,
}

/// 取得結果
#[derive(Debug, Default)]
pub struct FetchReport {
    pub written: Vec<PathBuf>,
    pub skipped: Vec<SkippedRecord>,
}

impl FetchReport {
    pub fn is_complete(&self) -> bool {
        self.skipped.is_empty()
    }
}

/// URLごとに本文を取得して保存
///
/// `well_formed` が true のとき、整形式でないXMLは保存しない。
pub fn fetch_records<S, P>(
    source: &S,
    urls: &[String],
    destinations: &[P],
    well_formed: bool,
) -> Result<FetchReport>
where
    S: RecordSource + ?Sized,
    P: AsRef<Path>,
{
    if urls.len() != destinations.len() {
        return Err(MdevalError::Config(format!(
            "URLの数({})と保存先の数({})が一致しません",
            urls.len(),
            destinations.len()
        )));
    }

    let mut report = FetchReport::default();

    for (url, destination) in urls.iter().zip(destinations) {
        let destination = with_xml_extension(destination.as_ref());
        match fetch_one(source, url, &destination, well_formed) {
            Ok(()) => {
                tracing::debug!(%url, destination = %destination.display(), "record saved");
                report.written.push(destination);
            }
            Err(reason) => {
                tracing::warn!(%url, %reason, "record skipped");
                report.skipped.push(SkippedRecord {
                    url: url.clone(),
                    destination,
                    reason,
                });
            }
        }
    }

    Ok(report)
}

fn fetch_one<S>(source: &S, url: &str, destination: &Path, well_formed: bool) -> Result<()>
where
    S: RecordSource + ?Sized,
{
    let body = source.get_text(url)?;

    match check_well_formed(&body) {
        Ok(()) => {}
        Err(e) if well_formed => return Err(e),
        Err(e) => tracing::warn!(%url, error = %e, "saving record that is not well-formed"),
    }

    if let Some(parent) = destination.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    std::fs::write(destination, body)?;
    Ok(())
}

/// 取得一覧CSV（`url`, `file` 列）を読む
///
/// 相対パスの `file` は `base` を基準に解決する。
pub fn read_fetch_list(path: &Path, base: Option<&Path>) -> Result<(Vec<String>, Vec<PathBuf>)> {
    let table = Table::read_csv(path)?;
    let url_col = table.require_column("url")?;
    let file_col = table.require_column("file")?;

    let mut urls = Vec::with_capacity(table.len());
    let mut destinations = Vec::with_capacity(table.len());
    for row in &table.rows {
        let url = row.get(url_col).map(|s| s.trim()).unwrap_or_default();
        if url.is_empty() {
            continue;
        }
        let file = PathBuf::from(row.get(file_col).map(|s| s.trim()).unwrap_or_default());
        let destination = match base {
            Some(base) if file.is_relative() => base.join(file),
            _ => file,
        };
        urls.push(url.to_string());
        destinations.push(destination);
    }
    Ok((urls, destinations))
}

/// 整形式XMLかどうか（ルート要素がちょうど1つ、タグの対応が取れている）
pub fn check_well_formed(text: &str) -> Result<()> {
    let mut reader = Reader::from_str(text);
    reader.config_mut().trim_text(true);

    let malformed = |reader: &Reader<&[u8]>, detail: String| {
        MdevalError::MalformedXml(format!("位置 {}: {}", reader.buffer_position(), detail))
    };

    let mut depth = 0usize;
    let mut roots = 0usize;
    loop {
        let at_top = depth == 0;
        match reader.read_event() {
            Ok(Event::Start(_)) => {
                if at_top {
                    roots += 1;
                }
                depth += 1;
            }
            Ok(Event::Empty(_)) if at_top => roots += 1,
            Ok(Event::End(_)) => depth = depth.saturating_sub(1),
            Ok(Event::Text(_)) | Ok(Event::CData(_)) if at_top => {
                return Err(malformed(&reader, "ルート要素の外にテキストがあります".into()));
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => return Err(malformed(&reader, e.to_string())),
        }
        if roots > 1 {
            return Err(malformed(&reader, "ルート要素が複数あります".into()));
        }
    }

    if depth != 0 {
        return Err(malformed(&reader, "閉じられていない要素があります".into()));
    }
    if roots == 0 {
        return Err(malformed(&reader, "ルート要素がありません".into()));
    }
    Ok(())
}
