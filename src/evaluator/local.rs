//! ローカルXPath評価
//!
//! 評価サービスを使わずにレコードからXPathヒット表を作る。
//! 要素のテキストは `/a/b`、属性は `/a/b/@attr` として1行ずつ出す。
//! 名前空間接頭辞はそのまま残し、`xmlns` 宣言は出さない。

use crate::error::{MdevalError, Result};
use crate::records::scan_xml_files;
use mdeval_common::{Domain, HitRecord, HitTable};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::path::Path;

/// 1レコード分のXPathヒット
pub fn extract_xpaths(
    text: &str,
    collection: &str,
    record: &str,
    dialect: &str,
) -> Result<Vec<HitRecord>> {
    let mut reader = Reader::from_str(text);
    reader.config_mut().trim_text(true);

    let mut path: Vec<String> = Vec::new();
    let mut hits = Vec::new();
    let hit = |xpath: String, content: &str| {
        HitRecord::new(collection, record, &xpath, content, dialect)
    };

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                path.push(String::from_utf8_lossy(e.name().as_ref()).into_owned());
                attribute_hits(&e, &path, record, &mut |xpath: String, value: &str| {
                    hits.push(hit(xpath, value))
                })?;
            }
            Ok(Event::Empty(e)) => {
                path.push(String::from_utf8_lossy(e.name().as_ref()).into_owned());
                attribute_hits(&e, &path, record, &mut |xpath: String, value: &str| {
                    hits.push(hit(xpath, value))
                })?;
                path.pop();
            }
            Ok(Event::End(_)) => {
                path.pop();
            }
            Ok(Event::Text(t)) => {
                let content = t
                    .unescape()
                    .map_err(|e| MdevalError::MalformedXml(format!("{}: {}", record, e)))?;
                if !path.is_empty() && !content.trim().is_empty() {
                    hits.push(hit(join(&path), content.trim()));
                }
            }
            Ok(Event::CData(c)) => {
                let content = String::from_utf8_lossy(&c).into_owned();
                if !path.is_empty() && !content.trim().is_empty() {
                    hits.push(hit(join(&path), content.trim()));
                }
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => {
                return Err(MdevalError::MalformedXml(format!(
                    "{} (位置 {}): {}",
                    record,
                    reader.buffer_position(),
                    e
                )))
            }
        }
    }

    Ok(hits)
}

fn join(path: &[String]) -> String {
    format!("/{}", path.join("/"))
}

fn attribute_hits(
    element: &BytesStart<'_>,
    path: &[String],
    record: &str,
    emit: &mut dyn FnMut(String, &str),
) -> Result<()> {
    for attr in element.attributes().flatten() {
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        if key == "xmlns" || key.starts_with("xmlns:") {
            continue;
        }
        let value = attr
            .unescape_value()
            .map_err(|e| MdevalError::MalformedXml(format!("{}: {}", record, e)))?;
        emit(format!("{}/@{}", join(path), key), &value);
    }
    Ok(())
}

/// フォルダ直下の全レコードを評価して1つのヒット表にする
///
/// 不正なXMLは警告してスキップする。
pub fn evaluate_directory(folder: &Path, collection: &str, dialect: &str) -> Result<HitTable> {
    let mut hits = Vec::new();

    for path in scan_xml_files(folder)? {
        let record = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        let text = std::fs::read_to_string(&path)?;
        match extract_xpaths(&text, collection, &record, dialect) {
            Ok(found) => {
                tracing::debug!(%record, hits = found.len(), "record evaluated");
                hits.extend(found);
            }
            Err(e) => tracing::warn!(%record, error = %e, "record skipped"),
        }
    }

    Ok(HitTable::new(Domain::XPath, hits))
}
