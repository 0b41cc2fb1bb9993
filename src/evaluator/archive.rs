//! 評価サービスとやり取りするZIPアーカイブ

use crate::error::{MdevalError, Result};
use std::io::{Cursor, Read, Write};
use std::path::PathBuf;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

/// 応答アーカイブ内の要素評価CSV
pub const ELEMENT_ENTRY: &str = "AllNodes.csv";
/// 応答アーカイブ内の概念評価CSV
pub const CONCEPT_ENTRY: &str = "KnownNodes.csv";

/// `<org>/<collection>/<dialect>/xml/<file>` の形でレコードを詰める
pub fn pack_records(
    files: &[PathBuf],
    organization: &str,
    collection: &str,
    dialect: &str,
) -> Result<Vec<u8>> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = FileOptions::default().compression_method(CompressionMethod::Deflated);

    for path in files {
        let Some(name) = path.file_name() else {
            continue;
        };
        let entry = format!(
            "{}/{}/{}/xml/{}",
            organization,
            collection,
            dialect,
            name.to_string_lossy()
        );
        let bytes = std::fs::read(path)?;
        writer.start_file(entry, options)?;
        writer.write_all(&bytes)?;
    }

    let cursor = writer.finish()?;
    Ok(cursor.into_inner())
}

/// 評価結果の2つのCSV
#[derive(Debug, Clone, PartialEq)]
pub struct EvaluationResults {
    pub element: Vec<u8>,
    pub concept: Vec<u8>,
}

pub fn unpack_results(bytes: &[u8]) -> Result<EvaluationResults> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))?;
    Ok(EvaluationResults {
        element: read_entry(&mut archive, ELEMENT_ENTRY)?,
        concept: read_entry(&mut archive, CONCEPT_ENTRY)?,
    })
}

/// ルート直下、またはいずれかのフォルダ内にある `name` を読む
fn read_entry(archive: &mut ZipArchive<Cursor<&[u8]>>, name: &str) -> Result<Vec<u8>> {
    let suffix = format!("/{}", name);
    let entry = archive
        .file_names()
        .find(|n| *n == name || n.ends_with(&suffix))
        .map(str::to_string)
        .ok_or_else(|| {
            MdevalError::Evaluation(format!("応答に {} が含まれていません", name))
        })?;

    let mut file = archive.by_name(&entry)?;
    let mut content = Vec::new();
    file.read_to_end(&mut content)?;
    Ok(content)
}

#[cfg(test)]
pub(crate) fn build_archive(entries: &[(&str, &str)]) -> Vec<u8> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = FileOptions::default().compression_method(CompressionMethod::Deflated);
    for (name, content) in entries {
        writer.start_file(*name, options).unwrap();
        writer.write_all(content.as_bytes()).unwrap();
    }
    writer.finish().unwrap().into_inner()
}
