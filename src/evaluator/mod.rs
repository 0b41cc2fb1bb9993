//! メタデータ評価
//!
//! リモート評価サービスへの送信と、ローカルでのXPath抽出。

pub mod archive;
pub mod local;

pub use archive::{pack_records, unpack_results, EvaluationResults};
pub use local::{evaluate_directory, extract_xpaths};

use crate::error::{MdevalError, Result};
use crate::records::scan_xml_files;
use reqwest::blocking::multipart::{Form, Part};
use std::path::{Path, PathBuf};

/// 評価対象の組織・コレクション・方言
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvaluationTarget {
    pub organization: String,
    pub collection: String,
    pub dialect: String,
}

impl EvaluationTarget {
    pub fn new(organization: &str, collection: &str, dialect: &str) -> Self {
        Self {
            organization: organization.to_string(),
            collection: collection.to_string(),
            dialect: dialect.to_string(),
        }
    }

    /// `<data_dir>/<org>/<collection>_<dialect>_<suffix>.csv`
    pub fn data_file(&self, data_dir: &Path, suffix: &str) -> PathBuf {
        data_dir.join(&self.organization).join(format!(
            "{}_{}_{}.csv",
            self.collection, self.dialect, suffix
        ))
    }

    pub fn evaluated_paths(&self, data_dir: &Path) -> EvaluatedPaths {
        EvaluatedPaths {
            element: self.data_file(data_dir, "ElementEvaluated"),
            concept: self.data_file(data_dir, "ConceptEvaluated"),
        }
    }
}

/// 評価結果CSVの保存先
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvaluatedPaths {
    /// XPath単位のヒット（AllNodes.csv）
    pub element: PathBuf,
    /// 概念単位のヒット（KnownNodes.csv）
    pub concept: PathBuf,
}

/// アーカイブを受け取り評価結果アーカイブを返すサービス
pub trait EvaluationService {
    fn submit(&self, archive: Vec<u8>) -> Result<Vec<u8>>;
}

/// HTTPの評価サービス
pub struct HttpEvaluator<'a> {
    client: &'a reqwest::blocking::Client,
    url: &'a str,
}

impl<'a> HttpEvaluator<'a> {
    pub fn new(client: &'a reqwest::blocking::Client, url: &'a str) -> Self {
        Self { client, url }
    }
}

impl EvaluationService for HttpEvaluator<'_> {
    fn submit(&self, archive: Vec<u8>) -> Result<Vec<u8>> {
        let part = Part::bytes(archive)
            .file_name("metadata.zip")
            .mime_str("application/zip")?;
        let form = Form::new().part("zipxml", part);

        tracing::debug!(url = self.url, "submitting archive");
        let response = self
            .client
            .post(self.url)
            .header("Accept-Encoding", "zip")
            .multipart(form)
            .send()
            .and_then(|r| r.error_for_status())
            .map_err(|e| MdevalError::Evaluation(e.to_string()))?;

        let bytes = response
            .bytes()
            .map_err(|e| MdevalError::Evaluation(e.to_string()))?;
        Ok(bytes.to_vec())
    }
}

/// フォルダのレコードを評価し、結果CSVを `data_dir` に保存
pub fn evaluate<S>(
    service: &S,
    folder: &Path,
    target: &EvaluationTarget,
    data_dir: &Path,
) -> Result<EvaluatedPaths>
where
    S: EvaluationService + ?Sized,
{
    let files = scan_xml_files(folder)?;
    if files.is_empty() {
        return Err(MdevalError::Evaluation(format!(
            "XMLファイルがありません: {}",
            folder.display()
        )));
    }

    let archive = pack_records(
        &files,
        &target.organization,
        &target.collection,
        &target.dialect,
    )?;
    tracing::info!(records = files.len(), bytes = archive.len(), "archive packed");

    let response = service.submit(archive)?;
    let results = unpack_results(&response)?;

    let paths = target.evaluated_paths(data_dir);
    if let Some(parent) = paths.element.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&paths.element, &results.element)?;
    std::fs::write(&paths.concept, &results.concept)?;

    Ok(paths)
}
