//! レポート（xlsx）出力

use crate::error::{MdevalError, Result};
use crate::evaluator::EvaluationTarget;
use crate::pipeline::CollectionFiles;
use mdeval_common::export::{
    CollectionReport, CollectionReportPaths, OrganizationReport, OrganizationReportPaths,
};
use std::path::{Path, PathBuf};

/// `<reports_dir>/<org>/<collection>_<dialect>_Report.xlsx`
pub fn collection_report_path(reports_dir: &Path, target: &EvaluationTarget) -> PathBuf {
    reports_dir.join(&target.organization).join(format!(
        "{}_{}_Report.xlsx",
        target.collection, target.dialect
    ))
}

/// `<reports_dir>/<org>/<org>_Report.xlsx`
pub fn organization_report_path(reports_dir: &Path, organization: &str) -> PathBuf {
    reports_dir
        .join(organization)
        .join(format!("{}_Report.xlsx", organization))
}

/// 集計済みCSVから単一コレクションレポートの入力パスを組み立てる
pub fn collection_inputs(files: &CollectionFiles) -> CollectionReportPaths {
    CollectionReportPaths {
        concept_summary: files.concept.summary.clone(),
        concept_matrix: files.concept.matrix.clone(),
        concept_content: files.concept.hits.clone(),
        xpath_summary: files.xpath.summary.clone(),
        xpath_matrix: files.xpath.matrix.clone(),
        xpath_content: files.xpath.hits.clone(),
    }
}

pub fn write_collection_report(
    target: &EvaluationTarget,
    data_dir: &Path,
    reports_dir: &Path,
) -> Result<PathBuf> {
    let files = CollectionFiles::for_target(target, data_dir);
    let inputs = collection_inputs(&files);
    for path in [
        &inputs.concept_summary,
        &inputs.concept_matrix,
        &inputs.xpath_summary,
        &inputs.xpath_matrix,
    ] {
        if !path.exists() {
            return Err(MdevalError::FileNotFound(format!(
                "{}（先に aggregate を実行してください）",
                path.display()
            )));
        }
    }

    let output = collection_report_path(reports_dir, target);
    CollectionReport::load(&inputs)?.save(&output)?;
    Ok(output)
}

pub fn write_organization_report(
    organization: &str,
    inputs: &OrganizationReportPaths,
    reports_dir: &Path,
) -> Result<PathBuf> {
    let output = organization_report_path(reports_dir, organization);
    OrganizationReport::load(inputs)?.save(&output)?;
    Ok(output)
}
