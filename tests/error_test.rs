//! エラーケーステスト
//!
//! 各種エラー条件でのエラーハンドリングを検証

use mdeval::config::Config;
use mdeval::error::MdevalError;
use mdeval::evaluator::{self, EvaluationService, EvaluationTarget};
use mdeval::records;
use mdeval::{export, publish};
use std::path::Path;
use tempfile::tempdir;

/// 存在しないフォルダを走査した場合
#[test]
fn test_scan_nonexistent_folder() {
    let result = records::scan_xml_files(Path::new("/nonexistent/path/12345"));
    assert!(matches!(result, Err(MdevalError::FolderNotFound(_))));
}

/// XMLのないフォルダを走査した場合
#[test]
fn test_scan_folder_without_records() {
    let dir = tempdir().expect("Failed to create temp dir");
    std::fs::write(dir.path().join("notes.txt"), "hello").unwrap();
    std::fs::write(dir.path().join("data.json"), "{}").unwrap();

    let files = records::scan_xml_files(dir.path()).unwrap();
    assert!(files.is_empty());
}

struct NeverCalled;

impl EvaluationService for NeverCalled {
    fn submit(&self, _archive: Vec<u8>) -> mdeval::error::Result<Vec<u8>> {
        panic!("service must not be called for an empty folder");
    }
}

/// 空のフォルダは評価サービスへ送らない
#[test]
fn test_evaluate_empty_folder() {
    let dir = tempdir().expect("Failed to create temp dir");
    let target = EvaluationTarget::new("ORG", "C1", "eml");
    let result = evaluator::evaluate(&NeverCalled, dir.path(), &target, dir.path());
    assert!(matches!(result, Err(MdevalError::Evaluation(_))));
}

/// 集計前にレポートを作ろうとした場合
#[test]
fn test_collection_report_before_aggregate() {
    let dir = tempdir().expect("Failed to create temp dir");
    let target = EvaluationTarget::new("ORG", "C1", "eml");
    let result = export::write_collection_report(&target, dir.path(), dir.path());
    assert!(matches!(result, Err(MdevalError::FileNotFound(_))));
}

/// 組織レポートの入力が無い場合は共通ライブラリのIOエラー
#[test]
fn test_organization_report_missing_inputs() {
    let dir = tempdir().expect("Failed to create temp dir");
    let missing = dir.path().join("missing.csv");
    let inputs = mdeval_common::export::OrganizationReportPaths {
        concept_occurrence: missing.clone(),
        concept_average: missing.clone(),
        concept_counts: None,
        xpath_occurrence: missing.clone(),
        xpath_average: missing,
        xpath_counts: None,
    };
    let result = export::write_organization_report("ORG", &inputs, dir.path());
    assert!(matches!(
        result,
        Err(MdevalError::Common(mdeval_common::Error::Io(_)))
    ));
}

/// 取得一覧に必要な列が無い場合
#[test]
fn test_fetch_list_missing_column() {
    let dir = tempdir().expect("Failed to create temp dir");
    let list = dir.path().join("list.csv");
    std::fs::write(&list, "address,file\nhttp://x,a\n").unwrap();

    let result = records::read_fetch_list(&list, None);
    assert!(matches!(
        result,
        Err(MdevalError::Common(mdeval_common::Error::MissingColumn { .. }))
    ));
}

/// 資格情報が無い状態で公開した場合
#[test]
fn test_publish_without_credentials() {
    let dir = tempdir().expect("Failed to create temp dir");
    let workbook = dir.path().join("ORG_Report.xlsx");
    std::fs::write(&workbook, b"PK").unwrap();

    let config = Config {
        credentials: dir.path().join("mycreds.json"),
        client_secrets: dir.path().join("client_secrets.json"),
        ..Config::default()
    };
    let result = publish::publish(&config, &workbook);
    assert!(matches!(result, Err(MdevalError::Auth(_))));
}

/// MdevalErrorのDisplay実装確認
#[test]
fn test_error_display() {
    let errors = vec![
        MdevalError::Config("テスト設定エラー".to_string()),
        MdevalError::FileNotFound("report.xlsx".to_string()),
        MdevalError::FolderNotFound("/records".to_string()),
        MdevalError::Download("http://x".to_string()),
        MdevalError::MalformedXml("位置 3".to_string()),
        MdevalError::Evaluation("502".to_string()),
        MdevalError::Publish("403".to_string()),
        MdevalError::Auth("invalid_grant".to_string()),
    ];

    for err in errors {
        let msg = err.to_string();
        assert!(!msg.is_empty(), "Error message should not be empty");
    }
}

/// 共通ライブラリのエラーはそのまま表示される
#[test]
fn test_common_error_is_transparent() {
    let err: MdevalError = mdeval_common::Error::UnknownDialect("dif".into()).into();
    assert_eq!(err.to_string(), mdeval_common::Error::UnknownDialect("dif".into()).to_string());
}
