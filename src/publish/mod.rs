//! ワークブックの公開
//!
//! Drive にスプレッドシートとしてアップロードし、リンクを知っている人が
//! 閲覧できる状態にして共有URLを返す。

pub mod oauth;

pub use oauth::{load_client_secrets, refresh_access_token, StoredCredentials};

use crate::config::Config;
use crate::error::{MdevalError, Result};
use serde::Deserialize;
use serde_json::json;
use std::path::Path;

pub const DRIVE_UPLOAD_URL: &str =
    "https://www.googleapis.com/upload/drive/v2/files?uploadType=multipart&convert=true";
pub const DRIVE_FILES_URL: &str = "https://www.googleapis.com/drive/v2/files";

const XLSX_MIME: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";
const BOUNDARY: &str = "mdeval-upload-boundary-5c2f0e";

#[derive(Debug, Deserialize)]
struct DriveFile {
    id: String,
    #[serde(rename = "alternateLink")]
    alternate_link: Option<String>,
}

/// ファイル名から拡張子を除いたもの（Drive上のタイトル）
pub fn drive_title(workbook: &Path) -> String {
    workbook
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default()
}

/// `multipart/related` の本文（メタデータJSON + ファイル本体）
pub fn related_body(metadata: &serde_json::Value, content: &[u8], content_type: &str) -> Vec<u8> {
    let mut body = Vec::with_capacity(content.len() + 256);
    body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
    body.extend_from_slice(b"Content-Type: application/json; charset=UTF-8\r\n\r\n");
    body.extend_from_slice(metadata.to_string().as_bytes());
    body.extend_from_slice(format!("\r\n--{}\r\n", BOUNDARY).as_bytes());
    body.extend_from_slice(format!("Content-Type: {}\r\n\r\n", content_type).as_bytes());
    body.extend_from_slice(content);
    body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());
    body
}

/// ワークブックを公開して共有URLを返す
pub fn publish(config: &Config, workbook: &Path) -> Result<String> {
    if !workbook.is_file() {
        return Err(MdevalError::FileNotFound(workbook.display().to_string()));
    }

    let mut credentials = StoredCredentials::load(&config.credentials)?;
    if config.client_secrets.exists() {
        credentials.fill_client(&load_client_secrets(&config.client_secrets)?);
    }

    let client = config.http_client()?;
    let token = refresh_access_token(&client, &mut credentials)?;
    credentials.save(&config.credentials)?;

    let file = upload(&client, &token, workbook)?;
    tracing::info!(id = %file.id, "workbook uploaded");
    share_with_anyone(&client, &token, &file.id)?;

    file.alternate_link
        .ok_or_else(|| MdevalError::Publish(format!("{}: 共有リンクが返されませんでした", file.id)))
}

fn upload(client: &reqwest::blocking::Client, token: &str, workbook: &Path) -> Result<DriveFile> {
    let content = std::fs::read(workbook)?;
    let metadata = json!({
        "title": drive_title(workbook),
        "mimeType": XLSX_MIME,
    });

    let response = client
        .post(DRIVE_UPLOAD_URL)
        .bearer_auth(token)
        .header(
            "Content-Type",
            format!("multipart/related; boundary={}", BOUNDARY),
        )
        .body(related_body(&metadata, &content, XLSX_MIME))
        .send()
        .map_err(|e| MdevalError::Publish(e.to_string()))?;

    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().unwrap_or_default();
        return Err(MdevalError::Publish(format!("アップロード失敗 {}: {}", status, body)));
    }

    response
        .json()
        .map_err(|e| MdevalError::Publish(format!("アップロード応答の解析に失敗: {}", e)))
}

fn share_with_anyone(client: &reqwest::blocking::Client, token: &str, file_id: &str) -> Result<()> {
    let response = client
        .post(format!("{}/{}/permissions", DRIVE_FILES_URL, file_id))
        .bearer_auth(token)
        .json(&json!({"type": "anyone", "value": "anyone", "role": "reader"}))
        .send()
        .map_err(|e| MdevalError::Publish(e.to_string()))?;

    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().unwrap_or_default();
        return Err(MdevalError::Publish(format!("権限設定失敗 {}: {}", status, body)));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::tempdir;

    #[test]
    fn test_drive_title() {
        assert_eq!(drive_title(Path::new("reports/ORG/C1_eml_Report.xlsx")), "C1_eml_Report");
        assert_eq!(drive_title(Path::new("ORG_Report.xlsx")), "ORG_Report");
    }

    #[test]
    fn test_related_body_layout() {
        let body = related_body(&json!({"title": "T"}), b"PK\x03\x04", XLSX_MIME);
        let text = String::from_utf8_lossy(&body);
        assert!(text.starts_with(&format!("--{}\r\nContent-Type: application/json", BOUNDARY)));
        assert!(text.contains("{\"title\":\"T\"}"));
        assert!(text.contains(&format!("Content-Type: {}\r\n\r\nPK", XLSX_MIME)));
        assert!(text.ends_with(&format!("\r\n--{}--\r\n", BOUNDARY)));
    }

    #[test]
    fn test_publish_missing_workbook() {
        let config = Config::default();
        let result = publish(&config, Path::new("/nonexistent/report.xlsx"));
        assert!(matches!(result, Err(MdevalError::FileNotFound(_))));
    }

    #[test]
    fn test_publish_without_credentials_is_auth_error() {
        let dir = tempdir().unwrap();
        let workbook = dir.path().join("r.xlsx");
        std::fs::write(&workbook, b"PK").unwrap();
        let config = Config {
            credentials: dir.path().join("mycreds.json"),
            client_secrets: PathBuf::from("/nonexistent/client_secrets.json"),
            ..Config::default()
        };
        assert!(matches!(publish(&config, &workbook), Err(MdevalError::Auth(_))));
    }
}
