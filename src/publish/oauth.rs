//! OAuth2 資格情報
//!
//! 保存済みのリフレッシュトークンからアクセストークンを取り直す。
//! ブラウザでの同意フローは扱わない。

use crate::error::{MdevalError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";

/// client_secrets.json の `installed` / `web` 部分
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ClientInfo {
    pub client_id: String,
    pub client_secret: String,
    #[serde(default)]
    pub token_uri: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ClientSecretsFile {
    installed: Option<ClientInfo>,
    web: Option<ClientInfo>,
}

/// client_secrets.json を読む
pub fn load_client_secrets(path: &Path) -> Result<ClientInfo> {
    if !path.exists() {
        return Err(MdevalError::Auth(format!(
            "クライアント情報がありません: {}",
            path.display()
        )));
    }
    let content = std::fs::read_to_string(path)?;
    let file: ClientSecretsFile = serde_json::from_str(&content)?;
    file.installed
        .or(file.web)
        .ok_or_else(|| MdevalError::Auth(format!("{}: installed/web がありません", path.display())))
}

/// 保存済み資格情報（mycreds.json）
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StoredCredentials {
    #[serde(default)]
    pub client_id: String,
    #[serde(default)]
    pub client_secret: String,
    pub refresh_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_uri: Option<String>,
}

impl StoredCredentials {
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(MdevalError::Auth(format!(
                "保存済み資格情報がありません: {}",
                path.display()
            )));
        }
        let content = std::fs::read_to_string(path)?;
        let credentials: StoredCredentials = serde_json::from_str(&content)?;
        if credentials.refresh_token.is_empty() {
            return Err(MdevalError::Auth("refresh_token が空です".into()));
        }
        Ok(credentials)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    /// 資格情報に欠けているクライアント情報を補う
    pub fn fill_client(&mut self, client: &ClientInfo) {
        if self.client_id.is_empty() {
            self.client_id = client.client_id.clone();
        }
        if self.client_secret.is_empty() {
            self.client_secret = client.client_secret.clone();
        }
        if self.token_uri.is_none() {
            self.token_uri = client.token_uri.clone();
        }
    }

    pub fn token_url(&self) -> &str {
        self.token_uri.as_deref().unwrap_or(GOOGLE_TOKEN_URL)
    }
}

#[derive(Debug, Serialize)]
struct RefreshTokenRequest<'a> {
    client_id: &'a str,
    client_secret: &'a str,
    refresh_token: &'a str,
    grant_type: &'static str,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OAuthError {
    error: String,
    #[serde(default)]
    error_description: Option<String>,
}

/// アクセストークンを更新し、資格情報に反映する
pub fn refresh_access_token(
    client: &reqwest::blocking::Client,
    credentials: &mut StoredCredentials,
) -> Result<String> {
    if credentials.client_id.is_empty() {
        return Err(MdevalError::Auth("client_id がありません".into()));
    }

    let request = RefreshTokenRequest {
        client_id: &credentials.client_id,
        client_secret: &credentials.client_secret,
        refresh_token: &credentials.refresh_token,
        grant_type: "refresh_token",
    };

    let response = client
        .post(credentials.token_url())
        .form(&request)
        .send()
        .map_err(|e| MdevalError::Auth(e.to_string()))?;

    if !response.status().is_success() {
        let body = response.text().unwrap_or_default();
        return Err(MdevalError::Auth(describe_oauth_error(&body)));
    }

    let token: TokenResponse = response
        .json()
        .map_err(|e| MdevalError::Auth(format!("トークン応答の解析に失敗: {}", e)))?;

    credentials.access_token = Some(token.access_token.clone());
    if let Some(refresh_token) = token.refresh_token {
        credentials.refresh_token = refresh_token;
    }
    tracing::debug!("access token refreshed");
    Ok(token.access_token)
}

fn describe_oauth_error(body: &str) -> String {
    match serde_json::from_str::<OAuthError>(body) {
        Ok(e) => match e.error_description {
            Some(description) => format!("{}: {}", e.error, description),
            None => e.error,
        },
        Err(_) => body.to_string(),
    }
}
