use crate::error::{MdevalError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_EVALUATOR_URL: &str = "http://metadig.nceas.ucsb.edu/metadata/evaluator";

/// 実行時設定
///
/// 起動時に一度だけ読み込み、各処理へ参照で渡す。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// 評価サービスのエンドポイント
    pub evaluator_url: String,
    /// 評価結果CSVの置き場所（`<data_dir>/<org>/...`）
    pub data_dir: PathBuf,
    /// レポートの出力先（`<reports_dir>/<org>/...`）
    pub reports_dir: PathBuf,
    /// dialectContains.csv
    pub dialect_reference: PathBuf,
    /// OAuthクライアント情報
    pub client_secrets: PathBuf,
    /// 保存済みOAuth資格情報
    pub credentials: PathBuf,
    pub timeout_seconds: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_config()
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;
        Self::load_from(&config_path)
    }

    /// 指定パスから読み込み（なければデフォルト）
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Self::default_config())
        }
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;
        self.save_to(&config_path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| MdevalError::Config("ホームディレクトリが見つかりません".into()))?;
        Ok(home.join(".config").join("mdeval").join("config.json"))
    }

    fn default_config() -> Self {
        Self {
            evaluator_url: DEFAULT_EVALUATOR_URL.into(),
            data_dir: PathBuf::from("./data"),
            reports_dir: PathBuf::from("./reports"),
            dialect_reference: PathBuf::from("./dialectContains.csv"),
            client_secrets: PathBuf::from("./client_secrets.json"),
            credentials: PathBuf::from("./mycreds.json"),
            timeout_seconds: 120,
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    /// 設定のタイムアウトを持つHTTPクライアント
    pub fn http_client(&self) -> Result<reqwest::blocking::Client> {
        reqwest::blocking::Client::builder()
            .timeout(self.timeout())
            .build()
            .map_err(|e| MdevalError::Config(format!("HTTPクライアント作成失敗: {}", e)))
    }
}
