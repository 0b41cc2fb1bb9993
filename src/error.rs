use thiserror::Error;

#[derive(Error, Debug)]
pub enum MdevalError {
    #[error("設定エラー: {0}")]
    Config(String),

    #[error("ファイルが見つかりません: {0}")]
    FileNotFound(String),

    #[error("フォルダが見つかりません: {0}")]
    FolderNotFound(String),

    #[error("ダウンロードエラー: {0}")]
    Download(String),

    #[error("XMLが不正です: {0}")]
    MalformedXml(String),

    #[error("評価サービスエラー: {0}")]
    Evaluation(String),

    #[error("公開エラー: {0}")]
    Publish(String),

    #[error("認証エラー: {0}")]
    Auth(String),

    #[error("IOエラー: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON解析エラー: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSVエラー: {0}")]
    Csv(#[from] csv::Error),

    #[error("アーカイブエラー: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("HTTPエラー: {0}")]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Common(#[from] mdeval_common::Error),
}

pub type Result<T> = std::result::Result<T, MdevalError>;
