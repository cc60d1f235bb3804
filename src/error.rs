use thiserror::Error;

#[derive(Error, Debug)]
pub enum CheckerError {
    #[error("設定エラー: {0}")]
    Config(String),

    #[error("エクスポート読み込みエラー: {0}")]
    Read(String),

    #[error("フォルダが見つかりません: {0}")]
    FolderNotFound(String),

    #[error("エクスポート(CSV)が見つかりません: {0}")]
    NoExportsFound(String),

    #[error("JSON解析エラー: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IOエラー: {0}")]
    Io(#[from] std::io::Error),

    #[error("Excel生成エラー: {0}")]
    ExcelGeneration(String),

    #[error("処理を中止しました")]
    Cancelled,

    #[error(transparent)]
    Common(#[from] blob_checker_common::Error),
}

pub type Result<T> = std::result::Result<T, CheckerError>;
