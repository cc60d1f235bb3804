//! エラー型定義
//!
//! 判定エンジンはファイルに触れないので、失敗するのは設定の検証だけ。

use thiserror::Error;

/// 共通エラー型
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Config error: {0}")]
    Config(String),
}

/// Result型エイリアス
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_display() {
        let error = Error::Config("期待値が有限の数値ではありません: NaN".to_string());
        assert_eq!(
            error.to_string(),
            "Config error: 期待値が有限の数値ではありません: NaN"
        );
    }
}
