//! 型番（モデル識別子）の抽出
//!
//! ファイル名に含まれる「英字1文字 + 数字3桁」（例: `A123`）を型番とみなす。

use regex::Regex;

/// 型番が見つからない場合の値
pub const UNKNOWN_MODEL: &str = "Unknown";

/// 文字列から型番を抽出（最初の一致）
pub fn extract_model(text: &str) -> Option<&str> {
    lazy_static::lazy_static! {
        // 英字1文字 + 数字3桁（4桁目の数字が続く場合は除外）
        static ref MODEL_RE: Regex = Regex::new(r"([A-Za-z]\d{3})(?:$|[^0-9])").unwrap();
    }

    MODEL_RE
        .captures(text)
        .and_then(|cap| cap.get(1))
        .map(|m| m.as_str())
}

/// 画像名 → エクスポートファイル名 → "Unknown" の順に型番を決定
pub fn derive_model(image_name: &str, source_name: &str) -> String {
    extract_model(image_name)
        .or_else(|| extract_model(source_name))
        .unwrap_or(UNKNOWN_MODEL)
        .to_string()
}
