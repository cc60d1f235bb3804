//! エクスポートパーサー
//!
//! 画像検査システムが出力する `;` 区切りエクスポートを Record 列に変換する。
//!
//! フォーマット:
//! 1. 1行目はメタデータ（常に読み捨て）
//! 2. 2行目がヘッダー（フィールド名）
//! 3. 以降の行をヘッダーの位置に対応させてフィールドを作る

use crate::types::Record;
use tracing::debug;

/// フィールド区切り文字
pub const DELIMITER: char = ';';

/// エクスポートのバイト列をパース
///
/// UTF-8 として解釈できないバイトは置換文字に変換し、パースは中断しない。
pub fn parse_export(bytes: &[u8]) -> Vec<Record> {
    parse_export_str(&String::from_utf8_lossy(bytes))
}

/// エクスポート文字列をパース
///
/// 行が不完全でもエラーにはせず、足りないフィールドは「存在しない」扱い、
/// ヘッダーより多い値は捨てる。
///
/// # Examples
/// ```
/// use blob_checker_common::parse_export_str;
///
/// let text = "meta\nImageName;BlobNumResults\na.bmp;8\n";
/// let records = parse_export_str(text);
/// assert_eq!(records.len(), 1);
/// assert_eq!(records[0].metric("BlobNumResults"), Some(8.0));
/// ```
pub fn parse_export_str(text: &str) -> Vec<Record> {
    // 1行目（メタデータ）を読み捨て
    let mut lines = text.lines().skip(1).filter(|l| !l.trim().is_empty());

    let header = match lines.next() {
        Some(line) => split_fields(line),
        None => return Vec::new(),
    };

    let records: Vec<Record> = lines
        .map(|line| {
            let values = split_fields(line);
            Record::from_fields(header.iter().cloned().zip(values))
        })
        .collect();

    debug!(columns = header.len(), records = records.len(), "エクスポートをパース");
    records
}

/// 1行を `;` で分割（ダブルクォートで囲まれた区切り文字は値の一部）
fn split_fields(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes && chars.peek() == Some(&'"') => {
                current.push('"');
                chars.next();
            }
            '"' if in_quotes => in_quotes = false,
            '"' if current.is_empty() => in_quotes = true,
            c if c == DELIMITER && !in_quotes => {
                fields.push(std::mem::take(&mut current));
            }
            c => current.push(c),
        }
    }
    fields.push(current);

    fields
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
Job=FF01;Date=2024-05-01
ImageName;BlobNumResults;ModelNumber1
a.bmp;8;1
b.bmp;9;2
";

    #[test]
    fn test_parse_basic() {
        let records = parse_export_str(SAMPLE);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].get("ImageName"), Some("a.bmp"));
        assert_eq!(records[0].metric("BlobNumResults"), Some(8.0));
        assert_eq!(records[1].get("ModelNumber1"), Some("2"));
    }

    #[test]
    fn test_preamble_is_never_a_header() {
        // 1行目がヘッダーに見えても読み捨てる
        let text = "ImageName;BlobNumResults\nImg;Blob\nx.bmp;3\n";
        let records = parse_export_str(text);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].get("Img"), Some("x.bmp"));
        assert_eq!(records[0].get("ImageName"), None);
    }

    #[test]
    fn test_short_content() {
        assert!(parse_export_str("").is_empty());
        assert!(parse_export_str("meta only").is_empty());
        assert!(parse_export_str("meta\nImageName;BlobNumResults").is_empty());
    }

    #[test]
    fn test_missing_fields_are_absent() {
        let text = "meta\nImageName;BlobNumResults;ModelNumber1\nc.bmp\n";
        let records = parse_export_str(text);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].get("ImageName"), Some("c.bmp"));
        assert_eq!(records[0].get("BlobNumResults"), None);
        assert_eq!(records[0].metric("BlobNumResults"), None);
    }

    #[test]
    fn test_extra_values_are_dropped() {
        let text = "meta\nImageName;BlobNumResults\nd.bmp;9;extra;more\n";
        let records = parse_export_str(text);
        assert_eq!(records[0].fields().len(), 2);
    }

    #[test]
    fn test_crlf_and_blank_lines() {
        let text = "meta\r\nImageName;BlobNumResults\r\n\r\ne.bmp;7\r\n";
        let records = parse_export_str(text);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].metric("BlobNumResults"), Some(7.0));
    }

    #[test]
    fn test_invalid_utf8_is_tolerated() {
        let mut bytes = b"meta\xff\nImageName;BlobNumResults\n".to_vec();
        bytes.extend_from_slice(b"f\xfe.bmp;5\n");
        let records = parse_export(&bytes);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].metric("BlobNumResults"), Some(5.0));
        assert!(records[0].get("ImageName").unwrap().starts_with('f'));
    }

    #[test]
    fn test_quoted_fields() {
        assert_eq!(split_fields(r#"a;"b;c";d"#), vec!["a", "b;c", "d"]);
        assert_eq!(split_fields(r#""say ""hi""";x"#), vec![r#"say "hi""#, "x"]);
        assert_eq!(split_fields("a;;b"), vec!["a", "", "b"]);
    }
}
