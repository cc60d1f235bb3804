//! エクスポートの探索と読み込み

mod source;

pub use source::{FileSource, MemorySource, RecordSource};

use crate::error::{CheckerError, Result};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

const EXPORT_EXTENSIONS: &[&str] = &["csv", "CSV"];

/// 入力パスからエクスポートの一覧を作る
///
/// - ファイルならそのまま1件
/// - フォルダなら直下の `*.csv`（ファイル名順）
pub fn resolve_exports(input: &Path) -> Result<Vec<PathBuf>> {
    if input.is_file() {
        return Ok(vec![input.to_path_buf()]);
    }

    let exports = scan_folder(input)?;
    if exports.is_empty() {
        return Err(CheckerError::NoExportsFound(input.display().to_string()));
    }
    Ok(exports)
}

/// フォルダ直下のエクスポートを列挙
pub fn scan_folder(folder: &Path) -> Result<Vec<PathBuf>> {
    if !folder.exists() {
        return Err(CheckerError::FolderNotFound(folder.display().to_string()));
    }

    let mut exports: Vec<PathBuf> = WalkDir::new(folder)
        .max_depth(1)  // 直下のみ（再帰しない）
        .into_iter()
        .filter_map(|e| e.ok())
        .map(|e| e.into_path())
        .filter(|p| p.is_file())
        .filter(|p| {
            p.extension()
                .map(|ext| is_export_extension(&ext.to_string_lossy()))
                .unwrap_or(false)
        })
        .collect();

    // ファイル名でソート
    exports.sort();

    Ok(exports)
}

fn is_export_extension(ext: &str) -> bool {
    EXPORT_EXTENSIONS.contains(&ext)
}
