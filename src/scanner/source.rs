//! エクスポートの読み込み元

use crate::error::{CheckerError, Result};
use std::path::{Path, PathBuf};

/// エクスポートの読み込み元
pub trait RecordSource {
    /// 表示・型番抽出に使う名前（通常はファイル名）
    fn name(&self) -> String;

    /// エクスポート全体のバイト列
    fn read_bytes(&self) -> Result<Vec<u8>>;

    /// 画像フォルダの既定値（エクスポートと同じフォルダ）
    fn default_image_dir(&self) -> Option<PathBuf> {
        None
    }
}

/// ファイルから読み込む
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RecordSource for FileSource {
    fn name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default()
    }

    fn read_bytes(&self) -> Result<Vec<u8>> {
        if !self.path.is_file() {
            return Err(CheckerError::Read(format!(
                "ファイルが見つかりません: {}",
                self.path.display()
            )));
        }
        std::fs::read(&self.path)
            .map_err(|e| CheckerError::Read(format!("{}: {}", self.path.display(), e)))
    }

    fn default_image_dir(&self) -> Option<PathBuf> {
        self.path.parent().map(Path::to_path_buf)
    }
}

/// メモリ上の内容から読み込む
#[derive(Debug, Clone)]
pub struct MemorySource {
    name: String,
    content: Vec<u8>,
}

impl MemorySource {
    pub fn new(name: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }
}

impl RecordSource for MemorySource {
    fn name(&self) -> String {
        self.name.clone()
    }

    fn read_bytes(&self) -> Result<Vec<u8>> {
        Ok(self.content.clone())
    }
}
