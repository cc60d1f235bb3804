//! 標準ファイルシステムによる FileOps 実装

use super::FileOps;
use std::fs;
use std::io::{self, ErrorKind};
use std::path::Path;

#[derive(Debug, Clone, Copy, Default)]
pub struct StdFileOps;

impl FileOps for StdFileOps {
    fn path_exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn make_dir_all(&self, path: &Path) -> io::Result<()> {
        fs::create_dir_all(path)
    }

    fn move_file(&self, src: &Path, dst: &Path) -> io::Result<()> {
        match fs::rename(src, dst) {
            Ok(()) => Ok(()),
            // 別デバイス間はコピーしてから削除
            Err(e) if e.kind() == ErrorKind::CrossesDevices => {
                fs::copy(src, dst)?;
                fs::remove_file(src)
            }
            Err(e) => Err(e),
        }
    }

    fn copy_file(&self, src: &Path, dst: &Path) -> io::Result<()> {
        fs::copy(src, dst).map(|_| ())
    }
}
