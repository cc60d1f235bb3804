//! 画像の振り分け（コピー/移動）
//!
//! ファイル操作は [`FileOps`] 経由で行い、1枚ごとの失敗は
//! [`RelocationOutcome`] に変換してバッチ全体は止めない。

mod fs;

pub use fs::StdFileOps;

use blob_checker_common::{Action, RelocationOutcome, Verdict};
use serde::{Deserialize, Serialize};
use std::io;
use std::path::{Component, Path};
use tracing::{info, warn};

/// 元画像が無い場合のメモ
pub const NOTE_SOURCE_MISSING: &str = "source-missing";

/// 画像名が出力先フォルダの外を指す場合のメモ
pub const NOTE_INVALID_IMAGE_NAME: &str = "invalid-image-name";

/// 元画像と出力先が同じファイルになる場合のメモ
pub const NOTE_SAME_PATH: &str = "same-path";

/// ファイルシステム操作（テストでは差し替える）
pub trait FileOps: Sync {
    fn path_exists(&self, path: &Path) -> bool;
    /// 既に存在する場合も成功扱い
    fn make_dir_all(&self, path: &Path) -> io::Result<()>;
    fn move_file(&self, src: &Path, dst: &Path) -> io::Result<()>;
    fn copy_file(&self, src: &Path, dst: &Path) -> io::Result<()>;
}

/// 振り分け方法
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionMode {
    /// 移動（元画像は削除される）
    Move,
    /// コピー（元画像は残る）
    #[default]
    Copy,
}

impl ActionMode {
    /// ファイル操作を実行
    pub fn apply(&self, fs: &dyn FileOps, src: &Path, dst: &Path) -> io::Result<()> {
        match self {
            ActionMode::Move => fs.move_file(src, dst),
            ActionMode::Copy => fs.copy_file(src, dst),
        }
    }

    /// 成功時のアクション
    pub fn completed(&self) -> Action {
        match self {
            ActionMode::Move => Action::Moved,
            ActionMode::Copy => Action::Copied,
        }
    }

    fn error_prefix(&self) -> &'static str {
        match self {
            ActionMode::Move => "move-error",
            ActionMode::Copy => "copy-error",
        }
    }
}

impl std::str::FromStr for ActionMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "move" | "mv" => Ok(ActionMode::Move),
            "copy" | "cp" => Ok(ActionMode::Copy),
            _ => Err(format!("Unknown mode: {}. Use move or copy", s)),
        }
    }
}

impl std::fmt::Display for ActionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ActionMode::Move => write!(f, "move"),
            ActionMode::Copy => write!(f, "copy"),
        }
    }
}

/// 画像1枚分の振り分け依頼
#[derive(Debug, Clone)]
pub struct RelocationRequest<'a> {
    pub image_name: &'a str,
    pub verdict: &'a Verdict,
    pub source_dir: &'a Path,
    pub destination_dir: &'a Path,
}

/// 画像名がフォルダ内の相対パスか（絶対パス・`..` を含むものは不可）
pub fn is_contained_image_name(image_name: &str) -> bool {
    let path = Path::new(image_name);
    path.components().any(|c| matches!(c, Component::Normal(_)))
        && path
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
}

/// 画像1枚を振り分ける
///
/// - `execute = false`: ファイル操作はせず `skipped`
/// - 画像名が不正: `error`（note = `invalid-image-name`）
/// - 元画像が無い: `missing`（note = `source-missing`）
/// - その他の失敗: `error`（note に詳細）
pub fn relocate(
    fs: &dyn FileOps,
    request: &RelocationRequest<'_>,
    mode: ActionMode,
    execute: bool,
) -> RelocationOutcome {
    let mut outcome = RelocationOutcome {
        image_name: request.image_name.to_string(),
        verdict_summary: request.verdict.summary(),
        action: Action::Skipped,
        note: String::new(),
        destination: None,
    };

    if !is_contained_image_name(request.image_name) {
        warn!(image = request.image_name, "画像名が不正なため振り分けません");
        if execute {
            outcome.action = Action::Error;
        }
        outcome.note = NOTE_INVALID_IMAGE_NAME.to_string();
        return outcome;
    }

    let src = request.source_dir.join(request.image_name);
    let dst = request.destination_dir.join(request.image_name);
    outcome.destination = Some(dst.clone());

    if !execute {
        return outcome;
    }

    if src == dst {
        warn!(image = request.image_name, path = %src.display(), "元画像と出力先が同じです");
        outcome.action = Action::Error;
        outcome.note = NOTE_SAME_PATH.to_string();
        return outcome;
    }

    // 画像名にサブフォルダが含まれる場合も考慮して親フォルダを作成
    let dst_dir = dst.parent().unwrap_or(request.destination_dir);
    if let Err(e) = fs.make_dir_all(dst_dir) {
        warn!(image = request.image_name, error = %e, "出力先フォルダ作成に失敗");
        outcome.action = Action::Error;
        outcome.note = format!("mkdir-error: {}", e);
        return outcome;
    }

    if !fs.path_exists(&src) {
        warn!(image = request.image_name, source = %src.display(), "元画像が見つかりません");
        outcome.action = Action::Missing;
        outcome.note = NOTE_SOURCE_MISSING.to_string();
        return outcome;
    }

    match mode.apply(fs, &src, &dst) {
        Ok(()) => {
            info!(image = request.image_name, mode = %mode, destination = %dst.display(), "振り分け完了");
            outcome.action = mode.completed();
        }
        Err(e) => {
            warn!(image = request.image_name, mode = %mode, error = %e, "振り分けに失敗");
            outcome.action = Action::Error;
            outcome.note = format!("{}: {}", mode.error_prefix(), e);
        }
    }

    outcome
}
