//! 出力先フォルダ構成
//!
//! 判定結果から振り分け先フォルダを計算する（ファイルシステムには触れない）。
//!
//! ```text
//! <root>/[<model>/]failed_<timestamp>/
//! <root>/[<model>/]passed_<timestamp>/[<category>/]
//! ```

use crate::types::Verdict;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// 振り分け先フォルダの設定
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DestinationLayout {
    /// 不合格画像のルート
    pub failed_root: PathBuf,
    /// 合格画像のルート
    pub passed_root: PathBuf,
    /// 実行ごとのタイムスタンプ（例: 20240501_153000）
    pub timestamp: String,
    /// 型番ごとにフォルダを分ける
    pub separate_by_model: bool,
}

impl DestinationLayout {
    /// 不合格・合格で同じルートを使う
    pub fn new(root: impl Into<PathBuf>, timestamp: impl Into<String>) -> Self {
        let root = root.into();
        Self {
            failed_root: root.clone(),
            passed_root: root,
            timestamp: timestamp.into(),
            separate_by_model: false,
        }
    }

    pub fn with_passed_root(mut self, passed_root: impl Into<PathBuf>) -> Self {
        self.passed_root = passed_root.into();
        self
    }

    pub fn separate_by_model(mut self, enabled: bool) -> Self {
        self.separate_by_model = enabled;
        self
    }

    /// 判定結果に対応するフォルダ（Indeterminate は振り分け対象外なので None）
    pub fn resolve(&self, verdict: &Verdict, model: &str) -> Option<PathBuf> {
        match verdict {
            Verdict::Fail { .. } => Some(
                self.model_root(&self.failed_root, model)
                    .join(format!("failed_{}", self.timestamp)),
            ),
            Verdict::Pass { category } => {
                let dir = self
                    .model_root(&self.passed_root, model)
                    .join(format!("passed_{}", self.timestamp));
                let category = category.dir_name();
                Some(if category.is_empty() { dir } else { dir.join(category) })
            }
            Verdict::Indeterminate => None,
        }
    }

    fn model_root(&self, root: &Path, model: &str) -> PathBuf {
        if self.separate_by_model {
            root.join(model)
        } else {
            root.to_path_buf()
        }
    }
}
