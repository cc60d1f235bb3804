//! 閾値・ラベルによる判定
//!
//! ## 判定ルール
//! 1. 数値として読めるメトリクス値だけを対象にする（有効値）
//! 2. 有効値が無い → Indeterminate
//! 3. 期待値未満の値が1つでもある → Fail（最小値を保持）
//! 4. 全ての値が期待値と一致 → Pass（必要ならラベルでサブ分類）
//! 5. それ以外（期待値を超える値がある）→ Indeterminate

use crate::error::{Error, Result};
use crate::types::{ImageGroup, PassCategory, Verdict};
use serde::{Deserialize, Serialize};

/// デフォルトのメトリクスフィールド
pub const DEFAULT_METRIC_FIELD: &str = "BlobNumResults";
/// デフォルトのラベルフィールド接頭辞
pub const DEFAULT_LABEL_PREFIX: &str = "ModelNumber";

/// 1-top に分類するラベル値
const TOP_MARKER: &str = "1";
/// 2-bottom に分類するラベル値
const BOTTOM_MARKER: &str = "2";

/// 判定オプション
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassifyOptions {
    pub metric_field: String,
    pub expected: f64,
    pub categorize: bool,
    pub label_prefix: String,
}

impl Default for ClassifyOptions {
    fn default() -> Self {
        Self {
            metric_field: DEFAULT_METRIC_FIELD.into(),
            expected: 9.0,
            categorize: false,
            label_prefix: DEFAULT_LABEL_PREFIX.into(),
        }
    }
}

impl ClassifyOptions {
    pub fn validate(&self) -> Result<()> {
        if !self.expected.is_finite() {
            return Err(Error::Config(format!(
                "期待値が有限の数値ではありません: {}",
                self.expected
            )));
        }
        if self.metric_field.trim().is_empty() {
            return Err(Error::Config("メトリクスフィールド名が空です".into()));
        }
        if self.categorize && self.label_prefix.trim().is_empty() {
            return Err(Error::Config("ラベルフィールド接頭辞が空です".into()));
        }
        Ok(())
    }
}

/// 画像グループを判定
pub fn classify(group: &ImageGroup, options: &ClassifyOptions) -> Verdict {
    let valid: Vec<f64> = group.valid_metrics(&options.metric_field).collect();

    if valid.is_empty() {
        return Verdict::Indeterminate;
    }

    if valid.iter().any(|&v| v < options.expected) {
        let min_metric = valid.iter().copied().fold(f64::INFINITY, f64::min);
        return Verdict::Fail { min_metric };
    }

    if valid.iter().all(|&v| v == options.expected) {
        let category = if options.categorize {
            categorize(group, &options.label_prefix)
        } else {
            PassCategory::Uncategorized
        };
        return Verdict::Pass { category };
    }

    Verdict::Indeterminate
}

/// ラベル値からサブ分類を決定
///
/// グループ全体のラベル値が全て "1" なら 1-top、全て "2" なら 2-bottom、
/// ラベルが無い・食い違う場合は mixed。
pub fn categorize(group: &ImageGroup, label_prefix: &str) -> PassCategory {
    let labels: Vec<&str> = group
        .records
        .iter()
        .flat_map(|r| r.labels(label_prefix))
        .collect();

    if labels.is_empty() {
        return PassCategory::Mixed;
    }

    if labels.iter().all(|&l| l == TOP_MARKER) {
        PassCategory::Top
    } else if labels.iter().all(|&l| l == BOTTOM_MARKER) {
        PassCategory::Bottom
    } else {
        PassCategory::Mixed
    }
}

/// 判定に使った代表値（Fail は最小値、Pass は期待値）
pub fn representative_metric(verdict: &Verdict, expected: f64) -> Option<f64> {
    match verdict {
        Verdict::Fail { min_metric } => Some(*min_metric),
        Verdict::Pass { .. } => Some(expected),
        Verdict::Indeterminate => None,
    }
}
