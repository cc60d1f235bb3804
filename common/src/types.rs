//! 検査レコード・判定結果の型定義
//!
//! CLIとコアで共有される型:
//! - Record: エクスポート1行分のフィールド
//! - ImageGroup: 同一画像名のレコード集合
//! - Verdict: 画像ごとの判定（Fail / Pass / Indeterminate）
//! - RelocationOutcome: 画像1枚の振り分け結果
//! - RunSummary: 1回の解析の集計

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

/// エクスポート1行分のレコード
///
/// フィールド集合はエクスポートのヘッダー次第。既知のフィールド
/// （メトリクス・画像名・ラベル）だけ型付きアクセサを持ち、
/// それ以外は文字列のまま保持する。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Record {
    fields: BTreeMap<String, String>,
}

impl Record {
    pub fn from_fields<I, K, V>(fields: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            fields: fields
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// フィールド値（存在しない場合は None）
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    pub fn fields(&self) -> &BTreeMap<String, String> {
        &self.fields
    }

    /// メトリクス値
    ///
    /// フィールドが無い・数値として読めない・NaN の場合は None。
    /// 0 とは区別される。
    pub fn metric(&self, field: &str) -> Option<f64> {
        self.get(field)
            .and_then(|v| v.trim().parse::<f64>().ok())
            .filter(|v| !v.is_nan())
    }

    /// 画像名（空文字は None）
    pub fn image_id(&self, field: &str) -> Option<&str> {
        self.get(field).map(str::trim).filter(|v| !v.is_empty())
    }

    /// ラベルフィールド（名前が `prefix` で始まる）の空でない値
    pub fn labels<'a>(&'a self, prefix: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.fields
            .iter()
            .filter(move |(name, _)| name.starts_with(prefix))
            .map(|(_, value)| value.trim())
            .filter(|value| !value.is_empty())
    }
}

/// 同一画像名を持つレコードの集合（読み込み順を保持）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageGroup {
    pub image_name: String,
    pub records: Vec<Record>,
}

impl ImageGroup {
    pub fn new(image_name: impl Into<String>) -> Self {
        Self {
            image_name: image_name.into(),
            records: Vec::new(),
        }
    }

    /// 数値として読めるメトリクス値の一覧
    pub fn valid_metrics<'a>(&'a self, field: &'a str) -> impl Iterator<Item = f64> + 'a {
        self.records.iter().filter_map(move |r| r.metric(field))
    }
}

/// 合格画像のサブ分類
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PassCategory {
    /// 分類なし（categorize 無効時）
    #[serde(rename = "")]
    Uncategorized,
    /// 全ラベルが "1"
    #[serde(rename = "1-top")]
    Top,
    /// 全ラベルが "2"
    #[serde(rename = "2-bottom")]
    Bottom,
    /// ラベル無し、または不一致
    #[serde(rename = "mixed")]
    Mixed,
}

impl PassCategory {
    /// 出力先サブフォルダ名（分類なしは空文字）
    pub fn dir_name(&self) -> &'static str {
        match self {
            PassCategory::Uncategorized => "",
            PassCategory::Top => "1-top",
            PassCategory::Bottom => "2-bottom",
            PassCategory::Mixed => "mixed",
        }
    }
}

impl fmt::Display for PassCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dir_name())
    }
}

/// 画像ごとの判定
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Verdict {
    /// いずれかの値が期待値未満
    Fail {
        #[serde(rename = "minMetric")]
        min_metric: f64,
    },
    /// 全ての値が期待値と一致
    Pass { category: PassCategory },
    /// どちらにも該当しない（期待値超過を含む、または有効値なし）
    Indeterminate,
}

impl Verdict {
    pub fn kind(&self) -> &'static str {
        match self {
            Verdict::Fail { .. } => "fail",
            Verdict::Pass { .. } => "pass",
            Verdict::Indeterminate => "indeterminate",
        }
    }

    /// ログ用の要約（"fail" / "pass" / "pass:1-top"）
    pub fn summary(&self) -> String {
        match self {
            Verdict::Pass { category } if *category != PassCategory::Uncategorized => {
                format!("pass:{}", category)
            }
            other => other.kind().to_string(),
        }
    }

    pub fn is_fail(&self) -> bool {
        matches!(self, Verdict::Fail { .. })
    }

    pub fn is_pass(&self) -> bool {
        matches!(self, Verdict::Pass { .. })
    }
}

/// 振り分け処理の結果
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Moved,
    Copied,
    Missing,
    Error,
    Skipped,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Moved => "moved",
            Action::Copied => "copied",
            Action::Missing => "missing",
            Action::Error => "error",
            Action::Skipped => "skipped",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 画像1枚の振り分け結果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelocationOutcome {
    pub image_name: String,
    pub verdict_summary: String,
    pub action: Action,
    /// error / missing の場合のみ詳細が入る
    #[serde(default)]
    pub note: String,
    /// 実際に配置した（またはする予定の）パス
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination: Option<PathBuf>,
}

/// 1回の解析の集計
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunSummary {
    pub total_records: usize,
    pub image_count: usize,
    pub fail_count: usize,
    pub pass_count: usize,
    pub indeterminate_count: usize,
    /// moved + copied
    pub processed_count: usize,
    pub missing_count: usize,
    pub error_count: usize,
    pub skipped_count: usize,
}

impl RunSummary {
    pub fn count_verdict(&mut self, verdict: &Verdict) {
        self.image_count += 1;
        match verdict {
            Verdict::Fail { .. } => self.fail_count += 1,
            Verdict::Pass { .. } => self.pass_count += 1,
            Verdict::Indeterminate => self.indeterminate_count += 1,
        }
    }

    pub fn count_action(&mut self, action: Action) {
        match action {
            Action::Moved | Action::Copied => self.processed_count += 1,
            Action::Missing => self.missing_count += 1,
            Action::Error => self.error_count += 1,
            Action::Skipped => self.skipped_count += 1,
        }
    }
}
