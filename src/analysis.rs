//! 解析の実行
//!
//! ## 処理フロー
//! 1. 設定の検証（不正ならここで中止）
//! 2. エクスポート読み込み・パース
//! 3. 画像名でグループ化・判定
//! 4. 出力先を決めて振り分け（解析のみの場合はスキップ）
//! 5. 監査ログと集計を作成

use crate::config::RunConfig;
use crate::error::{CheckerError, Result};
use crate::relocator::{relocate, FileOps, RelocationRequest};
use crate::scanner::RecordSource;
use blob_checker_common::{
    classify, derive_model, group_records, parse_export, representative_metric, Action, AuditLog,
    RelocationOutcome, RunSummary, Verdict,
};
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// 画像ごとの判定
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageVerdict {
    pub image_name: String,
    pub verdict: Verdict,
    pub model: String,
    /// Fail は最小値、Pass は期待値
    pub metric: Option<f64>,
}

/// 解析結果
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisReport {
    pub source_name: String,
    pub verdicts: Vec<ImageVerdict>,
    /// 実行モードの場合のみ
    pub outcomes: Vec<RelocationOutcome>,
    pub log: AuditLog,
    pub summary: RunSummary,
}

impl AnalysisReport {
    pub fn failures(&self) -> impl Iterator<Item = &ImageVerdict> {
        self.verdicts.iter().filter(|v| v.verdict.is_fail())
    }
}

/// 振り分け対象（判定順のインデックス付き）
struct PlannedMove {
    verdict_index: usize,
    destination_dir: PathBuf,
}

/// エクスポートを解析し、必要なら画像を振り分ける
pub fn run_analysis(
    source: &dyn RecordSource,
    config: &RunConfig,
    fs: &dyn FileOps,
) -> Result<AnalysisReport> {
    config.validate()?;

    let source_name = source.name();
    let source_dir = match &config.source_image_dir {
        Some(dir) => Some(dir.clone()),
        None => source.default_image_dir(),
    };
    if config.execute && source_dir.is_none() {
        return Err(CheckerError::Config("画像フォルダを指定してください (--images)".into()));
    }

    let bytes = source.read_bytes()?;
    let records = parse_export(&bytes);

    let mut summary = RunSummary {
        total_records: records.len(),
        ..Default::default()
    };

    let groups = group_records(records, &config.image_id_field);
    let options = config.classify_options();

    let verdicts: Vec<ImageVerdict> = groups
        .iter()
        .map(|group| {
            let verdict = classify(group, &options);
            let metric = representative_metric(&verdict, config.expected_metric);
            ImageVerdict {
                image_name: group.image_name.clone(),
                model: derive_model(&group.image_name, &source_name),
                verdict,
                metric,
            }
        })
        .collect();

    for v in &verdicts {
        summary.count_verdict(&v.verdict);
    }
    debug!(
        source = %source_name,
        fail = summary.fail_count,
        pass = summary.pass_count,
        indeterminate = summary.indeterminate_count,
        "判定完了"
    );

    let layout = config.layout();
    let mut plan = Vec::new();

    for (i, v) in verdicts.iter().enumerate() {
        let relocatable = match v.verdict {
            Verdict::Fail { .. } => true,
            Verdict::Pass { .. } => config.relocate_passes,
            Verdict::Indeterminate => false,
        };
        if !relocatable || !config.execute {
            continue;
        }
        if let Some(dir) = layout.as_ref().and_then(|l| l.resolve(&v.verdict, &v.model)) {
            plan.push(PlannedMove {
                verdict_index: i,
                destination_dir: dir,
            });
        }
    }

    let outcomes = match source_dir {
        Some(source_dir) if !plan.is_empty() => {
            relocate_all(&plan, &verdicts, &source_dir, config, fs)
        }
        _ => Vec::new(),
    };

    // 判定順に並べ直す
    let mut by_verdict: Vec<Option<&RelocationOutcome>> = vec![None; verdicts.len()];
    for (planned, outcome) in plan.iter().zip(&outcomes) {
        by_verdict[planned.verdict_index] = Some(outcome);
    }

    let mut log = AuditLog::new();
    for (v, outcome) in verdicts.iter().zip(by_verdict) {
        match (&v.verdict, outcome) {
            // どちらにも該当しない画像はログにも出さない
            (Verdict::Indeterminate, _) => {}
            (_, Some(outcome)) => {
                log.record_outcome(outcome, v.metric, &v.model);
                summary.count_action(outcome.action);
            }
            (_, None) => {
                log.record_verdict(&v.image_name, &v.verdict, v.metric, &v.model);
                summary.count_action(Action::Skipped);
            }
        }
    }

    info!(
        source = %source_name,
        records = summary.total_records,
        processed = summary.processed_count,
        missing = summary.missing_count,
        errors = summary.error_count,
        "解析完了"
    );

    Ok(AnalysisReport {
        source_name,
        verdicts,
        outcomes,
        log,
        summary,
    })
}

/// 計画順に振り分けを実行（並列時も結果は計画順）
fn relocate_all(
    plan: &[PlannedMove],
    verdicts: &[ImageVerdict],
    source_dir: &Path,
    config: &RunConfig,
    fs: &dyn FileOps,
) -> Vec<RelocationOutcome> {
    let progress = if config.progress {
        let pb = ProgressBar::new(plan.len() as u64);
        pb.set_style(
            ProgressStyle::with_template("  {bar:40.cyan/blue} {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );
        pb
    } else {
        ProgressBar::hidden()
    };

    let run_one = |planned: &PlannedMove| {
        let v = &verdicts[planned.verdict_index];
        let request = RelocationRequest {
            image_name: &v.image_name,
            verdict: &v.verdict,
            source_dir,
            destination_dir: &planned.destination_dir,
        };
        let outcome = relocate(fs, &request, config.action_mode, config.execute);
        progress.inc(1);
        outcome
    };

    let outcomes: Vec<RelocationOutcome> = if config.parallel {
        plan.par_iter().map(run_one).collect()
    } else {
        plan.iter().map(run_one).collect()
    };

    progress.finish_and_clear();
    outcomes
}
