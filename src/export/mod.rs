//! 監査ログの保存

pub mod excel;

use crate::analysis::AnalysisReport;
use crate::error::Result;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// ログの保存形式
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Csv,
    Json,
    Excel,
}

impl LogFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            LogFormat::Csv => "csv",
            LogFormat::Json => "json",
            LogFormat::Excel => "xlsx",
        }
    }
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "csv" => Ok(LogFormat::Csv),
            "json" => Ok(LogFormat::Json),
            "excel" | "xlsx" => Ok(LogFormat::Excel),
            _ => Err(format!("Unknown format: {}. Use csv, json, or excel", s)),
        }
    }
}

impl std::fmt::Display for LogFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogFormat::Csv => write!(f, "csv"),
            LogFormat::Json => write!(f, "json"),
            LogFormat::Excel => write!(f, "excel"),
        }
    }
}

/// ログファイルのパス（`<dir>/blob_log_<timestamp>.<ext>`）
pub fn log_path(dir: &Path, timestamp: &str, format: LogFormat) -> PathBuf {
    dir.join(format!("blob_log_{}.{}", timestamp, format.extension()))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonLog<'a> {
    source: &'a str,
    summary: &'a blob_checker_common::RunSummary,
    rows: &'a [blob_checker_common::LogRow],
}

/// 監査ログを保存
pub fn write_log(report: &AnalysisReport, format: LogFormat, output_path: &Path) -> Result<()> {
    if let Some(parent) = output_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    match format {
        LogFormat::Csv => {
            std::fs::write(output_path, report.log.to_csv())?;
        }
        LogFormat::Json => {
            let payload = JsonLog {
                source: &report.source_name,
                summary: &report.summary,
                rows: report.log.rows(),
            };
            std::fs::write(output_path, serde_json::to_string_pretty(&payload)?)?;
        }
        LogFormat::Excel => {
            excel::generate_log_excel(report, output_path)?;
        }
    }

    Ok(())
}
