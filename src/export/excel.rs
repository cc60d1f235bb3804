//! Excel形式の監査ログ（CLI版）

use crate::analysis::AnalysisReport;
use crate::error::{CheckerError, Result};
use blob_checker_common::export::excel_core;
use std::path::Path;

pub fn generate_log_excel(report: &AnalysisReport, output_path: &Path) -> Result<()> {
    let buffer = excel_core::generate_log_buffer(&report.log, &report.summary)
        .map_err(CheckerError::ExcelGeneration)?;

    std::fs::write(output_path, buffer)
        .map_err(|e| CheckerError::ExcelGeneration(format!("Excel保存エラー: {}", e)))?;

    Ok(())
}
