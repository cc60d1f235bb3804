//! 監査ログのExcel生成（共通ライブラリ）

use crate::audit::{AuditLog, LOG_COLUMNS};
use crate::types::RunSummary;
use rust_xlsxwriter::*;

/// 列幅（文字数）
const COLUMN_WIDTHS: [f64; 6] = [36.0, 10.0, 12.0, 14.0, 10.0, 48.0];

/// 監査ログをExcelバッファに生成
///
/// 1枚目のシートにログ行、2枚目に集計を書き出す。
pub fn generate_log_buffer(log: &AuditLog, summary: &RunSummary) -> Result<Vec<u8>, String> {
    let mut workbook = Workbook::new();

    let header_format = Format::new()
        .set_bold()
        .set_background_color(Color::RGB(0xF5F5F5))
        .set_border(FormatBorder::Thin)
        .set_border_color(Color::RGB(0xAAAAAA));

    let worksheet = workbook.add_worksheet();
    worksheet.set_name("log")
        .map_err(|e| format!("シート名設定エラー: {}", e))?;

    for (col, (name, width)) in LOG_COLUMNS.iter().zip(COLUMN_WIDTHS).enumerate() {
        let col = col as u16;
        worksheet.set_column_width(col, width)
            .map_err(|e| format!("列幅設定エラー: {}", e))?;
        worksheet.write_string_with_format(0, col, *name, &header_format)
            .map_err(|e| format!("ヘッダー書き込みエラー: {}", e))?;
    }

    for (i, row) in log.rows().iter().enumerate() {
        let r = (i + 1) as u32;
        worksheet.write_string(r, 0, &row.image_name)
            .map_err(|e| format!("値書き込みエラー: {}", e))?;
        if let Some(metric) = row.metric {
            worksheet.write_number(r, 1, metric)
                .map_err(|e| format!("値書き込みエラー: {}", e))?;
        }
        worksheet.write_string(r, 2, &row.model)
            .map_err(|e| format!("値書き込みエラー: {}", e))?;
        worksheet.write_string(r, 3, &row.verdict)
            .map_err(|e| format!("値書き込みエラー: {}", e))?;
        worksheet.write_string(r, 4, row.action.as_str())
            .map_err(|e| format!("値書き込みエラー: {}", e))?;
        worksheet.write_string(r, 5, &row.note)
            .map_err(|e| format!("値書き込みエラー: {}", e))?;
    }

    let counts: [(&str, usize); 9] = [
        ("totalRecords", summary.total_records),
        ("images", summary.image_count),
        ("fail", summary.fail_count),
        ("pass", summary.pass_count),
        ("indeterminate", summary.indeterminate_count),
        ("processed", summary.processed_count),
        ("missing", summary.missing_count),
        ("error", summary.error_count),
        ("skipped", summary.skipped_count),
    ];

    let sheet = workbook.add_worksheet();
    sheet.set_name("summary")
        .map_err(|e| format!("シート名設定エラー: {}", e))?;
    sheet.set_column_width(0, 16.0)
        .map_err(|e| format!("列幅設定エラー: {}", e))?;
    for (i, (label, count)) in counts.iter().enumerate() {
        let r = i as u32;
        sheet.write_string_with_format(r, 0, *label, &header_format)
            .map_err(|e| format!("ラベル書き込みエラー: {}", e))?;
        sheet.write_number(r, 1, *count as f64)
            .map_err(|e| format!("値書き込みエラー: {}", e))?;
    }

    workbook.save_to_buffer()
        .map_err(|e| format!("Excel保存エラー: {}", e))
}
