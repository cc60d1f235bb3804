//! 監査ログ
//!
//! 画像ごとの判定・振り分け結果を処理順に記録する。
//! 保存（CSV/JSON/Excel）は呼び出し側の責務。

use crate::types::{Action, RelocationOutcome, Verdict};
use serde::{Deserialize, Serialize};

/// ログの列名
pub const LOG_COLUMNS: [&str; 6] = ["ImageName", "Metric", "Model", "Verdict", "Action", "Note"];

/// ログ1行
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogRow {
    pub image_name: String,
    /// Fail は最小値、Pass は期待値
    pub metric: Option<f64>,
    pub model: String,
    pub verdict: String,
    pub action: Action,
    pub note: String,
}

impl LogRow {
    /// 列順に並べた文字列
    pub fn cells(&self) -> [String; 6] {
        [
            self.image_name.clone(),
            self.metric.map(format_metric).unwrap_or_default(),
            self.model.clone(),
            self.verdict.clone(),
            self.action.to_string(),
            self.note.clone(),
        ]
    }
}

/// 監査ログ（行は追加順）
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AuditLog {
    rows: Vec<LogRow>,
}

impl AuditLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// 振り分け結果を記録
    pub fn record_outcome(&mut self, outcome: &RelocationOutcome, metric: Option<f64>, model: &str) {
        self.rows.push(LogRow {
            image_name: outcome.image_name.clone(),
            metric,
            model: model.to_string(),
            verdict: outcome.verdict_summary.clone(),
            action: outcome.action,
            note: outcome.note.clone(),
        });
    }

    /// 振り分けを行わなかった画像の判定だけを記録
    pub fn record_verdict(&mut self, image_name: &str, verdict: &Verdict, metric: Option<f64>, model: &str) {
        self.rows.push(LogRow {
            image_name: image_name.to_string(),
            metric,
            model: model.to_string(),
            verdict: verdict.summary(),
            action: Action::Skipped,
            note: String::new(),
        });
    }

    pub fn rows(&self) -> &[LogRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// カンマ区切りCSVとして出力（ヘッダー付き）
    pub fn to_csv(&self) -> String {
        let mut out = String::new();
        push_csv_line(&mut out, LOG_COLUMNS.iter().copied());
        for row in &self.rows {
            let cells = row.cells();
            push_csv_line(&mut out, cells.iter().map(String::as_str));
        }
        out
    }
}

/// メトリクス値の表示（整数値は小数点なし）
pub fn format_metric(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}

fn push_csv_line<'a>(out: &mut String, cells: impl Iterator<Item = &'a str>) {
    let line: Vec<String> = cells.map(escape_csv).collect();
    out.push_str(&line.join(","));
    out.push_str("\r\n");
}

fn escape_csv(cell: &str) -> String {
    if cell.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", cell.replace('"', "\"\""))
    } else {
        cell.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PassCategory;

    fn outcome(name: &str, action: Action, note: &str) -> RelocationOutcome {
        RelocationOutcome {
            image_name: name.to_string(),
            verdict_summary: "fail".to_string(),
            action,
            note: note.to_string(),
            destination: None,
        }
    }

    #[test]
    fn test_rows_keep_processing_order() {
        let mut log = AuditLog::new();
        log.record_outcome(&outcome("z.bmp", Action::Copied, ""), Some(8.0), "A123");
        log.record_outcome(&outcome("a.bmp", Action::Missing, "source-missing"), Some(2.0), "A123");
        log.record_verdict(
            "m.bmp",
            &Verdict::Pass { category: PassCategory::Top },
            Some(9.0),
            "Unknown",
        );

        let names: Vec<&str> = log.rows().iter().map(|r| r.image_name.as_str()).collect();
        assert_eq!(names, vec!["z.bmp", "a.bmp", "m.bmp"]);
        assert_eq!(log.rows()[2].action, Action::Skipped);
        assert_eq!(log.rows()[2].verdict, "pass:1-top");
    }

    #[test]
    fn test_format_metric() {
        assert_eq!(format_metric(8.0), "8");
        assert_eq!(format_metric(8.5), "8.5");
        assert_eq!(format_metric(-1.0), "-1");
    }

    #[test]
    fn test_to_csv() {
        let mut log = AuditLog::new();
        log.record_outcome(
            &outcome("a,b.bmp", Action::Error, "move-error: \"denied\""),
            Some(3.0),
            "A123",
        );
        let csv = log.to_csv();
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines[0], "ImageName,Metric,Model,Verdict,Action,Note");
        assert_eq!(
            lines[1],
            r#""a,b.bmp",3,A123,fail,error,"move-error: ""denied""""#
        );
    }

    #[test]
    fn test_empty_log_has_header_only() {
        let log = AuditLog::new();
        assert!(log.is_empty());
        assert_eq!(log.to_csv().lines().count(), 1);
    }
}
