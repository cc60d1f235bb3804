//! 画像検査エクスポートの合否判定・画像振り分け
//!
//! 判定ロジックは `blob-checker-common`、このクレートは
//! 設定・読み込み・ファイル操作・ログ保存を担当する。

pub mod analysis;
pub mod cli;
pub mod config;
pub mod error;
pub mod export;
pub mod relocator;
pub mod scanner;
pub mod telemetry;

pub use analysis::{run_analysis, AnalysisReport, ImageVerdict};
pub use config::{RunConfig, Settings};
pub use error::{CheckerError, Result};
