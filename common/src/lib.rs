//! Blob Checker Common Library
//!
//! 画像検査エクスポートの判定エンジン（ファイルシステムに触れない部分）
//!
//! エクスポート文字列 → parser → grouper → classifier → layout → audit

pub mod types;
pub mod error;
pub mod parser;
pub mod grouper;
pub mod classifier;
pub mod model;
pub mod layout;
pub mod audit;
pub mod export;

pub use types::{Action, ImageGroup, PassCategory, Record, RelocationOutcome, RunSummary, Verdict};
pub use error::{Error, Result};
pub use parser::{parse_export, parse_export_str};
pub use grouper::group_records;
pub use classifier::{classify, categorize, representative_metric, ClassifyOptions};
pub use model::{derive_model, extract_model, UNKNOWN_MODEL};
pub use layout::DestinationLayout;
pub use audit::{AuditLog, LogRow, LOG_COLUMNS};
