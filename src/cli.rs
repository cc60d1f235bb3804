use crate::config::{new_timestamp, parse_expected, RunConfig, Settings};
use crate::error::Result;
use crate::export::LogFormat;
use crate::relocator::ActionMode;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "blob-checker")]
#[command(about = "画像検査エクスポートの合否判定・画像振り分けツール", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// ログをJSON形式で出力
    #[arg(long, global = true)]
    pub json_log: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// エクスポートを解析して画像を振り分け
    Analyze(AnalyzeArgs),

    /// 既定値を表示/編集
    Config {
        /// 期待値を設定
        #[arg(long)]
        set_expected: Option<String>,

        /// メトリクスフィールド名を設定
        #[arg(long)]
        set_metric_field: Option<String>,

        /// 画像名フィールド名を設定
        #[arg(long)]
        set_image_field: Option<String>,

        /// 振り分け方法を設定 (move/copy)
        #[arg(long)]
        set_mode: Option<ActionMode>,

        /// ラベルフィールド接頭辞を設定
        #[arg(long)]
        set_label_prefix: Option<String>,

        /// 型番ごとにフォルダを分けるか (true/false)
        #[arg(long)]
        set_separate_by_model: Option<bool>,

        /// 合格画像をラベルで分類するか (true/false)
        #[arg(long)]
        set_categorize: Option<bool>,

        /// 既定値に戻す
        #[arg(long)]
        reset: bool,

        /// 設定を表示
        #[arg(long)]
        show: bool,
    },
}

#[derive(Args, Debug, Clone, Default)]
pub struct AnalyzeArgs {
    /// エクスポート(CSV)ファイル、またはCSVを含むフォルダ
    #[arg(required = true)]
    pub input: PathBuf,

    /// 期待値（BlobNumResults）
    #[arg(short, long)]
    pub expected: Option<String>,

    /// メトリクスフィールド名
    #[arg(long)]
    pub metric_field: Option<String>,

    /// 画像名フィールド名
    #[arg(long)]
    pub image_field: Option<String>,

    /// ラベルフィールド接頭辞
    #[arg(long)]
    pub label_prefix: Option<String>,

    /// 実際に振り分ける（省略時は解析のみ）
    #[arg(short = 'x', long)]
    pub execute: bool,

    /// 振り分け方法 (move/copy)
    #[arg(short, long)]
    pub mode: Option<ActionMode>,

    /// 型番ごとにフォルダを分ける（`--separate-by-model false` で既定値を無効化）
    #[arg(long, num_args = 0..=1, default_missing_value = "true")]
    pub separate_by_model: Option<bool>,

    /// 合格画像をラベルで分類（`--categorize false` で既定値を無効化）
    #[arg(long, num_args = 0..=1, default_missing_value = "true")]
    pub categorize: Option<bool>,

    /// 元画像フォルダ（省略時はCSVと同じフォルダ）
    #[arg(short, long)]
    pub images: Option<PathBuf>,

    /// 振り分け先フォルダ
    #[arg(short, long)]
    pub dest: Option<PathBuf>,

    /// 合格画像の振り分け先（省略時は --dest）
    #[arg(long)]
    pub passed_dest: Option<PathBuf>,

    /// 不合格画像のみ振り分ける
    #[arg(long)]
    pub failed_only: bool,

    /// フォルダ名に使うタイムスタンプ（省略時は現在時刻）
    #[arg(long)]
    pub timestamp: Option<String>,

    /// ログ形式 (csv/json/excel)
    #[arg(long, default_value = "csv")]
    pub log_format: LogFormat,

    /// ログの保存先（省略時はCSVと同じフォルダ）
    #[arg(long)]
    pub log_dir: Option<PathBuf>,

    /// 振り分けを並列実行
    #[arg(long)]
    pub parallel: bool,

    /// 移動時の確認を省略
    #[arg(short, long)]
    pub yes: bool,
}

impl AnalyzeArgs {
    /// 既定値とコマンドライン引数から実行設定を作成
    pub fn to_run_config(&self, settings: &Settings) -> Result<RunConfig> {
        let mut config = RunConfig::from_settings(settings)?;

        if let Some(expected) = &self.expected {
            config.expected_metric = parse_expected(expected)?;
        }
        if let Some(field) = &self.metric_field {
            config.metric_field = field.clone();
        }
        if let Some(field) = &self.image_field {
            config.image_id_field = field.clone();
        }
        if let Some(prefix) = &self.label_prefix {
            config.label_prefix = prefix.clone();
        }
        if let Some(mode) = self.mode {
            config.action_mode = mode;
        }

        config.execute = self.execute;
        if let Some(separate) = self.separate_by_model {
            config.separate_by_model = separate;
        }
        if let Some(categorize) = self.categorize {
            config.categorize_passes = categorize;
        }
        config.relocate_passes = !self.failed_only;
        config.source_image_dir = self.images.clone();
        config.destination_root = self.dest.clone();
        config.passed_root = self.passed_dest.clone();
        config.run_timestamp = self.timestamp.clone().unwrap_or_else(new_timestamp);
        config.parallel = self.parallel;

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CheckerError;

    #[test]
    fn test_parse_analyze_args() {
        let cli = Cli::try_parse_from([
            "blob-checker",
            "analyze",
            "export.csv",
            "--expected",
            "8",
            "--execute",
            "--mode",
            "move",
            "--dest",
            "/out",
            "--categorize",
            "--log-format",
            "json",
        ])
        .unwrap();

        let Commands::Analyze(args) = cli.command else {
            panic!("analyze expected");
        };
        assert_eq!(args.input, PathBuf::from("export.csv"));
        assert_eq!(args.mode, Some(ActionMode::Move));
        assert_eq!(args.log_format, LogFormat::Json);

        let config = args.to_run_config(&Settings::default()).unwrap();
        assert_eq!(config.expected_metric, 8.0);
        assert!(config.execute);
        assert!(config.categorize_passes);
        assert_eq!(config.action_mode, ActionMode::Move);
        assert_eq!(config.destination_root, Some(PathBuf::from("/out")));
    }

    #[test]
    fn test_settings_are_defaults() {
        let settings = Settings {
            expected: "7".into(),
            metric_field: "Blobs".into(),
            action_mode: ActionMode::Move,
            ..Default::default()
        };
        let args = AnalyzeArgs {
            input: PathBuf::from("export.csv"),
            timestamp: Some("20240501_000000".into()),
            failed_only: true,
            ..Default::default()
        };

        let config = args.to_run_config(&settings).unwrap();
        assert_eq!(config.expected_metric, 7.0);
        assert_eq!(config.metric_field, "Blobs");
        assert_eq!(config.action_mode, ActionMode::Move);
        assert_eq!(config.run_timestamp, "20240501_000000");
        assert!(!config.relocate_passes);
        assert!(!config.execute);
    }

    #[test]
    fn test_flags_override_saved_defaults() {
        let settings = Settings {
            separate_by_model: true,
            categorize_passes: true,
            ..Default::default()
        };

        let cli = Cli::try_parse_from([
            "blob-checker",
            "analyze",
            "export.csv",
            "--separate-by-model",
            "false",
            "--categorize=false",
        ])
        .unwrap();
        let Commands::Analyze(args) = cli.command else {
            panic!("analyze expected");
        };
        let config = args.to_run_config(&settings).unwrap();
        assert!(!config.separate_by_model);
        assert!(!config.categorize_passes);

        let cli = Cli::try_parse_from(["blob-checker", "analyze", "export.csv", "--separate-by-model"])
            .unwrap();
        let Commands::Analyze(args) = cli.command else {
            panic!("analyze expected");
        };
        let config = args.to_run_config(&Settings::default()).unwrap();
        assert!(config.separate_by_model);
        assert!(!config.categorize_passes);

        // 省略時は保存済みの値
        let args = AnalyzeArgs {
            input: PathBuf::from("export.csv"),
            ..Default::default()
        };
        let config = args.to_run_config(&settings).unwrap();
        assert!(config.separate_by_model);
        assert!(config.categorize_passes);
    }

    #[test]
    fn test_parse_config_setters() {
        let cli = Cli::try_parse_from([
            "blob-checker",
            "config",
            "--set-label-prefix",
            "Label",
            "--set-separate-by-model",
            "true",
            "--set-categorize",
            "false",
        ])
        .unwrap();
        let Commands::Config {
            set_label_prefix,
            set_separate_by_model,
            set_categorize,
            ..
        } = cli.command
        else {
            panic!("config expected");
        };
        assert_eq!(set_label_prefix.as_deref(), Some("Label"));
        assert_eq!(set_separate_by_model, Some(true));
        assert_eq!(set_categorize, Some(false));
    }

    #[test]
    fn test_non_numeric_expected_is_config_error() {
        let args = AnalyzeArgs {
            input: PathBuf::from("export.csv"),
            expected: Some("nine".into()),
            ..Default::default()
        };
        assert!(matches!(
            args.to_run_config(&Settings::default()),
            Err(CheckerError::Config(_))
        ));
    }

    #[test]
    fn test_unknown_mode_rejected() {
        let result = Cli::try_parse_from(["blob-checker", "analyze", "x.csv", "--mode", "delete"]);
        assert!(result.is_err());
    }
}
