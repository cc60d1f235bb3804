use anyhow::Context;
use blob_checker::analysis::{run_analysis, AnalysisReport};
use blob_checker::cli::{AnalyzeArgs, Cli, Commands};
use blob_checker::config::{RunConfig, Settings};
use blob_checker::error::CheckerError;
use blob_checker::export::{log_path, write_log};
use blob_checker::relocator::{ActionMode, StdFileOps};
use blob_checker::scanner::{self, FileSource};
use blob_checker::telemetry;
use blob_checker_common::audit::format_metric;
use clap::Parser;
use dialoguer::Confirm;
use std::path::Path;
use tracing::Level;

/// 画面に列挙する不合格画像の上限
const MAX_LISTED_FAILURES: usize = 200;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let level = if cli.verbose { Level::DEBUG } else { Level::WARN };
    telemetry::init_tracing(cli.json_log, level);

    match cli.command {
        Commands::Analyze(args) => analyze(&args)?,

        Commands::Config {
            set_expected,
            set_metric_field,
            set_image_field,
            set_mode,
            set_label_prefix,
            set_separate_by_model,
            set_categorize,
            reset,
            show,
        } => {
            let mut settings = if reset { Settings::default() } else { Settings::load()? };
            let changed = reset
                || set_expected.is_some()
                || set_metric_field.is_some()
                || set_image_field.is_some()
                || set_mode.is_some()
                || set_label_prefix.is_some()
                || set_separate_by_model.is_some()
                || set_categorize.is_some();

            if let Some(expected) = set_expected {
                settings.set_expected(&expected)?;
            }
            if let Some(field) = set_metric_field {
                settings.metric_field = field;
            }
            if let Some(field) = set_image_field {
                settings.image_id_field = field;
            }
            if let Some(mode) = set_mode {
                settings.action_mode = mode;
            }
            if let Some(prefix) = set_label_prefix {
                settings.label_prefix = prefix;
            }
            if let Some(separate) = set_separate_by_model {
                settings.separate_by_model = separate;
            }
            if let Some(categorize) = set_categorize {
                settings.categorize_passes = categorize;
            }

            if changed {
                settings.save()?;
                println!("✔ 設定を保存しました: {}", Settings::config_path()?.display());
            }

            if show || !changed {
                println!("設定:");
                println!("  期待値: {}", settings.expected);
                println!("  メトリクスフィールド: {}", settings.metric_field);
                println!("  画像名フィールド: {}", settings.image_id_field);
                println!("  ラベル接頭辞: {}", settings.label_prefix);
                println!("  振り分け方法: {}", settings.action_mode);
                println!("  型番ごとに分ける: {}", settings.separate_by_model);
                println!("  合格画像を分類: {}", settings.categorize_passes);
            }
        }
    }

    Ok(())
}

fn analyze(args: &AnalyzeArgs) -> anyhow::Result<()> {
    println!("🔍 blob-checker - 解析\n");

    let settings = Settings::load()?;
    let mut config = args.to_run_config(&settings)?;
    config.progress = true;
    config.validate()?;

    let exports = scanner::resolve_exports(&args.input)?;

    if config.execute && config.action_mode == ActionMode::Move && !args.yes {
        let confirmed = Confirm::new()
            .with_prompt(format!(
                "{}件のエクスポートについて画像を移動します（元画像は削除されます）。続けますか?",
                exports.len()
            ))
            .default(false)
            .interact()
            .map_err(|e| CheckerError::Config(e.to_string()))?;
        if !confirmed {
            return Err(CheckerError::Cancelled.into());
        }
    }

    for export in &exports {
        let source = FileSource::new(export);
        let report = run_analysis(&source, &config, &StdFileOps)?;

        print_report(export, &config, &report);

        let log_dir = match &args.log_dir {
            Some(dir) => dir.clone(),
            None => export.parent().unwrap_or(Path::new(".")).to_path_buf(),
        };
        let path = log_path(&log_dir, &config.run_timestamp, args.log_format);
        let path = unique_log_path(path, &report.source_name);
        write_log(&report, args.log_format, &path)
            .with_context(|| format!("ログの保存に失敗: {}", path.display()))?;
        println!("\nログ: {}", path.display());
    }

    println!("\n✅ 完了");
    Ok(())
}

/// 同じ実行で複数のエクスポートを処理する場合はファイル名を付けて衝突を避ける
fn unique_log_path(path: std::path::PathBuf, source_name: &str) -> std::path::PathBuf {
    if !path.exists() {
        return path;
    }
    let stem = Path::new(source_name)
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    let file_name = path
        .file_name()
        .map(|n| format!("{}_{}", stem, n.to_string_lossy()))
        .unwrap_or_else(|| format!("{}.log", stem));
    path.with_file_name(file_name)
}

fn print_report(export: &Path, config: &RunConfig, report: &AnalysisReport) {
    let summary = &report.summary;

    println!("📄 CSV: {}", export.display());
    println!("  レコード数: {}", summary.total_records);
    println!("  期待値: {}", format_metric(config.expected_metric));
    println!(
        "  不合格: {}  合格: {}  判定不能: {}",
        summary.fail_count, summary.pass_count, summary.indeterminate_count
    );

    if summary.fail_count == 0 {
        println!("\n全ての画像が期待値を満たしています");
    } else {
        println!("\n不合格ファイル:");
        for v in report.failures().take(MAX_LISTED_FAILURES) {
            let metric = v.metric.map(format_metric).unwrap_or_default();
            println!("  {} -> {}", v.image_name, metric);
        }
        if summary.fail_count > MAX_LISTED_FAILURES {
            println!("  ... 他 {} 件", summary.fail_count - MAX_LISTED_FAILURES);
        }
    }

    if config.execute {
        println!(
            "\n{}: {}, 元画像なし: {}, エラー: {}",
            match config.action_mode {
                ActionMode::Move => "移動",
                ActionMode::Copy => "コピー",
            },
            summary.processed_count,
            summary.missing_count,
            summary.error_count
        );
    }
}
