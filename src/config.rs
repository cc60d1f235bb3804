use crate::error::{CheckerError, Result};
use crate::relocator::ActionMode;
use blob_checker_common::classifier::{DEFAULT_LABEL_PREFIX, DEFAULT_METRIC_FIELD};
use blob_checker_common::{ClassifyOptions, DestinationLayout};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// デフォルトの画像名フィールド
pub const DEFAULT_IMAGE_ID_FIELD: &str = "ImageName";

/// 保存される既定値（~/.config/blob-checker/config.json）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    /// 期待値（使用時に数値として検証）
    pub expected: String,
    pub metric_field: String,
    pub image_id_field: String,
    pub label_prefix: String,
    pub action_mode: ActionMode,
    pub separate_by_model: bool,
    pub categorize_passes: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            expected: "9".into(),
            metric_field: DEFAULT_METRIC_FIELD.into(),
            image_id_field: DEFAULT_IMAGE_ID_FIELD.into(),
            label_prefix: DEFAULT_LABEL_PREFIX.into(),
            action_mode: ActionMode::Copy,
            separate_by_model: false,
            categorize_passes: false,
        }
    }
}

impl Settings {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let settings: Settings = serde_json::from_str(&content)?;
            Ok(settings)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| CheckerError::Config("ホームディレクトリが見つかりません".into()))?;
        Ok(home.join(".config").join("blob-checker").join("config.json"))
    }

    /// 期待値を検証してから設定
    pub fn set_expected(&mut self, value: &str) -> Result<()> {
        parse_expected(value)?;
        self.expected = value.trim().to_string();
        Ok(())
    }
}

/// 期待値文字列を数値に変換
pub fn parse_expected(value: &str) -> Result<f64> {
    let parsed: f64 = value
        .trim()
        .parse()
        .map_err(|_| CheckerError::Config(format!("期待値は数値で指定してください: {:?}", value)))?;
    if !parsed.is_finite() {
        return Err(CheckerError::Config(format!(
            "期待値は有限の数値で指定してください: {:?}",
            value
        )));
    }
    Ok(parsed)
}

/// 1回の解析の設定（実行中は変更しない）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunConfig {
    pub expected_metric: f64,
    pub metric_field: String,
    pub image_id_field: String,
    pub label_prefix: String,
    /// false なら解析のみ（ファイル操作なし）
    pub execute: bool,
    pub action_mode: ActionMode,
    pub separate_by_model: bool,
    pub categorize_passes: bool,
    /// 合格画像も振り分ける
    pub relocate_passes: bool,
    /// 省略時はエクスポートと同じフォルダ
    pub source_image_dir: Option<PathBuf>,
    pub destination_root: Option<PathBuf>,
    /// 省略時は destination_root
    pub passed_root: Option<PathBuf>,
    pub run_timestamp: String,
    pub parallel: bool,
    pub progress: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            expected_metric: 9.0,
            metric_field: DEFAULT_METRIC_FIELD.into(),
            image_id_field: DEFAULT_IMAGE_ID_FIELD.into(),
            label_prefix: DEFAULT_LABEL_PREFIX.into(),
            execute: false,
            action_mode: ActionMode::Copy,
            separate_by_model: false,
            categorize_passes: false,
            relocate_passes: true,
            source_image_dir: None,
            destination_root: None,
            passed_root: None,
            run_timestamp: new_timestamp(),
            parallel: false,
            progress: false,
        }
    }
}

impl RunConfig {
    /// 保存済みの既定値から作成
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        Ok(Self {
            expected_metric: parse_expected(&settings.expected)?,
            metric_field: settings.metric_field.clone(),
            image_id_field: settings.image_id_field.clone(),
            label_prefix: settings.label_prefix.clone(),
            action_mode: settings.action_mode,
            separate_by_model: settings.separate_by_model,
            categorize_passes: settings.categorize_passes,
            ..Default::default()
        })
    }

    pub fn classify_options(&self) -> ClassifyOptions {
        ClassifyOptions {
            metric_field: self.metric_field.clone(),
            expected: self.expected_metric,
            categorize: self.categorize_passes,
            label_prefix: self.label_prefix.clone(),
        }
    }

    /// 出力先フォルダ構成（出力先未指定なら None）
    pub fn layout(&self) -> Option<DestinationLayout> {
        let root = self.destination_root.as_ref()?;
        let mut layout = DestinationLayout::new(root, self.run_timestamp.clone())
            .separate_by_model(self.separate_by_model);
        if let Some(passed_root) = &self.passed_root {
            layout = layout.with_passed_root(passed_root);
        }
        Some(layout)
    }

    /// 処理前の検証（失敗したら何も処理しない）
    pub fn validate(&self) -> Result<()> {
        self.classify_options().validate()?;

        if self.image_id_field.trim().is_empty() {
            return Err(CheckerError::Config("画像名フィールド名が空です".into()));
        }
        if self.run_timestamp.trim().is_empty() {
            return Err(CheckerError::Config("タイムスタンプが空です".into()));
        }

        if self.execute {
            match &self.destination_root {
                Some(root) if !root.as_os_str().is_empty() => {}
                _ => {
                    return Err(CheckerError::Config(
                        "振り分け先フォルダを指定してください (--dest)".into(),
                    ))
                }
            }
            if let Some(dir) = &self.source_image_dir {
                if !dir.is_dir() {
                    return Err(CheckerError::Config(format!(
                        "画像フォルダが不正です: {}",
                        dir.display()
                    )));
                }
            }
        }

        Ok(())
    }
}

/// 実行タイムスタンプ（例: 20240501_153000）
pub fn new_timestamp() -> String {
    chrono::Local::now().format("%Y%m%d_%H%M%S").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_parse_expected() {
        assert_eq!(parse_expected("9").unwrap(), 9.0);
        assert_eq!(parse_expected(" 8.5 ").unwrap(), 8.5);
        assert!(matches!(parse_expected("nine"), Err(CheckerError::Config(_))));
        assert!(matches!(parse_expected(""), Err(CheckerError::Config(_))));
        assert!(matches!(parse_expected("inf"), Err(CheckerError::Config(_))));
    }

    #[test]
    fn test_settings_roundtrip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");

        let mut settings = Settings::default();
        settings.set_expected("12").unwrap();
        settings.action_mode = ActionMode::Move;
        settings.save_to(&path).unwrap();

        let loaded = Settings::load_from(&path).unwrap();
        assert_eq!(loaded, settings);
        assert_eq!(loaded.expected, "12");
    }

    #[test]
    fn test_settings_missing_file_is_default() {
        let dir = tempdir().unwrap();
        let loaded = Settings::load_from(&dir.path().join("none.json")).unwrap();
        assert_eq!(loaded, Settings::default());
    }

    #[test]
    fn test_settings_partial_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"expected":"7","actionMode":"move"}"#).unwrap();

        let loaded = Settings::load_from(&path).unwrap();
        assert_eq!(loaded.expected, "7");
        assert_eq!(loaded.action_mode, ActionMode::Move);
        assert_eq!(loaded.metric_field, DEFAULT_METRIC_FIELD);
    }

    #[test]
    fn test_set_expected_rejects_non_numeric() {
        let mut settings = Settings::default();
        assert!(settings.set_expected("abc").is_err());
        assert_eq!(settings.expected, "9");
    }

    #[test]
    fn test_from_settings_invalid_expected() {
        let settings = Settings {
            expected: "x".into(),
            ..Default::default()
        };
        assert!(matches!(
            RunConfig::from_settings(&settings),
            Err(CheckerError::Config(_))
        ));
    }

    #[test]
    fn test_validate_execute_requires_destination() {
        let config = RunConfig {
            execute: true,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(CheckerError::Config(_))));

        let dry = RunConfig::default();
        assert!(dry.validate().is_ok());
    }

    #[test]
    fn test_validate_source_dir_must_exist() {
        let dir = tempdir().unwrap();
        let config = RunConfig {
            execute: true,
            destination_root: Some(dir.path().join("out")),
            source_image_dir: Some(dir.path().join("missing")),
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(CheckerError::Config(_))));
    }

    #[test]
    fn test_validate_non_finite_expected() {
        let config = RunConfig {
            expected_metric: f64::NAN,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(CheckerError::Common(_))));
    }

    #[test]
    fn test_layout() {
        assert!(RunConfig::default().layout().is_none());

        let config = RunConfig {
            destination_root: Some(PathBuf::from("/out")),
            passed_root: Some(PathBuf::from("/ok")),
            run_timestamp: "ts".into(),
            separate_by_model: true,
            ..Default::default()
        };
        let layout = config.layout().unwrap();
        assert_eq!(layout.failed_root, PathBuf::from("/out"));
        assert_eq!(layout.passed_root, PathBuf::from("/ok"));
        assert!(layout.separate_by_model);
    }
}
