//! Export settings
//!
//! Persisted as camelCase JSON; every field has a default so partial or
//! older files still load.

use crate::pdf::PdfExportOptions;
use crate::{Result, StoreError};
use render_model::{Color, PageFormat, PaperSize};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Supersampling factor used when nothing else is configured
pub const DEFAULT_SUPERSAMPLE_SCALE: f32 = 2.5;

/// Upper bound for the supersampling factor
pub const MAX_SUPERSAMPLE_SCALE: f32 = 8.0;

/// How exports are produced
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExportSettings {
    /// Paper size of the exported PDF
    pub page_format: PaperSize,
    /// Device pixels per CSS pixel for the capture
    pub supersample_scale: f32,
    /// Page background as `#rrggbb`
    pub background: String,
    /// Flate-compress the PDF
    pub compress: bool,
    /// `/Author` in the document info
    pub author: Option<String>,
    /// `/Creator` in the document info
    pub creator: Option<String>,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            page_format: PaperSize::A4,
            supersample_scale: DEFAULT_SUPERSAMPLE_SCALE,
            background: "#ffffff".to_string(),
            compress: true,
            author: None,
            creator: Some("Letterhead".to_string()),
        }
    }
}

impl ExportSettings {
    pub fn format(&self) -> PageFormat {
        self.page_format.format()
    }

    /// Parsed page background
    pub fn background_color(&self) -> Result<Color> {
        Color::from_hex(&self.background)
            .map_err(|e| StoreError::InvalidSettings(format!("background: {}", e)))
    }

    /// Check values that serde cannot
    pub fn validate(&self) -> Result<()> {
        let scale = self.supersample_scale;
        if !scale.is_finite() || scale <= 0.0 || scale > MAX_SUPERSAMPLE_SCALE {
            return Err(StoreError::InvalidSettings(format!(
                "supersampleScale must be in (0, {}], got {}",
                MAX_SUPERSAMPLE_SCALE, scale
            )));
        }
        self.background_color()?;
        Ok(())
    }

    /// PDF options carrying these settings' metadata
    pub fn pdf_options(&self) -> PdfExportOptions {
        let mut options = PdfExportOptions::new().with_compression(self.compress);
        options.author = self.author.clone();
        if self.creator.is_some() {
            options.creator = self.creator.clone();
        }
        options
    }
}

/// Loads and saves [`ExportSettings`] at a fixed path
pub struct SettingsManager {
    settings_path: PathBuf,
    current: ExportSettings,
}

impl SettingsManager {
    /// Manager for `settings.json` in `config_dir`
    pub fn new(config_dir: impl AsRef<Path>) -> Self {
        Self::at_path(config_dir.as_ref().join("settings.json"))
    }

    /// Manager for an explicit settings file
    pub fn at_path(settings_path: impl Into<PathBuf>) -> Self {
        Self {
            settings_path: settings_path.into(),
            current: ExportSettings::default(),
        }
    }

    pub fn settings_path(&self) -> &Path {
        &self.settings_path
    }

    fn apply_loaded(&mut self, content: &str) {
        self.current = match serde_json::from_str::<ExportSettings>(content) {
            Ok(settings) => match settings.validate() {
                Ok(()) => settings,
                Err(e) => {
                    tracing::warn!(path = %self.settings_path.display(), "invalid settings, using defaults: {}", e);
                    ExportSettings::default()
                }
            },
            Err(e) => {
                tracing::warn!(path = %self.settings_path.display(), "failed to parse settings, using defaults: {}", e);
                ExportSettings::default()
            }
        };
    }

    /// Load settings from disk, or defaults if the file is missing or unreadable as JSON
    pub async fn load(&mut self) -> Result<&ExportSettings> {
        if tokio::fs::try_exists(&self.settings_path).await? {
            let content = tokio::fs::read_to_string(&self.settings_path).await?;
            self.apply_loaded(&content);
        } else {
            self.current = ExportSettings::default();
        }
        Ok(&self.current)
    }

    /// Synchronous [`load`](Self::load)
    pub fn load_sync(&mut self) -> Result<&ExportSettings> {
        if self.settings_path.exists() {
            let content = std::fs::read_to_string(&self.settings_path)?;
            self.apply_loaded(&content);
        } else {
            self.current = ExportSettings::default();
        }
        Ok(&self.current)
    }

    /// Save current settings as pretty JSON
    pub fn save_sync(&self) -> Result<()> {
        if let Some(parent) = self.settings_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(&self.current)?;
        crate::write_atomic(&self.settings_path, content.as_bytes())?;
        Ok(())
    }

    pub fn get(&self) -> &ExportSettings {
        &self.current
    }

    /// Replace and save settings
    pub fn update_sync(&mut self, settings: ExportSettings) -> Result<()> {
        settings.validate()?;
        self.current = settings;
        self.save_sync()
    }

    /// Reset to defaults and save
    pub fn reset_sync(&mut self) -> Result<&ExportSettings> {
        self.current = ExportSettings::default();
        self.save_sync()?;
        Ok(&self.current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let settings = ExportSettings::default();
        assert_eq!(settings.page_format, PaperSize::A4);
        assert_eq!(settings.supersample_scale, 2.5);
        assert_eq!(settings.background_color().unwrap(), Color::WHITE);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let settings: ExportSettings =
            serde_json::from_str(r#"{"pageFormat":"letter","supersampleScale":2}"#).unwrap();
        assert_eq!(settings.page_format, PaperSize::Letter);
        assert_eq!(settings.supersample_scale, 2.0);
        assert_eq!(settings.background, "#ffffff");
        assert_eq!(settings.format(), PageFormat::letter());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let settings = ExportSettings {
            supersample_scale: 0.0,
            ..Default::default()
        };
        assert!(matches!(settings.validate(), Err(StoreError::InvalidSettings(_))));

        let settings = ExportSettings {
            background: "white".into(),
            ..Default::default()
        };
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_pdf_options() {
        let settings = ExportSettings {
            author: Some("Acme Corp".into()),
            compress: false,
            ..Default::default()
        };
        let options = settings.pdf_options();
        assert_eq!(options.author.as_deref(), Some("Acme Corp"));
        assert!(!options.compress);
        assert_eq!(options.creator.as_deref(), Some("Letterhead"));
    }

    #[test]
    fn test_save_and_load() {
        let dir = TempDir::new().unwrap();
        let mut manager = SettingsManager::new(dir.path());
        manager
            .update_sync(ExportSettings {
                supersample_scale: 3.0,
                ..Default::default()
            })
            .unwrap();

        let mut reloaded = SettingsManager::new(dir.path());
        assert_eq!(reloaded.load_sync().unwrap().supersample_scale, 3.0);
    }

    #[test]
    fn test_corrupt_file_falls_back() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("settings.json"), "not json").unwrap();
        let mut manager = SettingsManager::new(dir.path());
        assert_eq!(manager.load_sync().unwrap(), &ExportSettings::default());
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let mut manager = SettingsManager::at_path(dir.path().join("absent.json"));
        assert_eq!(manager.load_sync().unwrap(), &ExportSettings::default());
    }

    #[tokio::test]
    async fn test_async_load() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("settings.json"),
            r##"{"background":"#f8fafc"}"##,
        )
        .unwrap();
        let mut manager = SettingsManager::new(dir.path());
        let settings = manager.load().await.unwrap();
        assert_eq!(settings.background_color().unwrap(), Color::SLATE_50);
    }
}
