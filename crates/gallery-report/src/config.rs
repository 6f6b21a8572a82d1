//! Report configuration
//!
//! Loaded from a TOML file:
//!
//! ```toml
//! item_limit = 30
//! concurrency = 5
//! page_size = "a4"            # or: page_size = { custom = { width = 500.0, height = 700.0 } }
//! margin_x = 28.35
//! margin_y = 28.35
//! header_mask = "masks/header.png"
//! footer_mask = "masks/footer.png"
//! ```
//!
//! Relative mask paths in a file are resolved against that file's
//! directory. URLs and absolute paths are kept as written.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Paper the report is laid out on.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageSize {
    Letter,
    #[default]
    A4,
    A5,
    /// Explicit size, in points.
    Custom { width: f64, height: f64 },
}

impl PageSize {
    /// Portrait `(width, height)` in points.
    pub fn dimensions(&self) -> (f64, f64) {
        match *self {
            PageSize::Letter => (612.0, 792.0),
            PageSize::A4 => (595.28, 841.89),
            PageSize::A5 => (419.53, 595.28),
            PageSize::Custom { width, height } => (width, height),
        }
    }

    pub fn width_pt(&self) -> f64 {
        self.dimensions().0
    }

    pub fn height_pt(&self) -> f64 {
        self.dimensions().1
    }
}

/// Settings for one export job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Maximum number of items in one report
    pub item_limit: usize,
    /// Images decoded per batch
    pub concurrency: usize,
    pub page_size: PageSize,
    /// Horizontal margin in points
    pub margin_x: f64,
    /// Vertical margin in points, used between masks and slots
    pub margin_y: f64,
    pub title_font_size: f64,
    pub meta_font_size: f64,
    pub caption_font_size: f64,
    /// JPEG quality (1-100) for embedded images
    pub jpeg_quality: u8,
    pub filename_prefix: String,
    /// Header mask graphic (path or URL)
    pub header_mask: Option<String>,
    /// Footer mask graphic (path or URL)
    pub footer_mask: Option<String>,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            item_limit: 30,
            concurrency: 5,
            page_size: PageSize::A4,
            margin_x: 28.35, // 10mm
            margin_y: 28.35,
            title_font_size: 14.0,
            meta_font_size: 9.0,
            caption_font_size: 9.0,
            jpeg_quality: 85,
            filename_prefix: "gallery-report".to_string(),
            header_mask: None,
            footer_mask: None,
        }
    }
}

impl ReportConfig {
    /// Load and validate a config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io(e.to_string()))?;
        let mut config = Self::from_toml(&content)?;
        if let Some(dir) = path.parent() {
            config.resolve_masks(dir);
        }
        Ok(config)
    }

    /// Make relative mask paths relative to `dir` instead of the loader's base.
    pub fn resolve_masks(&mut self, dir: &Path) {
        for mask in [&mut self.header_mask, &mut self.footer_mask].into_iter().flatten() {
            let is_url = mask.contains("://");
            if !is_url && Path::new(mask.as_str()).is_relative() {
                *mask = dir.join(mask.as_str()).to_string_lossy().into_owned();
            }
        }
    }

    /// Parse and validate TOML text.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: ReportConfig =
            toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from the standard locations:
    /// 1. `.gallery/report.toml` in the working directory
    /// 2. `~/.gallery/report.toml`
    ///
    /// Falls back to defaults when neither exists.
    pub fn load_standard() -> Result<Self, ConfigError> {
        for path in Self::standard_paths() {
            if path.is_file() {
                tracing::info!("Loading report config from {:?}", path);
                return Self::load(&path);
            }
        }
        tracing::debug!("No report config found, using defaults");
        Ok(Self::default())
    }

    fn standard_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from(".gallery").join("report.toml")];
        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".gallery").join("report.toml"));
        }
        paths
    }

    /// Check values that would make a job impossible.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.item_limit == 0 {
            return Err(ConfigError::Invalid("item_limit must be at least 1".to_string()));
        }
        if self.concurrency == 0 {
            return Err(ConfigError::Invalid("concurrency must be at least 1".to_string()));
        }
        if !(1..=100).contains(&self.jpeg_quality) {
            return Err(ConfigError::Invalid("jpeg_quality must be within 1..=100".to_string()));
        }
        let (width, height) = (self.page_size.width_pt(), self.page_size.height_pt());
        if width <= 2.0 * self.margin_x || height <= 3.0 * self.margin_y {
            return Err(ConfigError::Invalid(format!(
                "margins {}x{} leave no room on a {}x{} page",
                self.margin_x, self.margin_y, width, height
            )));
        }
        if self.margin_x < 0.0 || self.margin_y < 0.0 {
            return Err(ConfigError::Invalid("margins must not be negative".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = ReportConfig::default();
        assert_eq!(config.item_limit, 30);
        assert_eq!(config.concurrency, 5);
        assert_eq!(config.page_size, PageSize::A4);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn page_size_dimensions() {
        assert!((PageSize::Letter.width_pt() - 612.0).abs() < 0.01);
        assert!((PageSize::A4.height_pt() - 841.89).abs() < 0.01);
        let custom = PageSize::Custom { width: 100.0, height: 200.0 };
        assert_eq!(custom.height_pt(), 200.0);
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config = ReportConfig::from_toml(
            r#"
            item_limit = 12
            page_size = "letter"
            footer_mask = "masks/footer.png"
            "#,
        )
        .unwrap();
        assert_eq!(config.item_limit, 12);
        assert_eq!(config.page_size, PageSize::Letter);
        assert_eq!(config.concurrency, 5);
        assert_eq!(config.footer_mask.as_deref(), Some("masks/footer.png"));
        assert!(config.header_mask.is_none());
    }

    #[test]
    fn custom_page_size() {
        let config =
            ReportConfig::from_toml("page_size = { custom = { width = 500.0, height = 700.0 } }").unwrap();
        assert_eq!(config.page_size, PageSize::Custom { width: 500.0, height: 700.0 });
    }

    #[test]
    fn rejects_zero_concurrency() {
        let err = ReportConfig::from_toml("concurrency = 0").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn rejects_oversized_margins() {
        let err = ReportConfig::from_toml("margin_y = 400.0").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn rejects_bad_toml() {
        let err = ReportConfig::from_toml("item_limit = \"many\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.toml");
        std::fs::write(&path, "item_limit = 3\n").unwrap();
        assert_eq!(ReportConfig::load(&path).unwrap().item_limit, 3);
    }

    #[test]
    fn load_resolves_masks_next_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.toml");
        std::fs::write(
            &path,
            "header_mask = \"masks/header.png\"\nfooter_mask = \"https://cdn.example/footer.png\"\n",
        )
        .unwrap();

        let config = ReportConfig::load(&path).unwrap();
        let expected = dir.path().join("masks/header.png").to_string_lossy().into_owned();
        assert_eq!(config.header_mask.as_deref(), Some(expected.as_str()));
        assert_eq!(config.footer_mask.as_deref(), Some("https://cdn.example/footer.png"));
    }

    #[test]
    fn resolve_keeps_absolute_paths() {
        let mut config = ReportConfig {
            header_mask: Some("/srv/masks/header.png".to_string()),
            ..Default::default()
        };
        config.resolve_masks(Path::new("/etc/gallery"));
        assert_eq!(config.header_mask.as_deref(), Some("/srv/masks/header.png"));
    }

    #[test]
    fn load_missing_file() {
        let err = ReportConfig::load(Path::new("/nonexistent/report.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
