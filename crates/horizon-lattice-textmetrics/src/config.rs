//! TOML configuration.
//!
//! ```toml
//! [font_system]
//! load_system_fonts = true
//! locale = "en-US"
//! font_dirs = ["assets/fonts"]
//! sans_serif_family = "Inter"
//!
//! [probe]
//! coverage_threshold = 0
//!
//! [worker]
//! name = "textmetrics-worker"
//! queue_capacity = 256
//!
//! [style]
//! font_family = "Inter, sans-serif"
//! font_size = 14
//! white_space = "normal"
//! ```
//!
//! Every section and key is optional; missing values take their defaults.

use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::MeasureResult;
use crate::probe::{FontMetricsCache, FontProbe, ProbeConfig};
use crate::style::TextStyle;
use crate::targets;
use crate::worker::WorkerConfig;

#[cfg(feature = "cosmic")]
use crate::cosmic::{CosmicMeasurer, FontSystem, FontSystemConfig};
#[cfg(feature = "cosmic")]
use crate::metrics::TextMeasurer;
#[cfg(feature = "cosmic")]
use crate::worker::MeasureWorker;

/// Settings for the measurement engine.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MeasureConfig {
    /// Font database settings.
    #[cfg(feature = "cosmic")]
    pub font_system: FontSystemConfig,
    /// Glyph probe settings.
    pub probe: ProbeConfig,
    /// Worker thread settings.
    pub worker: WorkerConfig,
    /// Base style; requests and callers override individual fields.
    pub style: TextStyle,
}

impl MeasureConfig {
    /// Parse configuration from TOML text.
    pub fn from_toml_str(text: &str) -> MeasureResult<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Read configuration from a TOML file.
    pub fn from_path(path: impl AsRef<Path>) -> MeasureResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&text)?;
        debug!(target: targets::CONFIG, path = %path.display(), "loaded configuration");
        Ok(config)
    }

    /// A font probe over `cache` using the configured probe settings.
    pub fn font_probe(&self, cache: Arc<FontMetricsCache>) -> FontProbe {
        FontProbe::new(cache).with_config(self.probe)
    }

    /// Start a cosmic-text backed worker.
    ///
    /// The font system is built on the worker thread; probe results go to
    /// the process-wide font metrics cache.
    #[cfg(feature = "cosmic")]
    pub fn spawn_worker(&self) -> MeasureResult<MeasureWorker> {
        let font_system = self.font_system.clone();
        let probe = self.font_probe(FontMetricsCache::global());

        MeasureWorker::spawn(self.worker.clone(), self.style.clone(), move || {
            let measurer = CosmicMeasurer::with_font_system(FontSystem::with_config(font_system));
            TextMeasurer::new(measurer).with_probe(probe)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{FontSize, WhiteSpace};

    #[test]
    fn test_empty_config_is_default() {
        let config = MeasureConfig::from_toml_str("").unwrap();
        assert_eq!(config.probe, ProbeConfig::default());
        assert_eq!(config.worker, WorkerConfig::default());
        assert_eq!(config.style, TextStyle::default());
    }

    #[test]
    fn test_sections_merge_over_defaults() {
        let config = MeasureConfig::from_toml_str(
            r#"
            [probe]
            coverage_threshold = 32

            [worker]
            queue_capacity = 8

            [style]
            font_family = ["Inter", "sans-serif"]
            font_size = "12pt"
            white_space = "pre-line"
            "#,
        )
        .unwrap();

        assert_eq!(config.probe.coverage_threshold, 32);
        assert_eq!(config.worker.queue_capacity, 8);
        assert_eq!(config.worker.name, WorkerConfig::default().name);
        assert_eq!(config.style.font_family, vec!["Inter", "sans-serif"]);
        assert_eq!(config.style.font_size, FontSize::Css("12pt".into()));
        assert_eq!(config.style.white_space, WhiteSpace::PreLine);
        assert_eq!(config.style.word_wrap_width, 100.0);
    }

    #[cfg(feature = "cosmic")]
    #[test]
    fn test_font_system_section() {
        let config = MeasureConfig::from_toml_str(
            r#"
            [font_system]
            load_system_fonts = false
            locale = "fr-FR"
            font_dirs = ["fonts"]
            monospace_family = "Fira Code"
            "#,
        )
        .unwrap();

        assert!(!config.font_system.load_system_fonts);
        assert_eq!(config.font_system.locale, "fr-FR");
        assert_eq!(config.font_system.font_dirs.len(), 1);
        assert_eq!(config.font_system.monospace_family.as_deref(), Some("Fira Code"));
    }

    #[test]
    fn test_invalid_toml_is_a_config_error() {
        let result = MeasureConfig::from_toml_str("[probe]\ncoverage_threshold = \"high\"");
        assert!(matches!(result, Err(crate::MeasureError::Config(_))));
    }

    #[test]
    fn test_probe_uses_configured_threshold() {
        let config = MeasureConfig::from_toml_str("[probe]\ncoverage_threshold = 9").unwrap();
        let probe = config.font_probe(Arc::new(FontMetricsCache::new()));
        assert_eq!(probe.config().coverage_threshold, 9);
    }
}
