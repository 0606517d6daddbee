//! Font metrics derived by rasterizing probe glyphs.
//!
//! A font's ascent and descent are found empirically: a probe string with
//! tall, accented and descending glyphs is drawn at a known baseline and the
//! coverage grid is scanned for the first and last inked rows. Results are
//! memoized per font string in a [`FontMetricsCache`].

use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::error::MeasureResult;
use crate::glyph::{CoverageGrid, GlyphMeasurer};
use crate::targets;

/// Glyphs covering the tallest ascenders, accents and descenders.
pub const METRICS_STRING: &str = "|Éq";
/// Glyph whose advance sizes the probe canvas.
pub const BASELINE_SYMBOL: &str = "M";
/// Baseline position as a multiple of the baseline symbol's advance.
pub const BASELINE_MULTIPLIER: f32 = 1.4;

/// Vertical metrics of a font, in whole pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct FontProperties {
    /// Distance from the baseline to the topmost inked row.
    pub ascent: u32,
    /// Distance from the baseline to just below the lowest inked row.
    pub descent: u32,
    /// `ascent + descent`.
    pub font_size: u32,
}

impl FontProperties {
    /// Create properties from ascent and descent.
    pub fn new(ascent: u32, descent: u32) -> Self {
        Self {
            ascent,
            descent,
            font_size: ascent + descent,
        }
    }

    /// Derive properties from a probe grid with the baseline at `baseline`.
    ///
    /// A pixel counts as inked when its coverage exceeds `threshold`.
    pub fn from_coverage(grid: &CoverageGrid, baseline: u32, threshold: u8) -> Self {
        let baseline = baseline.min(grid.height());

        let ascent = (0..baseline)
            .find(|&row| grid.row_is_inked(row, threshold))
            .map_or(0, |row| baseline - row);

        let descent = (baseline..grid.height())
            .rev()
            .find(|&row| grid.row_is_inked(row, threshold))
            .map_or(0, |row| row + 1 - baseline);

        Self::new(ascent, descent)
    }
}

/// Probe tuning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProbeConfig {
    /// Coverage values at or below this count as background.
    pub coverage_threshold: u8,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            coverage_threshold: 0,
        }
    }
}

impl ProbeConfig {
    /// Set the coverage threshold.
    pub fn coverage_threshold(mut self, threshold: u8) -> Self {
        self.coverage_threshold = threshold;
        self
    }
}

static GLOBAL_CACHE: OnceLock<Arc<FontMetricsCache>> = OnceLock::new();

/// Thread-safe memo of [`FontProperties`] keyed by exact font string.
///
/// Entries are never evicted. Concurrent callers missing the same key may
/// both compute it; the first insert wins and both observe the same value.
#[derive(Debug, Default)]
pub struct FontMetricsCache {
    entries: RwLock<HashMap<String, FontProperties>>,
}

impl FontMetricsCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide cache, created on first use.
    pub fn global() -> Arc<FontMetricsCache> {
        GLOBAL_CACHE
            .get_or_init(|| Arc::new(FontMetricsCache::new()))
            .clone()
    }

    /// Look up a cached entry.
    pub fn get(&self, font: &str) -> Option<FontProperties> {
        self.entries.read().get(font).copied()
    }

    /// Return the cached entry for `font`, computing and storing it on a miss.
    ///
    /// Errors from `compute` are returned without caching anything.
    pub fn get_or_try_insert_with<F>(&self, font: &str, compute: F) -> MeasureResult<FontProperties>
    where
        F: FnOnce() -> MeasureResult<FontProperties>,
    {
        if let Some(properties) = self.get(font) {
            trace!(target: targets::PROBE, font, "font metrics cache hit");
            return Ok(properties);
        }

        let computed = compute()?;
        let mut entries = self.entries.write();
        Ok(*entries.entry(font.to_string()).or_insert(computed))
    }

    /// Number of cached fonts.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Whether nothing has been cached yet.
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Drop every cached entry.
    pub fn clear(&mut self) {
        self.entries.get_mut().clear();
    }
}

/// Measures font properties through a [`GlyphMeasurer`], memoized in a cache.
#[derive(Debug, Clone)]
pub struct FontProbe {
    cache: Arc<FontMetricsCache>,
    config: ProbeConfig,
}

impl Default for FontProbe {
    fn default() -> Self {
        Self::new(FontMetricsCache::global())
    }
}

impl FontProbe {
    /// Create a probe backed by `cache`.
    pub fn new(cache: Arc<FontMetricsCache>) -> Self {
        Self {
            cache,
            config: ProbeConfig::default(),
        }
    }

    /// Use the given probe settings.
    pub fn with_config(mut self, config: ProbeConfig) -> Self {
        self.config = config;
        self
    }

    /// The backing cache.
    pub fn cache(&self) -> &Arc<FontMetricsCache> {
        &self.cache
    }

    /// The probe settings.
    pub fn config(&self) -> ProbeConfig {
        self.config
    }

    /// Ascent, descent and font size of `font`.
    ///
    /// A cache hit returns without touching `measurer`.
    pub fn measure_font<M: GlyphMeasurer + ?Sized>(
        &self,
        measurer: &mut M,
        font: &str,
    ) -> MeasureResult<FontProperties> {
        self.cache
            .get_or_try_insert_with(font, || self.probe(measurer, font))
    }

    fn probe<M: GlyphMeasurer + ?Sized>(
        &self,
        measurer: &mut M,
        font: &str,
    ) -> MeasureResult<FontProperties> {
        let probe_text = format!("{METRICS_STRING}{BASELINE_SYMBOL}");
        let width = measurer.advance_width(font, &probe_text)?.ceil().max(0.0) as u32;
        let symbol = measurer.advance_width(font, BASELINE_SYMBOL)?.ceil().max(0.0) as u32;
        let height = symbol * 2;
        let baseline = (symbol as f32 * BASELINE_MULTIPLIER) as u32;

        let grid = measurer.rasterize(font, &probe_text, width, height, baseline)?;
        let properties =
            FontProperties::from_coverage(&grid, baseline, self.config.coverage_threshold);

        debug!(
            target: targets::PROBE,
            font,
            width,
            height,
            baseline,
            ascent = properties.ascent,
            descent = properties.descent,
            "probed font metrics"
        );

        Ok(properties)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MeasureError;
    use crate::glyph::FixedAdvanceMeasurer;

    #[test]
    fn test_coverage_scan_finds_extents() {
        let mut grid = CoverageGrid::new(4, 10);
        grid.accumulate(1, 2, 255);
        grid.accumulate(2, 8, 255);

        assert_eq!(FontProperties::from_coverage(&grid, 7, 0), FontProperties::new(5, 2));
    }

    #[test]
    fn test_blank_grid_yields_zero() {
        let grid = CoverageGrid::new(4, 10);
        assert_eq!(FontProperties::from_coverage(&grid, 7, 0), FontProperties::default());
    }

    #[test]
    fn test_threshold_ignores_faint_pixels() {
        let mut grid = CoverageGrid::new(4, 10);
        grid.accumulate(0, 1, 10);
        grid.accumulate(0, 3, 200);

        assert_eq!(FontProperties::from_coverage(&grid, 7, 0).ascent, 6);
        assert_eq!(FontProperties::from_coverage(&grid, 7, 16).ascent, 4);
    }

    #[test]
    fn test_probe_uses_canvas_geometry() {
        // "M" advances 10 => height 20, baseline 14
        let mut measurer = FixedAdvanceMeasurer::new(10.0).with_extents(9, 3);
        let probe = FontProbe::new(Arc::new(FontMetricsCache::new()));

        let properties = probe.measure_font(&mut measurer, "20px test").unwrap();
        assert_eq!(properties, FontProperties::new(9, 3));
        assert_eq!(properties.font_size, 12);
    }

    #[test]
    fn test_extents_are_clipped_to_canvas() {
        let mut measurer = FixedAdvanceMeasurer::new(10.0).with_extents(30, 30);
        let probe = FontProbe::new(Arc::new(FontMetricsCache::new()));

        let properties = probe.measure_font(&mut measurer, "20px tall").unwrap();
        assert_eq!(properties, FontProperties::new(14, 6));
    }

    #[test]
    fn test_cache_hit_skips_rasterizer() {
        let mut measurer = FixedAdvanceMeasurer::new(10.0);
        let probe = FontProbe::new(Arc::new(FontMetricsCache::new()));

        let first = probe.measure_font(&mut measurer, "a").unwrap();
        let second = probe.measure_font(&mut measurer, "a").unwrap();
        probe.measure_font(&mut measurer, "b").unwrap();

        assert_eq!(first, second);
        assert_eq!(measurer.rasterize_calls(), 2);
        assert_eq!(probe.cache().len(), 2);
    }

    #[test]
    fn test_failed_probe_is_not_cached() {
        let cache = FontMetricsCache::new();
        let result = cache.get_or_try_insert_with("x", || Err(MeasureError::Primitive("boom".into())));

        assert!(matches!(result, Err(MeasureError::Primitive(_))));
        assert!(cache.is_empty());
    }

    #[test]
    fn test_first_insert_wins() {
        let cache = FontMetricsCache::new();
        cache
            .get_or_try_insert_with("x", || Ok(FontProperties::new(1, 1)))
            .unwrap();
        let again = cache
            .get_or_try_insert_with("x", || Ok(FontProperties::new(5, 5)))
            .unwrap();

        assert_eq!(again, FontProperties::new(1, 1));
    }

    #[test]
    fn test_global_cache_is_shared() {
        assert!(Arc::ptr_eq(&FontMetricsCache::global(), &FontMetricsCache::global()));
    }
}
