//! Off-surface text measurement for Horizon Lattice.
//!
//! This crate answers "how big will this text be?" without a rendering
//! surface: it wraps text to a width, measures each line, and derives a
//! font's ascent and descent by rasterizing probe glyphs and scanning the
//! coverage for inked rows.
//!
//! Glyph advances and rasterization come from a [`GlyphMeasurer`]. The
//! `cosmic` feature (on by default) provides [`cosmic::CosmicMeasurer`],
//! backed by the system font database; [`FixedAdvanceMeasurer`] is a
//! deterministic stand-in for headless use.
//!
//! # Measuring Text
//!
//! ```
//! use horizon_lattice_textmetrics::{FixedAdvanceMeasurer, TextMeasurer, TextStyle, WhiteSpace};
//!
//! let mut measurer = TextMeasurer::new(FixedAdvanceMeasurer::new(10.0));
//! let style = TextStyle::builder()
//!     .white_space(WhiteSpace::Normal)
//!     .word_wrap(true)
//!     .word_wrap_width(60.0)
//!     .build();
//!
//! let metrics = measurer.measure("hello   world", &style, false)?;
//! assert_eq!(metrics.lines, vec!["hello", "world"]);
//! assert_eq!(metrics.max_line_width, 50.0);
//! # Ok::<(), horizon_lattice_textmetrics::MeasureError>(())
//! ```
//!
//! # Measuring Off Thread
//!
//! A [`worker::MeasureWorker`] runs a measurer on a dedicated thread and
//! answers [`worker::MeasureRequest`]s in submission order. With the
//! `cosmic` feature, [`MeasureConfig::spawn_worker`] builds one from a TOML
//! configuration.
//!
//! # Logging
//!
//! All diagnostics go through `tracing` under the targets listed in
//! [`targets`].

pub mod config;
#[cfg(feature = "cosmic")]
pub mod cosmic;
mod error;
mod font;
mod glyph;
mod metrics;
mod probe;
mod style;
mod tokenizer;
mod types;
pub mod worker;
mod wrap;

pub use config::MeasureConfig;
pub use error::{MeasureError, MeasureResult};
pub use font::{FontDescriptor, css_length_to_px};
pub use glyph::{CoverageGrid, FixedAdvanceMeasurer, GlyphMeasurer};
pub use metrics::{TextMeasurer, TextMetrics};
pub use probe::{
    BASELINE_MULTIPLIER, BASELINE_SYMBOL, FontMetricsCache, FontProbe, FontProperties,
    METRICS_STRING, ProbeConfig,
};
pub use style::{TextStyle, TextStyleBuilder};
pub use tokenizer::{Token, is_breaking_space, is_newline, split_lines, tokenize, trim_end_breaking};
pub use types::{
    FontFamily, FontSize, FontStyle, FontVariant, FontWeight, GENERIC_FAMILIES, WhiteSpace,
};
pub use wrap::{AnywhereBreaks, BreakPolicy, GraphemeBreaks, WordWrapper, word_wrap};

/// `tracing` targets used by this crate.
pub mod targets {
    /// Font probing and the font metrics cache.
    pub const PROBE: &str = "horizon_lattice_textmetrics::probe";
    /// Word wrapping.
    pub const WRAP: &str = "horizon_lattice_textmetrics::wrap";
    /// Line and box measurement.
    pub const METRICS: &str = "horizon_lattice_textmetrics::metrics";
    /// The measurement worker.
    pub const WORKER: &str = "horizon_lattice_textmetrics::worker";
    /// The cosmic-text backend.
    pub const COSMIC: &str = "horizon_lattice_textmetrics::cosmic";
    /// Configuration loading.
    pub const CONFIG: &str = "horizon_lattice_textmetrics::config";
}
