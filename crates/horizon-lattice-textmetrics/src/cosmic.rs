//! Glyph measurement backed by cosmic-text.
//!
//! [`CosmicMeasurer`] implements [`GlyphMeasurer`] on top of a font
//! database: runs are shaped with a `cosmic_text::Buffer` and rasterized with
//! swash into a [`CoverageGrid`].
//!
//! # Example
//!
//! ```no_run
//! use horizon_lattice_textmetrics::cosmic::CosmicMeasurer;
//! use horizon_lattice_textmetrics::{TextMeasurer, TextStyle};
//!
//! let mut measurer = TextMeasurer::new(CosmicMeasurer::new());
//! let style = TextStyle::builder()
//!     .font_family("DejaVu Sans, sans-serif")
//!     .font_size(14.0)
//!     .word_wrap(true)
//!     .word_wrap_width(120.0)
//!     .build();
//!
//! let metrics = measurer.measure("The quick brown fox", &style, false)?;
//! println!("{} lines, {}x{}", metrics.lines.len(), metrics.width, metrics.height);
//! # Ok::<(), horizon_lattice_textmetrics::MeasureError>(())
//! ```

use std::collections::HashMap;
use std::path::PathBuf;

use cosmic_text::{Buffer, Metrics, Shaping, SwashCache, SwashContent};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::MeasureResult;
use crate::font::FontDescriptor;
use crate::glyph::{CoverageGrid, GlyphMeasurer};
use crate::targets;
use crate::types::FontFamily;

/// Line height used when shaping single runs, relative to the font size.
const SHAPING_LINE_HEIGHT: f32 = 1.2;

/// Configuration for initializing the font system.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FontSystemConfig {
    /// Whether to load system fonts on initialization.
    pub load_system_fonts: bool,
    /// Locale string for text shaping (e.g., "en-US").
    pub locale: String,
    /// Extra directories scanned for font files.
    pub font_dirs: Vec<PathBuf>,
    /// Default serif font family name.
    pub serif_family: Option<String>,
    /// Default sans-serif font family name.
    pub sans_serif_family: Option<String>,
    /// Default monospace font family name.
    pub monospace_family: Option<String>,
    /// Default cursive font family name.
    pub cursive_family: Option<String>,
    /// Default fantasy font family name.
    pub fantasy_family: Option<String>,
}

impl Default for FontSystemConfig {
    fn default() -> Self {
        Self {
            load_system_fonts: true,
            locale: sys_locale::get_locale().unwrap_or_else(|| "en-US".to_string()),
            font_dirs: Vec::new(),
            serif_family: None,
            sans_serif_family: None,
            monospace_family: None,
            cursive_family: None,
            fantasy_family: None,
        }
    }
}

impl FontSystemConfig {
    /// Create a new configuration with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set whether to load system fonts on initialization.
    pub fn load_system_fonts(mut self, load: bool) -> Self {
        self.load_system_fonts = load;
        self
    }

    /// Set the locale for text shaping.
    pub fn locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = locale.into();
        self
    }

    /// Add a directory to scan for fonts.
    pub fn font_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.font_dirs.push(dir.into());
        self
    }

    /// Set the default serif font family.
    pub fn serif_family(mut self, family: impl Into<String>) -> Self {
        self.serif_family = Some(family.into());
        self
    }

    /// Set the default sans-serif font family.
    pub fn sans_serif_family(mut self, family: impl Into<String>) -> Self {
        self.sans_serif_family = Some(family.into());
        self
    }

    /// Set the default monospace font family.
    pub fn monospace_family(mut self, family: impl Into<String>) -> Self {
        self.monospace_family = Some(family.into());
        self
    }

    /// Set the default cursive font family.
    pub fn cursive_family(mut self, family: impl Into<String>) -> Self {
        self.cursive_family = Some(family.into());
        self
    }

    /// Set the default fantasy font family.
    pub fn fantasy_family(mut self, family: impl Into<String>) -> Self {
        self.fantasy_family = Some(family.into());
        self
    }
}

/// Font database and shaping context.
///
/// `FontSystem` is not `Sync`; a measurement worker owns its own instance.
pub struct FontSystem {
    inner: cosmic_text::FontSystem,
}

impl FontSystem {
    /// Create a new font system with default configuration.
    ///
    /// This loads all system fonts, which may take around a second
    /// depending on the number of fonts installed.
    pub fn new() -> Self {
        Self::with_config(FontSystemConfig::default())
    }

    /// Create a new font system with custom configuration.
    pub fn with_config(config: FontSystemConfig) -> Self {
        let mut db = fontdb::Database::new();
        if config.load_system_fonts {
            db.load_system_fonts();
        }
        for dir in &config.font_dirs {
            db.load_fonts_dir(dir);
        }

        if let Some(ref family) = config.serif_family {
            db.set_serif_family(family);
        }
        if let Some(ref family) = config.sans_serif_family {
            db.set_sans_serif_family(family);
        }
        if let Some(ref family) = config.monospace_family {
            db.set_monospace_family(family);
        }
        if let Some(ref family) = config.cursive_family {
            db.set_cursive_family(family);
        }
        if let Some(ref family) = config.fantasy_family {
            db.set_fantasy_family(family);
        }

        let inner = cosmic_text::FontSystem::new_with_locale_and_db(config.locale.clone(), db);
        debug!(
            target: targets::COSMIC,
            locale = %config.locale,
            faces = inner.db().len(),
            "font system created"
        );

        Self { inner }
    }

    /// Mutable access to the underlying cosmic-text font system.
    pub fn inner_mut(&mut self) -> &mut cosmic_text::FontSystem {
        &mut self.inner
    }

    /// Number of loaded font faces.
    pub fn face_count(&self) -> usize {
        self.inner.db().len()
    }

    /// Check if a font family exists in the database.
    pub fn has_family(&self, family: &str) -> bool {
        self.inner
            .db()
            .faces()
            .any(|face| face.families.iter().any(|(name, _)| name.eq_ignore_ascii_case(family)))
    }
}

impl Default for FontSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for FontSystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontSystem")
            .field("face_count", &self.face_count())
            .finish()
    }
}

/// A font string resolved against the font database.
#[derive(Debug, Clone)]
struct ResolvedFont {
    descriptor: FontDescriptor,
    family: FontFamily,
}

/// [`GlyphMeasurer`] that shapes and rasterizes with cosmic-text.
pub struct CosmicMeasurer {
    font_system: FontSystem,
    swash_cache: SwashCache,
    resolved: HashMap<String, ResolvedFont>,
}

impl CosmicMeasurer {
    /// Create a measurer over a default font system (system fonts loaded).
    pub fn new() -> Self {
        Self::with_font_system(FontSystem::new())
    }

    /// Create a measurer over an existing font system.
    pub fn with_font_system(font_system: FontSystem) -> Self {
        Self {
            font_system,
            swash_cache: SwashCache::new(),
            resolved: HashMap::new(),
        }
    }

    /// The font system.
    pub fn font_system(&self) -> &FontSystem {
        &self.font_system
    }

    /// Mutable access to the font system.
    ///
    /// Loading fonts invalidates earlier family resolution.
    pub fn font_system_mut(&mut self) -> &mut FontSystem {
        self.resolved.clear();
        &mut self.font_system
    }

    /// Parse `font` and pick the family to render it with: the first named
    /// family present in the database, else the first generic family, else
    /// sans-serif.
    fn resolve(&mut self, font: &str) -> MeasureResult<ResolvedFont> {
        if let Some(resolved) = self.resolved.get(font) {
            return Ok(resolved.clone());
        }

        let descriptor = FontDescriptor::parse(font)?;
        let family = descriptor
            .families
            .iter()
            .find(|family| match family {
                FontFamily::Name(name) => self.font_system.has_family(name),
                _ => false,
            })
            .or_else(|| descriptor.families.iter().find(|family| family.is_generic()))
            .cloned()
            .unwrap_or(FontFamily::SansSerif);

        if family.is_generic() {
            debug!(
                target: targets::COSMIC,
                font,
                family = %family,
                "no named family installed, using generic family"
            );
        }

        let resolved = ResolvedFont { descriptor, family };
        self.resolved.insert(font.to_string(), resolved.clone());
        Ok(resolved)
    }

    /// Shape `text` as a single unwrapped line.
    fn shape(&mut self, resolved: &ResolvedFont, text: &str) -> Buffer {
        let size = resolved.descriptor.size_px;
        let metrics = Metrics::new(size, size * SHAPING_LINE_HEIGHT);
        let fs = self.font_system.inner_mut();

        let mut buffer = Buffer::new(fs, metrics);
        buffer.set_size(fs, None, None);
        buffer.set_text(
            fs,
            text,
            resolved.descriptor.attrs(&resolved.family),
            Shaping::Advanced,
        );
        buffer.shape_until_scroll(fs, false);
        buffer
    }
}

impl Default for CosmicMeasurer {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for CosmicMeasurer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CosmicMeasurer")
            .field("font_system", &self.font_system)
            .field("resolved_fonts", &self.resolved.len())
            .finish()
    }
}

impl GlyphMeasurer for CosmicMeasurer {
    fn advance_width(&mut self, font: &str, text: &str) -> MeasureResult<f32> {
        let resolved = self.resolve(font)?;
        if text.is_empty() || resolved.descriptor.size_px <= 0.0 {
            return Ok(0.0);
        }

        let buffer = self.shape(&resolved, text);
        Ok(buffer
            .layout_runs()
            .map(|run| run.line_w)
            .fold(0.0, f32::max))
    }

    fn rasterize(
        &mut self,
        font: &str,
        text: &str,
        width: u32,
        height: u32,
        baseline: u32,
    ) -> MeasureResult<CoverageGrid> {
        let resolved = self.resolve(font)?;
        let mut grid = CoverageGrid::new(width, height);
        if text.is_empty() || resolved.descriptor.size_px <= 0.0 {
            return Ok(grid);
        }

        let buffer = self.shape(&resolved, text);
        let mut missing = 0usize;

        for run in buffer.layout_runs() {
            for glyph in run.glyphs.iter() {
                let physical = glyph.physical((0.0, baseline as f32), 1.0);
                let image = self
                    .swash_cache
                    .get_image(self.font_system.inner_mut(), physical.cache_key);

                match image {
                    Some(img) if img.placement.width > 0 && img.placement.height > 0 => {
                        let mask = coverage_mask(img.content, &img.data);
                        grid.blit(
                            physical.x + img.placement.left,
                            physical.y - img.placement.top,
                            img.placement.width,
                            img.placement.height,
                            &mask,
                        );
                    }
                    Some(_) => {}
                    None => missing += 1,
                }
            }
        }

        if missing > 0 {
            warn!(
                target: targets::COSMIC,
                font,
                missing,
                "glyphs could not be rasterized"
            );
        }

        Ok(grid)
    }
}

/// Reduce swash image data to one coverage byte per pixel.
fn coverage_mask(content: SwashContent, data: &[u8]) -> Vec<u8> {
    match content {
        SwashContent::Mask => data.to_vec(),
        SwashContent::SubpixelMask => data
            .chunks_exact(4)
            .map(|px| ((px[0] as u16 + px[1] as u16 + px[2] as u16) / 3) as u8)
            .collect(),
        SwashContent::Color => data.chunks_exact(4).map(|px| px[3]).collect(),
    }
}
