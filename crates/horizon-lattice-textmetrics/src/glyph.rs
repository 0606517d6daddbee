//! The glyph-measurement primitive consumed by the layout engine.
//!
//! Layout never rasterizes text itself. It asks a [`GlyphMeasurer`] for two
//! things: the advance width of a run, and a coverage bitmap of a run drawn
//! at a known baseline. Implementations must be deterministic for identical
//! inputs on a given host; results may legitimately differ between hosts
//! with different fonts installed.

use std::collections::HashMap;

use crate::error::MeasureResult;

/// A source of advance widths and rasterized coverage for font strings.
pub trait GlyphMeasurer {
    /// Horizontal advance of `text` rendered with `font`, in pixels.
    fn advance_width(&mut self, font: &str, text: &str) -> MeasureResult<f32>;

    /// Rasterize `text` with `font` into a `width × height` coverage grid,
    /// with the alphabetic baseline on row `baseline` and the pen starting
    /// at column 0.
    fn rasterize(
        &mut self,
        font: &str,
        text: &str,
        width: u32,
        height: u32,
        baseline: u32,
    ) -> MeasureResult<CoverageGrid>;
}

impl<M: GlyphMeasurer + ?Sized> GlyphMeasurer for &mut M {
    fn advance_width(&mut self, font: &str, text: &str) -> MeasureResult<f32> {
        (**self).advance_width(font, text)
    }

    fn rasterize(
        &mut self,
        font: &str,
        text: &str,
        width: u32,
        height: u32,
        baseline: u32,
    ) -> MeasureResult<CoverageGrid> {
        (**self).rasterize(font, text, width, height, baseline)
    }
}

impl<M: GlyphMeasurer + ?Sized> GlyphMeasurer for Box<M> {
    fn advance_width(&mut self, font: &str, text: &str) -> MeasureResult<f32> {
        (**self).advance_width(font, text)
    }

    fn rasterize(
        &mut self,
        font: &str,
        text: &str,
        width: u32,
        height: u32,
        baseline: u32,
    ) -> MeasureResult<CoverageGrid> {
        (**self).rasterize(font, text, width, height, baseline)
    }
}

/// Row-major 8-bit coverage (0 = background, 255 = fully inked).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoverageGrid {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl CoverageGrid {
    /// Create a blank grid.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![0; width as usize * height as usize],
        }
    }

    /// Grid width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Grid height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Coverage at `(x, y)`, or 0 outside the grid.
    pub fn get(&self, x: u32, y: u32) -> u8 {
        if x >= self.width || y >= self.height {
            return 0;
        }
        self.data[y as usize * self.width as usize + x as usize]
    }

    /// Raise the coverage at `(x, y)` to at least `coverage`.
    ///
    /// Coordinates outside the grid are ignored so callers can blit glyphs
    /// that hang over the edges.
    pub fn accumulate(&mut self, x: i32, y: i32, coverage: u8) {
        if x < 0 || y < 0 || x as u32 >= self.width || y as u32 >= self.height {
            return;
        }
        let idx = y as usize * self.width as usize + x as usize;
        self.data[idx] = self.data[idx].max(coverage);
    }

    /// Blit a `mask_width × mask_height` coverage mask with its top-left at `(x, y)`.
    pub fn blit(&mut self, x: i32, y: i32, mask_width: u32, mask_height: u32, mask: &[u8]) {
        for row in 0..mask_height {
            for col in 0..mask_width {
                let coverage = mask
                    .get(row as usize * mask_width as usize + col as usize)
                    .copied()
                    .unwrap_or(0);
                if coverage > 0 {
                    self.accumulate(x + col as i32, y + row as i32, coverage);
                }
            }
        }
    }

    /// The coverage values of row `y`.
    pub fn row(&self, y: u32) -> &[u8] {
        if y >= self.height {
            return &[];
        }
        let start = y as usize * self.width as usize;
        &self.data[start..start + self.width as usize]
    }

    /// Whether any pixel in row `y` has coverage above `threshold`.
    pub fn row_is_inked(&self, y: u32, threshold: u8) -> bool {
        self.row(y).iter().any(|&coverage| coverage > threshold)
    }
}

/// A deterministic measurer with fixed per-character advances.
///
/// Every character advances by `char_width` unless overridden, and
/// rasterization paints a solid box per non-space character spanning
/// `ascent` rows above and `descent` rows below the baseline. Useful for
/// headless layout and for tests; call counters expose how often each
/// primitive was hit.
#[derive(Debug, Clone)]
pub struct FixedAdvanceMeasurer {
    char_width: f32,
    overrides: HashMap<char, f32>,
    ascent: u32,
    descent: u32,
    advance_calls: usize,
    rasterize_calls: usize,
}

impl FixedAdvanceMeasurer {
    /// Create a measurer where every character is `char_width` pixels wide.
    ///
    /// The probe box defaults to an ascent of `char_width` and a descent of a
    /// quarter of that.
    pub fn new(char_width: f32) -> Self {
        let ascent = char_width.max(0.0).round() as u32;
        Self {
            char_width,
            overrides: HashMap::new(),
            ascent,
            descent: ascent / 4,
            advance_calls: 0,
            rasterize_calls: 0,
        }
    }

    /// Override the advance of a single character.
    pub fn with_char_width(mut self, c: char, width: f32) -> Self {
        self.overrides.insert(c, width);
        self
    }

    /// Set the painted extents above and below the baseline.
    pub fn with_extents(mut self, ascent: u32, descent: u32) -> Self {
        self.ascent = ascent;
        self.descent = descent;
        self
    }

    /// Advance of a single character.
    pub fn char_advance(&self, c: char) -> f32 {
        self.overrides.get(&c).copied().unwrap_or(self.char_width)
    }

    /// Number of `advance_width` calls so far.
    pub fn advance_calls(&self) -> usize {
        self.advance_calls
    }

    /// Number of `rasterize` calls so far.
    pub fn rasterize_calls(&self) -> usize {
        self.rasterize_calls
    }
}

impl GlyphMeasurer for FixedAdvanceMeasurer {
    fn advance_width(&mut self, _font: &str, text: &str) -> MeasureResult<f32> {
        self.advance_calls += 1;
        Ok(text.chars().map(|c| self.char_advance(c)).sum())
    }

    fn rasterize(
        &mut self,
        _font: &str,
        text: &str,
        width: u32,
        height: u32,
        baseline: u32,
    ) -> MeasureResult<CoverageGrid> {
        self.rasterize_calls += 1;

        let mut grid = CoverageGrid::new(width, height);
        let top = baseline as i32 - self.ascent as i32;
        let bottom = baseline as i32 + self.descent as i32;
        let mut pen = 0.0f32;

        for c in text.chars() {
            let advance = self.char_advance(c);
            if !c.is_whitespace() {
                let left = pen.floor() as i32;
                let right = (pen + advance).ceil() as i32;
                for y in top..bottom {
                    for x in left..right {
                        grid.accumulate(x, y, u8::MAX);
                    }
                }
            }
            pen += advance;
        }

        Ok(grid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_clips_out_of_bounds_writes() {
        let mut grid = CoverageGrid::new(3, 2);
        grid.accumulate(-1, 0, 255);
        grid.accumulate(3, 1, 255);
        grid.accumulate(1, 1, 128);
        grid.accumulate(1, 1, 64);

        assert_eq!(grid.get(1, 1), 128);
        assert_eq!(grid.row(0), &[0, 0, 0]);
        assert!(grid.row_is_inked(1, 0));
        assert!(!grid.row_is_inked(1, 128));
        assert!(grid.row(5).is_empty());
    }

    #[test]
    fn test_blit_places_mask() {
        let mut grid = CoverageGrid::new(4, 4);
        grid.blit(2, 1, 2, 2, &[10, 20, 30, 40]);

        assert_eq!(grid.row(1), &[0, 0, 10, 20]);
        assert_eq!(grid.row(2), &[0, 0, 30, 40]);
        assert_eq!(grid.get(3, 3), 0);
    }

    #[test]
    fn test_fixed_advances_with_overrides() {
        let mut measurer = FixedAdvanceMeasurer::new(10.0).with_char_width(' ', 4.0);
        assert_eq!(measurer.advance_width("16px x", "ab c").unwrap(), 34.0);
        assert_eq!(measurer.advance_calls(), 1);
    }

    #[test]
    fn test_fixed_rasterize_paints_extents() {
        let mut measurer = FixedAdvanceMeasurer::new(2.0).with_extents(3, 1);
        let grid = measurer.rasterize("font", "a b", 6, 8, 5).unwrap();

        assert!(!grid.row_is_inked(1, 0));
        assert!(grid.row_is_inked(2, 0));
        assert!(grid.row_is_inked(5, 0));
        assert!(!grid.row_is_inked(6, 0));
        assert_eq!(grid.row(3), &[255, 255, 0, 0, 255, 255]);
        assert_eq!(measurer.rasterize_calls(), 1);
    }
}
