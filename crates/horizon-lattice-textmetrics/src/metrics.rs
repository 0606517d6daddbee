//! Line and bounding-box measurement.

use serde::Serialize;
use tracing::trace;

use crate::error::MeasureResult;
use crate::glyph::GlyphMeasurer;
use crate::probe::{FontProbe, FontProperties};
use crate::style::TextStyle;
use crate::targets;
use crate::tokenizer::split_lines;
use crate::wrap::{BreakPolicy, WordWrapper};

/// The measured layout of a run of text.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextMetrics {
    /// The text that was measured.
    pub text: String,
    /// The style it was measured with.
    pub style: TextStyle,
    /// Bounding width including stroke and drop shadow.
    pub width: f32,
    /// Bounding height including stroke and drop shadow.
    pub height: f32,
    /// Lines after wrapping and splitting on line breaks.
    pub lines: Vec<String>,
    /// Width of each entry in `lines`.
    pub line_widths: Vec<f32>,
    /// Distance between consecutive baselines, leading included.
    pub line_height: f32,
    /// Largest entry of `line_widths`.
    pub max_line_width: f32,
    /// Probed metrics of the style's font.
    pub font_properties: FontProperties,
}

/// Measures text with a glyph measurer and a font probe.
#[derive(Debug)]
pub struct TextMeasurer<M> {
    measurer: M,
    probe: FontProbe,
}

impl<M: GlyphMeasurer> TextMeasurer<M> {
    /// Create a measurer using the process-wide font metrics cache.
    pub fn new(measurer: M) -> Self {
        Self {
            measurer,
            probe: FontProbe::default(),
        }
    }

    /// Use a specific font probe (and with it, its cache).
    pub fn with_probe(mut self, probe: FontProbe) -> Self {
        self.probe = probe;
        self
    }

    /// The underlying glyph measurer.
    pub fn measurer(&self) -> &M {
        &self.measurer
    }

    /// Mutable access to the underlying glyph measurer.
    pub fn measurer_mut(&mut self) -> &mut M {
        &mut self.measurer
    }

    /// The font probe.
    pub fn probe(&self) -> &FontProbe {
        &self.probe
    }

    /// Consume the measurer, returning the glyph measurer.
    pub fn into_inner(self) -> M {
        self.measurer
    }

    /// Measure `text` under `style`.
    ///
    /// Text is wrapped when `force_wrap` or `style.word_wrap` is set.
    pub fn measure(
        &mut self,
        text: &str,
        style: &TextStyle,
        force_wrap: bool,
    ) -> MeasureResult<TextMetrics> {
        self.measure_inner(text, style, force_wrap, None)
    }

    /// Like [`measure`](Self::measure), splitting oversized words with `policy`.
    pub fn measure_with_policy(
        &mut self,
        text: &str,
        style: &TextStyle,
        force_wrap: bool,
        policy: &dyn BreakPolicy,
    ) -> MeasureResult<TextMetrics> {
        self.measure_inner(text, style, force_wrap, Some(policy))
    }

    fn measure_inner(
        &mut self,
        text: &str,
        style: &TextStyle,
        force_wrap: bool,
        policy: Option<&dyn BreakPolicy>,
    ) -> MeasureResult<TextMetrics> {
        let font = style.to_font_string();
        let font_properties = self.probe.measure_font(&mut self.measurer, &font)?;

        let wrapped;
        let output = if force_wrap || style.word_wrap {
            let mut wrapper = WordWrapper::new(&mut self.measurer);
            if let Some(policy) = policy {
                wrapper = wrapper.with_policy(policy);
            }
            wrapped = wrapper.wrap(text, style)?;
            wrapped.as_str()
        } else {
            text
        };

        let lines = split_lines(output);
        let mut line_widths = Vec::with_capacity(lines.len());
        let mut max_line_width = 0.0f32;

        for line in &lines {
            let gaps = line.chars().count().saturating_sub(1) as f32;
            let line_width =
                self.measurer.advance_width(&font, line)? + gaps * style.letter_spacing;
            max_line_width = max_line_width.max(line_width);
            line_widths.push(line_width);
        }

        let font_size = font_properties.font_size as f32;
        let shadow = if style.drop_shadow {
            style.drop_shadow_distance
        } else {
            0.0
        };

        let width = max_line_width + style.stroke_thickness + shadow;

        let line_height = if style.line_height != 0.0 {
            style.line_height
        } else {
            font_size + style.stroke_thickness
        };
        let height = line_height.max(font_size + style.stroke_thickness)
            + (lines.len() - 1) as f32 * (line_height + style.leading)
            + shadow;

        trace!(
            target: targets::METRICS,
            font = %font,
            lines = lines.len(),
            width,
            height,
            "measured text"
        );

        Ok(TextMetrics {
            text: text.to_string(),
            style: style.clone(),
            width,
            height,
            lines: lines.into_iter().map(str::to_string).collect(),
            line_widths,
            line_height: line_height + style.leading,
            max_line_width,
            font_properties,
        })
    }
}
