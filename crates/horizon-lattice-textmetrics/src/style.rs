//! Text style records and font string normalization.
//!
//! A [`TextStyle`] is an immutable value for the duration of a measurement.
//! It is built once, either through [`TextStyleBuilder`] or by deserializing a
//! partial record (missing fields take the defaults), and then only read.
//!
//! # Example
//!
//! ```
//! use horizon_lattice_textmetrics::{FontWeight, TextStyle, WhiteSpace};
//!
//! let style = TextStyle::builder()
//!     .font_family("Helvetica Neue, sans-serif")
//!     .font_size(16.0)
//!     .font_weight(FontWeight::BOLD)
//!     .white_space(WhiteSpace::Normal)
//!     .word_wrap(true)
//!     .word_wrap_width(240.0)
//!     .build();
//!
//! assert_eq!(
//!     style.to_font_string(),
//!     "normal normal bold 16px \"Helvetica Neue\",sans-serif"
//! );
//! ```

use serde::{Deserialize, Deserializer, Serialize};

use crate::types::{FontSize, FontStyle, FontVariant, FontWeight, GENERIC_FAMILIES, WhiteSpace};

/// Font and paragraph formatting options for one measurement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextStyle {
    /// Font family names in preference order.
    #[serde(deserialize_with = "deserialize_family_list")]
    pub font_family: Vec<String>,
    /// Font size.
    pub font_size: FontSize,
    /// Font style.
    pub font_style: FontStyle,
    /// Font variant.
    pub font_variant: FontVariant,
    /// Font weight.
    pub font_weight: FontWeight,
    /// Pixels added between adjacent characters.
    pub letter_spacing: f32,
    /// Line height in pixels; `0` derives it from the probed font size.
    pub line_height: f32,
    /// Extra spacing between lines in pixels.
    pub leading: f32,
    /// Whitespace collapsing mode.
    pub white_space: WhiteSpace,
    /// Whether to wrap text at `word_wrap_width`.
    pub word_wrap: bool,
    /// Wrap width in pixels.
    pub word_wrap_width: f32,
    /// Whether words wider than the wrap width may be broken between characters.
    pub break_words: bool,
    /// Stroke thickness, added to the measured width and height.
    pub stroke_thickness: f32,
    /// Whether a drop shadow is drawn.
    pub drop_shadow: bool,
    /// Drop shadow offset, added to width and height when `drop_shadow` is set.
    pub drop_shadow_distance: f32,
    /// Reserved; not used by layout.
    pub padding: f32,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            font_family: vec!["Arial".to_string()],
            font_size: FontSize::Px(20.0),
            font_style: FontStyle::Normal,
            font_variant: FontVariant::Normal,
            font_weight: FontWeight::NORMAL,
            letter_spacing: 0.0,
            line_height: 0.0,
            leading: 0.0,
            white_space: WhiteSpace::Pre,
            word_wrap: false,
            word_wrap_width: 100.0,
            break_words: false,
            stroke_thickness: 0.0,
            drop_shadow: false,
            drop_shadow_distance: 5.0,
            padding: 0.0,
        }
    }
}

impl TextStyle {
    /// Create a style builder starting from the defaults.
    pub fn builder() -> TextStyleBuilder {
        TextStyleBuilder::new()
    }

    /// Create a builder seeded with a copy of this style.
    pub fn to_builder(&self) -> TextStyleBuilder {
        TextStyleBuilder {
            style: self.clone(),
        }
    }

    /// Build the font description string consumed by glyph measurers.
    ///
    /// The format is `"{style} {variant} {weight} {size} {families}"`, with
    /// each family quoted unless it is already quoted or a generic keyword.
    pub fn to_font_string(&self) -> String {
        let families = self
            .font_family
            .iter()
            .map(|family| quote_family(family))
            .collect::<Vec<_>>()
            .join(",");

        format!(
            "{} {} {} {} {}",
            self.font_style, self.font_variant, self.font_weight, self.font_size, families
        )
    }
}

/// Quote a single family name for a font string.
fn quote_family(family: &str) -> String {
    let family = family.trim();
    if is_fully_quoted(family) || GENERIC_FAMILIES.contains(&family) {
        family.to_string()
    } else {
        format!("\"{family}\"")
    }
}

fn is_fully_quoted(s: &str) -> bool {
    crate::types::unquote(s).is_some()
}

/// Split a comma-joined family list into trimmed entries.
fn split_family_list(list: &str) -> Vec<String> {
    list.split(',').map(|family| family.trim().to_string()).collect()
}

fn deserialize_family_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum FamilyList {
        Joined(String),
        Entries(Vec<String>),
    }

    Ok(match FamilyList::deserialize(deserializer)? {
        FamilyList::Joined(list) => split_family_list(&list),
        FamilyList::Entries(entries) => entries,
    })
}

/// Builder for [`TextStyle`].
#[derive(Debug, Clone, Default)]
pub struct TextStyleBuilder {
    style: TextStyle,
}

impl TextStyleBuilder {
    /// Create a new builder with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the font family from a comma-joined list.
    pub fn font_family(mut self, families: &str) -> Self {
        self.style.font_family = split_family_list(families);
        self
    }

    /// Set the font families from individual entries.
    pub fn font_families<I, S>(mut self, families: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.style.font_family = families.into_iter().map(Into::into).collect();
        self
    }

    /// Set the font size (pixels, or a CSS length string).
    pub fn font_size(mut self, size: impl Into<FontSize>) -> Self {
        self.style.font_size = size.into();
        self
    }

    /// Set the font style.
    pub fn font_style(mut self, style: FontStyle) -> Self {
        self.style.font_style = style;
        self
    }

    /// Set the font variant.
    pub fn font_variant(mut self, variant: FontVariant) -> Self {
        self.style.font_variant = variant;
        self
    }

    /// Set the font weight.
    pub fn font_weight(mut self, weight: FontWeight) -> Self {
        self.style.font_weight = weight;
        self
    }

    /// Set the letter spacing in pixels.
    pub fn letter_spacing(mut self, spacing: f32) -> Self {
        self.style.letter_spacing = spacing;
        self
    }

    /// Set an explicit line height in pixels.
    pub fn line_height(mut self, height: f32) -> Self {
        self.style.line_height = height;
        self
    }

    /// Set the extra spacing between lines.
    pub fn leading(mut self, leading: f32) -> Self {
        self.style.leading = leading;
        self
    }

    /// Set the whitespace mode.
    pub fn white_space(mut self, white_space: WhiteSpace) -> Self {
        self.style.white_space = white_space;
        self
    }

    /// Enable or disable word wrapping.
    pub fn word_wrap(mut self, wrap: bool) -> Self {
        self.style.word_wrap = wrap;
        self
    }

    /// Set the wrap width in pixels.
    pub fn word_wrap_width(mut self, width: f32) -> Self {
        self.style.word_wrap_width = width;
        self
    }

    /// Allow breaking words that are wider than the wrap width.
    pub fn break_words(mut self, break_words: bool) -> Self {
        self.style.break_words = break_words;
        self
    }

    /// Set the stroke thickness.
    pub fn stroke_thickness(mut self, thickness: f32) -> Self {
        self.style.stroke_thickness = thickness;
        self
    }

    /// Enable a drop shadow at the given distance.
    pub fn drop_shadow(mut self, distance: f32) -> Self {
        self.style.drop_shadow = true;
        self.style.drop_shadow_distance = distance;
        self
    }

    /// Set the reserved padding value.
    pub fn padding(mut self, padding: f32) -> Self {
        self.style.padding = padding;
        self
    }

    /// Finish building the style.
    pub fn build(self) -> TextStyle {
        self.style
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_font_string() {
        assert_eq!(
            TextStyle::default().to_font_string(),
            "normal normal normal 20px \"Arial\""
        );
    }

    #[test]
    fn test_generic_and_quoted_families_are_kept() {
        let style = TextStyle::builder()
            .font_family("'Fira Code', monospace,  Menlo ,\"Source Code Pro\"")
            .font_size("12pt")
            .font_style(FontStyle::Italic)
            .font_variant(FontVariant::SmallCaps)
            .font_weight(FontWeight::new(300))
            .build();

        assert_eq!(
            style.to_font_string(),
            "italic small-caps 300 12pt 'Fira Code',monospace,\"Menlo\",\"Source Code Pro\""
        );
    }

    #[test]
    fn test_unbalanced_quotes_are_wrapped() {
        let style = TextStyle::builder().font_family("\"Arial'").build();
        assert!(style.to_font_string().ends_with("\"\"Arial'\""));
    }

    #[test]
    fn test_deserialize_merges_defaults() {
        let style: TextStyle = serde_json::from_str(
            r#"{"font_family": "Inter, system-ui", "font_size": 14, "white_space": "pre-line", "font_weight": "bold"}"#,
        )
        .unwrap();

        assert_eq!(style.font_family, vec!["Inter", "system-ui"]);
        assert_eq!(style.font_size, FontSize::Px(14.0));
        assert_eq!(style.white_space, WhiteSpace::PreLine);
        assert_eq!(style.font_weight, FontWeight::BOLD);
        assert_eq!(style.drop_shadow_distance, 5.0);
        assert_eq!(style.word_wrap_width, 100.0);
    }

    #[test]
    fn test_builder_round_trips_through_to_builder() {
        let style = TextStyle::builder().letter_spacing(2.0).drop_shadow(3.0).build();
        let derived = style.to_builder().leading(4.0).build();

        assert_eq!(derived.letter_spacing, 2.0);
        assert!(derived.drop_shadow);
        assert_eq!(derived.drop_shadow_distance, 3.0);
        assert_eq!(derived.leading, 4.0);
        assert_eq!(style.leading, 0.0);
    }
}
