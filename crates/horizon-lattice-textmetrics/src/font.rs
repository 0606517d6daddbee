//! Parsing font strings back into their parts.
//!
//! Glyph backends receive the font string produced by
//! [`TextStyle::to_font_string`](crate::TextStyle::to_font_string) and need
//! the structured pieces to query a font database.

use std::str::FromStr;

use crate::error::{MeasureError, MeasureResult};
use crate::types::{FontFamily, FontStyle, FontVariant, FontWeight};

/// Pixels per CSS point.
const PX_PER_PT: f32 = 4.0 / 3.0;
/// Root font size assumed for `em`, `rem` and percentages.
const ROOT_FONT_PX: f32 = 16.0;

/// A parsed font string.
#[derive(Debug, Clone, PartialEq)]
pub struct FontDescriptor {
    /// Font style.
    pub style: FontStyle,
    /// Font variant.
    pub variant: FontVariant,
    /// Font weight.
    pub weight: FontWeight,
    /// Font size in pixels.
    pub size_px: f32,
    /// Families in preference order.
    pub families: Vec<FontFamily>,
}

impl FontDescriptor {
    /// Parse a CSS-like font shorthand.
    ///
    /// Accepts any order of style, variant and weight keywords, then a size
    /// (optionally followed by `/line-height`, which is ignored), then a
    /// comma-separated family list.
    pub fn parse(font: &str) -> MeasureResult<Self> {
        let mut descriptor = Self {
            style: FontStyle::Normal,
            variant: FontVariant::Normal,
            weight: FontWeight::NORMAL,
            size_px: 0.0,
            families: Vec::new(),
        };

        let mut rest = font.trim_start();
        loop {
            let (word, tail) = rest
                .split_once(char::is_whitespace)
                .unwrap_or((rest, ""));
            if word.is_empty() {
                return Err(MeasureError::invalid_font(font, "missing font size"));
            }
            rest = tail.trim_start();

            if word == "normal" {
                continue;
            }
            if let Ok(style) = FontStyle::from_str(word) {
                descriptor.style = style;
            } else if let Ok(variant) = FontVariant::from_str(word) {
                descriptor.variant = variant;
            } else if let Ok(weight) = FontWeight::from_str(word) {
                descriptor.weight = weight;
            } else {
                let size = word.split('/').next().unwrap_or(word);
                descriptor.size_px = css_length_to_px(size).ok_or_else(|| {
                    MeasureError::invalid_font(font, format!("unrecognized token `{word}`"))
                })?;
                break;
            }
        }

        descriptor.families = split_families(rest)
            .into_iter()
            .map(FontFamily::from_css)
            .collect();
        if descriptor.families.is_empty() {
            return Err(MeasureError::invalid_font(font, "missing font family"));
        }

        Ok(descriptor)
    }

    /// Build cosmic-text attributes for `family`, carrying this descriptor's
    /// style and weight.
    #[cfg(feature = "cosmic")]
    pub fn attrs<'a>(&self, family: &'a FontFamily) -> cosmic_text::Attrs<'a> {
        cosmic_text::Attrs::new()
            .family(family.to_cosmic())
            .style(self.style.to_cosmic())
            .weight(self.weight.to_cosmic())
    }
}

impl FromStr for FontDescriptor {
    type Err = MeasureError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Convert a CSS length to pixels.
///
/// Supports `px`, `pt`, `em`, `rem` and `%`; a bare number is taken as
/// pixels. Returns `None` for anything else or for negative sizes.
pub fn css_length_to_px(value: &str) -> Option<f32> {
    let value = value.trim();
    let split = value
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(value.len());
    let (number, unit) = value.split_at(split);
    let number: f32 = number.parse().ok()?;

    let px = match unit {
        "" | "px" => number,
        "pt" => number * PX_PER_PT,
        "em" | "rem" => number * ROOT_FONT_PX,
        "%" => number * ROOT_FONT_PX / 100.0,
        _ => return None,
    };
    (px >= 0.0).then_some(px)
}

/// Split a family list on commas outside quotes.
fn split_families(list: &str) -> Vec<&str> {
    let mut families = Vec::new();
    let mut quote = None;
    let mut start = 0;

    for (offset, c) in list.char_indices() {
        match (quote, c) {
            (None, '"' | '\'') => quote = Some(c),
            (Some(open), _) if c == open => quote = None,
            (None, ',') => {
                families.push(&list[start..offset]);
                start = offset + 1;
            }
            _ => {}
        }
    }
    families.push(&list[start..]);

    families
        .into_iter()
        .map(str::trim)
        .filter(|family| !family.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::TextStyle;
    use crate::types::FontSize;

    #[test]
    fn test_parses_generated_font_string() {
        let style = TextStyle::builder()
            .font_family("Open Sans, monospace")
            .font_size(18.0)
            .font_style(FontStyle::Italic)
            .font_weight(FontWeight::BOLD)
            .build();
        let descriptor = FontDescriptor::parse(&style.to_font_string()).unwrap();

        assert_eq!(descriptor.style, FontStyle::Italic);
        assert_eq!(descriptor.variant, FontVariant::Normal);
        assert_eq!(descriptor.weight, FontWeight::BOLD);
        assert_eq!(descriptor.size_px, 18.0);
        assert_eq!(
            descriptor.families,
            vec![FontFamily::name("Open Sans"), FontFamily::Monospace]
        );
    }

    #[test]
    fn test_quoted_commas_stay_in_family() {
        let descriptor = FontDescriptor::parse("16px 'Noto, Color', serif").unwrap();
        assert_eq!(
            descriptor.families,
            vec![FontFamily::name("Noto, Color"), FontFamily::Serif]
        );
    }

    #[test]
    fn test_numeric_weight_and_small_caps() {
        let descriptor = FontDescriptor::parse("small-caps 300 12pt/1.5 serif").unwrap();
        assert_eq!(descriptor.variant, FontVariant::SmallCaps);
        assert_eq!(descriptor.weight, FontWeight::LIGHT);
        assert_eq!(descriptor.size_px, 16.0);
    }

    #[test]
    fn test_css_units() {
        assert_eq!(css_length_to_px("20px"), Some(20.0));
        assert_eq!(css_length_to_px("1.5em"), Some(24.0));
        assert_eq!(css_length_to_px("2rem"), Some(32.0));
        assert_eq!(css_length_to_px("150%"), Some(24.0));
        assert_eq!(css_length_to_px("9pt"), Some(12.0));
        assert_eq!(css_length_to_px("12vw"), None);
        assert_eq!(css_length_to_px("px"), None);
    }

    #[test]
    fn test_rejects_incomplete_strings() {
        assert!(matches!(
            FontDescriptor::parse("bold Arial"),
            Err(MeasureError::InvalidFontString { .. })
        ));
        assert!(FontDescriptor::parse("normal normal 12px").is_err());
        assert!(FontDescriptor::parse("").is_err());
    }

    #[test]
    fn test_css_font_size_passes_through() {
        let style = TextStyle::builder()
            .font_size(FontSize::Css("2em".into()))
            .build();
        let descriptor: FontDescriptor = style.to_font_string().parse().unwrap();
        assert_eq!(descriptor.size_px, 32.0);
        assert_eq!(descriptor.families, vec![FontFamily::name("Arial")]);
    }
}
