//! Font and paragraph formatting enumerations.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Font weight, typically ranging from 100 (thin) to 900 (black).
///
/// Rendered into font strings with the CSS keywords `normal` (400) and
/// `bold` (700) and as a bare number otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "FontWeightRepr", into = "u16")]
pub struct FontWeight(pub u16);

impl FontWeight {
    /// Thin weight (100).
    pub const THIN: Self = Self(100);
    /// Light weight (300).
    pub const LIGHT: Self = Self(300);
    /// Normal/regular weight (400).
    pub const NORMAL: Self = Self(400);
    /// Medium weight (500).
    pub const MEDIUM: Self = Self(500);
    /// Semi-bold weight (600).
    pub const SEMI_BOLD: Self = Self(600);
    /// Bold weight (700).
    pub const BOLD: Self = Self(700);
    /// Black/heavy weight (900).
    pub const BLACK: Self = Self(900);

    /// Create a font weight from a numeric value (100-900).
    pub fn new(weight: u16) -> Self {
        Self(weight.clamp(100, 900))
    }

    /// Get the numeric weight value.
    pub const fn value(self) -> u16 {
        self.0
    }

    /// Convert to cosmic-text Weight.
    #[cfg(feature = "cosmic")]
    pub fn to_cosmic(self) -> cosmic_text::Weight {
        cosmic_text::Weight(self.0)
    }
}

impl Default for FontWeight {
    fn default() -> Self {
        Self::NORMAL
    }
}

impl From<u16> for FontWeight {
    fn from(value: u16) -> Self {
        Self::new(value)
    }
}

impl From<FontWeight> for u16 {
    fn from(weight: FontWeight) -> Self {
        weight.0
    }
}

impl fmt::Display for FontWeight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::NORMAL => f.write_str("normal"),
            Self::BOLD => f.write_str("bold"),
            Self(value) => write!(f, "{value}"),
        }
    }
}

impl FromStr for FontWeight {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "normal" => Ok(Self::NORMAL),
            "bold" => Ok(Self::BOLD),
            other => other
                .parse::<u16>()
                .map(Self::new)
                .map_err(|_| format!("unknown font weight `{other}`")),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum FontWeightRepr {
    Number(u16),
    Keyword(String),
}

impl TryFrom<FontWeightRepr> for FontWeight {
    type Error = String;

    fn try_from(repr: FontWeightRepr) -> Result<Self, Self::Error> {
        match repr {
            FontWeightRepr::Number(value) => Ok(Self::new(value)),
            FontWeightRepr::Keyword(keyword) => keyword.parse(),
        }
    }
}

/// Font style (normal, italic, or oblique).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontStyle {
    /// Normal upright style.
    #[default]
    Normal,
    /// Italic style (designed italic glyphs).
    Italic,
    /// Oblique style (slanted normal glyphs).
    Oblique,
}

impl FontStyle {
    /// The CSS keyword for this style.
    pub const fn as_str(self) -> &'static str {
        match self {
            FontStyle::Normal => "normal",
            FontStyle::Italic => "italic",
            FontStyle::Oblique => "oblique",
        }
    }

    /// Convert to cosmic-text Style.
    #[cfg(feature = "cosmic")]
    pub fn to_cosmic(self) -> cosmic_text::Style {
        match self {
            FontStyle::Normal => cosmic_text::Style::Normal,
            FontStyle::Italic => cosmic_text::Style::Italic,
            FontStyle::Oblique => cosmic_text::Style::Oblique,
        }
    }
}

impl fmt::Display for FontStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FontStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "normal" => Ok(FontStyle::Normal),
            "italic" => Ok(FontStyle::Italic),
            "oblique" => Ok(FontStyle::Oblique),
            other => Err(format!("unknown font style `{other}`")),
        }
    }
}

/// Font variant (normal or small caps).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FontVariant {
    /// No variant.
    #[default]
    Normal,
    /// Small capitals.
    SmallCaps,
}

impl FontVariant {
    /// The CSS keyword for this variant.
    pub const fn as_str(self) -> &'static str {
        match self {
            FontVariant::Normal => "normal",
            FontVariant::SmallCaps => "small-caps",
        }
    }
}

impl fmt::Display for FontVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FontVariant {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "normal" => Ok(FontVariant::Normal),
            "small-caps" => Ok(FontVariant::SmallCaps),
            other => Err(format!("unknown font variant `{other}`")),
        }
    }
}

/// Whitespace handling mode, mirroring the CSS `white-space` values the
/// word wrapper understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WhiteSpace {
    /// Collapse breaking spaces and turn newlines into spaces.
    Normal,
    /// Preserve spaces and newlines.
    #[default]
    Pre,
    /// Collapse breaking spaces but keep newlines.
    PreLine,
}

impl WhiteSpace {
    /// Whether runs of breaking spaces collapse into one.
    pub const fn collapse_spaces(self) -> bool {
        matches!(self, WhiteSpace::Normal | WhiteSpace::PreLine)
    }

    /// Whether newlines are treated as plain breaking spaces.
    pub const fn collapse_newlines(self) -> bool {
        matches!(self, WhiteSpace::Normal)
    }
}

impl FromStr for WhiteSpace {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "normal" => Ok(WhiteSpace::Normal),
            "pre" => Ok(WhiteSpace::Pre),
            "pre-line" => Ok(WhiteSpace::PreLine),
            other => Err(format!("unknown white-space mode `{other}`")),
        }
    }
}

/// A font size, either in pixels or as a pre-formatted CSS length.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FontSize {
    /// Size in pixels, rendered as `"{n}px"`.
    Px(f32),
    /// A CSS length such as `"12pt"` or `"1.5em"`, passed through unchanged.
    Css(String),
}

impl Default for FontSize {
    fn default() -> Self {
        FontSize::Px(20.0)
    }
}

impl From<f32> for FontSize {
    fn from(px: f32) -> Self {
        FontSize::Px(px)
    }
}

impl From<&str> for FontSize {
    fn from(css: &str) -> Self {
        FontSize::Css(css.to_string())
    }
}

impl From<String> for FontSize {
    fn from(css: String) -> Self {
        FontSize::Css(css)
    }
}

impl fmt::Display for FontSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FontSize::Px(px) => write!(f, "{px}px"),
            FontSize::Css(css) => f.write_str(css),
        }
    }
}

/// Generic family keywords recognized in font strings.
pub const GENERIC_FAMILIES: [&str; 6] = [
    "serif",
    "sans-serif",
    "monospace",
    "cursive",
    "fantasy",
    "system-ui",
];

/// A font family, named or generic.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FontFamily {
    /// A specific font family by name.
    Name(String),
    /// Generic serif family.
    Serif,
    /// Generic sans-serif family.
    SansSerif,
    /// Generic monospace family.
    Monospace,
    /// Generic cursive family.
    Cursive,
    /// Generic fantasy family.
    Fantasy,
    /// The platform UI family.
    SystemUi,
}

impl FontFamily {
    /// Create a named font family.
    pub fn name(name: impl Into<String>) -> Self {
        Self::Name(name.into())
    }

    /// Interpret one entry of a CSS family list.
    ///
    /// Quoted entries are always names; bare entries matching a generic
    /// keyword map to the generic family.
    pub fn from_css(entry: &str) -> Self {
        let entry = entry.trim();
        if let Some(name) = unquote(entry) {
            return Self::Name(name.to_string());
        }
        match entry {
            "serif" => Self::Serif,
            "sans-serif" => Self::SansSerif,
            "monospace" => Self::Monospace,
            "cursive" => Self::Cursive,
            "fantasy" => Self::Fantasy,
            "system-ui" => Self::SystemUi,
            name => Self::Name(name.to_string()),
        }
    }

    /// Whether this is a generic family rather than a named one.
    pub fn is_generic(&self) -> bool {
        !matches!(self, FontFamily::Name(_))
    }

    /// Convert to cosmic-text Family.
    ///
    /// cosmic-text has no `system-ui` family; it resolves to sans-serif.
    #[cfg(feature = "cosmic")]
    pub fn to_cosmic(&self) -> cosmic_text::Family<'_> {
        match self {
            FontFamily::Name(name) => cosmic_text::Family::Name(name.as_str()),
            FontFamily::Serif => cosmic_text::Family::Serif,
            FontFamily::SansSerif | FontFamily::SystemUi => cosmic_text::Family::SansSerif,
            FontFamily::Monospace => cosmic_text::Family::Monospace,
            FontFamily::Cursive => cosmic_text::Family::Cursive,
            FontFamily::Fantasy => cosmic_text::Family::Fantasy,
        }
    }
}

impl Default for FontFamily {
    fn default() -> Self {
        Self::SansSerif
    }
}

impl fmt::Display for FontFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FontFamily::Name(name) => write!(f, "{}", name),
            FontFamily::Serif => write!(f, "serif"),
            FontFamily::SansSerif => write!(f, "sans-serif"),
            FontFamily::Monospace => write!(f, "monospace"),
            FontFamily::Cursive => write!(f, "cursive"),
            FontFamily::Fantasy => write!(f, "fantasy"),
            FontFamily::SystemUi => write!(f, "system-ui"),
        }
    }
}

/// Strip matching surrounding quotes, returning the inner name.
///
/// Returns `None` unless `s` starts and ends with the same quote character
/// and the inner text is non-empty and free of quotes.
pub(crate) fn unquote(s: &str) -> Option<&str> {
    let first = s.chars().next()?;
    if first != '"' && first != '\'' {
        return None;
    }
    let inner = s.strip_prefix(first)?.strip_suffix(first)?;
    if inner.is_empty() || inner.contains(['"', '\'']) {
        return None;
    }
    Some(inner)
}
