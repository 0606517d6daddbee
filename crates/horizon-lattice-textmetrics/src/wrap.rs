//! Greedy word wrapping against a maximum line width.
//!
//! The wrapper tokenizes the input, then packs tokens first-fit onto lines,
//! inserting `\n` wherever the next token would overflow the wrap width.
//! Whitespace handling follows [`WhiteSpace`](crate::WhiteSpace); tokens wider than the wrap
//! width either overflow on a line of their own or, with `break_words`, are
//! split between characters as allowed by a [`BreakPolicy`].

use std::collections::HashMap;

use tracing::trace;
use unicode_segmentation::UnicodeSegmentation;

use crate::error::MeasureResult;
use crate::glyph::GlyphMeasurer;
use crate::style::TextStyle;
use crate::targets;
use crate::tokenizer::{Token, is_breaking_space, tokenize, trim_end_breaking};

/// Decides where oversized words may be split.
pub trait BreakPolicy {
    /// Whether `token` may be broken at all.
    fn can_break_words(&self, token: &str, break_words: bool) -> bool {
        let _ = token;
        break_words
    }

    /// Whether a break is allowed between `last` and `next`, where `next`
    /// starts at byte `offset` of `token`.
    fn can_break_chars(
        &self,
        last: char,
        next: char,
        token: &str,
        offset: usize,
        break_words: bool,
    ) -> bool {
        let _ = (last, next, token, offset, break_words);
        true
    }
}

/// Allows a break between any two characters.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnywhereBreaks;

impl BreakPolicy for AnywhereBreaks {}

/// Only allows breaks on extended grapheme cluster boundaries, so combining
/// marks and emoji sequences stay together.
#[derive(Debug, Clone, Copy, Default)]
pub struct GraphemeBreaks;

impl BreakPolicy for GraphemeBreaks {
    fn can_break_chars(
        &self,
        _last: char,
        _next: char,
        token: &str,
        offset: usize,
        _break_words: bool,
    ) -> bool {
        token
            .grapheme_indices(true)
            .any(|(boundary, _)| boundary == offset)
    }
}

static ANYWHERE: AnywhereBreaks = AnywhereBreaks;

/// Wraps text with a glyph measurer and a break policy.
pub struct WordWrapper<'a, M: GlyphMeasurer + ?Sized> {
    measurer: &'a mut M,
    policy: &'a dyn BreakPolicy,
}

impl<'a, M: GlyphMeasurer + ?Sized> WordWrapper<'a, M> {
    /// Create a wrapper that may break words between any characters.
    pub fn new(measurer: &'a mut M) -> Self {
        Self {
            measurer,
            policy: &ANYWHERE,
        }
    }

    /// Use a different break policy.
    pub fn with_policy(mut self, policy: &'a dyn BreakPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Insert line breaks into `text` so each line fits `style.word_wrap_width`.
    ///
    /// Lines are joined with `\n` and never end in breaking spaces. The only
    /// lines allowed to exceed the width are those holding a single token
    /// that could not be split.
    pub fn wrap(&mut self, text: &str, style: &TextStyle) -> MeasureResult<String> {
        let font = style.to_font_string();
        let letter_spacing = style.letter_spacing;
        let collapse_spaces = style.white_space.collapse_spaces();
        let collapse_newlines = style.white_space.collapse_newlines();
        let wrap_width = style.word_wrap_width + letter_spacing;

        let mut widths = TokenWidths::new(&font, letter_spacing);
        let mut out = Lines::default();
        let mut can_prepend_spaces = !collapse_spaces;

        for token in tokenize(text) {
            let token = match token {
                Token::Newline(_) if !collapse_newlines => {
                    out.complete(true);
                    can_prepend_spaces = !collapse_spaces;
                    continue;
                }
                Token::Newline(_) => " ",
                other => other.as_str(),
            };

            let is_space = token.chars().next().is_some_and(is_breaking_space);
            if collapse_spaces
                && is_space
                && out.line.chars().next_back().is_some_and(is_breaking_space)
            {
                continue;
            }

            let token_width = widths.measure(&mut *self.measurer, token)?;

            if token_width > wrap_width {
                if !out.line.is_empty() {
                    out.complete(true);
                }

                if self.policy.can_break_words(token, style.break_words) {
                    for cluster in self.clusters(token, style.break_words) {
                        let cluster_width = widths.measure(&mut *self.measurer, cluster)?;
                        if cluster_width + out.width > wrap_width && !out.line.is_empty() {
                            out.complete(true);
                            can_prepend_spaces = false;
                        }
                        out.push(cluster, cluster_width);
                    }
                } else {
                    out.push(token, token_width);
                    out.sealed = true;
                    can_prepend_spaces = false;
                }
                continue;
            }

            if out.sealed || token_width + out.width > wrap_width {
                // Spaces at a break are dropped; the line closes lazily so
                // trailing spaces never produce an empty last line.
                if is_space {
                    out.sealed = true;
                    continue;
                }
                can_prepend_spaces = false;
                out.complete(true);
            }

            if !out.line.is_empty() || !is_space || can_prepend_spaces {
                out.push(token, token_width);
            }
        }

        out.complete(false);

        trace!(
            target: targets::WRAP,
            font = %font,
            measured = widths.len(),
            "wrapped text"
        );

        Ok(out.text)
    }

    /// Split `token` into the smallest runs the break policy allows.
    fn clusters<'t>(&self, token: &'t str, break_words: bool) -> Vec<&'t str> {
        let mut clusters = Vec::new();
        let mut start = 0;
        let mut last: Option<char> = None;

        for (offset, next) in token.char_indices() {
            let breakable = last.is_some_and(|last| {
                self.policy
                    .can_break_chars(last, next, token, offset, break_words)
            });
            if breakable {
                clusters.push(&token[start..offset]);
                start = offset;
            }
            last = Some(next);
        }

        if start < token.len() {
            clusters.push(&token[start..]);
        }
        clusters
    }
}

/// Wrap `text` with the default break policy.
pub fn word_wrap<M: GlyphMeasurer + ?Sized>(
    measurer: &mut M,
    text: &str,
    style: &TextStyle,
) -> MeasureResult<String> {
    WordWrapper::new(measurer).wrap(text, style)
}

/// Output accumulator: finished text plus the line under construction.
#[derive(Default)]
struct Lines {
    text: String,
    line: String,
    width: f32,
    /// The current line is closed: it holds an unbreakable overflowing
    /// token or a break is due. It is completed when the next non-space
    /// token arrives.
    sealed: bool,
}

impl Lines {
    fn push(&mut self, token: &str, width: f32) {
        self.line.push_str(token);
        self.width += width;
    }

    fn complete(&mut self, newline: bool) {
        self.text.push_str(trim_end_breaking(&self.line));
        if newline {
            self.text.push('\n');
        }
        self.line.clear();
        self.width = 0.0;
        self.sealed = false;
    }
}

/// Per-call memo of token widths including letter spacing.
struct TokenWidths<'f> {
    font: &'f str,
    letter_spacing: f32,
    cache: HashMap<String, f32>,
}

impl<'f> TokenWidths<'f> {
    fn new(font: &'f str, letter_spacing: f32) -> Self {
        Self {
            font,
            letter_spacing,
            cache: HashMap::new(),
        }
    }

    fn measure<M: GlyphMeasurer + ?Sized>(
        &mut self,
        measurer: &mut M,
        token: &str,
    ) -> MeasureResult<f32> {
        if let Some(&width) = self.cache.get(token) {
            return Ok(width);
        }
        let spacing = token.chars().count() as f32 * self.letter_spacing;
        let width = measurer.advance_width(self.font, token)? + spacing;
        self.cache.insert(token.to_string(), width);
        Ok(width)
    }

    fn len(&self) -> usize {
        self.cache.len()
    }
}
