//! Text segmentation into words, breaking spaces, and newlines.

/// Characters at which a line may break.
const BREAKING_SPACES: [char; 14] = [
    '\u{0009}', // character tabulation
    '\u{0020}', // space
    '\u{2000}', // en quad
    '\u{2001}', // em quad
    '\u{2002}', // en space
    '\u{2003}', // em space
    '\u{2004}', // three-per-em space
    '\u{2005}', // four-per-em space
    '\u{2006}', // six-per-em space
    '\u{2008}', // punctuation space
    '\u{2009}', // thin space
    '\u{200A}', // hair space
    '\u{205F}', // medium mathematical space
    '\u{3000}', // ideographic space
];

/// Characters that force a line break.
const NEWLINES: [char; 2] = ['\u{000A}', '\u{000D}'];

/// Whether `c` is a breaking space.
pub fn is_breaking_space(c: char) -> bool {
    BREAKING_SPACES.contains(&c)
}

/// Whether `c` is a newline (LF or CR).
pub fn is_newline(c: char) -> bool {
    NEWLINES.contains(&c)
}

/// One segment of input text, borrowed from the source string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token<'a> {
    /// A non-empty run of characters containing no breaking space or newline.
    Word(&'a str),
    /// A single breaking space.
    BreakingSpace(&'a str),
    /// A single newline character.
    Newline(&'a str),
}

impl<'a> Token<'a> {
    /// The text this token covers.
    pub fn as_str(&self) -> &'a str {
        match *self {
            Token::Word(text) | Token::BreakingSpace(text) | Token::Newline(text) => text,
        }
    }

    /// Whether this token is a breaking space.
    pub fn is_breaking_space(&self) -> bool {
        matches!(self, Token::BreakingSpace(_))
    }
}

/// Split `text` into words, breaking spaces, and newlines, preserving order.
///
/// Every breaking space and newline becomes its own token; everything else
/// accumulates into word tokens.
pub fn tokenize(text: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let mut word_start = None;

    for (offset, c) in text.char_indices() {
        let single = &text[offset..offset + c.len_utf8()];
        let token = if is_breaking_space(c) {
            Token::BreakingSpace(single)
        } else if is_newline(c) {
            Token::Newline(single)
        } else {
            word_start.get_or_insert(offset);
            continue;
        };

        if let Some(start) = word_start.take() {
            tokens.push(Token::Word(&text[start..offset]));
        }
        tokens.push(token);
    }

    if let Some(start) = word_start {
        tokens.push(Token::Word(&text[start..]));
    }

    tokens
}

/// Trim trailing breaking spaces (but not newlines) from `text`.
pub fn trim_end_breaking(text: &str) -> &str {
    text.trim_end_matches(is_breaking_space)
}

/// Split text into lines on `\r\n`, `\r`, or `\n`.
///
/// Text without a trailing line break still yields its last line, and an
/// empty string yields a single empty line.
pub fn split_lines(text: &str) -> Vec<&str> {
    let mut lines = Vec::new();
    let mut start = 0;
    let mut chars = text.char_indices().peekable();

    while let Some((offset, c)) = chars.next() {
        match c {
            '\n' => {
                lines.push(&text[start..offset]);
                start = offset + 1;
            }
            '\r' => {
                lines.push(&text[start..offset]);
                start = offset + 1;
                if let Some(&(_, '\n')) = chars.peek() {
                    chars.next();
                    start += 1;
                }
            }
            _ => {}
        }
    }

    lines.push(&text[start..]);
    lines
}
