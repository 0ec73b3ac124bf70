//! # Text Normalization
//!
//! Purpose: Fold query text the same way the server folded indexed text, so
//! n-grams generated on the client line up with the server's posting lists.
//!
//! ## Pipeline
//!
//! ```text
//! input ─▶ NFKC ─▶ lowercase ─▶ NFKC (only if both ran) ─▶ width fold ─▶ output
//! ```
//!
//! Case folding runs before width folding so that a lowercase mapping which
//! lands in ASCII is still widened; the second NFKC pass recomposes letters
//! whose lowercase form has a precomposed codepoint. Both keep the pipeline
//! idempotent for a fixed set of options.
//!
//! ## Reduced Mode
//!
//! Without the `unicode` feature there are no composition tables: NFKC
//! degrades to folding the full-width ASCII block and the ideographic space.
//! Width and case folding behave the same in both modes.

use std::borrow::Cow;

use serde::{Deserialize, Serialize};

/// Offset between the full-width forms block (U+FF01..=U+FF5E) and ASCII.
const FULLWIDTH_OFFSET: u32 = 0xFEE0;
const IDEOGRAPHIC_SPACE: char = '\u{3000}';

/// Character width conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Width {
    /// Full-width ASCII forms become ASCII.
    #[default]
    Narrow,
    /// Printable ASCII becomes its full-width form.
    Wide,
    /// Leave widths untouched.
    Keep,
}

impl Width {
    /// Parses `"narrow"`, `"wide"`, or `"keep"`. Anything else means `Keep`.
    pub fn parse(value: &str) -> Width {
        match value {
            "narrow" => Width::Narrow,
            "wide" => Width::Wide,
            _ => Width::Keep,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Width::Narrow => "narrow",
            Width::Wide => "wide",
            Width::Keep => "keep",
        }
    }

    fn fold(self, c: char) -> char {
        match self {
            Width::Narrow => to_narrow(c),
            Width::Wide => to_wide(c),
            Width::Keep => c,
        }
    }
}

impl From<&str> for Width {
    fn from(value: &str) -> Self {
        Width::parse(value)
    }
}

/// Options for [`normalize`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NormalizeOptions {
    /// Apply Unicode NFKC.
    pub nfkc: bool,
    pub width: Width,
    /// Apply Unicode lowercase mapping.
    pub lower: bool,
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        NormalizeOptions {
            nfkc: true,
            width: Width::Narrow,
            lower: false,
        }
    }
}

impl NormalizeOptions {
    pub fn with_nfkc(mut self, nfkc: bool) -> Self {
        self.nfkc = nfkc;
        self
    }

    pub fn with_width(mut self, width: impl Into<Width>) -> Self {
        self.width = width.into();
        self
    }

    pub fn with_lower(mut self, lower: bool) -> Self {
        self.lower = lower;
        self
    }
}

/// Normalizes `text` with `options`.
///
/// `normalize(&normalize(x, o), o) == normalize(x, o)` for every `o`.
///
/// # Examples
/// ```rust
/// use mygram_text::{normalize, NormalizeOptions, Width};
///
/// let options = NormalizeOptions::default().with_lower(true);
/// assert_eq!(normalize("ＭｙｇｒａｍＤＢ　１２３", &options), "mygramdb 123");
///
/// let wide = NormalizeOptions::default().with_width(Width::Wide);
/// assert_eq!(normalize("ab 1", &wide), "ａｂ　１");
/// ```
pub fn normalize(text: &str, options: &NormalizeOptions) -> String {
    let mut text: Cow<'_, str> = if options.nfkc {
        Cow::Owned(compat_compose(text))
    } else {
        Cow::Borrowed(text)
    };

    if options.lower {
        let lowered = text.to_lowercase();
        text = if options.nfkc {
            Cow::Owned(compat_compose(&lowered))
        } else {
            Cow::Owned(lowered)
        };
    }

    match options.width {
        Width::Keep => text.into_owned(),
        width => text.chars().map(|c| width.fold(c)).collect(),
    }
}

/// Normalizes with the default options (NFKC, narrow, no lowercase).
pub fn normalize_default(text: &str) -> String {
    normalize(text, &NormalizeOptions::default())
}

#[cfg(feature = "unicode")]
fn compat_compose(text: &str) -> String {
    use unicode_normalization::UnicodeNormalization;

    text.nfkc().collect()
}

#[cfg(not(feature = "unicode"))]
fn compat_compose(text: &str) -> String {
    text.chars().map(to_narrow).collect()
}

fn to_narrow(c: char) -> char {
    match c {
        IDEOGRAPHIC_SPACE => ' ',
        '\u{FF01}'..='\u{FF5E}' => char::from_u32(c as u32 - FULLWIDTH_OFFSET).unwrap_or(c),
        _ => c,
    }
}

fn to_wide(c: char) -> char {
    match c {
        ' ' => IDEOGRAPHIC_SPACE,
        '!'..='~' => char::from_u32(c as u32 + FULLWIDTH_OFFSET).unwrap_or(c),
        _ => c,
    }
}
