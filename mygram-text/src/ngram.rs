//! # N-gram Tokenizer
//!
//! Purpose: Split normalized text into the overlapping codepoint windows the
//! server indexes, so a query matches the same posting lists.
//!
//! ## Design Principles
//!
//! 1. **Codepoints, Not Bytes**: Windows slide over `char`s; a multi-byte
//!    character is one unit.
//! 2. **Class-Local Windows**: Hybrid mode never emits a gram that crosses a
//!    CJK/non-CJK boundary.
//! 3. **Server Parity**: Sizes and class boundaries must match the index
//!    configuration; any drift silently degrades recall.
//!
//! ## Hybrid Example
//!
//! ```text
//! "東京tower" with ascii_size=2, kanji_size=1
//!
//!   runs:   [東 京] [t o w e r]
//!   grams:  東 京 | to ow we er
//! ```

use serde::{Deserialize, Serialize};

/// Tokenizer configuration, mirroring the server's index settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tokenizer {
    /// Every window of `n` codepoints.
    Uniform { n: usize },
    /// Separate window sizes for CJK ideograph runs and everything else.
    Hybrid { ascii_size: usize, kanji_size: usize },
}

impl Default for Tokenizer {
    fn default() -> Self {
        Tokenizer::Hybrid {
            ascii_size: 2,
            kanji_size: 1,
        }
    }
}

impl Tokenizer {
    /// Tokenizes already-normalized text.
    pub fn tokenize(&self, text: &str) -> Vec<String> {
        match *self {
            Tokenizer::Uniform { n } => generate_ngrams(text, n),
            Tokenizer::Hybrid {
                ascii_size,
                kanji_size,
            } => generate_hybrid_ngrams(text, ascii_size, kanji_size),
        }
    }
}

/// Returns every overlapping window of `n` codepoints.
///
/// Yields `max(0, len - n + 1)` grams; text shorter than `n`, or `n == 0`,
/// yields nothing.
///
/// # Examples
/// ```rust
/// use mygram_text::generate_ngrams;
///
/// assert_eq!(generate_ngrams("abcd", 2), vec!["ab", "bc", "cd"]);
/// assert_eq!(generate_ngrams("日本語", 1), vec!["日", "本", "語"]);
/// assert!(generate_ngrams("a", 2).is_empty());
/// ```
pub fn generate_ngrams(text: &str, n: usize) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    let mut grams = Vec::with_capacity(chars.len().saturating_sub(n.saturating_sub(1)));
    push_windows(&chars, n, &mut grams);
    grams
}

/// Splits text into maximal CJK-ideograph and non-ideograph runs and
/// n-grams each run with its own size, keeping the original run order.
pub fn generate_hybrid_ngrams(text: &str, ascii_size: usize, kanji_size: usize) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    let mut grams = Vec::with_capacity(chars.len());

    let mut start = 0;
    while start < chars.len() {
        let cjk = is_cjk_ideograph(chars[start]);
        let end = chars[start..]
            .iter()
            .position(|&c| is_cjk_ideograph(c) != cjk)
            .map_or(chars.len(), |offset| start + offset);

        let size = if cjk { kanji_size } else { ascii_size };
        push_windows(&chars[start..end], size, &mut grams);
        start = end;
    }
    grams
}

/// True for codepoints in the CJK Unified Ideographs blocks (base block,
/// extensions A through I) and the two compatibility ideograph blocks.
///
/// Kana, Hangul, and CJK punctuation are not ideographs.
pub fn is_cjk_ideograph(c: char) -> bool {
    matches!(
        c as u32,
        0x4E00..=0x9FFF      // CJK Unified Ideographs
        | 0x3400..=0x4DBF    // Extension A
        | 0xF900..=0xFAFF    // Compatibility Ideographs
        | 0x20000..=0x2A6DF  // Extension B
        | 0x2A700..=0x2EE5F  // Extensions C-F, I
        | 0x2F800..=0x2FA1F  // Compatibility Ideographs Supplement
        | 0x30000..=0x323AF  // Extensions G-H
    )
}

fn push_windows(chars: &[char], n: usize, out: &mut Vec<String>) {
    if n == 0 || chars.len() < n {
        return;
    }
    out.extend(chars.windows(n).map(|window| window.iter().collect::<String>()));
}
