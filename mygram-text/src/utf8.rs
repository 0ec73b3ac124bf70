//! UTF-8 <-> Unicode scalar value conversion.
//!
//! Malformed input is rejected with `Error::Encoding`; nothing is replaced
//! with U+FFFD, so a successful conversion is always lossless.

use mygram_common::{Error, Result};

/// Decodes UTF-8 bytes into Unicode scalar values.
///
/// # Errors
/// Returns `Error::Encoding` naming the offset of the first invalid byte.
pub fn utf8_to_codepoints(bytes: &[u8]) -> Result<Vec<u32>> {
    let text = std::str::from_utf8(bytes).map_err(|err| {
        Error::Encoding(format!("invalid UTF-8 sequence at byte {}", err.valid_up_to()))
    })?;
    Ok(text.chars().map(u32::from).collect())
}

/// Encodes Unicode scalar values as UTF-8.
///
/// # Errors
/// Returns `Error::Encoding` for surrogates and values above U+10FFFF.
pub fn codepoints_to_utf8(codepoints: &[u32]) -> Result<String> {
    codepoints
        .iter()
        .map(|&cp| {
            char::from_u32(cp).ok_or_else(|| Error::Encoding(format!("invalid code point U+{cp:04X}")))
        })
        .collect()
}
