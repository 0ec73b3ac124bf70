//! # MygramDB Text Pipeline
//!
//! Purpose: Reproduce, on the client, the normalization and n-gram
//! tokenization the server applied when it built its index.
//!
//! ## Design Principles
//! 1. **Server Parity**: Same folding, same class boundaries, same sizes.
//! 2. **Idempotence**: Normalizing twice is the same as normalizing once.
//! 3. **Lossless Encoding**: Codepoint conversion rejects malformed input
//!    instead of substituting replacement characters.

mod ngram;
mod normalize;
mod utf8;

pub use ngram::{generate_hybrid_ngrams, generate_ngrams, is_cjk_ideograph, Tokenizer};
pub use normalize::{normalize, normalize_default, NormalizeOptions, Width};
pub use utf8::{codepoints_to_utf8, utf8_to_codepoints};
