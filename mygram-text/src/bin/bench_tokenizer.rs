//! # Tokenizer Benchmark Harness
//!
//! Purpose: Provide a repeatable benchmark driver for the query-side text
//! pipeline so normalization and n-gram throughput can be compared over time.
//!
//! ## Design Principles
//! 1. **Deterministic Workload**: Use a fixed PRNG seed for stable comparisons.
//! 2. **Allocation Control**: Pre-build the corpus to keep setup costs off the hot path.
//! 3. **Mixed Scripts**: Interleave ASCII, kana, kanji, and full-width forms so
//!    every branch of the pipeline is exercised.
//!
//! Usage: `cargo run --release -p mygram-text --features bench --bin bench_tokenizer -- [docs] [chars_per_doc] [ascii_size] [kanji_size]`.
//! Set `RUST_LOG=debug` to log per-stage sizes.

use std::env;
use std::hint::black_box;
use std::time::{Duration, Instant};

use anyhow::{ensure, Result};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use mygram_text::{generate_hybrid_ngrams, normalize, NormalizeOptions, Width};

const DEFAULT_DOC_COUNT: usize = 10_000;
const DEFAULT_DOC_CHARS: usize = 256;
const DEFAULT_ASCII_SIZE: usize = 2;
const DEFAULT_KANJI_SIZE: usize = 1;

/// Character pool mixing every class the pipeline distinguishes.
const ALPHABET: &[char] = &[
    'a', 'b', 'c', 'd', 'e', 'R', 'S', 'T', '0', '7', ' ', ' ', 'あ', 'い', 'う', 'カ', 'タ', 'ｶ',
    'ﾀ', '東', '京', '検', '索', '語', 'Ａ', 'Ｚ', '１', '　', 'é', 'ß',
];

struct BenchConfig {
    doc_count: usize,
    doc_chars: usize,
    ascii_size: usize,
    kanji_size: usize,
}

impl BenchConfig {
    fn from_args() -> Self {
        let mut args = env::args().skip(1);
        BenchConfig {
            doc_count: parse_usize(args.next(), DEFAULT_DOC_COUNT),
            doc_chars: parse_usize(args.next(), DEFAULT_DOC_CHARS),
            ascii_size: parse_usize(args.next(), DEFAULT_ASCII_SIZE),
            kanji_size: parse_usize(args.next(), DEFAULT_KANJI_SIZE),
        }
    }
}

fn parse_usize(value: Option<String>, fallback: usize) -> usize {
    value.and_then(|raw| raw.parse().ok()).unwrap_or(fallback)
}

/// Tiny deterministic PRNG; XorShift is fast enough for workload generation.
struct XorShift64 {
    state: u64,
}

impl XorShift64 {
    fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    fn next_u64(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.state = x;
        x
    }

    #[inline]
    fn next_index(&mut self, len: usize) -> usize {
        (self.next_u64() % len as u64) as usize
    }
}

fn build_corpus(config: &BenchConfig, seed: u64) -> Vec<String> {
    let mut rng = XorShift64::new(seed);
    (0..config.doc_count)
        .map(|_| {
            (0..config.doc_chars)
                .map(|_| ALPHABET[rng.next_index(ALPHABET.len())])
                .collect()
        })
        .collect()
}

fn report(label: &str, docs: usize, chars: usize, elapsed: Duration) {
    let secs = elapsed.as_secs_f64();
    let docs_per_sec = (docs as f64) / secs;
    let mchars_per_sec = (chars as f64) / secs / 1e6;
    info!("{label}: {docs} docs in {secs:.3}s ({docs_per_sec:.0} docs/s, {mchars_per_sec:.2} Mchar/s)");
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    if let Err(err) = run() {
        eprintln!("bench_tokenizer failed: {err:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let config = BenchConfig::from_args();
    ensure!(config.doc_count > 0, "doc count must be positive");
    ensure!(
        config.ascii_size > 0 && config.kanji_size > 0,
        "n-gram sizes must be positive"
    );

    let corpus = build_corpus(&config, 0x1234_5678_9ABC_DEF0);
    let total_chars = config.doc_count * config.doc_chars;
    info!(
        "docs={}, chars_per_doc={}, ascii_size={}, kanji_size={}",
        config.doc_count, config.doc_chars, config.ascii_size, config.kanji_size
    );

    let options = NormalizeOptions::default().with_width(Width::Narrow).with_lower(true);
    let start = Instant::now();
    let normalized: Vec<String> = corpus.iter().map(|doc| normalize(doc, &options)).collect();
    report("NORMALIZE", config.doc_count, total_chars, start.elapsed());

    let start = Instant::now();
    let mut gram_count = 0usize;
    for doc in &normalized {
        let grams = generate_hybrid_ngrams(doc, config.ascii_size, config.kanji_size);
        gram_count += grams.len();
        black_box(grams);
    }
    report("HYBRID_NGRAMS", config.doc_count, total_chars, start.elapsed());
    debug!(gram_count, "generated n-grams");

    Ok(())
}
