//! Human-readable byte sizes.

const UNITS: [&str; 4] = ["KB", "MB", "GB", "TB"];

/// Formats a byte count, e.g. `500B`, `1.50KB`, `2.00MB`.
///
/// Units are powers of 1024; anything past terabytes stays in `TB`.
pub fn format_bytes(bytes: u64) -> String {
    if bytes < 1024 {
        return format!("{bytes}B");
    }

    let mut value = bytes as f64 / 1024.0;
    let mut unit = 0;
    while value >= 1024.0 && unit + 1 < UNITS.len() {
        value /= 1024.0;
        unit += 1;
    }
    format!("{value:.2}{}", UNITS[unit])
}
