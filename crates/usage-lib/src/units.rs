//! CPU and memory quantity conversion
//!
//! Canonical units are millicores for CPU and bytes for memory. Text that
//! cannot be parsed converts to zero instead of failing; `kubectl top`
//! prints `<unknown>` for pods whose metrics are not yet available and
//! those rows must still aggregate.

/// Marker printed by kubectl when a value is not available
pub const UNKNOWN_MARKER: &str = "<unknown>";

const KI: u64 = 1 << 10;
const MI: u64 = 1 << 20;
const GI: u64 = 1 << 30;
const TI: u64 = 1 << 40;

/// Memory suffixes and their multipliers. Binary and decimal suffixes never
/// overlap, so the first `ends_with` hit is the right one.
const MEMORY_SUFFIXES: &[(&str, u64)] = &[
    ("Ki", KI),
    ("Mi", MI),
    ("Gi", GI),
    ("Ti", TI),
    ("K", 1_000),
    ("M", 1_000_000),
    ("G", 1_000_000_000),
    ("T", 1_000_000_000_000),
];

const BINARY_UNITS: &[(&str, u64)] = &[("Ti", TI), ("Gi", GI), ("Mi", MI), ("Ki", KI)];

fn is_unset(text: &str) -> bool {
    text.is_empty() || text == UNKNOWN_MARKER
}

/// Scale a parsed float into whole units. Negative, non-finite and
/// out-of-range values convert to zero like any other malformed text.
fn scaled(value: f64, multiplier: f64) -> u64 {
    let product = value * multiplier;
    if product.is_finite() && product >= 0.0 && product < u64::MAX as f64 {
        product as u64
    } else {
        0
    }
}

/// Convert a CPU quantity ("250m", "1", "1.5") to millicores
pub fn cpu_to_millicores(text: &str) -> u64 {
    let text = text.trim();
    if is_unset(text) {
        return 0;
    }

    if let Some(milli) = text.strip_suffix('m') {
        return milli.parse().unwrap_or(0);
    }

    text.parse::<f64>()
        .map(|cores| scaled(cores, 1000.0))
        .unwrap_or(0)
}

/// Convert a memory quantity ("256Mi", "1G", "1048576") to bytes
pub fn memory_to_bytes(text: &str) -> u64 {
    let text = text.trim();
    if is_unset(text) {
        return 0;
    }

    for (suffix, multiplier) in MEMORY_SUFFIXES {
        if let Some(number) = text.strip_suffix(suffix) {
            if let Ok(whole) = number.parse::<u64>() {
                return whole.saturating_mul(*multiplier);
            }
            return number
                .parse::<f64>()
                .map(|value| scaled(value, *multiplier as f64))
                .unwrap_or(0);
        }
    }

    text.parse().unwrap_or(0)
}

/// Format millicores for display: "250m" below one core, "1.5" above
pub fn millicores_to_text(millicores: u64) -> String {
    if millicores >= 1000 {
        format!("{:.1}", millicores as f64 / 1000.0)
    } else {
        format!("{}m", millicores)
    }
}

/// Format bytes using the largest binary unit the value reaches
pub fn bytes_to_text(bytes: u64) -> String {
    for (suffix, threshold) in BINARY_UNITS {
        if bytes >= *threshold {
            return format!("{:.1}{}", bytes as f64 / *threshold as f64, suffix);
        }
    }
    bytes.to_string()
}

/// Parse a percentage column ("27%") into a number
pub fn percent_from_text(text: &str) -> f64 {
    text.trim()
        .trim_end_matches('%')
        .parse::<f64>()
        .unwrap_or(0.0)
}

/// `used / total * 100`, or zero when there is no baseline
pub fn percent_of(used: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        used as f64 / total as f64 * 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cpu_to_millicores() {
        assert_eq!(cpu_to_millicores("250m"), 250);
        assert_eq!(cpu_to_millicores("1"), 1000);
        assert_eq!(cpu_to_millicores("1.5"), 1500);
        assert_eq!(cpu_to_millicores(""), 0);
        assert_eq!(cpu_to_millicores("<unknown>"), 0);
        assert_eq!(cpu_to_millicores("abc"), 0);
        assert_eq!(cpu_to_millicores("12xm"), 0);
    }

    #[test]
    fn test_memory_to_bytes() {
        assert_eq!(memory_to_bytes("1024Ki"), 1024 * 1024);
        assert_eq!(memory_to_bytes("1Gi"), 1024 * 1024 * 1024);
        assert_eq!(memory_to_bytes("1000M"), 1_000_000_000);
        assert_eq!(memory_to_bytes("2Ti"), 2 * TI);
        assert_eq!(memory_to_bytes("5K"), 5_000);
        assert_eq!(memory_to_bytes("3G"), 3_000_000_000);
        assert_eq!(memory_to_bytes("1T"), 1_000_000_000_000);
        assert_eq!(memory_to_bytes("4096"), 4096);
        assert_eq!(memory_to_bytes(""), 0);
        assert_eq!(memory_to_bytes("<unknown>"), 0);
        assert_eq!(memory_to_bytes("lotsMi"), 0);
    }

    #[test]
    fn test_non_finite_and_out_of_range_quantities() {
        for text in ["inf", "NaN", "infinity", "-1", "-0.5", "1e30"] {
            assert_eq!(cpu_to_millicores(text), 0, "cpu {:?}", text);
        }
        for text in ["infGi", "NaNMi", "-1.5Gi", "1e30Ti"] {
            assert_eq!(memory_to_bytes(text), 0, "memory {:?}", text);
        }
        assert_eq!(memory_to_bytes("1.5Gi"), 3 * GI / 2);
    }

    #[test]
    fn test_millicores_to_text() {
        assert_eq!(millicores_to_text(250), "250m");
        assert_eq!(millicores_to_text(0), "0m");
        assert_eq!(millicores_to_text(1500), "1.5");
        assert_eq!(millicores_to_text(2000), "2.0");
    }

    #[test]
    fn test_cpu_text_round_trip_is_lossy_above_one_core() {
        let original = 1234;
        let text = millicores_to_text(original);
        assert_eq!(text, "1.2");
        assert_ne!(cpu_to_millicores(&text), original);
    }

    #[test]
    fn test_cpu_canonical_values_are_idempotent() {
        for millicores in [0, 1, 250, 999, 1000, 1500, 2000, 4000] {
            assert_eq!(cpu_to_millicores(&millicores_to_text(millicores)), millicores);
        }
    }

    #[test]
    fn test_bytes_to_text_unit_boundaries() {
        assert_eq!(bytes_to_text(1024), "1.0Ki");
        assert_eq!(bytes_to_text(1024 * 1024), "1.0Mi");
        assert_eq!(bytes_to_text(1024 * 1024 * 1024), "1.0Gi");
        assert_eq!(bytes_to_text(TI), "1.0Ti");
        assert_eq!(bytes_to_text(100), "100");
        assert_eq!(bytes_to_text(1536 * MI), "1.5Gi");
    }

    #[test]
    fn test_percent_helpers() {
        assert_eq!(percent_from_text("27%"), 27.0);
        assert_eq!(percent_from_text("<unknown>"), 0.0);
        assert!((percent_of(430, 4000) - 10.75).abs() < 1e-9);
        assert_eq!(percent_of(10, 0), 0.0);
    }
}
