//! Human-readable byte quantities.

/// Decimal suffixes, scaled by powers of 1000.
const SUFFIXES: [&str; 7] = ["B", "kB", "MB", "GB", "TB", "PB", "EB"];

/// Formats a byte count as a short human-readable quantity.
///
/// Uses decimal (SI) scaling: `format_bytes(82_854_982)` renders as
/// `83 MB`. Values below 10 bytes are printed verbatim, scaled values
/// below 10 keep one decimal place.
pub fn format_bytes(bytes: u64) -> String {
    if bytes < 10 {
        return format!("{bytes} B");
    }
    let exponent = (bytes as f64).log(1000.0).floor();
    let suffix = SUFFIXES[exponent as usize];
    // Round half-up to one decimal before deciding on the precision.
    let value = ((bytes as f64 / 1000f64.powf(exponent)) * 10.0 + 0.5).floor() / 10.0;
    if value < 10.0 {
        format!("{value:.1} {suffix}")
    } else {
        format!("{value:.0} {suffix}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_small_values_are_verbatim() {
        assert_eq!(format_bytes(0), "0 B");
        assert_eq!(format_bytes(9), "9 B");
        assert_eq!(format_bytes(10), "10 B");
        assert_eq!(format_bytes(999), "999 B");
    }

    #[test]
    fn test_decimal_scaling() {
        assert_eq!(format_bytes(1_000), "1.0 kB");
        assert_eq!(format_bytes(1_023), "1.0 kB");
        assert_eq!(format_bytes(82_854_982), "83 MB");
        assert_eq!(format_bytes(512_000_000), "512 MB");
        assert_eq!(format_bytes(8_300_000_000), "8.3 GB");
    }

    #[test]
    fn test_one_decimal_below_ten() {
        assert_eq!(format_bytes(1_024_768), "1.0 MB");
        assert_eq!(format_bytes(9_400_000), "9.4 MB");
        assert_eq!(format_bytes(10_400_000), "10 MB");
    }

    #[test]
    fn test_extreme_values() {
        assert_eq!(format_bytes(u64::MAX), "18 EB");
    }
}
