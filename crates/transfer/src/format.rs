/// Units from largest to smallest, 1024 apart.
const UNITS: [&str; 4] = ["GB", "MB", "KB", "B"];

/// Formats a byte count as descending unit components, e.g. `"1 MB 512 KB"`.
///
/// Zero-valued components are omitted; `0` renders as `"0 B"`.
pub fn format_bytes(bytes: u64) -> String {
    if bytes == 0 {
        return "0 B".into();
    }

    let mut remaining = bytes;
    let mut scale = 1024u64.pow(UNITS.len() as u32 - 1);
    let mut parts = Vec::new();

    for unit in UNITS {
        let value = remaining / scale;
        if value > 0 {
            parts.push(format!("{value} {unit}"));
        }
        remaining %= scale;
        scale /= 1024;
    }

    parts.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_bytes() {
        assert_eq!(format_bytes(0), "0 B");
    }

    #[test]
    fn plain_bytes() {
        assert_eq!(format_bytes(512), "512 B");
    }

    #[test]
    fn exact_units_skip_empty_components() {
        assert_eq!(format_bytes(1024), "1 KB");
        assert_eq!(format_bytes(1024 * 1024), "1 MB");
        assert_eq!(format_bytes(3 * 1024 * 1024 * 1024), "3 GB");
    }

    #[test]
    fn mixed_components() {
        assert_eq!(format_bytes(1024 * 1024 + 512 * 1024), "1 MB 512 KB");
        assert_eq!(format_bytes(1024 * 1024 * 1024 + 7), "1 GB 7 B");
    }

    #[test]
    fn gigabytes_do_not_roll_over() {
        assert_eq!(format_bytes(2048 * 1024 * 1024 * 1024), "2048 GB");
    }
}
