//! Human-readable magnitudes: byte sizes, counts and durations.

use std::time::Duration;

const BINARY_UNITS: [&str; 7] = ["B", "K", "M", "G", "T", "P", "E"];

/// `du -h` / `df -h` style: `512`, `1.5K`, `23M`. One decimal below 10.
pub fn short_size(bytes: u64) -> String {
    if bytes < 1024 {
        return bytes.to_string();
    }
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < BINARY_UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if value < 10.0 {
        format!("{:.1}{}", value, BINARY_UNITS[unit])
    } else {
        format!("{:.0}{}", value, BINARY_UNITS[unit])
    }
}

/// `humanize bytes`: `1.50 KiB`, `3.00 MiB`; below 1024 stays `N B`.
pub fn bytes(n: f64) -> String {
    const UNITS: [&str; 7] = ["B", "KiB", "MiB", "GiB", "TiB", "PiB", "EiB"];
    let negative = n < 0.0;
    let mut value = n.abs();
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    let sign = if negative { "-" } else { "" };
    if unit == 0 {
        format!("{}{} B", sign, value)
    } else {
        format!("{}{:.2} {}", sign, value, UNITS[unit])
    }
}

/// `humanize count`: `950`, `1.2K`, `3.4M`, `5.6B`, `7.8T`.
pub fn count(n: f64) -> String {
    const UNITS: [(f64, &str); 4] = [(1e12, "T"), (1e9, "B"), (1e6, "M"), (1e3, "K")];
    let abs = n.abs();
    for (scale, suffix) in UNITS {
        if abs >= scale {
            let text = format!("{:.1}", n / scale);
            let text = text.strip_suffix(".0").unwrap_or(&text).to_string();
            return format!("{}{}", text, suffix);
        }
    }
    if n.fract() == 0.0 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

/// `humanize duration`: `2d 3h 4m 5s`; sub-second values as `250ms`.
pub fn duration(d: Duration) -> String {
    let total = d.as_secs();
    if total == 0 {
        let ms = d.as_millis();
        if ms > 0 {
            return format!("{}ms", ms);
        }
        let us = d.as_micros();
        if us > 0 {
            return format!("{}µs", us);
        }
        return format!("{}ns", d.as_nanos());
    }
    let days = total / 86_400;
    let hours = (total % 86_400) / 3600;
    let minutes = (total % 3600) / 60;
    let seconds = total % 60;
    let mut parts = Vec::new();
    if days > 0 {
        parts.push(format!("{}d", days));
    }
    if hours > 0 {
        parts.push(format!("{}h", hours));
    }
    if minutes > 0 {
        parts.push(format!("{}m", minutes));
    }
    if seconds > 0 {
        parts.push(format!("{}s", seconds));
    }
    parts.join(" ")
}

/// Insert thousands separators into the integer part of a decimal string.
pub fn thousands(number: &str) -> String {
    let (sign, rest) = match number.strip_prefix('-') {
        Some(r) => ("-", r),
        None => ("", number),
    };
    let (int, frac) = match rest.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (rest, None),
    };
    let mut grouped = String::new();
    for (i, c) in int.chars().enumerate() {
        if i > 0 && (int.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    match frac {
        Some(f) => format!("{}{}.{}", sign, grouped, f),
        None => format!("{}{}", sign, grouped),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_size_scales() {
        assert_eq!(short_size(512), "512");
        assert_eq!(short_size(1536), "1.5K");
        assert_eq!(short_size(20 * 1024 * 1024), "20M");
    }

    #[test]
    fn bytes_uses_binary_units() {
        assert_eq!(bytes(500.0), "500 B");
        assert_eq!(bytes(1536.0), "1.50 KiB");
        assert_eq!(bytes(3.0 * 1024.0 * 1024.0), "3.00 MiB");
    }

    #[test]
    fn count_abbreviates() {
        assert_eq!(count(950.0), "950");
        assert_eq!(count(1200.0), "1.2K");
        assert_eq!(count(3_000_000.0), "3M");
        assert_eq!(count(5_600_000_000.0), "5.6B");
    }

    #[test]
    fn duration_breaks_down() {
        assert_eq!(duration(Duration::from_secs(93_784)), "1d 2h 3m 4s");
        assert_eq!(duration(Duration::from_millis(250)), "250ms");
        assert_eq!(duration(Duration::from_secs(60)), "1m");
    }

    #[test]
    fn thousands_groups_digits() {
        assert_eq!(thousands("1234567.89"), "1,234,567.89");
        assert_eq!(thousands("-1000"), "-1,000");
        assert_eq!(thousands("999"), "999");
    }
}
