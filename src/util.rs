/// Group digits in thousands: 43762985 -> "43,762,985".
pub fn format_count(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);

    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }

    out
}

/// Signed, grouped delta: "+1,204", "-3", "+0".
pub fn format_delta(d: i64) -> String {
    let sign = if d < 0 { '-' } else { '+' };
    format!("{sign}{}", format_count(d.unsigned_abs()))
}

pub fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{truncated}...")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn groups_thousands() {
        assert_eq!(format_count(0), "0");
        assert_eq!(format_count(999), "999");
        assert_eq!(format_count(1_000), "1,000");
        assert_eq!(format_count(43_762_985), "43,762,985");
    }

    #[test]
    fn deltas_are_signed() {
        assert_eq!(format_delta(0), "+0");
        assert_eq!(format_delta(1_204), "+1,204");
        assert_eq!(format_delta(-3), "-3");
        assert_eq!(format_delta(i64::MIN), "-9,223,372,036,854,775,808");
    }

    #[test]
    fn truncate_counts_chars_not_bytes() {
        assert_eq!(truncate("Львівська", 20), "Львівська");
        assert_eq!(truncate("Івано-Франківська область", 10), "Івано-Ф...");
    }
}
