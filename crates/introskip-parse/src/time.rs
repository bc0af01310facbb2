/// Format seconds as `MM:SS` (minutes are not wrapped into hours).
pub fn format_clock(seconds: f64) -> String {
    let total = if seconds.is_finite() && seconds > 0.0 {
        seconds.floor() as u64
    } else {
        0
    };
    format!("{:02}:{:02}", total / 60, total % 60)
}

/// Parse `H:MM:SS`, `MM:SS`, or a bare number of seconds.
///
/// Returns `None` for empty input or any non-numeric component.
pub fn parse_clock(input: &str) -> Option<f64> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }
    input.split(':').try_fold(0.0_f64, |acc, part| {
        let value: f64 = part.trim().parse().ok()?;
        (value.is_finite() && value >= 0.0).then_some(acc * 60.0 + value)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_clock() {
        assert_eq!(format_clock(0.0), "00:00");
        assert_eq!(format_clock(83.9), "01:23");
        assert_eq!(format_clock(3725.0), "62:05");
        assert_eq!(format_clock(f64::NAN), "00:00");
    }

    #[test]
    fn test_parse_clock() {
        assert_eq!(parse_clock("01:23"), Some(83.0));
        assert_eq!(parse_clock("1:02:03"), Some(3723.0));
        assert_eq!(parse_clock("95.5"), Some(95.5));
        assert_eq!(parse_clock(""), None);
        assert_eq!(parse_clock("1:xx"), None);
        assert_eq!(parse_clock("-5"), None);
    }
}
