use chrono::{DateTime, Utc};

/// Format a duration in seconds as `m:ss` for table display.
pub fn format_time(seconds: i64) -> String {
    let seconds = seconds.max(0);
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

/// Format a timestamp for table display, `-` when absent.
pub fn format_date(date: Option<&DateTime<Utc>>) -> String {
    match date {
        Some(dt) => dt.format("%b %d, %Y").to_string(),
        None => "-".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_time() {
        assert_eq!(format_time(0), "0:00");
        assert_eq!(format_time(59), "0:59");
        assert_eq!(format_time(60), "1:00");
        assert_eq!(format_time(312), "5:12");
        assert_eq!(format_time(-5), "0:00"); // Clock skew, clamp instead of garbage
    }

    #[test]
    fn test_format_date() {
        let dt = DateTime::parse_from_rfc3339("2024-02-11T09:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        assert_eq!(format_date(Some(&dt)), "Feb 11, 2024");
        assert_eq!(format_date(None), "-");
    }
}
