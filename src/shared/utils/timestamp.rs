use chrono::{DateTime, Duration, SecondsFormat, SubsecRound, Utc};

/// Fixed-width RFC 3339 with microseconds, so lexical order matches
/// chronological order in the store.
pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    DateTime::parse_from_rfc3339(value).map(|dt| dt.with_timezone(&Utc))
}

/// `now` truncated to store precision, bumped past `previous` when the
/// clock has not advanced beyond it.
pub fn next_timestamp_after(now: DateTime<Utc>, previous: Option<DateTime<Utc>>) -> DateTime<Utc> {
    let now = now.trunc_subsecs(6);
    match previous {
        Some(prev) if now <= prev => prev + Duration::microseconds(1),
        _ => now,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_format_is_fixed_width() {
        let a = Utc.with_ymd_and_hms(2025, 3, 1, 8, 0, 0).unwrap();
        let b = a + Duration::microseconds(1_500_000);
        let (fa, fb) = (format_timestamp(&a), format_timestamp(&b));

        assert_eq!(fa, "2025-03-01T08:00:00.000000Z");
        assert_eq!(fa.len(), fb.len());
        assert!(fa < fb);
    }

    #[test]
    fn test_parse_round_trip() {
        let ts = Utc.with_ymd_and_hms(2025, 3, 1, 8, 0, 0).unwrap() + Duration::microseconds(42);
        assert_eq!(parse_timestamp(&format_timestamp(&ts)).unwrap(), ts);
        assert!(parse_timestamp("yesterday").is_err());
    }

    #[test]
    fn test_next_timestamp_is_strictly_later() {
        let prev = Utc.with_ymd_and_hms(2025, 3, 1, 8, 0, 0).unwrap();

        let stale_clock = prev - Duration::seconds(5);
        assert_eq!(
            next_timestamp_after(stale_clock, Some(prev)),
            prev + Duration::microseconds(1)
        );

        let later = prev + Duration::seconds(1);
        assert_eq!(next_timestamp_after(later, Some(prev)), later);
        assert_eq!(next_timestamp_after(later, None), later);
    }
}
