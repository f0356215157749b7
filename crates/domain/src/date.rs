use chrono::{DateTime, TimeZone, Utc};

/// Whole unix seconds of a millis timestamp
pub fn millis_to_secs(millis: i64) -> i64 {
    millis.div_euclid(1000)
}

/// Millis timestamp as fractional epoch seconds, which is how reminder
/// timestamps are persisted and exposed
pub fn millis_to_epoch_secs(millis: i64) -> f64 {
    millis as f64 / 1000.0
}

pub fn epoch_secs_to_millis(secs: f64) -> i64 {
    (secs * 1000.0).round() as i64
}

/// `None` when the timestamp is outside of what `DateTime` can represent
pub fn millis_to_datetime(millis: i64) -> Option<DateTime<Utc>> {
    Utc.timestamp_millis_opt(millis).single()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_between_millis_and_seconds() {
        assert_eq!(millis_to_secs(1_999), 1);
        assert_eq!(millis_to_secs(-1), -1);
        assert_eq!(millis_to_epoch_secs(1_500), 1.5);
        assert_eq!(epoch_secs_to_millis(1.5), 1_500);
        assert_eq!(
            millis_to_datetime(1_613_862_000_000).map(|d| d.timestamp_millis()),
            Some(1_613_862_000_000)
        );
        assert_eq!(millis_to_datetime(i64::MAX), None);
    }
}
