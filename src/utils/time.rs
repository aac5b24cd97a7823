use chrono::{DateTime, Utc};

/// Current UTC time as unix milliseconds.
pub fn time_millis() -> i64 {
    let time: DateTime<chrono::Utc> = Utc::now();
    time.timestamp_millis()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_millis_is_recent() {
        // 2020-01-01T00:00:00Z
        assert!(time_millis() > 1_577_836_800_000);
    }
}
