#[cfg(test)]
mod tests {
    use crate::interval::{
        frequency_label, next_after, parse_frequency, snooze_duration, MAX_INTERVAL_HOURS,
    };
    use chrono::{Duration, TimeZone, Utc};
    use proptest::prelude::*;

    proptest! {
        // "Every N hours" always yields N inside the accepted range
        #[test]
        fn test_every_n_hours_parses_to_n(n in 1u32..=MAX_INTERVAL_HOURS) {
            let text = format!("Every {} hours", n);
            prop_assert_eq!(parse_frequency(&text).unwrap(), n);
            prop_assert_eq!(parse_frequency(&frequency_label(n)).unwrap(), n);
        }

        #[test]
        fn test_out_of_range_is_rejected(n in (MAX_INTERVAL_HOURS + 1)..100_000u32) {
            let text = format!("Every {} hours", n);
            prop_assert!(parse_frequency(&text).is_err());
        }

        // The next reminder is exactly the interval after the dispatch time
        #[test]
        fn test_next_after_adds_exact_hours(
            secs in 0i64..4_000_000_000i64,
            hours in 1u32..=MAX_INTERVAL_HOURS,
        ) {
            let now = Utc.timestamp_opt(secs, 0).unwrap();
            let next = next_after(now, hours);
            prop_assert!(next > now);
            prop_assert_eq!(next - now, Duration::hours(i64::from(hours)));
        }

        #[test]
        fn test_snooze_stays_within_bounds(hours in 0.001f64..168.0f64) {
            let duration = snooze_duration(hours, 168.0).unwrap();
            prop_assert!(duration > Duration::zero());
            prop_assert!(duration <= Duration::hours(168));
        }
    }
}
