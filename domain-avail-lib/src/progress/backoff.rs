//! Wait inserted between a failed attempt and the next one.

use std::time::Duration;

const BACKOFF_BASE_MS: f64 = 200.0;
const BACKOFF_CAP_MS: u64 = 5_000;

/// Delay before retrying, given how many retries were already performed.
///
/// `min(ceil(200 * n * max(ln(n), 1)), 5000)` milliseconds. Growth is linear
/// until `n` reaches e and `n * ln(n)` afterwards, capped at five seconds.
/// Attempt 0 yields zero.
pub fn backoff_delay(attempt: u32) -> Duration {
    let n = f64::from(attempt);
    let millis = (BACKOFF_BASE_MS * n * n.ln().max(1.0)).ceil();
    Duration::from_millis((millis as u64).min(BACKOFF_CAP_MS))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_attempts() {
        assert_eq!(backoff_delay(0), Duration::ZERO);
        assert_eq!(backoff_delay(1), Duration::from_millis(200));
        // ln(2) < 1, so the multiplier floors to 1
        assert_eq!(backoff_delay(2), Duration::from_millis(400));
    }

    #[test]
    fn test_logarithmic_growth_after_e() {
        // 200 * 3 * ln(3) = 659.16...
        assert_eq!(backoff_delay(3), Duration::from_millis(660));
        // 200 * 5 * ln(5) = 1609.43...
        assert_eq!(backoff_delay(5), Duration::from_millis(1610));
        // 200 * 8 * ln(8) = 3327.10...
        assert_eq!(backoff_delay(8), Duration::from_millis(3328));
    }

    #[test]
    fn test_capped() {
        assert_eq!(backoff_delay(20), Duration::from_millis(5_000));
        assert_eq!(backoff_delay(u32::MAX), Duration::from_millis(5_000));
    }

    #[test]
    fn test_never_exceeds_cap_and_never_shrinks() {
        let mut previous = Duration::ZERO;
        for attempt in 1..500 {
            let delay = backoff_delay(attempt);
            assert!(delay <= Duration::from_millis(5_000));
            assert!(delay >= previous, "attempt {} shrank", attempt);
            previous = delay;
        }
    }
}
