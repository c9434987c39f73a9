use rand::Rng;

#[derive(Debug, Clone)]
pub(crate) struct RetryPolicy {
    pub(crate) median_first_delay: std::time::Duration,
    pub(crate) max_delay: std::time::Duration,
    /// Total attempts, the first request included.
    pub(crate) max_attempts: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            median_first_delay: std::time::Duration::from_secs(1),
            max_delay: std::time::Duration::from_secs(30),
            max_attempts: 5,
        }
    }
}

impl RetryPolicy {
    pub(crate) fn backoff(&self) -> DecorrelatedJitter {
        DecorrelatedJitter::new(self)
    }
}

/// Decorrelated jitter: every delay is drawn uniformly from
/// `[base, 3 * previous delay]` and capped at `max_delay`. The first draw is
/// from `[base, 3 * base]`, so `base` is half of the wanted median.
#[derive(Debug, Clone)]
pub(crate) struct DecorrelatedJitter {
    base: std::time::Duration,
    cap: std::time::Duration,
    previous: std::time::Duration,
    max_retries: u32,
    retries_left: u32,
}

impl DecorrelatedJitter {
    fn new(policy: &RetryPolicy) -> Self {
        let base = policy.median_first_delay / 2;
        let max_retries = policy.max_attempts.saturating_sub(1);
        Self {
            base,
            cap: policy.max_delay.max(base),
            previous: base,
            max_retries,
            retries_left: max_retries,
        }
    }
}

impl backoff::backoff::Backoff for DecorrelatedJitter {
    fn reset(&mut self) {
        self.previous = self.base;
        self.retries_left = self.max_retries;
    }

    fn next_backoff(&mut self) -> Option<std::time::Duration> {
        if self.retries_left == 0 {
            return None;
        }
        self.retries_left -= 1;

        let low = self.base.as_millis() as u64;
        let high = (self.previous.as_millis() as u64).saturating_mul(3).max(low);
        let delay = std::time::Duration::from_millis(rand::thread_rng().gen_range(low..=high))
            .min(self.cap);

        self.previous = delay;
        Some(delay)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use backoff::backoff::Backoff;

    #[test]
    fn test_attempt_budget() {
        let mut backoff = RetryPolicy::default().backoff();

        // Five attempts means four waits between them.
        for _ in 0..4 {
            assert!(backoff.next_backoff().is_some());
        }
        assert_eq!(backoff.next_backoff(), None);

        backoff.reset();
        assert!(backoff.next_backoff().is_some());
    }

    #[test]
    fn test_single_attempt_never_retries() {
        let policy = RetryPolicy {
            max_attempts: 1,
            ..Default::default()
        };
        assert_eq!(policy.backoff().next_backoff(), None);
    }

    #[test]
    fn test_delays_stay_within_bounds() {
        let policy = RetryPolicy {
            median_first_delay: std::time::Duration::from_millis(1000),
            max_delay: std::time::Duration::from_millis(4000),
            max_attempts: 50,
        };

        for _ in 0..100 {
            let mut backoff = policy.backoff();

            let first = backoff.next_backoff().unwrap();
            assert!(first >= std::time::Duration::from_millis(500));
            assert!(first <= std::time::Duration::from_millis(1500));

            while let Some(delay) = backoff.next_backoff() {
                assert!(delay >= std::time::Duration::from_millis(500));
                assert!(delay <= std::time::Duration::from_millis(4000));
            }
        }
    }

    #[test]
    fn test_zero_delay_policy() {
        let policy = RetryPolicy {
            median_first_delay: std::time::Duration::ZERO,
            max_delay: std::time::Duration::ZERO,
            max_attempts: 3,
        };
        let mut backoff = policy.backoff();

        assert_eq!(backoff.next_backoff(), Some(std::time::Duration::ZERO));
        assert_eq!(backoff.next_backoff(), Some(std::time::Duration::ZERO));
        assert_eq!(backoff.next_backoff(), None);
    }
}
