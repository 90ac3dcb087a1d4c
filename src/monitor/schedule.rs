//! Jittered poll schedule.

use std::time::Duration;

use rand::Rng;

/// Delay policy between poll cycles.
///
/// Each delay is `base + offset`, with `offset` drawn uniformly from
/// `[jitter_min, jitter_max]` seconds and recomputed before every sleep.
/// Delays never go below zero.
///
/// # Defaults
///
/// - `base`: 420 seconds
/// - `jitter`: -10 to +60 seconds
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollSchedule {
    base: Duration,
    jitter_min_secs: i64,
    jitter_max_secs: i64,
}

impl PollSchedule {
    /// Default base interval (420 seconds).
    pub const DEFAULT_BASE: Duration = Duration::from_secs(420);

    /// Default lower jitter bound in seconds.
    pub const DEFAULT_JITTER_MIN_SECS: i64 = -10;

    /// Default upper jitter bound in seconds.
    pub const DEFAULT_JITTER_MAX_SECS: i64 = 60;

    /// Creates a schedule with the given base and default jitter.
    #[must_use]
    pub const fn new(base: Duration) -> Self {
        Self {
            base,
            jitter_min_secs: Self::DEFAULT_JITTER_MIN_SECS,
            jitter_max_secs: Self::DEFAULT_JITTER_MAX_SECS,
        }
    }

    /// Sets the jitter bounds in seconds. Bounds given in reverse are swapped.
    #[must_use]
    pub const fn with_jitter(mut self, min_secs: i64, max_secs: i64) -> Self {
        if min_secs <= max_secs {
            self.jitter_min_secs = min_secs;
            self.jitter_max_secs = max_secs;
        } else {
            self.jitter_min_secs = max_secs;
            self.jitter_max_secs = min_secs;
        }
        self
    }

    /// Returns the base interval.
    #[must_use]
    pub const fn base(&self) -> Duration {
        self.base
    }

    /// Returns the jitter bounds in seconds as `(min, max)`.
    #[must_use]
    pub const fn jitter(&self) -> (i64, i64) {
        (self.jitter_min_secs, self.jitter_max_secs)
    }

    /// Draws the next delay using the thread-local RNG.
    #[must_use]
    pub fn next_delay(&self) -> Duration {
        self.next_delay_with(&mut rand::rng())
    }

    /// Draws the next delay from `rng`.
    pub fn next_delay_with<R: Rng>(&self, rng: &mut R) -> Duration {
        let offset_ms = rng.random_range(self.jitter_min_secs..=self.jitter_max_secs) * 1000;
        let base_ms = i64::try_from(self.base.as_millis()).unwrap_or(i64::MAX);
        let total_ms = base_ms.saturating_add(offset_ms).max(0);

        Duration::from_millis(total_ms.unsigned_abs())
    }
}

impl Default for PollSchedule {
    fn default() -> Self {
        Self::new(Self::DEFAULT_BASE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn default_is_420s_with_minus_10_plus_60_jitter() {
        let schedule = PollSchedule::default();

        assert_eq!(schedule.base(), Duration::from_secs(420));
        assert_eq!(schedule.jitter(), (-10, 60));
    }

    #[test]
    fn delays_stay_within_jitter_bounds() {
        let schedule = PollSchedule::default();
        let mut rng = StdRng::seed_from_u64(7);

        for _ in 0..500 {
            let delay = schedule.next_delay_with(&mut rng);
            assert!(delay >= Duration::from_secs(410), "{delay:?}");
            assert!(delay <= Duration::from_secs(480), "{delay:?}");
        }
    }

    #[test]
    fn delays_vary_between_draws() {
        let schedule = PollSchedule::default();
        let mut rng = StdRng::seed_from_u64(11);

        let delays: std::collections::HashSet<Duration> =
            (0..50).map(|_| schedule.next_delay_with(&mut rng)).collect();

        assert!(delays.len() > 1);
    }

    #[test]
    fn delay_never_negative() {
        let schedule = PollSchedule::new(Duration::from_secs(2)).with_jitter(-30, -20);
        let mut rng = StdRng::seed_from_u64(3);

        assert_eq!(schedule.next_delay_with(&mut rng), Duration::ZERO);
    }

    #[test]
    fn zero_width_jitter_is_exact() {
        let schedule = PollSchedule::new(Duration::from_secs(60)).with_jitter(0, 0);

        assert_eq!(schedule.next_delay(), Duration::from_secs(60));
    }

    #[test]
    fn reversed_bounds_are_swapped() {
        let schedule = PollSchedule::default().with_jitter(60, -10);

        assert_eq!(schedule.jitter(), (-10, 60));
    }
}
