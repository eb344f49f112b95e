//! Retry pacing for report delivery.

use std::time::Duration;

use rand::Rng;

use crate::config::ReporterConfig;

/// Doubling delay between delivery retries, capped and jittered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Backoff {
    base: Duration,
    max: Duration,
}

impl Backoff {
    pub fn new(base: Duration, max: Duration) -> Self {
        Self { base, max }
    }

    pub fn from_config(config: &ReporterConfig) -> Self {
        Self::new(
            Duration::from_millis(config.base_delay_ms),
            Duration::from_millis(config.max_delay_ms),
        )
    }

    /// Delay before `retry` (1-based). The first retry waits `base`, each
    /// later one twice as long until `max`; up to 10% is added on top.
    pub fn delay(&self, retry: u32) -> Duration {
        let factor = 1u32.checked_shl(retry.saturating_sub(1)).unwrap_or(u32::MAX);
        let capped = self.base.saturating_mul(factor).min(self.max);

        let spread = capped / 10;
        if spread.is_zero() {
            return capped;
        }
        capped + rand::thread_rng().gen_range(Duration::ZERO..spread)
    }
}
