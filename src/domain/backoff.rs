//! Bounded exponential backoff policy for the convergence loop.

use std::time::Duration;

/// How much randomness to apply to each computed delay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Jitter {
    /// Use the exponential delay as-is.
    None,
    /// Pick uniformly in `[0, delay]`.
    Full,
}

/// Retry budget and delay curve.
///
/// Delay before retry `n` (0-indexed) is
/// `min(initial_delay * multiplier^n, max_delay)`, then jittered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackoffPolicy {
    pub max_attempts: u32,
    pub initial_delay: Duration,
    pub max_delay: Duration,
    pub multiplier: u32,
    pub jitter: Jitter,
}

impl Default for BackoffPolicy {
    /// 10 attempts, 100 ms doubling up to 4 s, full jitter.
    fn default() -> Self {
        Self {
            max_attempts: 10,
            initial_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(4),
            multiplier: 2,
            jitter: Jitter::Full,
        }
    }
}

impl BackoffPolicy {
    /// Override the attempt budget and delay cap, keeping the rest.
    #[must_use]
    pub fn with_limits(max_attempts: u32, max_delay: Duration) -> Self {
        Self {
            max_attempts,
            max_delay,
            ..Self::default()
        }
    }

    /// Delay before retry `attempt` without jitter.
    #[must_use]
    pub fn base_delay(&self, attempt: u32) -> Duration {
        let initial = u64::try_from(self.initial_delay.as_millis()).unwrap_or(u64::MAX);
        let cap = u64::try_from(self.max_delay.as_millis()).unwrap_or(u64::MAX);
        let factor = u64::from(self.multiplier).saturating_pow(attempt);
        Duration::from_millis(initial.saturating_mul(factor).min(cap))
    }

    /// Delay before retry `attempt`, jittered with the caller's entropy.
    #[must_use]
    pub fn delay(&self, attempt: u32, entropy: u64) -> Duration {
        let base = self.base_delay(attempt);
        match self.jitter {
            Jitter::None => base,
            Jitter::Full => {
                let ms = u64::try_from(base.as_millis()).unwrap_or(u64::MAX);
                Duration::from_millis(entropy % ms.saturating_add(1))
            }
        }
    }
}

/// Cheap per-call entropy for jitter.
///
/// Sources: nanosecond timestamp and a fresh `RandomState` hash.
#[must_use]
pub fn entropy() -> u64 {
    use std::collections::hash_map::RandomState;
    use std::hash::{BuildHasher, Hasher};

    let mut hasher = RandomState::new().build_hasher();
    hasher.write_u128(
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or(0),
    );
    hasher.finish()
}
