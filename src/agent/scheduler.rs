//! Jittered dwell scheduling between check-ins.
//!
//! Dwell intervals are drawn from an exponential distribution so that
//! check-ins do not fall on a fixed period. The mean can be changed at any
//! time by a configure task; the new value applies to every later draw.

use std::fmt;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::ConfigError;

/// Mean dwell in seconds. Always finite and strictly positive.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct MeanDwell(f64);

impl MeanDwell {
    /// Validate a mean dwell in seconds.
    pub fn new(seconds: f64) -> Result<Self, ConfigError> {
        if seconds.is_finite() && seconds > 0.0 {
            Ok(Self(seconds))
        } else {
            Err(ConfigError::InvalidMeanDwell { value: seconds })
        }
    }

    /// The mean in seconds.
    pub fn as_secs_f64(&self) -> f64 {
        self.0
    }
}

impl Default for MeanDwell {
    fn default() -> Self {
        Self(1.0)
    }
}

impl fmt::Display for MeanDwell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Draws randomized dwell intervals.
///
/// Each scheduler owns its own generator seeded from OS entropy, so two
/// agents in the same process never share a sequence.
pub struct DwellScheduler {
    mean_dwell: MeanDwell,
    rng: StdRng,
}

impl DwellScheduler {
    /// Create a scheduler seeded from OS entropy.
    pub fn new(mean_dwell: MeanDwell) -> Self {
        Self {
            mean_dwell,
            rng: StdRng::from_entropy(),
        }
    }

    /// Create a scheduler with a fixed seed. Draws are reproducible.
    pub fn with_seed(mean_dwell: MeanDwell, seed: u64) -> Self {
        Self {
            mean_dwell,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Current mean dwell.
    pub fn mean_dwell(&self) -> MeanDwell {
        self.mean_dwell
    }

    /// Rate parameter of the distribution (1 / mean).
    pub fn rate(&self) -> f64 {
        1.0 / self.mean_dwell.0
    }

    /// Replace the mean for all subsequent draws.
    pub fn set_mean_dwell(&mut self, mean_dwell: MeanDwell) {
        tracing::debug!(
            old = self.mean_dwell.0,
            new = mean_dwell.0,
            "Updated mean dwell"
        );
        self.mean_dwell = mean_dwell;
    }

    /// Draw the next dwell interval.
    pub fn next_dwell(&mut self) -> Duration {
        // Inverse transform: u in [0, 1) keeps 1 - u in (0, 1], so the log is
        // finite and non-positive.
        let u: f64 = self.rng.r#gen();
        let seconds = -(1.0 - u).ln() * self.mean_dwell.0;
        Duration::try_from_secs_f64(seconds).unwrap_or(Duration::MAX)
    }
}

impl fmt::Debug for DwellScheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DwellScheduler")
            .field("mean_dwell", &self.mean_dwell)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean_dwell_rejects_non_positive() {
        assert!(MeanDwell::new(0.0).is_err());
        assert!(MeanDwell::new(-3.5).is_err());
        assert!(MeanDwell::new(f64::NAN).is_err());
        assert!(MeanDwell::new(f64::INFINITY).is_err());
        assert_eq!(MeanDwell::new(2.5).unwrap().as_secs_f64(), 2.5);
    }

    #[test]
    fn test_set_mean_dwell_changes_rate() {
        let mut scheduler = DwellScheduler::new(MeanDwell::new(2.0).unwrap());
        assert_eq!(scheduler.rate(), 0.5);

        scheduler.set_mean_dwell(MeanDwell::new(0.25).unwrap());
        assert_eq!(scheduler.rate(), 4.0);
        assert_eq!(scheduler.mean_dwell().as_secs_f64(), 0.25);

        for _ in 0..1000 {
            assert!(scheduler.next_dwell() >= Duration::ZERO);
        }
    }

    #[test]
    fn test_sample_mean_tracks_configured_mean() {
        let mut scheduler = DwellScheduler::with_seed(MeanDwell::new(3.0).unwrap(), 7);
        let n = 20_000;
        let total: f64 = (0..n).map(|_| scheduler.next_dwell().as_secs_f64()).sum();
        let sample_mean = total / n as f64;
        assert!(
            (2.7..3.3).contains(&sample_mean),
            "sample mean {sample_mean} too far from 3.0"
        );
    }

    #[test]
    fn test_seeded_schedulers_are_reproducible() {
        let mean = MeanDwell::new(1.0).unwrap();
        let mut a = DwellScheduler::with_seed(mean, 42);
        let mut b = DwellScheduler::with_seed(mean, 42);
        for _ in 0..16 {
            assert_eq!(a.next_dwell(), b.next_dwell());
        }
    }

    #[test]
    fn test_huge_mean_saturates() {
        let mut scheduler = DwellScheduler::with_seed(MeanDwell::new(f64::MAX).unwrap(), 1);
        // Must not panic.
        let _ = scheduler.next_dwell();
    }
}
