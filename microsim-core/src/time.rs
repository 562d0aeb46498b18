//! Simulation time management

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Sub};
use std::time::Duration;

use crate::error::SimError;

const NANOS_PER_UNIT: f64 = 1_000_000_000.0;

/// Simulation time with nanosecond precision
///
/// One simulated time unit is one second: `SimTime::from_secs(4000)` is the
/// horizon `until = 4000` of a run. Time is stored as integer nanoseconds so
/// event ordering never depends on floating point comparisons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SimTime(u64);

impl SimTime {
    /// Largest value accepted by [`SimTime::try_from_secs_f64`], about 584 years
    pub const MAX_SECS: f64 = (u64::MAX as f64) / NANOS_PER_UNIT;

    /// Time zero, the start of every run
    pub const fn zero() -> Self {
        SimTime(0)
    }

    /// Latest representable time
    pub const fn max() -> Self {
        SimTime(u64::MAX)
    }

    pub const fn from_nanos(nanos: u64) -> Self {
        SimTime(nanos)
    }

    pub const fn from_millis(millis: u64) -> Self {
        SimTime(millis * 1_000_000)
    }

    pub const fn from_secs(secs: u64) -> Self {
        SimTime(secs * 1_000_000_000)
    }

    /// Create a SimTime from fractional time units.
    ///
    /// Fails with [`SimError::InvalidTime`] for negative, NaN, infinite or
    /// unrepresentably large values.
    pub fn try_from_secs_f64(secs: f64) -> Result<Self, SimError> {
        if !secs.is_finite() || secs < 0.0 || secs > Self::MAX_SECS {
            return Err(SimError::InvalidTime(secs));
        }
        Ok(SimTime((secs * NANOS_PER_UNIT).round() as u64))
    }

    pub const fn as_nanos(&self) -> u64 {
        self.0
    }

    /// Time in fractional units, the representation used by monitor output
    pub fn as_secs_f64(&self) -> f64 {
        self.0 as f64 / NANOS_PER_UNIT
    }

    pub fn as_duration(&self) -> Duration {
        Duration::from_nanos(self.0)
    }

    /// Elapsed time since `earlier`, saturating at zero
    pub fn duration_since(&self, earlier: SimTime) -> SimTime {
        SimTime(self.0.saturating_sub(earlier.0))
    }
}

impl Add<SimTime> for SimTime {
    type Output = SimTime;

    fn add(self, rhs: SimTime) -> Self::Output {
        SimTime(self.0.saturating_add(rhs.0))
    }
}

impl Sub<SimTime> for SimTime {
    type Output = SimTime;

    fn sub(self, rhs: SimTime) -> Self::Output {
        self.duration_since(rhs)
    }
}

impl Default for SimTime {
    fn default() -> Self {
        SimTime::zero()
    }
}

impl TryFrom<f64> for SimTime {
    type Error = SimError;

    fn try_from(secs: f64) -> Result<Self, Self::Error> {
        SimTime::try_from_secs_f64(secs)
    }
}

impl fmt::Display for SimTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "t={:.3}", self.as_secs_f64())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simtime_creation() {
        assert_eq!(SimTime::zero().as_nanos(), 0);
        assert_eq!(SimTime::from_nanos(1000).as_nanos(), 1000);
        assert_eq!(SimTime::from_millis(1).as_nanos(), 1_000_000);
        assert_eq!(SimTime::from_secs(1).as_nanos(), 1_000_000_000);
    }

    #[test]
    fn test_simtime_arithmetic() {
        let t1 = SimTime::from_millis(100);
        let t2 = SimTime::from_millis(50);

        assert_eq!(t1 + t2, SimTime::from_millis(150));
        assert_eq!(t1 - t2, SimTime::from_millis(50));
        // saturates instead of wrapping
        assert_eq!(t2 - t1, SimTime::zero());
        assert_eq!(SimTime::max() + t1, SimTime::max());
    }

    #[test]
    fn test_simtime_from_f64() {
        assert_eq!(SimTime::try_from(1.0).unwrap().as_nanos(), 1_000_000_000);
        assert_eq!(SimTime::try_from(0.5).unwrap().as_nanos(), 500_000_000);
        assert_eq!(SimTime::try_from(10.25).unwrap().as_secs_f64(), 10.25);
        assert_eq!(SimTime::try_from(0.0).unwrap(), SimTime::zero());
    }

    #[test]
    fn test_simtime_rejects_bad_f64() {
        assert!(matches!(SimTime::try_from(-1.0), Err(SimError::InvalidTime(_))));
        assert!(SimTime::try_from(f64::NAN).is_err());
        assert!(SimTime::try_from(f64::INFINITY).is_err());
        assert!(SimTime::try_from(1e300).is_err());
    }

    #[test]
    fn test_simtime_display() {
        assert_eq!(SimTime::from_millis(4_000_500).to_string(), "t=4000.500");
    }
}
