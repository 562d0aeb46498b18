//! Duration distributions for inter-arrival gaps and service times
//!
//! A [`Dist`] is plain configuration data: it carries no random state and is
//! sampled through the simulation's [`RandomProvider`]. Sampled durations are
//! bounded below at zero; a negative Gaussian draw is clamped rather than
//! rejected, and the clamp is reported back to the caller.

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, SimError};
use crate::randomness::RandomProvider;
use crate::time::SimTime;

fn default_sd() -> f64 {
    1.0
}

/// Distribution of a duration, in simulated time units
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Dist {
    /// Always the same duration
    Constant { value: f64 },
    /// Gaussian, clamped below at zero. The standard deviation defaults to 1.
    Normal {
        mean: f64,
        #[serde(default = "default_sd")]
        sd: f64,
    },
    /// Exponential with the given rate (events per time unit)
    Exponential { rate: f64 },
    /// Uniform over `[low, high)`
    Uniform { low: f64, high: f64 },
}

/// Result of sampling a duration
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub duration: SimTime,
    /// The raw draw was negative and got clamped to zero
    pub clamped: bool,
}

impl Dist {
    pub fn constant(value: f64) -> Self {
        Dist::Constant { value }
    }

    pub fn normal(mean: f64, sd: f64) -> Self {
        Dist::Normal { mean, sd }
    }

    pub fn exponential(rate: f64) -> Self {
        Dist::Exponential { rate }
    }

    pub fn uniform(low: f64, high: f64) -> Self {
        Dist::Uniform { low, high }
    }

    /// Check the parameters. `context` names the owner in the error message.
    pub fn validate(&self, context: &str) -> Result<(), ConfigError> {
        let invalid = |reason: String| ConfigError::InvalidDistribution {
            context: context.to_string(),
            reason,
        };
        match *self {
            Dist::Constant { value } => {
                if !value.is_finite() || value < 0.0 {
                    return Err(invalid(format!("constant must be finite and >= 0, got {value}")));
                }
            }
            Dist::Normal { mean, sd } => {
                if !mean.is_finite() {
                    return Err(invalid(format!("mean must be finite, got {mean}")));
                }
                if !sd.is_finite() || sd < 0.0 {
                    return Err(invalid(format!("sd must be finite and >= 0, got {sd}")));
                }
            }
            Dist::Exponential { rate } => {
                if !rate.is_finite() || rate <= 0.0 {
                    return Err(invalid(format!("rate must be finite and > 0, got {rate}")));
                }
            }
            Dist::Uniform { low, high } => {
                if !low.is_finite() || !high.is_finite() || low < 0.0 || low >= high {
                    return Err(invalid(format!("need 0 <= low < high, got [{low}, {high})")));
                }
            }
        }
        // draws past this cannot be scheduled
        let scale = self.scale();
        if scale > SimTime::MAX_SECS {
            return Err(invalid(format!(
                "durations around {scale} exceed the largest time {}",
                SimTime::MAX_SECS
            )));
        }
        Ok(())
    }

    /// Typical size of a draw: the value, mean plus one deviation, or upper bound
    fn scale(&self) -> f64 {
        match *self {
            Dist::Constant { value } => value,
            Dist::Normal { mean, sd } => mean.abs() + sd,
            Dist::Exponential { rate } => 1.0 / rate,
            Dist::Uniform { high, .. } => high,
        }
    }

    /// Like [`Dist::validate`], and additionally requires a positive mean so a
    /// generator cannot produce an unbounded burst of arrivals at one instant.
    pub fn validate_interarrival(&self, context: &str) -> Result<(), ConfigError> {
        self.validate(context)?;
        if self.mean() <= 0.0 {
            return Err(ConfigError::InvalidDistribution {
                context: context.to_string(),
                reason: format!("inter-arrival mean must be > 0, got {}", self.mean()),
            });
        }
        Ok(())
    }

    /// Mean of the unclamped distribution
    pub fn mean(&self) -> f64 {
        match *self {
            Dist::Constant { value } => value,
            Dist::Normal { mean, .. } => mean,
            Dist::Exponential { rate } => 1.0 / rate,
            Dist::Uniform { low, high } => (low + high) / 2.0,
        }
    }

    /// Raw draw, possibly negative for a Gaussian
    pub fn sample_raw(&self, rng: &mut dyn RandomProvider) -> f64 {
        match *self {
            Dist::Constant { value } => value,
            Dist::Normal { mean, sd } => mean + sd * rng.standard_normal(),
            Dist::Exponential { rate } => rng.standard_exponential() / rate,
            Dist::Uniform { low, high } => low + (high - low) * rng.unit(),
        }
    }

    /// Draw a duration, clamping negative draws to zero
    pub fn sample(&self, rng: &mut dyn RandomProvider) -> Result<Sample, SimError> {
        let raw = self.sample_raw(rng);
        let clamped = raw < 0.0;
        let duration = SimTime::try_from_secs_f64(raw.max(0.0))?;
        Ok(Sample { duration, clamped })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::randomness::SeededRandom;

    /// Provider returning fixed draws, for exact arithmetic checks
    struct Fixed(f64);

    impl RandomProvider for Fixed {
        fn standard_normal(&mut self) -> f64 {
            self.0
        }
        fn standard_exponential(&mut self) -> f64 {
            self.0
        }
        fn unit(&mut self) -> f64 {
            self.0
        }
    }

    #[test]
    fn test_constant_sample() {
        let mut rng = SeededRandom::new(0);
        let s = Dist::constant(2.5).sample(&mut rng).unwrap();
        assert_eq!(s.duration, SimTime::from_millis(2500));
        assert!(!s.clamped);
    }

    #[test]
    fn test_normal_uses_mean_and_sd() {
        let s = Dist::normal(10.0, 2.0).sample(&mut Fixed(1.5)).unwrap();
        assert_eq!(s.duration, SimTime::from_secs(13));
    }

    #[test]
    fn test_negative_normal_draw_is_clamped() {
        let s = Dist::normal(1.0, 1.0).sample(&mut Fixed(-3.0)).unwrap();
        assert_eq!(s.duration, SimTime::zero());
        assert!(s.clamped);
    }

    #[test]
    fn test_exponential_and_uniform_scaling() {
        let s = Dist::exponential(4.0).sample(&mut Fixed(2.0)).unwrap();
        assert_eq!(s.duration, SimTime::from_millis(500));
        let s = Dist::uniform(2.0, 6.0).sample(&mut Fixed(0.25)).unwrap();
        assert_eq!(s.duration, SimTime::from_secs(3));
    }

    #[test]
    fn test_normal_sample_mean_is_close() {
        let mut rng = SeededRandom::new(11);
        let dist = Dist::normal(10.0, 1.0);
        let n = 5000;
        let total: f64 = (0..n)
            .map(|_| dist.sample(&mut rng).unwrap().duration.as_secs_f64())
            .sum();
        let mean = total / n as f64;
        assert!((mean - 10.0).abs() < 0.1, "mean was {mean}");
    }

    #[test]
    fn test_validation() {
        assert!(Dist::normal(5.0, 1.0).validate("x").is_ok());
        assert!(Dist::normal(5.0, -1.0).validate("x").is_err());
        assert!(Dist::normal(f64::NAN, 1.0).validate("x").is_err());
        assert!(Dist::exponential(0.0).validate("x").is_err());
        assert!(Dist::uniform(3.0, 3.0).validate("x").is_err());
        assert!(Dist::constant(-1.0).validate("x").is_err());
        assert!(Dist::constant(0.0).validate("x").is_ok());
        assert!(Dist::constant(0.0).validate_interarrival("gen").is_err());
        assert!(Dist::normal(-2.0, 1.0).validate_interarrival("gen").is_err());
    }

    #[test]
    fn test_durations_beyond_time_range_are_rejected() {
        assert!(Dist::normal(1e11, 1.0).validate("timeout").is_err());
        assert!(Dist::normal(0.0, 1e11).validate("timeout").is_err());
        assert!(Dist::constant(2e10).validate("timeout").is_err());
        assert!(Dist::uniform(0.0, 1e12).validate("timeout").is_err());
        assert!(Dist::exponential(1e-11).validate("timeout").is_err());
        // large but representable
        assert!(Dist::normal(1e9, 1.0).validate("timeout").is_ok());
        assert!(Dist::exponential(1e-9).validate("timeout").is_ok());
    }

    #[test]
    fn test_normal_sd_defaults_to_one() {
        let dist: Dist = serde_json::from_str(r#"{"type":"normal","mean":5.0}"#).unwrap();
        assert_eq!(dist, Dist::normal(5.0, 1.0));
        let dist: Dist = serde_json::from_str(r#"{"type":"exponential","rate":0.1}"#).unwrap();
        assert_eq!(dist.mean(), 10.0);
    }
}
