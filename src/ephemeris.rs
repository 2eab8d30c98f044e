use crate::error::TransitFitError;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Approximate linear ephemeris of a periodic transit signal
///
/// All times are in days. `depth` is the fractional flux decrement and is used as the initial
/// guess of the planet-to-star area ratio.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Ephemeris {
    pub period: f64,
    pub zero_epoch: f64,
    pub duration: f64,
    pub depth: f64,
}

impl Ephemeris {
    pub fn new(
        period: f64,
        zero_epoch: f64,
        duration: f64,
        depth: f64,
    ) -> Result<Self, TransitFitError> {
        let ephemeris = Self {
            period,
            zero_epoch,
            duration,
            depth,
        };
        ephemeris.validate()?;
        Ok(ephemeris)
    }

    pub fn validate(&self) -> Result<(), TransitFitError> {
        if !(self.period.is_finite() && self.period > 0.0) {
            return Err(TransitFitError::InvalidEphemeris(
                "period must be positive and finite",
            ));
        }
        if !self.zero_epoch.is_finite() {
            return Err(TransitFitError::InvalidEphemeris("zero epoch must be finite"));
        }
        if !(self.duration.is_finite() && self.duration > 0.0) {
            return Err(TransitFitError::InvalidEphemeris(
                "duration must be positive and finite",
            ));
        }
        if !(0.0..1.0).contains(&self.depth) {
            return Err(TransitFitError::InvalidEphemeris(
                "depth must be in [0, 1) interval",
            ));
        }
        Ok(())
    }

    /// Integer epoch of the transit closest to `t`
    #[inline]
    pub fn epoch(&self, t: f64) -> i64 {
        epoch(t, self.zero_epoch, self.period)
    }

    /// Phase in `[0, period)` with the transit centre at `period / 2`
    #[inline]
    pub fn phase(&self, t: f64) -> f64 {
        fold(t, self.period, self.zero_epoch, 0.5) * self.period
    }
}

/// Epoch number of the transit nearest to `t`
///
/// Rounds `(t - zero_epoch) / period` to the nearest integer, ties go towards positive infinity:
/// `floor((t - zero_epoch) / period + 0.5)`.
#[inline]
pub fn epoch(t: f64, zero_epoch: f64, period: f64) -> i64 {
    #[allow(clippy::cast_possible_truncation)]
    {
        ((t - zero_epoch) / period + 0.5).floor() as i64
    }
}

/// Normalised phase in `[0, 1)`: `frac((t - origin) / period + shift)`
#[inline]
pub fn fold(t: f64, period: f64, origin: f64, shift: f64) -> f64 {
    ((t - origin) / period + shift).rem_euclid(1.0)
}
