use enum_dispatch::enum_dispatch;
use rand::{Rng, RngCore};
use rand_distr::StandardNormal;
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

#[enum_dispatch]
pub trait LnPrior1DTrait: Clone + Debug + Serialize + DeserializeOwned + PartialEq {
    /// Evaluate the natural logarithm of the prior at x
    fn ln_prior_1d(&self, x: f64) -> f64;

    /// Characteristic location and scale of the prior, `None` if the prior is improper
    fn location_scale(&self) -> Option<(f64, f64)>;

    /// Draw a value from the prior, `None` if the prior is improper
    fn sample(&self, rng: &mut dyn RngCore) -> Option<f64>;

    /// Check that prior parameters describe a proper distribution
    fn validate(&self) -> Result<(), &'static str>;
}

/// Natural logarithm of prior for a single model parameter
#[enum_dispatch(LnPrior1DTrait)]
#[derive(Clone, Debug, Serialize, Deserialize, JsonSchema, PartialEq)]
#[non_exhaustive]
pub enum LnPrior1D {
    None(NoneLnPrior1D),
    Normal(NormalLnPrior1D),
    Uniform(UniformLnPrior1D),
}

impl LnPrior1D {
    pub fn none() -> Self {
        NoneLnPrior1D {}.into()
    }

    pub fn normal(mu: f64, std: f64) -> Self {
        NormalLnPrior1D::new(mu, std).into()
    }

    pub fn uniform(left: f64, right: f64) -> Self {
        UniformLnPrior1D::new(left, right).into()
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct NoneLnPrior1D {}

impl LnPrior1DTrait for NoneLnPrior1D {
    fn ln_prior_1d(&self, _x: f64) -> f64 {
        0.0
    }

    fn location_scale(&self) -> Option<(f64, f64)> {
        None
    }

    fn sample(&self, _rng: &mut dyn RngCore) -> Option<f64> {
        None
    }

    fn validate(&self) -> Result<(), &'static str> {
        Ok(())
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct NormalLnPrior1D {
    pub mu: f64,
    pub std: f64,
}

impl NormalLnPrior1D {
    pub fn new(mu: f64, std: f64) -> Self {
        Self { mu, std }
    }

    fn ln_prob_coeff(&self) -> f64 {
        -f64::ln(self.std) - 0.5 * f64::ln(std::f64::consts::TAU)
    }
}

impl LnPrior1DTrait for NormalLnPrior1D {
    fn ln_prior_1d(&self, x: f64) -> f64 {
        let diff = (self.mu - x) / self.std;
        self.ln_prob_coeff() - 0.5 * diff.powi(2)
    }

    fn location_scale(&self) -> Option<(f64, f64)> {
        Some((self.mu, self.std))
    }

    fn sample(&self, rng: &mut dyn RngCore) -> Option<f64> {
        let z: f64 = rng.sample(StandardNormal);
        Some(self.mu + self.std * z)
    }

    fn validate(&self) -> Result<(), &'static str> {
        if !self.mu.is_finite() {
            return Err("mu must be finite");
        }
        if !(self.std.is_finite() && self.std > 0.0) {
            return Err("std must be positive and finite");
        }
        Ok(())
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct UniformLnPrior1D {
    pub left: f64,
    pub right: f64,
}

impl UniformLnPrior1D {
    pub fn new(left: f64, right: f64) -> Self {
        Self { left, right }
    }
}

impl LnPrior1DTrait for UniformLnPrior1D {
    fn ln_prior_1d(&self, x: f64) -> f64 {
        if (self.left..=self.right).contains(&x) {
            -f64::ln(self.right - self.left)
        } else {
            f64::NEG_INFINITY
        }
    }

    fn location_scale(&self) -> Option<(f64, f64)> {
        Some((
            0.5 * (self.left + self.right),
            0.5 * (self.right - self.left),
        ))
    }

    fn sample(&self, rng: &mut dyn RngCore) -> Option<f64> {
        let u: f64 = rng.random();
        Some(self.left + (self.right - self.left) * u)
    }

    fn validate(&self) -> Result<(), &'static str> {
        if !(self.left.is_finite() && self.right.is_finite()) {
            return Err("limits must be finite");
        }
        if self.right <= self.left {
            return Err("right limit must be larger than left limit");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;
    use rand::prelude::*;

    #[test]
    fn normal_ln_prior() {
        let prior = LnPrior1D::normal(5.0, 2.0);
        // scipy.stats.norm(5, 2).logpdf([5, 7])
        assert_relative_eq!(prior.ln_prior_1d(5.0), -1.612085713764618, epsilon = 1e-12);
        assert_relative_eq!(prior.ln_prior_1d(7.0), -2.112085713764618, epsilon = 1e-12);
    }

    #[test]
    fn uniform_ln_prior() {
        let prior = LnPrior1D::uniform(0.0, 4.0);
        assert_relative_eq!(prior.ln_prior_1d(1.0), -f64::ln(4.0));
        assert_eq!(prior.ln_prior_1d(-1.0), f64::NEG_INFINITY);
        assert_eq!(prior.ln_prior_1d(f64::NAN), f64::NEG_INFINITY);
    }

    #[test]
    fn samples_are_within_support() {
        let mut rng = StdRng::seed_from_u64(0);
        let prior = LnPrior1D::uniform(0.5, 2.0);
        for _ in 0..100 {
            let x = prior.sample(&mut rng).unwrap();
            assert!(prior.ln_prior_1d(x).is_finite());
        }
        assert_eq!(LnPrior1D::none().sample(&mut rng), None);
    }

    #[test]
    fn validation() {
        assert!(LnPrior1D::normal(0.0, 0.0).validate().is_err());
        assert!(LnPrior1D::normal(f64::NAN, 1.0).validate().is_err());
        assert!(LnPrior1D::uniform(1.0, 1.0).validate().is_err());
        assert!(LnPrior1D::uniform(0.0, 1.0).validate().is_ok());
    }

    #[test]
    fn serde_round_trip() {
        let prior = LnPrior1D::normal(2.0, 0.01);
        let json = serde_json::to_string(&prior).unwrap();
        let restored: LnPrior1D = serde_json::from_str(&json).unwrap();
        assert_eq!(prior, restored);
    }
}
