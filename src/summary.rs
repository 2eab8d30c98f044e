//! Posterior point estimates

use crate::data::SortedArray;
use crate::ephemeris::Ephemeris;
use crate::error::TransitFitError;
use crate::model::orbit::{as_from_rhop, i_from_ba, t14, t23};
use crate::nl_fit::runner::PosteriorSamples;

use ndarray::{Array1, ArrayView1};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Names of the parameters derived from every posterior sample
pub const DERIVED_PARAMETERS: [&str; 5] = ["k", "a", "inc", "t14", "t23"];

/// Median and standard deviation of a posterior marginal
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ParameterEstimate {
    pub med: f64,
    pub err: f64,
}

impl ParameterEstimate {
    /// NaN samples are skipped, the standard deviation uses one delta degree of freedom
    pub fn from_samples(samples: ArrayView1<f64>) -> Self {
        let finite: Vec<f64> = samples.iter().copied().filter(|x| !x.is_nan()).collect();
        let med = match finite.len() {
            0 => f64::NAN,
            _ => SortedArray::new(finite.clone()).median(),
        };
        let err = match finite.len() {
            0 | 1 => f64::NAN,
            _ => Array1::from(finite).std(1.0),
        };
        Self { med, err }
    }

    pub fn is_finite(&self) -> bool {
        self.med.is_finite() && self.err.is_finite()
    }
}

/// Per-parameter estimates of the fitted and the derived parameters
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct PosteriorSummary {
    estimates: Vec<(String, ParameterEstimate)>,
}

impl PosteriorSummary {
    pub fn new(estimates: Vec<(String, ParameterEstimate)>) -> Self {
        Self { estimates }
    }

    /// Summarise the samples and the derived `k`, `a`, `inc`, `t14` and `t23`
    pub fn from_samples(samples: &PosteriorSamples) -> Result<Self, TransitFitError> {
        let mut estimates: Vec<_> = samples
            .names()
            .iter()
            .zip(samples.values().columns())
            .map(|(name, column)| (name.clone(), ParameterEstimate::from_samples(column)))
            .collect();

        let p = samples.column("p")?;
        let rho = samples.column("rho")?;
        let b = samples.column("b")?;
        let k2 = samples.column("k2")?;
        let k = k2.mapv(f64::sqrt);
        let a = ndarray::Zip::from(&rho)
            .and(&p)
            .map_collect(|&rho, &p| as_from_rhop(rho, p));
        let inc = ndarray::Zip::from(&b)
            .and(&a)
            .map_collect(|&b, &a| i_from_ba(b, a));
        let duration = |f: fn(f64, f64, f64, f64) -> f64| {
            ndarray::Zip::from(&p)
                .and(&k)
                .and(&a)
                .and(&inc)
                .map_collect(|&p, &k, &a, &inc| f(p, k, a, inc))
        };
        let (t14, t23) = (duration(t14), duration(t23));
        for (name, values) in DERIVED_PARAMETERS.iter().zip([&k, &a, &inc, &t14, &t23]) {
            estimates.push((
                (*name).to_owned(),
                ParameterEstimate::from_samples(values.view()),
            ));
        }
        Ok(Self { estimates })
    }

    pub fn get(&self, name: &str) -> Result<ParameterEstimate, TransitFitError> {
        self.estimates
            .iter()
            .find(|(n, _)| n == name)
            .map(|&(_, estimate)| estimate)
            .ok_or_else(|| TransitFitError::UnknownParameter(name.to_owned()))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParameterEstimate)> {
        self.estimates.iter().map(|(name, e)| (name.as_str(), e))
    }

    /// Planet disk crosses the stellar limb at mid-transit
    pub fn is_grazing(&self) -> Result<bool, TransitFitError> {
        Ok(self.get("b")?.med + self.get("k")?.med > 1.0)
    }

    /// Ephemeris refined by the fit: `tc`, `p`, `t14` and `k2` medians
    pub fn ephemeris(&self) -> Result<Ephemeris, TransitFitError> {
        Ephemeris::new(
            self.get("p")?.med,
            self.get("tc")?.med,
            self.get("t14")?.med,
            self.get("k2")?.med,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;
    use ndarray::array;

    #[test]
    fn estimate_of_samples() {
        let estimate = ParameterEstimate::from_samples(array![1.0, 2.0, 3.0, 4.0, f64::NAN].view());
        assert_relative_eq!(estimate.med, 2.5);
        // numpy.std([1, 2, 3, 4], ddof=1)
        assert_relative_eq!(estimate.err, 1.2909944487358056, epsilon = 1e-12);
        let single = ParameterEstimate::from_samples(array![1.0].view());
        assert_eq!(single.med, 1.0);
        assert!(!single.is_finite());
    }

    fn samples(b: f64) -> PosteriorSamples {
        let names = ["tc", "p", "rho", "b", "k2"].map(String::from).to_vec();
        let values = array![
            [2.0, 3.5, 1.4, b, 0.01],
            [2.001, 3.5001, 1.5, b, 0.0101],
            [1.999, 3.4999, 1.3, b, 0.0099],
        ];
        PosteriorSamples::new(names, values).unwrap()
    }

    #[test]
    fn derived_parameters() {
        let summary = PosteriorSummary::from_samples(&samples(0.2)).unwrap();
        assert_relative_eq!(summary.get("k").unwrap().med, 0.1);
        assert_relative_eq!(summary.get("a").unwrap().med, as_from_rhop(1.4, 3.5));
        assert!(summary.get("t14").unwrap().med > summary.get("t23").unwrap().med);
        assert!(!summary.is_grazing().unwrap());
        let ephemeris = summary.ephemeris().unwrap();
        assert_eq!(ephemeris.zero_epoch, 2.0);
        assert_eq!(ephemeris.depth, 0.01);
    }

    #[test]
    fn grazing_transit() {
        let summary = PosteriorSummary::from_samples(&samples(0.95)).unwrap();
        assert!(summary.is_grazing().unwrap());
        assert!(summary.get("t23").unwrap().med.is_nan());
        assert!(summary.get("t14").unwrap().med.is_finite());
    }

    #[test]
    fn unknown_parameter() {
        let summary = PosteriorSummary::from_samples(&samples(0.2)).unwrap();
        assert_eq!(
            summary.get("foo"),
            Err(TransitFitError::UnknownParameter("foo".into()))
        );
    }
}
