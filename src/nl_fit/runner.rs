use crate::data::SortedArray;
use crate::error::TransitFitError;
use crate::nl_fit::posterior::LnPosterior;

use ndarray::{Array2, ArrayView1, Axis};

/// Best parameter vector found by the global optimization
#[derive(Clone, Debug, PartialEq)]
pub struct OptimizationResult {
    pub x: Vec<f64>,
    pub ln_posterior: f64,
    pub success: bool,
}

/// Posterior samples, one row per sample and one named column per parameter
#[derive(Clone, Debug, PartialEq)]
pub struct PosteriorSamples {
    names: Vec<String>,
    values: Array2<f64>,
}

impl PosteriorSamples {
    /// At least one sample is required
    pub fn new(names: Vec<String>, values: Array2<f64>) -> Result<Self, TransitFitError> {
        TransitFitError::check_len("posterior sample row", values.ncols(), names.len())?;
        if values.nrows() == 0 {
            return Err(TransitFitError::Sampler("no posterior samples".into()));
        }
        Ok(Self { names, values })
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn values(&self) -> &Array2<f64> {
        &self.values
    }

    #[inline]
    pub fn nsamples(&self) -> usize {
        self.values.nrows()
    }

    pub fn column(&self, name: &str) -> Result<ArrayView1<'_, f64>, TransitFitError> {
        let i = self
            .names
            .iter()
            .position(|n| n == name)
            .ok_or_else(|| TransitFitError::UnknownParameter(name.to_owned()))?;
        Ok(self.values.column(i))
    }

    /// Column-wise median, the parameter vector used for the point-estimate model
    pub fn median_vector(&self) -> Vec<f64> {
        self.values
            .axis_iter(Axis(1))
            .map(|column| SortedArray::from(column).median())
            .collect()
    }
}

/// Global optimizer and posterior sampler behind the fit step
pub trait FitRunner {
    fn optimize(&self, posterior: &LnPosterior) -> Result<OptimizationResult, TransitFitError>;

    /// Sample the posterior starting around the optimization result
    fn sample(
        &self,
        posterior: &LnPosterior,
        start: &OptimizationResult,
    ) -> Result<PosteriorSamples, TransitFitError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    use ndarray::array;

    #[test]
    fn columns_by_name() {
        let samples = PosteriorSamples::new(
            vec!["tc".into(), "p".into()],
            array![[1.0, 3.0], [2.0, 3.5], [4.0, 3.25]],
        )
        .unwrap();
        assert_eq!(samples.nsamples(), 3);
        assert_eq!(samples.column("p").unwrap(), array![3.0, 3.5, 3.25]);
        assert_eq!(samples.median_vector(), vec![2.0, 3.25]);
        assert!(matches!(
            samples.column("k2"),
            Err(TransitFitError::UnknownParameter(_))
        ));
    }

    #[test]
    fn shape_is_checked() {
        let err = PosteriorSamples::new(vec!["tc".into()], array![[1.0, 2.0]]).unwrap_err();
        assert!(matches!(err, TransitFitError::ShapeMismatch { .. }));
    }

    #[test]
    fn no_samples() {
        let err = PosteriorSamples::new(vec!["tc".into()], Array2::zeros((0, 1))).unwrap_err();
        assert_eq!(err, TransitFitError::Sampler("no posterior samples".into()));
    }
}
