use crate::error::TransitFitError;

use itertools::{Itertools, MinMaxResult};
use ndarray::{Array1, ArrayView1};

/// Normalised photometric time series
///
/// `time` is in days and increases monotonically, `flux` is normalised to unity out of transit.
#[derive(Clone, Debug)]
pub struct LightCurve {
    pub time: Array1<f64>,
    pub flux: Array1<f64>,
}

impl LightCurve {
    /// Construct [LightCurve] from time and flux arrays of the same length
    pub fn new(
        time: impl Into<Array1<f64>>,
        flux: impl Into<Array1<f64>>,
    ) -> Result<Self, TransitFitError> {
        let time = time.into();
        let flux = flux.into();
        TransitFitError::check_len("flux", flux.len(), time.len())?;
        Ok(Self { time, flux })
    }

    #[inline]
    pub fn lenu(&self) -> usize {
        self.time.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }

    pub fn time(&self) -> ArrayView1<'_, f64> {
        self.time.view()
    }

    pub fn flux(&self) -> ArrayView1<'_, f64> {
        self.flux.view()
    }
}

/// Peak-to-peak range of a sample, zero for empty input
pub fn ptp(a: ArrayView1<f64>) -> f64 {
    match a.iter().minmax_by(|x, y| x.total_cmp(y)) {
        MinMaxResult::NoElements | MinMaxResult::OneElement(_) => 0.0,
        MinMaxResult::MinMax(min, max) => max - min,
    }
}
