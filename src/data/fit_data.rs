use crate::data::light_curve::ptp;
use crate::epoch_mask::MaskedObservations;

use ndarray::Array1;

/// Observations handed to the likelihood, with the reference time of the baseline model
#[derive(Clone, Debug)]
pub struct FitData {
    pub time: Array1<f64>,
    pub flux: Array1<f64>,
    pub epochs: Array1<i64>,
    /// `floor(min(time))`
    pub tref: f64,
    flux_ptp: f64,
}

impl FitData {
    pub fn new(observations: MaskedObservations) -> Self {
        let MaskedObservations { time, flux, epochs } = observations;
        let tref = time.iter().copied().fold(f64::INFINITY, f64::min).floor();
        let flux_ptp = ptp(flux.view());
        Self {
            time,
            flux,
            epochs,
            tref,
            flux_ptp,
        }
    }

    #[inline]
    pub fn lenu(&self) -> usize {
        self.time.len()
    }

    /// Peak-to-peak flux range
    #[inline]
    pub fn flux_ptp(&self) -> f64 {
        self.flux_ptp
    }
}

impl From<MaskedObservations> for FitData {
    fn from(observations: MaskedObservations) -> Self {
        Self::new(observations)
    }
}
