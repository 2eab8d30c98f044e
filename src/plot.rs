//! Data behind the diagnostic plots of a transit fit

use crate::data::ptp;
use crate::error::TransitFitError;

use conv::prelude::*;
use itertools::Itertools;
use ndarray::{Array1, ArrayView1};
use unzip3::Unzip3;

const HOURS_PER_DAY: f64 = 24.0;
/// Half-width of the transit window plot, in units of T14
const WINDOW_T14: f64 = 1.5;

/// Equal-width bins of a curve, empty bins are dropped
#[derive(Clone, Debug, PartialEq)]
pub struct BinnedCurve {
    /// Mean abscissa of the bin members
    pub x: Array1<f64>,
    pub mean: Array1<f64>,
    /// Standard error of the mean, `std / sqrt(n)`
    pub err: Array1<f64>,
}

impl BinnedCurve {
    /// Bin `y` into `nbins` bins of width `ptp(x) / nbins`, `x` must be sorted
    pub fn new(x: ArrayView1<f64>, y: ArrayView1<f64>, nbins: usize) -> Self {
        let nbins = nbins.max(1);
        let x_min = x.first().copied().unwrap_or(0.0);
        let width = ptp(x) / nbins.approx_as::<f64>().unwrap_or(1.0);
        let last_bin = nbins - 1;
        let (bin_x, bin_mean, bin_err): (Vec<_>, Vec<_>, Vec<_>) = x
            .iter()
            .copied()
            .zip(y.iter().copied())
            .chunk_by(|&(x, _)| {
                if width > 0.0 {
                    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
                    let i = ((x - x_min) / width).floor() as usize;
                    i.min(last_bin)
                } else {
                    0
                }
            })
            .into_iter()
            .map(|(_, chunk)| {
                let (xs, ys): (Vec<f64>, Vec<f64>) = chunk.unzip();
                let n = xs.len() as f64;
                let x_mean = xs.iter().sum::<f64>() / n;
                let y_mean = ys.iter().sum::<f64>() / n;
                let y_std = (ys.iter().map(|y| (y - y_mean).powi(2)).sum::<f64>() / n).sqrt();
                (x_mean, y_mean, y_std / n.sqrt())
            })
            .unzip3();
        Self {
            x: bin_x.into(),
            mean: bin_mean.into(),
            err: bin_err.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }
}

/// Observed and model flux against the centred orbital phase [d], sorted by phase
#[derive(Clone, Debug, PartialEq)]
pub struct PhaseFoldedCurve {
    pub phase: Array1<f64>,
    pub observed: Array1<f64>,
    pub model: Array1<f64>,
}

impl PhaseFoldedCurve {
    pub fn new(
        phase: ArrayView1<f64>,
        observed: ArrayView1<f64>,
        model: ArrayView1<f64>,
    ) -> Result<Self, TransitFitError> {
        TransitFitError::check_len("observed flux", observed.len(), phase.len())?;
        TransitFitError::check_len("model flux", model.len(), phase.len())?;
        let order: Vec<usize> = (0..phase.len())
            .sorted_by(|&a, &b| phase[a].total_cmp(&phase[b]))
            .collect();
        let take = |a: ArrayView1<f64>| order.iter().map(|&i| a[i]).collect::<Array1<_>>();
        Ok(Self {
            phase: take(phase),
            observed: take(observed),
            model: take(model),
        })
    }

    pub fn len(&self) -> usize {
        self.phase.len()
    }

    pub fn is_empty(&self) -> bool {
        self.phase.is_empty()
    }

    /// Points around the transit, phase in hours
    ///
    /// `full_phase` keeps every point, otherwise only `|phase| < 1.5 t14` are kept. Binned
    /// observations are provided for transits longer than an hour.
    pub fn transit_window(&self, t14: f64, full_phase: bool, nbins: usize) -> TransitWindow {
        let keep: Vec<usize> = (0..self.len())
            .filter(|&i| full_phase || self.phase[i].abs() < WINDOW_T14 * t14)
            .collect();
        let take = |a: &Array1<f64>| keep.iter().map(|&i| a[i]).collect::<Array1<_>>();
        let phase = take(&self.phase);
        let observed = take(&self.observed);
        let binned = (t14 > 1.0 / HOURS_PER_DAY).then(|| {
            let mut binned = BinnedCurve::new(phase.view(), observed.view(), nbins);
            binned.x.mapv_inplace(|x| x * HOURS_PER_DAY);
            binned
        });
        let model_min = self.model.iter().copied().fold(f64::INFINITY, f64::min);
        TransitWindow {
            phase_hours: phase * HOURS_PER_DAY,
            observed,
            model: take(&self.model),
            binned,
            depth: 1.0 - model_min,
        }
    }

    /// Binned observations and binned model over the whole phase range
    pub fn folded_and_binned(&self, nbins: usize) -> FoldedAndBinned {
        FoldedAndBinned {
            observed: BinnedCurve::new(self.phase.view(), self.observed.view(), nbins),
            model: BinnedCurve::new(self.phase.view(), self.model.view(), nbins),
        }
    }
}

/// Transit close-up
#[derive(Clone, Debug, PartialEq)]
pub struct TransitWindow {
    pub phase_hours: Array1<f64>,
    pub observed: Array1<f64>,
    pub model: Array1<f64>,
    /// Binned observations, phase in hours
    pub binned: Option<BinnedCurve>,
    /// Depth of the model, `1 - min(model)`
    pub depth: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct FoldedAndBinned {
    pub observed: BinnedCurve,
    pub model: BinnedCurve,
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;
    use ndarray::array;

    #[test]
    fn binning() {
        let x = array![0.0, 0.1, 0.2, 0.9, 1.0];
        let y = array![1.0, 3.0, 2.0, 5.0, 7.0];
        let binned = BinnedCurve::new(x.view(), y.view(), 2);
        assert_eq!(binned.len(), 2);
        assert_relative_eq!(binned.mean[0], 2.0);
        assert_relative_eq!(binned.mean[1], 6.0);
        assert_relative_eq!(binned.x[1], 0.95);
        // population std of [5, 7] is 1
        assert_relative_eq!(binned.err[1], 1.0 / 2f64.sqrt());
    }

    #[test]
    fn empty_bins_are_dropped() {
        let x = array![0.0, 0.05, 0.95, 1.0];
        let y = array![1.0, 1.0, 2.0, 2.0];
        let binned = BinnedCurve::new(x.view(), y.view(), 10);
        assert_eq!(binned.len(), 2);
        assert_eq!(binned.mean, array![1.0, 2.0]);
    }

    #[test]
    fn folded_curve_is_sorted() {
        let curve = PhaseFoldedCurve::new(
            array![0.1, -0.2, 0.0].view(),
            array![1.0, 2.0, 3.0].view(),
            array![4.0, 5.0, 6.0].view(),
        )
        .unwrap();
        assert_eq!(curve.phase, array![-0.2, 0.0, 0.1]);
        assert_eq!(curve.observed, array![2.0, 3.0, 1.0]);
        assert_eq!(curve.model, array![5.0, 6.0, 4.0]);
    }

    #[test]
    fn window_around_transit() {
        let phase = Array1::linspace(-1.0, 1.0, 201);
        let model = phase.mapv(|p: f64| if p.abs() < 0.05 { 0.99 } else { 1.0 });
        let curve = PhaseFoldedCurve::new(phase.view(), model.view(), model.view()).unwrap();

        let window = curve.transit_window(0.1, false, 10);
        assert!(window.phase_hours.iter().all(|p| p.abs() < 24.0 * 0.15));
        assert_relative_eq!(window.depth, 0.01, epsilon = 1e-12);
        assert!(window.binned.is_some());

        let short = curve.transit_window(0.02, true, 10);
        assert_eq!(short.phase_hours.len(), 201);
        assert!(short.binned.is_none());

        let folded = curve.folded_and_binned(20);
        assert_eq!(folded.observed.len(), 20);
        assert_eq!(folded.model, folded.observed);
    }
}
