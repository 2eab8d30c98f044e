//! Selection of the observations a fit step works with

use crate::ephemeris::Ephemeris;
use crate::mode::FitMode;

use ndarray::{Array1, ArrayView1, Zip};

/// Half-width of the kept window around each transit centre, in units of half-duration
pub const WINDOW_HALF_DURATIONS: f64 = 4.0;

/// Epoch number of every observation
pub fn epochs(times: ArrayView1<f64>, ephemeris: &Ephemeris) -> Array1<i64> {
    times.mapv(|t| ephemeris.epoch(t))
}

/// Boolean selection mask of the observations used by a `mode` fit
///
/// An observation is kept if its epoch passes the parity filter of `mode` and it lies within
/// `±4` half-durations of the transit centre:
/// `|phase - period / 2| < 4 * duration / 2`, see [Ephemeris::phase].
///
/// The mask is a pure function of its arguments.
pub fn compute_mask(times: ArrayView1<f64>, ephemeris: &Ephemeris, mode: FitMode) -> Array1<bool> {
    let half_window = WINDOW_HALF_DURATIONS * 0.5 * ephemeris.duration;
    let half_period = 0.5 * ephemeris.period;
    times.mapv(|t| {
        mode.accepts(ephemeris.epoch(t)) && (ephemeris.phase(t) - half_period).abs() < half_window
    })
}

/// Observations retained by a mask, together with their epochs
#[derive(Clone, Debug)]
pub struct MaskedObservations {
    pub time: Array1<f64>,
    pub flux: Array1<f64>,
    pub epochs: Array1<i64>,
}

impl MaskedObservations {
    pub fn select(
        times: ArrayView1<f64>,
        flux: ArrayView1<f64>,
        ephemeris: &Ephemeris,
        mask: ArrayView1<bool>,
    ) -> Self {
        let mut time_out = Vec::new();
        let mut flux_out = Vec::new();
        let mut epochs_out = Vec::new();
        Zip::from(times)
            .and(flux)
            .and(mask)
            .for_each(|&t, &f, &keep| {
                if keep {
                    time_out.push(t);
                    flux_out.push(f);
                    epochs_out.push(ephemeris.epoch(t));
                }
            });
        Self {
            time: time_out.into(),
            flux: flux_out.into(),
            epochs: epochs_out.into(),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.time.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::*;

    #[test]
    fn mask_is_deterministic() {
        let lc = box_transit_light_curve(&SyntheticTransit::default(), 0.0, 0);
        let ephemeris = SyntheticTransit::default().ephemeris();
        for mode in FitMode::ALL_MODES {
            let first = compute_mask(lc.time.view(), &ephemeris, mode);
            let second = compute_mask(lc.time.view(), &ephemeris, mode);
            assert_eq!(first, second);
        }
    }

    #[test]
    fn parity_masks_partition_all() {
        let lc = box_transit_light_curve(&SyntheticTransit::default(), 0.0, 0);
        let ephemeris = SyntheticTransit::default().ephemeris();
        let all = compute_mask(lc.time.view(), &ephemeris, FitMode::All);
        let even = compute_mask(lc.time.view(), &ephemeris, FitMode::Even);
        let odd = compute_mask(lc.time.view(), &ephemeris, FitMode::Odd);
        Zip::from(&all)
            .and(&even)
            .and(&odd)
            .for_each(|&a, &e, &o| {
                assert!(!(e && o), "even and odd masks overlap");
                assert_eq!(a, e || o);
            });
        assert!(even.iter().any(|&x| x));
        assert!(odd.iter().any(|&x| x));
    }

    #[test]
    fn mask_keeps_transit_window_only() {
        let transit = SyntheticTransit::default();
        let lc = box_transit_light_curve(&transit, 0.0, 0);
        let ephemeris = transit.ephemeris();
        let mask = compute_mask(lc.time.view(), &ephemeris, FitMode::All);
        Zip::from(&lc.time).and(&mask).for_each(|&t, &keep| {
            let epoch = ephemeris.epoch(t);
            let dt = t - (transit.zero_epoch + epoch as f64 * transit.period);
            if keep {
                assert!(dt.abs() < 2.0 * transit.duration);
            } else {
                assert!(dt.abs() >= 2.0 * transit.duration - 1e-9);
            }
        });
        // 1000 points over 35 d with a 0.4 d wide window every 3.5 d
        let n_kept = mask.iter().filter(|&&x| x).count();
        assert!((100..=130).contains(&n_kept), "{n_kept}");
    }

    #[test]
    fn select_keeps_epochs() {
        let transit = SyntheticTransit::default();
        let lc = box_transit_light_curve(&transit, 0.0, 0);
        let ephemeris = transit.ephemeris();
        let mask = compute_mask(lc.time.view(), &ephemeris, FitMode::Odd);
        let selected = MaskedObservations::select(lc.time.view(), lc.flux.view(), &ephemeris, mask.view());
        assert_eq!(selected.len(), mask.iter().filter(|&&x| x).count());
        assert!(selected.epochs.iter().all(|&e| e.rem_euclid(2) == 1));
    }
}
