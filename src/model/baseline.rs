use crate::nl_fit::parameters::Parameter;
use crate::nl_fit::prior::LnPrior1D;

use ndarray::{Array1, ArrayView1};
use std::f64::consts::TAU;
use std::ops::Range;

/// Multiplicative sinusoidal baseline locked to the orbital period
///
/// `1 + sum_j a_j sin(2 pi (t - tref - c p) / (p / (j + 1)))`, where `p` is the fitted period,
/// `c` the phase shift in units of the period and `a_j` the amplitudes of the harmonics.
#[derive(Clone, Debug, PartialEq)]
pub struct SineBaseline {
    period_index: usize,
    baseline: Range<usize>,
    tref: f64,
}

impl SineBaseline {
    /// `baseline` holds the phase shift followed by the harmonic amplitudes
    pub fn new(period_index: usize, baseline: Range<usize>, tref: f64) -> Self {
        assert!(
            baseline.len() >= 2,
            "sine baseline needs a phase and at least one amplitude"
        );
        Self {
            period_index,
            baseline,
            tref,
        }
    }

    pub fn nharmonics(&self) -> usize {
        self.baseline.len() - 1
    }

    pub fn evaluate(&self, times: ArrayView1<f64>, pv: &[f64]) -> Array1<f64> {
        let period = pv[self.period_index];
        let block = &pv[self.baseline.clone()];
        let (phase_shift, amplitudes) = (block[0], &block[1..]);
        let t0 = self.tref + phase_shift * period;
        times.mapv(|t| {
            1.0 + amplitudes
                .iter()
                .enumerate()
                .map(|(j, a)| a * (TAU * (t - t0) * (j + 1) as f64 / period).sin())
                .sum::<f64>()
        })
    }

    /// `c_sin` and `a_sin_0..a_sin_{n-1}`, amplitude priors are limited by the flux range
    pub fn parameters(nharmonics: usize, flux_ptp: f64) -> Vec<Parameter> {
        let max_amplitude = flux_ptp.max(f64::EPSILON);
        let mut parameters = Vec::with_capacity(nharmonics + 1);
        parameters.push(Parameter::new(
            "c_sin",
            "sine phase",
            "",
            LnPrior1D::uniform(0.0, 1.0),
            (0.0, 1.0),
        ));
        parameters.extend((0..nharmonics).map(|i| {
            Parameter::new(
                format!("a_sin_{i}"),
                "sine amplitude",
                "",
                LnPrior1D::uniform(0.0, max_amplitude),
                (0.0, f64::INFINITY),
            )
        }));
        parameters
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_abs_diff_eq;
    use ndarray::array;

    #[test]
    fn zero_amplitude_is_flat() {
        let baseline = SineBaseline::new(0, 1..3, 10.0);
        let t = Array1::linspace(10.0, 20.0, 50);
        let flux = baseline.evaluate(t.view(), &[2.0, 0.3, 0.0]);
        assert_abs_diff_eq!(flux, Array1::<f64>::ones(50));
    }

    #[test]
    fn first_harmonic() {
        let baseline = SineBaseline::new(0, 1..4, 10.0);
        // quarter period after tref + c * p
        let t = array![10.5 + 0.25 * 2.0, 10.5 + 0.75 * 2.0];
        let flux = baseline.evaluate(t.view(), &[2.0, 0.25, 0.01, 0.0]);
        assert_abs_diff_eq!(flux, array![1.01, 0.99], epsilon = 1e-12);
        assert_eq!(baseline.nharmonics(), 2);
    }

    #[test]
    fn amplitude_prior_follows_flux_range() {
        let parameters = SineBaseline::parameters(2, 0.05);
        let names: Vec<_> = parameters.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["c_sin", "a_sin_0", "a_sin_1"]);
        assert_eq!(parameters[1].prior, LnPrior1D::uniform(0.0, 0.05));
        let flat = SineBaseline::parameters(1, 0.0);
        assert_eq!(flat[1].prior, LnPrior1D::uniform(0.0, f64::EPSILON));
    }
}
