//! Per-epoch transit significance
//!
//! Every transit epoch is scored by the difference between the Gaussian log-likelihood of the
//! observations under the fitted model and under a flat unit baseline. Positive values mean the
//! epoch's data favour the transit. Scores are summarised with a log-mean-exp average, which stays
//! finite when the scores span hundreds of log-units, and aggregated into a BIC-like statistic.

use crate::error::{EpochSubset, TransitFitError};

use ndarray::{ArrayView1, Zip};
use std::collections::BTreeMap;
use std::f64::consts::TAU;

/// Number of free parameters of the transit model in the BIC-like statistic
pub const TRANSIT_FREE_PARAMETERS: usize = 9;
/// Number of free parameters of the flat model in the BIC-like statistic
pub const FLAT_FREE_PARAMETERS: usize = 0;

#[inline]
fn ln_like_from_chi2(n: usize, chi2: f64, std: f64) -> f64 {
    let n = n as f64;
    -n * std.ln() - 0.5 * n * TAU.ln() - 0.5 * chi2
}

/// Gaussian log-likelihood of `observed` given `model` and a shared standard deviation
///
/// `-n ln(std) - n ln(2 pi) / 2 - sum((observed - model)^2) / (2 std^2)`
pub fn ln_like_normal(observed: ArrayView1<f64>, model: ArrayView1<f64>, std: f64) -> f64 {
    let inv_var = std.powi(-2);
    let chi2 = Zip::from(observed)
        .and(model)
        .fold(0.0, |acc, &o, &m| acc + (o - m).powi(2) * inv_var);
    ln_like_from_chi2(observed.len(), chi2, std)
}

/// `ln(mean(exp(values)))` evaluated as `ln(mean(exp(values - max))) + max`
///
/// Returns `None` for an empty slice or if any value is NaN.
pub fn log_mean_exp(values: &[f64]) -> Option<f64> {
    if values.iter().any(|x| x.is_nan()) {
        return None;
    }
    let max = values.iter().copied().reduce(f64::max)?;
    if max.is_infinite() {
        return Some(max);
    }
    let mean = values.iter().map(|&x| (x - max).exp()).sum::<f64>() / values.len() as f64;
    Some(mean.ln() + max)
}

/// BIC-like model comparison statistic
///
/// `dll + (k1 - k2) ln(n) / 2` for summed delta log-likelihood `dll` of a model with `k1` free
/// parameters against a model with `k2` free parameters, `n` observations.
pub fn delta_bic(dll: f64, k1: usize, k2: usize, n: usize) -> f64 {
    dll + 0.5 * (k1 as f64 - k2 as f64) * (n as f64).ln()
}

/// Delta log-likelihood of every observed epoch, ordered by epoch number
#[derive(Clone, Debug, PartialEq)]
pub struct EpochScores {
    epochs: Vec<i64>,
    dll: Vec<f64>,
}

impl EpochScores {
    /// Score every unique epoch present in `epochs`
    ///
    /// All arrays are per observation. `noise_std` is the single white-noise level shared by all
    /// epochs.
    pub fn score(
        epochs: ArrayView1<i64>,
        observed: ArrayView1<f64>,
        model: ArrayView1<f64>,
        noise_std: f64,
    ) -> Result<Self, TransitFitError> {
        TransitFitError::check_len("observed flux", observed.len(), epochs.len())?;
        TransitFitError::check_len("model flux", model.len(), epochs.len())?;
        if !(noise_std.is_finite() && noise_std > 0.0) {
            return Err(TransitFitError::InvalidNoise(noise_std));
        }

        // epoch -> (n, chi2 against the model, chi2 against the flat baseline)
        let mut groups: BTreeMap<i64, (usize, f64, f64)> = BTreeMap::new();
        let inv_var = noise_std.powi(-2);
        Zip::from(epochs)
            .and(observed)
            .and(model)
            .for_each(|&epoch, &o, &m| {
                let group = groups.entry(epoch).or_default();
                group.0 += 1;
                group.1 += (o - m).powi(2) * inv_var;
                group.2 += (o - 1.0).powi(2) * inv_var;
            });

        let (epochs, dll) = groups
            .into_iter()
            .map(|(epoch, (n, chi2_model, chi2_flat))| {
                let dll = ln_like_from_chi2(n, chi2_model, noise_std)
                    - ln_like_from_chi2(n, chi2_flat, noise_std);
                (epoch, dll)
            })
            .unzip();
        Ok(Self { epochs, dll })
    }

    pub fn epochs(&self) -> &[i64] {
        &self.epochs
    }

    pub fn values(&self) -> &[f64] {
        &self.dll
    }

    pub fn len(&self) -> usize {
        self.epochs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.epochs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (i64, f64)> + '_ {
        self.epochs.iter().copied().zip(self.dll.iter().copied())
    }

    /// Sum of the per-epoch delta log-likelihoods
    pub fn total(&self) -> f64 {
        self.dll.iter().sum()
    }

    pub fn subset(&self, subset: EpochSubset) -> Vec<f64> {
        self.iter()
            .filter(|&(epoch, _)| match subset {
                EpochSubset::All => true,
                EpochSubset::Parity(parity) => parity.contains(epoch),
            })
            .map(|(_, dll)| dll)
            .collect()
    }

    /// Log-mean-exp of the scores of a subset of epochs
    pub fn mean(&self, subset: EpochSubset) -> Result<f64, TransitFitError> {
        let values = self.subset(subset);
        if values.is_empty() {
            return Err(TransitFitError::EmptyEpochSubset(subset));
        }
        log_mean_exp(&values).ok_or(TransitFitError::NanEpochScore(subset))
    }

    /// [delta_bic] of the summed scores over `n_points` observations
    pub fn aggregate_bic_delta(&self, k_transit: usize, k_flat: usize, n_points: usize) -> f64 {
        delta_bic(self.total(), k_transit, k_flat, n_points)
    }
}
