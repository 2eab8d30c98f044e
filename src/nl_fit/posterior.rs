use crate::data::FitData;
use crate::ephemeris::Ephemeris;
use crate::error::TransitFitError;
use crate::model::{FluxModel, ModelComponent, SineBaseline, Supersampling, TransitModel};
use crate::nl_fit::parameters::{BlockKind, Parameter, ParameterScaling, ParameterSet};
use crate::nl_fit::prior::{LnPrior1D, PriorSet};
use crate::significance::ln_like_normal;

use ndarray::Array1;
use std::ops::Range;

/// Assembles the parameter blocks and the model components of a [LnPosterior]
///
/// Blocks are registered in call order, so the usual sequence is
/// `with_data`, `with_transit`, `with_sine_baseline`, optionally `with_priors`, and `build`.
#[derive(Clone, Debug, Default)]
pub struct LnPosteriorBuilder {
    data: Option<FitData>,
    parameters: ParameterSet,
    components: Vec<ModelComponent>,
}

impl LnPosteriorBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_data(mut self, data: FitData) -> Self {
        self.data = Some(data);
        self
    }

    /// Register the orbit, planet, limb-darkening and white-noise blocks and the transit model
    pub fn with_transit(mut self, ephemeris: &Ephemeris, supersampling: Supersampling) -> Self {
        let orbit = self
            .parameters
            .add_block(BlockKind::Orbit, TransitModel::orbit_parameters(ephemeris));
        let planet = self
            .parameters
            .add_block(BlockKind::Planet, TransitModel::planet_parameters());
        let limb_darkening = self.parameters.add_block(
            BlockKind::LimbDarkening,
            TransitModel::limb_darkening_parameters(),
        );
        self.parameters
            .add_block(BlockKind::Noise, LnPosterior::noise_parameters());
        self.components
            .push(ModelComponent::Transit(TransitModel::new(
                orbit,
                planet,
                limb_darkening,
                supersampling,
            )));
        self
    }

    /// Register the sine baseline block, requires the data and the transit period
    pub fn with_sine_baseline(mut self, nharmonics: usize) -> Result<Self, TransitFitError> {
        if nharmonics == 0 {
            return Err(TransitFitError::InvalidConfig(
                "sine baseline needs at least one harmonic",
            ));
        }
        let data = self.data.as_ref().ok_or(TransitFitError::UninitializedData)?;
        let (tref, flux_ptp) = (data.tref, data.flux_ptp());
        let period_index = self.parameters.index_of("p")?;
        let baseline = self.parameters.add_block(
            BlockKind::Baseline,
            SineBaseline::parameters(nharmonics, flux_ptp),
        );
        self.components
            .push(ModelComponent::SineBaseline(SineBaseline::new(
                period_index,
                baseline,
                tref,
            )));
        Ok(self)
    }

    pub fn with_priors(mut self, priors: &PriorSet) -> Result<Self, TransitFitError> {
        self.parameters.apply_priors(priors)?;
        Ok(self)
    }

    pub fn build(self) -> Result<LnPosterior, TransitFitError> {
        let data = self.data.ok_or(TransitFitError::UninitializedData)?;
        let noise_index = self.parameters.index_of("wn_loge_0")?;
        Ok(LnPosterior {
            parameters: self.parameters,
            data,
            model: FluxModel::new(self.components),
            noise_index,
        })
    }
}

/// Immutable log-posterior of the light-curve model given the fit data
#[derive(Clone, Debug)]
pub struct LnPosterior {
    parameters: ParameterSet,
    data: FitData,
    model: FluxModel,
    noise_index: usize,
}

impl LnPosterior {
    pub fn noise_parameters() -> Vec<Parameter> {
        vec![Parameter::new(
            "wn_loge_0",
            "log10 white noise standard deviation",
            "",
            LnPrior1D::uniform(-4.0, 0.0),
            (f64::NEG_INFINITY, f64::INFINITY),
        )]
    }

    pub fn parameters(&self) -> &ParameterSet {
        &self.parameters
    }

    pub fn data(&self) -> &FitData {
        &self.data
    }

    #[inline]
    pub fn nparams(&self) -> usize {
        self.parameters.len()
    }

    pub fn noise_range(&self) -> Range<usize> {
        self.noise_index..self.noise_index + 1
    }

    pub fn scaling(&self) -> ParameterScaling {
        self.parameters.scaling()
    }

    /// White-noise standard deviation
    #[inline]
    pub fn noise_std(&self, pv: &[f64]) -> f64 {
        10f64.powf(pv[self.noise_index])
    }

    pub fn flux_model(&self, pv: &[f64]) -> Array1<f64> {
        self.model.flux_model(self.data.time.view(), pv)
    }

    pub fn transit_model(&self, pv: &[f64]) -> Array1<f64> {
        self.model.transit_model(self.data.time.view(), pv)
    }

    pub fn baseline(&self, pv: &[f64]) -> Array1<f64> {
        self.model.baseline(self.data.time.view(), pv)
    }

    pub fn ln_prior(&self, pv: &[f64]) -> f64 {
        self.parameters.ln_prior(pv)
    }

    pub fn ln_likelihood(&self, pv: &[f64]) -> f64 {
        let model = self.flux_model(pv);
        let ln_like = ln_like_normal(self.data.flux.view(), model.view(), self.noise_std(pv));
        if ln_like.is_nan() {
            f64::NEG_INFINITY
        } else {
            ln_like
        }
    }

    /// Log-prior plus log-likelihood, the likelihood is not evaluated outside of the prior support
    pub fn ln_posterior(&self, pv: &[f64]) -> f64 {
        let ln_prior = self.ln_prior(pv);
        if ln_prior.is_finite() {
            ln_prior + self.ln_likelihood(pv)
        } else {
            f64::NEG_INFINITY
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::*;

    fn posterior(noise: f64) -> (LnPosterior, Ephemeris) {
        let transit = SyntheticTransit::default();
        let ephemeris = transit.ephemeris();
        let data = transit.fit_data(noise, 0);
        let posterior = LnPosteriorBuilder::new()
            .with_data(data)
            .with_transit(&ephemeris, Supersampling::default())
            .with_sine_baseline(1)
            .unwrap()
            .build()
            .unwrap();
        (posterior, ephemeris)
    }

    #[test]
    fn parameter_order() {
        let (posterior, _) = posterior(1e-3);
        assert_eq!(
            posterior.parameters().names(),
            ["tc", "p", "rho", "b", "k2", "q1", "q2", "wn_loge_0", "c_sin", "a_sin_0"]
        );
        let slices = posterior.parameters().slices();
        assert_eq!(slices.orbit, 0..4);
        assert_eq!(slices.baseline, 8..10);
        assert_eq!(posterior.noise_range(), 7..8);
    }

    #[test]
    fn baseline_requires_data() {
        let ephemeris = SyntheticTransit::default().ephemeris();
        let err = LnPosteriorBuilder::new()
            .with_transit(&ephemeris, Supersampling::default())
            .with_sine_baseline(1)
            .unwrap_err();
        assert_eq!(err, TransitFitError::UninitializedData);
    }

    #[test]
    fn baseline_without_harmonics() {
        let transit = SyntheticTransit::default();
        let err = LnPosteriorBuilder::new()
            .with_data(transit.fit_data(1e-3, 0))
            .with_transit(&transit.ephemeris(), Supersampling::default())
            .with_sine_baseline(0)
            .unwrap_err();
        assert!(matches!(err, TransitFitError::InvalidConfig(_)));
    }

    #[test]
    fn ln_posterior_outside_bounds() {
        let (posterior, ephemeris) = posterior(1e-3);
        let mut pv = vec![
            ephemeris.zero_epoch,
            ephemeris.period,
            2.0,
            0.2,
            ephemeris.depth,
            0.3,
            0.3,
            -3.0,
            0.5,
            1e-4,
        ];
        assert!(posterior.ln_posterior(&pv).is_finite());
        pv[3] = 1.2;
        assert_eq!(posterior.ln_posterior(&pv), f64::NEG_INFINITY);
    }

    #[test]
    fn noise_std_is_log10() {
        let (posterior, _) = posterior(1e-3);
        let mut pv = vec![0.0; posterior.nparams()];
        pv[7] = -2.0;
        approx::assert_relative_eq!(posterior.noise_std(&pv), 0.01);
    }
}
