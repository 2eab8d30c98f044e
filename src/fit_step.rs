//! Transit fit of a single epoch selection and the all-even-odd driver

use crate::config::TransitFitConfig;
use crate::data::{FitData, LightCurve};
use crate::ephemeris::{Ephemeris, fold};
use crate::epoch_mask::{MaskedObservations, compute_mask};
use crate::error::TransitFitError;
use crate::mode::FitMode;
use crate::model::{LimbDarkeningTable, Supersampling};
use crate::nl_fit::posterior::{LnPosterior, LnPosteriorBuilder};
use crate::nl_fit::prior::PriorSet;
use crate::nl_fit::runner::{FitRunner, PosteriorSamples};
use crate::plot::{FoldedAndBinned, PhaseFoldedCurve, TransitWindow};
use crate::prior_config::PriorConfigurator;
use crate::report::Report;
use crate::significance::{EpochScores, FLAT_FREE_PARAMETERS, TRANSIT_FREE_PARAMETERS};
use crate::summary::PosteriorSummary;

use ndarray::Array1;

/// Observations and knowledge about the target shared by the fit steps
#[derive(Clone, Debug)]
pub struct TargetContext {
    pub light_curve: LightCurve,
    /// Current ephemeris, refined by every successful fit
    pub ephemeris: Ephemeris,
    /// Stellar effective temperature [K]
    pub teff: Option<f64>,
    pub limb_darkening: Option<LimbDarkeningTable>,
}

impl TargetContext {
    pub fn new(light_curve: LightCurve, ephemeris: Ephemeris) -> Self {
        Self {
            light_curve,
            ephemeris,
            teff: None,
            limb_darkening: None,
        }
    }

    pub fn with_teff(mut self, teff: f64, table: LimbDarkeningTable) -> Self {
        self.teff = Some(teff);
        self.limb_darkening = Some(table);
        self
    }

    pub fn update_ephemeris(&mut self, ephemeris: Ephemeris) {
        tracing::info!(
            zero_epoch = ephemeris.zero_epoch,
            period = ephemeris.period,
            duration = ephemeris.duration,
            depth = ephemeris.depth,
            "ephemeris updated"
        );
        self.ephemeris = ephemeris;
    }
}

/// Masked data and posterior of a fit step, ready for the fit runner
#[derive(Clone, Debug)]
pub struct InitializedFit {
    pub mode: FitMode,
    pub mask: Array1<bool>,
    pub priors: PriorSet,
    pub posterior: LnPosterior,
}

/// Fit of the transits selected by a [FitMode]
#[derive(Clone, Debug, PartialEq)]
pub struct TransitFitStep {
    mode: FitMode,
    title: String,
    config: TransitFitConfig,
}

impl TransitFitStep {
    /// `mode` is one of `"all"`, `"even"` and `"odd"`
    pub fn new(
        mode: &str,
        title: impl Into<String>,
        config: TransitFitConfig,
    ) -> Result<Self, TransitFitError> {
        Ok(Self::with_mode(mode.parse()?, title, config))
    }

    pub fn with_mode(mode: FitMode, title: impl Into<String>, config: TransitFitConfig) -> Self {
        Self {
            mode,
            title: title.into(),
            config,
        }
    }

    pub fn mode(&self) -> FitMode {
        self.mode
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    fn supersampling(&self) -> Supersampling {
        if self.config.nsamples > 1 {
            Supersampling::new(self.config.nsamples, self.config.exptime)
        } else {
            Supersampling::default()
        }
    }

    /// Select the observations and build the posterior without fitting
    ///
    /// `reference` is the posterior summary of the `all` fit, required by the `even` and `odd`
    /// modes.
    pub fn initialize(
        &self,
        ctx: &TargetContext,
        reference: Option<&PosteriorSummary>,
    ) -> Result<InitializedFit, TransitFitError> {
        let lc = &ctx.light_curve;
        let mask = compute_mask(lc.time.view(), &ctx.ephemeris, self.mode);
        let observations =
            MaskedObservations::select(lc.time.view(), lc.flux.view(), &ctx.ephemeris, mask.view());
        tracing::debug!(
            mode = %self.mode,
            selected = observations.len(),
            total = lc.lenu(),
            "observations selected"
        );
        let nobs = observations.len();

        let priors = PriorConfigurator::new(&ctx.ephemeris)
            .with_limb_darkening(ctx.teff, ctx.limb_darkening.as_ref())
            .build_priors(self.mode, reference)?;
        let posterior = LnPosteriorBuilder::new()
            .with_data(FitData::new(observations))
            .with_transit(&ctx.ephemeris, self.supersampling())
            .with_sine_baseline(self.config.n_sine)?
            .with_priors(&priors)?
            .build()?;

        let minimum = posterior.nparams() + 1;
        if nobs < minimum {
            return Err(TransitFitError::InsufficientData {
                actual: nobs,
                minimum,
            });
        }
        Ok(InitializedFit {
            mode: self.mode,
            mask,
            priors,
            posterior,
        })
    }

    /// Fit the selected transits and score every epoch
    pub fn run(
        &self,
        ctx: &TargetContext,
        reference: Option<&PosteriorSummary>,
        runner: &dyn FitRunner,
    ) -> Result<TransitFitResult, TransitFitError> {
        tracing::info!(mode = %self.mode, "fitting {} transits", self.mode);
        let InitializedFit {
            mode,
            mask,
            posterior,
            ..
        } = self.initialize(ctx, reference)?;

        let optimum = runner.optimize(&posterior)?;
        tracing::debug!(
            mode = %mode,
            ln_posterior = optimum.ln_posterior,
            success = optimum.success,
            "global optimization finished"
        );
        let samples = runner.sample(&posterior, &optimum)?;
        let summary = PosteriorSummary::from_samples(&samples)?;
        let result =
            TransitFitResult::new(mode, self.title.clone(), mask, &posterior, &samples, summary)?;
        tracing::info!(
            mode = %mode,
            nepochs = result.scores.len(),
            delta_bic = result.delta_bic,
            "{} transits fitted",
            mode
        );
        Ok(result)
    }
}

/// Immutable outcome of a fit step
#[derive(Clone, Debug)]
pub struct TransitFitResult {
    pub mode: FitMode,
    pub title: String,
    /// Selection mask over the full light curve
    pub mask: Array1<bool>,
    pub time: Array1<f64>,
    pub observed: Array1<f64>,
    /// Epoch of every selected observation
    pub epochs: Array1<i64>,
    /// Centred phase [d] with the fitted ephemeris
    pub phase: Array1<f64>,
    /// Full model at the posterior median
    pub model: Array1<f64>,
    /// Transit part of the model at the posterior median
    pub transit: Array1<f64>,
    pub summary: PosteriorSummary,
    pub scores: EpochScores,
    /// BIC-like statistic of the transit against a flat model, `all` mode only
    pub delta_bic: Option<f64>,
}

impl TransitFitResult {
    fn new(
        mode: FitMode,
        title: String,
        mask: Array1<bool>,
        posterior: &LnPosterior,
        samples: &PosteriorSamples,
        summary: PosteriorSummary,
    ) -> Result<Self, TransitFitError> {
        let pv = samples.median_vector();
        let data = posterior.data();
        let (tc, period) = (pv[0], pv[1]);
        let phase = data
            .time
            .mapv(|t| fold(t, period, tc, 0.5) * period - 0.5 * period);
        let model = posterior.flux_model(&pv);
        let transit = posterior.transit_model(&pv);
        let scores = EpochScores::score(
            data.epochs.view(),
            data.flux.view(),
            model.view(),
            posterior.noise_std(&pv),
        )?;
        let delta_bic = (mode == FitMode::All).then(|| {
            scores.aggregate_bic_delta(TRANSIT_FREE_PARAMETERS, FLAT_FREE_PARAMETERS, data.lenu())
        });
        Ok(Self {
            mode,
            title,
            mask,
            time: data.time.clone(),
            observed: data.flux.clone(),
            epochs: data.epochs.clone(),
            phase,
            model,
            transit,
            summary,
            scores,
            delta_bic,
        })
    }

    /// Ephemeris implied by the fit, `tc`, `p`, `t14` and `k2` medians
    pub fn ephemeris(&self) -> Result<Ephemeris, TransitFitError> {
        self.summary.ephemeris()
    }

    pub fn report(&self) -> Result<Report, TransitFitError> {
        Report::new(
            self.mode,
            self.title.clone(),
            &self.summary,
            &self.scores,
            self.delta_bic,
        )
    }

    pub fn phase_folded(&self) -> Result<PhaseFoldedCurve, TransitFitError> {
        PhaseFoldedCurve::new(self.phase.view(), self.observed.view(), self.model.view())
    }

    pub fn transit_window(
        &self,
        full_phase: bool,
        nbins: usize,
    ) -> Result<TransitWindow, TransitFitError> {
        let t14 = self.summary.get("t14")?.med;
        Ok(self.phase_folded()?.transit_window(t14, full_phase, nbins))
    }

    pub fn folded_and_binned(&self, nbins: usize) -> Result<FoldedAndBinned, TransitFitError> {
        Ok(self.phase_folded()?.folded_and_binned(nbins))
    }
}

/// Results of the three fit modes
#[derive(Clone, Debug)]
pub struct TransitFits {
    pub all: TransitFitResult,
    pub even: TransitFitResult,
    pub odd: TransitFitResult,
}

/// Fit all, then even, then odd transits
///
/// The parity fits take their priors from the `all` fit. The context ephemeris is replaced by
/// the fitted one after every step.
pub fn fit_all_even_odd(
    ctx: &mut TargetContext,
    config: &TransitFitConfig,
    runner: &dyn FitRunner,
) -> Result<TransitFits, TransitFitError> {
    let step = |mode: FitMode| {
        TransitFitStep::with_mode(mode, format!("Transit fit ({mode} transits)"), config.clone())
    };

    let all = step(FitMode::All).run(ctx, None, runner)?;
    ctx.update_ephemeris(all.ephemeris()?);
    let even = step(FitMode::Even).run(ctx, Some(&all.summary), runner)?;
    ctx.update_ephemeris(even.ephemeris()?);
    let odd = step(FitMode::Odd).run(ctx, Some(&all.summary), runner)?;
    ctx.update_ephemeris(odd.ephemeris()?);
    Ok(TransitFits { all, even, odd })
}
