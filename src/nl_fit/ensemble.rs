use crate::config::TransitFitConfig;
use crate::error::TransitFitError;
use crate::nl_fit::bounds::clamp_to_bounds;
use crate::nl_fit::cobyla::CobylaOptimizer;
use crate::nl_fit::mcmc::EmceeSampler;
use crate::nl_fit::posterior::LnPosterior;
use crate::nl_fit::prior::LnPrior1DTrait;
use crate::nl_fit::runner::{FitRunner, OptimizationResult, PosteriorSamples};

use ndarray::Array2;
use rand::prelude::*;
use rand_distr::StandardNormal;

/// Spread of the initial walker ball around the optimum, in normalised units
const WALKER_JITTER: f64 = 1e-4;
const MAX_JITTER_ATTEMPTS: usize = 100;

/// [FitRunner] built from a prior population, COBYLA refinement and ensemble MCMC
///
/// Optimization draws `npop` parameter vectors from the priors and refines the best one with
/// COBYLA for at most `de_niter` evaluations. Sampling runs `mcmc_repeats` consecutive ensemble
/// MCMC runs of `mcmc_niter` steps, each starting where the previous one stopped, and returns
/// every position of the last run.
#[derive(Clone, Debug, PartialEq)]
pub struct EnsembleFitRunner {
    config: TransitFitConfig,
}

impl EnsembleFitRunner {
    pub fn new(config: TransitFitConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &TransitFitConfig {
        &self.config
    }

    /// Prior population of the optimization
    fn population_seed(&self) -> u64 {
        self.config.seed
    }

    /// Walker initialisation around the optimum
    fn walkers_seed(&self) -> u64 {
        self.config.seed.wrapping_add(1)
    }

    /// MCMC run number `repeat`
    fn mcmc_seed(&self, repeat: usize) -> u64 {
        self.config.seed.wrapping_add(2).wrapping_add(repeat as u64)
    }

    fn draw_from_priors(posterior: &LnPosterior, rng: &mut StdRng) -> Vec<f64> {
        let mut x: Vec<f64> = posterior
            .parameters()
            .iter()
            .zip(posterior.scaling().loc)
            .map(|(parameter, loc)| {
                parameter.prior.sample(rng).unwrap_or_else(|| {
                    let (lower, upper) = parameter.bounds;
                    if lower.is_finite() && upper.is_finite() {
                        rng.random_range(lower..=upper)
                    } else {
                        loc
                    }
                })
            })
            .collect();
        let bounds: Vec<_> = posterior.parameters().iter().map(|p| p.bounds).collect();
        clamp_to_bounds(&mut x, &bounds);
        x
    }

    fn initial_walkers(
        &self,
        posterior: &LnPosterior,
        start: &[f64],
        nwalkers: usize,
        rng: &mut StdRng,
    ) -> Vec<Vec<f64>> {
        let scaling = posterior.scaling();
        let internal_start = scaling.to_internal(start);
        let bounds: Vec<_> = posterior.parameters().iter().map(|p| p.bounds).collect();
        (0..nwalkers)
            .map(|_| {
                (0..MAX_JITTER_ATTEMPTS)
                    .map(|_| {
                        let internal: Vec<_> = internal_start
                            .iter()
                            .map(|&x| x + WALKER_JITTER * rng.sample::<f64, _>(StandardNormal))
                            .collect();
                        let mut external = scaling.to_external(&internal);
                        clamp_to_bounds(&mut external, &bounds);
                        external
                    })
                    .find(|x| posterior.ln_posterior(x).is_finite())
                    .unwrap_or_else(|| start.to_vec())
            })
            .map(|x| scaling.to_internal(&x))
            .collect()
    }
}

impl FitRunner for EnsembleFitRunner {
    fn optimize(&self, posterior: &LnPosterior) -> Result<OptimizationResult, TransitFitError> {
        let mut rng = StdRng::seed_from_u64(self.population_seed());
        let (best, best_ln_posterior) = (0..self.config.npop.max(1))
            .map(|_| {
                let x = Self::draw_from_priors(posterior, &mut rng);
                let lnp = posterior.ln_posterior(&x);
                (x, lnp)
            })
            .max_by(|(_, a), (_, b)| a.total_cmp(b))
            .ok_or(TransitFitError::Sampler("empty population".into()))?;
        tracing::debug!(
            npop = self.config.npop,
            ln_posterior = best_ln_posterior,
            "best member of the prior population"
        );

        let scaling = posterior.scaling();
        let bounds: Vec<_> = posterior.parameters().iter().map(|p| p.bounds).collect();
        let internal_bounds = scaling.bounds_to_internal(&bounds);
        let optimizer = CobylaOptimizer::new(
            self.config.de_niter.max(1),
            CobylaOptimizer::default_rhobeg(),
            CobylaOptimizer::default_ftol_rel(),
        );
        let refined = optimizer.minimize(
            |internal| -posterior.ln_posterior(&scaling.to_external(internal)),
            &scaling.to_internal(&best),
            &internal_bounds,
        );
        let mut x = scaling.to_external(&refined.x);
        clamp_to_bounds(&mut x, &bounds);
        let ln_posterior = posterior.ln_posterior(&x);
        tracing::debug!(
            success = refined.success,
            ln_posterior,
            "local refinement finished"
        );

        if ln_posterior.total_cmp(&best_ln_posterior).is_lt() {
            return Ok(OptimizationResult {
                x: best,
                ln_posterior: best_ln_posterior,
                success: best_ln_posterior.is_finite(),
            });
        }
        Ok(OptimizationResult {
            x,
            ln_posterior,
            success: ln_posterior.is_finite(),
        })
    }

    fn sample(
        &self,
        posterior: &LnPosterior,
        start: &OptimizationResult,
    ) -> Result<PosteriorSamples, TransitFitError> {
        let nparams = posterior.nparams();
        TransitFitError::check_len("optimization result", start.x.len(), nparams)?;
        let scaling = posterior.scaling();
        let mut rng = StdRng::seed_from_u64(self.walkers_seed());
        let nwalkers = EmceeSampler::walkers_for(nparams, self.config.npop);
        let mut positions = self.initial_walkers(posterior, &start.x, nwalkers, &mut rng);

        let mut chain = Vec::new();
        for repeat in 0..self.config.mcmc_repeats.max(1) {
            let sampler = EmceeSampler {
                nwalkers,
                niterations: self.config.mcmc_niter.max(1),
                seed: self.mcmc_seed(repeat),
            };
            let run = sampler.run(posterior, &scaling, &positions)?;
            tracing::debug!(repeat, nwalkers, niterations = sampler.niterations, "MCMC run finished");
            positions = run.last;
            chain = run.chain;
        }

        let values = chain
            .iter()
            .flat_map(|internal| scaling.to_external(internal))
            .collect::<Vec<_>>();
        let values = Array2::from_shape_vec((chain.len(), nparams), values)
            .map_err(|err| TransitFitError::Sampler(err.to_string()))?;
        PosteriorSamples::new(posterior.parameters().names(), values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Supersampling;
    use crate::nl_fit::posterior::LnPosteriorBuilder;
    use crate::tests::*;

    fn small_config() -> TransitFitConfig {
        TransitFitConfig {
            npop: 30,
            de_niter: 300,
            mcmc_niter: 20,
            mcmc_repeats: 2,
            ..TransitFitConfig::default()
        }
    }

    fn synthetic_posterior() -> LnPosterior {
        let transit = SyntheticTransit::default();
        LnPosteriorBuilder::new()
            .with_data(transit.fit_data(1e-3, 1))
            .with_transit(&transit.ephemeris(), Supersampling::default())
            .with_sine_baseline(1)
            .unwrap()
            .build()
            .unwrap()
    }

    #[test]
    fn prior_draws_respect_bounds() {
        let posterior = synthetic_posterior();
        let mut rng = StdRng::seed_from_u64(0);
        for _ in 0..20 {
            let x = EnsembleFitRunner::draw_from_priors(&posterior, &mut rng);
            assert!(posterior.ln_prior(&x).is_finite());
        }
    }

    #[test]
    fn optimization_improves_population() {
        let posterior = synthetic_posterior();
        let runner = EnsembleFitRunner::new(small_config());
        let result = runner.optimize(&posterior).unwrap();
        assert!(result.success);
        let mut rng = StdRng::seed_from_u64(0);
        let random_draw = EnsembleFitRunner::draw_from_priors(&posterior, &mut rng);
        assert!(result.ln_posterior >= posterior.ln_posterior(&random_draw));
    }

    #[test]
    fn random_streams_are_distinct() {
        let runner = EnsembleFitRunner::new(TransitFitConfig {
            seed: 7,
            mcmc_repeats: 3,
            ..small_config()
        });
        let mut seeds = vec![runner.population_seed(), runner.walkers_seed()];
        seeds.extend((0..runner.config().mcmc_repeats).map(|repeat| runner.mcmc_seed(repeat)));
        let n = seeds.len();
        seeds.sort_unstable();
        seeds.dedup();
        assert_eq!(seeds.len(), n);
    }

    #[test]
    fn samples_have_expected_shape() {
        let posterior = synthetic_posterior();
        let runner = EnsembleFitRunner::new(small_config());
        let start = runner.optimize(&posterior).unwrap();
        let samples = runner.sample(&posterior, &start).unwrap();
        let nwalkers = EmceeSampler::walkers_for(posterior.nparams(), 30);
        assert_eq!(samples.nsamples(), nwalkers * 20);
        assert_eq!(samples.names(), &posterior.parameters().names()[..]);
        let b = samples.column("b").unwrap();
        assert!(b.iter().all(|&b| (0.0..=1.0).contains(&b)));
    }
}
