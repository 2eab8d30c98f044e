use crate::error::TransitFitError;
use crate::nl_fit::parameters::ParameterScaling;
use crate::nl_fit::posterior::LnPosterior;

use conv::prelude::*;
use emcee::{EnsembleSampler, Guess, Prob};

/// Log-posterior seen by the sampler, in the normalised parameter space
struct InternalLnPosterior<'a> {
    posterior: &'a LnPosterior,
    scaling: &'a ParameterScaling,
}

impl InternalLnPosterior<'_> {
    fn external(&self, guess: &Guess) -> Vec<f64> {
        let internal: Vec<f64> = guess.values.iter().map(|&x| x as f64).collect();
        self.scaling.to_external(&internal)
    }
}

impl Prob for InternalLnPosterior<'_> {
    fn lnlike(&self, params: &Guess) -> f32 {
        self.posterior
            .ln_likelihood(&self.external(params))
            .approx_as::<f32>()
            .unwrap_or(f32::NEG_INFINITY)
    }

    fn lnprior(&self, params: &Guess) -> f32 {
        self.posterior
            .ln_prior(&self.external(params))
            .approx_as::<f32>()
            .unwrap_or(f32::NEG_INFINITY)
    }
}

/// Walker positions of a finished MCMC run, in the normalised parameter space
#[derive(Clone, Debug)]
pub struct McmcRun {
    /// All positions visited, step by step
    pub chain: Vec<Vec<f64>>,
    /// Positions after the last step, one per walker
    pub last: Vec<Vec<f64>>,
}

/// Affine-invariant ensemble sampler of Goodman & Weare (2010), via the `emcee` crate
///
/// The sampler works in single precision, so the posterior is sampled in the normalised space
/// of [ParameterScaling].
#[derive(Clone, Debug, PartialEq)]
pub struct EmceeSampler {
    pub nwalkers: usize,
    pub niterations: usize,
    pub seed: u64,
}

impl EmceeSampler {
    /// Number of walkers for `nparams` dimensions, at least `min_walkers` and always even
    pub fn walkers_for(nparams: usize, min_walkers: usize) -> usize {
        let nwalkers = min_walkers.max(2 * nparams + 2);
        nwalkers + nwalkers % 2
    }

    pub fn run(
        &self,
        posterior: &LnPosterior,
        scaling: &ParameterScaling,
        start: &[Vec<f64>],
    ) -> Result<McmcRun, TransitFitError> {
        TransitFitError::check_len("walker start positions", start.len(), self.nwalkers)?;
        let target = InternalLnPosterior { posterior, scaling };
        let mut sampler = EnsembleSampler::new(self.nwalkers, posterior.nparams(), &target)
            .map_err(|err| TransitFitError::Sampler(err.to_string()))?;
        #[allow(clippy::cast_possible_truncation)]
        sampler.seed(&[self.seed as usize]);

        let guesses: Vec<_> = start
            .iter()
            .map(|x| Guess::new(&x.iter().map(|&v| v as f32).collect::<Vec<_>>()))
            .collect();

        let mut chain = Vec::with_capacity(self.nwalkers * self.niterations);
        let mut last = guesses.iter().map(guess_to_vec).collect();
        sampler
            .sample(&guesses, self.niterations, |step| {
                last = step.pos.iter().map(guess_to_vec).collect::<Vec<_>>();
                chain.extend(last.iter().cloned());
            })
            .map_err(|err| TransitFitError::Sampler(err.to_string()))?;
        Ok(McmcRun { chain, last })
    }
}

fn guess_to_vec(guess: &Guess) -> Vec<f64> {
    guess.values.iter().map(|&x| x as f64).collect()
}
