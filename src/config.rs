use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Run-control parameters of the transit fit
///
/// Every field has a `default_*` function, missing fields are filled with them on
/// deserialization.
#[derive(Clone, Debug, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(default)]
pub struct TransitFitConfig {
    /// Population size of the global optimization, also the minimum number of MCMC walkers
    pub npop: usize,
    /// Maximum number of objective evaluations of the local refinement
    pub de_niter: usize,
    /// Number of MCMC steps per run
    pub mcmc_niter: usize,
    /// Number of consecutive MCMC runs, each starting from the last positions of the previous one
    pub mcmc_repeats: usize,
    /// Supersampling factor of the transit model
    pub nsamples: usize,
    /// Exposure time [d], used only when `nsamples > 1`
    pub exptime: f64,
    /// Number of harmonics of the sine baseline
    pub n_sine: usize,
    /// Random seed of the optimizer and the sampler
    pub seed: u64,
}

impl TransitFitConfig {
    #[inline]
    pub fn default_npop() -> usize {
        30
    }

    #[inline]
    pub fn default_de_niter() -> usize {
        1000
    }

    #[inline]
    pub fn default_mcmc_niter() -> usize {
        100
    }

    #[inline]
    pub fn default_mcmc_repeats() -> usize {
        2
    }

    #[inline]
    pub fn default_nsamples() -> usize {
        1
    }

    #[inline]
    pub fn default_exptime() -> f64 {
        1.0
    }

    #[inline]
    pub fn default_n_sine() -> usize {
        1
    }

    #[inline]
    pub fn default_seed() -> u64 {
        0
    }
}

impl Default for TransitFitConfig {
    fn default() -> Self {
        Self {
            npop: Self::default_npop(),
            de_niter: Self::default_de_niter(),
            mcmc_niter: Self::default_mcmc_niter(),
            mcmc_repeats: Self::default_mcmc_repeats(),
            nsamples: Self::default_nsamples(),
            exptime: Self::default_exptime(),
            n_sine: Self::default_n_sine(),
            seed: Self::default_seed(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serde_round_trip() {
        let config = TransitFitConfig {
            npop: 50,
            mcmc_repeats: 3,
            ..TransitFitConfig::default()
        };
        let json = serde_json::to_string(&config).unwrap();
        let restored: TransitFitConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(config, restored);
    }

    #[test]
    fn missing_fields_use_defaults() {
        let config: TransitFitConfig = serde_json::from_str(r#"{"n_sine": 2}"#).unwrap();
        assert_eq!(config.n_sine, 2);
        assert_eq!(config.npop, TransitFitConfig::default_npop());
        assert_eq!(config.exptime, 1.0);
    }
}
