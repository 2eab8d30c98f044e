//! Priors of a fit mode conditioned on the available context

use crate::ephemeris::Ephemeris;
use crate::error::TransitFitError;
use crate::mode::FitMode;
use crate::model::LimbDarkeningTable;
use crate::nl_fit::prior::{LnPrior1D, LnPrior1DTrait, PriorSet};
use crate::summary::PosteriorSummary;

use macro_const::macro_const;

macro_const! {
    const DOC: &str = r"
Prior overrides of a transit fit

- `all` mode: `tc ~ N(zero_epoch, 0.01)`, `p ~ N(period, 0.001)` and
  `k2 ~ U(depth / 2, 2 depth)` around the coarse ephemeris.
- `even` and `odd` modes: `tc`, `p`, `q1` and `q2` are normal priors with the median and the
  standard deviation of the reference `all` fit, `k2 ~ U(max(0.01^2, k2 / 2), max(0.08^2,
  min(0.6^2, 2 k2)))` with `k2` the reference median.
- If the stellar effective temperature and a limb darkening table are known, `q1` and `q2` are
  fixed to the interpolated values by normal priors with `1e-5` standard deviation.
";
}

/// Standard deviation of the `tc` prior around the coarse ephemeris [d]
pub const TC_PRIOR_STD: f64 = 0.01;
/// Standard deviation of the `p` prior around the coarse ephemeris [d]
pub const P_PRIOR_STD: f64 = 0.001;
/// Standard deviation of the limb darkening priors when the coefficients are known
pub const KNOWN_LD_PRIOR_STD: f64 = 1e-5;

const K2_MIN: f64 = 0.01 * 0.01;
const K2_MAX: f64 = 0.6 * 0.6;
const K2_MIN_UPPER: f64 = 0.08 * 0.08;

#[doc = DOC!()]
#[derive(Clone, Copy, Debug)]
pub struct PriorConfigurator<'a> {
    ephemeris: &'a Ephemeris,
    teff: Option<f64>,
    limb_darkening: Option<&'a LimbDarkeningTable>,
}

impl<'a> PriorConfigurator<'a> {
    pub fn new(ephemeris: &'a Ephemeris) -> Self {
        Self {
            ephemeris,
            teff: None,
            limb_darkening: None,
        }
    }

    pub fn with_limb_darkening(
        mut self,
        teff: Option<f64>,
        table: Option<&'a LimbDarkeningTable>,
    ) -> Self {
        self.teff = teff;
        self.limb_darkening = table;
        self
    }

    /// `reference` is the summary of the `all` fit, required by the `even` and `odd` modes
    pub fn build_priors(
        &self,
        mode: FitMode,
        reference: Option<&PosteriorSummary>,
    ) -> Result<PriorSet, TransitFitError> {
        let mut priors = PriorSet::new();
        match mode {
            FitMode::All => {
                let depth = self.ephemeris.depth;
                priors
                    .set("tc", LnPrior1D::normal(self.ephemeris.zero_epoch, TC_PRIOR_STD))
                    .set("p", LnPrior1D::normal(self.ephemeris.period, P_PRIOR_STD))
                    .set("k2", LnPrior1D::uniform(0.5 * depth, 2.0 * depth));
            }
            FitMode::Even | FitMode::Odd => {
                let reference = reference.ok_or(TransitFitError::MissingReferenceFit { mode })?;
                for name in ["tc", "p"] {
                    let estimate = reference.get(name)?;
                    priors.set(name, LnPrior1D::normal(estimate.med, estimate.err));
                }
                let k2 = reference.get("k2")?.med;
                priors.set(
                    "k2",
                    LnPrior1D::uniform(
                        K2_MIN.max(0.5 * k2),
                        K2_MIN_UPPER.max(K2_MAX.min(2.0 * k2)),
                    ),
                );
                for name in ["q1", "q2"] {
                    let estimate = reference.get(name)?;
                    priors.set(name, LnPrior1D::normal(estimate.med, estimate.err));
                }
            }
        }

        match (self.teff, self.limb_darkening) {
            (Some(teff), Some(table)) => {
                let (q1, q2) = table.interpolate(teff)?;
                tracing::debug!(teff, q1, q2, "limb darkening fixed by the stellar temperature");
                priors
                    .set("q1", LnPrior1D::normal(q1, KNOWN_LD_PRIOR_STD))
                    .set("q2", LnPrior1D::normal(q2, KNOWN_LD_PRIOR_STD));
            }
            (Some(teff), None) => {
                tracing::warn!(teff, "no limb darkening table, limb darkening is left free");
            }
            (None, _) => {}
        }

        for (name, prior) in priors.iter() {
            prior
                .validate()
                .map_err(|reason| TransitFitError::InvalidPrior {
                    parameter: name.to_owned(),
                    reason,
                })?;
        }
        Ok(priors)
    }
}
