//! Registry of the model parameters
//!
//! Parameters are grouped into blocks which occupy contiguous ranges of the parameter vector.
//! Model components receive the ranges they read through [ParameterSlices] when the posterior is
//! assembled, the parameter vector itself is a plain `&[f64]`.

use crate::error::TransitFitError;
use crate::nl_fit::bounds::within_bounds;
use crate::nl_fit::prior::{LnPrior1D, LnPrior1DTrait, PriorSet};

use std::ops::Range;

/// A single named model parameter
#[derive(Clone, Debug, PartialEq)]
pub struct Parameter {
    pub name: String,
    pub description: &'static str,
    pub unit: &'static str,
    pub prior: LnPrior1D,
    pub bounds: (f64, f64),
}

impl Parameter {
    pub fn new(
        name: impl Into<String>,
        description: &'static str,
        unit: &'static str,
        prior: LnPrior1D,
        bounds: (f64, f64),
    ) -> Self {
        Self {
            name: name.into(),
            description,
            unit,
            prior,
            bounds,
        }
    }
}

/// Kind of a parameter block
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BlockKind {
    Orbit,
    Planet,
    LimbDarkening,
    Noise,
    Baseline,
}

/// Offsets of the parameter blocks inside the parameter vector
///
/// Ranges of blocks which are not registered are empty.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ParameterSlices {
    /// `tc`, `p`, `rho`, `b`
    pub orbit: Range<usize>,
    /// `k2`
    pub planet: Range<usize>,
    /// `q1`, `q2`
    pub limb_darkening: Range<usize>,
    /// `wn_loge_0`
    pub noise: Range<usize>,
    /// `c_sin`, `a_sin_0`, ...
    pub baseline: Range<usize>,
}

impl ParameterSlices {
    pub fn get(&self, kind: BlockKind) -> &Range<usize> {
        match kind {
            BlockKind::Orbit => &self.orbit,
            BlockKind::Planet => &self.planet,
            BlockKind::LimbDarkening => &self.limb_darkening,
            BlockKind::Noise => &self.noise,
            BlockKind::Baseline => &self.baseline,
        }
    }

    fn get_mut(&mut self, kind: BlockKind) -> &mut Range<usize> {
        match kind {
            BlockKind::Orbit => &mut self.orbit,
            BlockKind::Planet => &mut self.planet,
            BlockKind::LimbDarkening => &mut self.limb_darkening,
            BlockKind::Noise => &mut self.noise,
            BlockKind::Baseline => &mut self.baseline,
        }
    }
}

/// Ordered set of model parameters with their priors and hard bounds
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ParameterSet {
    parameters: Vec<Parameter>,
    slices: ParameterSlices,
}

impl ParameterSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a block of parameters and return its range in the parameter vector
    ///
    /// Panics if a block of the same kind is already registered.
    pub fn add_block(&mut self, kind: BlockKind, block: Vec<Parameter>) -> Range<usize> {
        assert!(
            self.slices.get(kind).is_empty(),
            "block {kind:?} is already registered"
        );
        let start = self.parameters.len();
        self.parameters.extend(block);
        let range = start..self.parameters.len();
        *self.slices.get_mut(kind) = range.clone();
        range
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.parameters.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.parameters.is_empty()
    }

    pub fn slices(&self) -> &ParameterSlices {
        &self.slices
    }

    pub fn iter(&self) -> impl Iterator<Item = &Parameter> {
        self.parameters.iter()
    }

    pub fn names(&self) -> Vec<String> {
        self.parameters.iter().map(|p| p.name.clone()).collect()
    }

    pub fn index_of(&self, name: &str) -> Result<usize, TransitFitError> {
        self.parameters
            .iter()
            .position(|p| p.name == name)
            .ok_or_else(|| TransitFitError::UnknownParameter(name.to_owned()))
    }

    pub fn get(&self, name: &str) -> Result<&Parameter, TransitFitError> {
        Ok(&self.parameters[self.index_of(name)?])
    }

    /// Replace the prior of a parameter
    pub fn set_prior(&mut self, name: &str, prior: LnPrior1D) -> Result<(), TransitFitError> {
        prior
            .validate()
            .map_err(|reason| TransitFitError::InvalidPrior {
                parameter: name.to_owned(),
                reason,
            })?;
        let i = self.index_of(name)?;
        self.parameters[i].prior = prior;
        Ok(())
    }

    pub fn apply_priors(&mut self, priors: &PriorSet) -> Result<(), TransitFitError> {
        for (name, prior) in priors.iter() {
            self.set_prior(name, prior.clone())?;
        }
        Ok(())
    }

    /// Sum of the log-priors, negative infinity outside of the hard bounds
    pub fn ln_prior(&self, pv: &[f64]) -> f64 {
        debug_assert_eq!(pv.len(), self.len());
        if !self
            .parameters
            .iter()
            .zip(pv)
            .all(|(p, &x)| within_bounds(x, p.bounds))
        {
            return f64::NEG_INFINITY;
        }
        self.parameters
            .iter()
            .zip(pv)
            .map(|(p, &x)| p.prior.ln_prior_1d(x))
            .sum()
    }

    /// Location and scale of every parameter for the normalised parameter space
    pub fn scaling(&self) -> ParameterScaling {
        let (loc, scale) = self
            .parameters
            .iter()
            .map(|p| {
                p.prior
                    .location_scale()
                    .or_else(|| {
                        let (lower, upper) = p.bounds;
                        (lower.is_finite() && upper.is_finite())
                            .then(|| (0.5 * (lower + upper), 0.5 * (upper - lower)))
                    })
                    .unwrap_or((0.0, 1.0))
            })
            .unzip();
        ParameterScaling { loc, scale }
    }
}

/// Affine map between the model parameters and the normalised ones `(x - loc) / scale`
///
/// Optimizers and samplers work in the normalised space, so that parameters like the absolute
/// transit time are O(1) numbers there.
#[derive(Clone, Debug, PartialEq)]
pub struct ParameterScaling {
    pub loc: Vec<f64>,
    pub scale: Vec<f64>,
}

impl ParameterScaling {
    pub fn to_internal(&self, external: &[f64]) -> Vec<f64> {
        external
            .iter()
            .zip(self.loc.iter().zip(&self.scale))
            .map(|(&x, (&loc, &scale))| (x - loc) / scale)
            .collect()
    }

    pub fn to_external(&self, internal: &[f64]) -> Vec<f64> {
        internal
            .iter()
            .zip(self.loc.iter().zip(&self.scale))
            .map(|(&x, (&loc, &scale))| loc + x * scale)
            .collect()
    }

    pub fn bounds_to_internal(&self, bounds: &[(f64, f64)]) -> Vec<(f64, f64)> {
        bounds
            .iter()
            .zip(self.loc.iter().zip(&self.scale))
            .map(|(&(lower, upper), (&loc, &scale))| ((lower - loc) / scale, (upper - loc) / scale))
            .collect()
    }
}
