//! Fitting infrastructure of the transit model
//!
//! # Parameter Spaces
//!
//! Two parameter spaces are used:
//!
//! ## 1. External (Model) Parameters
//!
//! The physical parameters as understood by users and as reported in the output, e.g. the
//! transit centre `tc` in days or the stellar density `rho` in g/cm^3. **Priors and hard bounds
//! are specified in this space**, and the [LnPosterior] is evaluated here.
//!
//! ## 2. Internal Parameters
//!
//! The parameters seen by the optimizer and the sampler, `(x - loc) / scale` with `loc` and
//! `scale` taken from the prior (or from the bounds for an improper prior), see
//! [ParameterScaling](parameters::ParameterScaling). All internal parameters are O(1) numbers,
//! which keeps the single-precision ensemble sampler able to resolve an absolute transit time of
//! thousands of days with a sub-minute prior width.
//!
//! # Fitting Workflow
//!
//! 1. Register parameter blocks and model components with [LnPosteriorBuilder], apply prior
//!    overrides and build the immutable [LnPosterior].
//!
//! 2. [FitRunner::optimize] finds the maximum a posteriori parameter vector.
//!
//! 3. [FitRunner::sample] draws posterior samples starting around the optimum.

mod bounds;

pub mod cobyla;
pub use cobyla::CobylaOptimizer;

pub mod ensemble;
pub use ensemble::EnsembleFitRunner;

pub mod mcmc;
pub use mcmc::EmceeSampler;

pub mod parameters;
pub use parameters::{BlockKind, Parameter, ParameterScaling, ParameterSet, ParameterSlices};

pub mod posterior;
pub use posterior::{LnPosterior, LnPosteriorBuilder};

pub mod prior;
pub use prior::{LnPrior1D, PriorSet};

pub mod runner;
pub use runner::{FitRunner, OptimizationResult, PosteriorSamples};
