#![doc = include_str!("../README.md")]


pub mod config;
pub use config::TransitFitConfig;

mod data;
pub use data::{FitData, LightCurve, SortedArray};

pub mod ephemeris;
pub use ephemeris::Ephemeris;

pub mod epoch_mask;
pub use epoch_mask::{MaskedObservations, compute_mask};

mod error;
pub use error::{EpochSubset, TransitFitError};

mod fit_step;
pub use fit_step::{
    InitializedFit, TargetContext, TransitFitResult, TransitFitStep, TransitFits,
    fit_all_even_odd,
};

mod mode;
pub use mode::{EpochParity, FitMode};

pub mod model;

pub mod nl_fit;
pub use nl_fit::{EnsembleFitRunner, FitRunner, LnPosterior, LnPrior1D, PosteriorSamples, prior};

pub mod plot;

mod prior_config;
pub use prior_config::PriorConfigurator;

mod report;
pub use report::{CardValue, Report, ReportCard};

pub mod significance;
pub use significance::EpochScores;

mod summary;
pub use summary::{ParameterEstimate, PosteriorSummary};

pub use ndarray;
