use crate::mode::{EpochParity, FitMode};

/// Error returned from the transit fit step and its building blocks
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum TransitFitError {
    #[error("unknown fit mode {0:?}, expected one of \"all\", \"even\" or \"odd\"")]
    UnknownMode(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(&'static str),

    #[error("light-curve data must be initialised before adding a baseline model")]
    UninitializedData,

    #[error("selection retains {actual} observations, at least {minimum} are required")]
    InsufficientData { actual: usize, minimum: usize },

    #[error("no epochs in the {0} subset, mean delta log likelihood is undefined")]
    EmptyEpochSubset(EpochSubset),

    #[error("delta log likelihood of the {0} subset has NaN values")]
    NanEpochScore(EpochSubset),

    #[error("{mode} fit requires a completed \"all\" fit to seed its priors")]
    MissingReferenceFit { mode: FitMode },

    #[error("unknown model parameter {0:?}")]
    UnknownParameter(String),

    #[error("invalid prior for {parameter}: {reason}")]
    InvalidPrior {
        parameter: String,
        reason: &'static str,
    },

    #[error("invalid ephemeris: {0}")]
    InvalidEphemeris(&'static str),

    #[error("array {name} has length {actual}, expected {expected}")]
    ShapeMismatch {
        name: &'static str,
        actual: usize,
        expected: usize,
    },

    #[error("noise standard deviation must be positive and finite, got {0}")]
    InvalidNoise(f64),

    #[error("limb darkening table error: {0}")]
    LimbDarkeningTable(String),

    #[error("effective temperature {teff} K is outside of the tabulated range [{min}, {max}] K")]
    TeffOutOfRange { teff: f64, min: f64, max: f64 },

    #[error("sampler failed: {0}")]
    Sampler(String),
}

impl TransitFitError {
    pub(crate) fn check_len(name: &'static str, actual: usize, expected: usize) -> Result<(), Self> {
        if actual == expected {
            Ok(())
        } else {
            Err(Self::ShapeMismatch {
                name,
                actual,
                expected,
            })
        }
    }
}

impl From<csv::Error> for TransitFitError {
    fn from(err: csv::Error) -> Self {
        Self::LimbDarkeningTable(err.to_string())
    }
}

/// Group of epochs a log-mean-exp summary is taken over
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EpochSubset {
    All,
    Parity(EpochParity),
}

impl std::fmt::Display for EpochSubset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::All => write!(f, "all"),
            Self::Parity(parity) => write!(f, "{parity}"),
        }
    }
}
