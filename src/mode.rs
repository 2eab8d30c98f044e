use crate::error::TransitFitError;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Parity of an integer transit epoch
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum EpochParity {
    Even,
    Odd,
}

impl EpochParity {
    /// Parity of `epoch`, negative epochs included: -1 is odd
    #[inline]
    pub fn of(epoch: i64) -> Self {
        if epoch.rem_euclid(2) == 0 {
            Self::Even
        } else {
            Self::Odd
        }
    }

    #[inline]
    pub fn contains(self, epoch: i64) -> bool {
        Self::of(epoch) == self
    }
}

impl fmt::Display for EpochParity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Even => write!(f, "even"),
            Self::Odd => write!(f, "odd"),
        }
    }
}

/// Which transits a fit step uses
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum FitMode {
    All,
    Even,
    Odd,
}

impl FitMode {
    pub const ALL_MODES: [FitMode; 3] = [Self::All, Self::Even, Self::Odd];

    /// Parity filter of the mode, `None` for [FitMode::All]
    pub fn parity(self) -> Option<EpochParity> {
        match self {
            Self::All => None,
            Self::Even => Some(EpochParity::Even),
            Self::Odd => Some(EpochParity::Odd),
        }
    }

    /// Whether observations of the given epoch take part in the fit
    #[inline]
    pub fn accepts(self, epoch: i64) -> bool {
        self.parity().is_none_or(|parity| parity.contains(epoch))
    }

    /// Single-letter tag used to namespace report keys
    pub fn tag(self) -> char {
        match self {
            Self::All => 'A',
            Self::Even => 'E',
            Self::Odd => 'O',
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Even => "even",
            Self::Odd => "odd",
        }
    }
}

impl fmt::Display for FitMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FitMode {
    type Err = TransitFitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(Self::All),
            "even" => Ok(Self::Even),
            "odd" => Ok(Self::Odd),
            _ => Err(TransitFitError::UnknownMode(s.to_owned())),
        }
    }
}

impl TryFrom<&str> for FitMode {
    type Error = TransitFitError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        value.parse()
    }
}
