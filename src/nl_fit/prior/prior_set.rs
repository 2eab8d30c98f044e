use crate::nl_fit::prior::ln_prior_1d::LnPrior1D;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Ordered prior overrides keyed by parameter name
///
/// Later entries for the same parameter replace earlier ones when applied to a
/// [ParameterSet](crate::nl_fit::parameters::ParameterSet).
#[derive(Clone, Debug, Default, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct PriorSet {
    priors: Vec<(String, LnPrior1D)>,
}

impl PriorSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, name: impl Into<String>, prior: LnPrior1D) -> &mut Self {
        self.priors.push((name.into(), prior));
        self
    }

    /// The effective prior of `name`, i.e. the last one set
    pub fn get(&self, name: &str) -> Option<&LnPrior1D> {
        self.priors
            .iter()
            .rev()
            .find(|(n, _)| n == name)
            .map(|(_, prior)| prior)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &LnPrior1D)> {
        self.priors.iter().map(|(name, prior)| (name.as_str(), prior))
    }

    pub fn len(&self) -> usize {
        self.priors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.priors.is_empty()
    }
}
