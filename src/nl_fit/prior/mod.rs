pub mod ln_prior_1d;
pub use ln_prior_1d::{LnPrior1D, LnPrior1DTrait};

pub mod prior_set;
pub use prior_set::PriorSet;
