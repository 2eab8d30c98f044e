use cobyla::{Func, RhoBeg, StopTols, minimize};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// COBYLA (Constrained Optimization BY Linear Approximations) minimizer wrapper
///
/// COBYLA is a derivative-free local optimization algorithm, here it refines the best member of
/// the prior population. Box bounds are passed to the algorithm directly, no other constraints
/// are used.
///
/// The algorithm works by building linear approximations to the objective and constraint functions
/// and is described in M.J.D. Powell's 1994 paper "A direct search optimization method that models
/// the objective and constraint functions by linear interpolation".
#[derive(Clone, Debug, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename = "Cobyla")]
pub struct CobylaOptimizer {
    pub niterations: usize,
    pub rhobeg: f64,
    pub ftol_rel: f64,
}

/// Outcome of a COBYLA minimization
#[derive(Clone, Debug, PartialEq)]
pub struct CobylaResult {
    pub x: Vec<f64>,
    pub value: f64,
    pub success: bool,
}

impl CobylaOptimizer {
    /// Create a new [CobylaOptimizer].
    ///
    /// # Arguments
    /// - `niterations`: maximum number of function evaluations
    /// - `rhobeg`: initial change to parameters (controls initial simplex size)
    /// - `ftol_rel`: relative tolerance on function value for convergence
    pub fn new(niterations: usize, rhobeg: f64, ftol_rel: f64) -> Self {
        assert!(niterations > 0, "niterations must be positive");
        assert!(rhobeg > 0.0, "rhobeg must be positive");
        assert!(rhobeg.is_finite(), "rhobeg must be finite");
        assert!(ftol_rel >= 0.0, "ftol_rel must be non-negative");
        assert!(ftol_rel.is_finite(), "ftol_rel must be finite");
        Self {
            niterations,
            rhobeg,
            ftol_rel,
        }
    }

    #[inline]
    pub fn default_niterations() -> usize {
        1000
    }

    #[inline]
    pub fn default_rhobeg() -> f64 {
        0.5
    }

    #[inline]
    pub fn default_ftol_rel() -> f64 {
        1e-6
    }

    /// Minimize `objective` starting from `x0`
    ///
    /// Non-finite objective values are replaced with a large finite penalty, so the search walks
    /// away from regions where the model is undefined.
    pub fn minimize<F>(&self, objective: F, x0: &[f64], bounds: &[(f64, f64)]) -> CobylaResult
    where
        F: Fn(&[f64]) -> f64,
    {
        let func = |x: &[f64], _user_data: &mut ()| -> f64 {
            let value = objective(x);
            if value.is_finite() { value } else { f64::MAX.sqrt() }
        };

        // No additional constraints beyond bounds
        let constraints: Vec<&dyn Func<()>> = vec![];

        let stop_tol = StopTols {
            ftol_rel: self.ftol_rel,
            ..StopTols::default()
        };

        let result = minimize(
            func,
            x0,
            bounds,
            &constraints,
            (),
            self.niterations,
            RhoBeg::All(self.rhobeg),
            Some(stop_tol),
        );

        match result {
            Ok((status, x, value)) => CobylaResult {
                x,
                value,
                success: matches!(
                    status,
                    cobyla::SuccessStatus::Success
                        | cobyla::SuccessStatus::FtolReached
                        | cobyla::SuccessStatus::XtolReached
                ),
            },
            // Precision loss near a converged optimum
            Err((cobyla::FailStatus::RoundoffLimited, x, value)) => CobylaResult {
                x,
                value,
                success: value.is_finite(),
            },
            Err((status, x, value)) => {
                tracing::debug!(?status, value, "COBYLA failed");
                CobylaResult {
                    x,
                    value,
                    success: false,
                }
            }
        }
    }
}

impl Default for CobylaOptimizer {
    fn default() -> Self {
        Self::new(
            Self::default_niterations(),
            Self::default_rhobeg(),
            Self::default_ftol_rel(),
        )
    }
}
