//! Light-curve model: transit times a multiplicative baseline
//!
//! The model is an ordered list of [ModelComponent]s fixed before the posterior is built. Every
//! component reads its own parameter ranges of the shared parameter vector.

pub mod baseline;
pub use baseline::SineBaseline;

pub mod limb_darkening;
pub use limb_darkening::LimbDarkeningTable;

pub mod orbit;

pub mod transit;
pub use transit::{TransitModel, TransitShape};

use ndarray::{Array1, ArrayView1};

/// Integration of the model over a finite exposure
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Supersampling {
    pub nsamples: usize,
    /// Exposure length [d]
    pub exptime: f64,
}

impl Supersampling {
    pub fn new(nsamples: usize, exptime: f64) -> Self {
        assert!(nsamples > 0, "nsamples must be positive");
        Self { nsamples, exptime }
    }

    /// Time offsets of the sub-exposures relative to the exposure centre
    pub fn offsets(&self) -> Vec<f64> {
        let n = self.nsamples as f64;
        (0..self.nsamples)
            .map(|i| self.exptime * ((i as f64 + 0.5) / n - 0.5))
            .collect()
    }
}

impl Default for Supersampling {
    fn default() -> Self {
        Self {
            nsamples: 1,
            exptime: 0.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum ModelComponent {
    Transit(TransitModel),
    SineBaseline(SineBaseline),
}

impl ModelComponent {
    pub fn evaluate(&self, times: ArrayView1<f64>, pv: &[f64]) -> Array1<f64> {
        match self {
            Self::Transit(model) => model.evaluate(times, pv),
            Self::SineBaseline(model) => model.evaluate(times, pv),
        }
    }

    pub fn is_transit(&self) -> bool {
        matches!(self, Self::Transit(_))
    }
}

/// Product of the model components
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FluxModel {
    components: Vec<ModelComponent>,
}

impl FluxModel {
    pub fn new(components: Vec<ModelComponent>) -> Self {
        Self { components }
    }

    fn product<'a>(
        components: impl Iterator<Item = &'a ModelComponent>,
        times: ArrayView1<f64>,
        pv: &[f64],
    ) -> Array1<f64> {
        components.fold(Array1::ones(times.len()), |acc, component| {
            acc * component.evaluate(times, pv)
        })
    }

    /// Full model flux
    pub fn flux_model(&self, times: ArrayView1<f64>, pv: &[f64]) -> Array1<f64> {
        Self::product(self.components.iter(), times, pv)
    }

    /// Transit part of the model
    pub fn transit_model(&self, times: ArrayView1<f64>, pv: &[f64]) -> Array1<f64> {
        Self::product(
            self.components.iter().filter(|c| c.is_transit()),
            times,
            pv,
        )
    }

    /// Baseline part of the model
    pub fn baseline(&self, times: ArrayView1<f64>, pv: &[f64]) -> Array1<f64> {
        Self::product(
            self.components.iter().filter(|c| !c.is_transit()),
            times,
            pv,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_abs_diff_eq;
    use ndarray::array;

    #[test]
    fn supersampling_offsets() {
        assert_eq!(Supersampling::default().offsets(), vec![0.0]);
        let offsets = Supersampling::new(4, 0.02).offsets();
        assert_abs_diff_eq!(&offsets[..], &[-0.0075, -0.0025, 0.0025, 0.0075][..], epsilon = 1e-15);
    }

    #[test]
    fn flux_is_transit_times_baseline() {
        let model = FluxModel::new(vec![
            ModelComponent::Transit(TransitModel::new(
                0..4,
                4..5,
                5..7,
                Supersampling::default(),
            )),
            ModelComponent::SineBaseline(SineBaseline::new(1, 7..9, 0.0)),
        ]);
        let pv = [0.0, 3.5, 1.4, 0.0, 0.01, 0.0, 0.0, 0.1, 0.002];
        let t = array![0.0, 0.02, 1.75, 2.5];
        let total = model.flux_model(t.view(), &pv);
        let transit = model.transit_model(t.view(), &pv);
        let baseline = model.baseline(t.view(), &pv);
        assert_abs_diff_eq!(total, &transit * &baseline, epsilon = 1e-15);
        assert_eq!(transit[2], 1.0);
        assert!(transit[0] < 1.0);
    }
}
