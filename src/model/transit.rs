use crate::ephemeris::Ephemeris;
use crate::model::Supersampling;
use crate::model::limb_darkening::{
    quadratic_coefficients, quadratic_disk_norm, quadratic_intensity,
};
use crate::model::orbit::{as_from_rhop, i_from_ba, projected_distance};
use crate::nl_fit::parameters::Parameter;
use crate::nl_fit::prior::LnPrior1D;

use ndarray::{Array1, ArrayView1};
use std::f64::consts::PI;
use std::ops::Range;

const UNBOUNDED: (f64, f64) = (f64::NEG_INFINITY, f64::INFINITY);

/// Fraction of the stellar disk area covered by the planet, for uniform disks
///
/// `z` is the centre-to-centre distance and `k` the radius ratio, both in stellar radii.
pub fn overlap_fraction(z: f64, k: f64) -> f64 {
    if z >= 1.0 + k {
        0.0
    } else if z <= k - 1.0 {
        1.0
    } else if z <= 1.0 - k {
        k * k
    } else {
        let k2 = k * k;
        let z2 = z * z;
        let kappa0 = ((k2 + z2 - 1.0) / (2.0 * k * z)).clamp(-1.0, 1.0).acos();
        let kappa1 = ((1.0 - k2 + z2) / (2.0 * z)).clamp(-1.0, 1.0).acos();
        let chord = (4.0 * z2 - (1.0 + z2 - k2).powi(2)).max(0.0).sqrt();
        (k2 * kappa0 + kappa1 - 0.5 * chord) / PI
    }
}

/// Relative flux of a quadratically limb-darkened star occulted by a planet
///
/// The occulted area is weighted by the intensity at the planet centre for a fully overlapping
/// planet and at the middle of the overlapping annulus for ingress and egress.
pub fn transit_flux(z: f64, k: f64, u1: f64, u2: f64) -> f64 {
    let lambda = overlap_fraction(z, k);
    if lambda == 0.0 {
        return 1.0;
    }
    if lambda == 1.0 {
        return 0.0;
    }
    let r = if z <= 1.0 - k {
        z
    } else {
        (0.5 * (z - k + 1.0)).min(1.0)
    };
    1.0 - lambda * quadratic_intensity(r, u1, u2) / quadratic_disk_norm(u1, u2)
}

/// Transit shape for a fixed parameter vector
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TransitShape {
    pub tc: f64,
    pub period: f64,
    /// Scaled semi-major axis
    pub a: f64,
    /// Inclination [rad]
    pub inc: f64,
    /// Radius ratio
    pub k: f64,
    pub u1: f64,
    pub u2: f64,
}

impl TransitShape {
    pub fn flux(&self, t: f64) -> f64 {
        match projected_distance(t, self.tc, self.period, self.a, self.inc) {
            Some(z) => transit_flux(z, self.k, self.u1, self.u2),
            None => 1.0,
        }
    }
}

/// Circular-orbit transit model reading the orbit, planet and limb-darkening blocks
#[derive(Clone, Debug, PartialEq)]
pub struct TransitModel {
    orbit: Range<usize>,
    planet: Range<usize>,
    limb_darkening: Range<usize>,
    supersampling: Supersampling,
}

impl TransitModel {
    pub fn new(
        orbit: Range<usize>,
        planet: Range<usize>,
        limb_darkening: Range<usize>,
        supersampling: Supersampling,
    ) -> Self {
        assert_eq!(orbit.len(), 4, "orbit block must hold tc, p, rho and b");
        assert_eq!(planet.len(), 1, "planet block must hold k2");
        assert_eq!(limb_darkening.len(), 2, "limb darkening block must hold q1 and q2");
        Self {
            orbit,
            planet,
            limb_darkening,
            supersampling,
        }
    }

    pub fn shape(&self, pv: &[f64]) -> TransitShape {
        let orbit = &pv[self.orbit.clone()];
        let (tc, period, rho, b) = (orbit[0], orbit[1], orbit[2], orbit[3]);
        let k = pv[self.planet.start].sqrt();
        let (u1, u2) = quadratic_coefficients(
            pv[self.limb_darkening.start],
            pv[self.limb_darkening.start + 1],
        );
        let a = as_from_rhop(rho, period);
        TransitShape {
            tc,
            period,
            a,
            inc: i_from_ba(b, a),
            k,
            u1,
            u2,
        }
    }

    pub fn evaluate(&self, times: ArrayView1<f64>, pv: &[f64]) -> Array1<f64> {
        let shape = self.shape(pv);
        if self.supersampling.nsamples <= 1 {
            return times.mapv(|t| shape.flux(t));
        }
        let offsets = self.supersampling.offsets();
        times.mapv(|t| {
            offsets.iter().map(|dt| shape.flux(t + dt)).sum::<f64>() / offsets.len() as f64
        })
    }

    /// `tc`, `p`, `rho` and `b` with priors around the coarse ephemeris
    pub fn orbit_parameters(ephemeris: &Ephemeris) -> Vec<Parameter> {
        vec![
            Parameter::new(
                "tc",
                "zero epoch",
                "d",
                LnPrior1D::normal(ephemeris.zero_epoch, 0.01),
                UNBOUNDED,
            ),
            Parameter::new(
                "p",
                "orbital period",
                "d",
                LnPrior1D::normal(ephemeris.period, 0.001),
                UNBOUNDED,
            ),
            Parameter::new(
                "rho",
                "stellar density",
                "g/cm^3",
                LnPrior1D::uniform(0.1, 25.0),
                (0.05, 25.0),
            ),
            Parameter::new(
                "b",
                "impact parameter",
                "R_s",
                LnPrior1D::uniform(0.0, 1.0),
                (0.0, 1.0),
            ),
        ]
    }

    pub fn planet_parameters() -> Vec<Parameter> {
        vec![Parameter::new(
            "k2",
            "area ratio",
            "A_s",
            LnPrior1D::uniform(0.01f64.powi(2), 0.55f64.powi(2)),
            (0.01f64.powi(2), 0.6f64.powi(2)),
        )]
    }

    pub fn limb_darkening_parameters() -> Vec<Parameter> {
        ["q1", "q2"]
            .into_iter()
            .map(|name| {
                Parameter::new(
                    name,
                    "quadratic limb darkening coefficient",
                    "",
                    LnPrior1D::uniform(0.0, 1.0),
                    (0.0, 1.0),
                )
            })
            .collect()
    }
}
