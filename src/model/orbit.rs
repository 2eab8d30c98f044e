//! Circular-orbit geometry

use std::f64::consts::PI;

/// Gravitational constant [m^3 kg^-1 s^-2]
pub const G: f64 = 6.674_30e-11;
const SECONDS_PER_DAY: f64 = 86_400.0;
/// g/cm^3 to kg/m^3
const DENSITY_CGS_TO_SI: f64 = 1e3;

/// Scaled semi-major axis `a / R_star` from stellar density [g/cm^3] and period [d]
#[inline]
pub fn as_from_rhop(rho: f64, period: f64) -> f64 {
    let period_s = period * SECONDS_PER_DAY;
    (G * rho * DENSITY_CGS_TO_SI * period_s.powi(2) / (3.0 * PI)).cbrt()
}

/// Orbital inclination [rad] from impact parameter and scaled semi-major axis
#[inline]
pub fn i_from_ba(b: f64, a: f64) -> f64 {
    (b / a).clamp(-1.0, 1.0).acos()
}

/// Total transit duration T14 [d]
#[inline]
pub fn t14(period: f64, k: f64, a: f64, inc: f64) -> f64 {
    let b = a * inc.cos();
    let chord = ((1.0 + k).powi(2) - b.powi(2)).sqrt() / (a * inc.sin());
    period / PI * chord.min(1.0).asin()
}

/// Full transit duration T23 [d], NaN for grazing geometry
#[inline]
pub fn t23(period: f64, k: f64, a: f64, inc: f64) -> f64 {
    let b = a * inc.cos();
    let chord2 = (1.0 - k).powi(2) - b.powi(2);
    if chord2 < 0.0 {
        return f64::NAN;
    }
    period / PI * (chord2.sqrt() / (a * inc.sin())).min(1.0).asin()
}

/// Sky-projected star-planet separation in stellar radii
///
/// Returns `None` while the planet is behind the star.
#[inline]
pub fn projected_distance(t: f64, tc: f64, period: f64, a: f64, inc: f64) -> Option<f64> {
    let phi = 2.0 * PI * (t - tc) / period;
    let (sin_phi, cos_phi) = phi.sin_cos();
    if cos_phi <= 0.0 {
        return None;
    }
    Some(a * (sin_phi.powi(2) + (inc.cos() * cos_phi).powi(2)).sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;

    #[test]
    fn solar_density_one_year() {
        // Earth-Sun: a / R_sun ~ 215
        let a = as_from_rhop(1.41, 365.25);
        assert_relative_eq!(a, 215.0, max_relative = 0.01);
    }

    #[test]
    fn central_transit_durations() {
        let period = 3.5;
        let a = 10.0;
        let k = 0.1;
        let inc = i_from_ba(0.0, a);
        assert_relative_eq!(inc, 0.5 * PI);
        assert_relative_eq!(t14(period, k, a, inc), period / PI * (1.1f64 / a).asin());
        assert_relative_eq!(t23(period, k, a, inc), period / PI * (0.9f64 / a).asin());
        assert!(t14(period, k, a, inc) > t23(period, k, a, inc));
    }

    #[test]
    fn grazing_has_no_t23() {
        let a = 10.0;
        let inc = i_from_ba(0.95, a);
        assert!(t23(3.5, 0.1, a, inc).is_nan());
        assert!(t14(3.5, 0.1, a, inc).is_finite());
    }

    #[test]
    fn distance_at_conjunction_is_impact_parameter() {
        let a = 12.0;
        let inc = i_from_ba(0.3, a);
        let z = projected_distance(5.0, 5.0, 3.5, a, inc).unwrap();
        assert_relative_eq!(z, 0.3, epsilon = 1e-12);
        assert!(projected_distance(5.0 + 1.75, 5.0, 3.5, a, inc).is_none());
    }
}
