//! Quadratic limb darkening

use crate::data::SortedArray;
use crate::error::TransitFitError;

use serde::Deserialize;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Quadratic law coefficients `(u1, u2)` from Kipping's `(q1, q2)` parametrisation
#[inline]
pub fn quadratic_coefficients(q1: f64, q2: f64) -> (f64, f64) {
    let sqrt_q1 = q1.sqrt();
    (2.0 * sqrt_q1 * q2, sqrt_q1 * (1.0 - 2.0 * q2))
}

/// Relative surface brightness at radial distance `r` from the disk centre
#[inline]
pub fn quadratic_intensity(r: f64, u1: f64, u2: f64) -> f64 {
    let one_minus_mu = 1.0 - (1.0 - r.clamp(0.0, 1.0).powi(2)).sqrt();
    1.0 - u1 * one_minus_mu - u2 * one_minus_mu.powi(2)
}

/// Disk-averaged brightness relative to the centre, `1 - u1 / 3 - u2 / 6`
#[inline]
pub fn quadratic_disk_norm(u1: f64, u2: f64) -> f64 {
    1.0 - u1 / 3.0 - u2 / 6.0
}

#[derive(Deserialize)]
struct LimbDarkeningRecord {
    teff: f64,
    q1: f64,
    q2: f64,
}

/// Tabulated `(q1, q2)` coefficients as a function of stellar effective temperature
///
/// Values between nodes are linearly interpolated, temperatures outside of the tabulated range
/// are rejected.
#[derive(Clone, Debug, PartialEq)]
pub struct LimbDarkeningTable {
    teff: Vec<f64>,
    q1: Vec<f64>,
    q2: Vec<f64>,
}

impl LimbDarkeningTable {
    /// Table from `(teff, q1, q2)` rows, `teff` must be strictly increasing
    pub fn new(rows: impl IntoIterator<Item = (f64, f64, f64)>) -> Result<Self, TransitFitError> {
        let (teff, q1, q2): (Vec<_>, Vec<_>, Vec<_>) = itertools::multiunzip(rows);
        if teff.len() < 2 {
            return Err(TransitFitError::LimbDarkeningTable(
                "at least two rows are required".into(),
            ));
        }
        if !SortedArray::is_strictly_increasing(&teff) {
            return Err(TransitFitError::LimbDarkeningTable(
                "effective temperature must be strictly increasing".into(),
            ));
        }
        if teff.iter().chain(&q1).chain(&q2).any(|x| !x.is_finite()) {
            return Err(TransitFitError::LimbDarkeningTable(
                "table contains non-finite values".into(),
            ));
        }
        Ok(Self { teff, q1, q2 })
    }

    /// Read a CSV table with `teff`, `q1` and `q2` columns
    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self, TransitFitError> {
        let mut csv_reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
        let rows = csv_reader
            .deserialize()
            .map(|record| -> Result<_, csv::Error> {
                let LimbDarkeningRecord { teff, q1, q2 } = record?;
                Ok((teff, q1, q2))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(rows)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, TransitFitError> {
        let file = File::open(path.as_ref())
            .map_err(|err| TransitFitError::LimbDarkeningTable(err.to_string()))?;
        Self::from_csv_reader(file)
    }

    pub fn teff_range(&self) -> (f64, f64) {
        (self.teff[0], self.teff[self.teff.len() - 1])
    }

    /// Interpolated `(q1, q2)` at the given effective temperature [K]
    pub fn interpolate(&self, teff: f64) -> Result<(f64, f64), TransitFitError> {
        let (min, max) = self.teff_range();
        if !(min..=max).contains(&teff) {
            return Err(TransitFitError::TeffOutOfRange { teff, min, max });
        }
        // index of the first node strictly above teff, clipped to the last interval
        let i = self
            .teff
            .partition_point(|&x| x <= teff)
            .clamp(1, self.teff.len() - 1);
        let w = (teff - self.teff[i - 1]) / (self.teff[i] - self.teff[i - 1]);
        let lerp = |y: &[f64]| y[i - 1] + w * (y[i] - y[i - 1]);
        Ok((lerp(&self.q1), lerp(&self.q2)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;

    const TABLE: &str = "teff,q1,q2\n3000,0.60,0.20\n4000,0.50,0.30\n6000,0.30,0.40\n";

    #[test]
    fn kipping_to_quadratic() {
        let (u1, u2) = quadratic_coefficients(0.36, 0.25);
        assert_relative_eq!(u1, 0.3);
        assert_relative_eq!(u2, 0.3);
        assert_eq!(quadratic_coefficients(0.0, 0.5), (0.0, 0.0));
    }

    #[test]
    fn intensity_profile() {
        assert_relative_eq!(quadratic_intensity(0.0, 0.4, 0.2), 1.0);
        assert_relative_eq!(quadratic_intensity(1.0, 0.4, 0.2), 0.4);
        assert_relative_eq!(quadratic_disk_norm(0.6, 0.6), 0.7);
    }

    #[test]
    fn interpolate_table() {
        let table = LimbDarkeningTable::from_csv_reader(TABLE.as_bytes()).unwrap();
        assert_eq!(table.teff_range(), (3000.0, 6000.0));
        let (q1, q2) = table.interpolate(5000.0).unwrap();
        assert_relative_eq!(q1, 0.4);
        assert_relative_eq!(q2, 0.35);
        let (q1, q2) = table.interpolate(6000.0).unwrap();
        assert_relative_eq!(q1, 0.3);
        assert_relative_eq!(q2, 0.4);
        let (q1, _) = table.interpolate(3000.0).unwrap();
        assert_relative_eq!(q1, 0.6);
    }

    #[test]
    fn out_of_range() {
        let table = LimbDarkeningTable::from_csv_reader(TABLE.as_bytes()).unwrap();
        assert_eq!(
            table.interpolate(7000.0),
            Err(TransitFitError::TeffOutOfRange {
                teff: 7000.0,
                min: 3000.0,
                max: 6000.0
            })
        );
    }

    #[test]
    fn table_from_file() {
        let path = std::env::temp_dir().join(format!("ld-table-{}.csv", std::process::id()));
        std::fs::write(&path, TABLE).unwrap();
        let from_file = LimbDarkeningTable::from_path(&path);
        std::fs::remove_file(&path).unwrap();
        let from_reader = LimbDarkeningTable::from_csv_reader(TABLE.as_bytes()).unwrap();
        assert_eq!(from_file.unwrap(), from_reader);

        assert!(matches!(
            LimbDarkeningTable::from_path(std::env::temp_dir().join("no-such-ld-table.csv")),
            Err(TransitFitError::LimbDarkeningTable(_))
        ));
    }

    #[test]
    fn unsorted_table() {
        let table = "teff,q1,q2\n4000,0.5,0.3\n3000,0.6,0.2\n";
        assert!(matches!(
            LimbDarkeningTable::from_csv_reader(table.as_bytes()),
            Err(TransitFitError::LimbDarkeningTable(_))
        ));
    }
}
