use ndarray::{Array1, ArrayView1};
use std::ops::Deref;

// Underlying array is guaranteed to be sorted and contiguous
#[derive(Clone, Debug, PartialEq)]
pub struct SortedArray(pub Array1<f64>);

impl SortedArray {
    /// NaN values are placed at the end of the array
    pub fn new(mut v: Vec<f64>) -> Self {
        v.sort_unstable_by(f64::total_cmp);
        Self(Array1::from_vec(v))
    }

    pub fn is_strictly_increasing(slice: &[f64]) -> bool {
        slice.windows(2).all(|w| w[0] < w[1])
    }

    pub fn median(&self) -> f64 {
        assert_ne!(self.len(), 0);
        let i = (self.len() - 1) / 2;
        if self.len() % 2 == 0 {
            0.5 * (self[i] + self[i + 1])
        } else {
            self[i]
        }
    }
}

impl From<Vec<f64>> for SortedArray {
    fn from(v: Vec<f64>) -> Self {
        Self::new(v)
    }
}

impl From<ArrayView1<'_, f64>> for SortedArray {
    fn from(v: ArrayView1<'_, f64>) -> Self {
        v.to_vec().into()
    }
}

impl Deref for SortedArray {
    type Target = [f64];

    fn deref(&self) -> &Self::Target {
        self.0.as_slice().unwrap()
    }
}

#[allow(clippy::float_cmp)]
#[cfg(test)]
mod tests {
    use super::*;

    use ndarray::array;

    #[test]
    fn median_of_odd_and_even_lengths() {
        let odd: SortedArray = vec![3.0, -1.0, 2.0].into();
        assert_eq!(&odd[..], &[-1.0, 2.0, 3.0]);
        assert_eq!(odd.median(), 2.0);
        let even: SortedArray = array![4.0, 1.0, 3.0, 2.0].view().into();
        assert_eq!(even.median(), 2.5);
    }

    #[test]
    fn strictly_increasing() {
        assert!(SortedArray::is_strictly_increasing(&[3000.0, 4000.0, 5000.0]));
        assert!(!SortedArray::is_strictly_increasing(&[3000.0, 3000.0]));
        assert!(SortedArray::is_strictly_increasing(&[]));
    }
}
