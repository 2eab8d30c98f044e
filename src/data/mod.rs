mod fit_data;
pub use fit_data::FitData;

mod light_curve;
pub use light_curve::{ptp, LightCurve};

mod sorted_array;
pub use sorted_array::SortedArray;
