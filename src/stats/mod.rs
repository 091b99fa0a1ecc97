//! Streaming statistics shared by the aggregator and the calibrator.

pub mod circular;
pub mod linear;

pub use circular::{circular_mean, circular_std, CircularAccumulator, HueStats};
pub use linear::{LinearAccumulator, SampleMoments};
