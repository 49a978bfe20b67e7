//! Calibration module for converting pixel distances to physical units.

mod scale;

pub use scale::{Calibration, CalibrationError, CalibrationSource, ReferenceLine};
