//! Measurement store errors.

use thiserror::Error;

use crate::calibration::CalibrationError;

/// Errors raised by store operations. A rejected operation never mutates
/// the store.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MeasurementError {
    #[error(transparent)]
    Calibration(#[from] CalibrationError),
    #[error("Degenerate rectangle ({width_px:.2} x {height_px:.2} px): width and height must be non-zero")]
    DegenerateRectangle { width_px: f64, height_px: f64 },
    #[error("Not found: {0}")]
    NotFound(String),
}
