//! Measurement data models and the calibrated measurement store.

mod error;
mod geometry;
mod line;
mod particle;
mod rectangle;
mod snapshot;
mod store;

pub use error::MeasurementError;
pub use geometry::{Corners, PhysicalPoint, PixelPoint};
pub use line::{Measurement, MeasurementGroup};
pub use particle::ParticleDisplacement;
pub use rectangle::{Rectangle, RectangleGroup};
pub use snapshot::{CalibrationInfo, MeasurementSnapshot, RectangleSet, SnapshotMetadata};
pub use store::MeasurementStore;
