//! Immutable export view of the measurement store.
//!
//! The serde layout of [`MeasurementSnapshot`] is the JSON export format:
//!
//! ```json
//! {
//!   "metadata": { "exported": "...", "calibration": { "length_per_pixel": 0.08, "source": "page" } },
//!   "rectangles": { "pre": { ... }, "post": { ... } },
//!   "measurements": [ ... ],
//!   "displacements": [ ... ]
//! }
//! ```

use serde::{Deserialize, Serialize};

use super::line::Measurement;
use super::particle::ParticleDisplacement;
use super::rectangle::{Rectangle, RectangleGroup};
use crate::calibration::{Calibration, CalibrationError, CalibrationSource};

/// Calibration as written to an export file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CalibrationInfo {
    pub length_per_pixel: Option<f64>,
    pub source: Option<CalibrationSource>,
}

impl From<Option<&Calibration>> for CalibrationInfo {
    fn from(calibration: Option<&Calibration>) -> Self {
        Self {
            length_per_pixel: calibration.map(|c| c.length_per_pixel()),
            source: calibration.map(|c| c.source()),
        }
    }
}

/// Export metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotMetadata {
    /// Export timestamp (RFC 3339).
    pub exported: String,
    #[serde(default)]
    pub calibration: CalibrationInfo,
}

/// The (at most two) stored rectangles.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RectangleSet {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pre: Option<Rectangle>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post: Option<Rectangle>,
}

impl RectangleSet {
    pub fn get(&self, group: RectangleGroup) -> Option<&Rectangle> {
        match group {
            RectangleGroup::Pre => self.pre.as_ref(),
            RectangleGroup::Post => self.post.as_ref(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.pre.is_none() && self.post.is_none()
    }
}

/// Point-in-time copy of calibration and all records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeasurementSnapshot {
    pub metadata: SnapshotMetadata,
    #[serde(default)]
    pub rectangles: RectangleSet,
    #[serde(default)]
    pub measurements: Vec<Measurement>,
    #[serde(default)]
    pub displacements: Vec<ParticleDisplacement>,
}

impl MeasurementSnapshot {
    /// Rebuild the calibration recorded in the metadata.
    ///
    /// `Ok(None)` when no scale was stored. A missing source tag is
    /// reported as [`CalibrationSource::Loaded`]; a stored scale that is not
    /// a positive finite number is an error.
    pub fn calibration(&self) -> Result<Option<Calibration>, CalibrationError> {
        let info = &self.metadata.calibration;
        let Some(length_per_pixel) = info.length_per_pixel else {
            return Ok(None);
        };
        let source = info.source.unwrap_or(CalibrationSource::Loaded);
        Calibration::new(length_per_pixel, source).map(Some)
    }

    /// True when there is nothing worth exporting.
    pub fn is_empty(&self) -> bool {
        self.rectangles.is_empty() && self.measurements.is_empty() && self.displacements.is_empty()
    }
}
