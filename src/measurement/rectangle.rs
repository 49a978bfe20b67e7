//! Specimen rectangles, one per `pre`/`post` group.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::error::MeasurementError;
use super::geometry::{Corners, PhysicalPoint, PixelPoint};
use crate::calibration::Calibration;

/// Specimen state a rectangle belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RectangleGroup {
    Pre,
    Post,
}

impl RectangleGroup {
    pub const ALL: [RectangleGroup; 2] = [RectangleGroup::Pre, RectangleGroup::Post];

    /// Slot index in the store's fixed two-entry table.
    pub fn index(&self) -> usize {
        match self {
            RectangleGroup::Pre => 0,
            RectangleGroup::Post => 1,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RectangleGroup::Pre => "pre",
            RectangleGroup::Post => "post",
        }
    }

    /// Heading used in visualizations.
    pub fn title(&self) -> &'static str {
        match self {
            RectangleGroup::Pre => "Pre-Test Specimen",
            RectangleGroup::Post => "Post-Test Specimen",
        }
    }
}

impl fmt::Display for RectangleGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RectangleGroup {
    type Err = MeasurementError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pre" => Ok(RectangleGroup::Pre),
            "post" => Ok(RectangleGroup::Post),
            other => Err(MeasurementError::NotFound(format!("rectangle group '{}'", other))),
        }
    }
}

/// An axis-aligned rectangle recorded from two diagonal clicks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rectangle {
    pub group: RectangleGroup,
    pub page: usize,
    pub corners_px: Corners<PixelPoint>,
    pub width_px: f64,
    pub height_px: f64,
    /// Corners relative to this rectangle's bottom-left corner, Y up.
    #[serde(default)]
    pub corners_mm: Option<Corners<PhysicalPoint>>,
    #[serde(default)]
    pub width_mm: Option<f64>,
    #[serde(default)]
    pub height_mm: Option<f64>,
}

impl Rectangle {
    /// Build a rectangle from two diagonal corner clicks.
    ///
    /// Fails with [`MeasurementError::DegenerateRectangle`] when the clicks
    /// share an X or a Y coordinate.
    pub fn from_diagonal(
        group: RectangleGroup,
        page: usize,
        corner_a: PixelPoint,
        corner_b: PixelPoint,
        calibration: Option<&Calibration>,
    ) -> Result<Self, MeasurementError> {
        let width_px = (corner_a.x - corner_b.x).abs();
        let height_px = (corner_a.y - corner_b.y).abs();

        // Negated comparison so NaN is rejected too
        if !(width_px > 0.0) || !(height_px > 0.0) {
            return Err(MeasurementError::DegenerateRectangle { width_px, height_px });
        }

        let mut rectangle = Self {
            group,
            page,
            corners_px: Corners::from_diagonal(corner_a, corner_b),
            width_px,
            height_px,
            corners_mm: None,
            width_mm: None,
            height_mm: None,
        };
        rectangle.apply_calibration(calibration);
        Ok(rectangle)
    }

    /// Re-derive the physical fields from the pixel corners.
    pub fn apply_calibration(&mut self, calibration: Option<&Calibration>) {
        match calibration {
            Some(calibration) => {
                let corners = self.corners_px.map(|p| self.locate(p, calibration));
                self.corners_mm = Some(corners);
                self.width_mm = Some(calibration.pixels_to_length(self.width_px));
                self.height_mm = Some(calibration.pixels_to_length(self.height_px));
            }
            None => {
                self.corners_mm = None;
                self.width_mm = None;
                self.height_mm = None;
            }
        }
    }

    /// Express a pixel point in this rectangle's physical frame.
    ///
    /// The origin is the rectangle's bottom-left pixel corner; pixel Y grows
    /// downward while physical Y grows upward.
    pub fn locate(&self, point: PixelPoint, calibration: &Calibration) -> PhysicalPoint {
        let origin = self.corners_px.bottom_left;
        PhysicalPoint::new(
            calibration.pixels_to_length(point.x - origin.x),
            calibration.pixels_to_length(origin.y - point.y),
        )
    }
}
