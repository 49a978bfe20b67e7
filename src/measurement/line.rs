//! Two-point distance measurements.

use chrono::Local;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::error::MeasurementError;
use super::geometry::PixelPoint;
use super::rectangle::RectangleGroup;
use crate::calibration::Calibration;

/// Label attached to a line measurement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MeasurementGroup {
    #[default]
    Pre,
    Post,
    Fiber,
    Edge,
    Other,
}

impl MeasurementGroup {
    /// Cycle order for the group toggle key.
    pub const CYCLE: [MeasurementGroup; 5] = [
        MeasurementGroup::Pre,
        MeasurementGroup::Post,
        MeasurementGroup::Fiber,
        MeasurementGroup::Edge,
        MeasurementGroup::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MeasurementGroup::Pre => "pre",
            MeasurementGroup::Post => "post",
            MeasurementGroup::Fiber => "fiber",
            MeasurementGroup::Edge => "edge",
            MeasurementGroup::Other => "other",
        }
    }

    /// The group after this one, wrapping around.
    pub fn next(&self) -> Self {
        let index = Self::CYCLE.iter().position(|g| g == self).unwrap_or(0);
        Self::CYCLE[(index + 1) % Self::CYCLE.len()]
    }

    /// Rectangle slot for this group, if it has one.
    pub fn rectangle_group(&self) -> Option<RectangleGroup> {
        match self {
            MeasurementGroup::Pre => Some(RectangleGroup::Pre),
            MeasurementGroup::Post => Some(RectangleGroup::Post),
            _ => None,
        }
    }
}

impl fmt::Display for MeasurementGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MeasurementGroup {
    type Err = MeasurementError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Self::CYCLE
            .iter()
            .copied()
            .find(|g| g.as_str() == wanted)
            .ok_or_else(|| MeasurementError::NotFound(format!("measurement group '{}'", wanted)))
    }
}

/// A distance measurement between two clicked points on one page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    pub id: u32,
    pub label: String,
    pub group: MeasurementGroup,
    pub page: usize,
    pub point1_px: PixelPoint,
    pub point2_px: PixelPoint,
    pub dx_px: f64,
    pub dy_px: f64,
    pub pixel_distance: f64,
    #[serde(default)]
    pub length_mm: Option<f64>,
    /// Angle from horizontal, in degrees.
    pub angle_deg: f64,
    pub timestamp: String,
    #[serde(default)]
    pub notes: String,
}

impl Measurement {
    pub fn new(
        id: u32,
        label: impl Into<String>,
        group: MeasurementGroup,
        page: usize,
        point1_px: PixelPoint,
        point2_px: PixelPoint,
        calibration: Option<&Calibration>,
    ) -> Self {
        let dx_px = point2_px.x - point1_px.x;
        let dy_px = point2_px.y - point1_px.y;
        let pixel_distance = point1_px.distance_to(&point2_px);

        Self {
            id,
            label: label.into(),
            group,
            page,
            point1_px,
            point2_px,
            dx_px,
            dy_px,
            pixel_distance,
            length_mm: calibration.map(|c| c.pixels_to_length(pixel_distance)),
            angle_deg: dy_px.atan2(dx_px).to_degrees(),
            timestamp: Local::now().to_rfc3339(),
            notes: String::new(),
        }
    }

    pub fn apply_calibration(&mut self, calibration: Option<&Calibration>) {
        self.length_mm = calibration.map(|c| c.pixels_to_length(self.pixel_distance));
    }

    /// Human-readable summary for the session log.
    pub fn summary(&self) -> String {
        let length = self
            .length_mm
            .map(|mm| format!("{:.3} mm", mm))
            .unwrap_or_else(|| "N/A mm".to_string());
        format!(
            "[{}] {:.1} px = {} (group: {})",
            self.label, self.pixel_distance, length, self.group
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calibration::CalibrationSource;

    #[test]
    fn test_group_cycle() {
        let mut group = MeasurementGroup::Pre;
        let mut seen = Vec::new();
        for _ in 0..5 {
            seen.push(group);
            group = group.next();
        }
        assert_eq!(seen, MeasurementGroup::CYCLE.to_vec());
        assert_eq!(group, MeasurementGroup::Pre);
    }

    #[test]
    fn test_rectangle_group_mapping() {
        assert_eq!(MeasurementGroup::Post.rectangle_group(), Some(RectangleGroup::Post));
        assert_eq!(MeasurementGroup::Fiber.rectangle_group(), None);
        assert_eq!("edge".parse::<MeasurementGroup>(), Ok(MeasurementGroup::Edge));
    }

    #[test]
    fn test_measurement_values() {
        let calibration = Calibration::new(0.25, CalibrationSource::Manual).unwrap();
        let m = Measurement::new(
            1,
            "M1",
            MeasurementGroup::Fiber,
            3,
            PixelPoint::new(0.0, 0.0),
            PixelPoint::new(0.0, 40.0),
            Some(&calibration),
        );
        assert_eq!(m.pixel_distance, 40.0);
        assert_eq!(m.length_mm, Some(10.0));
        assert!((m.angle_deg - 90.0).abs() < 1e-9);
        assert_eq!(m.summary(), "[M1] 40.0 px = 10.000 mm (group: fiber)");
    }
}
