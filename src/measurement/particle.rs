//! Particle displacement tracking between pre- and post-test images.

use serde::{Deserialize, Serialize};

use super::geometry::PixelPoint;
use crate::calibration::Calibration;

/// A particle tracked from its pre-test position to its post-test position.
///
/// The two positions may lie on different pages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParticleDisplacement {
    pub id: u32,
    pub label: String,
    pub pre_position_px: PixelPoint,
    pub post_position_px: PixelPoint,
    pub pre_page: usize,
    pub post_page: usize,
    pub dx_px: f64,
    pub dy_px: f64,
    pub magnitude_px: f64,
    #[serde(default)]
    pub dx_mm: Option<f64>,
    #[serde(default)]
    pub dy_mm: Option<f64>,
    #[serde(default)]
    pub magnitude_mm: Option<f64>,
}

impl ParticleDisplacement {
    /// Create a displacement record from its two clicked positions.
    pub fn new(
        id: u32,
        label: impl Into<String>,
        pre_position_px: PixelPoint,
        pre_page: usize,
        post_position_px: PixelPoint,
        post_page: usize,
        calibration: Option<&Calibration>,
    ) -> Self {
        let dx_px = post_position_px.x - pre_position_px.x;
        let dy_px = post_position_px.y - pre_position_px.y;

        let mut particle = Self {
            id,
            label: label.into(),
            pre_position_px,
            post_position_px,
            pre_page,
            post_page,
            dx_px,
            dy_px,
            magnitude_px: dx_px.hypot(dy_px),
            dx_mm: None,
            dy_mm: None,
            magnitude_mm: None,
        };
        particle.apply_calibration(calibration);
        particle
    }

    /// Re-derive the physical displacement.
    ///
    /// Each axis is scaled on its own and the magnitude is recomputed from
    /// the scaled components rather than scaling `magnitude_px`.
    pub fn apply_calibration(&mut self, calibration: Option<&Calibration>) {
        match calibration {
            Some(calibration) => {
                let dx_mm = calibration.pixels_to_length(self.dx_px);
                let dy_mm = calibration.pixels_to_length(self.dy_px);
                self.dx_mm = Some(dx_mm);
                self.dy_mm = Some(dy_mm);
                self.magnitude_mm = Some(dx_mm.hypot(dy_mm));
            }
            None => {
                self.dx_mm = None;
                self.dy_mm = None;
                self.magnitude_mm = None;
            }
        }
    }

    /// Human-readable summary for the session log.
    pub fn summary(&self) -> String {
        match (self.dx_mm, self.dy_mm, self.magnitude_mm) {
            (Some(dx), Some(dy), Some(mag)) => format!(
                "[{}] Displacement: ({:.1}, {:.1}) px = ({:.3}, {:.3}) mm, magnitude: {:.3} mm",
                self.label, self.dx_px, self.dy_px, dx, dy, mag
            ),
            _ => format!(
                "[{}] Displacement: ({:.1}, {:.1}) px, magnitude: {:.1} px",
                self.label, self.dx_px, self.dy_px, self.magnitude_px
            ),
        }
    }
}
