//! Pixel-to-millimetre calibration.
//!
//! A calibration is a single isotropic scale factor (`length_per_pixel`,
//! millimetres per pixel) plus a tag recording where it came from:
//! - **page**: derived from the PDF page's physical width and the width of
//!   the rendered image
//! - **manual**: derived from two clicked points and a known distance
//! - **loaded**: restored from a previously exported JSON file

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::measurement::PixelPoint;

/// Calibration errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CalibrationError {
    #[error("Invalid calibration scale {0}: must be a positive, finite number")]
    InvalidCalibration(f64),
    #[error("Reference points coincide, cannot derive a scale from a zero-length line")]
    DegenerateReference,
}

/// Provenance of a calibration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CalibrationSource {
    Page,
    Manual,
    Loaded,
}

impl CalibrationSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            CalibrationSource::Page => "page",
            CalibrationSource::Manual => "manual",
            CalibrationSource::Loaded => "loaded",
        }
    }
}

impl fmt::Display for CalibrationSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The reference line a manual calibration was derived from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReferenceLine {
    pub page_index: Option<usize>,
    pub start: PixelPoint,
    pub end: PixelPoint,
    pub known_length_mm: f64,
}

/// Scale factor for converting pixel distances to millimetres.
#[derive(Debug, Clone, PartialEq)]
pub struct Calibration {
    length_per_pixel: f64,
    source: CalibrationSource,
    reference: Option<ReferenceLine>,
}

impl Calibration {
    /// Create a calibration, rejecting non-positive or non-finite scales.
    pub fn new(length_per_pixel: f64, source: CalibrationSource) -> Result<Self, CalibrationError> {
        if !length_per_pixel.is_finite() || length_per_pixel <= 0.0 {
            return Err(CalibrationError::InvalidCalibration(length_per_pixel));
        }
        Ok(Self {
            length_per_pixel,
            source,
            reference: None,
        })
    }

    /// Calibration assuming the page is rendered at true scale.
    ///
    /// # Arguments
    /// * `page_width_mm` - Physical page width.
    /// * `page_width_px` - Width of the rendered page image.
    pub fn from_page(page_width_mm: f64, page_width_px: u32) -> Result<Self, CalibrationError> {
        if page_width_px == 0 {
            return Err(CalibrationError::InvalidCalibration(f64::INFINITY));
        }
        Self::new(page_width_mm / page_width_px as f64, CalibrationSource::Page)
    }

    /// Calibration from two clicked points a known distance apart.
    pub fn from_known_length(
        start: PixelPoint,
        end: PixelPoint,
        known_length_mm: f64,
        page_index: Option<usize>,
    ) -> Result<Self, CalibrationError> {
        let pixel_distance = start.distance_to(&end);
        if pixel_distance == 0.0 {
            return Err(CalibrationError::DegenerateReference);
        }

        let mut calibration =
            Self::new(known_length_mm / pixel_distance, CalibrationSource::Manual)?;
        calibration.reference = Some(ReferenceLine {
            page_index,
            start,
            end,
            known_length_mm,
        });
        Ok(calibration)
    }

    pub fn length_per_pixel(&self) -> f64 {
        self.length_per_pixel
    }

    pub fn source(&self) -> CalibrationSource {
        self.source
    }

    pub fn reference(&self) -> Option<&ReferenceLine> {
        self.reference.as_ref()
    }

    /// Convert a pixel distance to millimetres.
    pub fn pixels_to_length(&self, pixels: f64) -> f64 {
        pixels * self.length_per_pixel
    }

    /// Convert a millimetre distance to pixels.
    pub fn length_to_pixels(&self, length_mm: f64) -> f64 {
        length_mm / self.length_per_pixel
    }

    /// One-line description used in status output.
    pub fn describe(&self) -> String {
        format!("{:.4} mm/px ({})", self.length_per_pixel, self.source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_non_positive_scale() {
        assert_eq!(
            Calibration::new(0.0, CalibrationSource::Manual),
            Err(CalibrationError::InvalidCalibration(0.0))
        );
        assert_eq!(
            Calibration::new(-1.0, CalibrationSource::Page),
            Err(CalibrationError::InvalidCalibration(-1.0))
        );
        assert!(Calibration::new(f64::NAN, CalibrationSource::Page).is_err());
        assert!(Calibration::new(f64::INFINITY, CalibrationSource::Page).is_err());
    }

    #[test]
    fn test_from_page_a4() {
        // A4 width rendered at 150 DPI: 595.28pt -> 1240px
        let calibration = Calibration::from_page(210.0, 1240).unwrap();
        assert_eq!(calibration.source(), CalibrationSource::Page);
        assert!((calibration.length_per_pixel() - 0.169_354_8).abs() < 1e-6);
        assert!(Calibration::from_page(210.0, 0).is_err());
    }

    #[test]
    fn test_from_known_length() {
        let calibration = Calibration::from_known_length(
            PixelPoint::new(0.0, 0.0),
            PixelPoint::new(30.0, 40.0),
            10.0,
            Some(2),
        )
        .unwrap();
        assert_eq!(calibration.source(), CalibrationSource::Manual);
        assert!((calibration.length_per_pixel() - 0.2).abs() < 1e-12);

        let reference = calibration.reference().unwrap();
        assert_eq!(reference.page_index, Some(2));
        assert_eq!(reference.known_length_mm, 10.0);
    }

    #[test]
    fn test_from_known_length_degenerate() {
        let p = PixelPoint::new(5.0, 5.0);
        assert_eq!(
            Calibration::from_known_length(p, p, 10.0, None),
            Err(CalibrationError::DegenerateReference)
        );
        assert!(matches!(
            Calibration::from_known_length(p, PixelPoint::new(6.0, 5.0), -3.0, None),
            Err(CalibrationError::InvalidCalibration(_))
        ));
    }

    #[test]
    fn test_conversions() {
        let calibration = Calibration::new(0.5, CalibrationSource::Manual).unwrap();
        assert_eq!(calibration.pixels_to_length(10.0), 5.0);
        assert_eq!(calibration.length_to_pixels(5.0), 10.0);
        assert_eq!(calibration.describe(), "0.5000 mm/px (manual)");
    }
}
