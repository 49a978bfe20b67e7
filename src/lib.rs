// Copyright 2025 PDF Measure Tool contributors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! # PDF Measure
//!
//! Calibrated physical measurements on rendered PDF pages.
//!
//! Clicks arrive in page-pixel space (origin top-left, Y down). A
//! [`Calibration`] maps pixel distances to millimetres, either from the PDF
//! page size at the rendering DPI or from a reference line of known length.
//! The [`MeasurementStore`] keeps one specimen rectangle per `pre`/`post`
//! group, line measurements, and particle displacements between pre- and
//! post-test positions, and re-derives every physical value when the
//! calibration changes.
//!
//! ## Example
//!
//! ```rust
//! use pdf_measure::{CalibrationSource, MeasurementStore, PixelPoint, RectangleGroup};
//!
//! let mut store = MeasurementStore::new();
//! store.set_calibration(0.084667, CalibrationSource::Page)?;
//!
//! let rect = store.record_rectangle(
//!     RectangleGroup::Pre,
//!     0,
//!     PixelPoint::new(100.5, 400.2),
//!     PixelPoint::new(350.8, 150.3),
//! )?;
//! assert!((rect.width_mm.unwrap() - 21.19).abs() < 0.01);
//!
//! let particle = store.record_displacement(
//!     "P1",
//!     PixelPoint::new(120.0, 300.0),
//!     0,
//!     PixelPoint::new(123.0, 304.0),
//!     1,
//! );
//! assert_eq!(particle.magnitude_px, 5.0);
//! # Ok::<(), pdf_measure::MeasurementError>(())
//! ```
//!
//! Interactive use goes through a [`Session`] over a [`PdfDocument`]; see
//! the `pdf-measure` binary.

pub mod calibration;
pub mod config;
pub mod document;
pub mod export;
pub mod measurement;
pub mod session;
pub mod settings;

pub use calibration::{Calibration, CalibrationError, CalibrationSource, ReferenceLine};
pub use document::{DocumentError, PageGeometry, PageSource, PdfDocument};
pub use export::{export_all, load_store, ExportError, ExportPaths, ExportReport};
pub use measurement::{
    Corners, Measurement, MeasurementError, MeasurementGroup, MeasurementSnapshot,
    MeasurementStore, ParticleDisplacement, PhysicalPoint, PixelPoint, Rectangle, RectangleGroup,
};
pub use session::{Command, CommandError, Mode, Outcome, Session, SessionOptions};
pub use settings::AppSettings;
