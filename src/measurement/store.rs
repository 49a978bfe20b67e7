//! The calibrated measurement store.
//!
//! Holds the active calibration, at most one rectangle per
//! [`RectangleGroup`], and append-only lists of particle displacements and
//! line measurements. Every operation is synchronous in-memory arithmetic;
//! rejected operations leave the store untouched.

use chrono::Local;

use super::error::MeasurementError;
use super::geometry::{PhysicalPoint, PixelPoint};
use super::line::{Measurement, MeasurementGroup};
use super::particle::ParticleDisplacement;
use super::rectangle::{Rectangle, RectangleGroup};
use super::snapshot::{CalibrationInfo, MeasurementSnapshot, RectangleSet, SnapshotMetadata};
use crate::calibration::{Calibration, CalibrationSource};

/// In-process store for one measurement session.
#[derive(Debug, Clone)]
pub struct MeasurementStore {
    calibration: Option<Calibration>,
    rectangles: [Option<Rectangle>; 2],
    displacements: Vec<ParticleDisplacement>,
    measurements: Vec<Measurement>,
    next_displacement_id: u32,
    next_measurement_id: u32,
}

impl Default for MeasurementStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MeasurementStore {
    /// Create an empty, uncalibrated store.
    pub fn new() -> Self {
        Self {
            calibration: None,
            rectangles: [None, None],
            displacements: Vec::new(),
            measurements: Vec::new(),
            next_displacement_id: 1,
            next_measurement_id: 1,
        }
    }

    /// Set the scale factor from a raw value and source tag.
    pub fn set_calibration(
        &mut self,
        length_per_pixel: f64,
        source: CalibrationSource,
    ) -> Result<&Calibration, MeasurementError> {
        let calibration = Calibration::new(length_per_pixel, source).map_err(|e| {
            tracing::warn!("Rejected calibration: {}", e);
            e
        })?;
        Ok(self.apply_calibration(calibration))
    }

    /// Install an already validated calibration and re-derive every
    /// record's physical values from its pixel data.
    pub fn apply_calibration(&mut self, calibration: Calibration) -> &Calibration {
        tracing::info!("Calibration set: {}", calibration.describe());

        for rectangle in self.rectangles.iter_mut().flatten() {
            rectangle.apply_calibration(Some(&calibration));
        }
        for particle in &mut self.displacements {
            particle.apply_calibration(Some(&calibration));
        }
        for measurement in &mut self.measurements {
            measurement.apply_calibration(Some(&calibration));
        }

        self.calibration.insert(calibration)
    }

    pub fn calibration(&self) -> Option<&Calibration> {
        self.calibration.as_ref()
    }

    /// Record (or overwrite) the rectangle for `group` from two diagonal
    /// corner clicks. On failure the group's previous rectangle is kept.
    pub fn record_rectangle(
        &mut self,
        group: RectangleGroup,
        page: usize,
        corner_a: PixelPoint,
        corner_b: PixelPoint,
    ) -> Result<&Rectangle, MeasurementError> {
        let rectangle =
            Rectangle::from_diagonal(group, page, corner_a, corner_b, self.calibration.as_ref())
                .map_err(|e| {
                    tracing::warn!("Rejected {} rectangle: {}", group, e);
                    e
                })?;

        let slot = &mut self.rectangles[group.index()];
        if slot.is_some() {
            tracing::info!("Replacing {} rectangle", group);
        }
        tracing::info!(
            "Recorded {} rectangle on page {}: {:.1} x {:.1} px",
            group,
            page,
            rectangle.width_px,
            rectangle.height_px
        );
        Ok(slot.insert(rectangle))
    }

    /// Remove the rectangle for `group`, returning it if there was one.
    pub fn delete_rectangle(&mut self, group: RectangleGroup) -> Option<Rectangle> {
        let removed = self.rectangles[group.index()].take();
        if removed.is_some() {
            tracing::info!("Deleted {} rectangle", group);
        }
        removed
    }

    pub fn rectangle(&self, group: RectangleGroup) -> Option<&Rectangle> {
        self.rectangles[group.index()].as_ref()
    }

    /// Express a pixel point in the frame of `group`'s rectangle.
    ///
    /// `None` unless both the rectangle and a calibration exist.
    pub fn locate_in_rectangle(
        &self,
        group: RectangleGroup,
        point: PixelPoint,
    ) -> Option<PhysicalPoint> {
        let calibration = self.calibration.as_ref()?;
        self.rectangle(group).map(|r| r.locate(point, calibration))
    }

    /// Append a particle displacement record.
    pub fn record_displacement(
        &mut self,
        label: impl Into<String>,
        pre_point: PixelPoint,
        pre_page: usize,
        post_point: PixelPoint,
        post_page: usize,
    ) -> &ParticleDisplacement {
        let particle = ParticleDisplacement::new(
            self.next_displacement_id,
            label,
            pre_point,
            pre_page,
            post_point,
            post_page,
            self.calibration.as_ref(),
        );
        self.next_displacement_id += 1;

        tracing::info!("{}", particle.summary());
        self.displacements.push(particle);
        &self.displacements[self.displacements.len() - 1]
    }

    /// Remove a displacement by id; absent ids are a no-op.
    pub fn delete_displacement(&mut self, id: u32) -> Option<ParticleDisplacement> {
        let index = self.displacements.iter().position(|p| p.id == id)?;
        let removed = self.displacements.remove(index);
        tracing::info!("Deleted particle: {}", removed.label);
        Some(removed)
    }

    pub fn delete_last_displacement(&mut self) -> Option<ParticleDisplacement> {
        self.displacements.pop()
    }

    pub fn displacement(&self, id: u32) -> Option<&ParticleDisplacement> {
        self.displacements.iter().find(|p| p.id == id)
    }

    /// Displacements in insertion order.
    pub fn displacements(&self) -> &[ParticleDisplacement] {
        &self.displacements
    }

    /// Append a two-point line measurement.
    pub fn record_measurement(
        &mut self,
        label: impl Into<String>,
        group: MeasurementGroup,
        page: usize,
        point1: PixelPoint,
        point2: PixelPoint,
    ) -> &Measurement {
        let measurement = Measurement::new(
            self.next_measurement_id,
            label,
            group,
            page,
            point1,
            point2,
            self.calibration.as_ref(),
        );
        self.next_measurement_id += 1;

        tracing::info!("{}", measurement.summary());
        self.measurements.push(measurement);
        &self.measurements[self.measurements.len() - 1]
    }

    pub fn delete_last_measurement(&mut self) -> Option<Measurement> {
        self.measurements.pop()
    }

    pub fn measurements(&self) -> &[Measurement] {
        &self.measurements
    }

    pub fn measurements_on_page(&self, page: usize) -> Vec<&Measurement> {
        self.measurements.iter().filter(|m| m.page == page).collect()
    }

    pub fn measurements_in_group(&self, group: MeasurementGroup) -> Vec<&Measurement> {
        self.measurements.iter().filter(|m| m.group == group).collect()
    }

    /// Empty both rectangle slots and all records. Calibration is kept.
    pub fn clear_all(&mut self) {
        self.rectangles = [None, None];
        self.displacements.clear();
        self.measurements.clear();
        self.next_displacement_id = 1;
        self.next_measurement_id = 1;
        tracing::info!("All measurements cleared");
    }

    /// True when no rectangle, displacement or measurement is stored.
    pub fn is_empty(&self) -> bool {
        self.rectangles.iter().all(Option::is_none)
            && self.displacements.is_empty()
            && self.measurements.is_empty()
    }

    /// Owned copy of the current state for serialization.
    pub fn export_snapshot(&self) -> MeasurementSnapshot {
        MeasurementSnapshot {
            metadata: SnapshotMetadata {
                exported: Local::now().to_rfc3339(),
                calibration: CalibrationInfo::from(self.calibration.as_ref()),
            },
            rectangles: RectangleSet {
                pre: self.rectangle(RectangleGroup::Pre).cloned(),
                post: self.rectangle(RectangleGroup::Post).cloned(),
            },
            measurements: self.measurements.clone(),
            displacements: self.displacements.clone(),
        }
    }

    /// Rebuild a store from a previously exported snapshot.
    ///
    /// Physical values are recomputed from the pixel data, and id counters
    /// continue after the highest loaded id.
    pub fn restore(snapshot: MeasurementSnapshot) -> Result<Self, MeasurementError> {
        let calibration = snapshot.calibration().map_err(|e| {
            tracing::warn!("Rejected stored calibration: {}", e);
            e
        })?;
        let mut store = Self::new();

        for group in RectangleGroup::ALL {
            if let Some(rect) = snapshot.rectangles.get(group) {
                let corners = rect.corners_px;
                store.rectangles[group.index()] = Some(Rectangle::from_diagonal(
                    group,
                    rect.page,
                    corners.top_left,
                    corners.bottom_right,
                    calibration.as_ref(),
                )?);
            }
        }

        store.displacements = snapshot.displacements;
        store.measurements = snapshot.measurements;
        store.next_displacement_id = store
            .displacements
            .iter()
            .map(|p| p.id + 1)
            .max()
            .unwrap_or(1);
        store.next_measurement_id = store
            .measurements
            .iter()
            .map(|m| m.id + 1)
            .max()
            .unwrap_or(1);

        match calibration {
            Some(calibration) => {
                store.apply_calibration(calibration);
            }
            None => {
                for particle in &mut store.displacements {
                    particle.apply_calibration(None);
                }
                for measurement in &mut store.measurements {
                    measurement.apply_calibration(None);
                }
            }
        }

        tracing::info!(
            "Restored {} measurements and {} particles",
            store.measurements.len(),
            store.displacements.len()
        );
        Ok(store)
    }
}
