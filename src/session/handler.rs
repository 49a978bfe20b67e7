//! Session state machine driving the measurement store.

use std::path::PathBuf;

use crate::calibration::{Calibration, CalibrationSource};
use crate::config::{
    KeyAction, DEFAULT_DPI, DEFAULT_OUTPUT_DIR, HELP_TEXT, MEASUREMENT_LABEL_PREFIX,
    PARTICLE_LABEL_PREFIX,
};
use crate::document::{DocumentError, PageGeometry, PageSource};
use crate::export::{export_all, ExportError};
use crate::measurement::{MeasurementGroup, MeasurementStore, PixelPoint, RectangleGroup};

use super::command::{parse_command, Command};
use super::mode::Mode;

/// Session options.
#[derive(Debug, Clone)]
pub struct SessionOptions {
    pub dpi: u32,
    pub output_dir: PathBuf,
    pub write_visualization: bool,
    /// Group selected at startup.
    pub group: MeasurementGroup,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            dpi: DEFAULT_DPI,
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            write_visualization: true,
            group: MeasurementGroup::default(),
        }
    }
}

impl SessionOptions {
    pub fn with_dpi(mut self, dpi: u32) -> Self {
        self.dpi = dpi;
        self
    }

    pub fn with_output_dir(mut self, output_dir: impl Into<PathBuf>) -> Self {
        self.output_dir = output_dir.into();
        self
    }

    pub fn with_visualization(mut self, enabled: bool) -> Self {
        self.write_visualization = enabled;
        self
    }

    pub fn with_group(mut self, group: MeasurementGroup) -> Self {
        self.group = group;
        self
    }
}

/// Result of handling one input.
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome {
    pub success: bool,
    pub quit: bool,
    pub message: Option<String>,
}

impl Outcome {
    /// Create a successful outcome with a message.
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            quit: false,
            message: Some(message.into()),
        }
    }

    /// Create a non-fatal failure outcome.
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            quit: false,
            message: Some(message.into()),
        }
    }

    /// Create a quit outcome.
    pub fn quit() -> Self {
        Self {
            success: true,
            quit: true,
            message: None,
        }
    }
}

/// An interactive measurement session over one document.
pub struct Session<D: PageSource> {
    document: D,
    stem: String,
    options: SessionOptions,
    store: MeasurementStore,
    page: usize,
    geometry: PageGeometry,
    mode: Mode,
    group: MeasurementGroup,
    clicks: Vec<PixelPoint>,
    pending_pre: Option<(PixelPoint, usize)>,
    reference: Option<(PixelPoint, PixelPoint, usize)>,
    measurement_counter: u32,
    particle_counter: u32,
}

impl<D: PageSource> Session<D> {
    /// Open a session on the first page, calibrated from the page size.
    pub fn new(
        document: D,
        stem: impl Into<String>,
        options: SessionOptions,
    ) -> Result<Self, DocumentError> {
        if document.page_count() == 0 {
            return Err(DocumentError::NoPages);
        }
        let geometry = document.page_geometry(0, options.dpi)?;
        let mut store = MeasurementStore::new();
        store.apply_calibration(geometry.calibration()?);

        Ok(Self {
            document,
            stem: stem.into(),
            group: options.group,
            options,
            store,
            page: 0,
            geometry,
            mode: Mode::View,
            clicks: Vec::new(),
            pending_pre: None,
            reference: None,
            measurement_counter: 1,
            particle_counter: 1,
        })
    }

    /// Replace the store with previously saved data.
    ///
    /// A store without calibration picks up the current page calibration.
    pub fn with_store(mut self, mut store: MeasurementStore) -> Result<Self, DocumentError> {
        if store.calibration().is_none() {
            store.apply_calibration(self.geometry.calibration()?);
        }
        self.measurement_counter = store.measurements().iter().map(|m| m.id).max().unwrap_or(0) + 1;
        self.particle_counter = store.displacements().iter().map(|p| p.id).max().unwrap_or(0) + 1;
        self.store = store;
        Ok(self)
    }

    pub fn store(&self) -> &MeasurementStore {
        &self.store
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Zero-based index of the current page.
    pub fn page(&self) -> usize {
        self.page
    }

    pub fn group(&self) -> MeasurementGroup {
        self.group
    }

    pub fn geometry(&self) -> &PageGeometry {
        &self.geometry
    }

    /// Startup banner.
    pub fn banner(&self) -> String {
        let rule = "=".repeat(60);
        let mut lines = vec![
            rule.clone(),
            "PDF MEASUREMENT TOOL".to_string(),
            rule.clone(),
            format!("Loaded: {}", self.stem),
            format!("Pages: {}", self.document.page_count()),
        ];
        if let Ok((width_mm, height_mm)) = self.document.page_size_mm(self.page) {
            lines.push(format!("Page size: {:.1} x {:.1} mm", width_mm, height_mm));
        }
        lines.push(format!(
            "Rendering at {} DPI ({} x {} px)",
            self.options.dpi, self.geometry.width_px, self.geometry.height_px
        ));
        if let Some(calibration) = self.store.calibration() {
            lines.push(format!("Calibration: {}", calibration.describe()));
        }
        lines.push(String::new());
        lines.push("Press 'h' or '?' for help".to_string());
        lines.push(rule);
        lines.join("\n")
    }

    /// One-line summary of the session state.
    pub fn status_line(&self) -> String {
        let calibration = self
            .store
            .calibration()
            .map(Calibration::describe)
            .unwrap_or_else(|| "Not calibrated".to_string());
        let rectangles: Vec<&str> = RectangleGroup::ALL
            .iter()
            .filter(|g| self.store.rectangle(**g).is_some())
            .map(|g| g.as_str())
            .collect();
        let rectangles = if rectangles.is_empty() {
            "none".to_string()
        } else {
            rectangles.join(", ")
        };

        let mut status = format!(
            "Page {}/{} | Measurements: {} | Particles: {} | Rectangles: {} | Calibration: {} | Group: {} | {}",
            self.page + 1,
            self.document.page_count(),
            self.store.measurements().len(),
            self.store.displacements().len(),
            rectangles,
            calibration,
            self.group,
            self.mode
        );
        let required = self.mode.clicks_required();
        if required > 1 && !self.clicks.is_empty() {
            status.push_str(&format!(" [{}/{} clicks]", self.clicks.len(), required));
        }
        status
    }

    /// Parse and handle one line of text input.
    pub fn handle_line(&mut self, line: &str) -> Outcome {
        match parse_command(line) {
            Ok(command) => self.handle_command(command),
            Err(e) => Outcome::failure(e.to_string()),
        }
    }

    /// Handle one parsed command.
    pub fn handle_command(&mut self, command: Command) -> Outcome {
        if self.mode == Mode::ConfirmClear && !matches!(command, Command::Confirm(_)) {
            tracing::debug!("Clear cancelled by {:?}", command);
            self.mode = Mode::View;
        }

        match command {
            Command::Click(point) => self.handle_click(point),
            Command::Key(action) => self.handle_key(action),
            Command::Length(length_mm) => self.handle_length(length_mm),
            Command::Confirm(confirmed) => self.handle_confirm(confirmed),
            Command::Page(number) => match number.checked_sub(1) {
                Some(index) => self.go_to_page(index),
                None => Outcome::failure("Pages are numbered from 1"),
            },
            Command::DeleteRectangle(group) => match self.store.delete_rectangle(group) {
                Some(_) => Outcome::ok(format!("Deleted {} rectangle", group)),
                None => Outcome::failure(format!("No {} rectangle to delete", group)),
            },
            Command::DeleteParticle(id) => match self.store.delete_displacement(id) {
                Some(particle) => Outcome::ok(format!("Deleted particle: {}", particle.label)),
                None => Outcome::failure(format!("No particle with id {}", id)),
            },
            Command::ShowParticle(id) => match self.store.displacement(id) {
                Some(particle) => Outcome::ok(particle.summary()),
                None => Outcome::failure(format!("No particle with id {}", id)),
            },
            Command::Status => Outcome::ok(self.status_line()),
        }
    }

    /// Handle a key binding.
    pub fn handle_key(&mut self, action: KeyAction) -> Outcome {
        match action {
            KeyAction::Measure => self.enter_mode(Mode::Measure),
            KeyAction::Rectangle => match self.group.rectangle_group() {
                Some(group) => {
                    let mut outcome = self.enter_mode(Mode::Rectangle);
                    if self.store.rectangle(group).is_some() {
                        outcome.message = outcome
                            .message
                            .map(|m| format!("{} (replaces the existing {} rectangle)", m, group));
                    }
                    outcome
                }
                None => Outcome::failure(format!(
                    "Rectangles belong to the pre or post group (current: {}); press 'g' to change group",
                    self.group
                )),
            },
            KeyAction::Calibrate => {
                self.reference = None;
                self.enter_mode(Mode::Calibrate)
            }
            KeyAction::TrackParticle => {
                self.pending_pre = None;
                self.enter_mode(Mode::ParticlePre)
            }
            KeyAction::ToggleGroup => {
                self.group = self.group.next();
                if self.mode == Mode::Rectangle && self.group.rectangle_group().is_none() {
                    self.reset_mode();
                }
                Outcome::ok(format!("Group set to: {}", self.group))
            }
            KeyAction::Save => self.save(),
            KeyAction::DeleteLast => self.delete_last(),
            KeyAction::ClearAll => {
                self.reset_mode();
                self.mode = Mode::ConfirmClear;
                Outcome::ok(self.mode.prompt())
            }
            KeyAction::PageCalibration => self.apply_page_calibration(),
            KeyAction::PreviousPage => match self.page.checked_sub(1) {
                Some(index) => self.go_to_page(index),
                None => Outcome::failure("Already on the first page"),
            },
            KeyAction::NextPage => self.go_to_page(self.page + 1),
            KeyAction::FirstPage => self.go_to_page(0),
            KeyAction::LastPage => self.go_to_page(self.document.page_count().saturating_sub(1)),
            KeyAction::Cancel => {
                self.reset_mode();
                Outcome::ok(self.mode.to_string())
            }
            KeyAction::Help => Outcome::ok(HELP_TEXT),
            KeyAction::Quit => Outcome::quit(),
        }
    }

    /// Handle a click at page-pixel coordinates on the current page.
    pub fn handle_click(&mut self, point: PixelPoint) -> Outcome {
        match self.mode {
            Mode::Measure => self.collect_click(point, |s, a, b| s.finish_measurement(a, b)),
            Mode::Rectangle => self.collect_click(point, |s, a, b| s.finish_rectangle(a, b)),
            Mode::Calibrate => self.collect_click(point, |s, a, b| s.finish_reference(a, b)),
            Mode::ParticlePre => {
                self.pending_pre = Some((point, self.page));
                self.mode = Mode::ParticlePost;
                Outcome::ok(format!(
                    "[Particle] PRE position recorded at ({:.1}, {:.1}). Now click POST position (can be on different page).",
                    point.x, point.y
                ))
            }
            Mode::ParticlePost => {
                let Some((pre_point, pre_page)) = self.pending_pre.take() else {
                    self.mode = Mode::View;
                    return Outcome::failure("No PRE position recorded; press 't' to start again");
                };
                let label = format!("{}{}", PARTICLE_LABEL_PREFIX, self.particle_counter);
                self.particle_counter += 1;
                let particle =
                    self.store
                        .record_displacement(label, pre_point, pre_page, point, self.page);
                let summary = particle.summary();
                self.mode = Mode::View;
                Outcome::ok(summary)
            }
            Mode::View | Mode::CalibrateLength | Mode::ConfirmClear => Outcome::failure(format!(
                "Click ignored in {} mode",
                self.mode.as_str().to_lowercase()
            )),
        }
    }

    fn collect_click(
        &mut self,
        point: PixelPoint,
        finish: impl FnOnce(&mut Self, PixelPoint, PixelPoint) -> Outcome,
    ) -> Outcome {
        self.clicks.push(point);
        if self.clicks.len() < 2 {
            return Outcome::ok(format!(
                "Point {}/2 at ({:.1}, {:.1})",
                self.clicks.len(),
                point.x,
                point.y
            ));
        }
        let first = self.clicks[0];
        self.clicks.clear();
        finish(self, first, point)
    }

    fn finish_measurement(&mut self, a: PixelPoint, b: PixelPoint) -> Outcome {
        let label = format!("{}{}", MEASUREMENT_LABEL_PREFIX, self.measurement_counter);
        self.measurement_counter += 1;
        let measurement = self
            .store
            .record_measurement(label, self.group, self.page, a, b);
        Outcome::ok(measurement.summary())
    }

    fn finish_rectangle(&mut self, a: PixelPoint, b: PixelPoint) -> Outcome {
        let Some(group) = self.group.rectangle_group() else {
            self.reset_mode();
            return Outcome::failure("Current group has no rectangle");
        };

        match self.store.record_rectangle(group, self.page, a, b) {
            Ok(rect) => {
                let size = match (rect.width_mm, rect.height_mm) {
                    (Some(w), Some(h)) => format!("{:.2} x {:.2} mm", w, h),
                    _ => format!("{:.1} x {:.1} px", rect.width_px, rect.height_px),
                };
                let message = format!("{}: {}", group.title(), size);
                self.mode = Mode::View;
                Outcome::ok(message)
            }
            Err(e) => Outcome::failure(format!("{}; click 2 diagonal corners again", e)),
        }
    }

    fn finish_reference(&mut self, a: PixelPoint, b: PixelPoint) -> Outcome {
        let distance = a.distance_to(&b);
        if distance == 0.0 {
            return Outcome::failure("Reference points coincide; click 2 distinct points");
        }
        self.reference = Some((a, b, self.page));
        self.mode = Mode::CalibrateLength;
        Outcome::ok(format!(
            "Reference line: {:.1} px. {}",
            distance,
            self.mode.prompt()
        ))
    }

    fn handle_length(&mut self, length_mm: f64) -> Outcome {
        let Some((start, end, page)) = self.reference.filter(|_| self.mode == Mode::CalibrateLength)
        else {
            return Outcome::failure("No reference line; press 'c' and click 2 points first");
        };

        match Calibration::from_known_length(start, end, length_mm, Some(page)) {
            Ok(calibration) => {
                let description = self.store.apply_calibration(calibration).describe();
                self.reference = None;
                self.mode = Mode::View;
                Outcome::ok(format!("Calibration: {}", description))
            }
            Err(e) => {
                tracing::warn!("Rejected reference length {}: {}", length_mm, e);
                Outcome::failure(e.to_string())
            }
        }
    }

    fn handle_confirm(&mut self, confirmed: bool) -> Outcome {
        if self.mode != Mode::ConfirmClear {
            return Outcome::failure("Nothing to confirm");
        }
        self.mode = Mode::View;
        if !confirmed {
            return Outcome::ok("Clear cancelled");
        }

        self.store.clear_all();
        self.measurement_counter = 1;
        self.particle_counter = 1;
        Outcome::ok("All measurements cleared.")
    }

    fn delete_last(&mut self) -> Outcome {
        if let Some(measurement) = self.store.delete_last_measurement() {
            return Outcome::ok(format!("Deleted measurement: {}", measurement.label));
        }
        match self.store.delete_last_displacement() {
            Some(particle) => Outcome::ok(format!("Deleted particle: {}", particle.label)),
            None => Outcome::failure("Nothing to delete"),
        }
    }

    fn save(&mut self) -> Outcome {
        let snapshot = self.store.export_snapshot();
        match export_all(
            &snapshot,
            &self.options.output_dir,
            &self.stem,
            self.options.write_visualization,
        ) {
            Ok(report) => Outcome::ok(report.describe()),
            Err(ExportError::NothingToExport) => Outcome::failure("No measurements to save."),
            Err(e) => {
                tracing::warn!("Save failed: {}", e);
                Outcome::failure(format!("Save failed: {}", e))
            }
        }
    }

    fn apply_page_calibration(&mut self) -> Outcome {
        match self.geometry.calibration() {
            Ok(calibration) => {
                let description = self.store.apply_calibration(calibration).describe();
                Outcome::ok(format!("Calibration: {}", description))
            }
            Err(e) => Outcome::failure(e.to_string()),
        }
    }

    fn go_to_page(&mut self, index: usize) -> Outcome {
        let count = self.document.page_count();
        if index >= count {
            return Outcome::failure(format!("Page {} out of range (1-{})", index + 1, count));
        }
        if index == self.page {
            return Outcome::ok(format!("Page {}/{}", index + 1, count));
        }

        let geometry = match self.document.page_geometry(index, self.options.dpi) {
            Ok(geometry) => geometry,
            Err(e) => return Outcome::failure(e.to_string()),
        };
        self.page = index;
        self.geometry = geometry;
        // Partial click sets are page-local; a pending particle may cross pages
        self.clicks.clear();

        let page_calibrated = self
            .store
            .calibration()
            .map_or(false, |c| c.source() == CalibrationSource::Page);
        if page_calibrated {
            if let Ok(calibration) = self.geometry.calibration() {
                self.store.apply_calibration(calibration);
            }
        }

        tracing::debug!("Moved to page {}", index + 1);
        Outcome::ok(format!(
            "Page {}/{} ({} x {} px)",
            index + 1,
            count,
            self.geometry.width_px,
            self.geometry.height_px
        ))
    }

    fn enter_mode(&mut self, mode: Mode) -> Outcome {
        self.clicks.clear();
        self.mode = mode;
        tracing::debug!("Mode: {:?}", mode);
        match mode {
            Mode::Measure => Outcome::ok(format!("{} (group: {})", self.mode, self.group)),
            _ => Outcome::ok(self.mode.to_string()),
        }
    }

    fn reset_mode(&mut self) {
        self.mode = Mode::View;
        self.clicks.clear();
        self.pending_pre = None;
        self.reference = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// In-memory page sizes in points.
    struct FixedPages(Vec<(f64, f64)>);

    impl PageSource for FixedPages {
        fn page_count(&self) -> usize {
            self.0.len()
        }

        fn page_size_pt(&self, page_index: usize) -> Result<(f64, f64), DocumentError> {
            self.0
                .get(page_index)
                .copied()
                .ok_or(DocumentError::PageOutOfRange {
                    index: page_index,
                    count: self.0.len(),
                })
        }
    }

    const A4: (f64, f64) = (595.0, 842.0);
    const LETTER: (f64, f64) = (612.0, 792.0);

    fn session(pages: Vec<(f64, f64)>) -> Session<FixedPages> {
        let output_dir = std::env::temp_dir().join(format!("pdf_measure_session_{}", std::process::id()));
        Session::new(
            FixedPages(pages),
            "specimen",
            SessionOptions::default().with_output_dir(output_dir),
        )
        .unwrap()
    }

    fn run(session: &mut Session<FixedPages>, lines: &[&str]) -> Vec<Outcome> {
        lines.iter().map(|l| session.handle_line(l)).collect()
    }

    #[test]
    fn test_starts_with_page_calibration() {
        let s = session(vec![LETTER]);
        let calibration = s.store().calibration().unwrap();
        assert_eq!(calibration.source(), CalibrationSource::Page);
        assert!((calibration.length_per_pixel() - 25.4 / 150.0).abs() < 1e-12);
        assert_eq!(s.mode(), Mode::View);
        let banner = s.banner();
        assert!(banner.contains("Pages: 1"));
        assert!(banner.contains("Page size: 215.9 x 279.4 mm"));
    }

    #[test]
    fn test_measure_two_clicks() {
        let mut s = session(vec![LETTER]);
        let outcomes = run(&mut s, &["m", "click 0 0", "click 30 40"]);
        assert!(outcomes.iter().all(|o| o.success));
        assert_eq!(outcomes[1].message.as_deref(), Some("Point 1/2 at (0.0, 0.0)"));

        let measurement = &s.store().measurements()[0];
        assert_eq!(measurement.label, "M1");
        assert_eq!(measurement.pixel_distance, 50.0);
        assert_eq!(measurement.group, MeasurementGroup::Pre);
        // Measure mode stays active for the next pair
        assert_eq!(s.mode(), Mode::Measure);
    }

    #[test]
    fn test_rectangle_requires_pre_or_post_group() {
        let mut s = session(vec![LETTER]);
        run(&mut s, &["g", "g"]);
        assert_eq!(s.group(), MeasurementGroup::Fiber);

        let outcome = s.handle_line("r");
        assert!(!outcome.success);
        assert_eq!(s.mode(), Mode::View);

        run(&mut s, &["g", "g", "g", "g", "r", "(100.5, 400.2)", "(350.8, 150.3)"]);
        assert_eq!(s.group(), MeasurementGroup::Post);
        let rect = s.store().rectangle(RectangleGroup::Post).unwrap();
        assert!((rect.width_px - 250.3).abs() < 1e-9);
        assert_eq!(s.mode(), Mode::View);
    }

    #[test]
    fn test_degenerate_rectangle_keeps_mode() {
        let mut s = session(vec![LETTER]);
        let outcomes = run(&mut s, &["r", "click 10 10", "click 10 50"]);
        assert!(!outcomes[2].success);
        assert_eq!(s.mode(), Mode::Rectangle);
        assert!(s.store().rectangle(RectangleGroup::Pre).is_none());
    }

    #[test]
    fn test_manual_calibration() {
        let mut s = session(vec![LETTER]);
        let outcomes = run(&mut s, &["m", "click 0 0", "click 0 100", "c", "click 0 0", "click 200 0"]);
        assert!(outcomes.iter().all(|o| o.success));
        assert_eq!(s.mode(), Mode::CalibrateLength);

        let outcome = s.handle_line("length 50");
        assert!(outcome.success);
        let calibration = s.store().calibration().unwrap();
        assert_eq!(calibration.source(), CalibrationSource::Manual);
        assert_eq!(calibration.length_per_pixel(), 0.25);
        // Existing records are re-derived
        assert_eq!(s.store().measurements()[0].length_mm, Some(25.0));
        assert_eq!(s.mode(), Mode::View);
    }

    #[test]
    fn test_invalid_length_is_rejected() {
        let mut s = session(vec![LETTER]);
        run(&mut s, &["c", "click 0 0", "click 10 0"]);
        let outcome = s.handle_line("length 0");
        assert!(!outcome.success);
        assert_eq!(s.mode(), Mode::CalibrateLength);
        assert_eq!(
            s.store().calibration().unwrap().source(),
            CalibrationSource::Page
        );

        assert!(s.handle_line("length 5").success);
    }

    #[test]
    fn test_particle_across_pages() {
        let mut s = session(vec![LETTER, LETTER]);
        let outcomes = run(&mut s, &["t", "click 10 10", "]", "click 13 14"]);
        assert!(outcomes.iter().all(|o| o.success));

        let particle = &s.store().displacements()[0];
        assert_eq!(particle.label, "P1");
        assert_eq!(particle.pre_page, 0);
        assert_eq!(particle.post_page, 1);
        assert_eq!(particle.magnitude_px, 5.0);
        assert_eq!(s.mode(), Mode::View);
    }

    #[test]
    fn test_page_navigation_recalibrates_page_source_only() {
        let mut s = session(vec![LETTER, A4]);
        let letter_lpp = s.store().calibration().unwrap().length_per_pixel();

        assert!(s.handle_line("end").success);
        assert_eq!(s.page(), 1);
        let a4_lpp = s.store().calibration().unwrap().length_per_pixel();
        assert_ne!(letter_lpp, a4_lpp);

        assert!(!s.handle_line("]").success);
        assert!(!s.handle_line("page 9").success);
        assert!(!s.handle_line("page 0").success);

        run(&mut s, &["c", "click 0 0", "click 100 0", "length 10", "home"]);
        assert_eq!(s.page(), 0);
        let calibration = s.store().calibration().unwrap();
        assert_eq!(calibration.source(), CalibrationSource::Manual);
        assert_eq!(calibration.length_per_pixel(), 0.1);

        assert!(s.handle_line("a").success);
        assert_eq!(
            s.store().calibration().unwrap().length_per_pixel(),
            letter_lpp
        );
    }

    #[test]
    fn test_clear_all_needs_confirmation() {
        let mut s = session(vec![LETTER]);
        run(&mut s, &["m", "click 0 0", "click 1 1", "x", "no"]);
        assert_eq!(s.store().measurements().len(), 1);

        run(&mut s, &["x", "status"]);
        assert_eq!(s.mode(), Mode::View);
        assert_eq!(s.store().measurements().len(), 1);

        run(&mut s, &["x", "yes"]);
        assert!(s.store().is_empty());
        assert!(s.store().calibration().is_some());

        run(&mut s, &["m", "click 0 0", "click 1 1"]);
        assert_eq!(s.store().measurements()[0].label, "M1");
        assert!(!s.handle_line("yes").success);
    }

    #[test]
    fn test_delete_last_and_by_id() {
        let mut s = session(vec![LETTER]);
        run(&mut s, &["t", "click 0 0", "click 1 0", "m", "click 0 0", "click 1 0"]);

        assert_eq!(s.handle_line("d").message.as_deref(), Some("Deleted measurement: M1"));
        assert_eq!(s.handle_line("d").message.as_deref(), Some("Deleted particle: P1"));
        assert!(!s.handle_line("d").success);

        assert!(!s.handle_line("delete particle 1").success);
        assert!(!s.handle_line("delete rect pre").success);
    }

    #[test]
    fn test_show_particle_by_id() {
        let mut s = session(vec![LETTER]);
        run(&mut s, &["t", "click 0 0", "click 3 4", "t", "click 10 10", "click 10 20"]);

        let outcome = s.handle_line("particle 2");
        assert!(outcome.success);
        assert!(outcome.message.unwrap().starts_with("[P2] Displacement: (0.0, 10.0) px"));

        run(&mut s, &["delete particle 2"]);
        let outcome = s.handle_line("particle 2");
        assert!(!outcome.success);
        assert_eq!(outcome.message.as_deref(), Some("No particle with id 2"));
    }

    #[test]
    fn test_escape_cancels() {
        let mut s = session(vec![LETTER]);
        run(&mut s, &["m", "click 5 5", "escape"]);
        assert_eq!(s.mode(), Mode::View);
        assert!(!s.handle_line("click 1 1").success);
    }

    #[test]
    fn test_save_without_data() {
        let mut s = session(vec![LETTER]);
        let outcome = s.handle_line("s");
        assert!(!outcome.success);
        assert_eq!(outcome.message.as_deref(), Some("No measurements to save."));
    }

    #[test]
    fn test_with_store_continues_labels() {
        let mut store = MeasurementStore::new();
        store.record_measurement(
            "M1",
            MeasurementGroup::Edge,
            0,
            PixelPoint::new(0.0, 0.0),
            PixelPoint::new(1.0, 0.0),
        );
        let mut s = session(vec![LETTER]).with_store(store).unwrap();
        assert!(s.store().calibration().is_some());

        run(&mut s, &["m", "click 0 0", "click 2 0"]);
        assert_eq!(s.store().measurements()[1].label, "M2");
    }

    #[test]
    fn test_quit_and_help() {
        let mut s = session(vec![LETTER]);
        assert!(s.handle_line("q").quit);
        assert_eq!(s.handle_line("?").message.as_deref(), Some(HELP_TEXT));
        assert!(!s.handle_line("bogus").success);
    }
}
