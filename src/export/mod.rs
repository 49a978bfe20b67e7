//! Export of measurement snapshots to CSV, JSON and PNG.

mod csv;
mod json;
mod visualization;

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::config::{CSV_SUFFIX, JSON_SUFFIX, VISUALIZATION_SUFFIX};
use crate::measurement::{MeasurementError, MeasurementSnapshot};

pub use self::csv::{export_csv, to_csv_string, write_csv};
pub use json::{export_json, load_json, load_store};
pub use visualization::{export_visualization, render_visualization, PanelLayout, PANEL_SIZE};

/// Export errors.
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("No measurements to save")]
    NothingToExport,
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] ::csv::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
    #[error(transparent)]
    Measurement(#[from] MeasurementError),
}

/// File paths for one document's exports.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportPaths {
    pub csv: PathBuf,
    pub json: PathBuf,
    pub visualization: PathBuf,
}

impl ExportPaths {
    /// `<output_dir>/<stem>_measurements.csv` and siblings.
    pub fn new(output_dir: impl AsRef<Path>, stem: &str) -> Self {
        let dir = output_dir.as_ref();
        Self {
            csv: dir.join(format!("{}{}", stem, CSV_SUFFIX)),
            json: dir.join(format!("{}{}", stem, JSON_SUFFIX)),
            visualization: dir.join(format!("{}{}", stem, VISUALIZATION_SUFFIX)),
        }
    }
}

/// Files written by [`export_all`].
#[derive(Debug, Clone, PartialEq)]
pub struct ExportReport {
    pub csv: PathBuf,
    pub json: PathBuf,
    /// `None` when the figure was skipped or disabled.
    pub visualization: Option<PathBuf>,
}

impl ExportReport {
    pub fn describe(&self) -> String {
        let mut lines = vec![
            format!("Saved CSV: {}", self.csv.display()),
            format!("Saved JSON: {}", self.json.display()),
        ];
        if let Some(path) = &self.visualization {
            lines.push(format!("Saved visualization: {}", path.display()));
        }
        lines.join("\n")
    }
}

/// Write every export file for a snapshot.
///
/// An empty snapshot is refused with [`ExportError::NothingToExport`]. The
/// PNG figure is only written when `visualization` is set and the snapshot
/// has at least one rectangle.
pub fn export_all(
    snapshot: &MeasurementSnapshot,
    output_dir: impl AsRef<Path>,
    stem: &str,
    visualization: bool,
) -> Result<ExportReport, ExportError> {
    if snapshot.is_empty() {
        return Err(ExportError::NothingToExport);
    }

    let output_dir = output_dir.as_ref();
    fs::create_dir_all(output_dir)?;
    let paths = ExportPaths::new(output_dir, stem);

    export_csv(snapshot, &paths.csv)?;
    export_json(snapshot, &paths.json)?;

    let visualization = if visualization && !snapshot.rectangles.is_empty() {
        export_visualization(snapshot, &paths.visualization)?.then_some(paths.visualization)
    } else {
        None
    };

    let report = ExportReport {
        csv: paths.csv,
        json: paths.json,
        visualization,
    };
    tracing::info!("Exported measurements to {}", output_dir.display());
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calibration::CalibrationSource;
    use crate::measurement::{MeasurementStore, PixelPoint, RectangleGroup};

    fn temp_dir(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("pdf_measure_export_{}_{}", std::process::id(), name))
    }

    #[test]
    fn test_paths() {
        let paths = ExportPaths::new("results", "specimen");
        assert_eq!(paths.csv, Path::new("results/specimen_measurements.csv"));
        assert_eq!(paths.json, Path::new("results/specimen_measurements.json"));
        assert_eq!(
            paths.visualization,
            Path::new("results/specimen_visualization.png")
        );
    }

    #[test]
    fn test_empty_store_is_refused() {
        let dir = temp_dir("empty");
        let result = export_all(&MeasurementStore::new().export_snapshot(), &dir, "doc", true);
        assert!(matches!(result, Err(ExportError::NothingToExport)));
        assert!(!dir.exists());
    }

    #[test]
    fn test_export_all_writes_files() {
        let mut store = MeasurementStore::new();
        store.set_calibration(0.2, CalibrationSource::Page).unwrap();
        store
            .record_rectangle(
                RectangleGroup::Pre,
                0,
                PixelPoint::new(10.0, 10.0),
                PixelPoint::new(110.0, 60.0),
            )
            .unwrap();

        let dir = temp_dir("all");
        let report = export_all(&store.export_snapshot(), &dir, "doc", true).unwrap();
        assert!(report.csv.exists());
        assert!(report.json.exists());
        let png = report.visualization.clone().unwrap();
        assert!(png.exists());
        assert!(report.describe().contains("doc_measurements.csv"));

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_visualization_skipped_without_rectangles() {
        let mut store = MeasurementStore::new();
        store.record_displacement("P1", PixelPoint::new(0.0, 0.0), 0, PixelPoint::new(1.0, 1.0), 0);

        let dir = temp_dir("no_rect");
        let report = export_all(&store.export_snapshot(), &dir, "doc", true).unwrap();
        assert!(report.visualization.is_none());
        assert!(!dir.join("doc_visualization.png").exists());

        let _ = fs::remove_dir_all(&dir);
    }
}
