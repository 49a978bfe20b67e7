//! JSON export and reload.

use std::fs;
use std::path::Path;

use super::ExportError;
use crate::measurement::{MeasurementSnapshot, MeasurementStore};

/// Save a snapshot as pretty-printed JSON.
pub fn export_json(snapshot: &MeasurementSnapshot, path: impl AsRef<Path>) -> Result<(), ExportError> {
    let path = path.as_ref();

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let content = serde_json::to_string_pretty(snapshot)?;
    fs::write(path, content)?;
    Ok(())
}

/// Read a snapshot from a JSON export file.
pub fn load_json(path: impl AsRef<Path>) -> Result<MeasurementSnapshot, ExportError> {
    let content = fs::read_to_string(path.as_ref())?;
    Ok(serde_json::from_str(&content)?)
}

/// Rebuild a measurement store from a JSON export file.
pub fn load_store(path: impl AsRef<Path>) -> Result<MeasurementStore, ExportError> {
    let path = path.as_ref();
    let snapshot = load_json(path)?;
    let store = MeasurementStore::restore(snapshot)?;

    tracing::info!(
        "Loaded {} measurements and {} particles from {}",
        store.measurements().len(),
        store.displacements().len(),
        path.display()
    );
    Ok(store)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calibration::CalibrationSource;
    use crate::measurement::{MeasurementGroup, PixelPoint, RectangleGroup};

    fn temp_path(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("pdf_measure_json_{}_{}", std::process::id(), name))
    }

    #[test]
    fn test_save_and_reload_store() {
        let mut store = MeasurementStore::new();
        store.set_calibration(0.5, CalibrationSource::Manual).unwrap();
        store
            .record_rectangle(
                RectangleGroup::Post,
                2,
                PixelPoint::new(10.0, 10.0),
                PixelPoint::new(30.0, 50.0),
            )
            .unwrap();
        store.record_displacement("P1", PixelPoint::new(0.0, 0.0), 0, PixelPoint::new(6.0, 8.0), 2);
        store.record_displacement("P2", PixelPoint::new(1.0, 1.0), 0, PixelPoint::new(1.0, 3.0), 2);
        store.delete_displacement(1);
        store.record_measurement(
            "M1",
            MeasurementGroup::Edge,
            1,
            PixelPoint::new(0.0, 0.0),
            PixelPoint::new(0.0, 10.0),
        );

        let path = temp_path("store.json");
        export_json(&store.export_snapshot(), &path).unwrap();
        let mut loaded = load_store(&path).unwrap();

        let calibration = loaded.calibration().unwrap();
        assert_eq!(calibration.length_per_pixel(), 0.5);
        assert_eq!(calibration.source(), CalibrationSource::Manual);

        let rect = loaded.rectangle(RectangleGroup::Post).unwrap();
        assert_eq!(rect.page, 2);
        assert_eq!(rect.width_mm, Some(10.0));
        assert_eq!(rect.height_mm, Some(20.0));
        assert!(loaded.rectangle(RectangleGroup::Pre).is_none());

        assert_eq!(loaded.displacements().len(), 1);
        assert_eq!(loaded.displacements()[0].id, 2);
        assert_eq!(loaded.measurements()[0].length_mm, Some(5.0));

        // Ids continue after the highest loaded id
        let next = loaded.record_displacement("P3", PixelPoint::new(0.0, 0.0), 0, PixelPoint::new(1.0, 0.0), 0);
        assert_eq!(next.id, 3);

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_json_layout() {
        let mut store = MeasurementStore::new();
        store
            .record_rectangle(
                RectangleGroup::Pre,
                0,
                PixelPoint::new(0.0, 0.0),
                PixelPoint::new(4.0, 4.0),
            )
            .unwrap();

        let value = serde_json::to_value(store.export_snapshot()).unwrap();
        assert!(value["metadata"]["exported"].is_string());
        assert!(value["metadata"]["calibration"]["length_per_pixel"].is_null());
        assert!(value["rectangles"]["pre"].is_object());
        assert!(value["rectangles"].get("post").is_none());
        assert_eq!(value["rectangles"]["pre"]["width_px"], 4.0);
        assert!(value["measurements"].as_array().unwrap().is_empty());
    }

    #[test]
    fn test_load_missing_file() {
        let result = load_json(temp_path("does_not_exist.json"));
        assert!(matches!(result, Err(ExportError::Io(_))));
    }

    #[test]
    fn test_load_malformed_file() {
        let path = temp_path("malformed.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(matches!(load_json(&path), Err(ExportError::Json(_))));
        let _ = fs::remove_file(&path);
    }
}
