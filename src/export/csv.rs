//! CSV export.
//!
//! Layout: `#` comment lines with calibration and export time, then one
//! block per stored rectangle, then the line measurements and particle
//! displacements. Each block opens with a `# === NAME ===` marker and a
//! header row.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use super::ExportError;
use crate::measurement::{MeasurementSnapshot, Rectangle, RectangleGroup};

const RECTANGLE_HEADERS: [&str; 22] = [
    "group", "page",
    "tl_x_px", "tl_y_px", "tr_x_px", "tr_y_px", "bl_x_px", "bl_y_px", "br_x_px", "br_y_px",
    "tl_x_mm", "tl_y_mm", "tr_x_mm", "tr_y_mm", "bl_x_mm", "bl_y_mm", "br_x_mm", "br_y_mm",
    "width_px", "height_px", "width_mm", "height_mm",
];

const MEASUREMENT_HEADERS: [&str; 14] = [
    "id", "label", "group", "page",
    "x1_px", "y1_px", "x2_px", "y2_px",
    "dx_px", "dy_px", "pixel_distance",
    "length_mm", "angle_deg", "notes",
];

const PARTICLE_HEADERS: [&str; 14] = [
    "id", "label",
    "pre_x_px", "pre_y_px", "post_x_px", "post_y_px",
    "pre_page", "post_page",
    "dx_px", "dy_px", "magnitude_px",
    "dx_mm", "dy_mm", "magnitude_mm",
];

fn px(value: f64) -> String {
    format!("{:.2}", value)
}

fn mm(value: Option<f64>) -> String {
    value
        .map(|v| format!("{:.4}", v))
        .unwrap_or_else(|| "N/A".to_string())
}

/// Write one `# === NAME ===` block: marker line, header row, data rows.
///
/// Each block gets its own short-lived CSV writer so comment lines can go
/// straight to `out` between blocks.
fn write_block<W: Write>(
    out: &mut W,
    name: &str,
    headers: &[&str],
    rows: impl IntoIterator<Item = Vec<String>>,
) -> Result<(), ExportError> {
    write!(out, "\n# === {} ===\n", name)?;

    let mut writer = ::csv::Writer::from_writer(&mut *out);
    writer.write_record(headers)?;
    for row in rows {
        writer.write_record(&row)?;
    }
    writer.flush()?;
    Ok(())
}

fn rectangle_row(rect: &Rectangle) -> Vec<String> {
    let mut row = vec![rect.group.to_string(), rect.page.to_string()];

    for corner in rect.corners_px.to_array() {
        row.push(px(corner.x));
        row.push(px(corner.y));
    }
    match rect.corners_mm {
        Some(corners) => {
            for corner in corners.to_array() {
                row.push(mm(Some(corner.x)));
                row.push(mm(Some(corner.y)));
            }
        }
        None => row.extend(std::iter::repeat("N/A".to_string()).take(8)),
    }

    row.push(px(rect.width_px));
    row.push(px(rect.height_px));
    row.push(mm(rect.width_mm));
    row.push(mm(rect.height_mm));
    row
}

/// Write a snapshot as CSV to any writer.
pub fn write_csv<W: Write>(snapshot: &MeasurementSnapshot, mut out: W) -> Result<(), ExportError> {
    let calibration = &snapshot.metadata.calibration;
    match (calibration.length_per_pixel, calibration.source) {
        (Some(lpp), Some(source)) => writeln!(out, "# Calibration: {:.6} mm/pixel ({})", lpp, source)?,
        (Some(lpp), None) => writeln!(out, "# Calibration: {:.6} mm/pixel", lpp)?,
        _ => writeln!(out, "# Calibration: none")?,
    }
    writeln!(out, "# Exported: {}", snapshot.metadata.exported)?;

    for group in RectangleGroup::ALL {
        if let Some(rect) = snapshot.rectangles.get(group) {
            write_block(
                &mut out,
                &format!("{} RECTANGLE", group.as_str().to_uppercase()),
                &RECTANGLE_HEADERS,
                [rectangle_row(rect)],
            )?;
        }
    }

    if !snapshot.measurements.is_empty() {
        let rows = snapshot.measurements.iter().map(|m| {
            vec![
                m.id.to_string(),
                m.label.clone(),
                m.group.to_string(),
                m.page.to_string(),
                px(m.point1_px.x),
                px(m.point1_px.y),
                px(m.point2_px.x),
                px(m.point2_px.y),
                px(m.dx_px),
                px(m.dy_px),
                px(m.pixel_distance),
                mm(m.length_mm),
                px(m.angle_deg),
                m.notes.clone(),
            ]
        });
        write_block(&mut out, "MEASUREMENTS", &MEASUREMENT_HEADERS, rows)?;
    }

    if !snapshot.displacements.is_empty() {
        let rows = snapshot.displacements.iter().map(|p| {
            vec![
                p.id.to_string(),
                p.label.clone(),
                px(p.pre_position_px.x),
                px(p.pre_position_px.y),
                px(p.post_position_px.x),
                px(p.post_position_px.y),
                p.pre_page.to_string(),
                p.post_page.to_string(),
                px(p.dx_px),
                px(p.dy_px),
                px(p.magnitude_px),
                mm(p.dx_mm),
                mm(p.dy_mm),
                mm(p.magnitude_mm),
            ]
        });
        write_block(&mut out, "PARTICLE DISPLACEMENTS", &PARTICLE_HEADERS, rows)?;
    }

    out.flush()?;
    Ok(())
}

/// Render a snapshot as a CSV string.
pub fn to_csv_string(snapshot: &MeasurementSnapshot) -> Result<String, ExportError> {
    let mut buffer = Vec::new();
    write_csv(snapshot, &mut buffer)?;
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

/// Export a snapshot to a CSV file.
pub fn export_csv(snapshot: &MeasurementSnapshot, path: impl AsRef<Path>) -> Result<(), ExportError> {
    let file = File::create(path.as_ref())?;
    write_csv(snapshot, BufWriter::new(file))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calibration::CalibrationSource;
    use crate::measurement::{MeasurementGroup, MeasurementStore, PixelPoint};

    fn sample_store() -> MeasurementStore {
        let mut store = MeasurementStore::new();
        store.set_calibration(0.084667, CalibrationSource::Page).unwrap();
        store
            .record_rectangle(
                RectangleGroup::Pre,
                0,
                PixelPoint::new(100.5, 400.2),
                PixelPoint::new(350.8, 150.3),
            )
            .unwrap();
        store
    }

    #[test]
    fn test_header_and_pre_block() {
        let csv = to_csv_string(&sample_store().export_snapshot()).unwrap();
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines[0], "# Calibration: 0.084667 mm/pixel (page)");
        assert!(lines[1].starts_with("# Exported: "));
        assert!(csv.contains("# === PRE RECTANGLE ===\n"));
        assert!(!csv.contains("POST RECTANGLE"));

        let marker = lines.iter().position(|l| *l == "# === PRE RECTANGLE ===").unwrap();
        assert!(lines[marker + 1].starts_with("group,page,tl_x_px"));
        let row: Vec<&str> = lines[marker + 2].split(',').collect();
        assert_eq!(row.len(), RECTANGLE_HEADERS.len());
        assert_eq!(row[0], "pre");
        assert_eq!(row[1], "0");
        assert_eq!(row[2], "100.50");
        assert_eq!(row[3], "150.30");
        // Bottom-left physical corner is the origin
        assert_eq!(row[14], "0.0000");
        assert_eq!(row[15], "0.0000");
        assert_eq!(row[18], "250.30");
        assert_eq!(row[19], "249.90");
    }

    #[test]
    fn test_measurement_and_particle_blocks() {
        let mut store = sample_store();
        store
            .record_rectangle(
                RectangleGroup::Post,
                1,
                PixelPoint::new(0.0, 0.0),
                PixelPoint::new(10.0, 10.0),
            )
            .unwrap();
        store.record_measurement(
            "M1",
            MeasurementGroup::Fiber,
            0,
            PixelPoint::new(0.0, 0.0),
            PixelPoint::new(3.0, 4.0),
        );
        store.record_displacement("P1", PixelPoint::new(1.0, 1.0), 0, PixelPoint::new(4.0, 5.0), 1);

        let csv = to_csv_string(&store.export_snapshot()).unwrap();
        let pre = csv.find("# === PRE RECTANGLE ===").unwrap();
        let post = csv.find("# === POST RECTANGLE ===").unwrap();
        let measurements = csv.find("# === MEASUREMENTS ===").unwrap();
        let particles = csv.find("# === PARTICLE DISPLACEMENTS ===").unwrap();
        assert!(pre < post && post < measurements && measurements < particles);

        assert!(csv.contains("1,M1,fiber,0,0.00,0.00,3.00,4.00,3.00,4.00,5.00,"));
        assert!(csv.contains("1,P1,1.00,1.00,4.00,5.00,0,1,3.00,4.00,5.00,"));
    }

    #[test]
    fn test_uncalibrated_values() {
        let mut store = MeasurementStore::new();
        store.record_displacement("P1", PixelPoint::new(0.0, 0.0), 0, PixelPoint::new(1.0, 0.0), 0);

        let csv = to_csv_string(&store.export_snapshot()).unwrap();
        assert!(csv.starts_with("# Calibration: none\n"));
        assert!(csv.contains(",N/A,N/A,N/A"));
    }

    #[test]
    fn test_export_csv_file_layout() {
        let mut store = sample_store();
        store.record_displacement("P1", PixelPoint::new(1.0, 1.0), 0, PixelPoint::new(4.0, 5.0), 0);

        let path = std::env::temp_dir().join(format!("pdf_measure_csv_{}.csv", std::process::id()));
        export_csv(&store.export_snapshot(), &path).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();

        assert_eq!(lines[0], "# Calibration: 0.084667 mm/pixel (page)");
        assert!(lines[1].starts_with("# Exported: "));
        assert_eq!(lines[2], "");
        assert_eq!(lines[3], "# === PRE RECTANGLE ===");
        assert!(lines[4].starts_with("group,page,"));
        assert!(lines[5].starts_with("pre,0,"));
        assert_eq!(lines[6], "");
        assert_eq!(lines[7], "# === PARTICLE DISPLACEMENTS ===");
        assert_eq!(lines[8], PARTICLE_HEADERS.join(","));
        assert!(lines[9].starts_with("1,P1,"));
        assert_eq!(lines.len(), 10);

        let _ = std::fs::remove_file(&path);
    }
}
