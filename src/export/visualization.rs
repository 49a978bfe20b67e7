//! Side-by-side pre/post displacement figure.
//!
//! Each panel draws a rectangle outline in its own physical frame (origin at
//! the bottom-left corner, Y up) with tracked particles marked at their
//! located positions and labels. Each panel is titled with the group and
//! the rectangle's size in millimetres. A group without a rectangle gets a
//! grey panel.

use std::path::Path;

use ab_glyph::{FontRef, PxScale};
use image::{Rgb, RgbImage};
use imageproc::drawing::{
    draw_filled_circle_mut, draw_filled_rect_mut, draw_hollow_circle_mut, draw_hollow_rect_mut,
    draw_line_segment_mut, draw_text_mut,
};
use imageproc::rect::Rect;

use super::ExportError;
use crate::calibration::Calibration;
use crate::measurement::{MeasurementSnapshot, PhysicalPoint, Rectangle, RectangleGroup};

pub const PANEL_SIZE: u32 = 600;
const MARGIN: f32 = 40.0;
/// Fraction of the rectangle size left blank around it.
const PADDING: f64 = 0.1;
const PARTICLE_RADIUS: i32 = 5;
const TITLE_SIZE: f32 = 18.0;
const LABEL_SIZE: f32 = 14.0;

const FONT_DATA: &[u8] = include_bytes!("../../resources/DejaVuSans.ttf");

const BACKGROUND: Rgb<u8> = Rgb([255, 255, 255]);
const MISSING: Rgb<u8> = Rgb([211, 211, 211]);
const OUTLINE: Rgb<u8> = Rgb([0, 0, 0]);
const GRID: Rgb<u8> = Rgb([230, 230, 230]);
const PARTICLE: Rgb<u8> = Rgb([220, 20, 60]);
const DIVIDER: Rgb<u8> = Rgb([128, 128, 128]);
const TEXT: Rgb<u8> = Rgb([33, 33, 33]);

/// Maps a rectangle's physical frame onto one panel of the canvas.
#[derive(Debug, Clone, Copy)]
pub struct PanelLayout {
    origin_x: f32,
    origin_y: f32,
    scale: f64,
    width_mm: f64,
    height_mm: f64,
}

impl PanelLayout {
    /// Fit a `width_mm` x `height_mm` frame into the panel at `panel_x`,
    /// keeping equal axis scales.
    pub fn fit(panel_x: u32, width_mm: f64, height_mm: f64) -> Self {
        let available = PANEL_SIZE as f64 - 2.0 * MARGIN as f64;
        let span_x = width_mm * (1.0 + 2.0 * PADDING);
        let span_y = height_mm * (1.0 + 2.0 * PADDING);
        let scale = (available / span_x).min(available / span_y);

        let used_x = span_x * scale;
        let used_y = span_y * scale;
        Self {
            origin_x: panel_x as f32 + MARGIN + ((available - used_x) / 2.0) as f32,
            origin_y: MARGIN + ((available - used_y) / 2.0) as f32,
            scale,
            width_mm,
            height_mm,
        }
    }

    /// Canvas position of a physical point.
    pub fn project(&self, point: PhysicalPoint) -> (f32, f32) {
        let x = (point.x + self.width_mm * PADDING) * self.scale;
        let y = (self.height_mm * (1.0 + PADDING) - point.y) * self.scale;
        (self.origin_x + x as f32, self.origin_y + y as f32)
    }
}

fn panel_rect(x: i32, y: i32, width: u32, height: u32) -> Rect {
    Rect::at(x, y).of_size(width.max(1), height.max(1))
}

fn draw_title(canvas: &mut RgbImage, panel_x: u32, font: Option<&FontRef>, title: &str) {
    if let Some(font) = font {
        draw_text_mut(
            canvas,
            TEXT,
            panel_x as i32 + MARGIN as i32,
            12,
            PxScale::from(TITLE_SIZE),
            font,
            title,
        );
    }
}

fn draw_missing_panel(
    canvas: &mut RgbImage,
    panel_x: u32,
    group: RectangleGroup,
    font: Option<&FontRef>,
) {
    draw_title(canvas, panel_x, font, &format!("{} (not recorded)", group.title()));
    let inset = MARGIN as u32;
    draw_filled_rect_mut(
        canvas,
        panel_rect(
            (panel_x + inset) as i32,
            inset as i32,
            PANEL_SIZE - 2 * inset,
            PANEL_SIZE - 2 * inset,
        ),
        MISSING,
    );
}

fn draw_panel(
    canvas: &mut RgbImage,
    panel_x: u32,
    rect: &Rectangle,
    calibration: &Calibration,
    particles: &[(&str, PhysicalPoint)],
    font: Option<&FontRef>,
) {
    let width_mm = calibration.pixels_to_length(rect.width_px);
    let height_mm = calibration.pixels_to_length(rect.height_px);
    let layout = PanelLayout::fit(panel_x, width_mm, height_mm);
    draw_title(
        canvas,
        panel_x,
        font,
        &format!("{} ({:.2} x {:.2} mm)", rect.group.title(), width_mm, height_mm),
    );

    // Millimetre grid inside the rectangle
    let step = grid_step(width_mm.max(height_mm));
    let mut x = step;
    while x < width_mm {
        let top = layout.project(PhysicalPoint::new(x, height_mm));
        let bottom = layout.project(PhysicalPoint::new(x, 0.0));
        draw_line_segment_mut(canvas, top, bottom, GRID);
        x += step;
    }
    let mut y = step;
    while y < height_mm {
        let left = layout.project(PhysicalPoint::new(0.0, y));
        let right = layout.project(PhysicalPoint::new(width_mm, y));
        draw_line_segment_mut(canvas, left, right, GRID);
        y += step;
    }

    let (left, top) = layout.project(PhysicalPoint::new(0.0, height_mm));
    let (right, bottom) = layout.project(PhysicalPoint::new(width_mm, 0.0));
    let (w, h) = ((right - left).round() as u32, (bottom - top).round() as u32);
    for inset in 0..2 {
        draw_hollow_rect_mut(
            canvas,
            panel_rect(
                left.round() as i32 + inset,
                top.round() as i32 + inset,
                w.saturating_sub(2 * inset as u32),
                h.saturating_sub(2 * inset as u32),
            ),
            OUTLINE,
        );
    }

    for (label, point) in particles {
        match canvas_position(canvas, layout.project(*point)) {
            Some(center) => {
                draw_filled_circle_mut(canvas, center, PARTICLE_RADIUS, PARTICLE);
                draw_hollow_circle_mut(canvas, center, PARTICLE_RADIUS, OUTLINE);
                if let Some(font) = font {
                    draw_text_mut(
                        canvas,
                        TEXT,
                        center.0 + PARTICLE_RADIUS + 3,
                        center.1 - PARTICLE_RADIUS - LABEL_SIZE as i32,
                        PxScale::from(LABEL_SIZE),
                        font,
                        label,
                    );
                }
            }
            None => tracing::warn!(
                "Particle {} at ({:.3}, {:.3}) mm falls outside the figure, not drawn",
                label,
                point.x,
                point.y
            ),
        }
    }
}

/// Integer canvas position of a projected point, or `None` when it is not
/// finite or lies off the canvas.
fn canvas_position(canvas: &RgbImage, (x, y): (f32, f32)) -> Option<(i32, i32)> {
    let (width, height) = canvas.dimensions();
    let inside = x.is_finite()
        && y.is_finite()
        && x >= 0.0
        && y >= 0.0
        && x < width as f32
        && y < height as f32;
    inside.then(|| (x.round() as i32, y.round() as i32))
}

/// Grid spacing giving roughly ten divisions over `extent_mm`.
fn grid_step(extent_mm: f64) -> f64 {
    let raw = extent_mm / 10.0;
    let magnitude = 10f64.powf(raw.log10().floor());
    [1.0, 2.0, 5.0, 10.0]
        .iter()
        .map(|m| m * magnitude)
        .find(|s| *s >= raw)
        .unwrap_or(raw)
}

/// Render the two-panel figure.
///
/// Returns `None` when the snapshot carries no calibration, since particle
/// positions cannot be expressed in millimetres.
pub fn render_visualization(snapshot: &MeasurementSnapshot) -> Option<RgbImage> {
    let calibration = match snapshot.calibration() {
        Ok(calibration) => calibration?,
        Err(e) => {
            tracing::warn!("Skipping visualization: {}", e);
            return None;
        }
    };
    let mut canvas = RgbImage::from_pixel(PANEL_SIZE * 2, PANEL_SIZE, BACKGROUND);
    let font = FontRef::try_from_slice(FONT_DATA).ok();
    if font.is_none() {
        tracing::warn!("Bundled font failed to load, figure will have no labels");
    }

    for (slot, group) in RectangleGroup::ALL.into_iter().enumerate() {
        let panel_x = slot as u32 * PANEL_SIZE;
        match snapshot.rectangles.get(group) {
            Some(rect) => {
                let particles: Vec<(&str, PhysicalPoint)> = snapshot
                    .displacements
                    .iter()
                    .map(|p| {
                        let point = match group {
                            RectangleGroup::Pre => p.pre_position_px,
                            RectangleGroup::Post => p.post_position_px,
                        };
                        (p.label.as_str(), rect.locate(point, &calibration))
                    })
                    .collect();
                draw_panel(&mut canvas, panel_x, rect, &calibration, &particles, font.as_ref());
            }
            None => draw_missing_panel(&mut canvas, panel_x, group, font.as_ref()),
        }
    }

    draw_line_segment_mut(
        &mut canvas,
        (PANEL_SIZE as f32, 0.0),
        (PANEL_SIZE as f32, PANEL_SIZE as f32 - 1.0),
        DIVIDER,
    );
    Some(canvas)
}

/// Render and save the figure as PNG. Returns `false` when nothing was
/// written because the snapshot is uncalibrated.
pub fn export_visualization(
    snapshot: &MeasurementSnapshot,
    path: impl AsRef<Path>,
) -> Result<bool, ExportError> {
    match render_visualization(snapshot) {
        Some(canvas) => {
            canvas.save(path.as_ref())?;
            Ok(true)
        }
        None => {
            tracing::warn!("Skipping visualization: no calibration set");
            Ok(false)
        }
    }
}
