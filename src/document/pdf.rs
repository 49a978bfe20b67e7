//! PDF page geometry via `lopdf`.
//!
//! Rasterizing pages is left to an external renderer; this module only
//! answers the questions the measurement store needs: how many pages there
//! are, how large each page is physically, and how many pixels wide the
//! rendered image will be at a given DPI.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use lopdf::{Dictionary, Document, Object, ObjectId};
use thiserror::Error;

use crate::calibration::{Calibration, CalibrationError};
use crate::config::{DEFAULT_PAGE_SIZE_PT, MM_PER_INCH, POINTS_PER_INCH};

/// Document errors.
#[derive(Error, Debug)]
pub enum DocumentError {
    #[error("Failed to open PDF {path}: {message}")]
    OpenFailed { path: PathBuf, message: String },
    #[error("PDF has no pages")]
    NoPages,
    #[error("Page {index} out of range (document has {count} pages)")]
    PageOutOfRange { index: usize, count: usize },
    #[error("Invalid DPI: {0}")]
    InvalidDpi(u32),
    #[error(transparent)]
    Calibration(#[from] CalibrationError),
}

/// Physical and rendered size of one page.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageGeometry {
    pub page_index: usize,
    pub width_mm: f64,
    pub height_mm: f64,
    pub width_px: u32,
    pub height_px: u32,
    pub dpi: u32,
}

impl PageGeometry {
    /// Compute the geometry of a page of `width_pt` x `height_pt` points
    /// rendered at `dpi`.
    pub fn from_points(page_index: usize, width_pt: f64, height_pt: f64, dpi: u32) -> Self {
        let zoom = dpi as f64 / POINTS_PER_INCH;
        Self {
            page_index,
            width_mm: width_pt / POINTS_PER_INCH * MM_PER_INCH,
            height_mm: height_pt / POINTS_PER_INCH * MM_PER_INCH,
            width_px: (width_pt * zoom).round() as u32,
            height_px: (height_pt * zoom).round() as u32,
            dpi,
        }
    }

    /// Millimetres per pixel along the page width.
    pub fn length_per_pixel(&self) -> f64 {
        self.width_mm / self.width_px as f64
    }

    /// Page-derived calibration for this rendering.
    pub fn calibration(&self) -> Result<Calibration, CalibrationError> {
        Calibration::from_page(self.width_mm, self.width_px)
    }
}

/// Source of page counts and page sizes.
pub trait PageSource {
    /// Number of pages in the document.
    fn page_count(&self) -> usize;

    /// Page size in PDF points (width, height).
    fn page_size_pt(&self, page_index: usize) -> Result<(f64, f64), DocumentError>;

    /// Page size in millimetres (width, height).
    fn page_size_mm(&self, page_index: usize) -> Result<(f64, f64), DocumentError> {
        let (w, h) = self.page_size_pt(page_index)?;
        Ok((w / POINTS_PER_INCH * MM_PER_INCH, h / POINTS_PER_INCH * MM_PER_INCH))
    }

    /// Geometry of the page as it would be rendered at `dpi`.
    fn page_geometry(&self, page_index: usize, dpi: u32) -> Result<PageGeometry, DocumentError> {
        if dpi == 0 {
            return Err(DocumentError::InvalidDpi(dpi));
        }
        let (w, h) = self.page_size_pt(page_index)?;
        Ok(PageGeometry::from_points(page_index, w, h, dpi))
    }
}

/// A loaded PDF document.
pub struct PdfDocument {
    path: PathBuf,
    /// Page sizes in points, indexed by zero-based page index.
    page_sizes: Vec<(f64, f64)>,
}

impl PdfDocument {
    /// Load a PDF document from disk.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, DocumentError> {
        let path = path.as_ref();
        let doc = Document::load(path).map_err(|e| DocumentError::OpenFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Self::from_document(path, &doc)
    }

    /// Read page sizes from an already parsed document.
    pub fn from_document(path: impl AsRef<Path>, doc: &Document) -> Result<Self, DocumentError> {
        let pages: BTreeMap<u32, ObjectId> = doc.get_pages();
        if pages.is_empty() {
            return Err(DocumentError::NoPages);
        }

        let page_sizes = pages
            .values()
            .map(|&page_id| page_dimensions(doc, page_id))
            .collect();

        let document = Self {
            path: path.as_ref().to_path_buf(),
            page_sizes,
        };
        tracing::info!(
            "Loaded {} ({} pages)",
            document.path.display(),
            document.page_sizes.len()
        );
        Ok(document)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// File stem used to name export files.
    pub fn stem(&self) -> String {
        self.path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "document".to_string())
    }
}

impl PageSource for PdfDocument {
    fn page_count(&self) -> usize {
        self.page_sizes.len()
    }

    fn page_size_pt(&self, page_index: usize) -> Result<(f64, f64), DocumentError> {
        self.page_sizes
            .get(page_index)
            .copied()
            .ok_or(DocumentError::PageOutOfRange {
                index: page_index,
                count: self.page_sizes.len(),
            })
    }
}

/// Page size from the page's `MediaBox`, walking up `Parent` links for an
/// inherited box.
fn page_dimensions(doc: &Document, page_id: ObjectId) -> (f64, f64) {
    let mut current = Some(page_id);
    while let Some(id) = current {
        let Ok(dict) = doc.get_object(id).and_then(|o| o.as_dict()) else {
            break;
        };
        if let Some(size) = extract_media_box(doc, dict) {
            return size;
        }
        current = dict.get(b"Parent").and_then(|p| p.as_reference()).ok();
    }

    tracing::warn!(
        "Page object {:?} has no usable MediaBox, assuming US Letter",
        page_id
    );
    DEFAULT_PAGE_SIZE_PT
}

fn extract_media_box(doc: &Document, dict: &Dictionary) -> Option<(f64, f64)> {
    let raw = dict.get(b"MediaBox").ok()?;
    let resolved = match raw {
        Object::Reference(id) => doc.get_object(*id).ok()?,
        other => other,
    };
    let arr = resolved.as_array().ok()?;
    if arr.len() != 4 {
        return None;
    }
    let llx = obj_to_f64(&arr[0])?;
    let lly = obj_to_f64(&arr[1])?;
    let urx = obj_to_f64(&arr[2])?;
    let ury = obj_to_f64(&arr[3])?;
    Some(((urx - llx).abs(), (ury - lly).abs()))
}

fn obj_to_f64(obj: &Object) -> Option<f64> {
    match obj {
        Object::Integer(i) => Some(*i as f64),
        Object::Real(f) => Some((*f).into()),
        _ => None,
    }
}
