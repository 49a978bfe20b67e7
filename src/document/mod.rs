//! PDF document access: page count and page geometry.

mod pdf;

pub use pdf::{DocumentError, PageGeometry, PageSource, PdfDocument};
