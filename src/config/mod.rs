//! Configuration constants for PDF Measure.

mod constants;
mod shortcuts;

pub use constants::{
    CSV_SUFFIX, DEFAULT_DPI, DEFAULT_OUTPUT_DIR, DEFAULT_PAGE_SIZE_PT, JSON_SUFFIX,
    MEASUREMENT_LABEL_PREFIX, MM_PER_INCH, PARTICLE_LABEL_PREFIX, POINTS_PER_INCH,
    VISUALIZATION_SUFFIX,
};
pub use shortcuts::{action_for_key, KeyAction, HELP_TEXT, SHORTCUTS};
