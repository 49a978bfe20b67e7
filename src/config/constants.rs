//! Rendering and unit constants.

/// Default rendering DPI for PDF pages.
pub const DEFAULT_DPI: u32 = 150;

/// Points per inch (PDF standard).
pub const POINTS_PER_INCH: f64 = 72.0;

/// Millimetres per inch.
pub const MM_PER_INCH: f64 = 25.4;

/// Page size assumed when a page has no readable MediaBox (US Letter, points).
pub const DEFAULT_PAGE_SIZE_PT: (f64, f64) = (612.0, 792.0);

/// Default directory for export files, relative to the working directory.
pub const DEFAULT_OUTPUT_DIR: &str = "results";

/// Export file name suffixes, appended to the PDF file stem.
pub const CSV_SUFFIX: &str = "_measurements.csv";
pub const JSON_SUFFIX: &str = "_measurements.json";
pub const VISUALIZATION_SUFFIX: &str = "_visualization.png";

/// Label prefixes for line measurements and tracked particles.
pub const MEASUREMENT_LABEL_PREFIX: &str = "M";
pub const PARTICLE_LABEL_PREFIX: &str = "P";
