//! Interaction modes.

use std::fmt;

/// What the next click (or typed value) means.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Clicks are ignored.
    #[default]
    View,
    /// Two clicks record a line measurement.
    Measure,
    /// Two diagonal clicks record the current group's rectangle.
    Rectangle,
    /// Two clicks mark a reference line of known length.
    Calibrate,
    /// Waiting for the reference line's length in millimetres.
    CalibrateLength,
    /// Next click is a particle's pre-test position.
    ParticlePre,
    /// Next click is the same particle's post-test position.
    ParticlePost,
    /// Waiting for `yes`/`no` before clearing everything.
    ConfirmClear,
}

impl Mode {
    /// Clicks collected before the mode acts.
    pub fn clicks_required(&self) -> usize {
        match self {
            Mode::Measure | Mode::Rectangle | Mode::Calibrate => 2,
            Mode::ParticlePre | Mode::ParticlePost => 1,
            Mode::View | Mode::CalibrateLength | Mode::ConfirmClear => 0,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::View => "VIEW",
            Mode::Measure => "MEASURE",
            Mode::Rectangle => "RECTANGLE",
            Mode::Calibrate => "CALIBRATE",
            Mode::CalibrateLength => "CALIBRATE",
            Mode::ParticlePre => "PARTICLE TRACK",
            Mode::ParticlePost => "PARTICLE TRACK",
            Mode::ConfirmClear => "CONFIRM",
        }
    }

    /// Status-line instruction for this mode.
    pub fn prompt(&self) -> &'static str {
        match self {
            Mode::View => "Press 'h' for help",
            Mode::Measure => "Click 2 points",
            Mode::Rectangle => "Click 2 diagonal corners",
            Mode::Calibrate => "Click both ends of a reference of known length",
            Mode::CalibrateLength => "Enter the reference length: length MM",
            Mode::ParticlePre => "Click PRE-test position",
            Mode::ParticlePost => "Click POST-test position (can be on a different page)",
            Mode::ConfirmClear => "Clear ALL measurements? (yes/no)",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} MODE - {}", self.as_str(), self.prompt())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clicks_required() {
        assert_eq!(Mode::Measure.clicks_required(), 2);
        assert_eq!(Mode::ParticlePost.clicks_required(), 1);
        assert_eq!(Mode::View.clicks_required(), 0);
        assert_eq!(Mode::ConfirmClear.clicks_required(), 0);
    }

    #[test]
    fn test_display() {
        assert_eq!(Mode::default().to_string(), "VIEW MODE - Press 'h' for help");
        assert!(Mode::ParticlePre.to_string().starts_with("PARTICLE TRACK MODE"));
    }
}
