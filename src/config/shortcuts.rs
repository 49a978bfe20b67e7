//! Keyboard shortcuts for the measurement session.

use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Action bound to a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyAction {
    Measure,
    Rectangle,
    Calibrate,
    TrackParticle,
    ToggleGroup,
    Save,
    DeleteLast,
    ClearAll,
    PageCalibration,
    PreviousPage,
    NextPage,
    FirstPage,
    LastPage,
    Cancel,
    Help,
    Quit,
}

/// Mapping from key names to session actions.
pub static SHORTCUTS: Lazy<HashMap<&'static str, KeyAction>> = Lazy::new(|| {
    let mut m = HashMap::new();

    // Measurement
    m.insert("m", KeyAction::Measure);
    m.insert("r", KeyAction::Rectangle);
    m.insert("c", KeyAction::Calibrate);
    m.insert("a", KeyAction::PageCalibration);
    m.insert("t", KeyAction::TrackParticle);
    m.insert("g", KeyAction::ToggleGroup);
    m.insert("escape", KeyAction::Cancel);
    m.insert("esc", KeyAction::Cancel);

    // Data management
    m.insert("s", KeyAction::Save);
    m.insert("d", KeyAction::DeleteLast);
    m.insert("x", KeyAction::ClearAll);

    // Navigation
    m.insert("left", KeyAction::PreviousPage);
    m.insert("[", KeyAction::PreviousPage);
    m.insert("right", KeyAction::NextPage);
    m.insert("]", KeyAction::NextPage);
    m.insert("home", KeyAction::FirstPage);
    m.insert("end", KeyAction::LastPage);

    // Other
    m.insert("h", KeyAction::Help);
    m.insert("?", KeyAction::Help);
    m.insert("q", KeyAction::Quit);

    m
});

/// Look up the action bound to a key name (case-insensitive).
pub fn action_for_key(key: &str) -> Option<KeyAction> {
    SHORTCUTS.get(key.trim().to_lowercase().as_str()).copied()
}

/// Help text listing every binding and text command.
pub const HELP_TEXT: &str = "\
PDF MEASUREMENT TOOL - HELP

NAVIGATION
  left / [  right / ]   Previous / next page
  home / end            First / last page
  page N                Jump to page N (1-based)

MEASUREMENT
  m        Measure a distance (click 2 points)
  r        Record the rectangle for the current group (click 2 diagonal corners)
  c        Calibrate from a known length (click 2 points, then `length MM`)
  a        Re-apply calibration from the page size
  t        Track a particle (pre position, then post position)
  g        Cycle group (pre/post/fiber/edge/other)
  escape   Cancel the current mode

DATA MANAGEMENT
  s                     Save measurements to CSV, JSON and PNG
  d                     Delete the last measurement (or particle)
  x                     Clear everything (confirm with `yes`)
  delete rect pre|post  Delete a rectangle
  delete particle ID    Delete a tracked particle
  particle ID           Show a tracked particle's displacement

CLICKS
  click X Y  or  (X, Y) Click at page-pixel coordinates

OTHER
  status   Show calibration and counts
  h or ?   Show this help
  q        Quit";
