//! Column spans and responsive breakpoints.

use serde::{Deserialize, Serialize};

/// Number of columns in a section row.
pub const GRID_COLUMNS: u32 = 12;

/// Span assigned to fields created by the layout engine.
pub const DEFAULT_FIELD_SPAN: u32 = 4;

/// Viewport class used to pick a responsive span.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Breakpoint {
    Mobile,
    Tablet,
    #[default]
    Desktop,
}

impl Breakpoint {
    /// Classifies a viewport width in pixels.
    pub fn from_width(width: u32) -> Self {
        match width {
            0..=639 => Breakpoint::Mobile,
            640..=1023 => Breakpoint::Tablet,
            _ => Breakpoint::Desktop,
        }
    }
}

/// Number of grid columns a field occupies.
///
/// Stored either as a bare integer or as a per-breakpoint object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ColumnSpan {
    Fixed(u32),
    Responsive { mobile: u32, tablet: u32, desktop: u32 },
}

impl ColumnSpan {
    /// Span used on the authoring grid.
    pub fn desktop(&self) -> u32 {
        match *self {
            ColumnSpan::Fixed(span) => span,
            ColumnSpan::Responsive { desktop, .. } => desktop,
        }
    }

    /// Returns a copy with the desktop span replaced.
    ///
    /// Responsive spans keep their mobile and tablet entries.
    pub fn with_desktop(self, span: u32) -> Self {
        match self {
            ColumnSpan::Fixed(_) => ColumnSpan::Fixed(span),
            ColumnSpan::Responsive { mobile, tablet, .. } => ColumnSpan::Responsive {
                mobile,
                tablet,
                desktop: span,
            },
        }
    }
}

impl Default for ColumnSpan {
    // Fields stored without a span predate the grid and were rendered full width.
    fn default() -> Self {
        ColumnSpan::Fixed(GRID_COLUMNS)
    }
}

impl From<u32> for ColumnSpan {
    fn from(span: u32) -> Self {
        ColumnSpan::Fixed(span)
    }
}
