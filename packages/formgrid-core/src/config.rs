//! Engine configuration.

use std::time::Duration;

/// Authoring and runtime configuration.
#[derive(Debug, Clone)]
pub struct FormConfig {
    /// Column span given to newly added fields
    pub default_field_span: u32,
    /// Window during which a second duplicate on the same section is ignored
    pub duplicate_guard_ms: u64,
    /// Maximum number of undo snapshots kept
    pub history_limit: usize,
    /// Row limit used for repeater sections without explicit config
    pub default_repeater_max_rows: usize,
}

impl FormConfig {
    /// Returns the duplicate busy window as a `Duration`.
    pub fn duplicate_guard(&self) -> Duration {
        Duration::from_millis(self.duplicate_guard_ms)
    }
}

impl Default for FormConfig {
    fn default() -> Self {
        Self {
            default_field_span: 4,
            duplicate_guard_ms: 300,
            history_limit: 50,
            default_repeater_max_rows: 10,
        }
    }
}
