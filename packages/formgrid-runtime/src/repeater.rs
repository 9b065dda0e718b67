//! Repeater section rows.
//!
//! A repeater's answer is an array of row objects stored under the section
//! id in the enclosing scope. Rows are added and removed within the
//! section's `[minRows, maxRows]` bounds.

use serde_json::Value;

use formgrid_core::schema::{AddPosition, RepeaterConfig};

use crate::answers::{array_slot, AnswerMap};
use crate::context::DataContext;

/// Number of rows currently stored for the repeater `section_id`.
pub fn row_count(ctx: &dyn DataContext, section_id: &str) -> usize {
    ctx.get(section_id)
        .and_then(Value::as_array)
        .map_or(0, Vec::len)
}

fn rows_mut<'c>(ctx: &'c mut dyn DataContext, section_id: &str) -> &'c mut Vec<Value> {
    let slot = ctx
        .values_mut()
        .entry(section_id.to_string())
        .or_insert(Value::Null);
    array_slot(slot)
}

fn blank_row() -> Value {
    Value::Object(AnswerMap::new())
}

/// Pads the rows of `section_id` with blank rows up to the minimum.
///
/// The padding is written into the answers. Lists longer than the
/// maximum are left alone.
///
/// # Returns
///
/// The row count after padding.
pub fn pad_rows(ctx: &mut dyn DataContext, section_id: &str, config: &RepeaterConfig) -> usize {
    let (min, _) = config.bounds();
    let current = row_count(ctx, section_id);
    if current >= min {
        return current;
    }
    let rows = rows_mut(ctx, section_id);
    rows.resize_with(min, blank_row);
    tracing::debug!("Padded repeater '{}' from {} to {} rows", section_id, current, min);
    min
}

/// Adds a blank row at the configured position if below the maximum.
///
/// # Returns
///
/// `true` if a row was added.
pub fn add_row(ctx: &mut dyn DataContext, section_id: &str, config: &RepeaterConfig) -> bool {
    let (_, max) = config.bounds();
    let current = row_count(ctx, section_id);
    if current >= max {
        tracing::debug!("Repeater '{}' already holds {} of {} rows", section_id, current, max);
        return false;
    }
    let rows = rows_mut(ctx, section_id);
    match config.add_position {
        AddPosition::Top => rows.insert(0, blank_row()),
        AddPosition::Bottom => rows.push(blank_row()),
    }
    // Row-indexed error keys no longer line up.
    clear_row_errors(ctx, section_id);
    true
}

/// Removes row `index` if above the minimum.
///
/// # Returns
///
/// `true` if a row was removed.
pub fn remove_row(
    ctx: &mut dyn DataContext,
    section_id: &str,
    config: &RepeaterConfig,
    index: usize,
) -> bool {
    let (min, _) = config.bounds();
    let current = row_count(ctx, section_id);
    if current <= min || index >= current {
        tracing::debug!(
            "Not removing row {} of repeater '{}' ({} rows, minimum {})",
            index,
            section_id,
            current,
            min
        );
        return false;
    }
    rows_mut(ctx, section_id).remove(index);
    clear_row_errors(ctx, section_id);
    true
}

fn clear_row_errors(ctx: &mut dyn DataContext, section_id: &str) {
    let prefix = format!("{}.", ctx.error_key(section_id));
    ctx.errors_mut().retain(|key, _| !key.starts_with(&prefix));
}
