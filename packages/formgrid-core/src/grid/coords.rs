//! Pure grid coordinate helpers.
//!
//! Everything here works on a section's fields as a plain slice, so the
//! layout engine can run its algorithms on a working copy and write the
//! resulting coordinates back in one step.

use std::collections::{BTreeMap, BTreeSet, HashSet, VecDeque};

use crate::schema::{Breakpoint, ColumnSpan, FieldDefinition, GRID_COLUMNS};

/// Clamps a span into `1..=12`.
pub fn clamp_span(span: u32) -> u32 {
    span.clamp(1, GRID_COLUMNS)
}

/// Resolves the span rendered at `breakpoint`.
///
/// Bare integer spans apply to tablet and desktop; mobile always renders
/// full width.
pub fn resolve_span(span: &ColumnSpan, breakpoint: Breakpoint) -> u32 {
    let raw = match (*span, breakpoint) {
        (ColumnSpan::Fixed(_), Breakpoint::Mobile) => GRID_COLUMNS,
        (ColumnSpan::Fixed(n), _) => n,
        (ColumnSpan::Responsive { mobile, .. }, Breakpoint::Mobile) => mobile,
        (ColumnSpan::Responsive { tablet, .. }, Breakpoint::Tablet) => tablet,
        (ColumnSpan::Responsive { desktop, .. }, Breakpoint::Desktop) => desktop,
    };
    clamp_span(raw)
}

/// Span of `field` on the authoring grid.
pub fn layout_span(field: &FieldDefinition) -> u32 {
    clamp_span(field.column_span.desktop())
}

/// Last column occupied by `field`.
pub fn end_column(field: &FieldDefinition) -> u32 {
    field.grid_column + layout_span(field) - 1
}

/// Returns `true` when the closed intervals `[a_start, a_end]` and
/// `[b_start, b_end]` share a column.
pub fn intervals_overlap(a_start: u32, a_end: u32, b_start: u32, b_end: u32) -> bool {
    a_start <= b_end && b_start <= a_end
}

/// Returns `true` when both fields sit on the same row and share a column.
pub fn fields_overlap(a: &FieldDefinition, b: &FieldDefinition) -> bool {
    a.grid_row == b.grid_row
        && intervals_overlap(a.grid_column, end_column(a), b.grid_column, end_column(b))
}

/// Stable sort by `(gridRow, gridColumn)`.
pub fn sort_by_position(fields: &mut [FieldDefinition]) {
    fields.sort_by_key(|f| (f.grid_row, f.grid_column));
}

/// Computes where a new field of `span` columns goes.
///
/// Continues the last row when enough columns remain after the
/// bottom-right field, otherwise opens a new row at column 1.
pub fn next_slot(fields: &[FieldDefinition], span: u32) -> (u32, u32) {
    let span = clamp_span(span);
    let last = fields
        .iter()
        .filter(|f| f.is_placed())
        .max_by_key(|f| (f.grid_row, f.grid_column));

    match last {
        None => (1, 1),
        Some(last) => {
            let next_column = last.grid_column + layout_span(last);
            let remaining = (GRID_COLUMNS + 1).saturating_sub(next_column);
            if remaining >= span {
                (last.grid_row, next_column)
            } else {
                (last.grid_row + 1, 1)
            }
        }
    }
}

/// Renumbers used rows to `1..=k`, preserving their relative order.
///
/// Columns are untouched. Returns `true` if any row changed.
pub fn compact_rows(fields: &mut [FieldDefinition]) -> bool {
    let rows: BTreeSet<u32> = fields
        .iter()
        .filter(|f| f.grid_row >= 1)
        .map(|f| f.grid_row)
        .collect();
    let mapping: BTreeMap<u32, u32> = rows
        .into_iter()
        .enumerate()
        .map(|(index, row)| (row, index as u32 + 1))
        .collect();

    let mut changed = false;
    for field in fields.iter_mut() {
        if let Some(&row) = mapping.get(&field.grid_row) {
            if row != field.grid_row {
                field.grid_row = row;
                changed = true;
            }
        }
    }
    changed
}

/// Re-places every field sequentially in reading order.
///
/// Fields are sorted by position (list order breaks ties) and then laid
/// out left to right, wrapping once 12 columns would be exceeded. The
/// slice is left in the new reading order.
pub fn reflow(fields: &mut [FieldDefinition]) {
    sort_by_position(fields);
    let mut row = 1;
    let mut column = 1;
    for field in fields.iter_mut() {
        let span = layout_span(field);
        if column + span - 1 > GRID_COLUMNS {
            row += 1;
            column = 1;
        }
        field.grid_row = row;
        field.grid_column = column;
        column += span;
    }
}

/// Gives explicit coordinates to fields stored before the grid existed.
///
/// Placed fields keep their row and are pulled left if they would
/// overflow. Unplaced fields flow after the bottom-right placed field in
/// list order. Returns the number of fields that received coordinates.
pub fn migrate_legacy(fields: &mut [FieldDefinition]) -> usize {
    for field in fields.iter_mut() {
        if let ColumnSpan::Fixed(span) = field.column_span {
            field.column_span = ColumnSpan::Fixed(clamp_span(span));
        }
        if field.is_placed() {
            let max_start = GRID_COLUMNS - layout_span(field) + 1;
            field.grid_column = field.grid_column.min(max_start);
        }
    }

    let (mut row, mut column) = fields
        .iter()
        .filter(|f| f.is_placed())
        .max_by_key(|f| (f.grid_row, f.grid_column))
        .map(|last| (last.grid_row, end_column(last) + 1))
        .unwrap_or((1, 1));

    let mut migrated = 0;
    for field in fields.iter_mut().filter(|f| !f.is_placed()) {
        let span = layout_span(field);
        if column + span - 1 > GRID_COLUMNS {
            row += 1;
            column = 1;
        }
        field.grid_row = row;
        field.grid_column = column;
        column += span;
        migrated += 1;
    }
    migrated
}

/// Moves `shifted` out of `anchor`'s way.
///
/// The field goes right after the anchor's last column when it still fits
/// the row, otherwise to column 1 of the next row.
pub fn shift_past(anchor: &FieldDefinition, shifted: &mut FieldDefinition) {
    let candidate = end_column(anchor) + 1;
    if candidate + layout_span(shifted) - 1 <= GRID_COLUMNS {
        shifted.grid_row = anchor.grid_row;
        shifted.grid_column = candidate;
    } else {
        shifted.grid_row = anchor.grid_row + 1;
        shifted.grid_column = 1;
    }
}

/// Pushes siblings away from the fields at `anchors` until no two fields
/// on a row share a column.
///
/// Every shifted field becomes an anchor in turn, so a push can cascade
/// along a row or down into following rows. The field at `pinned`, if
/// any, never moves: when a cascade reaches it, the incoming field moves
/// past it instead. Returns the number of shifts performed.
pub fn resolve_overlaps(
    fields: &mut [FieldDefinition],
    anchors: &[usize],
    pinned: Option<usize>,
) -> usize {
    let mut queue: VecDeque<usize> = anchors.iter().copied().collect();
    let limit = fields.len() * fields.len() * GRID_COLUMNS as usize + 16;
    let mut shifts = 0;

    while let Some(anchor) = queue.pop_front() {
        for other in 0..fields.len() {
            if other == anchor || !fields_overlap(&fields[anchor], &fields[other]) {
                continue;
            }
            let (fixed, moving) = if Some(other) == pinned {
                (other, anchor)
            } else {
                (anchor, other)
            };
            let fixed_field = fields[fixed].clone();
            shift_past(&fixed_field, &mut fields[moving]);
            queue.push_back(moving);
            shifts += 1;

            if shifts > limit {
                tracing::warn!(
                    "Overlap cascade did not settle after {} shifts, reflowing section",
                    shifts
                );
                reflow(fields);
                return shifts;
            }
            if moving == anchor {
                // The anchor itself moved; re-examine it from its new spot.
                break;
            }
        }
    }
    shifts
}

/// Returns the first grid invariant broken by `fields`, if any.
///
/// Checks column bounds, per-row overlap, contiguous rows starting at 1
/// and unique field names.
pub fn check_layout(fields: &[FieldDefinition]) -> Option<String> {
    for field in fields {
        if !field.is_placed() {
            return Some(format!("field '{}' has no grid position", field.name));
        }
        if end_column(field) > GRID_COLUMNS {
            return Some(format!(
                "field '{}' spans columns {}..={} past column {}",
                field.name,
                field.grid_column,
                end_column(field),
                GRID_COLUMNS
            ));
        }
    }

    let mut by_row: BTreeMap<u32, Vec<(u32, u32, &str)>> = BTreeMap::new();
    for field in fields {
        by_row.entry(field.grid_row).or_default().push((
            field.grid_column,
            end_column(field),
            &field.name,
        ));
    }
    for (row, intervals) in by_row.iter_mut() {
        intervals.sort_by_key(|&(start, _, _)| start);
        for pair in intervals.windows(2) {
            if pair[0].1 >= pair[1].0 {
                return Some(format!(
                    "fields '{}' and '{}' overlap on row {}",
                    pair[0].2, pair[1].2, row
                ));
            }
        }
    }

    for (expected, row) in by_row.keys().enumerate() {
        if *row != expected as u32 + 1 {
            return Some(format!("row {} follows a gap", row));
        }
    }

    let mut names = HashSet::new();
    for field in fields {
        if !names.insert(field.name.as_str()) {
            return Some(format!("field name '{}' is used twice", field.name));
        }
    }

    None
}
