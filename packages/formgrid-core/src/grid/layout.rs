//! Collision-aware layout engine.
//!
//! Every structural operation works on a cloned copy of one section's
//! fields, runs the grid algorithms from [`super::coords`] on it and writes
//! the result back into the document in one step. Committed operations
//! record the previous document for undo.

use std::collections::HashMap;
use std::time::Instant;

use crate::config::FormConfig;
use crate::document::{
    new_id, FormDocument, FormMeta, History, PageProps, SectionParent, SectionProps,
};
use crate::error::FormError;
use crate::schema::{
    ColumnSpan, FieldDefinition, FieldType, FormDefinition, PageDefinition, SectionDefinition,
    GRID_COLUMNS,
};

use crate::interchange::{migrate_definition, resolve_definition_overlaps};

use super::coords::{clamp_span, compact_rows, layout_span, next_slot, reflow, resolve_overlaps};
use super::naming::{copy_label, copy_name, unique_name};

/// Edge of a field grabbed by a resize gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResizeEdge {
    Left,
    Right,
}

/// Grid position and span of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub row: u32,
    pub column: u32,
    pub span: u32,
}

impl Placement {
    fn of(field: &FieldDefinition) -> Self {
        Self {
            row: field.grid_row,
            column: field.grid_column,
            span: layout_span(field),
        }
    }
}

/// Result of a resize.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResizeOutcome {
    /// Final placement of the resized field
    pub placement: Placement,
    /// Number of sibling shifts needed to clear overlaps
    pub shifted: usize,
}

/// Drop target of a move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveTarget {
    /// Another field; the two swap positions
    Field(String),
    /// A grid cell of any section
    Cell {
        section: String,
        row: u32,
        column: u32,
    },
}

/// Why a move was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// The field would not fit the grid at the requested cell
    Overflow,
    /// The field was dropped onto itself
    SelfTarget,
    /// A container field was dropped inside its own nested content
    IntoOwnSubtree,
}

/// Result of a move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveOutcome {
    Swapped { with: String },
    Placed { placement: Placement, shifted: usize },
    Rejected(RejectReason),
}

/// Pre-gesture document kept for abort and for the gesture's undo step.
#[derive(Debug)]
struct GestureSnapshot {
    doc: FormDocument,
    /// Field changed by live resize frames since the gesture began
    live_field: Option<String>,
}

/// Authoring engine over a [`FormDocument`].
///
/// Keeps every committed section free of column overflow and row overlap,
/// and its rows contiguous from 1. Live resizes are the only updates that
/// may leave a section overlapping until the gesture is committed. Frames
/// of a gesture abandoned without commit or cancel are rolled back before
/// the next committed operation on another target.
#[derive(Debug)]
pub struct LayoutEngine {
    doc: FormDocument,
    config: FormConfig,
    history: History,
    /// Document state before the active gesture
    gesture_snapshot: Option<GestureSnapshot>,
    /// Busy window end of the last duplicate per section
    duplicate_busy: HashMap<String, Instant>,
}

impl LayoutEngine {
    pub fn new(doc: FormDocument, config: FormConfig) -> Self {
        let history = History::new(config.history_limit);
        Self {
            doc,
            config,
            history,
            gesture_snapshot: None,
            duplicate_busy: HashMap::new(),
        }
    }

    /// Indexes `form` and wraps it in an engine.
    ///
    /// Legacy fields without grid coordinates are placed and overlapping
    /// stored fields are pushed apart first, so every section starts out
    /// satisfying the grid invariants.
    pub fn from_definition(form: &FormDefinition, config: FormConfig) -> Result<Self, FormError> {
        let mut form = form.clone();
        let migrated = migrate_definition(&mut form);
        let shifted = resolve_definition_overlaps(&mut form);
        if migrated > 0 || shifted > 0 {
            tracing::debug!(
                "Placed form {} for editing ({} fields migrated, {} shifts)",
                form.id,
                migrated,
                shifted
            );
        }
        Ok(Self::new(FormDocument::from_definition(&form)?, config))
    }

    pub fn document(&self) -> &FormDocument {
        &self.doc
    }

    pub fn config(&self) -> &FormConfig {
        &self.config
    }

    /// Exports the current form tree for the external save action.
    pub fn to_definition(&self) -> FormDefinition {
        self.doc.to_definition()
    }

    pub fn into_document(self) -> FormDocument {
        self.doc
    }

    /// Adds a field of `field_type` at the next free slot of a section.
    ///
    /// # Arguments
    /// * `section_id` - Section receiving the field
    /// * `field_type` - Type of the new field
    ///
    /// # Returns
    /// `Result<String, FormError>` with the new field id.
    pub fn add_field(&mut self, section_id: &str, field_type: FieldType) -> Result<String, FormError> {
        self.settle_gesture(None);
        let fields = self.doc.section_fields_cloned(section_id)?;
        let span = clamp_span(self.config.default_field_span);
        let (row, column) = next_slot(&fields, span);

        let name = unique_name(
            &format!("{}_field", field_type.as_str()),
            fields.iter().map(|f| f.name.as_str()),
        );
        let mut def = FieldDefinition::new(new_id("field"), name, field_type)
            .with_label(field_type.display_name())
            .at(row, column);
        def.column_span = ColumnSpan::Fixed(span);
        match field_type {
            FieldType::Section => {
                def.section = Some(Box::new(SectionDefinition::new(
                    new_id("section"),
                    field_type.display_name(),
                )));
            }
            FieldType::Tab => def.tabs = vec![PageDefinition::new(new_id("page"), "Tab 1")],
            _ => {}
        }

        let before = self.snapshot();
        let id = self.doc.insert_field(section_id, usize::MAX, &def)?;
        self.commit(before);

        tracing::debug!(
            "Added {} field {} to section {} at row {}, column {}",
            field_type,
            id,
            section_id,
            row,
            column
        );
        Ok(id)
    }

    /// Resizes a field by dragging one of its edges.
    ///
    /// A right-edge resize keeps the start column, a left-edge resize keeps
    /// the end column; the span is clamped so the field stays on the grid.
    /// With `live` set only the field itself changes. Otherwise overlapped
    /// siblings are pushed along the row (or onto the next one) and the
    /// whole resize gesture becomes one undo step.
    ///
    /// # Arguments
    /// * `field_id` - Field being resized
    /// * `edge` - Grabbed edge
    /// * `requested_span` - Span asked for by the pointer
    /// * `live` - `true` for per-frame updates during a drag
    ///
    /// # Returns
    /// `Result<ResizeOutcome, FormError>`
    pub fn resize_field(
        &mut self,
        field_id: &str,
        edge: ResizeEdge,
        requested_span: u32,
        live: bool,
    ) -> Result<ResizeOutcome, FormError> {
        self.settle_gesture(Some(field_id));
        let section_id = self.section_id_of(field_id)?;
        let field = self
            .doc
            .field(field_id)
            .ok_or_else(|| FormError::field_not_found(field_id))?;

        let start = field.grid_column.clamp(1, GRID_COLUMNS);
        let (column, span) = match edge {
            ResizeEdge::Right => (start, requested_span.clamp(1, GRID_COLUMNS - start + 1)),
            ResizeEdge::Left => {
                let right = (start + layout_span(field) - 1).min(GRID_COLUMNS);
                let span = requested_span.clamp(1, right);
                (right - span + 1, span)
            }
        };

        if live {
            let snapshot = self.gesture_snapshot.get_or_insert_with(|| GestureSnapshot {
                doc: self.doc.clone(),
                live_field: None,
            });
            snapshot.live_field = Some(field_id.to_string());
            let field = self
                .doc
                .field_mut(field_id)
                .ok_or_else(|| FormError::field_not_found(field_id))?;
            field.grid_column = column;
            field.column_span = field.column_span.with_desktop(span);
            return Ok(ResizeOutcome {
                placement: Placement::of(field),
                shifted: 0,
            });
        }

        let before = self.snapshot();
        let mut fields = self.doc.section_fields_cloned(&section_id)?;
        let index = position_of(&fields, field_id)?;
        fields[index].grid_column = column;
        fields[index].column_span = fields[index].column_span.with_desktop(span);

        let shifted = resolve_overlaps(&mut fields, &[index], Some(index));
        compact_rows(&mut fields);
        // A cascade that falls back to a reflow reorders the working copy.
        let placement = Placement::of(&fields[position_of(&fields, field_id)?]);
        self.doc.write_layout(&section_id, &fields)?;
        self.commit(before);

        tracing::debug!(
            "Resized field {} to span {} at column {} ({} shifts)",
            field_id,
            placement.span,
            placement.column,
            shifted
        );
        Ok(ResizeOutcome { placement, shifted })
    }

    /// Moves a field onto another field (swap) or onto a grid cell.
    ///
    /// Cross-section moves are allowed. A moved field whose name is taken
    /// in the destination section is renamed with a copy suffix.
    ///
    /// # Arguments
    /// * `dragged_id` - Field being moved
    /// * `target` - Drop target
    ///
    /// # Returns
    /// `Result<MoveOutcome, FormError>`; refused drops are reported as
    /// `MoveOutcome::Rejected`, not as errors.
    pub fn move_field(
        &mut self,
        dragged_id: &str,
        target: &MoveTarget,
    ) -> Result<MoveOutcome, FormError> {
        self.settle_gesture(None);
        match target {
            MoveTarget::Field(target_id) => self.swap_fields(dragged_id, target_id),
            MoveTarget::Cell {
                section,
                row,
                column,
            } => self.place_field(dragged_id, section, *row, *column),
        }
    }

    fn swap_fields(&mut self, dragged_id: &str, target_id: &str) -> Result<MoveOutcome, FormError> {
        let source = self.section_id_of(dragged_id)?;
        let dest = self.section_id_of(target_id)?;
        if dragged_id == target_id {
            return Ok(self.reject(dragged_id, RejectReason::SelfTarget));
        }
        if self.section_is_inside(&dest, dragged_id) {
            return Ok(self.reject(dragged_id, RejectReason::IntoOwnSubtree));
        }

        let before = self.snapshot();
        let (dragged_row, dragged_column) = self.position(dragged_id)?;
        let (target_row, target_column) = self.position(target_id)?;
        if source != dest {
            self.doc.relocate_field(dragged_id, &dest)?;
            self.ensure_unique_name(dragged_id, &dest)?;
        }

        let mut fields = self.doc.section_fields_cloned(&dest)?;
        let dragged = position_of(&fields, dragged_id)?;
        let other = position_of(&fields, target_id)?;
        fields[dragged].grid_row = target_row;
        fields[dragged].grid_column = target_column;
        fields[other].grid_row = dragged_row;
        fields[other].grid_column = dragged_column;
        fit_row(&mut fields[dragged]);
        fit_row(&mut fields[other]);

        resolve_overlaps(&mut fields, &[dragged, other], Some(dragged));
        compact_rows(&mut fields);
        self.doc.write_layout(&dest, &fields)?;
        if source != dest {
            self.compact_section(&source)?;
        }
        self.commit(before);

        tracing::debug!("Swapped field {} with field {}", dragged_id, target_id);
        Ok(MoveOutcome::Swapped {
            with: target_id.to_string(),
        })
    }

    fn place_field(
        &mut self,
        dragged_id: &str,
        section_id: &str,
        row: u32,
        column: u32,
    ) -> Result<MoveOutcome, FormError> {
        let source = self.section_id_of(dragged_id)?;
        if self.doc.section(section_id).is_none() {
            return Err(FormError::section_not_found(section_id));
        }
        let span = self
            .doc
            .field(dragged_id)
            .map(layout_span)
            .ok_or_else(|| FormError::field_not_found(dragged_id))?;
        if row < 1 || column < 1 || column + span - 1 > GRID_COLUMNS {
            return Ok(self.reject(dragged_id, RejectReason::Overflow));
        }
        if self.section_is_inside(section_id, dragged_id) {
            return Ok(self.reject(dragged_id, RejectReason::IntoOwnSubtree));
        }

        let before = self.snapshot();
        if source != section_id {
            self.doc.relocate_field(dragged_id, section_id)?;
            self.ensure_unique_name(dragged_id, section_id)?;
        }

        let mut fields = self.doc.section_fields_cloned(section_id)?;
        let index = position_of(&fields, dragged_id)?;
        fields[index].grid_row = row;
        fields[index].grid_column = column;
        let shifted = resolve_overlaps(&mut fields, &[index], Some(index));
        compact_rows(&mut fields);
        let placement = Placement::of(&fields[position_of(&fields, dragged_id)?]);
        self.doc.write_layout(section_id, &fields)?;
        if source != section_id {
            self.compact_section(&source)?;
        }
        self.commit(before);

        tracing::debug!(
            "Moved field {} to section {} row {}, column {} ({} shifts)",
            dragged_id,
            section_id,
            placement.row,
            placement.column,
            shifted
        );
        Ok(MoveOutcome::Placed { placement, shifted })
    }

    /// Removes a field with its nested content and compacts the rows of
    /// its section.
    ///
    /// # Returns
    /// The removed field tree.
    pub fn delete_field(&mut self, field_id: &str) -> Result<FieldDefinition, FormError> {
        self.settle_gesture(None);
        let section_id = self.section_id_of(field_id)?;
        let before = self.snapshot();
        let removed = self.doc.remove_field(field_id)?;
        self.compact_section(&section_id)?;
        self.commit(before);

        tracing::debug!("Deleted field {} from section {}", field_id, section_id);
        Ok(removed)
    }

    /// Duplicates a field right after the original and reflows its section.
    ///
    /// Returns `Ok(None)` without touching the document while a previous
    /// duplicate on the same section is inside its busy window.
    pub fn duplicate_field(&mut self, field_id: &str) -> Result<Option<String>, FormError> {
        self.duplicate_field_at(field_id, Instant::now())
    }

    /// [`LayoutEngine::duplicate_field`] with an explicit clock reading.
    pub fn duplicate_field_at(
        &mut self,
        field_id: &str,
        now: Instant,
    ) -> Result<Option<String>, FormError> {
        self.settle_gesture(None);
        let section_id = self.section_id_of(field_id)?;
        if let Some(busy_until) = self.duplicate_busy.get(&section_id) {
            if now < *busy_until {
                tracing::warn!(
                    "Ignoring duplicate of field {}: section {} is still busy",
                    field_id,
                    section_id
                );
                return Ok(None);
            }
        }

        let original = self
            .doc
            .export_field(field_id)
            .ok_or_else(|| FormError::field_not_found(field_id))?;
        let siblings = self.doc.section_fields_cloned(&section_id)?;
        let index = position_of(&siblings, field_id)?;

        let mut copy = original.clone();
        regenerate_ids(&mut copy);
        copy.label = copy_label(&original.label, siblings.iter().map(|f| f.label.as_str()));
        copy.name = copy_name(&original.name, siblings.iter().map(|f| f.name.as_str()));

        let before = self.snapshot();
        let id = self.doc.insert_field(&section_id, index + 1, &copy)?;
        let mut fields = self.doc.section_fields_cloned(&section_id)?;
        reflow(&mut fields);
        self.doc.write_layout(&section_id, &fields)?;
        self.commit(before);
        self.duplicate_busy
            .insert(section_id.clone(), now + self.config.duplicate_guard());

        tracing::debug!(
            "Duplicated field {} as {} ({}) in section {}",
            field_id,
            id,
            copy.name,
            section_id
        );
        Ok(Some(id))
    }

    /// Replaces a field's properties with an edited copy.
    ///
    /// The field keeps its section and list position. Rules that do not
    /// apply to the (possibly new) type are dropped, the position is pulled
    /// back onto the grid and overlapped siblings are pushed away.
    ///
    /// # Errors
    /// `DuplicateFieldName` when a sibling already uses `def.name`.
    pub fn commit_field(&mut self, def: &FieldDefinition) -> Result<(), FormError> {
        self.settle_gesture(None);
        let section_id = self.section_id_of(&def.id)?;
        let clash = self
            .doc
            .section_fields(&section_id)?
            .iter()
            .any(|f| f.id != def.id && f.name == def.name);
        if clash {
            return Err(FormError::DuplicateFieldName {
                section: section_id,
                name: def.name.clone(),
            });
        }

        let mut def = def.clone();
        def.validation.retain_applicable(def.field_type);
        if !def.field_type.has_options() {
            def.options.clear();
        }

        let before = self.snapshot();
        self.doc.replace_field(&def)?;
        let mut fields = self.doc.section_fields_cloned(&section_id)?;
        let index = position_of(&fields, &def.id)?;
        fit_row(&mut fields[index]);
        resolve_overlaps(&mut fields, &[index], Some(index));
        compact_rows(&mut fields);
        self.doc.write_layout(&section_id, &fields)?;
        self.commit(before);

        tracing::debug!("Saved field {} ({})", def.id, def.name);
        Ok(())
    }

    /// Replaces a page's editable properties.
    pub fn commit_page(&mut self, page_id: &str, props: &PageProps) -> Result<(), FormError> {
        self.settle_gesture(None);
        if self.doc.page(page_id).is_none() {
            return Err(FormError::page_not_found(page_id));
        }
        let before = self.snapshot();
        self.doc.set_page_props(page_id, props)?;
        self.commit(before);
        tracing::debug!("Saved page {}", page_id);
        Ok(())
    }

    /// Replaces a section's editable properties.
    pub fn commit_section(
        &mut self,
        section_id: &str,
        props: &SectionProps,
    ) -> Result<(), FormError> {
        self.settle_gesture(None);
        if self.doc.section(section_id).is_none() {
            return Err(FormError::section_not_found(section_id));
        }
        let before = self.snapshot();
        self.doc.set_section_props(section_id, props)?;
        self.commit(before);
        tracing::debug!("Saved section {}", section_id);
        Ok(())
    }

    /// Applies `edit` to the form-level properties as one undo step.
    pub fn update_meta(&mut self, edit: impl FnOnce(&mut FormMeta)) {
        self.settle_gesture(None);
        let before = self.snapshot();
        edit(self.doc.meta_mut());
        self.commit(before);
    }

    pub fn add_page(&mut self, title: impl Into<String>) -> String {
        self.settle_gesture(None);
        let before = self.snapshot();
        let id = self.doc.add_page(title);
        self.commit(before);
        tracing::debug!("Added page {}", id);
        id
    }

    pub fn add_section(
        &mut self,
        page_id: &str,
        title: impl Into<String>,
    ) -> Result<String, FormError> {
        self.settle_gesture(None);
        if self.doc.page(page_id).is_none() {
            return Err(FormError::page_not_found(page_id));
        }
        let before = self.snapshot();
        let id = self.doc.add_section(page_id, title)?;
        self.commit(before);
        tracing::debug!("Added section {} to page {}", id, page_id);
        Ok(id)
    }

    pub fn remove_page(&mut self, page_id: &str) -> Result<(), FormError> {
        self.settle_gesture(None);
        if self.doc.page(page_id).is_none() {
            return Err(FormError::page_not_found(page_id));
        }
        let before = self.snapshot();
        self.doc.remove_page(page_id)?;
        self.commit(before);
        tracing::debug!("Removed page {}", page_id);
        Ok(())
    }

    pub fn remove_section(&mut self, section_id: &str) -> Result<(), FormError> {
        self.settle_gesture(None);
        if self.doc.section(section_id).is_none() {
            return Err(FormError::section_not_found(section_id));
        }
        let before = self.snapshot();
        self.doc.remove_section(section_id)?;
        self.commit(before);
        tracing::debug!("Removed section {}", section_id);
        Ok(())
    }

    /// Remembers the current document as the state to restore if the
    /// upcoming gesture is aborted. No-op while a gesture is active.
    pub fn begin_gesture(&mut self) {
        if self.gesture_snapshot.is_none() {
            self.gesture_snapshot = Some(GestureSnapshot {
                doc: self.doc.clone(),
                live_field: None,
            });
        }
    }

    /// Restores the document as it was before the active gesture.
    ///
    /// Returns `false` when no gesture was active.
    pub fn abort_gesture(&mut self) -> bool {
        match self.gesture_snapshot.take() {
            Some(snapshot) => {
                self.doc = snapshot.doc;
                tracing::debug!("Gesture aborted, layout restored");
                true
            }
            None => false,
        }
    }

    pub fn gesture_active(&self) -> bool {
        self.gesture_snapshot.is_some()
    }

    /// Reverts the last committed operation.
    pub fn undo(&mut self) -> bool {
        self.abort_gesture();
        let done = self.history.undo(&mut self.doc);
        if done {
            tracing::debug!("Undo");
        }
        done
    }

    /// Re-applies the last undone operation.
    pub fn redo(&mut self) -> bool {
        self.abort_gesture();
        let done = self.history.redo(&mut self.doc);
        if done {
            tracing::debug!("Redo");
        }
        done
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// State to record for the operation about to run.
    ///
    /// Consumes the gesture snapshot so a gesture's live updates and its
    /// final commit form a single undo step.
    fn snapshot(&mut self) -> FormDocument {
        self.gesture_snapshot
            .take()
            .map(|snapshot| snapshot.doc)
            .unwrap_or_else(|| self.doc.clone())
    }

    /// Restores the layout of a resize gesture that was abandoned without
    /// being ended or cancelled.
    ///
    /// `own_field` is the field whose committed resize closes the gesture;
    /// its live frames are kept. A gesture without live frames changed
    /// nothing and is left for its own commit.
    fn settle_gesture(&mut self, own_field: Option<&str>) {
        let abandoned = match &self.gesture_snapshot {
            Some(GestureSnapshot {
                live_field: Some(id),
                ..
            }) => own_field != Some(id.as_str()),
            _ => false,
        };
        if !abandoned {
            return;
        }
        if let Some(snapshot) = self.gesture_snapshot.take() {
            tracing::debug!(
                "Restoring layout left by abandoned resize of field {}",
                snapshot.live_field.as_deref().unwrap_or_default()
            );
            self.doc = snapshot.doc;
        }
    }

    fn commit(&mut self, before: FormDocument) {
        if before != self.doc {
            self.history.record(before);
        }
    }

    fn reject(&self, field_id: &str, reason: RejectReason) -> MoveOutcome {
        tracing::warn!("Rejected move of field {}: {:?}", field_id, reason);
        MoveOutcome::Rejected(reason)
    }

    fn section_id_of(&self, field_id: &str) -> Result<String, FormError> {
        self.doc
            .section_of(field_id)
            .map(str::to_string)
            .ok_or_else(|| FormError::field_not_found(field_id))
    }

    fn position(&self, field_id: &str) -> Result<(u32, u32), FormError> {
        self.doc
            .field(field_id)
            .map(|f| (f.grid_row, f.grid_column))
            .ok_or_else(|| FormError::field_not_found(field_id))
    }

    fn compact_section(&mut self, section_id: &str) -> Result<bool, FormError> {
        let mut fields = self.doc.section_fields_cloned(section_id)?;
        let changed = compact_rows(&mut fields);
        if changed {
            self.doc.write_layout(section_id, &fields)?;
        }
        Ok(changed)
    }

    /// Renames `field_id` with a copy suffix if a sibling in `section_id`
    /// already uses its name.
    fn ensure_unique_name(&mut self, field_id: &str, section_id: &str) -> Result<(), FormError> {
        let siblings = self.doc.section_fields_cloned(section_id)?;
        let name = match siblings.iter().find(|f| f.id == field_id) {
            Some(field) => field.name.clone(),
            None => return Err(FormError::field_not_found(field_id)),
        };
        if !siblings.iter().any(|f| f.id != field_id && f.name == name) {
            return Ok(());
        }

        let renamed = copy_name(&name, siblings.iter().map(|f| f.name.as_str()));
        tracing::debug!("Renamed moved field {} from {} to {}", field_id, name, renamed);
        if let Some(field) = self.doc.field_mut(field_id) {
            field.name = renamed;
        }
        Ok(())
    }

    /// Returns `true` when `section_id` lies inside the nested content of
    /// `field_id`.
    fn section_is_inside(&self, section_id: &str, field_id: &str) -> bool {
        let mut current = section_id.to_string();
        loop {
            let section = match self.doc.section(&current) {
                Some(section) => section,
                None => return false,
            };
            let owner = match &section.parent {
                SectionParent::Field(owner) => Some(owner.clone()),
                SectionParent::Page(page_id) => {
                    self.doc.page(page_id).and_then(|page| page.parent.clone())
                }
            };
            match owner {
                Some(owner) if owner == field_id => return true,
                Some(owner) => match self.doc.section_of(&owner) {
                    Some(parent) => current = parent.to_string(),
                    None => return false,
                },
                None => return false,
            }
        }
    }
}

fn position_of(fields: &[FieldDefinition], field_id: &str) -> Result<usize, FormError> {
    fields
        .iter()
        .position(|f| f.id == field_id)
        .ok_or_else(|| FormError::field_not_found(field_id))
}

/// Pulls a field back onto the grid without changing its span.
fn fit_row(field: &mut FieldDefinition) {
    let max_start = GRID_COLUMNS - layout_span(field) + 1;
    field.grid_row = field.grid_row.max(1);
    field.grid_column = field.grid_column.clamp(1, max_start);
}

fn regenerate_ids(field: &mut FieldDefinition) {
    field.id = new_id("field");
    if let Some(section) = field.section.as_mut() {
        regenerate_section_ids(section);
    }
    for page in &mut field.tabs {
        page.id = new_id("page");
        for section in &mut page.sections {
            regenerate_section_ids(section);
        }
    }
}

fn regenerate_section_ids(section: &mut SectionDefinition) {
    section.id = new_id("section");
    for field in &mut section.fields {
        regenerate_ids(field);
    }
}
