//! Field type picker used before a field exists.

use crate::error::FormError;
use crate::grid::LayoutEngine;
use crate::schema::FieldType;

/// Stages a field type for a section until confirmed or cancelled.
#[derive(Debug, Default)]
pub struct FieldTypePicker {
    section: Option<String>,
    selected: Option<FieldType>,
}

impl FieldTypePicker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Types offered by the picker.
    pub fn choices() -> &'static [FieldType] {
        &FieldType::ALL
    }

    /// Opens the picker for `section_id`, dropping any earlier choice.
    pub fn open(&mut self, section_id: impl Into<String>) {
        self.section = Some(section_id.into());
        self.selected = None;
    }

    pub fn is_open(&self) -> bool {
        self.section.is_some()
    }

    pub fn section(&self) -> Option<&str> {
        self.section.as_deref()
    }

    pub fn selected(&self) -> Option<FieldType> {
        self.selected
    }

    pub fn select(&mut self, field_type: FieldType) -> Result<(), FormError> {
        if self.section.is_none() {
            return Err(FormError::EditorState("field type picker is closed".to_string()));
        }
        self.selected = Some(field_type);
        Ok(())
    }

    /// Adds a field of the selected type and closes the picker.
    ///
    /// # Returns
    /// The new field id, or `None` (picker left open) when no type has
    /// been selected yet.
    pub fn confirm(&mut self, engine: &mut LayoutEngine) -> Result<Option<String>, FormError> {
        let section = self
            .section
            .as_deref()
            .ok_or_else(|| FormError::EditorState("field type picker is closed".to_string()))?;
        let field_type = match self.selected {
            Some(field_type) => field_type,
            None => return Ok(None),
        };

        let id = engine.add_field(section, field_type)?;
        self.cancel();
        Ok(Some(id))
    }

    /// Closes the picker without touching the document.
    pub fn cancel(&mut self) {
        self.section = None;
        self.selected = None;
    }
}
