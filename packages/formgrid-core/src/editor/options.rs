//! Index-addressed option list of a staged choice field.

use crate::error::FormError;
use crate::schema::{FieldDefinition, FieldOption};

use super::NodeEditor;

fn require_options(field: &FieldDefinition) -> Result<(), FormError> {
    if field.field_type.has_options() {
        Ok(())
    } else {
        Err(FormError::NotApplicable {
            setting: "options",
            field_type: field.field_type.to_string(),
        })
    }
}

fn out_of_range(index: usize, len: usize) -> FormError {
    FormError::EditorState(format!(
        "option index {} out of range for {} options",
        index, len
    ))
}

impl NodeEditor {
    /// Options of the staged field, in display order.
    pub fn options(&self) -> Result<&[FieldOption], FormError> {
        let field = self.staged_field()?;
        require_options(field)?;
        Ok(&field.options)
    }

    /// Appends an option and returns its index.
    pub fn add_option(&mut self, option: FieldOption) -> Result<usize, FormError> {
        let field = self.staged_field_mut()?;
        require_options(field)?;
        field.options.push(option);
        Ok(field.options.len() - 1)
    }

    /// Replaces the option at `index` in place.
    pub fn update_option(&mut self, index: usize, option: FieldOption) -> Result<(), FormError> {
        let field = self.staged_field_mut()?;
        require_options(field)?;
        let len = field.options.len();
        let slot = field
            .options
            .get_mut(index)
            .ok_or_else(|| out_of_range(index, len))?;
        *slot = option;
        Ok(())
    }

    /// Removes and returns the option at `index`.
    pub fn remove_option(&mut self, index: usize) -> Result<FieldOption, FormError> {
        let field = self.staged_field_mut()?;
        require_options(field)?;
        if index >= field.options.len() {
            return Err(out_of_range(index, field.options.len()));
        }
        Ok(field.options.remove(index))
    }
}
