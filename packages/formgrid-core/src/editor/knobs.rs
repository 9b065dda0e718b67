//! Type-dependent validation settings of a staged field.

use crate::error::FormError;
use crate::schema::{FieldDefinition, FieldType};

use super::NodeEditor;

/// A validation setting offered by the field editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationKnob {
    MinLength,
    MaxLength,
    Pattern,
    Min,
    Max,
    Message,
}

impl ValidationKnob {
    /// Wire name of the setting.
    pub fn as_str(&self) -> &'static str {
        match self {
            ValidationKnob::MinLength => "minLength",
            ValidationKnob::MaxLength => "maxLength",
            ValidationKnob::Pattern => "pattern",
            ValidationKnob::Min => "min",
            ValidationKnob::Max => "max",
            ValidationKnob::Message => "message",
        }
    }

    /// Settings offered for `field_type`, in display order.
    pub fn applicable(field_type: FieldType) -> Vec<ValidationKnob> {
        let mut knobs = Vec::new();
        if field_type.is_text_like() {
            knobs.extend([
                ValidationKnob::MinLength,
                ValidationKnob::MaxLength,
                ValidationKnob::Pattern,
            ]);
        }
        if field_type == FieldType::Number {
            knobs.extend([ValidationKnob::Min, ValidationKnob::Max]);
        }
        if field_type.is_input() {
            knobs.push(ValidationKnob::Message);
        }
        knobs
    }

    fn require(self, field: &FieldDefinition) -> Result<(), FormError> {
        if ValidationKnob::applicable(field.field_type).contains(&self) {
            Ok(())
        } else {
            Err(FormError::NotApplicable {
                setting: self.as_str(),
                field_type: field.field_type.to_string(),
            })
        }
    }
}

impl NodeEditor {
    /// Validation settings offered for the staged field's current type.
    pub fn validation_knobs(&self) -> Result<Vec<ValidationKnob>, FormError> {
        Ok(ValidationKnob::applicable(self.staged_field()?.field_type))
    }

    /// Sets or clears the length limits of a free-text field.
    pub fn set_length_limits(
        &mut self,
        min_length: Option<usize>,
        max_length: Option<usize>,
    ) -> Result<(), FormError> {
        let field = self.staged_field_mut()?;
        ValidationKnob::MinLength.require(field)?;
        if let (Some(min), Some(max)) = (min_length, max_length) {
            if min > max {
                return Err(FormError::EditorState(format!(
                    "minLength {} is greater than maxLength {}",
                    min, max
                )));
            }
        }
        field.validation.min_length = min_length;
        field.validation.max_length = max_length;
        Ok(())
    }

    /// Sets or clears the numeric bounds of a number field.
    pub fn set_numeric_bounds(&mut self, min: Option<f64>, max: Option<f64>) -> Result<(), FormError> {
        let field = self.staged_field_mut()?;
        ValidationKnob::Min.require(field)?;
        if let (Some(low), Some(high)) = (min, max) {
            if low > high {
                return Err(FormError::EditorState(format!(
                    "min {} is greater than max {}",
                    low, high
                )));
            }
        }
        field.validation.min = min;
        field.validation.max = max;
        Ok(())
    }

    /// Sets or clears the pattern of a free-text field.
    ///
    /// The pattern is stored as written; the runtime skips patterns that
    /// do not compile.
    pub fn set_pattern(&mut self, pattern: Option<String>) -> Result<(), FormError> {
        let field = self.staged_field_mut()?;
        ValidationKnob::Pattern.require(field)?;
        field.validation.pattern = pattern.filter(|p| !p.is_empty());
        Ok(())
    }

    /// Sets or clears the custom error message of an input field.
    pub fn set_message(&mut self, message: Option<String>) -> Result<(), FormError> {
        let field = self.staged_field_mut()?;
        ValidationKnob::Message.require(field)?;
        field.validation.message = message.filter(|m| !m.is_empty());
        Ok(())
    }
}
