//! Field definitions.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::form::{PageDefinition, SectionDefinition};
use super::span::{ColumnSpan, DEFAULT_FIELD_SPAN};

/// Closed set of field types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    Text,
    Email,
    Number,
    Tel,
    Date,
    Textarea,
    Select,
    Checkbox,
    Radio,
    CheckboxGroup,
    RadioGroup,
    Info,
    Section,
    Tab,
}

impl FieldType {
    /// Every field type, in picker order.
    pub const ALL: [FieldType; 14] = [
        FieldType::Text,
        FieldType::Email,
        FieldType::Number,
        FieldType::Tel,
        FieldType::Date,
        FieldType::Textarea,
        FieldType::Select,
        FieldType::Checkbox,
        FieldType::Radio,
        FieldType::CheckboxGroup,
        FieldType::RadioGroup,
        FieldType::Info,
        FieldType::Section,
        FieldType::Tab,
    ];

    /// Wire name of the type.
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::Text => "text",
            FieldType::Email => "email",
            FieldType::Number => "number",
            FieldType::Tel => "tel",
            FieldType::Date => "date",
            FieldType::Textarea => "textarea",
            FieldType::Select => "select",
            FieldType::Checkbox => "checkbox",
            FieldType::Radio => "radio",
            FieldType::CheckboxGroup => "checkbox_group",
            FieldType::RadioGroup => "radio_group",
            FieldType::Info => "info",
            FieldType::Section => "section",
            FieldType::Tab => "tab",
        }
    }

    /// Human readable name used for default labels.
    pub fn display_name(&self) -> &'static str {
        match self {
            FieldType::Text => "Text",
            FieldType::Email => "Email",
            FieldType::Number => "Number",
            FieldType::Tel => "Phone",
            FieldType::Date => "Date",
            FieldType::Textarea => "Paragraph",
            FieldType::Select => "Dropdown",
            FieldType::Checkbox => "Checkbox",
            FieldType::Radio => "Radio",
            FieldType::CheckboxGroup => "Checkbox Group",
            FieldType::RadioGroup => "Radio Group",
            FieldType::Info => "Info",
            FieldType::Section => "Section",
            FieldType::Tab => "Tabs",
        }
    }

    /// Returns `true` for types that nest a section or tab pages.
    pub fn is_container(&self) -> bool {
        matches!(self, FieldType::Section | FieldType::Tab)
    }

    /// Returns `true` for types that collect an answer.
    pub fn is_input(&self) -> bool {
        !matches!(self, FieldType::Info | FieldType::Section | FieldType::Tab)
    }

    /// Returns `true` for types backed by an option list.
    pub fn has_options(&self) -> bool {
        matches!(
            self,
            FieldType::Select | FieldType::Radio | FieldType::CheckboxGroup | FieldType::RadioGroup
        )
    }

    /// Returns `true` for free-text input types.
    pub fn is_text_like(&self) -> bool {
        matches!(
            self,
            FieldType::Text | FieldType::Email | FieldType::Tel | FieldType::Textarea
        )
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry of a choice field.
///
/// Accepts either a bare string (used as both value and label) or a
/// `{value, label}` object; always serializes as the object form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawOption")]
pub struct FieldOption {
    pub value: String,
    pub label: String,
}

impl FieldOption {
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawOption {
    Bare(String),
    Pair {
        value: String,
        #[serde(default)]
        label: Option<String>,
    },
}

impl From<RawOption> for FieldOption {
    fn from(raw: RawOption) -> Self {
        match raw {
            RawOption::Bare(value) => FieldOption {
                label: value.clone(),
                value,
            },
            RawOption::Pair { value, label } => FieldOption {
                label: label.unwrap_or_else(|| value.clone()),
                value,
            },
        }
    }
}

/// Per-field validation rules.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationRules {
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    /// Message shown instead of the rule's default message
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
}

impl ValidationRules {
    /// Returns `true` when no rule is configured.
    pub fn is_empty(&self) -> bool {
        *self == ValidationRules::default()
    }

    /// Drops rules that do not apply to `field_type`.
    pub fn retain_applicable(&mut self, field_type: FieldType) {
        if !field_type.is_text_like() {
            self.min_length = None;
            self.max_length = None;
            self.pattern = None;
        }
        if field_type != FieldType::Number {
            self.min = None;
            self.max = None;
        }
        if !field_type.is_input() {
            self.required = false;
            self.message = None;
        }
    }
}

/// Conditional visibility rule.
///
/// The owning field is shown only while the answer stored under `field`
/// in the same scope equals `value`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DependsOn {
    pub field: String,
    pub value: serde_json::Value,
}

/// A field placed on a section's grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDefinition {
    pub id: String,
    /// Answer-map key, unique within the enclosing section
    pub name: String,
    #[serde(default)]
    pub label: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<FieldOption>,
    #[serde(default, skip_serializing_if = "ValidationRules::is_empty")]
    pub validation: ValidationRules,
    #[serde(default)]
    pub column_span: ColumnSpan,
    /// 1-based row, `0` until placed
    #[serde(default)]
    pub grid_row: u32,
    /// 1-based start column, `0` until placed
    #[serde(default)]
    pub grid_column: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub depends_on: Option<DependsOn>,
    /// Nested section of a `section` field
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section: Option<Box<SectionDefinition>>,
    /// Nested pages of a `tab` field
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tabs: Vec<PageDefinition>,
}

impl FieldDefinition {
    /// Creates an unplaced field with the default span.
    pub fn new(id: impl Into<String>, name: impl Into<String>, field_type: FieldType) -> Self {
        let name = name.into();
        Self {
            id: id.into(),
            label: name.clone(),
            name,
            field_type,
            required: false,
            placeholder: None,
            hint: None,
            options: Vec::new(),
            validation: ValidationRules::default(),
            column_span: ColumnSpan::Fixed(DEFAULT_FIELD_SPAN),
            grid_row: 0,
            grid_column: 0,
            depends_on: None,
            section: None,
            tabs: Vec::new(),
        }
    }

    /// Sets the label.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Places the field at `(row, column)`.
    pub fn at(mut self, row: u32, column: u32) -> Self {
        self.grid_row = row;
        self.grid_column = column;
        self
    }

    /// Sets a fixed column span.
    pub fn spanning(mut self, span: u32) -> Self {
        self.column_span = ColumnSpan::Fixed(span);
        self
    }

    /// Marks the field as required.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Makes the field conditional on another answer.
    pub fn depends_on(mut self, field: impl Into<String>, value: serde_json::Value) -> Self {
        self.depends_on = Some(DependsOn {
            field: field.into(),
            value,
        });
        self
    }

    /// Returns `true` once the field has grid coordinates.
    pub fn is_placed(&self) -> bool {
        self.grid_row >= 1 && self.grid_column >= 1
    }

    /// Effective required flag, combining the field flag and its rules.
    pub fn is_required(&self) -> bool {
        self.required || self.validation.required
    }
}
