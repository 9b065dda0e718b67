//! Form engine error types.

use std::fmt;

use thiserror::Error;

/// Kind of schema node addressed by an id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Page,
    Section,
    Field,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeKind::Page => f.write_str("Page"),
            NodeKind::Section => f.write_str("Section"),
            NodeKind::Field => f.write_str("Field"),
        }
    }
}

/// Form authoring and runtime errors.
///
/// Layout violations and naming collisions produced by interactive
/// operations are repaired inside the layout engine and never show up
/// here; `InvalidLayout` is only reported when checking a stored tree.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FormError {
    /// Node id not present in the document
    #[error("{kind} '{id}' not found")]
    NodeNotFound { kind: NodeKind, id: String },

    /// Node id used more than once in one form
    #[error("Duplicate {kind} id '{id}'")]
    DuplicateId { kind: NodeKind, id: String },

    /// Field name already used by a sibling field
    #[error("Field name '{name}' already exists in section '{section}'")]
    DuplicateFieldName { section: String, name: String },

    /// Stored layout breaks a grid invariant
    #[error("Invalid layout in section '{section}': {reason}")]
    InvalidLayout { section: String, reason: String },

    /// Schema could not be parsed
    #[error("Parse error: {0}")]
    Parse(String),

    /// I/O error while reading or writing a form file
    #[error("I/O error: {0}")]
    Io(String),

    /// Editor operation issued in the wrong state
    #[error("Editor state error: {0}")]
    EditorState(String),

    /// Setting not offered for the field's current type
    #[error("'{setting}' does not apply to {field_type} fields")]
    NotApplicable {
        setting: &'static str,
        field_type: String,
    },

    /// Mutation attempted on a view-only session
    #[error("Form is read-only")]
    ReadOnly,

    /// An external operation is still in flight
    #[error("Another operation is in progress")]
    Busy,

    /// Submit requested away from the last page
    #[error("Submit is only available on the last page")]
    NotOnLastPage,

    /// Draft saving requested without a draft collaborator
    #[error("Drafts are not enabled for this form")]
    DraftsDisabled,

    /// Submit or draft collaborator rejected
    #[error("External operation failed: {0}")]
    ExternalOperation(String),
}

impl FormError {
    pub(crate) fn page_not_found(id: &str) -> Self {
        FormError::NodeNotFound {
            kind: NodeKind::Page,
            id: id.to_string(),
        }
    }

    pub(crate) fn section_not_found(id: &str) -> Self {
        FormError::NodeNotFound {
            kind: NodeKind::Section,
            id: id.to_string(),
        }
    }

    pub(crate) fn field_not_found(id: &str) -> Self {
        FormError::NodeNotFound {
            kind: NodeKind::Field,
            id: id.to_string(),
        }
    }
}
