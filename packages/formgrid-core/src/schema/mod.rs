//! Serializable form tree: pages, sections and fields.
//!
//! This is the interchange shape handed to and received from external
//! collaborators. Authoring operations work on [`crate::FormDocument`],
//! which is built from and exported back to this tree.

mod field;
mod form;
mod span;
pub mod validation;

pub use field::{DependsOn, FieldDefinition, FieldOption, FieldType, ValidationRules};
pub use form::{
    AddPosition, FormDefinition, FormSettings, PageDefinition, RepeaterConfig, SectionDefinition,
    SectionKind,
};
pub use span::{Breakpoint, ColumnSpan, DEFAULT_FIELD_SPAN, GRID_COLUMNS};
