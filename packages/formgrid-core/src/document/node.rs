//! Arena node types.

use crate::schema::{FieldDefinition, RepeaterConfig, SectionKind};

/// Page node with ordered section ids.
#[derive(Debug, Clone, PartialEq)]
pub struct PageNode {
    pub id: String,
    pub title: String,
    pub sections: Vec<String>,
    /// Owning `tab` field for nested pages
    pub parent: Option<String>,
}

/// Owner of a section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SectionParent {
    Page(String),
    Field(String),
}

/// Section node with ordered field ids.
#[derive(Debug, Clone, PartialEq)]
pub struct SectionNode {
    pub id: String,
    pub title: String,
    pub description: String,
    pub kind: SectionKind,
    pub repeater_config: Option<RepeaterConfig>,
    pub fields: Vec<String>,
    pub parent: SectionParent,
}

/// Children hanging off a container field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Nested {
    None,
    Section(String),
    Tabs(Vec<String>),
}

/// Field node.
///
/// `def` never carries nested sections or tabs; those live in the arena
/// and are referenced through `nested`.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldNode {
    pub def: FieldDefinition,
    pub section: String,
    pub nested: Nested,
}

/// Editable page properties.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageProps {
    pub title: String,
}

/// Editable section properties.
#[derive(Debug, Clone, PartialEq)]
pub struct SectionProps {
    pub title: String,
    pub description: String,
    pub kind: SectionKind,
    pub repeater_config: Option<RepeaterConfig>,
}
