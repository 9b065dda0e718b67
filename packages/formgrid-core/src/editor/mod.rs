//! Staged configuration editor for a single page, section or field.
//!
//! The editor works on a private copy of the target node. Nothing reaches
//! the document until [`NodeEditor::save`]; closing or switching target
//! with unsaved edits asks for confirmation first.

mod knobs;
mod options;
mod picker;

use crate::document::{PageProps, SectionProps};
use crate::error::FormError;
use crate::grid::LayoutEngine;
use crate::schema::FieldDefinition;

pub use knobs::ValidationKnob;
pub use picker::FieldTypePicker;

/// Node addressed by the editor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeRef {
    Page(String),
    Section(String),
    Field(String),
}

/// Staged copy of a node's editable properties.
#[derive(Debug, Clone, PartialEq)]
pub enum StagedNode {
    Page(PageProps),
    Section(SectionProps),
    Field(FieldDefinition),
}

/// Result of an editor request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorOutcome {
    Opened,
    Closed,
    Saved,
    /// Unsaved edits exist; answer with `confirm_discard` or `keep_editing`
    ConfirmDiscard,
    Unchanged,
}

#[derive(Debug, Clone)]
struct StagedEdit {
    target: NodeRef,
    original: StagedNode,
    staged: StagedNode,
}

#[derive(Debug, Clone)]
enum PendingDiscard {
    Close,
    Open(NodeRef),
}

/// Editor holding at most one staged node.
#[derive(Debug, Default)]
pub struct NodeEditor {
    edit: Option<StagedEdit>,
    pending: Option<PendingDiscard>,
}

impl NodeEditor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_open(&self) -> bool {
        self.edit.is_some()
    }

    pub fn target(&self) -> Option<&NodeRef> {
        self.edit.as_ref().map(|edit| &edit.target)
    }

    pub fn staged(&self) -> Option<&StagedNode> {
        self.edit.as_ref().map(|edit| &edit.staged)
    }

    /// Returns `true` when the staged copy differs from the node as opened.
    pub fn is_dirty(&self) -> bool {
        self.edit
            .as_ref()
            .map(|edit| edit.staged != edit.original)
            .unwrap_or(false)
    }

    /// Returns `true` while a discard confirmation is outstanding.
    pub fn awaiting_confirmation(&self) -> bool {
        self.pending.is_some()
    }

    /// Opens `target` for editing.
    ///
    /// # Returns
    /// `Opened`, `Unchanged` when `target` is already open, or
    /// `ConfirmDiscard` when another node has unsaved edits.
    pub fn open(&mut self, engine: &LayoutEngine, target: NodeRef) -> Result<EditorOutcome, FormError> {
        if self.target() == Some(&target) {
            return Ok(EditorOutcome::Unchanged);
        }
        if self.is_dirty() {
            self.pending = Some(PendingDiscard::Open(target));
            return Ok(EditorOutcome::ConfirmDiscard);
        }
        self.load(engine, target)?;
        Ok(EditorOutcome::Opened)
    }

    /// Closes the editor, asking for confirmation if edits are staged.
    pub fn close(&mut self) -> EditorOutcome {
        if self.edit.is_none() {
            return EditorOutcome::Unchanged;
        }
        if self.is_dirty() {
            self.pending = Some(PendingDiscard::Close);
            return EditorOutcome::ConfirmDiscard;
        }
        self.edit = None;
        EditorOutcome::Closed
    }

    /// Drops the staged edits and carries out the request that asked for
    /// confirmation.
    pub fn confirm_discard(&mut self, engine: &LayoutEngine) -> Result<EditorOutcome, FormError> {
        let pending = self
            .pending
            .take()
            .ok_or_else(|| FormError::EditorState("no discard to confirm".to_string()))?;
        tracing::debug!("Discarding staged edits of {:?}", self.target());
        self.edit = None;
        match pending {
            PendingDiscard::Close => Ok(EditorOutcome::Closed),
            PendingDiscard::Open(target) => {
                self.load(engine, target)?;
                Ok(EditorOutcome::Opened)
            }
        }
    }

    /// Declines the discard and keeps the staged edits.
    pub fn keep_editing(&mut self) -> EditorOutcome {
        self.pending = None;
        EditorOutcome::Unchanged
    }

    /// Commits the staged copy and closes the editor.
    ///
    /// Position, span and name changes made by the layout engine while the
    /// node was open are kept unless the staged copy changed them too. On
    /// failure the staged copy is kept so it can be corrected.
    ///
    /// # Arguments
    /// * `engine` - Engine owning the document to update
    ///
    /// # Returns
    /// `Result<EditorOutcome, FormError>`: `Saved`, or `Unchanged` when
    /// there was nothing to commit.
    pub fn save(&mut self, engine: &mut LayoutEngine) -> Result<EditorOutcome, FormError> {
        let edit = self
            .edit
            .as_ref()
            .ok_or_else(|| FormError::EditorState("no node is open".to_string()))?;

        if edit.staged == edit.original {
            self.edit = None;
            self.pending = None;
            return Ok(EditorOutcome::Unchanged);
        }

        match (&edit.target, &edit.staged) {
            (NodeRef::Page(id), StagedNode::Page(props)) => engine.commit_page(id, props)?,
            (NodeRef::Section(id), StagedNode::Section(props)) => engine.commit_section(id, props)?,
            (NodeRef::Field(id), StagedNode::Field(def)) => {
                let mut def = def.clone();
                if let (StagedNode::Field(original), Some(current)) =
                    (&edit.original, engine.document().field(id))
                {
                    keep_layout_changes(&mut def, original, current);
                }
                engine.commit_field(&def)?
            }
            (target, _) => {
                return Err(FormError::EditorState(format!(
                    "staged copy does not match {:?}",
                    target
                )))
            }
        }

        tracing::debug!("Saved staged edits of {:?}", edit.target);
        self.edit = None;
        self.pending = None;
        Ok(EditorOutcome::Saved)
    }

    /// Applies `change` to a staged page.
    pub fn edit_page(&mut self, change: impl FnOnce(&mut PageProps)) -> Result<(), FormError> {
        match self.staged_mut()? {
            StagedNode::Page(props) => {
                change(props);
                Ok(())
            }
            _ => Err(FormError::EditorState("staged node is not a page".to_string())),
        }
    }

    /// Applies `change` to a staged section.
    pub fn edit_section(&mut self, change: impl FnOnce(&mut SectionProps)) -> Result<(), FormError> {
        match self.staged_mut()? {
            StagedNode::Section(props) => {
                change(props);
                Ok(())
            }
            _ => Err(FormError::EditorState("staged node is not a section".to_string())),
        }
    }

    /// Applies `change` to a staged field.
    pub fn edit_field(&mut self, change: impl FnOnce(&mut FieldDefinition)) -> Result<(), FormError> {
        let field = self.staged_field_mut()?;
        change(field);
        Ok(())
    }

    fn load(&mut self, engine: &LayoutEngine, target: NodeRef) -> Result<(), FormError> {
        let doc = engine.document();
        let node = match &target {
            NodeRef::Page(id) => doc
                .page_props(id)
                .map(StagedNode::Page)
                .ok_or_else(|| FormError::page_not_found(id))?,
            NodeRef::Section(id) => doc
                .section_props(id)
                .map(StagedNode::Section)
                .ok_or_else(|| FormError::section_not_found(id))?,
            NodeRef::Field(id) => doc
                .field(id)
                .cloned()
                .map(StagedNode::Field)
                .ok_or_else(|| FormError::field_not_found(id))?,
        };
        tracing::debug!("Opened {:?} for editing", target);
        self.edit = Some(StagedEdit {
            target,
            original: node.clone(),
            staged: node,
        });
        self.pending = None;
        Ok(())
    }

    fn staged_mut(&mut self) -> Result<&mut StagedNode, FormError> {
        self.edit
            .as_mut()
            .map(|edit| &mut edit.staged)
            .ok_or_else(|| FormError::EditorState("no node is open".to_string()))
    }

    fn staged_field(&self) -> Result<&FieldDefinition, FormError> {
        match self.staged() {
            Some(StagedNode::Field(field)) => Ok(field),
            Some(_) => Err(FormError::EditorState("staged node is not a field".to_string())),
            None => Err(FormError::EditorState("no node is open".to_string())),
        }
    }

    fn staged_field_mut(&mut self) -> Result<&mut FieldDefinition, FormError> {
        match self.staged_mut()? {
            StagedNode::Field(field) => Ok(field),
            _ => Err(FormError::EditorState("staged node is not a field".to_string())),
        }
    }
}

/// Takes the document's value for every layout property the staged copy
/// left as it was when opened.
fn keep_layout_changes(
    staged: &mut FieldDefinition,
    original: &FieldDefinition,
    current: &FieldDefinition,
) {
    if staged.grid_row == original.grid_row && staged.grid_column == original.grid_column {
        staged.grid_row = current.grid_row;
        staged.grid_column = current.grid_column;
    }
    if staged.column_span == original.column_span {
        staged.column_span = current.column_span;
    }
    if staged.name == original.name {
        staged.name = current.name.clone();
    }
}
