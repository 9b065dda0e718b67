//! Id-indexed form document.
//!
//! The recursive form tree is flattened into maps of id → node with
//! parent and ordered child id lists. Lookups and replacements are O(1)
//! and a whole document can be cloned for undo snapshots.

mod history;
mod ids;
mod node;

use std::collections::HashMap;

use crate::error::{FormError, NodeKind};
use crate::schema::{
    FieldDefinition, FieldType, FormDefinition, FormSettings, PageDefinition, SectionDefinition,
};

pub use history::History;
pub use ids::new_id;
pub use node::{FieldNode, Nested, PageNode, PageProps, SectionNode, SectionParent, SectionProps};

/// Form-level properties.
#[derive(Debug, Clone, PartialEq)]
pub struct FormMeta {
    pub id: String,
    pub title: String,
    pub description: String,
    pub settings: FormSettings,
    pub published: bool,
}

/// Flattened, id-indexed form.
#[derive(Debug, Clone, PartialEq)]
pub struct FormDocument {
    meta: FormMeta,
    /// Top-level page order
    root_pages: Vec<String>,
    pages: HashMap<String, PageNode>,
    sections: HashMap<String, SectionNode>,
    fields: HashMap<String, FieldNode>,
}

impl FormDocument {
    /// Creates an empty document.
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            meta: FormMeta {
                id: id.into(),
                title: title.into(),
                description: String::new(),
                settings: FormSettings::default(),
                published: false,
            },
            root_pages: Vec::new(),
            pages: HashMap::new(),
            sections: HashMap::new(),
            fields: HashMap::new(),
        }
    }

    /// Builds a document from a form tree.
    ///
    /// # Arguments
    /// * `form` - Form tree to index
    ///
    /// # Returns
    /// `Result<FormDocument, FormError>`, failing with `DuplicateId` when
    /// two nodes of the same kind share an id.
    pub fn from_definition(form: &FormDefinition) -> Result<Self, FormError> {
        let mut doc = FormDocument::new(form.id.clone(), form.title.clone());
        doc.meta.description = form.description.clone();
        doc.meta.settings = form.settings.clone();
        doc.meta.published = form.published;

        for page in &form.pages {
            let id = doc.import_page(page, None)?;
            doc.root_pages.push(id);
        }
        Ok(doc)
    }

    /// Rebuilds the form tree.
    pub fn to_definition(&self) -> FormDefinition {
        FormDefinition {
            id: self.meta.id.clone(),
            title: self.meta.title.clone(),
            description: self.meta.description.clone(),
            pages: self
                .root_pages
                .iter()
                .filter_map(|id| self.export_page(id))
                .collect(),
            settings: self.meta.settings.clone(),
            published: self.meta.published,
        }
    }

    pub fn meta(&self) -> &FormMeta {
        &self.meta
    }

    pub fn meta_mut(&mut self) -> &mut FormMeta {
        &mut self.meta
    }

    /// Top-level page ids in order.
    pub fn page_ids(&self) -> &[String] {
        &self.root_pages
    }

    pub fn page(&self, id: &str) -> Option<&PageNode> {
        self.pages.get(id)
    }

    pub fn section(&self, id: &str) -> Option<&SectionNode> {
        self.sections.get(id)
    }

    pub fn field(&self, id: &str) -> Option<&FieldDefinition> {
        self.fields.get(id).map(|node| &node.def)
    }

    pub fn field_node(&self, id: &str) -> Option<&FieldNode> {
        self.fields.get(id)
    }

    /// Id of the section holding `field_id`.
    pub fn section_of(&self, field_id: &str) -> Option<&str> {
        self.fields.get(field_id).map(|node| node.section.as_str())
    }

    /// Number of indexed nodes as `(pages, sections, fields)`.
    pub fn node_counts(&self) -> (usize, usize, usize) {
        (self.pages.len(), self.sections.len(), self.fields.len())
    }

    /// Fields of a section in list order.
    pub fn section_fields(&self, section_id: &str) -> Result<Vec<&FieldDefinition>, FormError> {
        let section = self
            .sections
            .get(section_id)
            .ok_or_else(|| FormError::section_not_found(section_id))?;
        Ok(section
            .fields
            .iter()
            .filter_map(|id| self.fields.get(id).map(|node| &node.def))
            .collect())
    }

    /// Working copy of a section's fields in list order.
    pub fn section_fields_cloned(
        &self,
        section_id: &str,
    ) -> Result<Vec<FieldDefinition>, FormError> {
        Ok(self
            .section_fields(section_id)?
            .into_iter()
            .cloned()
            .collect())
    }

    /// Ids of every section, nested ones included.
    pub fn section_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.sections.keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Writes coordinates, spans and list order from a working copy back.
    ///
    /// Only fields already in the section are touched; the list order
    /// becomes the order of `fields`.
    pub(crate) fn write_layout(
        &mut self,
        section_id: &str,
        fields: &[FieldDefinition],
    ) -> Result<(), FormError> {
        let section = self
            .sections
            .get_mut(section_id)
            .ok_or_else(|| FormError::section_not_found(section_id))?;

        let order: Vec<String> = fields
            .iter()
            .filter(|f| section.fields.contains(&f.id))
            .map(|f| f.id.clone())
            .collect();
        if order.len() == section.fields.len() {
            section.fields = order;
        }

        for field in fields {
            if let Some(node) = self.fields.get_mut(&field.id) {
                node.def.grid_row = field.grid_row;
                node.def.grid_column = field.grid_column;
                node.def.column_span = field.column_span;
            }
        }
        Ok(())
    }

    /// Mutable access to a field's own properties.
    pub(crate) fn field_mut(&mut self, id: &str) -> Option<&mut FieldDefinition> {
        self.fields.get_mut(id).map(|node| &mut node.def)
    }

    /// Inserts a field tree into a section at `index` (clamped to the end).
    ///
    /// Nested sections and tab pages carried by `field` are indexed too.
    pub(crate) fn insert_field(
        &mut self,
        section_id: &str,
        index: usize,
        field: &FieldDefinition,
    ) -> Result<String, FormError> {
        if !self.sections.contains_key(section_id) {
            return Err(FormError::section_not_found(section_id));
        }
        let id = self.import_field(field, section_id)?;
        if let Some(section) = self.sections.get_mut(section_id) {
            let index = index.min(section.fields.len());
            section.fields.insert(index, id.clone());
        }
        Ok(id)
    }

    /// Removes a field and everything nested under it.
    ///
    /// # Returns
    /// The removed field as a full tree.
    pub(crate) fn remove_field(&mut self, field_id: &str) -> Result<FieldDefinition, FormError> {
        let tree = self
            .export_field(field_id)
            .ok_or_else(|| FormError::field_not_found(field_id))?;
        let section_id = self.fields[field_id].section.clone();
        if let Some(section) = self.sections.get_mut(&section_id) {
            section.fields.retain(|id| id != field_id);
        }
        self.drop_field(field_id);
        Ok(tree)
    }

    /// Moves a field to the end of another section's list.
    pub(crate) fn relocate_field(
        &mut self,
        field_id: &str,
        target_section: &str,
    ) -> Result<(), FormError> {
        if !self.sections.contains_key(target_section) {
            return Err(FormError::section_not_found(target_section));
        }
        let node = self
            .fields
            .get_mut(field_id)
            .ok_or_else(|| FormError::field_not_found(field_id))?;
        let source = std::mem::replace(&mut node.section, target_section.to_string());
        if let Some(section) = self.sections.get_mut(&source) {
            section.fields.retain(|id| id != field_id);
        }
        if let Some(section) = self.sections.get_mut(target_section) {
            section.fields.push(field_id.to_string());
        }
        Ok(())
    }

    /// Replaces a field's properties, keeping its id, section and position
    /// in the section list.
    ///
    /// Switching to a container type creates an empty nested section or tab
    /// page; switching away drops the nested subtree.
    pub(crate) fn replace_field(&mut self, def: &FieldDefinition) -> Result<(), FormError> {
        let current_type = self
            .fields
            .get(&def.id)
            .map(|node| node.def.field_type)
            .ok_or_else(|| FormError::field_not_found(&def.id))?;

        if current_type != def.field_type {
            self.drop_nested(&def.id);
            let nested = match def.field_type {
                FieldType::Section => {
                    let section = SectionDefinition::new(new_id("section"), def.label.clone());
                    Nested::Section(self.import_section(&section, SectionParent::Field(def.id.clone()))?)
                }
                FieldType::Tab => {
                    let page = PageDefinition::new(new_id("page"), "Tab 1");
                    Nested::Tabs(vec![self.import_page(&page, Some(def.id.clone()))?])
                }
                _ => Nested::None,
            };
            if let Some(node) = self.fields.get_mut(&def.id) {
                node.nested = nested;
            }
        }

        if let Some(node) = self.fields.get_mut(&def.id) {
            let mut own = def.clone();
            own.section = None;
            own.tabs = Vec::new();
            node.def = own;
        }
        Ok(())
    }

    /// Appends a top-level page and returns its id.
    pub fn add_page(&mut self, title: impl Into<String>) -> String {
        let id = new_id("page");
        self.pages.insert(
            id.clone(),
            PageNode {
                id: id.clone(),
                title: title.into(),
                sections: Vec::new(),
                parent: None,
            },
        );
        self.root_pages.push(id.clone());
        id
    }

    /// Appends an empty section to a page and returns its id.
    pub fn add_section(
        &mut self,
        page_id: &str,
        title: impl Into<String>,
    ) -> Result<String, FormError> {
        if !self.pages.contains_key(page_id) {
            return Err(FormError::page_not_found(page_id));
        }
        let section = SectionDefinition::new(new_id("section"), title);
        let id = self.import_section(&section, SectionParent::Page(page_id.to_string()))?;
        if let Some(page) = self.pages.get_mut(page_id) {
            page.sections.push(id.clone());
        }
        Ok(id)
    }

    /// Removes a page and its whole subtree.
    pub fn remove_page(&mut self, page_id: &str) -> Result<(), FormError> {
        let page = self
            .pages
            .get(page_id)
            .ok_or_else(|| FormError::page_not_found(page_id))?;
        if let Some(field_id) = page.parent.clone() {
            if let Some(Nested::Tabs(tabs)) = self.fields.get_mut(&field_id).map(|n| &mut n.nested)
            {
                tabs.retain(|id| id != page_id);
            }
        } else {
            self.root_pages.retain(|id| id != page_id);
        }
        self.drop_page(page_id);
        Ok(())
    }

    /// Removes a section and its whole subtree.
    pub fn remove_section(&mut self, section_id: &str) -> Result<(), FormError> {
        let section = self
            .sections
            .get(section_id)
            .ok_or_else(|| FormError::section_not_found(section_id))?;
        match section.parent.clone() {
            SectionParent::Page(page_id) => {
                if let Some(page) = self.pages.get_mut(&page_id) {
                    page.sections.retain(|id| id != section_id);
                }
            }
            SectionParent::Field(field_id) => {
                if let Some(node) = self.fields.get_mut(&field_id) {
                    node.nested = Nested::None;
                }
            }
        }
        self.drop_section(section_id);
        Ok(())
    }

    /// Editable properties of a page.
    pub fn page_props(&self, id: &str) -> Option<PageProps> {
        self.pages.get(id).map(|page| PageProps {
            title: page.title.clone(),
        })
    }

    pub(crate) fn set_page_props(&mut self, id: &str, props: &PageProps) -> Result<(), FormError> {
        let page = self
            .pages
            .get_mut(id)
            .ok_or_else(|| FormError::page_not_found(id))?;
        page.title = props.title.clone();
        Ok(())
    }

    /// Editable properties of a section.
    pub fn section_props(&self, id: &str) -> Option<SectionProps> {
        self.sections.get(id).map(|section| SectionProps {
            title: section.title.clone(),
            description: section.description.clone(),
            kind: section.kind,
            repeater_config: section.repeater_config.clone(),
        })
    }

    pub(crate) fn set_section_props(
        &mut self,
        id: &str,
        props: &SectionProps,
    ) -> Result<(), FormError> {
        let section = self
            .sections
            .get_mut(id)
            .ok_or_else(|| FormError::section_not_found(id))?;
        section.title = props.title.clone();
        section.description = props.description.clone();
        section.kind = props.kind;
        section.repeater_config = props.repeater_config.clone();
        Ok(())
    }

    /// Exports a field with its nested subtree.
    pub fn export_field(&self, id: &str) -> Option<FieldDefinition> {
        let node = self.fields.get(id)?;
        let mut def = node.def.clone();
        match &node.nested {
            Nested::None => {}
            Nested::Section(section_id) => {
                def.section = self.export_section(section_id).map(Box::new);
            }
            Nested::Tabs(pages) => {
                def.tabs = pages.iter().filter_map(|p| self.export_page(p)).collect();
            }
        }
        Some(def)
    }

    fn export_page(&self, id: &str) -> Option<PageDefinition> {
        let page = self.pages.get(id)?;
        Some(PageDefinition {
            id: page.id.clone(),
            title: page.title.clone(),
            sections: page
                .sections
                .iter()
                .filter_map(|s| self.export_section(s))
                .collect(),
        })
    }

    fn export_section(&self, id: &str) -> Option<SectionDefinition> {
        let section = self.sections.get(id)?;
        Some(SectionDefinition {
            id: section.id.clone(),
            title: section.title.clone(),
            description: section.description.clone(),
            kind: section.kind,
            repeater_config: section.repeater_config.clone(),
            fields: section
                .fields
                .iter()
                .filter_map(|f| self.export_field(f))
                .collect(),
        })
    }

    fn import_page(
        &mut self,
        page: &PageDefinition,
        parent: Option<String>,
    ) -> Result<String, FormError> {
        if self.pages.contains_key(&page.id) {
            return Err(FormError::DuplicateId {
                kind: NodeKind::Page,
                id: page.id.clone(),
            });
        }
        self.pages.insert(
            page.id.clone(),
            PageNode {
                id: page.id.clone(),
                title: page.title.clone(),
                sections: Vec::new(),
                parent,
            },
        );
        for section in &page.sections {
            let id = self.import_section(section, SectionParent::Page(page.id.clone()))?;
            if let Some(node) = self.pages.get_mut(&page.id) {
                node.sections.push(id);
            }
        }
        Ok(page.id.clone())
    }

    fn import_section(
        &mut self,
        section: &SectionDefinition,
        parent: SectionParent,
    ) -> Result<String, FormError> {
        if self.sections.contains_key(&section.id) {
            return Err(FormError::DuplicateId {
                kind: NodeKind::Section,
                id: section.id.clone(),
            });
        }
        self.sections.insert(
            section.id.clone(),
            SectionNode {
                id: section.id.clone(),
                title: section.title.clone(),
                description: section.description.clone(),
                kind: section.kind,
                repeater_config: section.repeater_config.clone(),
                fields: Vec::new(),
                parent,
            },
        );
        for field in &section.fields {
            let id = self.import_field(field, &section.id)?;
            if let Some(node) = self.sections.get_mut(&section.id) {
                node.fields.push(id);
            }
        }
        Ok(section.id.clone())
    }

    fn import_field(
        &mut self,
        field: &FieldDefinition,
        section_id: &str,
    ) -> Result<String, FormError> {
        if self.fields.contains_key(&field.id) {
            return Err(FormError::DuplicateId {
                kind: NodeKind::Field,
                id: field.id.clone(),
            });
        }
        let mut own = field.clone();
        own.section = None;
        own.tabs = Vec::new();
        self.fields.insert(
            field.id.clone(),
            FieldNode {
                def: own,
                section: section_id.to_string(),
                nested: Nested::None,
            },
        );

        let nested = match (&field.section, field.tabs.is_empty()) {
            (Some(section), _) => Nested::Section(
                self.import_section(section, SectionParent::Field(field.id.clone()))?,
            ),
            (None, false) => {
                let mut pages = Vec::with_capacity(field.tabs.len());
                for page in &field.tabs {
                    pages.push(self.import_page(page, Some(field.id.clone()))?);
                }
                Nested::Tabs(pages)
            }
            (None, true) => Nested::None,
        };
        if let Some(node) = self.fields.get_mut(&field.id) {
            node.nested = nested;
        }
        Ok(field.id.clone())
    }

    fn drop_field(&mut self, id: &str) {
        self.drop_nested(id);
        self.fields.remove(id);
    }

    fn drop_nested(&mut self, field_id: &str) {
        let nested = match self.fields.get_mut(field_id) {
            Some(node) => std::mem::replace(&mut node.nested, Nested::None),
            None => return,
        };
        match nested {
            Nested::None => {}
            Nested::Section(section_id) => self.drop_section(&section_id),
            Nested::Tabs(pages) => {
                for page_id in pages {
                    self.drop_page(&page_id);
                }
            }
        }
    }

    fn drop_page(&mut self, id: &str) {
        if let Some(page) = self.pages.remove(id) {
            for section_id in page.sections {
                self.drop_section(&section_id);
            }
        }
    }

    fn drop_section(&mut self, id: &str) {
        if let Some(section) = self.sections.remove(id) {
            for field_id in section.fields {
                self.drop_field(&field_id);
            }
        }
    }
}
