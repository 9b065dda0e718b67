//! Form, page and section definitions.

use serde::{Deserialize, Serialize};

use super::field::FieldDefinition;

/// Form-level behaviour switches.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormSettings {
    /// Show one page at a time with next/previous navigation
    #[serde(default)]
    pub multi_page: bool,
    #[serde(default)]
    pub show_progress_bar: bool,
    #[serde(default)]
    pub allow_draft: bool,
}

/// Root of a form tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormDefinition {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub pages: Vec<PageDefinition>,
    #[serde(default)]
    pub settings: FormSettings,
    #[serde(default)]
    pub published: bool,
}

impl FormDefinition {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: String::new(),
            pages: Vec::new(),
            settings: FormSettings::default(),
            published: false,
        }
    }

    /// Visits every section of the tree, nested ones included, depth first.
    pub fn for_each_section<'a>(&'a self, visit: &mut impl FnMut(&'a SectionDefinition)) {
        for page in &self.pages {
            page.for_each_section(visit);
        }
    }

    /// Mutable counterpart of [`FormDefinition::for_each_section`].
    pub fn for_each_section_mut(&mut self, visit: &mut impl FnMut(&mut SectionDefinition)) {
        for page in &mut self.pages {
            page.for_each_section_mut(visit);
        }
    }
}

/// A page of sections.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageDefinition {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub sections: Vec<SectionDefinition>,
}

impl PageDefinition {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            sections: Vec::new(),
        }
    }

    pub fn with_section(mut self, section: SectionDefinition) -> Self {
        self.sections.push(section);
        self
    }

    fn for_each_section<'a>(&'a self, visit: &mut impl FnMut(&'a SectionDefinition)) {
        for section in &self.sections {
            section.walk(visit);
        }
    }

    fn for_each_section_mut(&mut self, visit: &mut impl FnMut(&mut SectionDefinition)) {
        for section in &mut self.sections {
            section.walk_mut(visit);
        }
    }
}

/// Whether a section is answered once or as a list of rows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SectionKind {
    #[default]
    Normal,
    Repeater,
}

/// Where new repeater rows are inserted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AddPosition {
    Top,
    #[default]
    Bottom,
}

fn default_max_rows() -> usize {
    10
}

fn default_add_label() -> String {
    "Add row".to_string()
}

fn default_remove_label() -> String {
    "Remove".to_string()
}

/// Row bounds and labels of a repeater section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepeaterConfig {
    #[serde(default)]
    pub min_rows: usize,
    #[serde(default = "default_max_rows")]
    pub max_rows: usize,
    #[serde(default = "default_add_label")]
    pub add_label: String,
    #[serde(default = "default_remove_label")]
    pub remove_label: String,
    #[serde(default)]
    pub add_position: AddPosition,
}

impl RepeaterConfig {
    /// Returns `(min, max)` with `max` never below `min`.
    pub fn bounds(&self) -> (usize, usize) {
        (self.min_rows, self.max_rows.max(self.min_rows))
    }
}

impl Default for RepeaterConfig {
    fn default() -> Self {
        Self {
            min_rows: 0,
            max_rows: default_max_rows(),
            add_label: default_add_label(),
            remove_label: default_remove_label(),
            add_position: AddPosition::Bottom,
        }
    }
}

/// A titled group of fields laid out on the 12-column grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionDefinition {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, alias = "type")]
    pub kind: SectionKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repeater_config: Option<RepeaterConfig>,
    #[serde(default)]
    pub fields: Vec<FieldDefinition>,
}

impl SectionDefinition {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: String::new(),
            kind: SectionKind::Normal,
            repeater_config: None,
            fields: Vec::new(),
        }
    }

    /// Turns the section into a repeater with the given config.
    pub fn repeating(mut self, config: RepeaterConfig) -> Self {
        self.kind = SectionKind::Repeater;
        self.repeater_config = Some(config);
        self
    }

    pub fn with_field(mut self, field: FieldDefinition) -> Self {
        self.fields.push(field);
        self
    }

    pub fn is_repeater(&self) -> bool {
        self.kind == SectionKind::Repeater
    }

    /// Effective repeater config, `None` for normal sections.
    ///
    /// Repeaters stored without config get the default labels and
    /// `default_max_rows`.
    pub fn repeater(&self, default_max_rows: usize) -> Option<RepeaterConfig> {
        match self.kind {
            SectionKind::Normal => None,
            SectionKind::Repeater => {
                Some(self.repeater_config.clone().unwrap_or_else(|| RepeaterConfig {
                    max_rows: default_max_rows,
                    ..RepeaterConfig::default()
                }))
            }
        }
    }

    fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a SectionDefinition)) {
        visit(self);
        for field in &self.fields {
            if let Some(nested) = &field.section {
                nested.walk(visit);
            }
            for page in &field.tabs {
                page.for_each_section(visit);
            }
        }
    }

    fn walk_mut(&mut self, visit: &mut impl FnMut(&mut SectionDefinition)) {
        visit(self);
        for field in &mut self.fields {
            if let Some(nested) = &mut field.section {
                nested.walk_mut(visit);
            }
            for page in &mut field.tabs {
                page.for_each_section_mut(visit);
            }
        }
    }
}
