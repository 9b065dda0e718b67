//! Render view model.
//!
//! A plain tree describing what a form UI shows for the current page:
//! resolved spans and grid coordinates, current values and messages,
//! repeater rows and the availability of every action. Building it reads
//! answers through the scoped data contexts and only writes the blank
//! rows that pad repeaters to their minimum.

use serde::Serialize;
use serde_json::Value;

use formgrid_core::grid::coords::resolve_span;
use formgrid_core::schema::{
    AddPosition, Breakpoint, FieldDefinition, FieldOption, FieldType, PageDefinition,
    SectionDefinition,
};

use crate::context::{DataContext, NestedContext, RowContext};
use crate::repeater::pad_rows;
use crate::visibility::is_visible;

/// Whole-form view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormView {
    pub title: String,
    pub description: String,
    /// Page headers, empty for single-page forms
    pub tabs: Vec<PageTab>,
    pub progress: Option<Progress>,
    pub page: Option<PageView>,
    pub actions: Actions,
    /// Non-blocking notice left by navigating back past errors
    pub warning: Option<String>,
    pub busy: bool,
    pub read_only: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageTab {
    pub index: usize,
    pub title: String,
    pub active: bool,
}

/// Progress through a multi-page form, 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Progress {
    pub current: usize,
    pub total: usize,
    pub percent: u8,
}

impl Progress {
    pub fn new(current_index: usize, total: usize) -> Self {
        let current = (current_index + 1).min(total);
        let percent = if total == 0 { 0 } else { (current * 100 / total) as u8 };
        Self {
            current,
            total,
            percent,
        }
    }
}

/// Which navigation and submission actions are offered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Actions {
    pub previous: bool,
    pub next: bool,
    pub submit: bool,
    pub save_draft: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageView {
    pub id: String,
    pub title: String,
    pub sections: Vec<SectionView>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SectionView {
    pub id: String,
    pub title: String,
    pub description: String,
    pub body: SectionBody,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum SectionBody {
    Fields(Vec<FieldView>),
    Repeater {
        rows: Vec<RowView>,
        can_add: bool,
        can_remove: bool,
        add_label: String,
        remove_label: String,
        add_position: AddPosition,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RowView {
    pub index: usize,
    pub fields: Vec<FieldView>,
}

/// One visible field, in reading order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldView {
    pub id: String,
    pub name: String,
    pub label: String,
    pub field_type: FieldType,
    pub span: u32,
    pub row: u32,
    pub column: u32,
    pub value: Option<Value>,
    pub error: Option<String>,
    pub required: bool,
    pub disabled: bool,
    pub placeholder: Option<String>,
    pub hint: Option<String>,
    pub options: Vec<FieldOption>,
    pub nested: Option<NestedView>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum NestedView {
    Section(Box<SectionView>),
    Tabs(Vec<TabView>),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TabView {
    pub id: String,
    pub title: String,
    pub sections: Vec<SectionView>,
}

/// Settings shared by one render pass.
#[derive(Debug, Clone, Copy)]
pub(crate) struct RenderOptions {
    pub breakpoint: Breakpoint,
    /// Inputs and row actions are disabled
    pub disabled: bool,
    pub default_max_rows: usize,
}

pub(crate) fn render_page(
    page: &PageDefinition,
    ctx: &mut dyn DataContext,
    options: &RenderOptions,
) -> PageView {
    PageView {
        id: page.id.clone(),
        title: page.title.clone(),
        sections: render_sections(&page.sections, ctx, options),
    }
}

fn render_sections(
    sections: &[SectionDefinition],
    ctx: &mut dyn DataContext,
    options: &RenderOptions,
) -> Vec<SectionView> {
    let mut views = Vec::with_capacity(sections.len());
    for section in sections {
        views.push(render_section(section, ctx, options));
    }
    views
}

pub(crate) fn render_section(
    section: &SectionDefinition,
    ctx: &mut dyn DataContext,
    options: &RenderOptions,
) -> SectionView {
    let body = match section.repeater(options.default_max_rows) {
        Some(config) => {
            let count = pad_rows(ctx, &section.id, &config);
            let (min, max) = config.bounds();
            let mut rows = Vec::with_capacity(count);
            for index in 0..count {
                let mut row = RowContext::new(ctx, section.id.as_str(), index);
                rows.push(RowView {
                    index,
                    fields: render_fields(&section.fields, &mut row, options),
                });
            }
            SectionBody::Repeater {
                rows,
                can_add: !options.disabled && count < max,
                can_remove: !options.disabled && count > min,
                add_label: config.add_label,
                remove_label: config.remove_label,
                add_position: config.add_position,
            }
        }
        None => SectionBody::Fields(render_fields(&section.fields, ctx, options)),
    };
    SectionView {
        id: section.id.clone(),
        title: section.title.clone(),
        description: section.description.clone(),
        body,
    }
}

fn render_fields(
    fields: &[FieldDefinition],
    ctx: &mut dyn DataContext,
    options: &RenderOptions,
) -> Vec<FieldView> {
    let mut ordered: Vec<&FieldDefinition> = fields.iter().collect();
    ordered.sort_by_key(|field| (field.grid_row, field.grid_column));

    let mut views = Vec::with_capacity(ordered.len());
    for field in ordered {
        if !is_visible(field, ctx) {
            continue;
        }
        let nested = match field.field_type {
            FieldType::Section => field.section.as_ref().map(|section| {
                let mut inner = NestedContext::new(ctx, field.name.as_str());
                NestedView::Section(Box::new(render_section(section, &mut inner, options)))
            }),
            FieldType::Tab => {
                let mut inner = NestedContext::new(ctx, field.name.as_str());
                let tabs = field
                    .tabs
                    .iter()
                    .map(|page| TabView {
                        id: page.id.clone(),
                        title: page.title.clone(),
                        sections: render_sections(&page.sections, &mut inner, options),
                    })
                    .collect();
                Some(NestedView::Tabs(tabs))
            }
            _ => None,
        };
        let input = field.field_type.is_input();
        views.push(FieldView {
            id: field.id.clone(),
            name: field.name.clone(),
            label: field.label.clone(),
            field_type: field.field_type,
            span: resolve_span(&field.column_span, options.breakpoint),
            row: field.grid_row,
            column: field.grid_column,
            value: if input { ctx.get(&field.name).cloned() } else { None },
            error: if input {
                ctx.error(&field.name).map(str::to_string)
            } else {
                None
            },
            required: field.is_required(),
            disabled: options.disabled,
            placeholder: field.placeholder.clone(),
            hint: field.hint.clone(),
            options: field.options.clone(),
            nested,
        });
    }
    views
}
