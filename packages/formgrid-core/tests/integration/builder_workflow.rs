//! Builder workflow tests
//!
//! Drives the engine the way an authoring UI does and checks the exported
//! tree after every step.

use formgrid_core::config::FormConfig;
use formgrid_core::editor::{EditorOutcome, FieldTypePicker, NodeEditor, NodeRef};
use formgrid_core::grid::{MoveOutcome, MoveTarget, ResizeEdge};
use formgrid_core::schema::validation::check_definition;
use formgrid_core::schema::{FieldOption, FieldType, FormDefinition};
use formgrid_core::{FormDocument, LayoutEngine};

fn blank_engine() -> (LayoutEngine, String, String) {
    let mut engine = LayoutEngine::new(FormDocument::new("intake", "Intake"), FormConfig::default());
    let page = engine.add_page("Applicant");
    let section = engine.add_section(&page, "Details").unwrap();
    (engine, page, section)
}

fn assert_clean(form: &FormDefinition) {
    let problems = check_definition(form);
    assert!(problems.is_empty(), "unexpected problems: {:?}", problems);
}

/// Build a small form from scratch through the picker and editor.
#[test]
fn test_compose_form_from_scratch() {
    let (mut engine, _page, section) = blank_engine();
    let mut picker = FieldTypePicker::new();
    let mut editor = NodeEditor::new();

    let mut ids = Vec::new();
    for field_type in [FieldType::Text, FieldType::Email, FieldType::Select, FieldType::Date] {
        picker.open(section.clone());
        picker.select(field_type).unwrap();
        ids.push(picker.confirm(&mut engine).unwrap().unwrap());
    }

    assert_eq!(
        editor.open(&engine, NodeRef::Field(ids[2].clone())).unwrap(),
        EditorOutcome::Opened
    );
    editor
        .edit_field(|field| {
            field.name = "plan".to_string();
            field.label = "Plan".to_string();
            field.required = true;
        })
        .unwrap();
    editor.add_option(FieldOption::new("basic", "Basic")).unwrap();
    editor.add_option(FieldOption::new("pro", "Pro")).unwrap();
    assert_eq!(editor.save(&mut engine).unwrap(), EditorOutcome::Saved);

    let form = engine.to_definition();
    assert_clean(&form);
    let fields = &form.pages[0].sections[0].fields;
    assert_eq!(fields.len(), 4);
    assert_eq!(fields[2].name, "plan");
    assert_eq!(fields[2].options.len(), 2);
    assert_eq!((fields[3].grid_row, fields[3].grid_column), (2, 1));
}

/// Resize, move and duplicate a row of fields, then undo everything.
#[test]
fn test_rearrange_and_undo_to_start() {
    let (mut engine, _page, section) = blank_engine();
    let a = engine.add_field(&section, FieldType::Text).unwrap();
    let b = engine.add_field(&section, FieldType::Text).unwrap();
    let c = engine.add_field(&section, FieldType::Text).unwrap();
    let start = engine.to_definition();

    engine
        .resize_field(&a, ResizeEdge::Right, 8, false)
        .unwrap();
    assert_clean(&engine.to_definition());

    let outcome = engine
        .move_field(
            &c,
            &MoveTarget::Cell {
                section: section.clone(),
                row: 1,
                column: 9,
            },
        )
        .unwrap();
    assert!(matches!(outcome, MoveOutcome::Placed { .. }));
    assert_clean(&engine.to_definition());

    engine.duplicate_field(&b).unwrap().unwrap();
    assert_clean(&engine.to_definition());

    engine.delete_field(&a).unwrap();
    assert_clean(&engine.to_definition());

    for _ in 0..4 {
        assert!(engine.undo());
    }
    assert_eq!(engine.to_definition(), start);
}

/// Nested section and tab containers keep their own grids.
#[test]
fn test_nested_containers_have_independent_grids() {
    let (mut engine, _page, section) = blank_engine();
    let container = engine.add_field(&section, FieldType::Section).unwrap();
    let nested = match &engine.document().field_node(&container).unwrap().nested {
        formgrid_core::document::Nested::Section(id) => id.clone(),
        other => panic!("Expected nested section, got {:?}", other),
    };

    let inner_a = engine.add_field(&nested, FieldType::Text).unwrap();
    let inner_b = engine.add_field(&nested, FieldType::Text).unwrap();
    let outer = engine.add_field(&section, FieldType::Text).unwrap();

    let doc = engine.document();
    assert_eq!(doc.field(&inner_a).unwrap().grid_column, 1);
    assert_eq!(doc.field(&inner_b).unwrap().grid_column, 5);
    assert_eq!(doc.field(&outer).unwrap().grid_column, 5);
    // Both inner fields reuse the default name inside their own scope.
    assert_eq!(doc.field(&inner_a).unwrap().name, "text_field");
    assert_eq!(doc.field(&outer).unwrap().name, "text_field");
    assert_clean(&engine.to_definition());

    engine.delete_field(&container).unwrap();
    assert!(engine.document().section(&nested).is_none());
    assert!(engine.document().field(&inner_a).is_none());
}

/// Structural edits of pages and sections are undoable like field edits.
#[test]
fn test_page_and_section_structure() {
    let (mut engine, page, section) = blank_engine();
    let second = engine.add_page("Review");
    engine.add_field(&section, FieldType::Checkbox).unwrap();

    engine.remove_section(&section).unwrap();
    assert!(engine.document().page(&page).unwrap().sections.is_empty());

    assert!(engine.undo());
    assert_eq!(engine.document().page(&page).unwrap().sections, vec![section.clone()]);

    engine.remove_page(&second).unwrap();
    assert_eq!(engine.document().page_ids(), &[page]);
    engine.update_meta(|meta| meta.settings.multi_page = true);
    assert!(engine.to_definition().settings.multi_page);
}
