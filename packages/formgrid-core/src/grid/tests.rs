use super::coords::{check_layout, compact_rows, migrate_legacy, resolve_span};
use super::*;
use crate::config::FormConfig;
use crate::document::Nested;
use crate::error::{FormError, NodeKind};
use crate::schema::{
    Breakpoint, ColumnSpan, FieldDefinition, FieldType, FormDefinition, PageDefinition,
    SectionDefinition,
};
use ntest::timeout;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::cell::RefCell;
use std::rc::Rc;
use std::time::{Duration, Instant};

fn text(id: &str, row: u32, column: u32, span: u32) -> FieldDefinition {
    FieldDefinition::new(id, id, FieldType::Text)
        .at(row, column)
        .spanning(span)
}

fn engine_with_sections(sections: Vec<SectionDefinition>) -> LayoutEngine {
    let mut page = PageDefinition::new("p_1", "Page");
    page.sections = sections;
    let mut form = FormDefinition::new("form", "Form");
    form.pages.push(page);
    LayoutEngine::from_definition(&form, FormConfig::default()).unwrap()
}

fn engine_with(fields: Vec<FieldDefinition>) -> LayoutEngine {
    let mut section = SectionDefinition::new("s_main", "Main");
    section.fields = fields;
    engine_with_sections(vec![section])
}

fn placement(engine: &LayoutEngine, id: &str) -> (u32, u32, u32) {
    let field = engine.document().field(id).unwrap();
    (
        field.grid_row,
        field.grid_column,
        coords::layout_span(field),
    )
}

fn assert_valid(engine: &LayoutEngine) {
    for section_id in engine.document().section_ids() {
        let fields = engine.document().section_fields_cloned(&section_id).unwrap();
        assert_eq!(check_layout(&fields), None, "section {}", section_id);
    }
}

#[timeout(1000)]
#[test]
fn test_add_field_fills_row_then_wraps() {
    let mut engine = engine_with(vec![]);

    let first = engine.add_field("s_main", FieldType::Text).unwrap();
    let second = engine.add_field("s_main", FieldType::Text).unwrap();
    let third = engine.add_field("s_main", FieldType::Email).unwrap();
    let fourth = engine.add_field("s_main", FieldType::Text).unwrap();

    assert_eq!(placement(&engine, &first), (1, 1, 4));
    assert_eq!(placement(&engine, &second), (1, 5, 4));
    assert_eq!(placement(&engine, &third), (1, 9, 4));
    assert_eq!(placement(&engine, &fourth), (2, 1, 4));

    let doc = engine.document();
    assert_eq!(doc.field(&first).unwrap().name, "text_field");
    assert_eq!(doc.field(&second).unwrap().name, "text_field_2");
    assert_eq!(doc.field(&fourth).unwrap().name, "text_field_3");
    assert_eq!(doc.field(&third).unwrap().label, "Email");
    assert_valid(&engine);
}

#[timeout(1000)]
#[test]
fn test_add_field_starts_new_row_when_too_few_columns_remain() {
    let mut engine = engine_with(vec![text("wide", 1, 1, 10)]);

    let id = engine.add_field("s_main", FieldType::Number).unwrap();

    assert_eq!(placement(&engine, &id), (2, 1, 4));
}

#[timeout(1000)]
#[test]
fn test_add_container_field_creates_nested_content() {
    let mut engine = engine_with(vec![]);

    let section_field = engine.add_field("s_main", FieldType::Section).unwrap();
    let tab_field = engine.add_field("s_main", FieldType::Tab).unwrap();

    let doc = engine.document();
    match &doc.field_node(&section_field).unwrap().nested {
        Nested::Section(id) => assert!(doc.section(id).is_some()),
        other => panic!("Expected nested section, got {:?}", other),
    }
    match &doc.field_node(&tab_field).unwrap().nested {
        Nested::Tabs(pages) => {
            assert_eq!(pages.len(), 1);
            assert_eq!(doc.page(&pages[0]).unwrap().title, "Tab 1");
        }
        other => panic!("Expected tabs, got {:?}", other),
    }
}

#[timeout(1000)]
#[test]
fn test_unknown_ids_are_not_found() {
    let mut engine = engine_with(vec![text("a", 1, 1, 4)]);

    assert_eq!(
        engine.add_field("nope", FieldType::Text),
        Err(FormError::NodeNotFound {
            kind: NodeKind::Section,
            id: "nope".to_string()
        })
    );
    assert!(matches!(
        engine.delete_field("nope"),
        Err(FormError::NodeNotFound {
            kind: NodeKind::Field,
            ..
        })
    ));
    assert!(engine
        .resize_field("nope", ResizeEdge::Right, 4, false)
        .is_err());
}

#[timeout(1000)]
#[test]
fn test_resize_right_clamps_to_grid_edge() {
    let mut engine = engine_with(vec![text("a", 1, 9, 3)]);

    let outcome = engine
        .resize_field("a", ResizeEdge::Right, 6, false)
        .unwrap();

    assert_eq!(
        outcome.placement,
        Placement {
            row: 1,
            column: 9,
            span: 4
        }
    );
    assert_eq!(placement(&engine, "a"), (1, 9, 4));
}

#[timeout(1000)]
#[test]
fn test_resize_left_keeps_right_edge() {
    let mut engine = engine_with(vec![text("a", 1, 5, 4)]);

    engine.resize_field("a", ResizeEdge::Left, 6, false).unwrap();
    assert_eq!(placement(&engine, "a"), (1, 3, 6));

    engine.resize_field("a", ResizeEdge::Left, 11, false).unwrap();
    assert_eq!(placement(&engine, "a"), (1, 1, 8));

    engine.resize_field("a", ResizeEdge::Left, 2, false).unwrap();
    assert_eq!(placement(&engine, "a"), (1, 7, 2));
}

#[timeout(1000)]
#[test]
fn test_resize_preserves_responsive_entries() {
    let mut field = text("a", 1, 1, 4);
    field.column_span = ColumnSpan::Responsive {
        mobile: 12,
        tablet: 6,
        desktop: 4,
    };
    let mut engine = engine_with(vec![field]);

    engine.resize_field("a", ResizeEdge::Right, 8, false).unwrap();

    assert_eq!(
        engine.document().field("a").unwrap().column_span,
        ColumnSpan::Responsive {
            mobile: 12,
            tablet: 6,
            desktop: 8
        }
    );
}

#[timeout(1000)]
#[test]
fn test_engine_places_legacy_fields() {
    let mut engine = engine_with(vec![
        text("a", 1, 1, 4),
        FieldDefinition::new("legacy", "legacy", FieldType::Text),
    ]);

    assert_eq!(placement(&engine, "legacy"), (1, 5, 4));
    assert_valid(&engine);

    let id = engine.add_field("s_main", FieldType::Text).unwrap();
    assert_eq!(placement(&engine, &id), (1, 9, 4));
    assert_valid(&engine);
    assert!(engine.undo());
    assert_eq!(placement(&engine, "legacy"), (1, 5, 4));
    assert!(!engine.can_undo());
}

#[timeout(1000)]
#[test]
fn test_engine_pulls_out_of_range_columns_onto_grid() {
    let mut engine = engine_with(vec![text("a", 1, 1, 4), text("far", 1, 14, 4)]);

    assert_eq!(placement(&engine, "far"), (1, 9, 4));
    assert_valid(&engine);

    let outcome = engine
        .resize_field("far", ResizeEdge::Right, 6, false)
        .unwrap();
    assert_eq!(outcome.placement.span, 4);
    assert_valid(&engine);
}

#[timeout(1000)]
#[test]
fn test_committed_resize_shifts_siblings() {
    let mut engine = engine_with(vec![
        text("a", 1, 1, 4),
        text("b", 1, 5, 4),
        text("c", 1, 9, 4),
    ]);

    let outcome = engine
        .resize_field("a", ResizeEdge::Right, 6, false)
        .unwrap();

    assert_eq!(outcome.shifted, 2);
    assert_eq!(placement(&engine, "a"), (1, 1, 6));
    assert_eq!(placement(&engine, "b"), (1, 7, 4));
    assert_eq!(placement(&engine, "c"), (2, 1, 4));
    assert_valid(&engine);
}

#[timeout(1000)]
#[test]
fn test_live_resize_touches_only_the_field() {
    let mut engine = engine_with(vec![text("a", 1, 1, 4), text("b", 1, 5, 4)]);

    engine.resize_field("a", ResizeEdge::Right, 7, true).unwrap();

    assert_eq!(placement(&engine, "a"), (1, 1, 7));
    assert_eq!(placement(&engine, "b"), (1, 5, 4));
    assert!(engine.gesture_active());

    assert!(engine.abort_gesture());
    assert_eq!(placement(&engine, "a"), (1, 1, 4));
    assert!(!engine.can_undo());
}

#[timeout(1000)]
#[test]
fn test_live_updates_and_commit_are_one_undo_step() {
    let mut engine = engine_with(vec![text("a", 1, 1, 4), text("b", 1, 5, 4)]);

    engine.resize_field("a", ResizeEdge::Right, 5, true).unwrap();
    engine.resize_field("a", ResizeEdge::Right, 6, true).unwrap();
    engine.resize_field("a", ResizeEdge::Right, 6, false).unwrap();
    assert_eq!(placement(&engine, "b"), (1, 7, 4));

    assert!(engine.undo());
    assert_eq!(placement(&engine, "a"), (1, 1, 4));
    assert_eq!(placement(&engine, "b"), (1, 5, 4));
    assert!(!engine.can_undo());
}

#[timeout(1000)]
#[test]
fn test_move_to_cell_rejects_overflow() {
    let mut engine = engine_with(vec![text("a", 1, 1, 4)]);
    let before = engine.document().clone();

    let outcome = engine
        .move_field(
            "a",
            &MoveTarget::Cell {
                section: "s_main".to_string(),
                row: 1,
                column: 10,
            },
        )
        .unwrap();

    assert_eq!(outcome, MoveOutcome::Rejected(RejectReason::Overflow));
    assert_eq!(engine.document(), &before);
    assert!(!engine.can_undo());
}

#[timeout(1000)]
#[test]
fn test_move_to_cell_shifts_overlapped_siblings() {
    let mut engine = engine_with(vec![
        text("a", 1, 1, 4),
        text("b", 1, 5, 4),
        text("c", 2, 1, 4),
    ]);

    let outcome = engine
        .move_field(
            "c",
            &MoveTarget::Cell {
                section: "s_main".to_string(),
                row: 1,
                column: 3,
            },
        )
        .unwrap();

    assert_eq!(
        outcome,
        MoveOutcome::Placed {
            placement: Placement {
                row: 1,
                column: 3,
                span: 4
            },
            shifted: 3
        }
    );
    assert_eq!(placement(&engine, "a"), (1, 7, 4));
    assert_eq!(placement(&engine, "b"), (2, 1, 4));
    assert_valid(&engine);
}

#[timeout(1000)]
#[test]
fn test_move_onto_field_swaps_positions() {
    let mut engine = engine_with(vec![text("a", 1, 1, 4), text("b", 2, 5, 4)]);

    let outcome = engine
        .move_field("a", &MoveTarget::Field("b".to_string()))
        .unwrap();

    assert_eq!(
        outcome,
        MoveOutcome::Swapped {
            with: "b".to_string()
        }
    );
    assert_eq!(placement(&engine, "a"), (2, 5, 4));
    assert_eq!(placement(&engine, "b"), (1, 1, 4));
}

#[timeout(1000)]
#[test]
fn test_move_onto_itself_is_rejected() {
    let mut engine = engine_with(vec![text("a", 1, 1, 4)]);

    let outcome = engine
        .move_field("a", &MoveTarget::Field("a".to_string()))
        .unwrap();

    assert_eq!(outcome, MoveOutcome::Rejected(RejectReason::SelfTarget));
}

#[timeout(1000)]
#[test]
fn test_cross_section_move_renames_on_collision() {
    let main = SectionDefinition::new("s_main", "Main")
        .with_field(FieldDefinition::new("f_email", "email", FieldType::Email).at(1, 1));
    let other = SectionDefinition::new("s_other", "Other")
        .with_field(text("f_first", 1, 1, 4))
        .with_field(FieldDefinition::new("f_email_2", "email", FieldType::Email).at(2, 1))
        .with_field(text("f_last", 3, 1, 4));
    let mut engine = engine_with_sections(vec![main, other]);

    engine
        .move_field(
            "f_email_2",
            &MoveTarget::Cell {
                section: "s_main".to_string(),
                row: 2,
                column: 1,
            },
        )
        .unwrap();

    let doc = engine.document();
    assert_eq!(doc.section_of("f_email_2"), Some("s_main"));
    assert_eq!(doc.field("f_email_2").unwrap().name, "email_copy");
    assert_eq!(placement(&engine, "f_last"), (2, 1, 4));
    assert_valid(&engine);
}

#[timeout(1000)]
#[test]
fn test_cross_section_swap() {
    let main = SectionDefinition::new("s_main", "Main").with_field(text("a", 1, 1, 4));
    let other = SectionDefinition::new("s_other", "Other")
        .with_field(text("b", 1, 1, 4))
        .with_field(text("c", 2, 1, 4));
    let mut engine = engine_with_sections(vec![main, other]);

    engine
        .move_field("c", &MoveTarget::Field("a".to_string()))
        .unwrap();

    let doc = engine.document();
    assert_eq!(doc.section_of("c"), Some("s_main"));
    assert_eq!(placement(&engine, "c"), (1, 1, 4));
    assert_eq!(placement(&engine, "a"), (2, 1, 4));
    assert_eq!(doc.section("s_other").unwrap().fields, vec!["b"]);
    assert_valid(&engine);
}

#[timeout(1000)]
#[test]
fn test_container_cannot_move_into_itself() {
    let inner = SectionDefinition::new("s_box", "Box").with_field(text("inner", 1, 1, 4));
    let mut container = FieldDefinition::new("f_box", "box", FieldType::Section).at(1, 1);
    container.section = Some(Box::new(inner));
    let mut engine = engine_with(vec![container]);

    let into_cell = engine
        .move_field(
            "f_box",
            &MoveTarget::Cell {
                section: "s_box".to_string(),
                row: 2,
                column: 1,
            },
        )
        .unwrap();
    let onto_child = engine
        .move_field("f_box", &MoveTarget::Field("inner".to_string()))
        .unwrap();

    assert_eq!(into_cell, MoveOutcome::Rejected(RejectReason::IntoOwnSubtree));
    assert_eq!(onto_child, MoveOutcome::Rejected(RejectReason::IntoOwnSubtree));
    assert_eq!(engine.document().section_of("f_box"), Some("s_main"));
}

#[timeout(1000)]
#[test]
fn test_delete_compacts_rows() {
    let mut engine = engine_with(vec![
        text("a", 1, 1, 4),
        text("b", 2, 1, 4),
        text("c", 3, 5, 4),
    ]);

    let removed = engine.delete_field("b").unwrap();

    assert_eq!(removed.id, "b");
    assert_eq!(placement(&engine, "a"), (1, 1, 4));
    assert_eq!(placement(&engine, "c"), (2, 5, 4));
    assert_valid(&engine);
}

#[timeout(1000)]
#[test]
fn test_compacting_contiguous_rows_is_noop() {
    let mut fields = vec![text("a", 1, 1, 4), text("b", 1, 5, 4), text("c", 2, 3, 4)];
    let before = fields.clone();

    assert!(!compact_rows(&mut fields));
    assert_eq!(fields, before);
}

#[timeout(1000)]
#[test]
fn test_duplicate_twice_numbers_copies() {
    let title = FieldDefinition::new("f_title", "title", FieldType::Text)
        .with_label("Title")
        .at(1, 1);
    let mut engine = engine_with(vec![title]);
    let start = Instant::now();

    let first = engine
        .duplicate_field_at("f_title", start)
        .unwrap()
        .unwrap();
    let second = engine
        .duplicate_field_at("f_title", start + Duration::from_secs(1))
        .unwrap()
        .unwrap();

    let doc = engine.document();
    assert_eq!(doc.field(&first).unwrap().name, "title_copy");
    assert_eq!(doc.field(&first).unwrap().label, "Title (Copy)");
    assert_eq!(doc.field(&second).unwrap().name, "title_copy_2");
    assert_eq!(doc.field(&second).unwrap().label, "Title (Copy 2)");

    // The newest copy sits right after the original.
    assert_eq!(placement(&engine, "f_title"), (1, 1, 4));
    assert_eq!(placement(&engine, &second), (1, 5, 4));
    assert_eq!(placement(&engine, &first), (1, 9, 4));
    assert_valid(&engine);
}

#[timeout(1000)]
#[test]
fn test_duplicate_guard_ignores_reentry() {
    let mut engine = engine_with(vec![text("a", 1, 1, 4)]);
    let start = Instant::now();

    assert!(engine.duplicate_field_at("a", start).unwrap().is_some());
    let guarded = engine
        .duplicate_field_at("a", start + Duration::from_millis(10))
        .unwrap();

    assert_eq!(guarded, None);
    assert_eq!(engine.document().section_fields("s_main").unwrap().len(), 2);
}

#[timeout(1000)]
#[test]
fn test_duplicate_container_regenerates_nested_ids() {
    let inner = SectionDefinition::new("s_box", "Box").with_field(text("inner", 1, 1, 4));
    let mut container = FieldDefinition::new("f_box", "box", FieldType::Section).at(1, 1);
    container.section = Some(Box::new(inner));
    let mut engine = engine_with(vec![container]);

    let copy = engine.duplicate_field("f_box").unwrap().unwrap();

    let doc = engine.document();
    let nested = match &doc.field_node(&copy).unwrap().nested {
        Nested::Section(id) => id.clone(),
        other => panic!("Expected nested section, got {:?}", other),
    };
    assert_ne!(nested, "s_box");
    let copied_fields = doc.section_fields(&nested).unwrap();
    assert_eq!(copied_fields.len(), 1);
    assert_ne!(copied_fields[0].id, "inner");
    assert_eq!(copied_fields[0].name, "inner");
    assert_eq!(doc.node_counts(), (1, 3, 4));
}

#[timeout(1000)]
#[test]
fn test_undo_redo_add_field() {
    let mut engine = engine_with(vec![]);

    let id = engine.add_field("s_main", FieldType::Text).unwrap();
    assert!(engine.undo());
    assert!(engine.document().field(&id).is_none());
    assert!(engine.can_redo());

    assert!(engine.redo());
    assert!(engine.document().field(&id).is_some());
    assert!(!engine.redo());
}

#[timeout(1000)]
#[test]
fn test_history_limit_bounds_undo() {
    let mut config = FormConfig::default();
    config.history_limit = 2;
    let mut engine = LayoutEngine::from_definition(
        &FormDefinition {
            pages: vec![PageDefinition::new("p", "P")
                .with_section(SectionDefinition::new("s_main", "Main"))],
            ..FormDefinition::new("form", "Form")
        },
        config,
    )
    .unwrap();

    for _ in 0..3 {
        engine.add_field("s_main", FieldType::Text).unwrap();
    }

    assert!(engine.undo());
    assert!(engine.undo());
    assert!(!engine.undo());
    assert_eq!(engine.document().section_fields("s_main").unwrap().len(), 1);
}

#[timeout(1000)]
#[test]
fn test_commit_field_rejects_duplicate_name() {
    let mut engine = engine_with(vec![text("a", 1, 1, 4), text("b", 1, 5, 4)]);
    let mut edited = engine.document().field("b").unwrap().clone();
    edited.name = "a".to_string();

    let err = engine.commit_field(&edited).unwrap_err();

    assert_eq!(
        err,
        FormError::DuplicateFieldName {
            section: "s_main".to_string(),
            name: "a".to_string()
        }
    );
    assert_eq!(engine.document().field("b").unwrap().name, "b");
}

#[timeout(1000)]
#[test]
fn test_commit_field_resolves_wider_span() {
    let mut engine = engine_with(vec![text("a", 1, 1, 4), text("b", 1, 5, 4)]);
    let mut edited = engine.document().field("b").unwrap().clone();
    edited.column_span = ColumnSpan::Fixed(10);
    edited.validation.min = Some(3.0);

    engine.commit_field(&edited).unwrap();

    let saved = engine.document().field("b").unwrap();
    assert_eq!(saved.validation.min, None);
    assert_eq!(placement(&engine, "b"), (1, 3, 10));
    assert_eq!(placement(&engine, "a"), (2, 1, 4));
    assert_valid(&engine);
}

#[timeout(1000)]
#[test]
fn test_migrate_legacy_flows_unplaced_fields() {
    let mut fields = vec![
        text("placed", 1, 1, 6),
        FieldDefinition::new("legacy_a", "legacy_a", FieldType::Text).spanning(4),
        FieldDefinition::new("legacy_b", "legacy_b", FieldType::Text),
    ];
    fields[2].column_span = ColumnSpan::default();

    let migrated = migrate_legacy(&mut fields);

    assert_eq!(migrated, 2);
    assert_eq!((fields[1].grid_row, fields[1].grid_column), (1, 7));
    assert_eq!((fields[2].grid_row, fields[2].grid_column), (2, 1));
    assert_eq!(check_layout(&fields), None);
}

#[timeout(1000)]
#[test]
fn test_resolve_span_per_breakpoint() {
    let responsive = ColumnSpan::Responsive {
        mobile: 12,
        tablet: 6,
        desktop: 40,
    };

    assert_eq!(resolve_span(&ColumnSpan::Fixed(4), Breakpoint::Mobile), 12);
    assert_eq!(resolve_span(&ColumnSpan::Fixed(4), Breakpoint::Tablet), 4);
    assert_eq!(resolve_span(&responsive, Breakpoint::Tablet), 6);
    assert_eq!(resolve_span(&responsive, Breakpoint::Desktop), 12);
    assert_eq!(resolve_span(&ColumnSpan::Fixed(0), Breakpoint::Desktop), 1);
}

#[timeout(5000)]
#[test]
fn test_random_operations_keep_layout_valid() {
    let mut rng = StdRng::seed_from_u64(7);
    let mut engine = engine_with(vec![]);
    let mut clock = Instant::now();

    for _ in 0..300 {
        let ids: Vec<String> = engine
            .document()
            .section_fields("s_main")
            .unwrap()
            .iter()
            .map(|f| f.id.clone())
            .collect();
        let pick = |rng: &mut StdRng| ids[rng.gen_range(0..ids.len())].clone();

        match rng.gen_range(0..6) {
            _ if ids.len() < 2 => {
                engine.add_field("s_main", FieldType::Text).unwrap();
            }
            0 => {
                engine.add_field("s_main", FieldType::Text).unwrap();
            }
            1 => {
                let edge = if rng.gen_bool(0.5) {
                    ResizeEdge::Left
                } else {
                    ResizeEdge::Right
                };
                let id = pick(&mut rng);
                engine
                    .resize_field(&id, edge, rng.gen_range(1..=12), false)
                    .unwrap();
            }
            2 => {
                let id = pick(&mut rng);
                let target = MoveTarget::Cell {
                    section: "s_main".to_string(),
                    row: rng.gen_range(1..=6),
                    column: rng.gen_range(1..=12),
                };
                engine.move_field(&id, &target).unwrap();
            }
            3 => {
                let dragged = pick(&mut rng);
                let target = pick(&mut rng);
                engine
                    .move_field(&dragged, &MoveTarget::Field(target))
                    .unwrap();
            }
            4 if ids.len() > 3 => {
                let id = pick(&mut rng);
                engine.delete_field(&id).unwrap();
            }
            _ => {
                clock += Duration::from_secs(1);
                let id = pick(&mut rng);
                engine.duplicate_field_at(&id, clock).unwrap();
            }
        }
        assert_valid(&engine);
    }
}

#[derive(Debug, Default)]
struct HostState {
    subscribed: bool,
    cursor: Option<CursorStyle>,
    subscriptions: usize,
}

#[derive(Clone, Default)]
struct RecordingHost(Rc<RefCell<HostState>>);

impl PointerHost for RecordingHost {
    fn subscribe_pointer_moves(&mut self) {
        let mut state = self.0.borrow_mut();
        state.subscribed = true;
        state.subscriptions += 1;
    }

    fn unsubscribe_pointer_moves(&mut self) {
        self.0.borrow_mut().subscribed = false;
    }

    fn set_cursor_override(&mut self, cursor: CursorStyle) {
        self.0.borrow_mut().cursor = Some(cursor);
    }

    fn clear_cursor_override(&mut self) {
        self.0.borrow_mut().cursor = None;
    }
}

#[timeout(1000)]
#[test]
fn test_resize_gesture_commits_on_end() {
    let host = RecordingHost::default();
    let mut controller = GestureController::new(host.clone());
    let mut engine = engine_with(vec![text("a", 1, 9, 3)]);

    controller
        .begin_resize(&mut engine, "a", ResizeEdge::Right)
        .unwrap();
    assert!(host.0.borrow().subscribed);
    assert_eq!(host.0.borrow().cursor, Some(CursorStyle::ColumnResize));

    let live = controller.pointer_moved(&mut engine, 14).unwrap().unwrap();
    assert_eq!(live.placement.span, 4);

    let result = controller.end(&mut engine).unwrap().unwrap();
    assert!(matches!(result, GestureResult::Resized(_)));
    assert_eq!(placement(&engine, "a"), (1, 9, 4));
    assert!(!host.0.borrow().subscribed);
    assert_eq!(host.0.borrow().cursor, None);
    assert!(!engine.gesture_active());

    assert!(engine.undo());
    assert_eq!(placement(&engine, "a"), (1, 9, 3));
}

#[timeout(1000)]
#[test]
fn test_left_edge_gesture_tracks_pointer() {
    let mut controller = GestureController::new(RecordingHost::default());
    let mut engine = engine_with(vec![text("a", 1, 5, 4)]);

    controller
        .begin_resize(&mut engine, "a", ResizeEdge::Left)
        .unwrap();
    controller.pointer_moved(&mut engine, 3).unwrap();
    controller.end(&mut engine).unwrap();

    assert_eq!(placement(&engine, "a"), (1, 3, 6));
}

#[timeout(1000)]
#[test]
fn test_cancelled_gesture_restores_layout() {
    let host = RecordingHost::default();
    let mut controller = GestureController::new(host.clone());
    let mut engine = engine_with(vec![text("a", 1, 1, 4), text("b", 1, 5, 4)]);

    controller
        .begin_resize(&mut engine, "a", ResizeEdge::Right)
        .unwrap();
    controller.pointer_moved(&mut engine, 10).unwrap();
    assert!(controller.cancel(&mut engine));

    assert_eq!(placement(&engine, "a"), (1, 1, 4));
    assert!(!engine.can_undo());
    assert!(!host.0.borrow().subscribed);
    assert!(!controller.cancel(&mut engine));
}

#[timeout(1000)]
#[test]
fn test_dropped_controller_layout_restored_before_next_commit() {
    let host = RecordingHost::default();
    let mut engine = engine_with(vec![text("a", 1, 1, 4), text("b", 1, 5, 4)]);
    {
        let mut controller = GestureController::new(host.clone());
        controller
            .begin_resize(&mut engine, "a", ResizeEdge::Right)
            .unwrap();
        controller.pointer_moved(&mut engine, 8).unwrap();
        assert_eq!(placement(&engine, "a"), (1, 1, 8));
    }
    assert!(!host.0.borrow().subscribed);

    let id = engine.add_field("s_main", FieldType::Text).unwrap();

    assert_eq!(placement(&engine, "a"), (1, 1, 4));
    assert_eq!(placement(&engine, "b"), (1, 5, 4));
    assert_eq!(placement(&engine, &id), (1, 9, 4));
    assert!(!engine.gesture_active());
    assert_valid(&engine);

    assert!(engine.undo());
    assert_eq!(placement(&engine, "a"), (1, 1, 4));
    assert!(engine.document().field(&id).is_none());
    assert!(!engine.can_undo());
}

#[timeout(1000)]
#[test]
fn test_live_frames_of_other_field_restored_before_resize() {
    let mut engine = engine_with(vec![text("a", 1, 1, 4), text("b", 1, 5, 4)]);

    engine.resize_field("a", ResizeEdge::Right, 8, true).unwrap();
    engine.resize_field("b", ResizeEdge::Right, 5, false).unwrap();

    assert_eq!(placement(&engine, "a"), (1, 1, 4));
    assert_eq!(placement(&engine, "b"), (1, 5, 5));
    assert_valid(&engine);
}

#[timeout(1000)]
#[test]
fn test_second_gesture_is_busy() {
    let mut controller = GestureController::new(RecordingHost::default());
    let mut engine = engine_with(vec![text("a", 1, 1, 4)]);

    controller.begin_drag(&mut engine, "a").unwrap();

    assert_eq!(
        controller.begin_resize(&mut engine, "a", ResizeEdge::Right),
        Err(FormError::Busy)
    );
}

#[timeout(1000)]
#[test]
fn test_drag_gesture_moves_to_hovered_cell() {
    let host = RecordingHost::default();
    let mut controller = GestureController::new(host.clone());
    let mut engine = engine_with(vec![text("a", 1, 1, 4), text("b", 1, 5, 4)]);

    controller.begin_drag(&mut engine, "a").unwrap();
    assert_eq!(host.0.borrow().cursor, Some(CursorStyle::Grabbing));
    controller.hover(Some(MoveTarget::Cell {
        section: "s_main".to_string(),
        row: 2,
        column: 9,
    }));
    let result = controller.end(&mut engine).unwrap().unwrap();

    assert!(matches!(
        result,
        GestureResult::Moved(MoveOutcome::Placed { .. })
    ));
    assert_eq!(placement(&engine, "a"), (2, 9, 4));
    assert!(!engine.gesture_active());
}

#[timeout(1000)]
#[test]
fn test_drag_released_without_target_changes_nothing() {
    let mut controller = GestureController::new(RecordingHost::default());
    let mut engine = engine_with(vec![text("a", 1, 1, 4)]);

    controller.begin_drag(&mut engine, "a").unwrap();
    let result = controller.end(&mut engine).unwrap();

    assert_eq!(result, Some(GestureResult::Dropped));
    assert!(!engine.can_undo());
    assert_eq!(controller.end(&mut engine).unwrap(), None);
}

#[timeout(1000)]
#[test]
fn test_dropping_active_controller_releases_host() {
    let host = RecordingHost::default();
    let mut engine = engine_with(vec![text("a", 1, 1, 4)]);
    {
        let mut controller = GestureController::new(host.clone());
        controller.begin_drag(&mut engine, "a").unwrap();
        assert!(host.0.borrow().subscribed);
    }

    let state = host.0.borrow();
    assert!(!state.subscribed);
    assert_eq!(state.cursor, None);
    assert_eq!(state.subscriptions, 1);
}
