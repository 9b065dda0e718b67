//! Interchange tests
//!
//! Form files written by older builders are loaded, edited and saved.

use tempfile::tempdir;

use formgrid_core::config::FormConfig;
use formgrid_core::grid::ResizeEdge;
use formgrid_core::interchange::{load_form, normalize_definition, save_form, to_json_string};
use formgrid_core::schema::validation::check_definition;
use formgrid_core::{FormError, LayoutEngine};

const STORED: &str = r#"{
  "id": "survey",
  "title": "Survey",
  "settings": {"multiPage": true, "showProgressBar": true},
  "pages": [
    {"id": "p_1", "title": "About you", "sections": [
      {"id": "s_1", "title": "Basics", "fields": [
        {"id": "f_name", "name": "name", "type": "text", "required": true},
        {"id": "f_age", "name": "age", "type": "number", "columnSpan": 4,
         "validation": {"min": 18, "max": 99}}
      ]},
      {"id": "s_2", "title": "Pets", "type": "repeater",
       "repeaterConfig": {"minRows": 1, "maxRows": 3},
       "fields": [
        {"id": "f_pet", "name": "pet", "type": "text", "columnSpan": 6, "gridRow": 1, "gridColumn": 1}
      ]}
    ]},
    {"id": "p_2", "title": "Opinion", "sections": [
      {"id": "s_3", "title": "Feedback", "fields": [
        {"id": "f_rating", "name": "rating", "type": "radio_group", "options": ["1", "2", "3"]}
      ]}
    ]}
  ]
}"#;

#[test]
fn test_load_edit_save_cycle() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("survey.json");
    std::fs::write(&path, STORED).unwrap();

    let form = load_form(&path).unwrap();
    assert!(check_definition(&form).is_empty());
    let repeater = form.pages[0].sections[1]
        .repeater(FormConfig::default().default_repeater_max_rows)
        .unwrap();
    assert_eq!(repeater.bounds(), (1, 3));
    assert_eq!(repeater.add_label, "Add row");

    let mut engine = LayoutEngine::from_definition(&form, FormConfig::default()).unwrap();
    engine
        .resize_field("f_age", ResizeEdge::Right, 6, false)
        .unwrap();
    save_form(&path, &engine.to_definition()).unwrap();

    let reloaded = load_form(&path).unwrap();
    assert_eq!(reloaded, engine.to_definition());
    let age = &reloaded.pages[0].sections[0].fields[1];
    assert_eq!(age.validation.min, Some(18.0));
    assert_eq!(age.column_span.desktop(), 6);
}

#[test]
fn test_normalize_is_idempotent() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("survey.json");
    std::fs::write(&path, STORED).unwrap();
    let mut form = load_form(&path).unwrap();

    normalize_definition(&mut form);
    let once = to_json_string(&form).unwrap();
    let report = normalize_definition(&mut form);

    assert!(report.is_clean());
    assert_eq!(to_json_string(&form).unwrap(), once);
}

#[test]
fn test_malformed_file_is_parse_error() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("broken.json");
    std::fs::write(&path, "{\"id\": \"x\", \"pages\": [").unwrap();

    assert!(matches!(load_form(&path), Err(FormError::Parse(_))));
}
