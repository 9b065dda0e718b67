//! Structural checks on a stored form tree.

use std::collections::HashSet;

use crate::error::{FormError, NodeKind};
use crate::grid::coords::check_layout;

use super::{FormDefinition, PageDefinition, SectionDefinition};

#[derive(Default)]
struct SeenIds<'a> {
    pages: HashSet<&'a str>,
    sections: HashSet<&'a str>,
    fields: HashSet<&'a str>,
}

/// Checks a form tree for grid, naming and id problems.
///
/// Every section, nested ones included, is checked for column bounds,
/// per-row overlap, contiguous rows and unique field names; ids must be
/// unique per node kind across the whole form.
///
/// # Arguments
/// * `form` - Form tree to check
///
/// # Returns
/// Every problem found, in tree order. Empty when the tree is valid.
pub fn check_definition(form: &FormDefinition) -> Vec<FormError> {
    let mut seen = SeenIds::default();
    let mut problems = Vec::new();
    for page in &form.pages {
        check_page(page, &mut seen, &mut problems);
    }
    problems
}

fn check_page<'a>(page: &'a PageDefinition, seen: &mut SeenIds<'a>, problems: &mut Vec<FormError>) {
    if !seen.pages.insert(&page.id) {
        problems.push(FormError::DuplicateId {
            kind: NodeKind::Page,
            id: page.id.clone(),
        });
    }
    for section in &page.sections {
        check_section(section, seen, problems);
    }
}

fn check_section<'a>(
    section: &'a SectionDefinition,
    seen: &mut SeenIds<'a>,
    problems: &mut Vec<FormError>,
) {
    if !seen.sections.insert(&section.id) {
        problems.push(FormError::DuplicateId {
            kind: NodeKind::Section,
            id: section.id.clone(),
        });
    }
    if let Some(reason) = check_layout(&section.fields) {
        problems.push(FormError::InvalidLayout {
            section: section.id.clone(),
            reason,
        });
    }
    if let Some(config) = &section.repeater_config {
        if section.is_repeater() && config.max_rows < config.min_rows {
            problems.push(FormError::InvalidLayout {
                section: section.id.clone(),
                reason: format!(
                    "repeater allows at most {} rows but requires {}",
                    config.max_rows, config.min_rows
                ),
            });
        }
    }

    for field in &section.fields {
        if !seen.fields.insert(&field.id) {
            problems.push(FormError::DuplicateId {
                kind: NodeKind::Field,
                id: field.id.clone(),
            });
        }
        if let Some(nested) = &field.section {
            check_section(nested, seen, problems);
        }
        for page in &field.tabs {
            check_page(page, seen, problems);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{FieldDefinition, FieldType, RepeaterConfig};

    fn form_with(section: SectionDefinition) -> FormDefinition {
        let mut form = FormDefinition::new("form", "Form");
        form.pages
            .push(PageDefinition::new("p_1", "Page").with_section(section));
        form
    }

    #[test]
    fn test_valid_form_has_no_problems() {
        let section = SectionDefinition::new("s_1", "Main")
            .with_field(FieldDefinition::new("f_1", "first", FieldType::Text).at(1, 1))
            .with_field(FieldDefinition::new("f_2", "second", FieldType::Text).at(1, 5));

        assert!(check_definition(&form_with(section)).is_empty());
    }

    #[test]
    fn test_overlap_and_duplicate_id_reported() {
        let mut nested = SectionDefinition::new("s_inner", "Inner")
            .with_field(FieldDefinition::new("f_1", "inner", FieldType::Text).at(1, 1));
        nested.fields[0].grid_column = 11;
        let mut container = FieldDefinition::new("f_box", "box", FieldType::Section).at(1, 3);
        container.section = Some(Box::new(nested));
        let section = SectionDefinition::new("s_1", "Main")
            .with_field(FieldDefinition::new("f_1", "first", FieldType::Text).at(1, 1))
            .with_field(container);

        let problems = check_definition(&form_with(section));

        assert_eq!(problems.len(), 3);
        assert!(matches!(&problems[0], FormError::InvalidLayout { section, .. } if section == "s_1"));
        assert!(matches!(&problems[1], FormError::InvalidLayout { section, .. } if section == "s_inner"));
        assert_eq!(
            problems[2],
            FormError::DuplicateId {
                kind: NodeKind::Field,
                id: "f_1".to_string()
            }
        );
    }

    #[test]
    fn test_inverted_repeater_bounds_reported() {
        let config = RepeaterConfig {
            min_rows: 3,
            max_rows: 1,
            ..RepeaterConfig::default()
        };
        let section = SectionDefinition::new("s_rows", "Rows").repeating(config);

        let problems = check_definition(&form_with(section));

        assert_eq!(problems.len(), 1);
    }
}
