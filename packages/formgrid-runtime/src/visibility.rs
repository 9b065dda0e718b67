//! Conditional field visibility.

use serde_json::Value;

use formgrid_core::schema::FieldDefinition;

use crate::context::DataContext;

/// Returns `true` when `field` should be shown in `ctx`.
///
/// A field with a `dependsOn` rule is shown only while the answer stored
/// under the rule's field name in the same scope equals the rule's value.
/// A missing answer never matches, not even a `null` rule value. Hidden
/// fields are skipped by rendering and validation.
pub fn is_visible(field: &FieldDefinition, ctx: &dyn DataContext) -> bool {
    match &field.depends_on {
        None => true,
        Some(rule) => ctx
            .get(&rule.field)
            .is_some_and(|answer| values_match(answer, &rule.value)),
    }
}

/// Strict equality between an answer and a rule value.
///
/// Numbers compare by value, so `1` matches `1.0`; there is no coercion
/// between types.
pub fn values_match(answer: &Value, expected: &Value) -> bool {
    match (answer, expected) {
        (Value::Number(a), Value::Number(b)) => match (a.as_f64(), b.as_f64()) {
            (Some(a), Some(b)) => a == b,
            _ => a == b,
        },
        _ => answer == expected,
    }
}
