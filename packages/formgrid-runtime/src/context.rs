//! Scoped access to answers and errors.
//!
//! Every container kind stores its answers differently: top-level fields
//! write straight into the answer map, a nested section or tab container
//! writes into an object stored under its field name, and a repeater row
//! writes into one element of an array stored under the section id. A
//! [`DataContext`] hides those differences from the renderer and the
//! validator, and contexts stack so a repeater inside a nested section
//! inside a repeater row reads and writes the right slot.

use serde_json::Value;

use crate::answers::{array_slot, object_slot, AnswerMap};
use crate::ErrorMap;

/// Read/write view of one container's answers and errors.
pub trait DataContext {
    /// Answers of this scope, `None` while nothing has been stored.
    fn values(&self) -> Option<&AnswerMap>;

    /// Answers of this scope, created in the parent on demand.
    fn values_mut(&mut self) -> &mut AnswerMap;

    /// Error map key for `name` in this scope.
    fn error_key(&self, name: &str) -> String;

    fn errors(&self) -> &ErrorMap;

    fn errors_mut(&mut self) -> &mut ErrorMap;

    /// Answer stored under `name`.
    fn get(&self, name: &str) -> Option<&Value> {
        self.values().and_then(|values| values.get(name))
    }

    /// Stores `value` under `name`.
    fn set(&mut self, name: &str, value: Value) {
        self.values_mut().insert(name.to_string(), value);
    }

    /// Validation message recorded for `name`.
    fn error(&self, name: &str) -> Option<&str> {
        self.errors().get(&self.error_key(name)).map(String::as_str)
    }

    fn set_error(&mut self, name: &str, message: String) {
        let key = self.error_key(name);
        self.errors_mut().insert(key, message);
    }

    fn clear_error(&mut self, name: &str) {
        let key = self.error_key(name);
        self.errors_mut().remove(&key);
    }
}

/// Top-level scope over the whole answer map.
pub struct RootContext<'a> {
    answers: &'a mut AnswerMap,
    errors: &'a mut ErrorMap,
}

impl<'a> RootContext<'a> {
    pub fn new(answers: &'a mut AnswerMap, errors: &'a mut ErrorMap) -> Self {
        Self { answers, errors }
    }
}

impl DataContext for RootContext<'_> {
    fn values(&self) -> Option<&AnswerMap> {
        Some(&*self.answers)
    }

    fn values_mut(&mut self) -> &mut AnswerMap {
        &mut *self.answers
    }

    fn error_key(&self, name: &str) -> String {
        name.to_string()
    }

    fn errors(&self) -> &ErrorMap {
        &*self.errors
    }

    fn errors_mut(&mut self) -> &mut ErrorMap {
        &mut *self.errors
    }
}

/// Scope of a nested section or tab container field.
///
/// Answers live in an object stored under the container's field name in
/// the parent scope; error keys are `parent.name`.
pub struct NestedContext<'p> {
    parent: &'p mut dyn DataContext,
    field: String,
}

impl<'p> NestedContext<'p> {
    pub fn new(parent: &'p mut dyn DataContext, field: impl Into<String>) -> Self {
        Self {
            parent,
            field: field.into(),
        }
    }
}

impl DataContext for NestedContext<'_> {
    fn values(&self) -> Option<&AnswerMap> {
        self.parent.get(&self.field).and_then(Value::as_object)
    }

    fn values_mut(&mut self) -> &mut AnswerMap {
        let slot = self
            .parent
            .values_mut()
            .entry(self.field.clone())
            .or_insert(Value::Null);
        object_slot(slot)
    }

    fn error_key(&self, name: &str) -> String {
        format!("{}.{}", self.parent.error_key(&self.field), name)
    }

    fn errors(&self) -> &ErrorMap {
        self.parent.errors()
    }

    fn errors_mut(&mut self) -> &mut ErrorMap {
        self.parent.errors_mut()
    }
}

/// Scope of one repeater row.
///
/// Rows are an array of objects stored under the repeater's section id;
/// error keys are `sectionId.index.name`.
pub struct RowContext<'p> {
    parent: &'p mut dyn DataContext,
    section_id: String,
    index: usize,
}

impl<'p> RowContext<'p> {
    pub fn new(parent: &'p mut dyn DataContext, section_id: impl Into<String>, index: usize) -> Self {
        Self {
            parent,
            section_id: section_id.into(),
            index,
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }
}

impl DataContext for RowContext<'_> {
    fn values(&self) -> Option<&AnswerMap> {
        self.parent
            .get(&self.section_id)
            .and_then(Value::as_array)
            .and_then(|rows| rows.get(self.index))
            .and_then(Value::as_object)
    }

    fn values_mut(&mut self) -> &mut AnswerMap {
        let slot = self
            .parent
            .values_mut()
            .entry(self.section_id.clone())
            .or_insert(Value::Null);
        let rows = array_slot(slot);
        if rows.len() <= self.index {
            rows.resize_with(self.index + 1, || Value::Object(AnswerMap::new()));
        }
        object_slot(&mut rows[self.index])
    }

    fn error_key(&self, name: &str) -> String {
        format!(
            "{}.{}.{}",
            self.parent.error_key(&self.section_id),
            self.index,
            name
        )
    }

    fn errors(&self) -> &ErrorMap {
        self.parent.errors()
    }

    fn errors_mut(&mut self) -> &mut ErrorMap {
        self.parent.errors_mut()
    }
}

/// One step from a scope into a child scope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScopeStep {
    /// Into the container field with this name
    Nested(String),
    /// Into row `index` of the repeater section with this id
    Row { section: String, index: usize },
}

/// Runs `f` on the scope reached from `ctx` by following `scope`.
pub fn with_scope<R>(
    ctx: &mut dyn DataContext,
    scope: &[ScopeStep],
    f: impl FnOnce(&mut dyn DataContext) -> R,
) -> R {
    match scope.split_first() {
        None => f(ctx),
        Some((ScopeStep::Nested(field), rest)) => {
            let mut inner = NestedContext::new(ctx, field.as_str());
            with_scope(&mut inner, rest, f)
        }
        Some((ScopeStep::Row { section, index }, rest)) => {
            let mut inner = RowContext::new(ctx, section.as_str(), *index);
            with_scope(&mut inner, rest, f)
        }
    }
}
