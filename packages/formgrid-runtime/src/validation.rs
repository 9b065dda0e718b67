//! Ordered field validation.
//!
//! Rules run in a fixed order and the first failing rule supplies the
//! field's message: required, min length, max length, pattern, then the
//! type checks (email format, numeric value and its bounds). A configured
//! `message` replaces every default message of the field.

use std::collections::HashMap;

use regex::Regex;
use serde_json::Value;

use formgrid_core::schema::{FieldDefinition, FieldType, PageDefinition, SectionDefinition};

use crate::answers::is_empty_answer;
use crate::context::{DataContext, NestedContext, RowContext};
use crate::repeater::row_count;
use crate::visibility::is_visible;

/// `local@domain.tld` with no whitespace and a single `@`.
const EMAIL_PATTERN: &str = r"^[^\s@]+@[^\s@]+\.[^\s@]+$";

/// Field validator with a cache of compiled patterns.
#[derive(Debug)]
pub struct Validator {
    /// Compiled patterns; `None` for patterns that failed to compile
    patterns: HashMap<String, Option<Regex>>,
    /// Row limit for repeaters stored without config
    default_max_rows: usize,
}

impl Default for Validator {
    fn default() -> Self {
        Self::new(formgrid_core::config::FormConfig::default().default_repeater_max_rows)
    }
}

impl Validator {
    pub fn new(default_max_rows: usize) -> Self {
        Self {
            patterns: HashMap::new(),
            default_max_rows,
        }
    }

    /// Validates one answer against `field`'s rules.
    ///
    /// # Arguments
    ///
    /// * `field` - Field definition holding the rules
    /// * `value` - Current answer, `None` when missing
    ///
    /// # Returns
    ///
    /// The message of the first failing rule, or `None` when the answer
    /// passes.
    pub fn validate_field(&mut self, field: &FieldDefinition, value: Option<&Value>) -> Option<String> {
        let rules = &field.validation;
        let label = if field.label.is_empty() {
            field.name.as_str()
        } else {
            field.label.as_str()
        };
        let fail = |default: String| Some(rules.message.clone().unwrap_or(default));

        if field.field_type == FieldType::Checkbox && field.is_required() {
            return match value {
                Some(Value::Bool(true)) => None,
                _ => fail(format!("{} is required", label)),
            };
        }
        if is_empty_answer(value) {
            return if field.is_required() {
                fail(format!("{} is required", label))
            } else {
                None
            };
        }

        if let Some(Value::String(text)) = value {
            let length = text.chars().count();
            if let Some(min) = rules.min_length {
                if length < min {
                    return fail(format!("{} must be at least {} characters", label, min));
                }
            }
            if let Some(max) = rules.max_length {
                if length > max {
                    return fail(format!("{} must be at most {} characters", label, max));
                }
            }
            if let Some(pattern) = &rules.pattern {
                if let Some(regex) = self.compiled(pattern) {
                    if !regex.is_match(text) {
                        return fail(format!("{} has an invalid format", label));
                    }
                }
            }
            if field.field_type == FieldType::Email {
                let valid = self
                    .compiled(EMAIL_PATTERN)
                    .map_or(true, |regex| regex.is_match(text));
                if !valid {
                    return fail(format!("{} must be a valid email address", label));
                }
            }
        }

        if field.field_type == FieldType::Number {
            let Some(number) = value.and_then(numeric_value) else {
                return fail(format!("{} must be a number", label));
            };
            if let Some(min) = rules.min {
                if number < min {
                    return fail(format!("{} must be at least {}", label, min));
                }
            }
            if let Some(max) = rules.max {
                if number > max {
                    return fail(format!("{} must be at most {}", label, max));
                }
            }
        }
        None
    }

    /// Validates the visible fields of one scope, recording messages in
    /// `ctx` and clearing stale ones.
    ///
    /// Container fields validate their nested sections in the nested
    /// scope.
    pub fn validate_fields(&mut self, fields: &[FieldDefinition], ctx: &mut dyn DataContext) {
        for field in fields {
            if !is_visible(field, ctx) {
                continue;
            }
            match field.field_type {
                FieldType::Section => {
                    if let Some(nested) = &field.section {
                        let mut inner = NestedContext::new(ctx, field.name.as_str());
                        self.validate_section(nested, &mut inner);
                    }
                }
                FieldType::Tab => {
                    let mut inner = NestedContext::new(ctx, field.name.as_str());
                    for page in &field.tabs {
                        self.validate_page(page, &mut inner);
                    }
                }
                FieldType::Info => {}
                _ => {
                    let outcome = self.validate_field(field, ctx.get(&field.name));
                    match outcome {
                        Some(message) => ctx.set_error(&field.name, message),
                        None => ctx.clear_error(&field.name),
                    }
                }
            }
        }
    }

    /// Validates a section; repeater rows validate independently.
    ///
    /// Rows below the minimum count are validated as blank rows.
    pub fn validate_section(&mut self, section: &SectionDefinition, ctx: &mut dyn DataContext) {
        match section.repeater(self.default_max_rows) {
            Some(config) => {
                let rows = row_count(ctx, &section.id).max(config.min_rows);
                for index in 0..rows {
                    let mut row = RowContext::new(ctx, section.id.as_str(), index);
                    self.validate_fields(&section.fields, &mut row);
                }
            }
            None => self.validate_fields(&section.fields, ctx),
        }
    }

    pub fn validate_page(&mut self, page: &PageDefinition, ctx: &mut dyn DataContext) {
        for section in &page.sections {
            self.validate_section(section, ctx);
        }
    }

    fn compiled(&mut self, pattern: &str) -> Option<&Regex> {
        self.patterns
            .entry(pattern.to_string())
            .or_insert_with(|| match Regex::new(pattern) {
                Ok(regex) => Some(regex),
                Err(e) => {
                    tracing::warn!("Skipping invalid validation pattern '{}': {}", pattern, e);
                    None
                }
            })
            .as_ref()
    }
}

/// Numeric reading of an answer: numbers as-is, strings parsed after
/// trimming.
fn numeric_value(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
        _ => None,
    }
}
