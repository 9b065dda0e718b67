//! Form runtime interpreter
//!
//! Renders a form tree against an answer map: conditional visibility,
//! ordered field validation, repeater rows, nested data scopes, page
//! navigation and the external submit/draft collaborators.

use std::collections::BTreeMap;

use formgrid_core::error::FormError;

mod answers;
mod context;
mod handlers;
mod render;
mod repeater;
mod session;
mod validation;
mod visibility;

pub use answers::{is_empty_answer, AnswerMap};
pub use context::{with_scope, DataContext, NestedContext, RootContext, RowContext, ScopeStep};
pub use handlers::{DraftHandler, SubmitHandler};
pub use render::{
    Actions, FieldView, FormView, NestedView, PageTab, PageView, Progress, RowView, SectionBody,
    SectionView, TabView,
};
pub use repeater::{add_row, pad_rows, remove_row, row_count};
pub use session::{FormSession, Mode, NavOutcome, SubmitStart, SubmitStatus};
pub use validation::Validator;
pub use visibility::{is_visible, values_match};

/// Result type for runtime operations
pub type Result<T> = std::result::Result<T, FormError>;

/// Validation messages keyed by scoped field path
pub type ErrorMap = BTreeMap<String, String>;
