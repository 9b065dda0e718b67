//! Form session: answers, navigation and submission.
//!
//! A session interprets one form definition for one respondent. Pages are
//! navigated with `next`, `previous` and `go_to_page`; `next` and
//! `go_to_page` only leave a page once it validates. Submission validates
//! every page and hands the answers to a [`SubmitHandler`]; drafts skip
//! validation entirely. While a submit or draft is in flight the session
//! is busy and refuses every mutation.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use formgrid_core::config::FormConfig;
use formgrid_core::error::{FormError, NodeKind};
use formgrid_core::schema::{
    Breakpoint, FormDefinition, PageDefinition, RepeaterConfig, SectionDefinition,
};

use crate::answers::AnswerMap;
use crate::context::{with_scope, RootContext, ScopeStep};
use crate::handlers::{DraftHandler, SubmitHandler};
use crate::render::{render_page, Actions, FormView, PageTab, Progress, RenderOptions};
use crate::repeater;
use crate::validation::Validator;
use crate::{ErrorMap, Result};

/// How the session treats its answers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Fresh response
    #[default]
    Create,
    /// Existing response loaded as initial answers
    Edit,
    /// Read-only display; no input, no actions
    View,
}

/// Result of a navigation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavOutcome {
    Moved { from: usize, to: usize },
    /// The current page has errors; they are now in the error map
    Blocked { errors: usize },
    /// Nothing to do (first/last page, or already on the target)
    Unchanged,
}

/// First half of a submit.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitStart {
    /// Every page validated; hand these answers to the collaborator
    Ready(AnswerMap),
    /// Validation failed; the session moved to `page`, the first page
    /// holding an error
    Invalid { page: usize, errors: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitStatus {
    Submitted,
    Invalid { page: usize, errors: usize },
}

/// One respondent's interaction with a form.
pub struct FormSession {
    form: FormDefinition,
    /// Logical pages; a single merged page unless the form is multi-page
    pages: Vec<PageDefinition>,
    answers: AnswerMap,
    errors: ErrorMap,
    current: usize,
    mode: Mode,
    busy: bool,
    warning: Option<String>,
    /// Bumped whenever the UI should scroll back to the top
    scroll_resets: u64,
    validator: Validator,
    config: FormConfig,
    submit_handler: Arc<dyn SubmitHandler>,
    draft_handler: Option<Arc<dyn DraftHandler>>,
}

impl FormSession {
    /// Creates a session on the first page.
    ///
    /// # Arguments
    ///
    /// * `form` - Form to interpret
    /// * `answers` - Initial answers, empty for a fresh response
    /// * `mode` - Create, edit or view
    /// * `submit_handler` - Receives the answers on submit
    pub fn new(
        form: FormDefinition,
        answers: AnswerMap,
        mode: Mode,
        submit_handler: Arc<dyn SubmitHandler>,
    ) -> Self {
        let config = FormConfig::default();
        let pages = logical_pages(&form);
        tracing::debug!(
            "Opening form '{}' in {:?} mode with {} page(s)",
            form.id,
            mode,
            pages.len()
        );
        Self {
            form,
            pages,
            answers,
            errors: ErrorMap::new(),
            current: 0,
            mode,
            busy: false,
            warning: None,
            scroll_resets: 0,
            validator: Validator::new(config.default_repeater_max_rows),
            config,
            submit_handler,
            draft_handler: None,
        }
    }

    pub fn with_config(mut self, config: FormConfig) -> Self {
        self.validator = Validator::new(config.default_repeater_max_rows);
        self.config = config;
        self
    }

    pub fn with_draft_handler(mut self, handler: Arc<dyn DraftHandler>) -> Self {
        self.draft_handler = Some(handler);
        self
    }

    pub fn form(&self) -> &FormDefinition {
        &self.form
    }

    pub fn answers(&self) -> &AnswerMap {
        &self.answers
    }

    /// Top-level answer stored under `name`.
    pub fn answer(&self, name: &str) -> Option<&Value> {
        self.answers.get(name)
    }

    pub fn errors(&self) -> &ErrorMap {
        &self.errors
    }

    pub fn current_page(&self) -> usize {
        self.current
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn is_last_page(&self) -> bool {
        self.current + 1 >= self.pages.len()
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    pub fn warning(&self) -> Option<&str> {
        self.warning.as_deref()
    }

    pub fn scroll_resets(&self) -> u64 {
        self.scroll_resets
    }

    /// Returns `true` when the form allows drafts and a draft handler is
    /// attached.
    pub fn drafts_enabled(&self) -> bool {
        self.form.settings.allow_draft && self.draft_handler.is_some()
    }

    fn ensure_editable(&self) -> Result<()> {
        if self.mode == Mode::View {
            return Err(FormError::ReadOnly);
        }
        if self.busy {
            return Err(FormError::Busy);
        }
        Ok(())
    }

    fn ensure_idle(&self) -> Result<()> {
        if self.busy {
            return Err(FormError::Busy);
        }
        Ok(())
    }

    /// Sets a top-level answer and clears its error.
    pub fn set_value(&mut self, name: &str, value: Value) -> Result<()> {
        self.set_value_in(&[], name, value)
    }

    /// Sets an answer inside a nested container or repeater row and
    /// clears its error.
    ///
    /// # Arguments
    ///
    /// * `scope` - Path from the top level to the field's container
    /// * `name` - Field name within that container
    /// * `value` - New answer
    pub fn set_value_in(&mut self, scope: &[ScopeStep], name: &str, value: Value) -> Result<()> {
        self.ensure_editable()?;
        let mut root = RootContext::new(&mut self.answers, &mut self.errors);
        with_scope(&mut root, scope, |ctx| {
            ctx.set(name, value);
            ctx.clear_error(name);
        });
        Ok(())
    }

    /// Adds a row to the repeater `section_id` inside `scope`.
    ///
    /// # Returns
    ///
    /// `Ok(false)` when the repeater is already at its maximum.
    pub fn add_row(&mut self, scope: &[ScopeStep], section_id: &str) -> Result<bool> {
        self.ensure_editable()?;
        let config = self.repeater(section_id)?;
        let mut root = RootContext::new(&mut self.answers, &mut self.errors);
        Ok(with_scope(&mut root, scope, |ctx| {
            repeater::pad_rows(ctx, section_id, &config);
            repeater::add_row(ctx, section_id, &config)
        }))
    }

    /// Removes row `index` of the repeater `section_id` inside `scope`.
    ///
    /// # Returns
    ///
    /// `Ok(false)` when the repeater is already at its minimum.
    pub fn remove_row(&mut self, scope: &[ScopeStep], section_id: &str, index: usize) -> Result<bool> {
        self.ensure_editable()?;
        let config = self.repeater(section_id)?;
        let mut root = RootContext::new(&mut self.answers, &mut self.errors);
        Ok(with_scope(&mut root, scope, |ctx| {
            repeater::pad_rows(ctx, section_id, &config);
            repeater::remove_row(ctx, section_id, &config, index)
        }))
    }

    fn repeater(&self, section_id: &str) -> Result<RepeaterConfig> {
        let mut found: Option<&SectionDefinition> = None;
        self.form.for_each_section(&mut |section| {
            if found.is_none() && section.id == section_id {
                found = Some(section);
            }
        });
        let section = found.ok_or_else(|| FormError::NodeNotFound {
            kind: NodeKind::Section,
            id: section_id.to_string(),
        })?;
        section.repeater(self.config.default_repeater_max_rows).ok_or_else(|| {
            FormError::NotApplicable {
                setting: "rows",
                field_type: "non-repeating section".to_string(),
            }
        })
    }

    /// Validation errors of logical page `index`, computed afresh.
    pub fn page_errors(&mut self, index: usize) -> ErrorMap {
        let mut errors = ErrorMap::new();
        if let Some(page) = self.pages.get(index) {
            let mut root = RootContext::new(&mut self.answers, &mut errors);
            self.validator.validate_page(page, &mut root);
        }
        errors
    }

    /// Validation errors of every page, with the first page holding one.
    pub fn all_errors(&mut self) -> (ErrorMap, Option<usize>) {
        let mut all = ErrorMap::new();
        let mut first = None;
        for index in 0..self.pages.len() {
            let errors = self.page_errors(index);
            if !errors.is_empty() && first.is_none() {
                first = Some(index);
            }
            all.extend(errors);
        }
        (all, first)
    }

    fn move_to(&mut self, to: usize) -> NavOutcome {
        let from = self.current;
        self.current = to;
        self.scroll_resets += 1;
        tracing::debug!("Form '{}' moved from page {} to {}", self.form.id, from, to);
        NavOutcome::Moved { from, to }
    }

    /// Advances one page if the current page validates.
    pub fn next(&mut self) -> Result<NavOutcome> {
        self.ensure_idle()?;
        if self.is_last_page() {
            return Ok(NavOutcome::Unchanged);
        }
        if self.mode != Mode::View {
            let errors = self.page_errors(self.current);
            if !errors.is_empty() {
                let count = errors.len();
                tracing::debug!("Page {} has {} error(s), staying", self.current, count);
                self.errors = errors;
                return Ok(NavOutcome::Blocked { errors: count });
            }
        }
        self.errors.clear();
        self.warning = None;
        Ok(self.move_to(self.current + 1))
    }

    /// Goes back one page.
    ///
    /// Never blocked; errors on the page being left become a warning.
    pub fn previous(&mut self) -> Result<NavOutcome> {
        self.ensure_idle()?;
        if self.current == 0 {
            return Ok(NavOutcome::Unchanged);
        }
        let pending = if self.mode == Mode::View {
            0
        } else {
            self.page_errors(self.current).len()
        };
        self.warning = (pending > 0).then(|| {
            format!("{} field(s) on the previous page still need attention", pending)
        });
        self.errors.clear();
        Ok(self.move_to(self.current - 1))
    }

    /// Jumps to page `target` if the current page validates.
    pub fn go_to_page(&mut self, target: usize) -> Result<NavOutcome> {
        self.ensure_idle()?;
        if target >= self.pages.len() {
            return Err(FormError::NodeNotFound {
                kind: NodeKind::Page,
                id: target.to_string(),
            });
        }
        if target == self.current {
            return Ok(NavOutcome::Unchanged);
        }
        if self.mode != Mode::View {
            let errors = self.page_errors(self.current);
            if !errors.is_empty() {
                let count = errors.len();
                tracing::debug!("Page {} has {} error(s), not switching", self.current, count);
                self.errors = errors;
                return Ok(NavOutcome::Blocked { errors: count });
            }
        }
        self.errors.clear();
        self.warning = None;
        Ok(self.move_to(target))
    }

    /// Validates every page and marks the session busy.
    ///
    /// # Returns
    ///
    /// The answers to hand to the submit collaborator, or the first page
    /// holding an error (the session moves there).
    pub fn begin_submit(&mut self) -> Result<SubmitStart> {
        if self.mode == Mode::View {
            return Err(FormError::ReadOnly);
        }
        self.ensure_idle()?;
        if !self.is_last_page() {
            return Err(FormError::NotOnLastPage);
        }
        let (errors, first) = self.all_errors();
        if let Some(page) = first {
            let count = errors.len();
            tracing::debug!("Submit blocked by {} error(s), first on page {}", count, page);
            self.errors = errors;
            if page != self.current {
                self.move_to(page);
            }
            return Ok(SubmitStart::Invalid {
                page,
                errors: count,
            });
        }
        self.errors.clear();
        self.warning = None;
        self.busy = true;
        Ok(SubmitStart::Ready(self.answers.clone()))
    }

    /// Records the collaborator's verdict and clears the busy state.
    pub fn finish_submit(&mut self, result: anyhow::Result<()>) -> Result<()> {
        self.busy = false;
        match result {
            Ok(()) => {
                tracing::debug!("Form '{}' submitted", self.form.id);
                Ok(())
            }
            Err(e) => {
                tracing::warn!("Submit of form '{}' rejected: {:#}", self.form.id, e);
                Err(FormError::ExternalOperation(format!("{:#}", e)))
            }
        }
    }

    /// Validates every page and submits the answers.
    pub async fn submit(&mut self) -> Result<SubmitStatus> {
        let answers = match self.begin_submit()? {
            SubmitStart::Ready(answers) => answers,
            SubmitStart::Invalid { page, errors } => {
                return Ok(SubmitStatus::Invalid { page, errors });
            }
        };
        let handler = Arc::clone(&self.submit_handler);
        let result = handler.submit(answers).await;
        self.finish_submit(result)?;
        Ok(SubmitStatus::Submitted)
    }

    /// Marks the session busy and returns the answers verbatim.
    pub fn begin_save_draft(&mut self) -> Result<AnswerMap> {
        if self.mode == Mode::View {
            return Err(FormError::ReadOnly);
        }
        if !self.drafts_enabled() {
            return Err(FormError::DraftsDisabled);
        }
        self.ensure_idle()?;
        self.busy = true;
        Ok(self.answers.clone())
    }

    pub fn finish_save_draft(&mut self, result: anyhow::Result<()>) -> Result<()> {
        self.busy = false;
        result.map_err(|e| {
            tracing::warn!("Draft of form '{}' rejected: {:#}", self.form.id, e);
            FormError::ExternalOperation(format!("{:#}", e))
        })
    }

    /// Saves the current answers as a draft without validating.
    pub async fn save_draft(&mut self) -> Result<()> {
        let Some(handler) = self.draft_handler.clone() else {
            return Err(FormError::DraftsDisabled);
        };
        let answers = self.begin_save_draft()?;
        let result = handler.save_draft(answers).await;
        self.finish_save_draft(result)
    }

    /// Builds the view model of the current page.
    ///
    /// Repeaters on the page are padded to their minimum row count.
    pub fn view(&mut self, breakpoint: Breakpoint) -> FormView {
        let read_only = self.mode == Mode::View;
        let options = RenderOptions {
            breakpoint,
            disabled: read_only || self.busy,
            default_max_rows: self.config.default_repeater_max_rows,
        };
        let multi_page = self.form.settings.multi_page;
        let tabs = if multi_page {
            self.pages
                .iter()
                .enumerate()
                .map(|(index, page)| PageTab {
                    index,
                    title: page.title.clone(),
                    active: index == self.current,
                })
                .collect()
        } else {
            Vec::new()
        };
        let progress = (multi_page && self.form.settings.show_progress_bar)
            .then(|| Progress::new(self.current, self.pages.len()));
        let actions = if read_only || self.busy {
            Actions::default()
        } else {
            Actions {
                previous: self.current > 0,
                next: !self.is_last_page(),
                submit: self.is_last_page(),
                save_draft: self.drafts_enabled(),
            }
        };

        let page = match self.pages.get(self.current) {
            Some(page) => {
                let mut root = RootContext::new(&mut self.answers, &mut self.errors);
                Some(render_page(page, &mut root, &options))
            }
            None => None,
        };

        FormView {
            title: self.form.title.clone(),
            description: self.form.description.clone(),
            tabs,
            progress,
            page,
            actions,
            warning: self.warning.clone(),
            busy: self.busy,
            read_only,
        }
    }
}

/// Pages as navigated: the form's pages when multi-page, otherwise one
/// page holding every section.
fn logical_pages(form: &FormDefinition) -> Vec<PageDefinition> {
    if form.settings.multi_page {
        return form.pages.clone();
    }
    let sections = form
        .pages
        .iter()
        .flat_map(|page| page.sections.iter().cloned())
        .collect();
    vec![PageDefinition {
        id: form.id.clone(),
        title: form.title.clone(),
        sections,
    }]
}
