//! External submit and draft collaborators.

use async_trait::async_trait;

use crate::answers::AnswerMap;

/// Receives the answers of a validated form.
///
/// A rejection is reported to the session's caller; the session stays
/// editable and keeps its answers.
#[async_trait]
pub trait SubmitHandler: Send + Sync {
    async fn submit(&self, answers: AnswerMap) -> anyhow::Result<()>;
}

/// Stores unvalidated answers as a draft.
#[async_trait]
pub trait DraftHandler: Send + Sync {
    async fn save_draft(&self, answers: AnswerMap) -> anyhow::Result<()>;
}
