//! Backend service trait.

use async_trait::async_trait;
use kanban_core::{Phase, PhaseId, Project, ProjectId, StatusCode, Task, TaskId};
use std::time::Duration;

/// Result type for service calls.
pub type Result<T> = std::result::Result<T, ServiceError>;

/// Errors that can occur while talking to the backend.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// Transport error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success HTTP status
    #[error("backend returned {status}: {message}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Response body or message
        message: String,
    },

    /// Response body could not be decoded
    #[error("JSON error: {0}")]
    Decode(#[from] serde_json::Error),

    /// The call did not finish in time
    #[error("call timed out after {0:?}")]
    Timeout(Duration),

    /// Item not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// The backend refused the operation
    #[error("rejected: {0}")]
    Rejected(String),

    /// Other error
    #[error("{0}")]
    Other(String),
}

/// A file attached to a task as review evidence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvidenceFile {
    /// File name
    pub name: String,

    /// MIME type, if known
    pub content_type: Option<String>,

    /// File contents
    pub bytes: Vec<u8>,
}

impl EvidenceFile {
    /// Create an evidence file.
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            content_type: None,
            bytes,
        }
    }
}

/// Backend operations the board depends on.
///
/// Every call may fail; the board treats any failure of a confirming call
/// as a signal to rebuild its state from scratch.
#[async_trait]
pub trait BoardService: Send + Sync {
    // === Metadata ===

    /// Configured status codes, in board order.
    async fn fetch_status_codes(&self) -> Result<Vec<StatusCode>>;

    // === Snapshots ===

    /// Tasks visible on the board for a project, in persisted display order.
    async fn fetch_tasks_for_board(&self, project_id: ProjectId) -> Result<Vec<Task>>;

    /// Phases of a project, each with its tasks.
    async fn fetch_phases_with_tasks(&self, project_id: ProjectId) -> Result<Vec<Phase>>;

    /// A single phase.
    async fn fetch_phase_detail(&self, phase_id: PhaseId) -> Result<Phase>;

    /// A single project.
    async fn fetch_project_detail(&self, project_id: ProjectId) -> Result<Project>;

    // === Mutations ===

    /// Set a task's status. The only authoritative status mutation.
    async fn update_task_status(&self, task_id: TaskId, status: &StatusCode) -> Result<()>;

    /// Persist display order for one column.
    async fn persist_column_order(&self, ordered: &[TaskId]) -> Result<()>;

    // === Evidence ===

    /// Whether any review evidence is attached to a task.
    async fn has_evidence(&self, task_id: TaskId) -> Result<bool>;

    /// Attach review evidence to a task.
    async fn upload_evidence(&self, task_id: TaskId, files: &[EvidenceFile]) -> Result<()>;

    /// Remove all review evidence attached to a task.
    async fn clear_evidence(&self, task_id: TaskId) -> Result<()>;
}
