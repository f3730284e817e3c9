//! Phase model - ordered stages of a project.

use serde::{Deserialize, Serialize};
use crate::id::{PhaseId, TaskId};
use crate::status::StatusCode;
use crate::wire::null_as_default;

/// A phase snapshot, as returned by the phases-with-tasks listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Phase {
    /// Unique identifier
    pub id: PhaseId,

    /// Phase name
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,

    /// Position within the project; phases are totally ordered by this
    #[serde(default, deserialize_with = "null_as_default")]
    pub sequence: i32,

    /// Phase status
    pub status: PhaseStatus,

    /// Tasks in this phase
    #[serde(default, deserialize_with = "null_as_default")]
    pub tasks: Vec<PhaseTask>,
}

impl Phase {
    /// Create a phase with no tasks.
    pub fn new(name: impl Into<String>, sequence: i32, status: PhaseStatus) -> Self {
        Self {
            id: PhaseId::new(),
            name: name.into(),
            sequence,
            status,
            tasks: Vec::new(),
        }
    }

    /// Number of tasks in this phase.
    pub fn task_count(&self) -> usize {
        self.tasks.len()
    }
}

/// Phase status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PhaseStatus {
    Planning,
    InProgress,
    Completed,
    Canceled,
}

/// Minimal view of a task nested in a phase snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhaseTask {
    /// Task identifier
    pub id: TaskId,

    /// Task status, when the backend includes it
    #[serde(default)]
    pub status: Option<StatusCode>,
}

impl From<TaskId> for PhaseTask {
    fn from(id: TaskId) -> Self {
        Self { id, status: None }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decodes_backend_phase_dto() {
        let json = r#"{
            "id": 3,
            "name": "Build",
            "deadline": "2025-03-01",
            "status": "IN_PROGRESS",
            "sequence": 2,
            "startedAt": "2025-01-10T09:00:00",
            "projectId": 1,
            "tasks": [
                {"id": 42, "name": "Checkout flow", "status": "PLANNING", "phaseId": 3, "branchCreated": null}
            ],
            "displayName": "Phase 2",
            "progress": 40
        }"#;
        let phase: Phase = serde_json::from_str(json).unwrap();

        assert_eq!(phase.id, PhaseId::from_raw(3));
        assert_eq!(phase.status, PhaseStatus::InProgress);
        assert_eq!(phase.sequence, 2);
        assert_eq!(phase.tasks[0].id, TaskId::from_raw(42));
        assert_eq!(phase.tasks[0].status, Some(StatusCode::PLANNING));
    }

    #[test]
    fn test_null_task_list_is_empty() {
        let phase: Phase =
            serde_json::from_str(r#"{"id":1,"name":null,"status":"PLANNING","sequence":1,"tasks":null}"#)
                .unwrap();
        assert_eq!(phase.task_count(), 0);
        assert!(phase.name.is_empty());
    }
}
