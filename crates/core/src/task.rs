//! Task model - the unit of work shown as a card on the board.

use serde::{Deserialize, Serialize};
use crate::id::{PhaseId, TaskId, UserId};
use crate::status::StatusCode;
use crate::wire::null_as_default;
use crate::Date;

/// A task as returned by the backend's board listing.
///
/// The board engine only ever rewrites `status` (on a moved copy) and the
/// branch fields (after a branch is created); everything else is owned by
/// the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Unique identifier
    pub id: TaskId,

    /// Task name
    pub name: String,

    /// Detailed description
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,

    /// Current status (board column)
    pub status: StatusCode,

    /// Owning phase
    pub phase_id: PhaseId,

    /// Assigned user
    #[serde(default)]
    pub assignee_id: Option<UserId>,

    /// Assigned user's display name
    #[serde(default)]
    pub assignee_name: Option<String>,

    /// Deadline
    #[serde(default)]
    pub deadline: Option<Date>,

    /// A working branch has been created for this task
    #[serde(default, deserialize_with = "null_as_default")]
    pub branch_created: bool,

    /// Name of the working branch
    #[serde(default)]
    pub github_branch: Option<String>,
}

impl Task {
    /// Create a task with the given name, status and phase.
    pub fn new(name: impl Into<String>, status: StatusCode, phase_id: PhaseId) -> Self {
        Self {
            id: TaskId::new(),
            name: name.into(),
            description: String::new(),
            status,
            phase_id,
            assignee_id: None,
            assignee_name: None,
            deadline: None,
            branch_created: false,
            github_branch: None,
        }
    }

    /// Whether a working branch exists for this task.
    pub fn has_branch(&self) -> bool {
        self.branch_created || self.github_branch.as_deref().is_some_and(|b| !b.is_empty())
    }

    /// Copy of this task with a different status.
    pub fn with_status(&self, status: StatusCode) -> Self {
        Self {
            status,
            ..self.clone()
        }
    }

    /// Case-insensitive match against name, description and assignee name.
    /// `term` must already be lower-cased.
    fn matches_term(&self, term: &str) -> bool {
        self.name.to_lowercase().contains(term)
            || self.description.to_lowercase().contains(term)
            || self
                .assignee_name
                .as_deref()
                .is_some_and(|n| n.to_lowercase().contains(term))
    }
}

/// Client-side filter applied to the fetched task list before grouping.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskFilter {
    /// Keep only tasks of this phase
    pub phase_id: Option<PhaseId>,

    /// Free-text search over name, description and assignee
    pub search: Option<String>,
}

impl TaskFilter {
    /// Whether a task passes the filter.
    pub fn matches(&self, task: &Task) -> bool {
        if let Some(phase_id) = self.phase_id {
            if task.phase_id != phase_id {
                return false;
            }
        }
        match self.search.as_deref().map(str::trim) {
            Some(term) if !term.is_empty() => task.matches_term(&term.to_lowercase()),
            _ => true,
        }
    }

    /// Filter a task list, preserving order.
    pub fn apply(&self, tasks: Vec<Task>) -> Vec<Task> {
        tasks.into_iter().filter(|t| self.matches(t)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_has_branch() {
        let mut task = Task::new("Login page", StatusCode::PLANNING, PhaseId::new());
        assert!(!task.has_branch());

        task.github_branch = Some(String::new());
        assert!(!task.has_branch());

        task.github_branch = Some("feature/login".to_string());
        assert!(task.has_branch());

        task.github_branch = None;
        task.branch_created = true;
        assert!(task.has_branch());
    }

    #[test]
    fn test_filter_by_phase_and_search() {
        let phase_a = PhaseId::new();
        let phase_b = PhaseId::new();
        let mut t1 = Task::new("Build login page", StatusCode::PLANNING, phase_a);
        t1.assignee_name = Some("Linh Tran".to_string());
        let t2 = Task::new("Payroll export", StatusCode::PLANNING, phase_a);
        let t3 = Task::new("Login audit", StatusCode::PLANNING, phase_b);

        let filter = TaskFilter {
            phase_id: Some(phase_a),
            search: Some("LOGIN".to_string()),
        };
        let kept = filter.apply(vec![t1.clone(), t2, t3]);
        assert_eq!(kept, vec![t1.clone()]);

        let by_assignee = TaskFilter {
            phase_id: None,
            search: Some("tran".to_string()),
        };
        assert!(by_assignee.matches(&t1));
    }

    #[test]
    fn test_blank_search_matches_everything() {
        let task = Task::new("Anything", StatusCode::IN_REVIEW, PhaseId::new());
        let filter = TaskFilter {
            phase_id: None,
            search: Some("   ".to_string()),
        };
        assert!(filter.matches(&task));
    }

    #[test]
    fn test_task_wire_format() {
        let task = Task::new("Spec", StatusCode::IN_PROGRESS, PhaseId::new());
        let json = serde_json::to_value(&task).unwrap();
        assert_eq!(json["status"], "IN_PROGRESS");
        assert!(json.get("phaseId").is_some());
        assert_eq!(json["branchCreated"], false);
    }

    #[test]
    fn test_decodes_backend_task_dto() {
        let json = r#"{
            "id": 42,
            "name": "Checkout flow",
            "description": null,
            "imageUrl": null,
            "deadline": "2025-01-31",
            "status": "IN_REVIEW",
            "phaseId": 7,
            "size": "M",
            "hidden": false,
            "totalSubtasks": 3,
            "doneSubtasks": 1,
            "assigneeId": 5,
            "assigneeName": "Linh Tran",
            "assigneeUsername": "linh",
            "githubBranch": null,
            "branchCreated": null,
            "pullRequestUrl": null,
            "merged": null,
            "mergedAt": null
        }"#;
        let task: Task = serde_json::from_str(json).unwrap();

        assert_eq!(task.id, TaskId::from_raw(42));
        assert_eq!(task.phase_id, PhaseId::from_raw(7));
        assert_eq!(task.assignee_id, Some(UserId::from_raw(5)));
        assert_eq!(task.status, StatusCode::IN_REVIEW);
        assert_eq!(task.deadline, Date::from_ymd_opt(2025, 1, 31));
        assert_eq!(task.description, "");
        assert!(!task.branch_created);
        assert!(!task.has_branch());
    }

    #[test]
    fn test_decodes_minimal_task() {
        let task: Task =
            serde_json::from_str(r#"{"id":1,"name":"Bare","status":"PLANNING","phaseId":2}"#).unwrap();
        assert!(task.deadline.is_none());
        assert!(task.assignee_id.is_none());
    }
}
