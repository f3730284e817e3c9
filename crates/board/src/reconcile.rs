//! Full-refresh reconciliation.
//!
//! The board never repairs itself piecemeal: after a failed confirmation
//! every derived snapshot is fetched again, concurrently, and replaces what
//! the controller holds.

use kanban_core::{Phase, PhaseId, Project, ProjectId, Task};
use kanban_service::{BoardService, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

use crate::call::timed;

/// Which slice of the backend the board shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardScope {
    /// Project whose tasks are shown
    pub project_id: ProjectId,
    /// Selected phase, if the view is narrowed to one
    pub phase_id: Option<PhaseId>,
}

impl BoardScope {
    /// Whole-project scope.
    pub fn project(project_id: ProjectId) -> Self {
        Self {
            project_id,
            phase_id: None,
        }
    }

    /// Narrow the scope to one phase.
    pub fn with_phase(self, phase_id: PhaseId) -> Self {
        Self {
            phase_id: Some(phase_id),
            ..self
        }
    }
}

/// Result of one full fetch. Each part succeeds or fails on its own.
#[derive(Debug)]
pub struct BoardSnapshot {
    /// Flat task list
    pub tasks: Result<Vec<Task>>,
    /// Phases with their tasks
    pub phases: Result<Vec<Phase>>,
    /// Selected phase; `None` when the scope has no phase
    pub phase_detail: Option<Result<Phase>>,
    /// Project detail
    pub project: Result<Project>,
}

impl BoardSnapshot {
    /// Whether every part of the snapshot was fetched.
    pub fn is_complete(&self) -> bool {
        self.tasks.is_ok()
            && self.phases.is_ok()
            && self.project.is_ok()
            && self.phase_detail.as_ref().map_or(true, |r| r.is_ok())
    }
}

/// Fetch tasks, phases, the selected phase and the project concurrently.
pub async fn fetch_snapshot(service: &dyn BoardService, scope: BoardScope, limit: Duration) -> BoardSnapshot {
    debug!("Fetching board snapshot for {}", scope.project_id);
    let phase_detail = async {
        match scope.phase_id {
            Some(phase_id) => Some(timed(limit, service.fetch_phase_detail(phase_id)).await),
            None => None,
        }
    };
    let (tasks, phases, phase_detail, project) = tokio::join!(
        timed(limit, service.fetch_tasks_for_board(scope.project_id)),
        timed(limit, service.fetch_phases_with_tasks(scope.project_id)),
        phase_detail,
        timed(limit, service.fetch_project_detail(scope.project_id)),
    );

    if let Err(e) = &tasks {
        warn!("Failed to fetch tasks for {}: {}", scope.project_id, e);
    }
    if let Err(e) = &phases {
        warn!("Failed to fetch phases for {}: {}", scope.project_id, e);
    }
    if let Some(Err(e)) = &phase_detail {
        warn!("Failed to fetch phase detail: {}", e);
    }
    if let Err(e) = &project {
        warn!("Failed to fetch project {}: {}", scope.project_id, e);
    }
    BoardSnapshot {
        tasks,
        phases,
        phase_detail,
        project,
    }
}
