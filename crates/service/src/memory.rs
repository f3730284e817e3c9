//! In-process backend.
//!
//! Keeps projects, phases, tasks, evidence and per-task display positions in
//! memory behind a mutex. Task listings are sorted by status (board order)
//! and then by persisted position; tasks without a position sort last.

use async_trait::async_trait;
use kanban_core::{Phase, PhaseId, PhaseTask, Project, ProjectId, StatusCode, Task, TaskId};
use std::collections::HashMap;
use tokio::sync::Mutex;
use tracing::debug;

use super::{BoardService, EvidenceFile, Result, ServiceError};

#[derive(Default)]
struct MemoryState {
    statuses: Vec<StatusCode>,
    projects: HashMap<ProjectId, Project>,
    /// Phases in insertion order, with their owning project
    phases: Vec<(ProjectId, Phase)>,
    /// Tasks in insertion order
    tasks: Vec<Task>,
    positions: HashMap<TaskId, usize>,
    evidence: HashMap<TaskId, Vec<EvidenceFile>>,
}

impl MemoryState {
    fn project_of_phase(&self, phase_id: PhaseId) -> Option<ProjectId> {
        self.phases
            .iter()
            .find(|(_, p)| p.id == phase_id)
            .map(|(project_id, _)| *project_id)
    }

    fn phase_with_tasks(&self, phase: &Phase) -> Phase {
        let tasks = self
            .tasks
            .iter()
            .filter(|t| t.phase_id == phase.id)
            .map(|t| PhaseTask {
                id: t.id,
                status: Some(t.status.clone()),
            })
            .collect();
        Phase {
            tasks,
            ..phase.clone()
        }
    }

    fn status_rank(&self, status: &StatusCode) -> usize {
        self.statuses
            .iter()
            .position(|s| s == status)
            .unwrap_or(self.statuses.len())
    }
}

/// In-memory implementation of [`BoardService`].
pub struct InMemoryBoardService {
    state: Mutex<MemoryState>,
}

impl Default for InMemoryBoardService {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryBoardService {
    /// Create an empty backend serving the canonical status codes.
    pub fn new() -> Self {
        Self {
            state: Mutex::new(MemoryState {
                statuses: StatusCode::canonical(),
                ..Default::default()
            }),
        }
    }

    /// Add a project.
    pub fn add_project(&mut self, project: Project) {
        self.state.get_mut().projects.insert(project.id, project);
    }

    /// Add a phase to a project. Nested tasks on the phase are ignored; the
    /// phase's task list is derived from the tasks added to the backend.
    pub fn add_phase(&mut self, project_id: ProjectId, phase: Phase) {
        self.state.get_mut().phases.push((project_id, phase));
    }

    /// Add a task.
    pub fn add_task(&mut self, task: Task) {
        self.state.get_mut().tasks.push(task);
    }

    /// Set a phase's status.
    pub async fn set_phase_status(&self, phase_id: PhaseId, status: kanban_core::PhaseStatus) -> Result<()> {
        let mut state = self.state.lock().await;
        let (_, phase) = state
            .phases
            .iter_mut()
            .find(|(_, p)| p.id == phase_id)
            .ok_or_else(|| ServiceError::NotFound(format!("phase {}", phase_id)))?;
        phase.status = status;
        Ok(())
    }

    /// Current state of a task.
    pub async fn task(&self, task_id: TaskId) -> Option<Task> {
        self.state
            .lock()
            .await
            .tasks
            .iter()
            .find(|t| t.id == task_id)
            .cloned()
    }
}

#[async_trait]
impl BoardService for InMemoryBoardService {
    async fn fetch_status_codes(&self) -> Result<Vec<StatusCode>> {
        Ok(self.state.lock().await.statuses.clone())
    }

    async fn fetch_tasks_for_board(&self, project_id: ProjectId) -> Result<Vec<Task>> {
        let state = self.state.lock().await;
        if !state.projects.contains_key(&project_id) {
            return Err(ServiceError::NotFound(format!("project {}", project_id)));
        }

        let mut tasks: Vec<Task> = state
            .tasks
            .iter()
            .filter(|t| state.project_of_phase(t.phase_id) == Some(project_id))
            .cloned()
            .collect();
        // Stable sort keeps insertion order among unpositioned tasks
        tasks.sort_by_key(|t| {
            (
                state.status_rank(&t.status),
                state.positions.get(&t.id).copied().unwrap_or(usize::MAX),
            )
        });
        Ok(tasks)
    }

    async fn fetch_phases_with_tasks(&self, project_id: ProjectId) -> Result<Vec<Phase>> {
        let state = self.state.lock().await;
        let mut phases: Vec<Phase> = state
            .phases
            .iter()
            .filter(|(owner, _)| *owner == project_id)
            .map(|(_, phase)| state.phase_with_tasks(phase))
            .collect();
        phases.sort_by_key(|p| p.sequence);
        Ok(phases)
    }

    async fn fetch_phase_detail(&self, phase_id: PhaseId) -> Result<Phase> {
        let state = self.state.lock().await;
        state
            .phases
            .iter()
            .find(|(_, p)| p.id == phase_id)
            .map(|(_, phase)| state.phase_with_tasks(phase))
            .ok_or_else(|| ServiceError::NotFound(format!("phase {}", phase_id)))
    }

    async fn fetch_project_detail(&self, project_id: ProjectId) -> Result<Project> {
        self.state
            .lock()
            .await
            .projects
            .get(&project_id)
            .cloned()
            .ok_or_else(|| ServiceError::NotFound(format!("project {}", project_id)))
    }

    async fn update_task_status(&self, task_id: TaskId, status: &StatusCode) -> Result<()> {
        let mut state = self.state.lock().await;
        if !state.statuses.contains(status) {
            return Err(ServiceError::Rejected(format!("unknown status {}", status)));
        }
        let task = state
            .tasks
            .iter_mut()
            .find(|t| t.id == task_id)
            .ok_or_else(|| ServiceError::NotFound(format!("task {}", task_id)))?;
        debug!("task {} {} -> {}", task_id, task.status, status);
        task.status = status.clone();
        Ok(())
    }

    async fn persist_column_order(&self, ordered: &[TaskId]) -> Result<()> {
        let mut state = self.state.lock().await;
        for (position, id) in ordered.iter().enumerate() {
            state.positions.insert(*id, position);
        }
        Ok(())
    }

    async fn has_evidence(&self, task_id: TaskId) -> Result<bool> {
        Ok(self
            .state
            .lock()
            .await
            .evidence
            .get(&task_id)
            .is_some_and(|files| !files.is_empty()))
    }

    async fn upload_evidence(&self, task_id: TaskId, files: &[EvidenceFile]) -> Result<()> {
        let mut state = self.state.lock().await;
        if !state.tasks.iter().any(|t| t.id == task_id) {
            return Err(ServiceError::NotFound(format!("task {}", task_id)));
        }
        state.evidence.entry(task_id).or_default().extend_from_slice(files);
        Ok(())
    }

    async fn clear_evidence(&self, task_id: TaskId) -> Result<()> {
        let mut state = self.state.lock().await;
        if !state.tasks.iter().any(|t| t.id == task_id) {
            return Err(ServiceError::NotFound(format!("task {}", task_id)));
        }
        let removed = state.evidence.remove(&task_id).map_or(0, |files| files.len());
        debug!("Cleared {} evidence file(s) from {}", removed, task_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kanban_core::PhaseStatus;

    fn seeded() -> (InMemoryBoardService, ProjectId, Phase, Vec<Task>) {
        let mut service = InMemoryBoardService::new();
        let project = Project::new("Portal");
        let project_id = project.id;
        let phase = Phase::new("Build", 1, PhaseStatus::InProgress);
        let tasks = vec![
            Task::new("A", StatusCode::PLANNING, phase.id),
            Task::new("B", StatusCode::IN_PROGRESS, phase.id),
            Task::new("C", StatusCode::PLANNING, phase.id),
        ];
        service.add_project(project);
        service.add_phase(project_id, phase.clone());
        for task in &tasks {
            service.add_task(task.clone());
        }
        (service, project_id, phase, tasks)
    }

    #[tokio::test]
    async fn test_tasks_sorted_by_status_then_position() {
        let (service, project_id, _, tasks) = seeded();

        let listed = service.fetch_tasks_for_board(project_id).await.unwrap();
        let names: Vec<_> = listed.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["A", "C", "B"]);

        service.persist_column_order(&[tasks[2].id, tasks[0].id]).await.unwrap();
        let listed = service.fetch_tasks_for_board(project_id).await.unwrap();
        let names: Vec<_> = listed.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["C", "A", "B"]);
    }

    #[tokio::test]
    async fn test_phase_snapshot_counts_tasks() {
        let (service, project_id, phase, _) = seeded();
        let phases = service.fetch_phases_with_tasks(project_id).await.unwrap();
        assert_eq!(phases.len(), 1);
        assert_eq!(phases[0].task_count(), 3);

        let detail = service.fetch_phase_detail(phase.id).await.unwrap();
        assert_eq!(detail.task_count(), 3);
    }

    #[tokio::test]
    async fn test_update_status_rejects_unknown_code() {
        let (service, _, _, tasks) = seeded();
        let err = service
            .update_task_status(tasks[0].id, &StatusCode::new("ARCHIVED"))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Rejected(_)));

        service.update_task_status(tasks[0].id, &StatusCode::IN_REVIEW).await.unwrap();
        assert_eq!(service.task(tasks[0].id).await.unwrap().status, StatusCode::IN_REVIEW);
    }

    #[tokio::test]
    async fn test_evidence_roundtrip() {
        let (service, _, _, tasks) = seeded();
        assert!(!service.has_evidence(tasks[1].id).await.unwrap());
        service
            .upload_evidence(tasks[1].id, &[EvidenceFile::new("shot.png", vec![1, 2, 3])])
            .await
            .unwrap();
        assert!(service.has_evidence(tasks[1].id).await.unwrap());

        let missing = service.upload_evidence(TaskId::new(), &[]).await;
        assert!(matches!(missing, Err(ServiceError::NotFound(_))));

        service.clear_evidence(tasks[1].id).await.unwrap();
        assert!(!service.has_evidence(tasks[1].id).await.unwrap());
        assert!(matches!(
            service.clear_evidence(TaskId::new()).await,
            Err(ServiceError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_unknown_project_is_not_found() {
        let service = InMemoryBoardService::new();
        assert!(matches!(
            service.fetch_tasks_for_board(ProjectId::new()).await,
            Err(ServiceError::NotFound(_))
        ));
    }
}
