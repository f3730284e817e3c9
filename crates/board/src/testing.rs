//! Recording backend used by the board tests.

use async_trait::async_trait;
use kanban_core::{Phase, PhaseId, PhaseStatus, Project, ProjectId, StatusCode, Task, TaskId};
use kanban_service::{BoardService, EvidenceFile, Result, ServiceError};
use std::collections::HashSet;
use std::time::Duration;
use tokio::sync::Mutex;

/// A backend call, as seen by the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Statuses,
    Tasks(ProjectId),
    Phases(ProjectId),
    PhaseDetail(PhaseId),
    ProjectDetail(ProjectId),
    UpdateStatus(TaskId, StatusCode),
    PersistOrder(Vec<TaskId>),
    HasEvidence(TaskId),
    UploadEvidence(TaskId, usize),
    ClearEvidence(TaskId),
}

#[derive(Default)]
struct State {
    statuses: Option<Vec<StatusCode>>,
    project: Option<Project>,
    phases: Vec<Phase>,
    tasks: Vec<Task>,
    evidence: HashSet<TaskId>,
    fail_tasks: bool,
    fail_phases: bool,
    fail_status_update: bool,
    fail_persist: bool,
    fail_evidence: bool,
    status_update_delay: Option<Duration>,
    calls: Vec<Call>,
}

/// In-memory backend that records every call and can be told to fail.
pub struct RecordingService {
    state: Mutex<State>,
}

impl RecordingService {
    pub fn new() -> Self {
        Self::from_state(State::default())
    }

    /// A project with its phases and the given tasks.
    pub fn seeded(project: Project, phases: Vec<Phase>, tasks: Vec<Task>) -> Self {
        Self::from_state(State {
            project: Some(project),
            phases,
            tasks,
            ..State::default()
        })
    }

    fn from_state(state: State) -> Self {
        Self {
            state: Mutex::new(State {
                statuses: Some(StatusCode::canonical()),
                ..state
            }),
        }
    }

    pub async fn set_statuses(&self, statuses: Vec<StatusCode>) {
        self.state.lock().await.statuses = Some(statuses);
    }

    pub async fn fail_statuses(&self) {
        self.state.lock().await.statuses = None;
    }

    pub async fn fail_tasks(&self, fail: bool) {
        self.state.lock().await.fail_tasks = fail;
    }

    pub async fn fail_phases(&self, fail: bool) {
        self.state.lock().await.fail_phases = fail;
    }

    pub async fn fail_status_update(&self) {
        self.state.lock().await.fail_status_update = true;
    }

    pub async fn fail_persist(&self) {
        self.state.lock().await.fail_persist = true;
    }

    pub async fn fail_evidence(&self) {
        self.state.lock().await.fail_evidence = true;
    }

    pub async fn delay_status_update(&self, delay: Duration) {
        self.state.lock().await.status_update_delay = Some(delay);
    }

    pub async fn add_evidence(&self, task_id: TaskId) {
        self.state.lock().await.evidence.insert(task_id);
    }

    pub async fn set_phase_status(&self, phase_id: PhaseId, status: PhaseStatus) {
        let mut state = self.state.lock().await;
        if let Some(phase) = state.phases.iter_mut().find(|p| p.id == phase_id) {
            phase.status = status;
        }
    }

    pub async fn calls(&self) -> Vec<Call> {
        self.state.lock().await.calls.clone()
    }

    pub async fn clear_calls(&self) {
        self.state.lock().await.calls.clear();
    }

    /// Only the calls that change backend state.
    pub async fn mutations(&self) -> Vec<Call> {
        self.calls()
            .await
            .into_iter()
            .filter(|c| {
                matches!(
                    c,
                    Call::UpdateStatus(..)
                        | Call::PersistOrder(_)
                        | Call::UploadEvidence(..)
                        | Call::ClearEvidence(_)
                )
            })
            .collect()
    }

    pub async fn backend_task(&self, task_id: TaskId) -> Option<Task> {
        self.state
            .lock()
            .await
            .tasks
            .iter()
            .find(|t| t.id == task_id)
            .cloned()
    }

    async fn record(&self, call: Call) {
        self.state.lock().await.calls.push(call);
    }
}

#[async_trait]
impl BoardService for RecordingService {
    async fn fetch_status_codes(&self) -> Result<Vec<StatusCode>> {
        self.record(Call::Statuses).await;
        self.state
            .lock()
            .await
            .statuses
            .clone()
            .ok_or_else(|| ServiceError::Other("statuses unavailable".to_string()))
    }

    async fn fetch_tasks_for_board(&self, project_id: ProjectId) -> Result<Vec<Task>> {
        self.record(Call::Tasks(project_id)).await;
        let state = self.state.lock().await;
        if state.fail_tasks {
            return Err(ServiceError::Other("tasks unavailable".to_string()));
        }
        Ok(state.tasks.clone())
    }

    async fn fetch_phases_with_tasks(&self, project_id: ProjectId) -> Result<Vec<Phase>> {
        self.record(Call::Phases(project_id)).await;
        let state = self.state.lock().await;
        if state.fail_phases {
            return Err(ServiceError::Other("phases unavailable".to_string()));
        }
        Ok(state.phases.clone())
    }

    async fn fetch_phase_detail(&self, phase_id: PhaseId) -> Result<Phase> {
        self.record(Call::PhaseDetail(phase_id)).await;
        self.state
            .lock()
            .await
            .phases
            .iter()
            .find(|p| p.id == phase_id)
            .cloned()
            .ok_or_else(|| ServiceError::NotFound(format!("phase {}", phase_id)))
    }

    async fn fetch_project_detail(&self, project_id: ProjectId) -> Result<Project> {
        self.record(Call::ProjectDetail(project_id)).await;
        self.state
            .lock()
            .await
            .project
            .clone()
            .filter(|p| p.id == project_id)
            .ok_or_else(|| ServiceError::NotFound(format!("project {}", project_id)))
    }

    async fn update_task_status(&self, task_id: TaskId, status: &StatusCode) -> Result<()> {
        self.record(Call::UpdateStatus(task_id, status.clone())).await;
        let delay = self.state.lock().await.status_update_delay;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        let mut state = self.state.lock().await;
        if state.fail_status_update {
            return Err(ServiceError::Rejected("status update refused".to_string()));
        }
        if let Some(task) = state.tasks.iter_mut().find(|t| t.id == task_id) {
            task.status = status.clone();
        }
        Ok(())
    }

    async fn persist_column_order(&self, ordered: &[TaskId]) -> Result<()> {
        self.record(Call::PersistOrder(ordered.to_vec())).await;
        let mut state = self.state.lock().await;
        if state.fail_persist {
            return Err(ServiceError::Status {
                status: 500,
                message: "order not saved".to_string(),
            });
        }
        // Keep the backend listing in the persisted order
        let mut positioned: Vec<Task> = Vec::new();
        for id in ordered {
            if let Some(index) = state.tasks.iter().position(|t| t.id == *id) {
                positioned.push(state.tasks.remove(index));
            }
        }
        state.tasks.extend(positioned);
        Ok(())
    }

    async fn has_evidence(&self, task_id: TaskId) -> Result<bool> {
        self.record(Call::HasEvidence(task_id)).await;
        let state = self.state.lock().await;
        if state.fail_evidence {
            return Err(ServiceError::Other("evidence lookup failed".to_string()));
        }
        Ok(state.evidence.contains(&task_id))
    }

    async fn upload_evidence(&self, task_id: TaskId, files: &[EvidenceFile]) -> Result<()> {
        self.record(Call::UploadEvidence(task_id, files.len())).await;
        self.state.lock().await.evidence.insert(task_id);
        Ok(())
    }

    async fn clear_evidence(&self, task_id: TaskId) -> Result<()> {
        self.record(Call::ClearEvidence(task_id)).await;
        self.state.lock().await.evidence.remove(&task_id);
        Ok(())
    }
}
