//! Board controller.
//!
//! Owns the board, the phase and project snapshots and the drag session for
//! one actor, and talks to the backend through [`BoardService`]. Every
//! gesture runs to completion against this single owner; the only shared
//! state is on the backend side.

use kanban_core::{Phase, Project, Role, StatusCode, Task, TaskFilter, TaskId};
use kanban_service::{BoardService, EvidenceFile, Result as ServiceResult, ServiceError};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::call::timed;
use crate::config::BoardConfig;
use crate::lock::PhaseLocks;
use crate::notice::{Notice, NoticeKind};
use crate::reconcile::{fetch_snapshot, BoardScope, BoardSnapshot};
use crate::registry::{LabelLookup, NoLabels, StatusRegistry};
use crate::review::{can_open_task, ReviewAccess};
use crate::rules::{allowed_targets, DropPolicy};
use crate::session::{
    CommitOutcome, DragSession, DropOutcome, DropTarget, Hover, IgnoreReason, PendingCommit,
    PendingDialog, SessionError,
};
use crate::store::Board;

/// Errors from dialog operations that also talk to the backend.
#[derive(Debug, thiserror::Error)]
pub enum ControllerError {
    /// The gesture is not valid in the current session state
    #[error("session error: {0}")]
    Session(#[from] SessionError),

    /// The backend call failed
    #[error("service error: {0}")]
    Service(#[from] ServiceError),
}

/// Drives one board for one actor.
pub struct BoardController {
    service: Arc<dyn BoardService>,
    role: Role,
    scope: BoardScope,
    limit: Duration,
    fallback: Vec<StatusCode>,
    registry: StatusRegistry,
    filter: TaskFilter,
    board: Board,
    phases: Vec<Phase>,
    phase_detail: Option<Phase>,
    project: Option<Project>,
    session: DragSession,
    in_flight: HashSet<TaskId>,
}

impl BoardController {
    /// Create a controller with an empty board laid out on the fallback
    /// statuses. Call [`load_statuses`](Self::load_statuses) and
    /// [`refresh`](Self::refresh) to populate it.
    pub fn new(
        service: Arc<dyn BoardService>,
        role: Role,
        scope: BoardScope,
        config: &BoardConfig,
    ) -> Self {
        let fallback = config.fallback_statuses();
        let registry = StatusRegistry::from_codes(fallback.clone(), &NoLabels);
        let board = Board::with_columns(&registry.codes());
        Self {
            service,
            role,
            scope,
            limit: config.call_timeout(),
            fallback,
            registry,
            filter: TaskFilter {
                phase_id: scope.phase_id,
                search: None,
            },
            board,
            phases: Vec::new(),
            phase_detail: None,
            project: None,
            session: DragSession::Idle,
            in_flight: HashSet::new(),
        }
    }

    /// Actor's role.
    pub fn role(&self) -> Role {
        self.role
    }

    /// Board scope.
    pub fn scope(&self) -> BoardScope {
        self.scope
    }

    /// Current board.
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Status columns and their labels.
    pub fn registry(&self) -> &StatusRegistry {
        &self.registry
    }

    /// Latest phase snapshot.
    pub fn phases(&self) -> &[Phase] {
        &self.phases
    }

    /// Latest detail of the selected phase.
    pub fn phase_detail(&self) -> Option<&Phase> {
        self.phase_detail.as_ref()
    }

    /// Latest project detail.
    pub fn project(&self) -> Option<&Project> {
        self.project.as_ref()
    }

    /// Current drag session.
    pub fn session(&self) -> &DragSession {
        &self.session
    }

    /// Active task filter.
    pub fn filter(&self) -> &TaskFilter {
        &self.filter
    }

    /// Whether a move of the task is still being confirmed.
    pub fn is_in_flight(&self, task_id: TaskId) -> bool {
        self.in_flight.contains(&task_id)
    }

    // === Loading ===

    /// Load status codes from the backend, falling back to the configured
    /// set, and lay the board out on them.
    pub async fn load_statuses(&mut self, labels: &dyn LabelLookup) {
        self.registry = StatusRegistry::load(
            self.service.as_ref(),
            labels,
            self.fallback.clone(),
            self.limit,
        )
        .await;
        let tasks = self
            .board
            .columns()
            .iter()
            .flat_map(|c| c.tasks.iter().cloned())
            .collect();
        self.board = Board::group_by_status(tasks, &self.registry.codes());
    }

    /// Fetch tasks, phases, the selected phase and the project, and replace
    /// the held state. Fails only when the task list could not be fetched;
    /// the board is then left as it was.
    pub async fn refresh(&mut self) -> ServiceResult<()> {
        let snapshot = fetch_snapshot(self.service.as_ref(), self.scope, self.limit).await;
        self.apply_snapshot(snapshot)
    }

    /// Change the free-text search and refresh.
    pub async fn set_search(&mut self, search: Option<String>) -> ServiceResult<()> {
        self.filter.search = search.filter(|s| !s.trim().is_empty());
        self.refresh().await
    }

    fn apply_snapshot(&mut self, snapshot: BoardSnapshot) -> ServiceResult<()> {
        if let Ok(phases) = snapshot.phases {
            self.phases = phases;
        }
        match snapshot.phase_detail {
            Some(Ok(phase)) => self.phase_detail = Some(phase),
            Some(Err(_)) => {}
            None => self.phase_detail = None,
        }
        if let Ok(project) = snapshot.project {
            self.project = Some(project);
        }

        let tasks = self.filter.apply(snapshot.tasks?);
        self.board = Board::group_by_status(tasks, &self.registry.codes());
        debug!("Board refreshed: {} tasks", self.board.task_count());
        Ok(())
    }

    async fn refresh_quietly(&mut self) {
        if let Err(e) = self.refresh().await {
            warn!("Board refresh failed: {}", e);
        }
    }

    // === Drag gesture ===

    /// Start dragging a task. Returns a notice when the drag is refused by
    /// the phase lock; the gesture still runs but every drop is turned away.
    pub fn drag_start(&mut self, task_id: TaskId) -> Result<Option<Notice>, SessionError> {
        if self.session.dialog().is_some() {
            return Err(SessionError::DialogOpen);
        }
        if self.in_flight.contains(&task_id) {
            return Err(SessionError::InFlight(task_id));
        }
        let task = self
            .board
            .task(task_id)
            .ok_or(SessionError::UnknownTask(task_id))?;
        let from = task.status.clone();
        let locked = PhaseLocks::new(&self.phases).is_sequence_locked(task.phase_id);

        let (policy, notice) = if self.role.is_restricted() && locked {
            (
                DropPolicy::DenyAll,
                Some(Notice::warning(NoticeKind::PhaseLocked)),
            )
        } else {
            (DropPolicy::Only(allowed_targets(&from, self.role)), None)
        };
        debug!("Drag start {} from {}: {:?}", task_id, from, policy);

        self.session = DragSession::Dragging {
            task_id,
            from,
            policy,
            hover: None,
        };
        Ok(notice)
    }

    /// Track the pointer. Returns the hover position when the target is a
    /// column the drag may end in.
    pub fn drag_over(&mut self, target: Option<&DropTarget>) -> Option<Hover> {
        let next = match (&self.session, target) {
            (DragSession::Dragging { policy, .. }, Some(target)) => self
                .resolve_column(target)
                .filter(|column| policy.permits(column))
                .map(|column| Hover {
                    index: self.hover_index(&column, target),
                    column,
                }),
            _ => None,
        };
        if let DragSession::Dragging { hover, .. } = &mut self.session {
            *hover = next.clone();
        }
        next
    }

    /// End the drag over `target` (`None` when released outside any target).
    ///
    /// The drop policy and hover state are cleared whatever the outcome. A
    /// [`DropOutcome::Moved`] result has already changed the board and marked
    /// the task in flight; it must be passed to [`commit`](Self::commit) or
    /// [`abandon`](Self::abandon), or the task can never be dragged again.
    pub async fn end_drag(&mut self, target: Option<DropTarget>) -> DropOutcome {
        let (task_id, from, policy) = match std::mem::take(&mut self.session) {
            DragSession::Dragging {
                task_id,
                from,
                policy,
                ..
            } => (task_id, from, policy),
            other => {
                self.session = other;
                return DropOutcome::Ignored(IgnoreReason::NoDrag);
            }
        };

        let outcome = self.evaluate_drop(task_id, from, policy, target).await;
        match &outcome {
            DropOutcome::Ignored(reason) => debug!("Drop of {} ignored: {:?}", task_id, reason),
            DropOutcome::Rejected(notice) => info!("Drop of {} rejected: {:?}", task_id, notice.kind),
            DropOutcome::ConfirmCancel(_) => debug!("Drop of {} awaits cancel confirmation", task_id),
            DropOutcome::ReviewRequired(_) => debug!("Drop of {} needs review evidence", task_id),
            DropOutcome::Moved(pending) => {
                debug!("Drop of {} applied: {} -> {}", task_id, pending.from, pending.to)
            }
        }
        outcome
    }

    async fn evaluate_drop(
        &mut self,
        task_id: TaskId,
        from: StatusCode,
        policy: DropPolicy,
        target: Option<DropTarget>,
    ) -> DropOutcome {
        let Some(target) = target else {
            return DropOutcome::Ignored(IgnoreReason::NoTarget);
        };
        let Some(to) = self.resolve_column(&target) else {
            return DropOutcome::Ignored(IgnoreReason::UnresolvedColumn);
        };
        if !self.board.has_column(&from) {
            return DropOutcome::Ignored(IgnoreReason::UnresolvedColumn);
        }

        if self.role.is_restricted() && to == StatusCode::CANCELED {
            return DropOutcome::Rejected(Notice::error(NoticeKind::NoPermissionCanceled));
        }
        if !policy.permits(&to) {
            return DropOutcome::Ignored(IgnoreReason::NotPermitted);
        }

        let Some(task) = self
            .board
            .column(&from)
            .and_then(|tasks| tasks.iter().find(|t| t.id == task_id))
            .cloned()
        else {
            return DropOutcome::Ignored(IgnoreReason::StaleTask);
        };

        let locks = PhaseLocks::new(&self.phases);
        if to == StatusCode::IN_REVIEW && from.is_terminal() {
            return DropOutcome::Rejected(Notice::warning(NoticeKind::ReviewFromTerminal));
        }
        if to == StatusCode::IN_PROGRESS
            && locks.is_backward_to_in_progress_blocked(&from, task.phase_id)
        {
            return DropOutcome::Rejected(Notice::warning(
                NoticeKind::InProgressBlockedByNextPhase,
            ));
        }
        // Elevated roles may still cancel out of a locked phase
        let cancel_escape = to == StatusCode::CANCELED && self.role.is_elevated();
        if from != to && locks.is_sequence_locked(task.phase_id) && !cancel_escape {
            return DropOutcome::Rejected(Notice::warning(NoticeKind::PhaseLocked));
        }

        if to == StatusCode::CANCELED && from != to {
            self.session = DragSession::AwaitingConfirmation(PendingDialog::ConfirmCancel {
                task: task.clone(),
            });
            return DropOutcome::ConfirmCancel(task);
        }
        if to == StatusCode::IN_REVIEW && from != to && !self.has_review_prerequisite(&task).await {
            self.session = DragSession::AwaitingConfirmation(PendingDialog::Review {
                task: task.clone(),
                promote_on_success: true,
            });
            return DropOutcome::ReviewRequired(task);
        }

        let index = match &target {
            DropTarget::Item { task_id: over, .. } => self
                .board
                .column(&to)
                .and_then(|tasks| tasks.iter().position(|t| t.id == *over)),
            DropTarget::Column(_) => None,
        };
        let next = match self.board.move_across_columns(task_id, &from, &to, index) {
            Ok(next) => next,
            Err(e) => {
                debug!("Optimistic move discarded: {}", e);
                return DropOutcome::Ignored(IgnoreReason::StaleTask);
            }
        };
        let before = std::mem::replace(&mut self.board, next);
        self.in_flight.insert(task_id);

        DropOutcome::Moved(PendingCommit {
            task_id,
            order: self.board.task_ids(&to),
            from,
            to,
            before,
        })
    }

    fn resolve_column(&self, target: &DropTarget) -> Option<StatusCode> {
        let column = match target {
            DropTarget::Column(status) => Some(status.clone()),
            DropTarget::Item { task_id, container } => container
                .clone()
                .or_else(|| self.board.locate(*task_id).map(|(status, _)| status.clone())),
        };
        column.filter(|status| self.board.has_column(status))
    }

    fn hover_index(&self, column: &StatusCode, target: &DropTarget) -> usize {
        let tasks = self.board.column(column).unwrap_or_default();
        match target {
            DropTarget::Item { task_id, .. } => tasks
                .iter()
                .position(|t| t.id == *task_id)
                .unwrap_or(tasks.len()),
            DropTarget::Column(_) => tasks.len(),
        }
    }

    async fn has_review_prerequisite(&self, task: &Task) -> bool {
        if task.has_branch() {
            return true;
        }
        match timed(self.limit, self.service.has_evidence(task.id)).await {
            Ok(found) => found,
            Err(e) => {
                warn!("Evidence lookup for {} failed: {}", task.id, e);
                false
            }
        }
    }

    // === Confirmation ===

    /// Confirm an optimistic move with the backend: the status update when
    /// the column changed, then the destination column's order. Success
    /// refreshes everything; any failure reconciles from a full fetch.
    pub async fn commit(&mut self, pending: PendingCommit) -> CommitOutcome {
        let outcome = match self.confirm(&pending).await {
            Ok(()) => {
                info!("Task {} moved {} -> {}", pending.task_id, pending.from, pending.to);
                self.refresh_quietly().await;
                CommitOutcome::Confirmed
            }
            Err(e) => {
                warn!("Move of {} not confirmed, reconciling: {}", pending.task_id, e);
                self.reconcile(pending.before).await
            }
        };
        self.in_flight.remove(&pending.task_id);
        outcome
    }

    /// Drop an optimistic move without contacting the backend: the board
    /// goes back to its state before the move and the task may be dragged
    /// again.
    pub fn abandon(&mut self, pending: PendingCommit) {
        debug!("Move of {} abandoned", pending.task_id);
        self.board = pending.before;
        self.in_flight.remove(&pending.task_id);
    }

    async fn confirm(&self, pending: &PendingCommit) -> ServiceResult<()> {
        if pending.changes_status() {
            timed(
                self.limit,
                self.service.update_task_status(pending.task_id, &pending.to),
            )
            .await?;
        }
        timed(self.limit, self.service.persist_column_order(&pending.order)).await
    }

    async fn reconcile(&mut self, before: Board) -> CommitOutcome {
        let snapshot = fetch_snapshot(self.service.as_ref(), self.scope, self.limit).await;
        match self.apply_snapshot(snapshot) {
            Ok(()) => CommitOutcome::Reconciled,
            Err(e) => {
                warn!("Reconciliation fetch failed, restoring board: {}", e);
                self.board = before;
                CommitOutcome::Restored
            }
        }
    }

    // === Dialogs ===

    /// Accept the open cancel confirmation: cancel the task on the backend
    /// and refresh.
    pub async fn confirm_cancel(&mut self) -> Result<CommitOutcome, SessionError> {
        let task = match std::mem::take(&mut self.session) {
            DragSession::AwaitingConfirmation(PendingDialog::ConfirmCancel { task }) => task,
            other => {
                self.session = other;
                return Err(SessionError::NoDialog);
            }
        };

        self.in_flight.insert(task.id);
        let result = timed(
            self.limit,
            self.service.update_task_status(task.id, &StatusCode::CANCELED),
        )
        .await;
        let outcome = match result {
            Ok(()) => {
                info!("Task {} canceled", task.id);
                self.refresh_quietly().await;
                CommitOutcome::Confirmed
            }
            Err(e) => {
                warn!("Cancel of {} failed, reconciling: {}", task.id, e);
                let before = self.board.clone();
                self.reconcile(before).await
            }
        };
        self.in_flight.remove(&task.id);
        Ok(outcome)
    }

    /// Close the open dialog. Closing the review dialog always refreshes.
    pub async fn dismiss_dialog(&mut self, refresh: bool) -> Result<(), SessionError> {
        let dialog = match std::mem::take(&mut self.session) {
            DragSession::AwaitingConfirmation(dialog) => dialog,
            other => {
                self.session = other;
                return Err(SessionError::NoDialog);
            }
        };
        if refresh || matches!(dialog, PendingDialog::Review { .. }) {
            self.refresh_quietly().await;
        }
        Ok(())
    }

    /// Open a task's review dialog from a card click. Restricted roles get a
    /// notice instead for COMPLETED and CANCELED tasks.
    pub fn open_task(&mut self, task_id: TaskId) -> Result<Option<Notice>, SessionError> {
        if self.session.dialog().is_some() {
            return Err(SessionError::DialogOpen);
        }
        let task = self
            .board
            .task(task_id)
            .ok_or(SessionError::UnknownTask(task_id))?;
        if let Err(notice) = can_open_task(task, self.role) {
            return Ok(Some(notice));
        }
        self.session = DragSession::AwaitingConfirmation(PendingDialog::Review {
            task: task.clone(),
            promote_on_success: false,
        });
        Ok(None)
    }

    /// Access rules for the task in the open review dialog.
    pub fn review_access(&self) -> Option<ReviewAccess> {
        let Some(PendingDialog::Review { task, .. }) = self.session.dialog() else {
            return None;
        };
        let task = self.board.task(task.id).unwrap_or(task);
        Some(ReviewAccess::for_task(
            task,
            self.role,
            PhaseLocks::new(&self.phases),
            self.project.as_ref(),
        ))
    }

    /// Upload evidence from the review dialog and close it. When the dialog
    /// was opened by a drop into IN_REVIEW the task is promoted and the
    /// promotion's outcome returned; otherwise the board is refreshed.
    ///
    /// A failed upload leaves the dialog open.
    pub async fn evidence_uploaded(
        &mut self,
        files: &[EvidenceFile],
    ) -> Result<Option<CommitOutcome>, ControllerError> {
        let Some(PendingDialog::Review {
            task,
            promote_on_success,
        }) = self.session.dialog()
        else {
            return Err(SessionError::NoDialog.into());
        };
        let (task_id, promote) = (task.id, *promote_on_success);

        timed(self.limit, self.service.upload_evidence(task_id, files)).await?;
        info!("Uploaded {} evidence file(s) for {}", files.len(), task_id);
        self.session = DragSession::Idle;

        if promote {
            return Ok(Some(self.promote_to_review(task_id).await));
        }
        self.refresh_quietly().await;
        Ok(None)
    }

    /// Remove all evidence from the task in the open review dialog. Returns
    /// `false` without calling the backend when the dialog is read-only or
    /// the task's phase is sequence-locked. The dialog stays open.
    pub async fn clear_evidence(&mut self) -> Result<bool, ControllerError> {
        let task_id = match self.session.dialog() {
            Some(PendingDialog::Review { task, .. }) => task.id,
            _ => return Err(SessionError::NoDialog.into()),
        };
        if !self.review_access().is_some_and(|access| access.can_clear_evidence) {
            debug!("Evidence of {} cannot be cleared", task_id);
            return Ok(false);
        }

        timed(self.limit, self.service.clear_evidence(task_id)).await?;
        info!("Cleared evidence of {}", task_id);
        Ok(true)
    }

    /// Record a branch created for a task. Promotes the task when the open
    /// review dialog is waiting on it; otherwise refreshes.
    pub async fn branch_created(
        &mut self,
        task_id: TaskId,
        branch: impl Into<String>,
    ) -> Option<CommitOutcome> {
        let branch = branch.into();
        if let Some(next) = self.board.update_task(task_id, |task| {
            task.branch_created = true;
            task.github_branch = Some(branch);
        }) {
            self.board = next;
        }

        let promote = matches!(
            self.session.dialog(),
            Some(PendingDialog::Review { task, promote_on_success: true }) if task.id == task_id
        );
        if promote {
            self.session = DragSession::Idle;
            return Some(self.promote_to_review(task_id).await);
        }
        self.refresh_quietly().await;
        None
    }

    async fn promote_to_review(&mut self, task_id: TaskId) -> CommitOutcome {
        let review = StatusCode::IN_REVIEW;
        let before = self.board.clone();
        let from = self.board.locate(task_id).map(|(status, _)| status.clone());
        if let Some(from) = from {
            match self.board.move_across_columns(task_id, &from, &review, None) {
                Ok(next) => self.board = next,
                Err(e) => debug!("Optimistic promotion skipped: {}", e),
            }
        }

        self.in_flight.insert(task_id);
        let outcome = match timed(self.limit, self.service.update_task_status(task_id, &review)).await {
            Ok(()) => {
                info!("Task {} promoted to review", task_id);
                self.refresh_quietly().await;
                CommitOutcome::Confirmed
            }
            Err(e) => {
                warn!("Promotion of {} failed, reconciling: {}", task_id, e);
                self.reconcile(before).await
            }
        };
        self.in_flight.remove(&task_id);
        outcome
    }
}
