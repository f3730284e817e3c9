//! Review dialog access rules.

use kanban_core::{Project, Role, StatusCode, Task};

use crate::lock::PhaseLocks;
use crate::notice::{Notice, NoticeKind};

/// What the review dialog lets the current user do with a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReviewAccess {
    /// Everything is view-only
    pub read_only: bool,
    /// Evidence may be uploaded
    pub can_upload: bool,
    /// Existing evidence may be cleared
    pub can_clear_evidence: bool,
    /// A working branch may be created
    pub can_create_branch: bool,
    /// The project has a usable repository link
    pub repo_linked: bool,
}

impl ReviewAccess {
    /// Access for `task` given the actor's role and the current phase and
    /// project snapshots.
    pub fn for_task(task: &Task, role: Role, locks: PhaseLocks<'_>, project: Option<&Project>) -> Self {
        let read_only = role.is_elevated() && locks.is_phase_completed(task.phase_id);
        let open_status = [StatusCode::PLANNING, StatusCode::IN_PROGRESS, StatusCode::IN_REVIEW]
            .contains(&task.status);

        Self {
            read_only,
            can_upload: !read_only && open_status,
            can_clear_evidence: !read_only && !locks.is_sequence_locked(task.phase_id),
            can_create_branch: !task.status.is_terminal(),
            repo_linked: project.is_some_and(Project::has_valid_repo),
        }
    }
}

/// Whether the actor may open a task's card. Restricted roles cannot open
/// COMPLETED or CANCELED tasks.
pub fn can_open_task(task: &Task, role: Role) -> Result<(), Notice> {
    if role.is_restricted() && task.status.is_terminal() {
        return Err(Notice::warning(NoticeKind::CannotOpenClosedTask));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use kanban_core::{Phase, PhaseStatus, TaskId};

    fn phases(first: PhaseStatus, second: PhaseStatus, second_tasks: usize) -> Vec<Phase> {
        let mut next = Phase::new("Second", 2, second);
        next.tasks = (0..second_tasks).map(|_| TaskId::new().into()).collect();
        vec![Phase::new("First", 1, first), next]
    }

    #[test]
    fn test_elevated_view_of_completed_phase_is_read_only() {
        let phases = phases(PhaseStatus::Completed, PhaseStatus::Planning, 0);
        let task = Task::new("t", StatusCode::IN_REVIEW, phases[0].id);

        let pm = ReviewAccess::for_task(&task, Role::Pm, PhaseLocks::new(&phases), None);
        assert!(pm.read_only);
        assert!(!pm.can_upload);
        assert!(!pm.can_clear_evidence);
        assert!(pm.can_create_branch);

        let employee = ReviewAccess::for_task(&task, Role::Employee, PhaseLocks::new(&phases), None);
        assert!(!employee.read_only);
        assert!(employee.can_upload);
        assert!(employee.can_clear_evidence);
    }

    #[test]
    fn test_sequence_lock_blocks_clearing_evidence() {
        let phases = phases(PhaseStatus::Completed, PhaseStatus::InProgress, 1);
        let task = Task::new("t", StatusCode::IN_PROGRESS, phases[0].id);
        let access = ReviewAccess::for_task(&task, Role::Hod, PhaseLocks::new(&phases), None);
        assert!(!access.read_only);
        assert!(!access.can_clear_evidence);
        assert!(access.can_upload);
    }

    #[test]
    fn test_terminal_task_cannot_upload_or_branch() {
        let phases = phases(PhaseStatus::InProgress, PhaseStatus::Planning, 0);
        let task = Task::new("t", StatusCode::CANCELED, phases[0].id);
        let access = ReviewAccess::for_task(&task, Role::Admin, PhaseLocks::new(&phases), None);
        assert!(!access.can_upload);
        assert!(!access.can_create_branch);
    }

    #[test]
    fn test_repo_linked() {
        let phases = phases(PhaseStatus::InProgress, PhaseStatus::Planning, 0);
        let task = Task::new("t", StatusCode::PLANNING, phases[0].id);
        let project = Project {
            repo_link: Some("https://github.com/acme/portal".to_string()),
            ..Project::new("Portal")
        };
        let access = ReviewAccess::for_task(&task, Role::Pm, PhaseLocks::new(&phases), Some(&project));
        assert!(access.repo_linked);
    }

    #[test]
    fn test_can_open_task() {
        let done = Task::new("t", StatusCode::COMPLETED, kanban_core::PhaseId::new());
        assert_eq!(
            can_open_task(&done, Role::Employee),
            Err(Notice::warning(NoticeKind::CannotOpenClosedTask))
        );
        assert!(can_open_task(&done, Role::Manager).is_ok());
        let open = done.with_status(StatusCode::IN_PROGRESS);
        assert!(can_open_task(&open, Role::Hod).is_ok());
    }
}
