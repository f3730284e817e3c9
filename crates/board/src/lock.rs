//! Phase lock evaluation.
//!
//! Predicates over a snapshot of a project's phases. Callers must hand in a
//! fresh snapshot for every decision; nothing here is cached.

use kanban_core::{Phase, PhaseId, PhaseStatus, StatusCode};

/// Lock predicates over one phase snapshot.
#[derive(Debug, Clone, Copy)]
pub struct PhaseLocks<'a> {
    phases: &'a [Phase],
}

impl<'a> PhaseLocks<'a> {
    /// Wrap a phase snapshot.
    pub fn new(phases: &'a [Phase]) -> Self {
        Self { phases }
    }

    /// Phase by id.
    pub fn phase(&self, phase_id: PhaseId) -> Option<&'a Phase> {
        self.phases.iter().find(|p| p.id == phase_id)
    }

    /// The phase whose sequence immediately follows `phase_id`'s.
    pub fn next_phase(&self, phase_id: PhaseId) -> Option<&'a Phase> {
        let current = self.phase(phase_id)?;
        let next_sequence = current.sequence.checked_add(1)?;
        self.phases.iter().find(|p| p.sequence == next_sequence)
    }

    /// A completed phase is sequence-locked once its successor is in
    /// progress and has at least one task.
    pub fn is_sequence_locked(&self, phase_id: PhaseId) -> bool {
        let Some(current) = self.phase(phase_id) else {
            return false;
        };
        if current.status != PhaseStatus::Completed {
            return false;
        }
        self.next_phase(phase_id)
            .is_some_and(|next| next.status == PhaseStatus::InProgress && next.task_count() > 0)
    }

    /// Moving a COMPLETED or CANCELED task back to IN_PROGRESS is blocked
    /// unless there is no next phase, or the next phase is still planning
    /// with no tasks.
    pub fn is_backward_to_in_progress_blocked(&self, from: &StatusCode, phase_id: PhaseId) -> bool {
        if !from.is_terminal() {
            return false;
        }
        match self.next_phase(phase_id) {
            None => false,
            Some(next) => !(next.status == PhaseStatus::Planning && next.task_count() == 0),
        }
    }

    /// Whether the phase itself has been completed.
    pub fn is_phase_completed(&self, phase_id: PhaseId) -> bool {
        self.phase(phase_id)
            .is_some_and(|p| p.status == PhaseStatus::Completed)
    }
}
