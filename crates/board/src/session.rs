//! Drag session state.
//!
//! One gesture at a time: the controller is either idle, tracking a drag, or
//! waiting on a dialog that a drop redirected to.

use kanban_core::{StatusCode, Task, TaskId};

use crate::notice::Notice;
use crate::rules::DropPolicy;
use crate::store::Board;

/// Errors raised when a gesture cannot start.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SessionError {
    /// The task is not on the board
    #[error("task {0} is not on the board")]
    UnknownTask(TaskId),

    /// A previous move of the task is still being confirmed
    #[error("task {0} has a move in flight")]
    InFlight(TaskId),

    /// A dialog is waiting for an answer
    #[error("a dialog is open")]
    DialogOpen,

    /// No dialog is waiting for an answer
    #[error("no dialog is open")]
    NoDialog,
}

/// Where the pointer currently is during a drag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hover {
    /// Hovered column
    pub column: StatusCode,
    /// Insertion index within the column
    pub index: usize,
}

/// A dialog the board is waiting on.
#[derive(Debug, Clone, PartialEq)]
pub enum PendingDialog {
    /// Confirm moving a task to CANCELED
    ConfirmCancel {
        /// Task to cancel
        task: Task,
    },
    /// Review dialog: evidence upload and branch creation
    Review {
        /// Task under review
        task: Task,
        /// Move the task to IN_REVIEW once evidence or a branch exists
        promote_on_success: bool,
    },
}

impl PendingDialog {
    /// The task the dialog is about.
    pub fn task(&self) -> &Task {
        match self {
            PendingDialog::ConfirmCancel { task } | PendingDialog::Review { task, .. } => task,
        }
    }
}

/// State of the drag gesture.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum DragSession {
    /// No gesture in progress
    #[default]
    Idle,
    /// A task is being dragged
    Dragging {
        /// Dragged task
        task_id: TaskId,
        /// Status captured when the drag started
        from: StatusCode,
        /// Columns the drag may end in
        policy: DropPolicy,
        /// Current hover position, if over a valid column
        hover: Option<Hover>,
    },
    /// A drop opened a dialog
    AwaitingConfirmation(PendingDialog),
}

impl DragSession {
    /// Whether the session is idle.
    pub fn is_idle(&self) -> bool {
        matches!(self, DragSession::Idle)
    }

    /// The current hover position.
    pub fn hover(&self) -> Option<&Hover> {
        match self {
            DragSession::Dragging { hover, .. } => hover.as_ref(),
            _ => None,
        }
    }

    /// The open dialog.
    pub fn dialog(&self) -> Option<&PendingDialog> {
        match self {
            DragSession::AwaitingConfirmation(dialog) => Some(dialog),
            _ => None,
        }
    }
}

/// What the pointer is over, already converted from the gesture library's
/// payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropTarget {
    /// A column container
    Column(StatusCode),
    /// A card; `container` is the column it sits in, when known
    Item {
        /// Hovered card
        task_id: TaskId,
        /// Column holding the card
        container: Option<StatusCode>,
    },
}

/// Why a drop was dropped without telling the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    /// No drag was in progress
    NoDrag,
    /// The gesture ended outside any target
    NoTarget,
    /// Source or destination column is not on the board
    UnresolvedColumn,
    /// The drop policy refuses the destination
    NotPermitted,
    /// The task is no longer where the drag found it
    StaleTask,
}

/// Result of ending a drag.
#[derive(Debug, Clone, PartialEq)]
#[must_use]
pub enum DropOutcome {
    /// Nothing happened
    Ignored(IgnoreReason),
    /// The move was refused; show the notice
    Rejected(Notice),
    /// A cancel confirmation dialog is open for the task
    ConfirmCancel(Task),
    /// The review dialog is open for the task
    ReviewRequired(Task),
    /// The board was changed optimistically; pass this to `commit`
    Moved(PendingCommit),
}

/// An optimistic move waiting for backend confirmation.
#[derive(Debug, Clone, PartialEq)]
#[must_use]
pub struct PendingCommit {
    /// Moved task
    pub task_id: TaskId,
    /// Source column
    pub from: StatusCode,
    /// Destination column
    pub to: StatusCode,
    /// Destination column order after the move
    pub order: Vec<TaskId>,
    /// Board before the move
    pub(crate) before: Board,
}

impl PendingCommit {
    /// Whether the move changes the task's status.
    pub fn changes_status(&self) -> bool {
        self.from != self.to
    }
}

/// How a commit ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitOutcome {
    /// Backend confirmed; metadata refreshed
    Confirmed,
    /// A confirming call failed; board rebuilt from a fresh fetch
    Reconciled,
    /// A confirming call failed and the fresh fetch failed too; board
    /// restored to its state before the move
    Restored,
}
