//! User-visible notices produced by rejected gestures.

use serde::{Deserialize, Serialize};

/// Severity of a notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    /// Permission violation
    Error,
    /// Business-rule violation
    Warning,
}

/// Why a gesture was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NoticeKind {
    /// Restricted role tried to cancel a task
    NoPermissionCanceled,
    /// Task's phase is sequence-locked
    PhaseLocked,
    /// COMPLETED/CANCELED task dropped into IN_REVIEW
    ReviewFromTerminal,
    /// Next phase already started, task cannot go back to IN_PROGRESS
    InProgressBlockedByNextPhase,
    /// Restricted role tried to open a closed task
    CannotOpenClosedTask,
}

impl NoticeKind {
    /// Translation key of the message.
    pub fn message_key(self) -> &'static str {
        match self {
            NoticeKind::NoPermissionCanceled => "errors.noPermissionChangeCanceled",
            NoticeKind::PhaseLocked => "errors.phaseLockedEditing",
            NoticeKind::ReviewFromTerminal => "errors.cannotMoveToInReviewFromDoneOrCanceled",
            NoticeKind::InProgressBlockedByNextPhase => {
                "errors.cannotMoveToInProgressNextPhaseNotPlanning"
            }
            NoticeKind::CannotOpenClosedTask => "errors.viewCompletedNotAllowed",
        }
    }

    /// English message used when no translation is available.
    pub fn default_message(self) -> &'static str {
        match self {
            NoticeKind::NoPermissionCanceled => "You do not have permission to cancel tasks.",
            NoticeKind::PhaseLocked => {
                "This phase is locked because the next phase is already in progress."
            }
            NoticeKind::ReviewFromTerminal => {
                "Completed or canceled tasks cannot be moved to review."
            }
            NoticeKind::InProgressBlockedByNextPhase => {
                "The next phase has already started; this task cannot be reopened."
            }
            NoticeKind::CannotOpenClosedTask => "You cannot open a completed or canceled task.",
        }
    }
}

/// A notification to show the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    /// Severity
    pub level: NoticeLevel,
    /// Reason
    pub kind: NoticeKind,
}

impl Notice {
    /// Error-level notice.
    pub fn error(kind: NoticeKind) -> Self {
        Self {
            level: NoticeLevel::Error,
            kind,
        }
    }

    /// Warning-level notice.
    pub fn warning(kind: NoticeKind) -> Self {
        Self {
            level: NoticeLevel::Warning,
            kind,
        }
    }
}

impl std::fmt::Display for Notice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.kind.default_message())
    }
}
