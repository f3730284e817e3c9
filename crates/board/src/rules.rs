//! Transition rule table.
//!
//! Single-hop status moves a drag may perform, by source status and role.

use kanban_core::{Role, StatusCode};
use std::collections::BTreeSet;

/// Statuses reachable from `from` by one drag, for `role`.
///
/// Contains `from` itself (the no-op move). `IN_REVIEW` is never reachable
/// from a terminal status. For restricted roles `COMPLETED` and `CANCELED`
/// are removed last, including when one of them is `from`. Unknown source
/// codes only allow the no-op move.
pub fn allowed_targets(from: &StatusCode, role: Role) -> BTreeSet<StatusCode> {
    let mut targets = BTreeSet::new();
    targets.insert(from.clone());

    let edges = match from.as_str() {
        "PLANNING" => vec![StatusCode::IN_PROGRESS, StatusCode::IN_REVIEW, StatusCode::CANCELED],
        "IN_PROGRESS" => vec![StatusCode::IN_REVIEW, StatusCode::CANCELED],
        "IN_REVIEW" => vec![StatusCode::COMPLETED, StatusCode::CANCELED, StatusCode::IN_PROGRESS],
        "COMPLETED" => vec![StatusCode::IN_PROGRESS],
        "CANCELED" => vec![StatusCode::PLANNING, StatusCode::IN_PROGRESS],
        _ => Vec::new(),
    };
    targets.extend(edges);

    if from.is_terminal() {
        targets.remove(&StatusCode::IN_REVIEW);
    }
    if role.is_restricted() {
        targets.remove(&StatusCode::COMPLETED);
        targets.remove(&StatusCode::CANCELED);
    }
    targets
}

/// Per-gesture restriction on which columns a drag may end in.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DropPolicy {
    /// No restriction (the cleared state between gestures)
    #[default]
    Unrestricted,
    /// Every column is refused
    DenyAll,
    /// Only these columns are accepted
    Only(BTreeSet<StatusCode>),
}

impl DropPolicy {
    /// Whether a drop into `column` is allowed.
    pub fn permits(&self, column: &StatusCode) -> bool {
        match self {
            DropPolicy::Unrestricted => true,
            DropPolicy::DenyAll => false,
            DropPolicy::Only(allowed) => allowed.contains(column),
        }
    }
}
