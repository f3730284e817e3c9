//! Board Engine
//!
//! Status registry, transition rules, phase locks, the board store and the
//! drag session controller with its reconciliation path.

#![warn(missing_docs)]

mod call;
pub mod config;
pub mod controller;
pub mod lock;
pub mod notice;
pub mod reconcile;
pub mod registry;
pub mod review;
pub mod rules;
pub mod session;
pub mod store;

#[cfg(test)]
mod testing;

pub use config::{BoardConfig, ConfigError};
pub use controller::{BoardController, ControllerError};
pub use lock::PhaseLocks;
pub use notice::{Notice, NoticeKind, NoticeLevel};
pub use reconcile::{fetch_snapshot, BoardScope, BoardSnapshot};
pub use registry::{status_label, LabelLookup, Labels, NoLabels, StatusOption, StatusRegistry};
pub use review::{can_open_task, ReviewAccess};
pub use rules::{allowed_targets, DropPolicy};
pub use session::{
    CommitOutcome, DragSession, DropOutcome, DropTarget, Hover, IgnoreReason, PendingCommit,
    PendingDialog, SessionError,
};
pub use store::{Board, BoardError, Column};
