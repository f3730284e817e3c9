//! Kanban core data models.
//!
//! This crate defines the data structures shared by the board engine and
//! the backend clients: identifiers, the configured task status codes,
//! actor roles, and the task, phase and project snapshots returned by the
//! backend.

#![warn(missing_docs)]

// Core identities
mod id;

// Status and permissions
mod status;
mod role;

// Snapshots
mod task;
mod phase;
mod project;

// Wire helpers
mod wire;

// Re-exports
pub use id::*;

pub use status::StatusCode;
pub use role::{ParseRoleError, Role};

pub use task::{Task, TaskFilter};
pub use phase::{Phase, PhaseStatus, PhaseTask};
pub use project::Project;

/// Calendar date type (deadlines)
pub type Date = chrono::NaiveDate;
