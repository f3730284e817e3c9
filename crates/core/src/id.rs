//! Unique identifiers for board entities.
//!
//! The backend keys every entity by a numeric database id. Ids minted on
//! this side (sample data, in-process backends) come from a per-type
//! counter and never collide within one process.

use serde::{Deserialize, Serialize};

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Allocate a fresh local identifier
            pub fn new() -> Self {
                static NEXT: std::sync::atomic::AtomicI64 = std::sync::atomic::AtomicI64::new(1);
                Self(NEXT.fetch_add(1, std::sync::atomic::Ordering::Relaxed))
            }

            /// Wrap an id assigned by the backend
            pub const fn from_raw(raw: i64) -> Self {
                Self(raw)
            }

            /// The numeric id
            pub const fn get(self) -> i64 {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl From<i64> for $name {
            fn from(raw: i64) -> Self {
                Self(raw)
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                self.0.fmt(f)
            }
        }

        impl std::str::FromStr for $name {
            type Err = std::num::ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(s.trim().parse()?))
            }
        }
    };
}

define_id!(
    /// Unique identifier for a Task
    TaskId
);

define_id!(
    /// Unique identifier for a Phase
    PhaseId
);

define_id!(
    /// Unique identifier for a Project
    ProjectId
);

define_id!(
    /// Unique identifier for a user account (assignee, project manager)
    UserId
);
