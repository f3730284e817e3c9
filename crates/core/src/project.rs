//! Project model - the scope a board is opened for.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use crate::id::{ProjectId, UserId};
use crate::wire::null_as_default;

/// A project detail snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    /// Unique identifier
    pub id: ProjectId,

    /// Project name
    pub name: String,

    /// Description
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,

    /// Project manager
    #[serde(default)]
    pub pm_id: Option<UserId>,

    /// Linked repository URL
    #[serde(default)]
    pub repo_link: Option<String>,
}

fn repo_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"(?i)^https://github\.com/([^/\s]+)/([^/\s]+)/?$").ok())
        .as_ref()
}

impl Project {
    /// Create a project without a linked repository.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: ProjectId::new(),
            name: name.into(),
            description: String::new(),
            pm_id: None,
            repo_link: None,
        }
    }

    /// `(owner, repo)` when the repository link is a GitHub
    /// `https://github.com/<owner>/<repo>` URL.
    pub fn github_repo(&self) -> Option<(String, String)> {
        let link = self.repo_link.as_deref()?.trim();
        let caps = repo_pattern()?.captures(link)?;
        Some((caps[1].to_string(), caps[2].to_string()))
    }

    /// Whether the project has a usable repository link.
    pub fn has_valid_repo(&self) -> bool {
        self.github_repo().is_some()
    }
}
