//! Status registry.
//!
//! Loads the configured status codes once and resolves their display
//! labels. Any failure to load falls back to a fixed list; there are no
//! retries.

use kanban_core::StatusCode;
use kanban_service::BoardService;
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::time::Duration;
use tracing::{debug, warn};

use crate::call::timed;

/// Translation lookup for label keys such as `statusLabel.IN_REVIEW`.
pub trait LabelLookup: Send + Sync {
    /// Translated text for `key`, or `None` when no translation is available.
    fn lookup(&self, key: &str) -> Option<String>;
}

/// Lookup that never translates.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoLabels;

impl LabelLookup for NoLabels {
    fn lookup(&self, _key: &str) -> Option<String> {
        None
    }
}

/// Flat translation catalog keyed by dotted paths.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Labels {
    entries: HashMap<String, String>,
}

impl Labels {
    /// Build a catalog from a JSON document. Nested objects are flattened
    /// into dotted keys, so `{"statusLabel": {"PLANNING": "Plan"}}` yields
    /// `statusLabel.PLANNING`.
    pub fn from_json(value: &Value) -> Self {
        let mut entries = HashMap::new();
        flatten("", value, &mut entries);
        Self { entries }
    }

    /// Number of translated keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the catalog is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn flatten(prefix: &str, value: &Value, out: &mut HashMap<String, String>) {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                let path = if prefix.is_empty() {
                    key.clone()
                } else {
                    format!("{}.{}", prefix, key)
                };
                flatten(&path, child, out);
            }
        }
        Value::String(text) if !prefix.is_empty() => {
            out.insert(prefix.to_string(), text.clone());
        }
        _ => {}
    }
}

impl LabelLookup for Labels {
    fn lookup(&self, key: &str) -> Option<String> {
        self.entries.get(key).filter(|t| !t.is_empty()).cloned()
    }
}

impl LabelLookup for HashMap<String, String> {
    fn lookup(&self, key: &str) -> Option<String> {
        self.get(key).cloned()
    }
}

/// A status code with its display label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusOption {
    /// Status code
    pub code: StatusCode,
    /// Display label
    pub label: String,
}

/// Ordered set of loaded status codes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusRegistry {
    options: Vec<StatusOption>,
    from_fallback: bool,
}

/// Label for a code: the translation when one exists and differs from the
/// key, otherwise the humanized code.
pub fn status_label(code: &StatusCode, labels: &dyn LabelLookup) -> String {
    let key = code.label_key();
    match labels.lookup(&key) {
        Some(text) if text != key => text,
        _ => code.humanize(),
    }
}

impl StatusRegistry {
    /// Build a registry from known codes. A repeated code keeps its first
    /// position.
    pub fn from_codes(codes: Vec<StatusCode>, labels: &dyn LabelLookup) -> Self {
        let mut seen = HashSet::new();
        let options = codes
            .into_iter()
            .filter(|code| seen.insert(code.clone()))
            .map(|code| StatusOption {
                label: status_label(&code, labels),
                code,
            })
            .collect();
        Self {
            options,
            from_fallback: false,
        }
    }

    /// Load codes from the backend; any error or an empty list falls back to
    /// `fallback`.
    pub async fn load(
        service: &dyn BoardService,
        labels: &dyn LabelLookup,
        fallback: Vec<StatusCode>,
        limit: Duration,
    ) -> Self {
        match timed(limit, service.fetch_status_codes()).await {
            Ok(codes) if !codes.is_empty() => {
                debug!("Loaded {} status codes", codes.len());
                Self::from_codes(codes, labels)
            }
            Ok(_) => {
                warn!("Backend returned no status codes, using fallback list");
                Self::fallback(fallback, labels)
            }
            Err(e) => {
                warn!("Failed to load status codes, using fallback list: {}", e);
                Self::fallback(fallback, labels)
            }
        }
    }

    fn fallback(codes: Vec<StatusCode>, labels: &dyn LabelLookup) -> Self {
        Self {
            from_fallback: true,
            ..Self::from_codes(codes, labels)
        }
    }

    /// Loaded options in board order.
    pub fn options(&self) -> &[StatusOption] {
        &self.options
    }

    /// Loaded codes in board order.
    pub fn codes(&self) -> Vec<StatusCode> {
        self.options.iter().map(|o| o.code.clone()).collect()
    }

    /// Whether a code is part of the loaded set.
    pub fn contains(&self, code: &StatusCode) -> bool {
        self.options.iter().any(|o| &o.code == code)
    }

    /// Display label for a code; humanized when the code is unknown.
    pub fn label(&self, code: &StatusCode) -> String {
        self.options
            .iter()
            .find(|o| &o.code == code)
            .map(|o| o.label.clone())
            .unwrap_or_else(|| code.humanize())
    }

    /// Whether the fallback list is in use.
    pub fn is_fallback(&self) -> bool {
        self.from_fallback
    }
}
