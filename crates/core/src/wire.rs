//! Serde helpers for the backend's wire format.

use serde::{Deserialize, Deserializer};

/// Decode an explicit `null` as the type's default.
///
/// Pair with `#[serde(default)]` so a missing field behaves the same way.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
