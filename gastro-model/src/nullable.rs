//! Serde helper for nullable backend columns.
//!
//! `#[serde(default)]` only covers a missing key. Array and flag columns may
//! also arrive as an explicit `null`, which should read as the empty value
//! instead of failing the whole row.

use serde::{Deserialize, Deserializer};

/// Deserialize `null` as `T::default()`. Pair with `#[serde(default)]` so a
/// missing key is covered too.
pub fn or_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
