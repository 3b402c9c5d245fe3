//! Serde helpers for the backend's JSON quirks.

use serde::{Deserialize, Deserializer};

/// Empty collections are serialised by the backend as `null`.
pub(crate) fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<Vec<T>>::deserialize(deserializer).map(Option::unwrap_or_default)
}
