//! Entity trait: a backend model living in a REST collection.

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::candidate::Candidate;

/// Entity marker + minimal interface.
pub trait Entity: DeserializeOwned + Send + Sync + 'static {
    /// Collection path segment (`roles`, `policies`, ...).
    const COLLECTION: &'static str;

    /// Human noun used in notifications (`role`, `service account`, ...).
    const NOUN: &'static str;

    /// Returns the entity identifier as used in `/<collection>/<id>`.
    fn id(&self) -> String;

    /// Projects the entity into a search-select candidate labelled by its id.
    fn to_candidate(&self) -> Candidate {
        Candidate::from_id(self.id())
    }
}

/// Projects an entity into a candidate carrying the serialized model as payload.
pub fn candidate_with_raw<E>(entity: &E) -> Candidate
where
    E: Entity + Serialize,
{
    let candidate = Candidate::from_id(entity.id());
    match serde_json::to_value(entity) {
        Ok(raw) => candidate.with_raw(raw),
        Err(err) => {
            tracing::debug!(collection = E::COLLECTION, error = %err, "failed to serialize candidate payload");
            candidate
        }
    }
}
