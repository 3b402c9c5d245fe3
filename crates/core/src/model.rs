//! Backend models and mutation payloads.
//!
//! Shapes match the authorization backend's JSON. Timestamps are RFC 3339.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::candidate::{self, Candidate};
use crate::entity::{self, Entity};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Service account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Client {
    pub client_id: String,
    #[serde(default)]
    pub client_secret: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Policy {
    pub id: String,
    #[serde(default, deserialize_with = "crate::de::null_as_empty")]
    pub actions: Vec<Action>,
    #[serde(default, deserialize_with = "crate::de::null_as_empty")]
    pub resources: Vec<Resource>,
    #[serde(default, deserialize_with = "crate::de::null_as_empty")]
    pub attribute_rules: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Key/value attribute attached to a principal or a resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    pub key: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Principal {
    pub id: String,
    #[serde(default, deserialize_with = "crate::de::null_as_empty")]
    pub roles: Vec<Role>,
    #[serde(default, deserialize_with = "crate::de::null_as_empty")]
    pub attributes: Vec<Attribute>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    pub id: String,
    pub kind: String,
    pub value: String,
    #[serde(default, deserialize_with = "crate::de::null_as_empty")]
    pub attributes: Vec<Attribute>,
    #[serde(default)]
    pub is_locked: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Role {
    pub id: String,
    #[serde(default, deserialize_with = "crate::de::null_as_empty")]
    pub policies: Vec<Policy>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Console operator account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One recorded access decision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Audit {
    pub id: i64,
    pub date: DateTime<Utc>,
    pub principal: String,
    pub resource_kind: String,
    pub resource_value: String,
    pub action: String,
    pub is_allowed: bool,
    #[serde(default)]
    pub policy_id: String,
}

/// Daily check counters shown on the dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsDay {
    pub id: String,
    pub date: String,
    pub checks_allowed_number: u64,
    pub checks_denied_number: u64,
}

impl Entity for Action {
    const COLLECTION: &'static str = "actions";
    const NOUN: &'static str = "action";

    fn id(&self) -> String {
        self.id.clone()
    }
}

impl Entity for Client {
    const COLLECTION: &'static str = "clients";
    const NOUN: &'static str = "service account";

    fn id(&self) -> String {
        self.client_id.clone()
    }

    fn to_candidate(&self) -> Candidate {
        Candidate::new(self.client_id.clone(), self.name.clone())
    }
}

impl Entity for Policy {
    const COLLECTION: &'static str = "policies";
    const NOUN: &'static str = "policy";

    fn id(&self) -> String {
        self.id.clone()
    }
}

impl Entity for Principal {
    const COLLECTION: &'static str = "principals";
    const NOUN: &'static str = "principal";

    fn id(&self) -> String {
        self.id.clone()
    }
}

impl Entity for Resource {
    const COLLECTION: &'static str = "resources";
    const NOUN: &'static str = "resource";

    fn id(&self) -> String {
        self.id.clone()
    }

    // The check screen reads `kind`/`value` back out of the payload.
    fn to_candidate(&self) -> Candidate {
        entity::candidate_with_raw(self)
    }
}

impl Entity for Role {
    const COLLECTION: &'static str = "roles";
    const NOUN: &'static str = "role";

    fn id(&self) -> String {
        self.id.clone()
    }
}

impl Entity for User {
    const COLLECTION: &'static str = "users";
    const NOUN: &'static str = "user";

    fn id(&self) -> String {
        self.username.clone()
    }
}

impl Entity for Audit {
    const COLLECTION: &'static str = "audits";
    const NOUN: &'static str = "audit entry";

    fn id(&self) -> String {
        self.id.to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoleRequest {
    pub id: String,
    pub policies: Vec<String>,
}

impl RoleRequest {
    pub fn new(id: impl Into<String>, policies: &[Candidate]) -> Self {
        Self {
            id: id.into(),
            policies: candidate::ids(policies),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PolicyRequest {
    pub id: String,
    pub resources: Vec<String>,
    pub actions: Vec<String>,
    pub attribute_rules: Vec<String>,
}

impl PolicyRequest {
    pub fn new(
        id: impl Into<String>,
        resources: &[Candidate],
        actions: &[Candidate],
        attribute_rules: Vec<String>,
    ) -> Self {
        Self {
            id: id.into(),
            resources: candidate::ids(resources),
            actions: candidate::ids(actions),
            attribute_rules,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PrincipalRequest {
    pub id: String,
    pub roles: Vec<String>,
    pub attributes: Vec<Attribute>,
}

impl PrincipalRequest {
    pub fn new(id: impl Into<String>, roles: &[Candidate], attributes: Vec<Attribute>) -> Self {
        Self {
            id: id.into(),
            roles: candidate::ids(roles),
            attributes,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResourceRequest {
    pub id: String,
    pub kind: String,
    pub value: String,
    pub attributes: Vec<Attribute>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserRequest {
    pub username: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClientRequest {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckItem {
    pub principal: String,
    pub resource_kind: String,
    pub resource_value: String,
    pub action: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckRequest {
    pub checks: Vec<CheckItem>,
}

impl CheckRequest {
    /// Single check built from the three picker selections of the check screen.
    ///
    /// The resource kind and value come from the candidate payload; a free-text
    /// resource without payload yields empty strings.
    pub fn from_selection(principal: &Candidate, resource: &Candidate, action: &Candidate) -> Self {
        Self {
            checks: vec![CheckItem {
                principal: principal.id.clone(),
                resource_kind: resource.raw_str("kind").unwrap_or_default().to_string(),
                resource_value: resource.raw_str("value").unwrap_or_default().to_string(),
                action: action.id.clone(),
            }],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckOutcome {
    pub is_allowed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckResponse {
    #[serde(default, deserialize_with = "crate::de::null_as_empty")]
    pub checks: Vec<CheckOutcome>,
}

impl CheckResponse {
    pub fn first_allowed(&self) -> Option<bool> {
        self.checks.first().map(|c| c.is_allowed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn resource_json() -> serde_json::Value {
        json!({
            "id": "post.123",
            "kind": "post",
            "value": "123",
            "attributes": [{"key": "owner", "value": "alice"}],
            "is_locked": false,
            "created_at": "2024-01-05T10:00:00Z",
            "updated_at": "2024-01-05T10:00:00Z",
        })
    }

    #[test]
    fn resource_candidate_carries_kind_and_value() {
        let resource: Resource = serde_json::from_value(resource_json()).unwrap();
        let candidate = resource.to_candidate();

        assert_eq!(candidate.id, "post.123");
        assert_eq!(candidate.label, "post.123");
        assert_eq!(candidate.raw_str("kind"), Some("post"));
        assert_eq!(candidate.raw_str("value"), Some("123"));
    }

    #[test]
    fn check_request_reads_resource_payload() {
        let resource: Resource = serde_json::from_value(resource_json()).unwrap();
        let request = CheckRequest::from_selection(
            &Candidate::from_id("user-1"),
            &resource.to_candidate(),
            &Candidate::from_id("edit"),
        );

        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({"checks": [{
                "principal": "user-1",
                "resource_kind": "post",
                "resource_value": "123",
                "action": "edit",
            }]})
        );
    }

    #[test]
    fn free_text_resource_yields_empty_kind() {
        let request = CheckRequest::from_selection(
            &Candidate::from_id("user-1"),
            &Candidate::from_id("post.*"),
            &Candidate::from_id("edit"),
        );

        assert_eq!(request.checks[0].resource_kind, "");
        assert_eq!(request.checks[0].resource_value, "");
    }

    #[test]
    fn payloads_reference_selected_ids() {
        let picked = vec![Candidate::new("p1", "Policy one"), Candidate::new("p2", "Policy two")];
        let request = RoleRequest::new("editor", &picked);

        assert_eq!(serde_json::to_value(&request).unwrap(), json!({"id": "editor", "policies": ["p1", "p2"]}));
    }

    #[test]
    fn client_candidate_is_labelled_by_name() {
        let client: Client = serde_json::from_value(json!({
            "client_id": "c-1",
            "client_secret": "s3cr3t",
            "name": "ci-bot",
            "created_at": "2024-01-05T10:00:00Z",
            "updated_at": "2024-01-05T10:00:00Z",
        }))
        .unwrap();

        assert_eq!(client.to_candidate(), Candidate::new("c-1", "ci-bot"));
    }

    #[test]
    fn null_collections_decode_as_empty() {
        let role: Role = serde_json::from_value(json!({
            "id": "admin",
            "policies": null,
            "created_at": "2024-01-05T10:00:00Z",
            "updated_at": "2024-01-05T10:00:00Z",
        }))
        .unwrap();

        assert!(role.policies.is_empty());
        assert_eq!(Role::COLLECTION, "roles");
    }
}
