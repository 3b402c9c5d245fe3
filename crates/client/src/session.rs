//! Session token and sign-in payloads.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Bearer token shared read-only by every request of a session.
#[derive(Clone, PartialEq, Eq)]
pub struct Session {
    token: Arc<str>,
}

impl Session {
    pub fn new(token: impl AsRef<str>) -> Self {
        Self {
            token: Arc::from(token.as_ref()),
        }
    }

    pub fn token(&self) -> &str {
        &self.token
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session").field("token", &"<redacted>").finish()
    }
}

impl From<&AuthResponse> for Session {
    fn from(response: &AuthResponse) -> Self {
        Session::new(&response.access_token)
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub struct SignInRequest {
    pub username: String,
    pub password: String,
}

impl SignInRequest {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for SignInRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignInRequest")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthUser {
    pub username: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Successful `POST /auth` body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthResponse {
    pub access_token: String,
    /// Token lifetime in seconds.
    pub expires_in: i64,
    pub token_type: String,
    pub user: AuthUser,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn secrets_stay_out_of_debug_output() {
        let session = Session::new("very-secret");
        let request = SignInRequest::new("admin", "hunter2");

        assert_eq!(session.token(), "very-secret");
        assert!(!format!("{session:?}").contains("very-secret"));
        assert!(!format!("{request:?}").contains("hunter2"));
    }

    #[test]
    fn session_is_taken_from_auth_response() {
        let response: AuthResponse = serde_json::from_value(serde_json::json!({
            "access_token": "tok",
            "expires_in": 3600,
            "token_type": "Bearer",
            "user": {
                "username": "admin",
                "created_at": "2024-01-05T10:00:00Z",
                "updated_at": "2024-01-05T10:00:00Z",
            },
        }))
        .unwrap();

        assert_eq!(Session::from(&response).token(), "tok");
        assert_eq!(response.user.username, "admin");
    }
}
