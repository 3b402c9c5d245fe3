//! Typed calls against the backend REST API.

use authz_console_core::model::{CheckRequest, CheckResponse, StatsDay};
use authz_console_core::{ApiError, ApiResult, Entity, ErrorBody, PageRequest, PageResult};
use reqwest::{RequestBuilder, StatusCode, Url};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::config::{ClientConfig, ConfigError};
use crate::session::{AuthResponse, Session, SignInRequest};

/// HTTP client bound to one backend and, optionally, one session.
///
/// Cheap to clone; clones share the connection pool and the token.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    base: Url,
    session: Option<Session>,
}

impl ApiClient {
    pub fn new(config: &ClientConfig) -> Result<Self, ConfigError> {
        let base_url = config.api_url.trim_end_matches('/').to_string();
        let base = Url::parse(&base_url).map_err(|e| ConfigError::InvalidUrl {
            value: base_url.clone(),
            reason: e.to_string(),
        })?;
        if base.cannot_be_a_base() {
            return Err(ConfigError::InvalidUrl {
                value: base_url,
                reason: "URL cannot carry a path".to_string(),
            });
        }

        let http = reqwest::Client::builder().timeout(config.timeout).build()?;

        Ok(Self {
            http,
            base_url,
            base,
            session: config.token.as_deref().map(Session::new),
        })
    }

    pub fn with_session(mut self, session: Session) -> Self {
        self.session = Some(session);
        self
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `GET /<collection>?page&size[&filter][&sort]`.
    pub async fn list<E: Entity>(&self, request: &PageRequest) -> ApiResult<PageResult<E>> {
        let req = self
            .authorized(self.http.get(self.url(E::COLLECTION)))
            .query(&request.query_pairs());

        tracing::debug!(collection = E::COLLECTION, page = request.page, size = request.size, "listing collection");
        self.send(req).await
    }

    pub async fn get<E: Entity>(&self, id: &str) -> ApiResult<E> {
        let req = self.authorized(self.http.get(self.item_url(E::COLLECTION, id)));
        self.send(req).await
    }

    pub async fn create<E: Entity, B: Serialize + Sync>(&self, body: &B) -> ApiResult<E> {
        let req = self
            .authorized(self.http.post(self.url(E::COLLECTION)))
            .json(body);
        self.send(req).await
    }

    pub async fn update<E: Entity, B: Serialize + Sync>(&self, id: &str, body: &B) -> ApiResult<E> {
        let req = self
            .authorized(self.http.put(self.item_url(E::COLLECTION, id)))
            .json(body);
        self.send(req).await
    }

    /// Deletes one entity. `Ok(true)` only on HTTP 200.
    ///
    /// Error-tagged bodies still surface as `Err`, whatever the status.
    pub async fn delete<E: Entity>(&self, id: &str) -> ApiResult<bool> {
        let req = self.authorized(self.http.delete(self.item_url(E::COLLECTION, id)));
        let (status, bytes) = self.execute(req).await?;

        if let Some(body) = error_body(&bytes) {
            return Err(body.into_error(status.as_u16()));
        }

        if status != StatusCode::OK {
            tracing::debug!(collection = E::COLLECTION, id, status = status.as_u16(), "delete not acknowledged");
        }
        Ok(status == StatusCode::OK)
    }

    pub async fn check(&self, request: &CheckRequest) -> ApiResult<CheckResponse> {
        let req = self
            .authorized(self.http.post(self.url("check")))
            .json(request);
        self.send(req).await
    }

    /// Daily allowed/denied counters.
    pub async fn stats(&self) -> ApiResult<Vec<StatsDay>> {
        let req = self.authorized(self.http.get(self.url("stats")));
        self.send(req).await
    }

    /// `POST /auth`, sent without bearer token.
    pub async fn sign_in(&self, credentials: &SignInRequest) -> ApiResult<AuthResponse> {
        let req = self.http.post(self.url("auth")).json(credentials);
        let response: AuthResponse = self.send(req).await?;

        tracing::info!(username = %response.user.username, "signed in");
        Ok(response)
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    /// `<base>/<collection>/<id>` with `id` percent-encoded as one segment.
    fn item_url(&self, collection: &str, id: &str) -> Url {
        let mut url = self.base.clone();
        // `new` rejects cannot-be-a-base URLs, so segments are always available.
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push(collection).push(id);
        }
        url
    }

    fn authorized(&self, req: RequestBuilder) -> RequestBuilder {
        match &self.session {
            Some(session) => req.bearer_auth(session.token()),
            None => req,
        }
    }

    async fn execute(&self, req: RequestBuilder) -> ApiResult<(StatusCode, Vec<u8>)> {
        let resp = req.send().await.map_err(|e| {
            tracing::warn!(error = %e, "request failed");
            ApiError::transport(e.to_string())
        })?;

        let status = resp.status();
        let bytes = resp
            .bytes()
            .await
            .map_err(|e| ApiError::transport(e.to_string()))?;

        Ok((status, bytes.to_vec()))
    }

    async fn send<T: DeserializeOwned>(&self, req: RequestBuilder) -> ApiResult<T> {
        let (status, bytes) = self.execute(req).await?;
        decode(status, &bytes)
    }
}

/// Interprets a response body as either an error-tagged body or `T`.
fn decode<T: DeserializeOwned>(status: StatusCode, bytes: &[u8]) -> ApiResult<T> {
    if let Some(body) = error_body(bytes) {
        return Err(body.into_error(status.as_u16()));
    }

    if !status.is_success() {
        let text = String::from_utf8_lossy(bytes).trim().to_string();
        let message = if text.is_empty() {
            status
                .canonical_reason()
                .unwrap_or("unexpected status")
                .to_string()
        } else {
            text
        };
        return Err(ApiError::backend(status.as_u16(), message));
    }

    serde_json::from_slice(bytes).map_err(|e| ApiError::decode(e.to_string()))
}

fn error_body(bytes: &[u8]) -> Option<ErrorBody> {
    let value: Value = serde_json::from_slice(bytes).ok()?;
    if value.get("error").and_then(Value::as_bool) != Some(true) {
        return None;
    }
    serde_json::from_value(value).ok()
}
