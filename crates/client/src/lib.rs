//! REST adapter for the authorization backend.
//!
//! Every call goes through [`ApiClient`], which normalises transport failures,
//! error-tagged bodies and unexpected statuses into
//! [`authz_console_core::ApiError`]. [`CollectionFetcher`] and
//! [`CandidateSource`] plug the client into the view layer's fetcher traits.

pub mod api;
pub mod config;
pub mod fetchers;
pub mod session;

pub use api::ApiClient;
pub use config::{ClientConfig, ConfigError};
pub use fetchers::{CANDIDATE_SEARCH_SIZE, CandidateSource, CollectionFetcher};
pub use session::{AuthResponse, AuthUser, Session, SignInRequest};
