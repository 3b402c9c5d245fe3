//! Fetcher seams the view layer is driven through.
//!
//! A fetcher performs exactly one retrieval and reports failures as values;
//! deciding *when* to call it and what to do with late answers belongs to the
//! caller (collection view, picker).
//!
//! Plain async closures implement both traits:
//!
//! ```ignore
//! let fetcher = |request: PageRequest| async move { client.list::<Role>(&request).await };
//! let view = CollectionView::new(Arc::new(fetcher), notifier);
//! ```

use std::future::Future;

use async_trait::async_trait;

use crate::candidate::Candidate;
use crate::error::ApiResult;
use crate::page::{PageRequest, PageResult};

/// One paginated retrieval against a remote collection.
#[async_trait]
pub trait PageFetcher<T>: Send + Sync {
    async fn fetch_page(&self, request: &PageRequest) -> ApiResult<PageResult<T>>;
}

/// Query-dependent candidate retrieval for search-select inputs.
///
/// No pagination: the backend is expected to cap and rank results itself.
#[async_trait]
pub trait CandidateFetcher: Send + Sync {
    async fn fetch_candidates(&self, query: &str) -> ApiResult<Vec<Candidate>>;
}

#[async_trait]
impl<T, F, Fut> PageFetcher<T> for F
where
    T: Send + 'static,
    F: Fn(PageRequest) -> Fut + Send + Sync,
    Fut: Future<Output = ApiResult<PageResult<T>>> + Send,
{
    async fn fetch_page(&self, request: &PageRequest) -> ApiResult<PageResult<T>> {
        (self)(request.clone()).await
    }
}

#[async_trait]
impl<F, Fut> CandidateFetcher for F
where
    F: Fn(String) -> Fut + Send + Sync,
    Fut: Future<Output = ApiResult<Vec<Candidate>>> + Send,
{
    async fn fetch_candidates(&self, query: &str) -> ApiResult<Vec<Candidate>> {
        (self)(query.to_string()).await
    }
}
