//! Fetcher adapters wiring [`ApiClient`] into the view layer.

use std::marker::PhantomData;

use async_trait::async_trait;
use authz_console_core::{
    ApiResult, Candidate, CandidateFetcher, Entity, FilterSpec, PageFetcher, PageRequest, PageResult,
    SortSpec,
};

use crate::api::ApiClient;

/// Number of candidates requested per picker search.
pub const CANDIDATE_SEARCH_SIZE: u32 = 50;

/// Paginated listing of one collection.
pub struct CollectionFetcher<E> {
    client: ApiClient,
    _entity: PhantomData<fn() -> E>,
}

impl<E: Entity> CollectionFetcher<E> {
    pub fn new(client: ApiClient) -> Self {
        Self {
            client,
            _entity: PhantomData,
        }
    }
}

#[async_trait]
impl<E: Entity> PageFetcher<E> for CollectionFetcher<E> {
    async fn fetch_page(&self, request: &PageRequest) -> ApiResult<PageResult<E>> {
        self.client.list::<E>(request).await
    }
}

/// Candidate search over one collection: first page of ids containing the query.
pub struct CandidateSource<E> {
    client: ApiClient,
    _entity: PhantomData<fn() -> E>,
}

impl<E: Entity> CandidateSource<E> {
    pub fn new(client: ApiClient) -> Self {
        Self {
            client,
            _entity: PhantomData,
        }
    }

    pub fn request_for(query: &str) -> PageRequest {
        PageRequest::new(1, CANDIDATE_SEARCH_SIZE)
            .with_filter(Some(FilterSpec::contains("id", query)))
            .with_sort(Some(SortSpec::asc("id")))
    }
}

#[async_trait]
impl<E: Entity> CandidateFetcher for CandidateSource<E> {
    async fn fetch_candidates(&self, query: &str) -> ApiResult<Vec<Candidate>> {
        let page = self.client.list::<E>(&Self::request_for(query)).await?;
        Ok(page.data.iter().map(Entity::to_candidate).collect())
    }
}
