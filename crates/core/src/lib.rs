//! Shared building blocks of the admin console.
//!
//! This crate contains **pure** types (no HTTP, no UI state): the paginated
//! request/response contract, sort and filter specifications, search-select
//! candidates, backend entity models, the uniform error value and the fetcher
//! seams the view layer is driven through.

pub mod candidate;
mod de;
pub mod entity;
pub mod error;
pub mod fetch;
pub mod labels;
pub mod model;
pub mod page;

pub use candidate::Candidate;
pub use entity::Entity;
pub use error::{ApiError, ApiResult, ErrorBody, ValidationError};
pub use fetch::{CandidateFetcher, PageFetcher};
pub use page::{
    ClauseParseError, FilterChange, FilterItem, FilterModel, FilterOperator, FilterSpec,
    PageRequest, PageResult, SortItem, SortModel, SortOrder, SortSpec,
};
