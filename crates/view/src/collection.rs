//! Collection view engine: the state behind a server-driven data grid.
//!
//! Every parameter change composes the current [`PageRequest`], compares it
//! with the last one issued and refetches when they differ. Each issued fetch
//! carries a [`Ticket`]; only the ticket of the most recently issued request
//! may update the view (last request wins, whatever the arrival order).
//!
//! Fetch failures never escape: rows and total keep their last good values
//! and a toast `unable to load data: <message>` is shown.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use authz_console_core::{
    ApiResult, FilterChange, FilterModel, FilterSpec, PageFetcher, PageRequest, PageResult, SortModel,
    SortSpec,
};

use crate::toast::Notifier;

pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Read-only view of the engine, as rendered by a grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewState<T> {
    pub page: u32,
    pub size: u32,
    pub sort: Option<SortSpec>,
    pub forced_sort: Option<SortSpec>,
    pub filter: Option<FilterSpec>,
    pub loading: bool,
    pub total: u64,
    pub rows: Vec<T>,
}

impl<T> Default for ViewState<T> {
    fn default() -> Self {
        Self {
            page: 1,
            size: DEFAULT_PAGE_SIZE,
            sort: None,
            forced_sort: None,
            filter: None,
            loading: false,
            total: 0,
            rows: Vec::new(),
        }
    }
}

impl<T> ViewState<T> {
    /// Request the current parameters translate to.
    pub fn request(&self) -> PageRequest {
        PageRequest::new(self.page, self.size)
            .with_sort(self.sort.clone())
            .with_filter(self.filter.clone())
    }
}

/// Handle of one issued fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticket {
    generation: u64,
    request: PageRequest,
}

impl Ticket {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn request(&self) -> &PageRequest {
        &self.request
    }
}

struct Inner<T> {
    state: ViewState<T>,
    generation: u64,
    last_issued: Option<PageRequest>,
}

pub struct CollectionView<T> {
    fetcher: Arc<dyn PageFetcher<T>>,
    notifier: Arc<dyn Notifier>,
    inner: Mutex<Inner<T>>,
}

impl<T> CollectionView<T>
where
    T: Clone + Send + 'static,
{
    pub fn new(fetcher: Arc<dyn PageFetcher<T>>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            fetcher,
            notifier,
            inner: Mutex::new(Inner {
                state: ViewState::default(),
                generation: 0,
                last_issued: None,
            }),
        }
    }

    pub fn with_page_size(self, size: u32) -> Self {
        self.lock().state.size = size.max(1);
        self
    }

    pub fn with_page(self, page: u32) -> Self {
        self.lock().state.page = page.max(1);
        self
    }

    pub fn with_filter(self, filter: Option<FilterSpec>) -> Self {
        self.lock().state.filter = filter;
        self
    }

    /// Initial user sort, applied by the first [`load`](Self::load).
    pub fn with_sort(self, sort: Option<SortSpec>) -> Self {
        self.lock().state.sort = sort;
        self
    }

    /// Page-imposed sort; overrides the user sort from the first load on.
    pub fn with_forced_sort(self, sort: Option<SortSpec>) -> Self {
        {
            let mut inner = self.lock();
            if sort.is_some() {
                inner.state.sort = sort.clone();
            }
            inner.state.forced_sort = sort;
        }
        self
    }

    fn lock(&self) -> MutexGuard<'_, Inner<T>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn snapshot(&self) -> ViewState<T> {
        self.lock().state.clone()
    }

    /// Issues the initial fetch.
    pub async fn load(&self) {
        self.run(false).await;
    }

    /// Re-issues the current request even if nothing changed.
    pub async fn refresh(&self) {
        self.run(true).await;
    }

    /// Moves to page `page` (1-based; 0 is treated as 1).
    pub async fn set_page(&self, page: u32) {
        self.lock().state.page = page.max(1);
        self.run(false).await;
    }

    /// Changes the page size. The current page is kept as is.
    pub async fn set_size(&self, size: u32) {
        self.lock().state.size = size.max(1);
        self.run(false).await;
    }

    pub async fn set_sort(&self, sort: Option<SortSpec>) {
        self.lock().state.sort = sort;
        self.run(false).await;
    }

    /// Applies a grid sort model; anything but exactly one column clears the sort.
    pub async fn set_sort_model(&self, model: SortModel) {
        self.set_sort(model.collapse()).await;
    }

    /// Sets or lifts the page-imposed sort.
    ///
    /// A new forced sort replaces the current sort. Lifting it (`None`)
    /// leaves the current sort untouched.
    pub async fn set_forced_sort(&self, sort: Option<SortSpec>) {
        {
            let mut inner = self.lock();
            if sort.is_some() && inner.state.forced_sort != sort {
                inner.state.sort = sort.clone();
            }
            inner.state.forced_sort = sort;
        }
        self.run(false).await;
    }

    pub async fn set_filter(&self, filter: Option<FilterSpec>) {
        self.lock().state.filter = filter;
        self.run(false).await;
    }

    /// Applies a grid filter model.
    ///
    /// A single clause without value yet keeps the current filter; more than
    /// one clause clears it.
    pub async fn set_filter_model(&self, model: FilterModel) {
        match model.collapse() {
            FilterChange::Set(filter) => self.set_filter(filter).await,
            FilterChange::Keep => tracing::trace!("filter clause without value ignored"),
        }
    }

    /// Composes the current request and hands out a ticket for it.
    ///
    /// Returns `None` when the request equals the last issued one and
    /// `force` is false.
    pub fn issue(&self, force: bool) -> Option<Ticket> {
        let mut inner = self.lock();
        let request = inner.state.request();

        if !force && inner.last_issued.as_ref() == Some(&request) {
            return None;
        }

        inner.generation += 1;
        inner.last_issued = Some(request.clone());
        inner.state.loading = true;

        tracing::debug!(
            generation = inner.generation,
            page = request.page,
            size = request.size,
            sort = ?request.sort,
            filter = ?request.filter,
            "collection fetch issued"
        );

        Some(Ticket {
            generation: inner.generation,
            request,
        })
    }

    /// Applies the outcome of a ticket's fetch.
    ///
    /// Returns `false` when a newer request was issued meanwhile; the outcome
    /// is then dropped.
    pub fn settle(&self, ticket: Ticket, outcome: ApiResult<PageResult<T>>) -> bool {
        let mut inner = self.lock();

        if ticket.generation != inner.generation {
            tracing::debug!(
                generation = ticket.generation,
                current = inner.generation,
                "stale collection fetch dropped"
            );
            return false;
        }

        inner.state.loading = false;
        match outcome {
            Ok(page) => {
                inner.state.total = page.total;
                inner.state.rows = page.data;
            }
            Err(err) => {
                drop(inner);
                tracing::warn!(error = %err, "collection fetch failed");
                self.notifier.error(&format!("unable to load data: {}", err.message()));
            }
        }
        true
    }

    async fn run(&self, force: bool) {
        let Some(ticket) = self.issue(force) else {
            return;
        };

        let outcome = self.fetcher.fetch_page(ticket.request()).await;
        self.settle(ticket, outcome);
    }
}
