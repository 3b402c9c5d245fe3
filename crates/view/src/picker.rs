//! Search-select inputs fed by a query-dependent candidate fetcher.
//!
//! Both pickers share a [`CandidateSearch`]: keystrokes are debounced on the
//! trailing edge, and a result is applied only if no newer query was issued
//! while it was in flight. Fetch failures leave an empty candidate list.
//!
//! Selection changes are reported through the builder's `on_change` callback,
//! exactly once per effective change.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use authz_console_core::{Candidate, CandidateFetcher};

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(250);

/// What became of one query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchOutcome {
    /// The result replaced the candidate list.
    Applied,
    /// A newer keystroke arrived during the debounce; nothing was fetched.
    Coalesced,
    /// A newer query was issued while fetching; the result was dropped.
    Stale,
}

#[derive(Default)]
struct SearchState {
    query: String,
    candidates: Vec<Candidate>,
    generation: u64,
}

pub struct CandidateSearch {
    fetcher: Arc<dyn CandidateFetcher>,
    debounce: Duration,
    allow_add: bool,
    state: Mutex<SearchState>,
}

impl CandidateSearch {
    pub fn new(fetcher: Arc<dyn CandidateFetcher>) -> Self {
        Self {
            fetcher,
            debounce: DEFAULT_DEBOUNCE,
            allow_add: false,
            state: Mutex::new(SearchState::default()),
        }
    }

    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    pub fn with_allow_add(mut self, allow_add: bool) -> Self {
        self.allow_add = allow_add;
        self
    }

    fn lock(&self) -> MutexGuard<'_, SearchState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn query(&self) -> String {
        self.lock().query.clone()
    }

    /// Candidates of the last applied fetch.
    pub fn candidates(&self) -> Vec<Candidate> {
        self.lock().candidates.clone()
    }

    pub fn allows_add(&self) -> bool {
        self.allow_add
    }

    /// Records the query text and fetches once typing pauses.
    pub async fn on_query_change(&self, text: &str) -> SearchOutcome {
        let generation = self.bump(Some(text));

        tokio::time::sleep(self.debounce).await;
        if self.lock().generation != generation {
            return SearchOutcome::Coalesced;
        }

        self.fetch(generation, text.to_string()).await
    }

    /// Fetches candidates for the current query without waiting.
    pub async fn focus(&self) -> SearchOutcome {
        let generation = self.bump(None);
        let query = self.query();
        self.fetch(generation, query).await
    }

    /// Options to display for the current query.
    ///
    /// Candidates whose label contains the query (case-insensitive). With
    /// allow-add, a non-empty query matching no candidate id is offered as a
    /// free-text entry at the end.
    pub fn options(&self) -> Vec<Candidate> {
        let state = self.lock();
        let needle = state.query.to_lowercase();

        let mut options: Vec<Candidate> = state
            .candidates
            .iter()
            .filter(|c| c.label.to_lowercase().contains(&needle))
            .cloned()
            .collect();

        if self.allow_add
            && !state.query.is_empty()
            && !state.candidates.iter().any(|c| c.id == state.query)
        {
            options.push(Candidate::from_id(state.query.clone()));
        }

        options
    }

    /// Adds entries to the candidate list without fetching.
    fn seed(&self, defaults: &[Candidate]) {
        let mut state = self.lock();
        for candidate in defaults {
            if !state.candidates.iter().any(|c| c.same_identity(candidate)) {
                state.candidates.push(candidate.clone());
            }
        }
    }

    fn bump(&self, query: Option<&str>) -> u64 {
        let mut state = self.lock();
        if let Some(query) = query {
            state.query = query.to_string();
        }
        state.generation += 1;
        state.generation
    }

    async fn fetch(&self, generation: u64, query: String) -> SearchOutcome {
        let candidates = match self.fetcher.fetch_candidates(&query).await {
            Ok(candidates) => candidates,
            Err(err) => {
                tracing::debug!(%query, error = %err, "candidate fetch failed");
                Vec::new()
            }
        };

        let mut state = self.lock();
        if state.generation != generation {
            tracing::trace!(%query, "stale candidate fetch dropped");
            return SearchOutcome::Stale;
        }

        state.candidates = candidates;
        SearchOutcome::Applied
    }
}

type SingleCallback = Box<dyn Fn(Option<&Candidate>) + Send + Sync>;
type MultiCallback = Box<dyn Fn(&[Candidate]) + Send + Sync>;

/// Single-value search-select.
pub struct SinglePicker {
    search: CandidateSearch,
    disabled: bool,
    selection: Mutex<Option<Candidate>>,
    on_change: Option<SingleCallback>,
}

pub struct SinglePickerBuilder {
    search: CandidateSearch,
    disabled: bool,
    default_value: Option<Candidate>,
    on_change: Option<SingleCallback>,
}

impl SinglePickerBuilder {
    pub fn debounce(mut self, debounce: Duration) -> Self {
        self.search = self.search.with_debounce(debounce);
        self
    }

    pub fn allow_add(mut self, allow_add: bool) -> Self {
        self.search = self.search.with_allow_add(allow_add);
        self
    }

    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    pub fn default_value(mut self, candidate: Candidate) -> Self {
        self.default_value = Some(candidate);
        self
    }

    pub fn on_change(mut self, f: impl Fn(Option<&Candidate>) + Send + Sync + 'static) -> Self {
        self.on_change = Some(Box::new(f));
        self
    }

    /// Builds the picker; a default value is seeded into the candidates and
    /// the selection, and reported once through `on_change`.
    pub fn build(self) -> SinglePicker {
        let picker = SinglePicker {
            search: self.search,
            disabled: self.disabled,
            selection: Mutex::new(None),
            on_change: self.on_change,
        };

        if let Some(default) = self.default_value {
            picker.search.seed(std::slice::from_ref(&default));
            picker.store(Some(default));
        }
        picker
    }
}

impl SinglePicker {
    pub fn builder(fetcher: Arc<dyn CandidateFetcher>) -> SinglePickerBuilder {
        SinglePickerBuilder {
            search: CandidateSearch::new(fetcher),
            disabled: false,
            default_value: None,
            on_change: None,
        }
    }

    pub fn search(&self) -> &CandidateSearch {
        &self.search
    }

    pub async fn on_query_change(&self, text: &str) -> SearchOutcome {
        self.search.on_query_change(text).await
    }

    pub async fn focus(&self) -> SearchOutcome {
        self.search.focus().await
    }

    pub fn options(&self) -> Vec<Candidate> {
        self.search.options()
    }

    fn lock(&self) -> MutexGuard<'_, Option<Candidate>> {
        self.selection.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn selection(&self) -> Option<Candidate> {
        self.lock().clone()
    }

    /// Selects `candidate`. Re-selecting the current id is a no-op.
    pub fn select(&self, candidate: Candidate) -> bool {
        if self.disabled {
            return false;
        }
        {
            let mut current = self.lock();
            if current.as_ref().is_some_and(|c| c.same_identity(&candidate)) {
                return false;
            }
            *current = Some(candidate.clone());
        }
        self.changed(Some(&candidate));
        true
    }

    pub fn clear(&self) -> bool {
        if self.disabled || self.lock().take().is_none() {
            return false;
        }
        self.changed(None);
        true
    }

    fn store(&self, selection: Option<Candidate>) {
        *self.lock() = selection.clone();
        self.changed(selection.as_ref());
    }

    /// Runs the callback; the selection lock must not be held.
    fn changed(&self, selection: Option<&Candidate>) {
        if let Some(on_change) = &self.on_change {
            on_change(selection);
        }
    }
}

/// Multi-value search-select; the selection is unique by id.
pub struct MultiPicker {
    search: CandidateSearch,
    disabled: bool,
    selection: Mutex<Vec<Candidate>>,
    on_change: Option<MultiCallback>,
}

pub struct MultiPickerBuilder {
    search: CandidateSearch,
    disabled: bool,
    default_values: Vec<Candidate>,
    on_change: Option<MultiCallback>,
}

impl MultiPickerBuilder {
    pub fn debounce(mut self, debounce: Duration) -> Self {
        self.search = self.search.with_debounce(debounce);
        self
    }

    pub fn allow_add(mut self, allow_add: bool) -> Self {
        self.search = self.search.with_allow_add(allow_add);
        self
    }

    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    pub fn default_values(mut self, candidates: Vec<Candidate>) -> Self {
        self.default_values = candidates;
        self
    }

    pub fn on_change(mut self, f: impl Fn(&[Candidate]) + Send + Sync + 'static) -> Self {
        self.on_change = Some(Box::new(f));
        self
    }

    /// Builds the picker; defaults go to both the candidates and the
    /// selection and are reported once through `on_change`.
    pub fn build(self) -> MultiPicker {
        let picker = MultiPicker {
            search: self.search,
            disabled: self.disabled,
            selection: Mutex::new(Vec::new()),
            on_change: self.on_change,
        };

        if !self.default_values.is_empty() {
            let defaults = dedup(self.default_values);
            picker.search.seed(&defaults);
            picker.store(defaults);
        }
        picker
    }
}

impl MultiPicker {
    pub fn builder(fetcher: Arc<dyn CandidateFetcher>) -> MultiPickerBuilder {
        MultiPickerBuilder {
            search: CandidateSearch::new(fetcher),
            disabled: false,
            default_values: Vec::new(),
            on_change: None,
        }
    }

    pub fn search(&self) -> &CandidateSearch {
        &self.search
    }

    pub async fn on_query_change(&self, text: &str) -> SearchOutcome {
        self.search.on_query_change(text).await
    }

    pub async fn focus(&self) -> SearchOutcome {
        self.search.focus().await
    }

    pub fn options(&self) -> Vec<Candidate> {
        self.search.options()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Candidate>> {
        self.selection.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn selection(&self) -> Vec<Candidate> {
        self.lock().clone()
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.lock().iter().any(|c| c.id == id)
    }

    /// Appends `candidate` unless its id is already selected.
    pub fn select(&self, candidate: Candidate) -> bool {
        self.select_many(vec![candidate]) == 1
    }

    /// Appends every candidate whose id is not selected yet; returns how
    /// many were added. One callback for the whole batch.
    pub fn select_many(&self, candidates: Vec<Candidate>) -> usize {
        if self.disabled {
            return 0;
        }

        let (added, snapshot) = {
            let mut current = self.lock();
            let before = current.len();
            for candidate in candidates {
                if !current.iter().any(|c| c.same_identity(&candidate)) {
                    current.push(candidate);
                }
            }
            (current.len() - before, current.clone())
        };

        if added > 0 {
            self.changed(&snapshot);
        }
        added
    }

    /// Replaces the whole selection (deduplicated by id, first wins).
    pub fn replace(&self, candidates: Vec<Candidate>) -> bool {
        if self.disabled {
            return false;
        }

        let next = dedup(candidates);
        {
            let mut current = self.lock();
            if current.len() == next.len() && current.iter().zip(&next).all(|(a, b)| a.same_identity(b)) {
                return false;
            }
            current.clone_from(&next);
        }

        self.changed(&next);
        true
    }

    /// Removes the entry at `index`; out of range is a no-op.
    pub fn deselect(&self, index: usize) -> Option<Candidate> {
        if self.disabled {
            return None;
        }

        let (removed, snapshot) = {
            let mut current = self.lock();
            if index >= current.len() {
                return None;
            }
            let removed = current.remove(index);
            (removed, current.clone())
        };

        self.changed(&snapshot);
        Some(removed)
    }

    fn store(&self, selection: Vec<Candidate>) {
        *self.lock() = selection.clone();
        self.changed(&selection);
    }

    /// Runs the callback; the selection lock must not be held.
    fn changed(&self, selection: &[Candidate]) {
        if let Some(on_change) = &self.on_change {
            on_change(selection);
        }
    }
}

fn dedup(candidates: Vec<Candidate>) -> Vec<Candidate> {
    let mut unique: Vec<Candidate> = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        if !unique.iter().any(|c| c.same_identity(&candidate)) {
            unique.push(candidate);
        }
    }
    unique
}
