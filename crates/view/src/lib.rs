//! Headless view models of the admin console.
//!
//! - [`CollectionView`]: server-driven paginated/sortable/filterable list.
//! - [`SinglePicker`] / [`MultiPicker`]: search-select inputs over a candidate fetcher.
//! - [`ConfirmationGate`]: "ask the user" turned into an awaitable boolean.
//! - [`ToastQueue`]: non-blocking notifications.

pub mod actions;
pub mod collection;
pub mod confirm;
pub mod memory;
pub mod picker;
pub mod toast;

pub use actions::{DeleteOutcome, DeleteSubject, confirm_and_delete};
pub use collection::{CollectionView, DEFAULT_PAGE_SIZE, Ticket, ViewState};
pub use confirm::{ConfirmationGate, ConfirmationRequest, GateState};
pub use memory::{Filterable, InMemoryCollection, natural_cmp};
pub use picker::{
    CandidateSearch, DEFAULT_DEBOUNCE, MultiPicker, MultiPickerBuilder, SearchOutcome, SinglePicker,
    SinglePickerBuilder,
};
pub use toast::{Notifier, Severity, Toast, ToastQueue};
