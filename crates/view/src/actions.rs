//! Confirmed delete: ask, delete, notify, refresh.

use std::future::Future;

use authz_console_core::{ApiError, ApiResult, Entity};

use crate::collection::CollectionView;
use crate::confirm::ConfirmationGate;
use crate::toast::Notifier;

/// Entity about to be deleted, as named to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteSubject {
    pub noun: String,
    pub id: String,
}

impl DeleteSubject {
    pub fn new(noun: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            noun: noun.into(),
            id: id.into(),
        }
    }

    pub fn of<E: Entity>(id: impl Into<String>) -> Self {
        Self::new(E::NOUN, id)
    }

    pub fn prompt(&self) -> String {
        format!("Do you really want to delete {} {}?", self.noun, self.id)
    }

    fn deleted(&self) -> String {
        format!("{} {} has been successfully deleted.", capitalize(&self.noun), self.id)
    }

    fn failed(&self, reason: Option<&str>) -> String {
        match reason {
            Some(reason) => format!(
                "An error occurred while trying to delete {} {}: {reason}.",
                self.noun, self.id
            ),
            None => format!("An error occurred while trying to delete {} {}.", self.noun, self.id),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// The user declined; nothing was sent.
    Cancelled,
    Deleted,
    /// The backend answered without acknowledging the delete.
    NotDeleted,
    Failed(ApiError),
}

pub const DELETE_TITLE: &str = "Delete confirmation";

/// Asks for confirmation, then runs `deleter`.
///
/// On success the view is refreshed; every other outcome leaves it alone.
/// The outcome is always reported through `notifier`, except a cancel.
pub async fn confirm_and_delete<T, F, Fut>(
    gate: &ConfirmationGate,
    notifier: &dyn Notifier,
    view: &CollectionView<T>,
    subject: &DeleteSubject,
    deleter: F,
) -> DeleteOutcome
where
    T: Clone + Send + 'static,
    F: FnOnce() -> Fut,
    Fut: Future<Output = ApiResult<bool>>,
{
    if !gate.confirm(DELETE_TITLE, subject.prompt()).await {
        tracing::debug!(noun = %subject.noun, id = %subject.id, "delete cancelled");
        return DeleteOutcome::Cancelled;
    }

    match deleter().await {
        Ok(true) => {
            tracing::info!(noun = %subject.noun, id = %subject.id, "deleted");
            notifier.success(&subject.deleted());
            view.refresh().await;
            DeleteOutcome::Deleted
        }
        Ok(false) => {
            notifier.error(&subject.failed(None));
            DeleteOutcome::NotDeleted
        }
        Err(err) => {
            tracing::warn!(noun = %subject.noun, id = %subject.id, error = %err, "delete failed");
            notifier.error(&subject.failed(Some(err.message())));
            DeleteOutcome::Failed(err)
        }
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{Filterable, InMemoryCollection};
    use crate::toast::{Severity, ToastQueue};
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};

    #[derive(Debug, Clone, PartialEq)]
    struct Role(String);

    impl Filterable for Role {
        fn field(&self, field: &str) -> Option<String> {
            (field == "id").then(|| self.0.clone())
        }
    }

    struct Fixture {
        gate: ConfirmationGate,
        toasts: Arc<ToastQueue>,
        roles: Arc<InMemoryCollection<Role>>,
        view: CollectionView<Role>,
    }

    async fn fixture() -> Fixture {
        let roles = Arc::new(InMemoryCollection::new(vec![Role("admin".into()), Role("viewer".into())]));
        let toasts = Arc::new(ToastQueue::new());
        let view: CollectionView<Role> = CollectionView::new(roles.clone(), toasts.clone());
        view.load().await;

        Fixture {
            gate: ConfirmationGate::new(),
            toasts,
            roles,
            view,
        }
    }

    #[tokio::test]
    async fn accepted_delete_notifies_and_refreshes() {
        let f = fixture().await;
        let subject = DeleteSubject::new("role", "viewer");

        let (outcome, prompt) = tokio::join!(
            confirm_and_delete(&f.gate, f.toasts.as_ref(), &f.view, &subject, || async {
                Ok(f.roles.remove("id", "viewer"))
            }),
            async {
                let request = f.gate.requested().await;
                f.gate.accept();
                request
            }
        );

        assert_eq!(outcome, DeleteOutcome::Deleted);
        assert_eq!(prompt.title, "Delete confirmation");
        assert_eq!(prompt.message, "Do you really want to delete role viewer?");
        assert_eq!(f.view.snapshot().rows, vec![Role("admin".into())]);

        let toasts = f.toasts.messages();
        assert_eq!(toasts[0].message, "Role viewer has been successfully deleted.");
        assert_eq!(toasts[0].severity, Severity::Success);
    }

    #[tokio::test]
    async fn cancelled_delete_sends_nothing() {
        let f = fixture().await;
        let subject = DeleteSubject::new("role", "viewer");

        let called = AtomicBool::new(false);

        let (outcome, _) = tokio::join!(
            confirm_and_delete(&f.gate, f.toasts.as_ref(), &f.view, &subject, || async {
                called.store(true, Ordering::SeqCst);
                Ok(true)
            }),
            async {
                f.gate.requested().await;
                f.gate.cancel();
            }
        );

        assert_eq!(outcome, DeleteOutcome::Cancelled);
        assert!(!called.load(Ordering::SeqCst));
        assert!(f.toasts.messages().is_empty());
        assert_eq!(f.roles.len(), 2);
    }

    #[tokio::test]
    async fn backend_failures_are_reported() {
        let f = fixture().await;
        let subject = DeleteSubject::new("service account", "c-1");

        let (outcome, _) = tokio::join!(
            confirm_and_delete(&f.gate, f.toasts.as_ref(), &f.view, &subject, || async {
                Err(ApiError::backend(404, "client not found"))
            }),
            async {
                f.gate.requested().await;
                f.gate.accept();
            }
        );
        assert_eq!(outcome, DeleteOutcome::Failed(ApiError::backend(404, "client not found")));

        let (outcome, _) = tokio::join!(
            confirm_and_delete(&f.gate, f.toasts.as_ref(), &f.view, &subject, || async { Ok(false) }),
            async {
                f.gate.requested().await;
                f.gate.accept();
            }
        );
        assert_eq!(outcome, DeleteOutcome::NotDeleted);

        let messages: Vec<String> = f.toasts.drain().into_iter().map(|t| t.message).collect();
        assert_eq!(
            messages,
            vec![
                "An error occurred while trying to delete service account c-1: client not found.",
                "An error occurred while trying to delete service account c-1.",
            ]
        );
    }

    #[test]
    fn prompts_use_the_entity_noun() {
        use authz_console_core::model::Client;

        let subject = DeleteSubject::of::<Client>("c-1");
        assert_eq!(subject.prompt(), "Do you really want to delete service account c-1?");
        assert_eq!(subject.deleted(), "Service account c-1 has been successfully deleted.");
    }
}
