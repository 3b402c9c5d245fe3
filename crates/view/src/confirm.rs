//! Confirmation gate: an imperative "are you sure?" turned into an awaitable boolean.
//!
//! The gate holds at most one pending request:
//!
//! ```text
//! Idle --confirm--> Pending --accept--> Idle (true)
//!                          --cancel--> Idle (false)
//!                          --dismiss-> Idle (false)
//! ```
//!
//! A `confirm` issued while another request is pending replaces it. The
//! superseded caller resolves to `false` at once instead of being orphaned
//! with a promise that never settles, so a caller awaiting an answer always
//! gets one. Dropping the gate resolves a pending caller the same way.

use std::future::Future;
use std::sync::{Mutex, MutexGuard, PoisonError};

use tokio::sync::{Notify, oneshot};

pub const DEFAULT_TITLE: &str = "Confirmation";
pub const DEFAULT_MESSAGE: &str = "Are you sure you want to continue?";

/// What the user is asked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmationRequest {
    pub title: String,
    pub message: String,
}

impl ConfirmationRequest {
    pub fn new(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
        }
    }
}

impl Default for ConfirmationRequest {
    fn default() -> Self {
        Self::new(DEFAULT_TITLE, DEFAULT_MESSAGE)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateState {
    Idle,
    Pending(ConfirmationRequest),
}

struct Slot {
    request: ConfirmationRequest,
    reply: oneshot::Sender<bool>,
}

#[derive(Default)]
pub struct ConfirmationGate {
    slot: Mutex<Option<Slot>>,
    requested: Notify,
}

impl ConfirmationGate {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Option<Slot>> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Registers a request and returns the future of the user's answer.
    ///
    /// Registration happens before this returns, so the request is visible
    /// through [`pending`](Self::pending) even if the future is never polled.
    /// The future never fails: a dropped or superseded request yields `false`.
    pub fn confirm(
        &self,
        title: impl Into<String>,
        message: impl Into<String>,
    ) -> impl Future<Output = bool> + Send + 'static {
        self.ask(ConfirmationRequest::new(title, message))
    }

    pub fn ask(&self, request: ConfirmationRequest) -> impl Future<Output = bool> + Send + 'static {
        let (reply, answer) = oneshot::channel();

        tracing::debug!(title = %request.title, "confirmation requested");
        let previous = self.lock().replace(Slot { request, reply });

        if let Some(previous) = previous {
            tracing::warn!(
                title = %previous.request.title,
                "pending confirmation superseded; resolving it to false"
            );
            let _ = previous.reply.send(false);
        }
        self.requested.notify_one();

        async move { answer.await.unwrap_or(false) }
    }

    pub fn state(&self) -> GateState {
        match self.pending() {
            Some(request) => GateState::Pending(request),
            None => GateState::Idle,
        }
    }

    /// The request currently displayed, if any.
    pub fn pending(&self) -> Option<ConfirmationRequest> {
        self.lock().as_ref().map(|slot| slot.request.clone())
    }

    /// Waits until a request is pending and returns it.
    pub async fn requested(&self) -> ConfirmationRequest {
        loop {
            let notified = self.requested.notified();
            if let Some(request) = self.pending() {
                return request;
            }
            notified.await;
        }
    }

    /// User confirmed. Returns `false` when nothing was pending.
    pub fn accept(&self) -> bool {
        self.resolve(true)
    }

    /// User declined.
    pub fn cancel(&self) -> bool {
        self.resolve(false)
    }

    /// Dialog closed without a choice; same answer as [`cancel`](Self::cancel).
    pub fn dismiss(&self) -> bool {
        self.resolve(false)
    }

    fn resolve(&self, answer: bool) -> bool {
        let Some(slot) = self.lock().take() else {
            tracing::debug!("no pending confirmation to resolve");
            return false;
        };

        tracing::debug!(title = %slot.request.title, answer, "confirmation resolved");
        // The caller may have dropped its future; nothing left to tell it.
        let _ = slot.reply.send(answer);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn accept_resolves_true_and_returns_to_idle() {
        let gate = ConfirmationGate::new();
        let answer = gate.confirm("Delete confirmation", "Really?");

        assert_eq!(
            gate.state(),
            GateState::Pending(ConfirmationRequest::new("Delete confirmation", "Really?"))
        );
        assert!(gate.accept());
        assert!(answer.await);
        assert_eq!(gate.state(), GateState::Idle);
    }

    #[tokio::test]
    async fn cancel_and_dismiss_resolve_false() {
        let gate = ConfirmationGate::new();

        let answer = gate.confirm("t", "m");
        gate.cancel();
        assert!(!answer.await);

        let answer = gate.ask(ConfirmationRequest::default());
        assert_eq!(gate.pending().map(|r| r.title), Some(DEFAULT_TITLE.to_string()));
        gate.dismiss();
        assert!(!answer.await);
    }

    #[tokio::test]
    async fn exactly_one_resolution_per_request() {
        let gate = ConfirmationGate::new();
        let answer = gate.confirm("t", "m");

        assert!(gate.accept());
        assert!(!gate.cancel());
        assert!(answer.await);
    }

    #[tokio::test]
    async fn second_confirm_supersedes_the_first() {
        let gate = ConfirmationGate::new();
        let first = gate.confirm("first", "m");
        let second = gate.confirm("second", "m");

        assert_eq!(gate.pending().map(|r| r.title), Some("second".to_string()));
        assert!(!first.await);

        gate.accept();
        assert!(second.await);
    }

    #[tokio::test]
    async fn dropping_the_gate_resolves_false() {
        let gate = ConfirmationGate::new();
        let answer = gate.confirm("t", "m");
        drop(gate);

        assert!(!answer.await);
    }

    #[tokio::test]
    async fn requested_reports_the_pending_request() {
        let gate = ConfirmationGate::new();

        let (answer, request) = tokio::join!(gate.confirm("t", "m"), async {
            let request = gate.requested().await;
            gate.accept();
            request
        });

        assert!(answer);
        assert_eq!(request.title, "t");
    }
}
