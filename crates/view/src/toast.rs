//! Non-blocking user notifications.

use std::sync::{Mutex, MutexGuard, PoisonError};

use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Success,
    Warning,
    Error,
}

/// One displayed notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub key: Uuid,
    pub message: String,
    pub severity: Severity,
}

/// Sink for user-visible notifications.
pub trait Notifier: Send + Sync {
    fn show(&self, message: String, severity: Severity);

    fn info(&self, message: &str) {
        self.show(message.to_string(), Severity::Info);
    }

    fn success(&self, message: &str) {
        self.show(message.to_string(), Severity::Success);
    }

    fn warning(&self, message: &str) {
        self.show(message.to_string(), Severity::Warning);
    }

    fn error(&self, message: &str) {
        self.show(message.to_string(), Severity::Error);
    }
}

/// Ordered in-memory toast stack. Keys are time-ordered (UUIDv7).
#[derive(Debug, Default)]
pub struct ToastQueue {
    toasts: Mutex<Vec<Toast>>,
}

impl ToastQueue {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Toast>> {
        self.toasts.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Currently displayed toasts, oldest first.
    pub fn messages(&self) -> Vec<Toast> {
        self.lock().clone()
    }

    /// Removes one toast; `false` if it was already gone.
    pub fn dismiss(&self, key: Uuid) -> bool {
        let mut toasts = self.lock();
        let before = toasts.len();
        toasts.retain(|t| t.key != key);
        toasts.len() != before
    }

    /// Takes every displayed toast.
    pub fn drain(&self) -> Vec<Toast> {
        std::mem::take(&mut *self.lock())
    }
}

impl Notifier for ToastQueue {
    fn show(&self, message: String, severity: Severity) {
        match severity {
            Severity::Error => tracing::warn!(%message, "error toast"),
            Severity::Warning => tracing::warn!(%message, "warning toast"),
            Severity::Info | Severity::Success => tracing::info!(%message, ?severity, "toast"),
        }

        self.lock().push(Toast {
            key: Uuid::now_v7(),
            message,
            severity,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toasts_keep_insertion_order() {
        let queue = ToastQueue::new();
        queue.info("first");
        queue.error("second");

        let toasts = queue.messages();
        assert_eq!(toasts.len(), 2);
        assert_eq!(toasts[0].message, "first");
        assert_eq!(toasts[1].severity, Severity::Error);
    }

    #[test]
    fn dismiss_removes_only_the_keyed_toast() {
        let queue = ToastQueue::new();
        queue.success("saved");
        queue.warning("slow");
        let key = queue.messages()[0].key;

        assert!(queue.dismiss(key));
        assert!(!queue.dismiss(key));
        assert_eq!(queue.drain().len(), 1);
        assert!(queue.messages().is_empty());
    }
}
