//! User-visible confirmation notifications.
//!
//! Cart mutations and checkout always trigger a confirmation side effect
//! (the toast in the rendered UI). The containers only know the typed
//! message key; the presentation layer decides how to show it, so the seam
//! here is a trait the process wires once.

use crate::i18n::MessageKey;

/// Severity of a user-visible notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    /// Confirmation of a completed action.
    Success,
    /// A failure the user should see but that left state renderable.
    Error,
}

/// Sink for user-visible confirmation messages.
pub trait Notifier: Send + Sync {
    /// Deliver a notification. Must not fail; dropping a notice is
    /// acceptable, blocking the caller is not.
    fn notify(&self, level: NoticeLevel, key: MessageKey);
}

/// Default sink that records notices to the log stream.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, level: NoticeLevel, key: MessageKey) {
        match level {
            NoticeLevel::Success => tracing::info!(key = key.as_str(), "notice"),
            NoticeLevel::Error => tracing::warn!(key = key.as_str(), "notice"),
        }
    }
}
