//! One-shot user-visible notifications.

use std::fmt;

pub const NOTE_ADDED: &str = "Note Added successfully";
pub const NOTE_UPDATED: &str = "Note Updated successfully";
pub const NOTE_DELETED: &str = "Note deleted successfully";
pub const EMPTY_CONTENT: &str = "Please Enter any content";
pub const GENERIC_ERROR: &str = "Error occurred, please try again.";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NotificationLevel {
    Success,
    Warning,
    Error,
}

/// A short-lived message for the user. Later notifications replace earlier
/// ones on the display surface; nothing is queued.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
}

impl Notification {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Success,
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Warning,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Error,
            message: message.into(),
        }
    }
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Fire-and-forget sink for notifications.
pub trait Notifier {
    fn notify(&self, notification: Notification);
}

/// Notifier that only logs.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notification: Notification) {
        match notification.level {
            NotificationLevel::Success => tracing::info!("{notification}"),
            NotificationLevel::Warning => tracing::warn!("{notification}"),
            NotificationLevel::Error => tracing::error!("{notification}"),
        }
    }
}

impl<F> Notifier for F
where
    F: Fn(Notification),
{
    fn notify(&self, notification: Notification) {
        self(notification);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_keep_the_app_wording() {
        assert_eq!(NOTE_ADDED, "Note Added successfully");
        assert_eq!(NOTE_UPDATED, "Note Updated successfully");
        assert_eq!(NOTE_DELETED, "Note deleted successfully");
        assert_eq!(EMPTY_CONTENT, "Please Enter any content");
        assert_eq!(GENERIC_ERROR, "Error occurred, please try again.");
        assert_eq!(Notification::warning(EMPTY_CONTENT).to_string(), EMPTY_CONTENT);
    }
}
