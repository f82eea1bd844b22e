//! User-visible side effects
//!
//! The classifier is the only component that raises global notifications or
//! forces navigation to the login view. Both go through these traits so the
//! host (a CLI, a desktop shell, a test) decides how they are rendered.

use std::fmt;

/// Severity of a user notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NoticeLevel {
    /// Confirmation of a completed action
    Success,
    /// Recoverable problem
    Warning,
    /// Failed request
    Error,
}

impl NoticeLevel {
    /// Stable name
    pub fn as_str(&self) -> &'static str {
        match self {
            NoticeLevel::Success => "success",
            NoticeLevel::Warning => "warning",
            NoticeLevel::Error => "error",
        }
    }
}

impl fmt::Display for NoticeLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A global notification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    /// Severity
    pub level: NoticeLevel,
    /// Text shown to the user
    pub message: String,
}

impl Notice {
    /// Error notice
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }

    /// Warning notice
    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Warning,
            message: message.into(),
        }
    }

    /// Success notice
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }
}

/// Sink for global notifications
pub trait Notifier: Send + Sync {
    /// Show a notification
    fn notify(&self, notice: Notice);
}

/// Sink for forced navigation
pub trait Navigator: Send + Sync {
    /// Navigate to `route`
    fn navigate(&self, route: &str);
}

/// Renders notifications as tracing events
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notice: Notice) {
        match notice.level {
            NoticeLevel::Success => {
                tracing::info!(target: "scholar::notify", message = %notice.message)
            }
            NoticeLevel::Warning => {
                tracing::warn!(target: "scholar::notify", message = %notice.message)
            }
            NoticeLevel::Error => {
                tracing::error!(target: "scholar::notify", message = %notice.message)
            }
        }
    }
}

/// Navigator for hosts without views; records the request in the log
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingNavigator;

impl Navigator for LoggingNavigator {
    fn navigate(&self, route: &str) {
        tracing::info!(target: "scholar::notify", route, "Navigation requested");
    }
}
