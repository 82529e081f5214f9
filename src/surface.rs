use std::fmt::{Display, Formatter};
use std::sync::atomic::{AtomicBool, Ordering};

use log::info;

/// A transient message shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    /// The user's input was rejected before anything was sent.
    Validation(String),
    /// An action completed.
    Success(String),
}

impl Display for Notification {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(message) => write!(f, "! {message}"),
            Self::Success(message) => write!(f, "✓ {message}"),
        }
    }
}

/// The front end hosting the page: navigation and notifications.
/// Both are fire-and-forget.
pub trait Surface: Send + Sync + 'static {
    /// Leave the page for the home route.
    fn navigate_home(&self);

    /// Show a notification.
    fn notify(&self, notification: Notification);
}

/// A [`Surface`] that prints notifications to stdout and remembers whether
/// the page asked to go home.
#[derive(Debug, Default)]
pub struct TerminalSurface {
    navigated_home: AtomicBool,
}

impl TerminalSurface {
    /// Whether the page has navigated away.
    pub fn navigated_home(&self) -> bool {
        self.navigated_home.load(Ordering::Acquire)
    }
}

impl Surface for TerminalSurface {
    fn navigate_home(&self) {
        info!("Navigating to home");
        self.navigated_home.store(true, Ordering::Release);
    }

    fn notify(&self, notification: Notification) {
        println!("{notification}");
    }
}

#[cfg(test)]
pub use recording::RecordingSurface;
