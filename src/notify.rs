//! User-facing notifications
//!
//! Components report outcomes through a [`Notifier`] instead of printing.
//! The CLI renders them with the console helpers in `ui`; tests collect
//! them in a [`NoticeLog`].

use std::cell::RefCell;
use std::fmt;

/// Severity of a notice, mirrored from the page's toast styles
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Error,
    Warning,
    Info,
}

impl fmt::Display for NoticeLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Success => "success",
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Info => "info",
        };
        write!(f, "{}", name)
    }
}

/// A single notice as delivered to a notifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

/// Sink for user-facing notices
pub trait Notifier {
    fn notify(&self, level: NoticeLevel, message: &str);
}

/// Notifier that records every notice in order
#[derive(Debug, Default)]
pub struct NoticeLog {
    notices: RefCell<Vec<Notice>>,
}

impl NoticeLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the recorded notices
    pub fn notices(&self) -> Vec<Notice> {
        self.notices.borrow().clone()
    }

    pub fn len(&self) -> usize {
        self.notices.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.notices.borrow().is_empty()
    }

    /// Most recent notice, if any
    pub fn last(&self) -> Option<Notice> {
        self.notices.borrow().last().cloned()
    }
}

impl Notifier for NoticeLog {
    fn notify(&self, level: NoticeLevel, message: &str) {
        self.notices.borrow_mut().push(Notice {
            level,
            message: message.to_string(),
        });
    }
}

impl<N: Notifier + ?Sized> Notifier for &N {
    fn notify(&self, level: NoticeLevel, message: &str) {
        (**self).notify(level, message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_records_in_order() {
        let log = NoticeLog::new();
        log.notify(NoticeLevel::Success, "first");
        log.notify(NoticeLevel::Info, "second");

        let notices = log.notices();
        assert_eq!(notices.len(), 2);
        assert_eq!(notices[0].message, "first");
        assert_eq!(log.last().unwrap().level, NoticeLevel::Info);
    }

    #[test]
    fn level_display() {
        assert_eq!(NoticeLevel::Warning.to_string(), "warning");
    }
}
