//! Transient notifications.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// How many notifications are kept on screen at once.
const MAX_VISIBLE: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastVariant {
    Default,
    /// Error styling.
    Destructive,
}

#[derive(Debug, Clone)]
pub struct Toast {
    pub title: String,
    pub description: String,
    pub variant: ToastVariant,
    shown_at: Instant,
}

/// Stack of notifications, newest first, each expiring after `ttl`.
#[derive(Debug)]
pub struct Toasts {
    items: VecDeque<Toast>,
    ttl: Duration,
}

impl Toasts {
    pub fn new(ttl: Duration) -> Self {
        Self {
            items: VecDeque::new(),
            ttl,
        }
    }

    pub fn info(&mut self, title: impl Into<String>, description: impl Into<String>) {
        self.push(title.into(), description.into(), ToastVariant::Default);
    }

    pub fn error(&mut self, title: impl Into<String>, description: impl Into<String>) {
        self.push(title.into(), description.into(), ToastVariant::Destructive);
    }

    fn push(&mut self, title: String, description: String, variant: ToastVariant) {
        match variant {
            ToastVariant::Destructive => tracing::warn!("{}: {}", title, description),
            ToastVariant::Default => tracing::debug!("{}: {}", title, description),
        }
        self.items.push_front(Toast {
            title,
            description,
            variant,
            shown_at: Instant::now(),
        });
        self.items.truncate(MAX_VISIBLE);
    }

    /// Drop notifications older than the time-to-live.
    pub fn expire(&mut self, now: Instant) {
        let ttl = self.ttl;
        self.items
            .retain(|toast| now.saturating_duration_since(toast.shown_at) < ttl);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Toast> {
        self.items.iter()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of visible notifications titled `title`.
    #[cfg(test)]
    pub fn count_titled(&self, title: &str) -> usize {
        self.items.iter().filter(|t| t.title == title).count()
    }

    /// The most recent notification.
    #[cfg(test)]
    pub fn latest(&self) -> Option<&Toast> {
        self.items.front()
    }
}
