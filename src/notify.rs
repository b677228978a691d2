//! Toast notification channel.
//!
//! Workflow flows complete (or fail) from deep inside async handlers whose
//! originating row may no longer be on screen. Toasts therefore go through
//! a small pub/sub hub with an explicit subscribe/unsubscribe lifecycle
//! instead of being owned by any particular component.

use std::time::Instant;

use once_cell::sync::Lazy;
use parking_lot::Mutex;

/// A toast notification message
#[derive(Debug, Clone, PartialEq)]
pub struct Toast {
    pub message: String,
    pub level: ToastLevel,
    pub timestamp: Instant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastLevel {
    Info,
    Success,
    Warning,
    Error,
}

impl Toast {
    pub fn new(message: String, level: ToastLevel) -> Self {
        Self {
            message,
            level,
            timestamp: Instant::now(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(message.into(), ToastLevel::Info)
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(message.into(), ToastLevel::Success)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(message.into(), ToastLevel::Warning)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(message.into(), ToastLevel::Error)
    }
}

/// Handle returned by [`ToastHub::subscribe`]; pass back to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubscriberId(u64);

type Listener = Box<dyn Fn(&Toast) + Send + Sync>;

#[derive(Default)]
struct HubInner {
    next_id: u64,
    listeners: Vec<(u64, Listener)>,
}

/// Publish/subscribe channel for toast notifications.
#[derive(Default)]
pub struct ToastHub {
    inner: Mutex<HubInner>,
}

impl ToastHub {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe<F>(&self, listener: F) -> SubscriberId
    where
        F: Fn(&Toast) + Send + Sync + 'static,
    {
        let mut inner = self.inner.lock();
        let id = inner.next_id;
        inner.next_id += 1;
        inner.listeners.push((id, Box::new(listener)));
        SubscriberId(id)
    }

    pub fn unsubscribe(&self, id: SubscriberId) {
        let mut inner = self.inner.lock();
        inner.listeners.retain(|(lid, _)| *lid != id.0);
    }

    pub fn publish(&self, toast: Toast) {
        let inner = self.inner.lock();
        for (_, listener) in &inner.listeners {
            listener(&toast);
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.lock().listeners.len()
    }
}

/// Process-wide hub the application wires together; tests build their own.
static GLOBAL_HUB: Lazy<ToastHub> = Lazy::new(ToastHub::new);

pub fn toast_hub() -> &'static ToastHub {
    &GLOBAL_HUB
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_publish_reaches_subscriber() {
        let hub = ToastHub::new();
        let seen = Arc::new(AtomicUsize::new(0));
        let seen_clone = Arc::clone(&seen);
        hub.subscribe(move |_| {
            seen_clone.fetch_add(1, Ordering::SeqCst);
        });

        hub.publish(Toast::success("Details updated successfully"));
        assert_eq!(seen.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_unsubscribed_listener_stops_receiving() {
        let hub = ToastHub::new();
        let seen = Arc::new(AtomicUsize::new(0));
        let seen_clone = Arc::clone(&seen);
        let id = hub.subscribe(move |_| {
            seen_clone.fetch_add(1, Ordering::SeqCst);
        });

        hub.publish(Toast::info("first"));
        hub.unsubscribe(id);
        hub.publish(Toast::info("second"));

        assert_eq!(seen.load(Ordering::SeqCst), 1);
        assert_eq!(hub.subscriber_count(), 0);
    }

    #[test]
    fn test_multiple_subscribers() {
        let hub = ToastHub::new();
        let seen = Arc::new(AtomicUsize::new(0));
        for _ in 0..3 {
            let seen_clone = Arc::clone(&seen);
            hub.subscribe(move |_| {
                seen_clone.fetch_add(1, Ordering::SeqCst);
            });
        }
        hub.publish(Toast::error("boom"));
        assert_eq!(seen.load(Ordering::SeqCst), 3);
    }
}
