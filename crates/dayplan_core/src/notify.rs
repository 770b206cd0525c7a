//! Core-to-presentation change notifications.
//!
//! # Responsibility
//! - Hold registered listeners as an explicit context object shared by the
//!   store, the registry and the scheduler.
//!
//! # Invariants
//! - Delivery is fire-and-forget; listener order is unspecified.
//! - Listeners run outside the registration lock, so a listener may register
//!   another listener without deadlocking.

use crate::reminder::engine::ReminderNotice;
use std::sync::{Arc, Mutex, PoisonError};

/// Notification emitted by core components.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoreNotification {
    /// The active profile's event collection changed or was reloaded.
    EventsChanged,
    /// The profile list or the active profile changed.
    ProfilesChanged,
    /// A reminder window opened for an event.
    ReminderFired(ReminderNotice),
}

type Listener = Arc<dyn Fn(&CoreNotification) + Send + Sync>;

/// Shared listener list.
#[derive(Clone, Default)]
pub struct Notifier {
    listeners: Arc<Mutex<Vec<Listener>>>,
}

impl Notifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a listener for every future notification.
    pub fn subscribe(&self, listener: impl Fn(&CoreNotification) + Send + Sync + 'static) {
        self.listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Arc::new(listener));
    }

    pub fn listener_count(&self) -> usize {
        self.listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Invokes every listener on the calling thread.
    pub fn emit(&self, notification: &CoreNotification) {
        let listeners: Vec<Listener> = self
            .listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        for listener in listeners {
            listener(notification);
        }
    }
}

impl std::fmt::Debug for Notifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Notifier")
            .field("listeners", &self.listener_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::{CoreNotification, Notifier};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn emit_reaches_every_listener() {
        let notifier = Notifier::new();
        let hits = Arc::new(AtomicUsize::new(0));
        for _ in 0..3 {
            let hits = Arc::clone(&hits);
            notifier.subscribe(move |_| {
                hits.fetch_add(1, Ordering::SeqCst);
            });
        }

        notifier.emit(&CoreNotification::EventsChanged);
        assert_eq!(hits.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn listener_may_subscribe_during_emit() {
        let notifier = Notifier::new();
        let inner = notifier.clone();
        notifier.subscribe(move |_| inner.subscribe(|_| {}));

        notifier.emit(&CoreNotification::ProfilesChanged);
        assert_eq!(notifier.listener_count(), 2);
    }
}
