//! Change notifications.
//!
//! Backends publish a [`WriteEvent`] for every document write and a [`DeleteEvent`] for
//! every document that disappears. Events go through an [`EventChannel`]: an observer
//! list with synchronous, in-process fan-out. There is no buffering or replay, so a
//! subscriber only sees events emitted after it subscribed.
//!
//! # Example
//!
//! ```ignore
//! let id = store.on_write().subscribe(|event: &WriteEvent| {
//!     println!("{} changed: {:?} -> {:?}", event.path, event.before, event.after);
//! });
//!
//! // ...
//!
//! store.on_write().unsubscribe(id);
//! ```

use bson::Bson;
use std::{
    fmt,
    sync::{
        Arc, RwLock,
        atomic::{AtomicU64, Ordering},
    },
};

use crate::path::DocumentPath;

/// Emitted after a document is written.
#[derive(Debug, Clone, PartialEq)]
pub struct WriteEvent {
    pub path: DocumentPath,
    /// Document data before the write, `None` if the document did not exist.
    pub before: Option<Bson>,
    /// Document data after the write (the merged or replaced result).
    pub after: Bson,
}

/// Emitted after a document is deleted, either directly or with its collection.
#[derive(Debug, Clone, PartialEq)]
pub struct DeleteEvent {
    pub path: DocumentPath,
    pub before: Bson,
}

/// Handle returned by [`EventChannel::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Callback<E> = Arc<dyn Fn(&E) + Send + Sync>;

/// Synchronous publish/subscribe channel.
///
/// Subscribers are invoked in subscription order on the thread that emits. The
/// subscriber list is snapshotted before fan-out, so a callback may subscribe or
/// unsubscribe without deadlocking; such changes apply from the next event on.
pub struct EventChannel<E> {
    subscribers: RwLock<Vec<(SubscriptionId, Callback<E>)>>,
    next_id: AtomicU64,
}

impl<E> EventChannel<E> {
    pub fn new() -> Self {
        Self {
            subscribers: RwLock::new(Vec::new()),
            next_id: AtomicU64::new(0),
        }
    }

    /// Registers a callback invoked for every subsequent event.
    pub fn subscribe<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&E) + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));

        self.subscribers
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push((id, Arc::new(callback)));

        id
    }

    /// Removes a subscriber. Returns `false` if it was not registered.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut subscribers = self
            .subscribers
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let before = subscribers.len();

        subscribers.retain(|(existing, _)| *existing != id);
        subscribers.len() != before
    }

    /// Delivers `event` to every current subscriber.
    pub fn emit(&self, event: &E) {
        let callbacks = self
            .subscribers
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .iter()
            .map(|(_, callback)| Arc::clone(callback))
            .collect::<Vec<_>>();

        tracing::trace!(subscribers = callbacks.len(), "emitting change event");

        for callback in callbacks {
            callback(event);
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }
}

impl<E> Default for EventChannel<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> fmt::Debug for EventChannel<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventChannel")
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}
