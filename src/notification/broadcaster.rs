//! Queue of transient notifications with synchronous snapshot fan-out.

use {
    parking_lot::{ReentrantMutex, RwLock},
    tracing::debug,
};

use crate::{
    notification::models::{Notification, NotificationHandle, NotificationQueue},
    state::observers::{Observers, Subscription},
};

/// Decouples producers of status messages from the view rendering them.
///
/// Every mutation delivers the full updated queue to all subscribers before
/// returning. Subscribers receive the current queue as soon as they
/// subscribe.
#[derive(Debug)]
pub struct NotificationBroadcaster {
    /// Serializes mutate-then-notify so snapshots arrive in mutation order.
    /// Reentrant so observers may push or remove from their callback.
    dispatch: ReentrantMutex<()>,
    queue: RwLock<Vec<NotificationHandle>>,
    observers: Observers<NotificationQueue>,
}

impl NotificationBroadcaster {
    /// Creates an empty broadcaster.
    pub fn new() -> Self {
        Self {
            dispatch: ReentrantMutex::new(()),
            queue: RwLock::new(Vec::new()),
            observers: Observers::new(),
        }
    }

    /// Appends a notification to the tail of the queue.
    ///
    /// # Returns
    ///
    /// The handle of the queued instance, usable with [`remove`](Self::remove).
    pub fn push(&self, notification: Notification) -> NotificationHandle {
        let _dispatch = self.dispatch.lock();
        let handle = NotificationHandle::new(notification);
        let snapshot = {
            let mut queue = self.queue.write();
            queue.push(handle.clone());
            NotificationQueue::from(queue.clone())
        };
        debug!(
            kind = %handle.kind,
            queued = snapshot.len(),
            "Notification pushed"
        );
        self.observers.notify(&snapshot);
        handle
    }

    /// Subscribes to queue snapshots.
    ///
    /// The observer receives the current queue immediately, then one
    /// snapshot per subsequent mutation until the subscription is released.
    pub fn subscribe<F>(&self, observer: F) -> Subscription
    where
        F: Fn(&NotificationQueue) + Send + Sync + 'static,
    {
        let _dispatch = self.dispatch.lock();
        let snapshot = self.snapshot();
        self.observers.subscribe_with_initial(&snapshot, observer)
    }

    /// Returns the head of the queue without removing it.
    pub fn peek_first(&self) -> Option<NotificationHandle> {
        self.queue.read().first().cloned()
    }

    /// Removes the given instance from the queue.
    ///
    /// Structurally equal notifications pushed separately are distinct
    /// instances and stay queued. Removing an instance that is not queued
    /// leaves the queue untouched and notifies nobody.
    pub fn remove(&self, handle: &NotificationHandle) {
        let _dispatch = self.dispatch.lock();
        let snapshot = {
            let mut queue = self.queue.write();
            let Some(index) = queue.iter().position(|queued| queued.same_instance(handle)) else {
                return;
            };
            queue.remove(index);
            NotificationQueue::from(queue.clone())
        };
        debug!(queued = snapshot.len(), "Notification removed");
        self.observers.notify(&snapshot);
    }

    /// Current queue contents.
    pub fn snapshot(&self) -> NotificationQueue {
        NotificationQueue::from(self.queue.read().clone())
    }

    pub fn len(&self) -> usize {
        self.queue.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.read().is_empty()
    }

    /// Number of live subscriptions.
    pub fn subscriber_count(&self) -> usize {
        self.observers.len()
    }
}

impl Default for NotificationBroadcaster {
    fn default() -> Self {
        Self::new()
    }
}
