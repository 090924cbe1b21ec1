//! Synchronous observer lists with unsubscribe handles.
//!
//! Both the notification broadcaster and the list refresh signal fan their
//! events out through an [`Observers`] list. Delivery happens on the calling
//! thread, in registration order, before the mutating call returns.

use std::{
    fmt::{Debug, Formatter, Result as FmtResult},
    sync::{
        Arc, Weak,
        atomic::{
            AtomicBool, AtomicU64,
            Ordering::{Acquire, Relaxed, Release},
        },
    },
};

use {parking_lot::Mutex, tracing::trace};

/// Boxed observer callback.
type Callback<T> = Box<dyn Fn(&T) + Send + Sync>;

/// One registered observer.
struct Slot<T> {
    id: u64,
    /// Cleared on unsubscribe so an in-flight fan-out skips this slot.
    active: AtomicBool,
    callback: Callback<T>,
}

struct Registry<T> {
    slots: Mutex<Vec<Arc<Slot<T>>>>,
    next_id: AtomicU64,
}

impl<T> Registry<T> {
    fn detach(&self, id: u64) {
        self.slots.lock().retain(|slot| slot.id != id);
    }
}

/// Ordered list of observers for values of type `T`.
///
/// Callbacks are invoked outside the internal lock, so an observer may
/// subscribe, unsubscribe or trigger another notification from inside its
/// callback without deadlocking.
pub struct Observers<T> {
    registry: Arc<Registry<T>>,
}

impl<T: 'static> Observers<T> {
    /// Creates an empty observer list.
    pub fn new() -> Self {
        Self {
            registry: Arc::new(Registry {
                slots: Mutex::new(Vec::new()),
                next_id: AtomicU64::new(0),
            }),
        }
    }

    /// Registers `callback`, to be invoked on every [`notify`](Self::notify)
    /// until the returned [`Subscription`] is released.
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        self.register(Box::new(callback)).0
    }

    /// Registers `callback` and immediately delivers `initial` to it alone.
    pub fn subscribe_with_initial<F>(&self, initial: &T, callback: F) -> Subscription
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        let (subscription, slot) = self.register(Box::new(callback));
        if slot.active.load(Acquire) {
            (slot.callback)(initial);
        }
        subscription
    }

    /// Delivers `value` to every active observer in registration order.
    pub fn notify(&self, value: &T) {
        let slots = self.registry.slots.lock().clone();
        trace!(observers = slots.len(), "Notifying observers");
        for slot in slots {
            if slot.active.load(Acquire) {
                (slot.callback)(value);
            }
        }
    }

    /// Number of currently registered observers.
    pub fn len(&self) -> usize {
        self.registry.slots.lock().len()
    }

    /// Whether no observer is registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn register(&self, callback: Callback<T>) -> (Subscription, Arc<Slot<T>>) {
        let id = self.registry.next_id.fetch_add(1, Relaxed);
        let slot = Arc::new(Slot {
            id,
            active: AtomicBool::new(true),
            callback,
        });
        self.registry.slots.lock().push(slot.clone());

        let registry: Weak<Registry<T>> = Arc::downgrade(&self.registry);
        let flag = slot.clone();
        let subscription = Subscription {
            detach: Some(Box::new(move || {
                flag.active.store(false, Release);
                if let Some(registry) = registry.upgrade() {
                    registry.detach(flag.id);
                }
            })),
        };

        (subscription, slot)
    }
}

impl<T: 'static> Default for Observers<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Debug for Observers<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("Observers")
            .field("len", &self.registry.slots.lock().len())
            .finish()
    }
}

/// Handle to a registered observer.
///
/// Calling [`unsubscribe`](Self::unsubscribe) or dropping the handle stops
/// delivery immediately, including for a notification already in progress.
#[must_use = "dropping a Subscription unsubscribes its observer"]
pub struct Subscription {
    detach: Option<Box<dyn FnOnce() + Send + Sync>>,
}

impl Subscription {
    /// Stops delivery to this observer.
    pub fn unsubscribe(mut self) {
        self.release();
    }

    /// Whether the observer is still registered through this handle.
    pub fn is_active(&self) -> bool {
        self.detach.is_some()
    }

    fn release(&mut self) {
        if let Some(detach) = self.detach.take() {
            detach();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.release();
    }
}

impl Debug for Subscription {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("Subscription")
            .field("active", &self.is_active())
            .finish()
    }
}
