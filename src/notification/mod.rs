//! Transient user-facing notifications.
//!
//! Producers push [`Notification`]s to a shared [`NotificationBroadcaster`];
//! a [`NotificationPresenter`] shows them one at a time and dismisses each
//! after its duration.

pub mod broadcaster;
pub mod models;
pub mod presenter;

pub use {
    broadcaster::NotificationBroadcaster,
    models::{Notification, NotificationHandle, NotificationKind, NotificationQueue},
    presenter::NotificationPresenter,
};
