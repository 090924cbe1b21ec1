//! One-at-a-time notification display with timed auto-dismiss.
//!
//! The presenter shows the head of the broadcaster's queue. Each shown
//! notification gets a dismiss timer armed for its own duration, or for the
//! presenter's default when it has none. The presenter owns that timer: a
//! manual dismissal drops it, and tearing the presenter down cancels it.

use std::{sync::Arc, time::Duration};

use {
    async_channel::{Receiver, unbounded},
    parking_lot::RwLock,
    tokio::{
        select, spawn,
        task::JoinHandle,
        time::{Instant, sleep_until},
    },
    tracing::debug,
};

use crate::{
    notification::{broadcaster::NotificationBroadcaster, models::NotificationHandle},
    state::observers::Subscription,
};

/// Consumer view rendering a single notification at a time.
pub struct NotificationPresenter {
    broadcaster: Arc<NotificationBroadcaster>,
    current: Arc<RwLock<Option<NotificationHandle>>>,
    task: JoinHandle<()>,
    _subscription: Subscription,
}

impl NotificationPresenter {
    /// Starts presenting notifications on the current tokio runtime.
    ///
    /// # Arguments
    ///
    /// * `broadcaster` - Source of the notification queue.
    /// * `default_duration` - Dismiss delay for notifications without one.
    ///
    /// # Panics
    ///
    /// Panics when called outside a tokio runtime.
    pub fn spawn(broadcaster: Arc<NotificationBroadcaster>, default_duration: Duration) -> Self {
        let (changed_tx, changed_rx) = unbounded();
        let subscription = broadcaster.subscribe(move |_| {
            let _ = changed_tx.try_send(());
        });

        let current = Arc::new(RwLock::new(None));
        let task = spawn(display_loop(
            broadcaster.clone(),
            current.clone(),
            changed_rx,
            default_duration,
        ));

        Self {
            broadcaster,
            current,
            task,
            _subscription: subscription,
        }
    }

    /// The notification currently displayed.
    pub fn current(&self) -> Option<NotificationHandle> {
        self.current.read().clone()
    }

    /// Dismisses the displayed notification ahead of its timer.
    pub fn close(&self) {
        let shown = self.current.read().clone();
        if let Some(shown) = shown {
            debug!(message = %shown.message, "Notification closed");
            self.broadcaster.remove(&shown);
        }
    }
}

impl Drop for NotificationPresenter {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn display_loop(
    broadcaster: Arc<NotificationBroadcaster>,
    current: Arc<RwLock<Option<NotificationHandle>>>,
    changes: Receiver<()>,
    default_duration: Duration,
) {
    loop {
        let head = broadcaster.peek_first();
        *current.write() = head.clone();

        let Some(shown) = head else {
            if changes.recv().await.is_err() {
                return;
            }
            continue;
        };

        let delay = shown.duration.unwrap_or(default_duration);
        let deadline = Instant::now() + delay;
        debug!(
            kind = %shown.kind,
            delay_ms = delay.as_millis() as u64,
            "Showing notification"
        );

        loop {
            select! {
                () = sleep_until(deadline) => {
                    broadcaster.remove(&shown);
                    break;
                }
                changed = changes.recv() => {
                    if changed.is_err() {
                        return;
                    }
                    // Head replaced before expiry: drop this timer.
                    if broadcaster.peek_first().as_ref() != Some(&shown) {
                        break;
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{sync::Arc, time::Duration};

    use tokio::{task::yield_now, time::sleep};

    use crate::notification::{
        broadcaster::NotificationBroadcaster, models::Notification,
        presenter::NotificationPresenter,
    };

    async fn settle() {
        for _ in 0..8 {
            yield_now().await;
        }
    }

    async fn advance_ms(millis: u64) {
        sleep(Duration::from_millis(millis)).await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_shows_head_then_next_after_expiry() {
        let broadcaster = Arc::new(NotificationBroadcaster::new());
        let welcome = broadcaster.push(Notification::info("Welcome").with_duration(3000));
        let error = broadcaster.push(Notification::error("Error").with_duration(4000));

        let presenter = NotificationPresenter::spawn(broadcaster.clone(), Duration::from_millis(3000));
        settle().await;
        assert_eq!(presenter.current(), Some(welcome.clone()));

        advance_ms(2999).await;
        assert_eq!(presenter.current(), Some(welcome));

        advance_ms(2).await;
        assert_eq!(presenter.current(), Some(error));
        assert_eq!(broadcaster.len(), 1);

        advance_ms(4000).await;
        assert!(broadcaster.is_empty());
        assert_eq!(presenter.current(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_missing_duration_uses_default() {
        let broadcaster = Arc::new(NotificationBroadcaster::new());
        let presenter = NotificationPresenter::spawn(broadcaster.clone(), Duration::from_millis(500));
        settle().await;

        broadcaster.push(Notification::warning("No duration"));
        advance_ms(499).await;
        assert!(presenter.current().is_some());

        advance_ms(2).await;
        assert!(broadcaster.is_empty());
        assert!(presenter.current().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_close_arms_fresh_timer_for_next() {
        let broadcaster = Arc::new(NotificationBroadcaster::new());
        broadcaster.push(Notification::info("first").with_duration(1000));
        let second = broadcaster.push(Notification::info("second").with_duration(1000));

        let presenter = NotificationPresenter::spawn(broadcaster.clone(), Duration::from_millis(3000));
        settle().await;

        advance_ms(500).await;
        presenter.close();
        settle().await;
        assert_eq!(presenter.current(), Some(second));

        advance_ms(600).await;
        assert_eq!(broadcaster.len(), 1);

        advance_ms(401).await;
        assert!(broadcaster.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_cancels_pending_timer() {
        let broadcaster = Arc::new(NotificationBroadcaster::new());
        broadcaster.push(Notification::info("pending").with_duration(1000));

        let presenter = NotificationPresenter::spawn(broadcaster.clone(), Duration::from_millis(3000));
        settle().await;
        assert_eq!(broadcaster.subscriber_count(), 1);

        drop(presenter);
        advance_ms(2000).await;

        assert_eq!(broadcaster.len(), 1);
        assert_eq!(broadcaster.subscriber_count(), 0);
    }
}
