//! Application service container with reactive update mechanisms.
//!
//! `AppState` is built once at start-up and handed to every component that
//! needs the shared services, instead of looking them up globally.

use std::sync::Arc;

use {
    parking_lot::RwLock,
    tokio::sync::broadcast::{Receiver, Sender, channel},
    tracing::info,
};

use crate::{
    auth::{AccessDecision, AuthSession, Role, RouteGuard},
    config::SettingsManager,
    notification::{Notification, NotificationBroadcaster, NotificationHandle},
    state::refresh::ListRefreshSignal,
};

/// Central container for the shared services and session state.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Queue of user-facing notifications.
    pub notifications: Arc<NotificationBroadcaster>,
    /// Signal telling the books list to reload.
    pub books_refresh: Arc<ListRefreshSignal>,
    /// Client settings.
    pub settings: Arc<SettingsManager>,
    /// Signed-in user, if any.
    session: Arc<RwLock<Option<AuthSession>>>,
    /// Broadcast channel for state change notifications.
    state_tx: Sender<AppStateEvent>,
}

/// Application state change events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppStateEvent {
    /// A user signed in or out. Carries the username when known.
    SessionChanged(Option<String>),
    /// The books list finished loading a page.
    BooksListLoaded {
        /// 1-based page number.
        page: u32,
        total_records: u64,
    },
}

impl AppState {
    /// Creates the application state around loaded settings.
    pub fn new(settings: Arc<SettingsManager>) -> Self {
        let (state_tx, _) = channel(16);

        Self {
            notifications: Arc::new(NotificationBroadcaster::new()),
            books_refresh: Arc::new(ListRefreshSignal::new()),
            settings,
            session: Arc::new(RwLock::new(None)),
            state_tx,
        }
    }

    /// Replaces the session and notifies subscribers.
    pub fn set_session(&self, session: Option<AuthSession>) {
        let username = session
            .as_ref()
            .and_then(|session| session.username().map(str::to_owned));
        *self.session.write() = session;
        info!(user = username.as_deref().unwrap_or("anonymous"), "Session changed");
        let _ = self.state_tx.send(AppStateEvent::SessionChanged(username));
    }

    /// Gets the current session.
    pub fn get_session(&self) -> Option<AuthSession> {
        self.session.read().clone()
    }

    /// Whether the signed-in user holds `role`.
    pub fn can(&self, role: Role) -> bool {
        self.session
            .read()
            .as_ref()
            .is_some_and(|session| session.has_role(role))
    }

    /// Runs `guard` against the current session.
    pub fn check_access(&self, guard: RouteGuard) -> AccessDecision {
        guard.check(self.session.read().as_ref())
    }

    /// Pushes a notification using the configured duration unless it has one.
    pub fn notify(&self, mut notification: Notification) -> NotificationHandle {
        if notification.duration.is_none() {
            notification.duration = Some(self.settings.get_settings().notification_duration());
        }
        self.notifications.push(notification)
    }

    /// Announces a loaded books page.
    pub fn publish_books_loaded(&self, page: u32, total_records: u64) {
        let _ = self
            .state_tx
            .send(AppStateEvent::BooksListLoaded { page, total_records });
    }

    /// Subscribes to application state changes.
    pub fn subscribe(&self) -> Receiver<AppStateEvent> {
        self.state_tx.subscribe()
    }
}
