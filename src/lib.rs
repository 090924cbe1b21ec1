//! Shelfmark - Library Catalog Client
//!
//! A client for a books and authors catalog served over REST and secured by
//! Keycloak. It provides the catalog HTTP client, role-based access checks,
//! headless views for listing and adding records, and a queue of timed,
//! user-facing notifications.

pub mod auth;
pub mod config;
pub mod error;
pub mod library;
pub mod notification;
pub mod state;
pub mod views;

// Re-export key types for convenience
pub use {
    auth::{AccessDecision, AuthConfig, AuthSession, Role, RouteGuard},
    config::{ClientSettings, SettingsManager},
    error::{AuthError, CatalogError, FormError},
    library::{Author, Book, CatalogApi, CatalogClient, ListQuery, Paginated},
    notification::{Notification, NotificationBroadcaster, NotificationKind, NotificationPresenter},
    state::{AppState, AppStateEvent, ListRefreshSignal},
    views::{AuthorForm, AuthorPicker, BookForm, BooksListController, BooksListView},
};
