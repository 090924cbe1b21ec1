//! Shared application state and signaling.
//!
//! This module provides the service container handed to every component,
//! the observer lists behind the signaling components, and the list
//! refresh signal.

pub mod app_state;
pub mod observers;
pub mod refresh;

pub use {
    app_state::{AppState, AppStateEvent},
    observers::{Observers, Subscription},
    refresh::ListRefreshSignal,
};
