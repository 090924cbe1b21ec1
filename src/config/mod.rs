//! Client configuration and persistent settings.
//!
//! This module provides settings management with XDG Base Directory
//! compliance.

pub mod settings;

pub use settings::{ClientSettings, KeycloakSettings, SettingsError, SettingsManager, get_config_path};
