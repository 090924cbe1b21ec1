//! Client settings with XDG Base Directory compliance.
//!
//! This module provides the persistent client configuration: the catalog
//! API location, the Keycloak realm used for sign-in, list defaults and
//! notification timing.

use std::{
    env::var,
    fs::{create_dir_all, read_to_string, write},
    io::Error as StdError,
    path::PathBuf,
    time::Duration,
};

use {
    parking_lot::{RwLock, RwLockReadGuard},
    serde::{Deserialize, Serialize},
    serde_json::{Error as SerdeJsonError, from_str, to_string_pretty},
    thiserror::Error,
    tracing::debug,
};

/// Error type for settings operations.
#[derive(Error, Debug)]
pub enum SettingsError {
    /// Failed to read or write settings file.
    #[error("IO error: {0}")]
    IoError(#[from] StdError),
    /// Failed to serialize or deserialize settings.
    #[error("Serialization error: {0}")]
    SerializationError(#[from] SerdeJsonError),
    /// Invalid settings value.
    #[error("Invalid settings value: {reason}")]
    InvalidValue { reason: String },
}

/// Keycloak realm the client signs in against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeycloakSettings {
    /// Base URL of the Keycloak server.
    pub url: String,
    /// Realm name.
    pub realm: String,
    /// Public client id registered for this front end.
    pub client_id: String,
    /// Whether the issuer must be served over HTTPS.
    pub require_https: bool,
}

impl Default for KeycloakSettings {
    fn default() -> Self {
        Self {
            url: "http://127.0.0.1:8080".to_string(),
            realm: "library-realm".to_string(),
            client_id: "library-web".to_string(),
            require_https: false,
        }
    }
}

/// Serializable client settings with default values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientSettings {
    /// Base URL of the catalog REST API.
    pub api_url: String,
    /// Identity provider settings.
    pub keycloak: KeycloakSettings,
    /// Rows per page in the books list.
    pub page_size: u32,
    /// Page sizes offered by the paginator.
    pub page_size_options: Vec<u32>,
    /// Quiet period before a search input triggers a reload.
    pub search_debounce_ms: u64,
    /// Dismiss delay for notifications that carry no duration.
    pub notification_duration_ms: u64,
    /// HTTP request timeout.
    pub request_timeout_secs: u64,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            api_url: "http://127.0.0.1:8000".to_string(),
            keycloak: KeycloakSettings::default(),
            page_size: 5,
            page_size_options: vec![5, 10, 25],
            search_debounce_ms: 300,
            notification_duration_ms: 3000,
            request_timeout_secs: 30,
        }
    }
}

impl ClientSettings {
    /// Checks values the client cannot work with.
    ///
    /// # Errors
    ///
    /// Returns `SettingsError::InvalidValue` naming the first bad field.
    pub fn validate(&self) -> Result<(), SettingsError> {
        let invalid = |reason: &str| {
            Err(SettingsError::InvalidValue {
                reason: reason.to_string(),
            })
        };

        if self.api_url.trim().is_empty() {
            return invalid("api_url must not be empty");
        }
        if self.page_size == 0 {
            return invalid("page_size must be positive");
        }
        if self.page_size_options.contains(&0) {
            return invalid("page_size_options must be positive");
        }
        if self.notification_duration_ms == 0 {
            return invalid("notification_duration_ms must be positive");
        }
        if self.request_timeout_secs == 0 {
            return invalid("request_timeout_secs must be positive");
        }
        Ok(())
    }

    pub fn search_debounce(&self) -> Duration {
        Duration::from_millis(self.search_debounce_ms)
    }

    pub fn notification_duration(&self) -> Duration {
        Duration::from_millis(self.notification_duration_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Handles loading, saving, and validation of client settings.
#[derive(Debug)]
pub struct SettingsManager {
    /// Thread-safe settings storage.
    settings: RwLock<ClientSettings>,
    /// Path to the configuration file on disk.
    config_path: PathBuf,
}

impl SettingsManager {
    /// Creates a new settings manager with the default config path.
    ///
    /// # Errors
    ///
    /// Returns `SettingsError` if settings cannot be loaded from disk or
    /// fail validation.
    pub fn new() -> Result<Self, SettingsError> {
        Self::with_config_path(get_config_path())
    }

    /// Creates a new settings manager with a custom config path.
    ///
    /// # Errors
    ///
    /// Returns `SettingsError` if settings cannot be loaded from disk or
    /// fail validation.
    pub fn with_config_path(config_path: PathBuf) -> Result<Self, SettingsError> {
        if let Some(parent) = config_path.parent() {
            create_dir_all(parent)?;
        }

        let settings: ClientSettings = if config_path.exists() {
            debug!("Loading settings from existing file: {:?}", config_path);
            let contents = read_to_string(&config_path)?;
            from_str(&contents)?
        } else {
            debug!("Using default settings, no file at {:?}", config_path);
            ClientSettings::default()
        };
        settings.validate()?;

        Ok(SettingsManager {
            settings: RwLock::new(settings),
            config_path,
        })
    }

    /// Creates an in-memory manager that never touched disk.
    pub fn from_settings(settings: ClientSettings, config_path: PathBuf) -> Self {
        Self {
            settings: RwLock::new(settings),
            config_path,
        }
    }

    /// Gets the current settings.
    pub fn get_settings(&self) -> RwLockReadGuard<'_, ClientSettings> {
        self.settings.read()
    }

    /// Gets the configuration file path.
    pub fn get_config_path(&self) -> &PathBuf {
        &self.config_path
    }

    /// Validates, applies and saves new settings.
    ///
    /// # Errors
    ///
    /// Returns `SettingsError` if the settings are invalid or cannot be
    /// saved to disk. Invalid settings are not applied.
    pub fn update_settings(&self, new_settings: ClientSettings) -> Result<(), SettingsError> {
        new_settings.validate()?;
        *self.settings.write() = new_settings;
        self.save_settings()
    }

    fn save_settings(&self) -> Result<(), SettingsError> {
        debug!("Saving settings to file: {:?}", self.config_path);
        let contents = to_string_pretty(&*self.settings.read())?;
        write(&self.config_path, contents)?;
        Ok(())
    }
}

/// Path of the settings file under the XDG config home.
#[must_use]
pub fn get_config_path() -> PathBuf {
    let mut config_dir = get_xdg_config_home();
    config_dir.push("shelfmark");
    config_dir.push("settings.json");
    config_dir
}

/// Uses `XDG_CONFIG_HOME` if set, otherwise `$HOME/.config`.
fn get_xdg_config_home() -> PathBuf {
    if let Ok(config_home) = var("XDG_CONFIG_HOME")
        && !config_home.is_empty()
    {
        return PathBuf::from(config_home);
    }

    if let Ok(home) = var("HOME") {
        let mut path = PathBuf::from(home);
        path.push(".config");
        return path;
    }

    PathBuf::from(".")
}
