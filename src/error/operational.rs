//! Operational error context propagation and user-facing reporting.
//!
//! Every failure is reported once: logged with `tracing`, then surfaced to
//! the user as an error notification. Nothing is retried.

use std::{error::Error as StdError, fmt::Display};

use {
    anyhow::{Context, Result as AnyhowResult},
    tracing::{debug, error, warn},
};

use crate::{
    error::domain::CatalogError,
    notification::{Notification, NotificationBroadcaster, NotificationHandle},
};

/// Extension trait for enhanced error context.
pub trait ResultExt<T, E> {
    /// Adds context to an error with a static string.
    fn add_context(self, context: &'static str) -> AnyhowResult<T>
    where
        E: StdError + Send + Sync + 'static;

    /// Adds context to an error with a formatted string.
    fn add_contextf(self, format: impl Display) -> AnyhowResult<T>
    where
        E: StdError + Send + Sync + 'static;
}

impl<T, E> ResultExt<T, E> for Result<T, E> {
    fn add_context(self, context: &'static str) -> AnyhowResult<T>
    where
        E: StdError + Send + Sync + 'static,
    {
        self.context(context)
    }

    fn add_contextf(self, format: impl Display) -> AnyhowResult<T>
    where
        E: StdError + Send + Sync + 'static,
    {
        self.context(format.to_string())
    }
}

/// Centralized error logging and user reporting.
pub struct ErrorReporter;

impl ErrorReporter {
    /// Logs a failure that has already been surfaced elsewhere.
    pub fn debug(error: &dyn Display, context: &str) {
        debug!(context = context, error = %error, "Operation failed");
    }

    /// Logs a recoverable failure the user is not told about.
    pub fn warn(error: &dyn Display, context: &str) {
        warn!(context = context, error = %error, "Operation failed");
    }

    /// Logs a failure that ends the current command.
    pub fn error(error: &dyn Display, context: &str) {
        error!(context = context, error = %error, "Operation failed");
    }

    /// Converts a catalog error into a message fit for end users.
    ///
    /// Validation failures list the first message of each field, one per
    /// line, below `headline`.
    pub fn to_user_message(headline: &str, error: &CatalogError) -> String {
        match error {
            CatalogError::Validation { fields } if !fields.is_empty() => {
                format!("{headline}\n{}", fields.summary())
            }
            CatalogError::Unauthorized => format!("{headline}: please sign in again"),
            CatalogError::Forbidden { .. } => {
                format!("{headline}: you do not have permission to perform this action")
            }
            CatalogError::HttpError(_) => format!("{headline}: the library service is unreachable"),
            other => format!("{headline}: {other}"),
        }
    }

    /// Logs a failed catalog operation and pushes it as an error notification.
    pub fn notify_failure(
        broadcaster: &NotificationBroadcaster,
        headline: &str,
        error: &CatalogError,
        duration_ms: u64,
    ) -> NotificationHandle {
        error!(context = headline, error = %error, "Catalog operation failed");
        broadcaster.push(
            Notification::error(Self::to_user_message(headline, error)).with_duration(duration_ms),
        )
    }
}
