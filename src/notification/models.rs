//! Notification value types.
//!
//! A [`Notification`] is an immutable message. Once pushed to the
//! broadcaster it is wrapped in a [`NotificationHandle`], whose equality is
//! by identity: two handles compare equal only when they point at the same
//! queued instance, even if the messages are identical.

use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    ops::Deref,
    sync::Arc,
    time::Duration,
};

use serde::{Deserialize, Serialize};

/// Severity of a notification, determining its presentation style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    /// Neutral informational message.
    Info,
    /// A completed operation.
    Success,
    /// A non-critical issue the user should see.
    Warning,
    /// A failed operation.
    Error,
}

impl Display for NotificationKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        let label = match self {
            Self::Info => "info",
            Self::Success => "success",
            Self::Warning => "warning",
            Self::Error => "error",
        };
        f.write_str(label)
    }
}

/// A transient user-facing status message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    /// Human-readable text.
    pub message: String,
    /// Presentation style.
    pub kind: NotificationKind,
    /// Time before auto-dismiss. `None` means the consumer picks its default.
    /// On the wire this is `duration`, in whole milliseconds.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "duration_ms"
    )]
    pub duration: Option<Duration>,
}

impl Notification {
    /// Creates a notification without an explicit duration.
    pub fn new(kind: NotificationKind, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind,
            duration: None,
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(NotificationKind::Info, message)
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(NotificationKind::Success, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(NotificationKind::Warning, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(NotificationKind::Error, message)
    }

    /// Sets the auto-dismiss duration in milliseconds.
    #[must_use]
    pub fn with_duration(mut self, millis: u64) -> Self {
        self.duration = Some(Duration::from_millis(millis));
        self
    }
}

/// A queued notification instance.
///
/// Cloning a handle shares the instance. Equality is identity-based.
#[derive(Debug, Clone)]
pub struct NotificationHandle(Arc<Notification>);

impl NotificationHandle {
    pub(crate) fn new(notification: Notification) -> Self {
        Self(Arc::new(notification))
    }

    /// Whether both handles refer to the same queued instance.
    pub fn same_instance(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// The notification value.
    pub fn notification(&self) -> &Notification {
        &self.0
    }
}

impl PartialEq for NotificationHandle {
    fn eq(&self, other: &Self) -> bool {
        self.same_instance(other)
    }
}

impl Eq for NotificationHandle {}

impl Deref for NotificationHandle {
    type Target = Notification;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Ordered snapshot of the notification queue, head first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NotificationQueue(Vec<NotificationHandle>);

impl NotificationQueue {
    /// The notifications in display order.
    pub fn as_slice(&self) -> &[NotificationHandle] {
        &self.0
    }

    /// Messages in display order.
    pub fn messages(&self) -> Vec<&str> {
        self.0.iter().map(|handle| handle.message.as_str()).collect()
    }
}

impl From<Vec<NotificationHandle>> for NotificationQueue {
    fn from(handles: Vec<NotificationHandle>) -> Self {
        Self(handles)
    }
}

impl Deref for NotificationQueue {
    type Target = [NotificationHandle];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

mod duration_ms {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(duration) => serializer.serialize_some(&(duration.as_millis() as u64)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Duration>, D::Error> {
        Ok(Option::<u64>::deserialize(deserializer)?.map(Duration::from_millis))
    }
}
