//! Domain-specific error types using `thiserror`.
//!
//! This module defines the main error enums for the catalog API, token
//! handling and form submission.

use std::result::Result as StdResult;

use {
    anyhow::Error,
    base64::DecodeError,
    reqwest::Error as HttpError,
    serde_json::{Error as SerdeJsonError, Value},
    thiserror::Error,
};

/// Field-level validation messages keyed by field name.
///
/// Fields keep the order the server listed them in, or the order they were
/// inserted for locally built errors.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FieldErrors(Vec<(String, Vec<String>)>);

impl FieldErrors {
    /// Parses a validation body such as `{"title": ["This field is required."]}`.
    ///
    /// Plain string values are accepted as single messages. Returns `None`
    /// when the body is not a JSON object.
    pub fn from_body(body: &str) -> Option<Self> {
        let Value::Object(map) = serde_json::from_str::<Value>(body).ok()? else {
            return None;
        };

        let fields = map
            .into_iter()
            .map(|(field, value)| {
                let messages = match value {
                    Value::Array(items) => items.into_iter().map(message_text).collect(),
                    other => vec![message_text(other)],
                };
                (field, messages)
            })
            .collect();
        Some(Self(fields))
    }

    /// Adds a message for `field`.
    pub fn insert(&mut self, field: impl Into<String>, message: impl Into<String>) {
        let field = field.into();
        let message = message.into();
        match self.0.iter_mut().find(|(name, _)| *name == field) {
            Some((_, messages)) => messages.push(message),
            None => self.0.push((field, vec![message])),
        }
    }

    /// The first message of every field, as `(field, message)` pairs.
    pub fn first_messages(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().filter_map(|(field, messages)| {
            messages.first().map(|message| (field.as_str(), message.as_str()))
        })
    }

    /// Messages for one field.
    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, messages)| messages.as_slice())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// One `field: message` line per field.
    pub fn summary(&self) -> String {
        self.first_messages()
            .map(|(field, message)| format!("{field}: {message}"))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

fn message_text(value: Value) -> String {
    match value {
        Value::String(text) => text,
        other => other.to_string(),
    }
}

/// Catalog API errors.
#[derive(Error, Debug)]
pub enum CatalogError {
    /// Transport failure or timeout.
    #[error("HTTP error: {0}")]
    HttpError(#[from] HttpError),
    /// The configured base URL cannot be used.
    #[error("Invalid API URL: {0}")]
    InvalidUrl(String),
    /// The server rejected the payload.
    #[error("Validation failed:\n{}", .fields.summary())]
    Validation { fields: FieldErrors },
    /// Missing or invalid access token.
    #[error("Authentication required")]
    Unauthorized,
    /// The token lacks the role the endpoint requires.
    #[error("Forbidden: {detail}")]
    Forbidden { detail: String },
    /// Record not found.
    #[error("Record not found: {entity} with id {id}")]
    NotFound { entity: String, id: i64 },
    /// Any other non-success status.
    #[error("Unexpected response {status}: {body}")]
    UnexpectedStatus { status: u16, body: String },
    /// The response body did not match the expected shape.
    #[error("Malformed response: {0}")]
    DecodeError(#[from] SerdeJsonError),
}

/// Access token errors.
#[derive(Error, Debug)]
pub enum AuthError {
    /// The token is not a three-segment JWT.
    #[error("Malformed token: {reason}")]
    MalformedToken { reason: String },
    /// The payload segment is not valid base64url.
    #[error("Token payload encoding error: {0}")]
    EncodingError(#[from] DecodeError),
    /// The payload is not the expected JSON claims object.
    #[error("Token claims error: {0}")]
    ClaimsError(#[from] SerdeJsonError),
    /// The issuer is served over http while https is required.
    #[error("Issuer must use https: {issuer}")]
    InsecureIssuer { issuer: String },
    /// The issuer is not a valid URL.
    #[error("Invalid issuer URL: {reason}")]
    InvalidIssuer { reason: String },
}

/// Form submission errors.
#[derive(Error, Debug)]
pub enum FormError {
    /// Local validation failed; nothing was sent.
    #[error("Form is invalid: {}", .fields.summary())]
    Invalid { fields: FieldErrors },
    /// The API call failed.
    #[error(transparent)]
    CatalogError(#[from] CatalogError),
}

/// Operational error context propagation with `anyhow`.
pub type Result<T> = StdResult<T, Error>;

#[cfg(test)]
mod tests {
    use crate::error::domain::{AuthError, CatalogError, FieldErrors, FormError};

    #[test]
    fn test_field_errors_from_validation_body() {
        let fields = FieldErrors::from_body(
            r#"{"title": ["This field is required.", "Too short."], "author": "Invalid pk."}"#,
        )
        .unwrap();

        assert_eq!(
            fields.first_messages().collect::<Vec<_>>(),
            vec![("title", "This field is required."), ("author", "Invalid pk.")]
        );
        assert_eq!(fields.get("title").map(<[String]>::len), Some(2));
    }

    #[test]
    fn test_field_errors_keep_body_order() {
        let fields = FieldErrors::from_body(
            r#"{"last_name": ["This field may not be blank."], "first_name": ["This field may not be blank."]}"#,
        )
        .unwrap();
        assert_eq!(
            fields.summary(),
            "last_name: This field may not be blank.\nfirst_name: This field may not be blank."
        );

        let mut local = FieldErrors::default();
        local.insert("title", "This field is required.");
        local.insert("author", "This field is required.");
        local.insert("title", "Too short.");
        assert_eq!(
            local.first_messages().map(|(field, _)| field).collect::<Vec<_>>(),
            vec!["title", "author"]
        );
        assert_eq!(local.get("title").map(<[String]>::len), Some(2));
    }

    #[test]
    fn test_field_errors_rejects_non_object() {
        assert!(FieldErrors::from_body("[1, 2]").is_none());
        assert!(FieldErrors::from_body("<html>").is_none());
    }

    #[test]
    fn test_catalog_error_display() {
        let not_found = CatalogError::NotFound {
            entity: "book".to_string(),
            id: 12,
        };
        assert_eq!(not_found.to_string(), "Record not found: book with id 12");

        let mut fields = FieldErrors::default();
        fields.insert("last_name", "This field may not be blank.");
        let validation = CatalogError::Validation { fields };
        assert_eq!(
            validation.to_string(),
            "Validation failed:\nlast_name: This field may not be blank."
        );
    }

    #[test]
    fn test_auth_and_form_error_display() {
        let malformed = AuthError::MalformedToken {
            reason: "expected 3 segments".to_string(),
        };
        assert_eq!(malformed.to_string(), "Malformed token: expected 3 segments");

        let form = FormError::from(CatalogError::Unauthorized);
        assert_eq!(form.to_string(), "Authentication required");
    }
}
