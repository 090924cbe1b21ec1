//! Access token claims and the signed-in session.
//!
//! Only the payload segment of the JWT is decoded. The signature is the
//! API server's business; the client reads claims to decide which actions
//! to offer.

use std::fmt::{Display, Formatter, Result as FmtResult};

use {
    base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD},
    chrono::{DateTime, Utc},
    serde::{Deserialize, Serialize},
    serde_json::from_slice,
    tracing::debug,
};

use crate::error::domain::AuthError;

/// Realm roles gating catalog actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    /// List and read books and authors.
    ViewBooks,
    /// Create, edit and delete books.
    CreateBook,
    /// Create, edit and delete authors.
    CreateAuthor,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ViewBooks => "view-books",
            Self::CreateBook => "create-book",
            Self::CreateAuthor => "create-author",
        }
    }
}

impl Display for Role {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

/// `realm_access` claim.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RealmAccess {
    #[serde(default)]
    pub roles: Vec<String>,
}

/// Claims read from an access token payload.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AccessClaims {
    #[serde(default)]
    pub sub: Option<String>,
    /// Expiry, seconds since the Unix epoch.
    #[serde(default)]
    pub exp: Option<u64>,
    #[serde(default)]
    pub preferred_username: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub realm_access: Option<RealmAccess>,
}

impl AccessClaims {
    /// Decodes the payload segment of a compact JWT.
    ///
    /// # Errors
    ///
    /// Returns `AuthError` if the token does not have three segments or the
    /// payload is not base64url-encoded JSON.
    pub fn decode(token: &str) -> Result<Self, AuthError> {
        let segments: Vec<&str> = token.trim().split('.').collect();
        if segments.len() != 3 {
            return Err(AuthError::MalformedToken {
                reason: format!("expected 3 segments, found {}", segments.len()),
            });
        }

        let payload = URL_SAFE_NO_PAD.decode(segments[1].trim_end_matches('='))?;
        Ok(from_slice(&payload)?)
    }

    /// Realm roles, empty when the claim is absent.
    pub fn roles(&self) -> &[String] {
        self.realm_access
            .as_ref()
            .map(|access| access.roles.as_slice())
            .unwrap_or_default()
    }

    pub fn has_role(&self, role: Role) -> bool {
        self.roles().iter().any(|granted| granted == role.as_str())
    }
}

/// A signed-in user: the raw token and its decoded claims.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthSession {
    access_token: String,
    claims: AccessClaims,
}

impl AuthSession {
    /// Builds a session from a compact JWT access token.
    ///
    /// # Errors
    ///
    /// Returns `AuthError` if the token cannot be decoded.
    pub fn from_token(token: impl Into<String>) -> Result<Self, AuthError> {
        let access_token = token.into();
        let claims = AccessClaims::decode(&access_token)?;
        debug!(
            user = claims.preferred_username.as_deref().unwrap_or("unknown"),
            roles = claims.roles().len(),
            "Session established"
        );
        Ok(Self {
            access_token,
            claims,
        })
    }

    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    pub fn claims(&self) -> &AccessClaims {
        &self.claims
    }

    pub fn username(&self) -> Option<&str> {
        self.claims.preferred_username.as_deref()
    }

    pub fn has_role(&self, role: Role) -> bool {
        self.claims.has_role(role)
    }

    /// Whether the token had expired at `now` (seconds since the epoch).
    /// Tokens without `exp` never expire client-side.
    pub fn is_expired_at(&self, now: u64) -> bool {
        self.claims.exp.is_some_and(|exp| exp <= now)
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(unix_now())
    }

    /// Expiry instant from the `exp` claim.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        let exp = i64::try_from(self.claims.exp?).ok()?;
        DateTime::from_timestamp(exp, 0)
    }
}

/// Seconds since the Unix epoch.
pub fn unix_now() -> u64 {
    u64::try_from(Utc::now().timestamp()).unwrap_or_default()
}

#[cfg(test)]
pub(crate) fn token_with(claims: &serde_json::Value) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"RS256","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(claims.to_string());
    format!("{header}.{payload}.signature")
}

#[cfg(test)]
mod tests {
    use {
        chrono::{TimeZone, Utc},
        serde_json::json,
    };

    use crate::{
        auth::claims::{
            AccessClaims, AuthSession,
            Role::{CreateAuthor, CreateBook, ViewBooks},
            token_with, unix_now,
        },
        error::domain::AuthError,
    };

    #[test]
    fn test_decode_realm_roles() {
        let token = token_with(&json!({
            "sub": "42",
            "exp": 1_900_000_000u64,
            "preferred_username": "librarian",
            "realm_access": {"roles": ["view-books", "create-book"]}
        }));

        let session = AuthSession::from_token(token).unwrap();

        assert_eq!(session.username(), Some("librarian"));
        assert!(session.has_role(ViewBooks));
        assert!(session.has_role(CreateBook));
        assert!(!session.has_role(CreateAuthor));
    }

    #[test]
    fn test_missing_realm_access_has_no_roles() {
        let claims = AccessClaims::decode(&token_with(&json!({"sub": "1"}))).unwrap();
        assert!(claims.roles().is_empty());
        assert!(!claims.has_role(ViewBooks));
    }

    #[test]
    fn test_expiry() {
        let session = AuthSession::from_token(token_with(&json!({"exp": 100}))).unwrap();
        assert!(!session.is_expired_at(99));
        assert!(session.is_expired_at(100));

        let open_ended = AuthSession::from_token(token_with(&json!({}))).unwrap();
        assert!(!open_ended.is_expired());
        assert_eq!(open_ended.expires_at(), None);
    }

    #[test]
    fn test_expiry_against_wall_clock() {
        let past = AuthSession::from_token(token_with(&json!({"exp": 1_000}))).unwrap();
        assert!(past.is_expired());
        assert_eq!(
            past.expires_at(),
            Some(Utc.with_ymd_and_hms(1970, 1, 1, 0, 16, 40).unwrap())
        );

        let future = Utc::now().timestamp() + 3600;
        let current = AuthSession::from_token(token_with(&json!({"exp": future}))).unwrap();
        assert!(!current.is_expired());
        assert!(unix_now() < future as u64);
    }

    #[test]
    fn test_malformed_tokens() {
        assert!(matches!(
            AccessClaims::decode("not-a-jwt"),
            Err(AuthError::MalformedToken { .. })
        ));
        assert!(matches!(
            AccessClaims::decode("a.!!!.c"),
            Err(AuthError::EncodingError(_))
        ));
        assert!(matches!(
            AccessClaims::decode("a.bm90IGpzb24.c"),
            Err(AuthError::ClaimsError(_))
        ));
    }
}
