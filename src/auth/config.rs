//! OIDC client configuration for the Keycloak realm.

use reqwest::Url;

use crate::{config::KeycloakSettings, error::domain::AuthError};

/// Scopes requested at sign-in.
pub const DEFAULT_SCOPE: &str = "openid profile email offline_access";

/// Authorization code flow parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthConfig {
    /// `{keycloak}/realms/{realm}`.
    pub issuer: String,
    pub client_id: String,
    pub redirect_uri: String,
    pub response_type: String,
    pub scope: String,
    pub require_https: bool,
}

impl AuthConfig {
    /// Derives the configuration from settings and the app's origin.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InsecureIssuer` when `require_https` is set and
    /// the Keycloak URL is plain http.
    pub fn from_settings(settings: &KeycloakSettings, origin: &str) -> Result<Self, AuthError> {
        let issuer = format!(
            "{}/realms/{}",
            settings.url.trim_end_matches('/'),
            settings.realm
        );
        if settings.require_https && !issuer.starts_with("https://") {
            return Err(AuthError::InsecureIssuer { issuer });
        }

        Ok(Self {
            issuer,
            client_id: settings.client_id.clone(),
            redirect_uri: format!("{}/", origin.trim_end_matches('/')),
            response_type: "code".to_string(),
            scope: DEFAULT_SCOPE.to_string(),
            require_https: settings.require_https,
        })
    }

    /// Keycloak's authorization endpoint with the sign-in parameters.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidIssuer` if the issuer is not a valid URL.
    pub fn login_url(&self, state: &str) -> Result<Url, AuthError> {
        let mut url = Url::parse(&format!("{}/protocol/openid-connect/auth", self.issuer))
            .map_err(|error| AuthError::InvalidIssuer {
                reason: error.to_string(),
            })?;
        url.query_pairs_mut()
            .append_pair("client_id", &self.client_id)
            .append_pair("redirect_uri", &self.redirect_uri)
            .append_pair("response_type", &self.response_type)
            .append_pair("scope", &self.scope)
            .append_pair("state", state);
        Ok(url)
    }
}
