//! Sign-in state and role-based access checks.
//!
//! Tokens are issued by Keycloak; this module only decodes their claims,
//! derives the OIDC client configuration and guards views by realm role.

pub mod claims;
pub mod config;
pub mod guard;

pub use {
    claims::{AccessClaims, AuthSession, RealmAccess, Role},
    config::AuthConfig,
    guard::{AccessDecision, RouteGuard},
};
