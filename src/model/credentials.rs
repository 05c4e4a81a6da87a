//! Token and credential values handed from one pipeline stage to the next
//!
//! Neither type is persisted; both live for a single process run.

use std::fmt;

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Tokens issued by the user pool after a successful sign-in
#[derive(Clone, PartialEq, Eq)]
pub struct TokenPair {
    pub id_token: String,
    pub access_token: String,
}

impl TokenPair {
    pub fn new(id_token: impl Into<String>, access_token: impl Into<String>) -> Self {
        Self {
            id_token: id_token.into(),
            access_token: access_token.into(),
        }
    }

    /// Display name of the signed-in user, read from the ID token claims
    pub fn principal(&self) -> Option<String> {
        extract_principal_from_jwt(&self.id_token)
    }
}

impl fmt::Debug for TokenPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenPair")
            .field("id_token", &mask(&self.id_token))
            .field("access_token", &mask(&self.access_token))
            .finish()
    }
}

/// Temporary AWS credentials issued by the identity pool
#[derive(Clone, PartialEq, Eq)]
pub struct TemporaryCredentials {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub session_token: String,
    pub expiration: Option<DateTime<Utc>>,
}

impl fmt::Debug for TemporaryCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TemporaryCredentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &mask(&self.secret_access_key))
            .field("session_token", &mask(&self.session_token))
            .field("expiration", &self.expiration)
            .finish()
    }
}

/// Keep the first quarter of a secret, at most 4 characters
fn mask(secret: &str) -> String {
    let visible = (secret.len() / 4).min(4);
    match secret.get(..visible) {
        Some(prefix) => format!("{}***", prefix),
        None => "***".to_string(),
    }
}

/// ID token claims used for logging
#[derive(Debug, Deserialize)]
struct IdTokenClaims {
    #[serde(rename = "cognito:username")]
    cognito_username: Option<String>,
    email: Option<String>,
    sub: Option<String>,
}

/// Extract a principal name from a JWT
///
/// Priority: cognito:username > email > sub
fn extract_principal_from_jwt(token: &str) -> Option<String> {
    let parts: Vec<&str> = token.split('.').collect();
    if parts.len() != 3 {
        return None;
    }

    let decoded = URL_SAFE_NO_PAD.decode(parts[1].trim_end_matches('=')).ok()?;
    let claims: IdTokenClaims = serde_json::from_slice(&decoded).ok()?;

    [claims.cognito_username, claims.email, claims.sub]
        .into_iter()
        .flatten()
        .find(|value| !value.is_empty())
}
