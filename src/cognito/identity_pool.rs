//! Identity pool credential exchange
//!
//! Trades a user pool ID token for temporary AWS credentials in two calls:
//! GetId resolves the identity, GetCredentialsForIdentity issues the keys.

use std::collections::HashMap;

use aws_config::SdkConfig;
use aws_sdk_cognitoidentity::Client;
use aws_sdk_cognitoidentity::config::Builder;
use chrono::{DateTime, Utc};

use crate::error::ExchangeError;
use crate::model::config::Config;
use crate::model::credentials::{TemporaryCredentials, TokenPair};
use crate::pipeline::CredentialExchanger;

use super::errors::CallError;

/// Error codes meaning the identity token was refused
const DENIAL_CODES: &[&str] = &[
    "NotAuthorizedException",
    "ResourceNotFoundException",
    "InvalidIdentityPoolConfigurationException",
];

/// Cognito identity pool client
pub struct IdentityPoolClient {
    client: Client,
    identity_pool_id: String,
    login_provider: String,
}

impl IdentityPoolClient {
    pub fn new(config: &Config, sdk_config: &SdkConfig) -> Self {
        let mut builder = Builder::from(sdk_config);
        if let Some(endpoint) = &config.cognito_identity_endpoint {
            builder = builder.endpoint_url(endpoint);
        }

        Self {
            client: Client::from_conf(builder.build()),
            identity_pool_id: config.identity_pool_id.clone(),
            login_provider: config.login_provider(),
        }
    }

    /// Login map keyed by the user pool issuer
    pub fn logins(&self, tokens: &TokenPair) -> HashMap<String, String> {
        HashMap::from([(self.login_provider.clone(), tokens.id_token.clone())])
    }
}

impl CredentialExchanger for IdentityPoolClient {
    async fn exchange(&self, tokens: &TokenPair) -> Result<TemporaryCredentials, ExchangeError> {
        let logins = self.logins(tokens);

        let identity = self
            .client
            .get_id()
            .identity_pool_id(&self.identity_pool_id)
            .set_logins(Some(logins.clone()))
            .send()
            .await
            .map_err(|e| exchange_error(e.into()))?;
        let identity_id = identity
            .identity_id()
            .ok_or_else(|| ExchangeError::MalformedResponse("missing IdentityId".to_string()))?;

        tracing::debug!("Resolved identity {}", identity_id);

        let response = self
            .client
            .get_credentials_for_identity()
            .identity_id(identity_id)
            .set_logins(Some(logins))
            .send()
            .await
            .map_err(|e| exchange_error(e.into()))?;

        if let Some(issued_for) = response.identity_id() {
            if issued_for != identity_id {
                tracing::warn!(
                    "Credentials issued for identity {} instead of {}",
                    issued_for,
                    identity_id
                );
            }
        }

        let credentials = response
            .credentials()
            .ok_or(ExchangeError::MissingCredentials)?;
        let (Some(access_key_id), Some(secret_key), Some(session_token)) = (
            credentials.access_key_id(),
            credentials.secret_key(),
            credentials.session_token(),
        ) else {
            return Err(ExchangeError::MissingCredentials);
        };

        let expiration = credentials
            .expiration()
            .and_then(|e| DateTime::<Utc>::from_timestamp(e.secs(), 0));
        if let Some(expiration) = expiration {
            tracing::info!("Temporary credentials expire at {}", expiration.to_rfc3339());
        }

        Ok(TemporaryCredentials {
            access_key_id: access_key_id.to_string(),
            secret_access_key: secret_key.to_string(),
            session_token: session_token.to_string(),
            expiration,
        })
    }
}

fn exchange_error(err: CallError) -> ExchangeError {
    match err {
        CallError::Service(info) if DENIAL_CODES.iter().any(|code| info.is(code)) => {
            ExchangeError::Denied(info.message)
        }
        CallError::Service(info) => ExchangeError::Service {
            status: info.status,
            code: info.code,
            message: info.message,
        },
        CallError::Protocol(message) => ExchangeError::MalformedResponse(message),
        CallError::Transport(message) => ExchangeError::Transport(message),
    }
}
