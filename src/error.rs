//! Error types for each pipeline stage
//!
//! Every stage returns its own error enum; [`PipelineError`] wraps them and
//! maps each failure class to a process exit code.

use std::path::PathBuf;

use thiserror::Error;

use crate::model::response::ResponseResult;

/// Exit code for a confirmed successful request
pub const EXIT_SUCCESS: u8 = 0;
/// Exit code for invalid flags, environment or request JSON
pub const EXIT_CONFIG: u8 = 2;
/// Exit code for a failed user pool sign-in
pub const EXIT_AUTH: u8 = 3;
/// Exit code for a failed identity pool credential exchange
pub const EXIT_EXCHANGE: u8 = 4;
/// Exit code when the gateway answered with a non-2xx status
pub const EXIT_REJECTED: u8 = 5;
/// Exit code when the gateway could not be reached
pub const EXIT_TRANSPORT: u8 = 6;

/// Configuration problems detected before or while building a request
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variables: {}", .0.join(", "))]
    MissingEnv(Vec<String>),

    #[error("failed to load env file {}: {source}", .path.display())]
    EnvFile {
        path: PathBuf,
        #[source]
        source: dotenvy::Error,
    },

    #[error("--{option} is not valid JSON: {source}")]
    InvalidJson {
        option: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("--{option} must be a JSON object")]
    NotAnObject { option: &'static str },

    #[error("failed to read body file {}: {source}", .path.display())]
    BodyFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("body file {} is not valid JSON: {source}", .path.display())]
    BodyFileJson {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("path template `{template}` references `{name}`, which is missing from --params")]
    MissingPathParam { template: String, name: String },

    #[error("path template `{0}` has an unterminated placeholder")]
    MalformedPathTemplate(String),

    #[error("invalid HTTP method `{0}`")]
    InvalidMethod(String),

    #[error("`{key}` in --additional-params must be a JSON object")]
    InvalidAdditionalParams { key: &'static str },

    #[error("invalid header `{name}`: {reason}")]
    InvalidHeader { name: String, reason: String },

    #[error("invalid query parameter `{name}`: value must be a string, number or boolean")]
    InvalidQueryParam { name: String },

    #[error("COGNITO_AUTH_FLOW `{0}` is not USER_SRP_AUTH or USER_PASSWORD_AUTH")]
    InvalidAuthFlow(String),

    #[error("invalid URL `{url}`: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("failed to build HTTP client: {0:#}")]
    HttpClient(anyhow::Error),
}

/// User pool sign-in failures
#[derive(Debug, Error)]
pub enum AuthError {
    /// Wrong username/password or an account that may not sign in
    #[error("{0}")]
    Rejected(String),

    #[error("Given user needs to set a new password")]
    NewPasswordRequired,

    #[error("MFA is not currently supported")]
    MfaRequired,

    #[error("Custom challenge is not currently supported")]
    CustomChallenge,

    #[error("Challenge {0} is not currently supported")]
    UnsupportedChallenge(String),

    /// The password verifier could not be computed from the challenge
    #[error("SRP verification failed: {0}")]
    Srp(String),

    #[error("identity service error {code} (status {status}): {message}")]
    Service {
        status: u16,
        code: String,
        message: String,
    },

    #[error("identity service returned an unexpected response: {0}")]
    MalformedResponse(String),

    #[error("identity service unreachable: {0}")]
    Transport(String),
}

/// Identity pool credential exchange failures
#[derive(Debug, Error)]
pub enum ExchangeError {
    /// The federation service refused the identity token
    #[error("{0}")]
    Denied(String),

    #[error("federation service error {code} (status {status}): {message}")]
    Service {
        status: u16,
        code: String,
        message: String,
    },

    #[error("federation service response did not include credentials")]
    MissingCredentials,

    #[error("federation service returned an unexpected response: {0}")]
    MalformedResponse(String),

    #[error("federation service unreachable: {0}")]
    Transport(String),
}

/// Gateway request failures
#[derive(Debug, Error)]
pub enum InvokeError {
    /// The gateway responded, but with a non-2xx status
    #[error("request failed with status {} {}", .0.status, .0.status_text)]
    Rejected(ResponseResult),

    /// No response was received
    #[error("{message}")]
    Transport { message: String },

    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

/// Any failure that stops the pipeline
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("Authentication failed: {0}")]
    Auth(#[from] AuthError),

    #[error("Failed to get temporary credentials: {0}")]
    Exchange(#[from] ExchangeError),

    #[error(transparent)]
    Invoke(#[from] InvokeError),
}

impl PipelineError {
    /// Process exit code for this failure class
    pub fn exit_code(&self) -> u8 {
        match self {
            PipelineError::Config(_) => EXIT_CONFIG,
            PipelineError::Auth(_) => EXIT_AUTH,
            PipelineError::Exchange(_) => EXIT_EXCHANGE,
            PipelineError::Invoke(InvokeError::Rejected(_)) => EXIT_REJECTED,
            PipelineError::Invoke(InvokeError::Transport { .. }) => EXIT_TRANSPORT,
            PipelineError::Invoke(InvokeError::InvalidRequest(_)) => EXIT_CONFIG,
        }
    }

    /// Short name of the failure class, used in logs
    pub fn class(&self) -> &'static str {
        match self {
            PipelineError::Config(_) | PipelineError::Invoke(InvokeError::InvalidRequest(_)) => {
                "config"
            }
            PipelineError::Auth(_) => "auth",
            PipelineError::Exchange(_) => "exchange",
            PipelineError::Invoke(InvokeError::Rejected(_)) => "rejected",
            PipelineError::Invoke(InvokeError::Transport { .. }) => "transport",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_exit_codes_are_distinct_per_class() {
        let errors = [
            PipelineError::from(ConfigError::MissingEnv(vec!["USERNAME".to_string()])),
            PipelineError::from(AuthError::MfaRequired),
            PipelineError::from(ExchangeError::MissingCredentials),
            PipelineError::from(InvokeError::Rejected(ResponseResult::new(
                500,
                "Internal Server Error",
                json!(null),
            ))),
            PipelineError::from(InvokeError::Transport {
                message: "ECONNRESET".to_string(),
            }),
        ];

        let mut codes: Vec<u8> = errors.iter().map(PipelineError::exit_code).collect();
        assert!(codes.iter().all(|c| *c != EXIT_SUCCESS));
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), errors.len());
    }

    #[test]
    fn test_class_follows_exit_code() {
        let cases = [
            (PipelineError::from(AuthError::Srp("bad SALT".to_string())), "auth", EXIT_AUTH),
            (PipelineError::from(ExchangeError::MissingCredentials), "exchange", EXIT_EXCHANGE),
            (
                PipelineError::from(InvokeError::InvalidRequest("bad header".to_string())),
                "config",
                EXIT_CONFIG,
            ),
            (
                PipelineError::from(InvokeError::Transport {
                    message: "ECONNRESET".to_string(),
                }),
                "transport",
                EXIT_TRANSPORT,
            ),
        ];
        for (err, class, code) in cases {
            assert_eq!(err.class(), class);
            assert_eq!(err.exit_code(), code);
        }
    }

    #[test]
    fn test_missing_env_lists_every_variable() {
        let err = PipelineError::from(ConfigError::MissingEnv(vec![
            "USER_POOL_ID".to_string(),
            "PASSWORD".to_string(),
        ]));
        assert_eq!(
            err.to_string(),
            "Invalid configuration: missing required environment variables: USER_POOL_ID, PASSWORD"
        );
    }

    #[test]
    fn test_auth_messages() {
        assert_eq!(
            PipelineError::from(AuthError::Rejected("Incorrect username or password.".to_string()))
                .to_string(),
            "Authentication failed: Incorrect username or password."
        );
        assert_eq!(
            AuthError::NewPasswordRequired.to_string(),
            "Given user needs to set a new password"
        );
        assert_eq!(AuthError::CustomChallenge.to_string(), "Custom challenge is not currently supported");
    }

    #[test]
    fn test_transport_message_is_verbatim() {
        let err = PipelineError::from(InvokeError::Transport {
            message: "ECONNRESET".to_string(),
        });
        assert_eq!(err.to_string(), "ECONNRESET");
    }
}
