//! Cognito SDK error classification
//!
//! Both Cognito clients surface failures as `SdkError`. Service errors carry
//! the exception name (already stripped of any namespace prefix by the SDK)
//! and the service message; everything else is either a protocol problem or a
//! call that never got a response.

use aws_sdk_cognitoidentityprovider::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};

/// Structured information about a Cognito API error
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceErrorInfo {
    /// HTTP status of the error response
    pub status: u16,
    /// Exception name without namespace, e.g. `NotAuthorizedException`
    pub code: String,
    /// Human readable message from the service
    pub message: String,
}

impl ServiceErrorInfo {
    pub fn new(status: u16, code: Option<&str>, message: Option<&str>) -> Self {
        Self {
            status,
            code: code.unwrap_or("UnknownError").to_string(),
            message: message
                .map(str::trim)
                .filter(|m| !m.is_empty())
                .unwrap_or("Unknown error")
                .to_string(),
        }
    }

    pub fn is(&self, code: &str) -> bool {
        self.code == code
    }
}

/// Failure of a single Cognito API call
#[derive(Debug)]
pub(crate) enum CallError {
    /// The service answered with an error
    Service(ServiceErrorInfo),
    /// The request could not be built or the response could not be read
    Protocol(String),
    /// No response was received
    Transport(String),
}

impl<E> From<SdkError<E>> for CallError
where
    E: ProvideErrorMetadata + std::error::Error + 'static,
{
    fn from(err: SdkError<E>) -> Self {
        match &err {
            SdkError::ServiceError(context) => {
                let info = ServiceErrorInfo::new(
                    context.raw().status().as_u16(),
                    context.err().code(),
                    context.err().message(),
                );
                tracing::debug!(
                    status = info.status,
                    code = %info.code,
                    "Cognito returned an error: {}",
                    info.message
                );
                CallError::Service(info)
            }
            SdkError::ConstructionFailure(_) | SdkError::ResponseError(_) => {
                CallError::Protocol(DisplayErrorContext(&err).to_string())
            }
            _ => CallError::Transport(DisplayErrorContext(&err).to_string()),
        }
    }
}
