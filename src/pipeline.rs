//! Sign-in, credential exchange and gateway call
//!
//! Each stage runs only when the previous one succeeded and none of them is
//! retried. The stages sit behind traits so the sequencing can be exercised
//! without a network.

use crate::error::{AuthError, ExchangeError, InvokeError, PipelineError};
use crate::gateway::request::RequestSpec;
use crate::model::credentials::{TemporaryCredentials, TokenPair};
use crate::model::response::ResponseResult;

/// Signs a user in and returns their tokens
pub trait Authenticator {
    async fn authenticate(&self) -> Result<TokenPair, AuthError>;
}

/// Trades user pool tokens for temporary AWS credentials
pub trait CredentialExchanger {
    async fn exchange(&self, tokens: &TokenPair) -> Result<TemporaryCredentials, ExchangeError>;
}

/// Performs one signed gateway request
pub trait Invoker {
    async fn invoke(
        &self,
        credentials: &TemporaryCredentials,
        request: &RequestSpec,
    ) -> Result<ResponseResult, InvokeError>;
}

/// Run the three stages in order
///
/// With `access_token_header` set, the access token from sign-in is added to
/// the request headers under that name before the gateway call.
pub async fn run<A, E, I>(
    authenticator: &A,
    exchanger: &E,
    invoker: &I,
    request: RequestSpec,
    access_token_header: Option<&str>,
) -> Result<ResponseResult, PipelineError>
where
    A: Authenticator,
    E: CredentialExchanger,
    I: Invoker,
{
    tracing::info!("Authenticating with User Pool");
    let tokens = authenticator.authenticate().await?;
    match tokens.principal() {
        Some(principal) => tracing::info!("Authenticated as {}", principal),
        None => tracing::info!("Authenticated"),
    }

    tracing::info!("Getting temporary credentials");
    let credentials = exchanger.exchange(&tokens).await?;

    let request = match access_token_header {
        Some(name) => request.with_access_token_header(name, &tokens.access_token),
        None => request,
    };

    tracing::info!("Making API request");
    let result = invoker.invoke(&credentials, &request).await?;
    tracing::info!("API responded with status {}", result.status);

    Ok(result)
}
