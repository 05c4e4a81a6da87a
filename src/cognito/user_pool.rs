//! User pool sign-in
//!
//! Exchanges a username/password pair for ID and access tokens. The default
//! `USER_SRP_AUTH` flow never sends the password: InitiateAuth returns a
//! `PASSWORD_VERIFIER` challenge which is answered with an SRP proof. The
//! `USER_PASSWORD_AUTH` flow is available for app clients without SRP.
//! Any other challenge halts sign-in.

use std::collections::HashMap;

use aws_config::SdkConfig;
use aws_sdk_cognitoidentityprovider::Client;
use aws_sdk_cognitoidentityprovider::config::Builder;
use aws_sdk_cognitoidentityprovider::types::{
    AuthFlowType, AuthenticationResultType, ChallengeNameType,
};
use cognito_srp::SrpClient;

use crate::error::AuthError;
use crate::model::config::{Config, SignInFlow};
use crate::model::credentials::TokenPair;
use crate::pipeline::Authenticator;

use super::errors::CallError;

/// Error codes meaning the user may not sign in with these credentials
const REJECTION_CODES: &[&str] = &[
    "NotAuthorizedException",
    "UserNotFoundException",
    "PasswordResetRequiredException",
    "UserNotConfirmedException",
];

/// Cognito user pool client
pub struct UserPoolClient {
    client: Client,
    flow: SignInFlow,
    user_pool_id: String,
    app_client_id: String,
    username: String,
    password: String,
}

/// InitiateAuth or RespondToAuthChallenge result
struct AuthStep {
    challenge: Option<ChallengeNameType>,
    parameters: HashMap<String, String>,
    session: Option<String>,
    result: Option<AuthenticationResultType>,
}

impl UserPoolClient {
    pub fn new(config: &Config, sdk_config: &SdkConfig) -> Self {
        let mut builder = Builder::from(sdk_config);
        if let Some(endpoint) = &config.cognito_idp_endpoint {
            builder = builder.endpoint_url(endpoint);
        }

        Self {
            client: Client::from_conf(builder.build()),
            flow: config.auth_flow,
            user_pool_id: config.user_pool_id.clone(),
            app_client_id: config.app_client_id.clone(),
            username: config.username.clone(),
            password: config.password.clone(),
        }
    }

    async fn initiate(
        &self,
        flow: AuthFlowType,
        parameters: HashMap<String, String>,
    ) -> Result<AuthStep, AuthError> {
        tracing::debug!("InitiateAuth with {}", flow.as_str());
        let output = self
            .client
            .initiate_auth()
            .auth_flow(flow)
            .client_id(&self.app_client_id)
            .set_auth_parameters(Some(parameters))
            .send()
            .await
            .map_err(|e| auth_error(e.into()))?;

        Ok(AuthStep {
            challenge: output.challenge_name().cloned(),
            parameters: output.challenge_parameters().cloned().unwrap_or_default(),
            session: output.session().map(str::to_string),
            result: output.authentication_result().cloned(),
        })
    }

    async fn sign_in_srp(&self) -> Result<AuthStep, AuthError> {
        let srp = SrpClient::new(
            &self.username,
            &self.password,
            &self.user_pool_id,
            &self.app_client_id,
            None,
        );
        let parameters = srp
            .get_auth_params()
            .map_err(|e| AuthError::Srp(e.to_string()))?;

        let step = self.initiate(AuthFlowType::UserSrpAuth, parameters).await?;
        if step.challenge != Some(ChallengeNameType::PasswordVerifier) {
            return Ok(step);
        }

        let responses = srp
            .process_challenge(step.parameters)
            .map_err(|e| AuthError::Srp(e.to_string()))?;

        tracing::debug!("Answering PASSWORD_VERIFIER challenge");
        let output = self
            .client
            .respond_to_auth_challenge()
            .challenge_name(ChallengeNameType::PasswordVerifier)
            .client_id(&self.app_client_id)
            .set_session(step.session)
            .set_challenge_responses(Some(responses))
            .send()
            .await
            .map_err(|e| auth_error(e.into()))?;

        Ok(AuthStep {
            challenge: output.challenge_name().cloned(),
            parameters: output.challenge_parameters().cloned().unwrap_or_default(),
            session: output.session().map(str::to_string),
            result: output.authentication_result().cloned(),
        })
    }

    async fn sign_in_password(&self) -> Result<AuthStep, AuthError> {
        let parameters = HashMap::from([
            ("USERNAME".to_string(), self.username.clone()),
            ("PASSWORD".to_string(), self.password.clone()),
        ]);
        self.initiate(AuthFlowType::UserPasswordAuth, parameters).await
    }
}

impl Authenticator for UserPoolClient {
    async fn authenticate(&self) -> Result<TokenPair, AuthError> {
        let step = match self.flow {
            SignInFlow::Srp => self.sign_in_srp().await?,
            SignInFlow::Password => self.sign_in_password().await?,
        };

        if let Some(challenge) = &step.challenge {
            return Err(classify_challenge(challenge.as_str()));
        }

        let result = step.result.ok_or_else(|| {
            AuthError::MalformedResponse("response contains neither tokens nor a challenge".to_string())
        })?;

        let id_token = result
            .id_token()
            .ok_or_else(|| AuthError::MalformedResponse("missing IdToken".to_string()))?;
        let access_token = result
            .access_token()
            .ok_or_else(|| AuthError::MalformedResponse("missing AccessToken".to_string()))?;

        if result.expires_in() > 0 {
            tracing::debug!("User pool tokens valid for {}s", result.expires_in());
        }

        Ok(TokenPair::new(id_token, access_token))
    }
}

/// Map a challenge name to the sign-in failure it represents
pub fn classify_challenge(name: &str) -> AuthError {
    match name {
        "NEW_PASSWORD_REQUIRED" => AuthError::NewPasswordRequired,
        "SMS_MFA" | "SMS_OTP" | "SOFTWARE_TOKEN_MFA" | "EMAIL_OTP" | "SELECT_MFA_TYPE"
        | "MFA_SETUP" => AuthError::MfaRequired,
        "CUSTOM_CHALLENGE" => AuthError::CustomChallenge,
        other => AuthError::UnsupportedChallenge(other.to_string()),
    }
}

fn auth_error(err: CallError) -> AuthError {
    match err {
        CallError::Service(info) if REJECTION_CODES.iter().any(|code| info.is(code)) => {
            AuthError::Rejected(info.message)
        }
        CallError::Service(info) => AuthError::Service {
            status: info.status,
            code: info.code,
            message: info.message,
        },
        CallError::Protocol(message) => AuthError::MalformedResponse(message),
        CallError::Transport(message) => AuthError::Transport(message),
    }
}
