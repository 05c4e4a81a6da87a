//! Cognito client module
//!
//! Talks to the user pool (sign-in) and identity pool (temporary credentials)
//! through the AWS SDK clients. Both services accept unsigned requests for
//! these operations, so no AWS credentials are loaded.

pub mod errors;
pub mod identity_pool;
pub mod user_pool;

use std::time::Duration;

use aws_config::retry::RetryConfig;
use aws_config::timeout::TimeoutConfig;
use aws_config::{BehaviorVersion, Region, SdkConfig};

use crate::http_client::REQUEST_TIMEOUT_SECS;
use crate::model::config::Config;

/// Shared SDK configuration for both Cognito clients
///
/// Region comes from `COGNITO_REGION`. Retries are disabled and every call
/// is bounded by the request timeout.
pub async fn load_sdk_config(config: &Config) -> SdkConfig {
    aws_config::defaults(BehaviorVersion::latest())
        .region(Region::new(config.cognito_region.clone()))
        .retry_config(RetryConfig::disabled())
        .timeout_config(timeout_config())
        .no_credentials()
        .load()
        .await
}

fn timeout_config() -> TimeoutConfig {
    TimeoutConfig::builder()
        .operation_timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
        .build()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// SDK configuration that reads nothing from the environment
    pub(crate) fn sdk_config() -> SdkConfig {
        SdkConfig::builder()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new("us-east-1"))
            .retry_config(RetryConfig::disabled())
            .timeout_config(timeout_config())
            .build()
    }

    #[test]
    fn test_sdk_config_disables_retries() {
        let config = sdk_config();
        assert_eq!(config.region().map(|r| r.as_ref()), Some("us-east-1"));
        assert_eq!(config.retry_config().map(|r| r.max_attempts()), Some(1));
        assert_eq!(
            config.timeout_config().and_then(|t| t.operation_timeout()),
            Some(Duration::from_secs(REQUEST_TIMEOUT_SECS))
        );
    }
}
