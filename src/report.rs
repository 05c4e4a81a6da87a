//! Turn a pipeline outcome into process output

use crate::error::{EXIT_SUCCESS, InvokeError, PipelineError};
use crate::model::response::ResponseResult;

/// What to print and which exit code to return
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub stdout: Option<String>,
    pub stderr: Option<String>,
    pub exit_code: u8,
}

/// Render a pipeline outcome
///
/// Gateway responses (any status) print as pretty JSON and a transport failure
/// prints its message alone, both on stdout. Earlier failures go to stderr.
pub fn render(outcome: &Result<ResponseResult, PipelineError>) -> Report {
    match outcome {
        Ok(result) => Report {
            stdout: Some(pretty(result)),
            stderr: None,
            exit_code: EXIT_SUCCESS,
        },
        Err(err @ PipelineError::Invoke(InvokeError::Rejected(result))) => Report {
            stdout: Some(pretty(result)),
            stderr: None,
            exit_code: err.exit_code(),
        },
        Err(err @ PipelineError::Invoke(InvokeError::Transport { message })) => Report {
            stdout: Some(message.clone()),
            stderr: None,
            exit_code: err.exit_code(),
        },
        Err(err) => Report {
            stdout: None,
            stderr: Some(err.to_string()),
            exit_code: err.exit_code(),
        },
    }
}

fn pretty(result: &ResponseResult) -> String {
    // Serializing a struct of plain values into a String cannot fail
    serde_json::to_string_pretty(result).unwrap_or_else(|e| format!("{{\"error\":\"{}\"}}", e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{AuthError, ConfigError, EXIT_AUTH, EXIT_CONFIG, EXIT_REJECTED};
    use serde_json::json;

    #[test]
    fn test_success_is_pretty_json() {
        let report = render(&Ok(ResponseResult::new(200, "OK", json!({"id": "42"}))));
        assert_eq!(report.exit_code, EXIT_SUCCESS);
        assert_eq!(
            report.stdout.as_deref(),
            Some("{\n  \"status\": 200,\n  \"statusText\": \"OK\",\n  \"data\": {\n    \"id\": \"42\"\n  }\n}")
        );
        assert!(report.stderr.is_none());
    }

    #[test]
    fn test_rejected_prints_result() {
        let report = render(&Err(PipelineError::from(InvokeError::Rejected(
            ResponseResult::new(404, "Not Found", json!("missing")),
        ))));
        assert_eq!(report.exit_code, EXIT_REJECTED);
        let printed: serde_json::Value = serde_json::from_str(&report.stdout.unwrap()).unwrap();
        assert_eq!(printed, json!({"status": 404, "statusText": "Not Found", "data": "missing"}));
    }

    #[test]
    fn test_auth_failure_goes_to_stderr() {
        let report = render(&Err(PipelineError::from(AuthError::NewPasswordRequired)));
        assert_eq!(report.exit_code, EXIT_AUTH);
        assert!(report.stdout.is_none());
        assert_eq!(
            report.stderr.as_deref(),
            Some("Authentication failed: Given user needs to set a new password")
        );
    }

    #[test]
    fn test_config_failure_goes_to_stderr() {
        let report = render(&Err(PipelineError::from(ConfigError::MissingEnv(vec![
            "INVOKE_URL".to_string(),
        ]))));
        assert_eq!(report.exit_code, EXIT_CONFIG);
        assert_eq!(
            report.stderr.as_deref(),
            Some("Invalid configuration: missing required environment variables: INVOKE_URL")
        );
    }
}
