use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Outcome of a gateway call, printed as `{status, statusText, data}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseResult {
    pub status: u16,
    pub status_text: String,
    pub data: Value,
}

impl ResponseResult {
    pub fn new(status: u16, status_text: impl Into<String>, data: Value) -> Self {
        Self {
            status,
            status_text: status_text.into(),
            data,
        }
    }

    /// Body as JSON when it parses, otherwise the raw text
    pub fn parse_data(body: &str) -> Value {
        serde_json::from_str(body).unwrap_or_else(|_| Value::String(body.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_serializes_with_status_text_key() {
        let result = ResponseResult::new(200, "OK", json!({"name": "widget"}));
        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(
            value,
            json!({"status": 200, "statusText": "OK", "data": {"name": "widget"}})
        );
    }

    #[test]
    fn test_parse_data_json_body() {
        assert_eq!(ResponseResult::parse_data(r#"{"error":"denied"}"#), json!({"error": "denied"}));
    }

    #[test]
    fn test_parse_data_plain_text_body() {
        assert_eq!(
            ResponseResult::parse_data("Internal server error"),
            json!("Internal server error")
        );
    }

    #[test]
    fn test_parse_data_empty_body() {
        assert_eq!(ResponseResult::parse_data(""), json!(""));
    }
}
