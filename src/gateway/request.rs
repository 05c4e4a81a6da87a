//! Gateway request description
//!
//! Built eagerly from the command line so every JSON and template problem
//! surfaces before any network call.

use std::path::PathBuf;

use reqwest::Method;
use reqwest::header::{HeaderName, HeaderValue};
use serde_json::{Map, Value};

use crate::error::ConfigError;
use crate::model::arg::Args;

/// Prefix marking a `--body` value as a file path
pub const BODY_FILE_MARKER: char = '@';

/// Key of the header map inside additional params
pub const HEADERS_KEY: &str = "headers";

/// Key of the query parameter map inside additional params
pub const QUERY_PARAMS_KEY: &str = "queryParams";

/// Everything needed to dispatch one gateway call, minus credentials
#[derive(Debug, Clone, PartialEq)]
pub struct RequestSpec {
    pub path_template: String,
    pub method: Method,
    pub params: Map<String, Value>,
    pub additional_params: Map<String, Value>,
    pub body: Value,
}

impl RequestSpec {
    /// Parse and validate the request flags
    pub fn from_args(args: &Args) -> Result<Self, ConfigError> {
        let method = parse_method(&args.method)?;
        let params = parse_object("params", &args.params)?;
        let additional_params = parse_object("additional-params", &args.additional_params)?;
        validate_additional_params(&additional_params)?;
        let body = resolve_body(&args.body)?;

        // Fails on unknown or malformed placeholders
        expand_path(&args.path_template, &params)?;

        Ok(Self {
            path_template: args.path_template.clone(),
            method,
            params,
            additional_params,
            body,
        })
    }

    /// Copy of this request with `name: access_token` merged into the headers
    ///
    /// Other headers are kept; a header with the same name (any case) is replaced.
    pub fn with_access_token_header(mut self, name: &str, access_token: &str) -> Self {
        let headers = self
            .additional_params
            .entry(HEADERS_KEY)
            .or_insert_with(|| Value::Object(Map::new()));

        if !headers.is_object() {
            *headers = Value::Object(Map::new());
        }

        if let Value::Object(headers) = headers {
            headers.retain(|key, _| !key.eq_ignore_ascii_case(name));
            headers.insert(name.to_string(), Value::String(access_token.to_string()));
        }

        self
    }

    /// Caller headers as (name, value) pairs
    pub fn headers(&self) -> Vec<(String, String)> {
        string_pairs(self.additional_params.get(HEADERS_KEY))
    }

    /// Caller query parameters as (name, value) pairs
    pub fn query_params(&self) -> Vec<(String, String)> {
        string_pairs(self.additional_params.get(QUERY_PARAMS_KEY))
    }

    /// Path with every placeholder substituted
    pub fn expanded_path(&self) -> Result<String, ConfigError> {
        expand_path(&self.path_template, &self.params)
    }
}

/// Check that a header name given on the command line is usable
pub fn validate_header_name(name: &str) -> Result<String, ConfigError> {
    HeaderName::from_bytes(name.as_bytes())
        .map(|_| name.to_string())
        .map_err(|e| ConfigError::InvalidHeader {
            name: name.to_string(),
            reason: e.to_string(),
        })
}

fn parse_method(raw: &str) -> Result<Method, ConfigError> {
    Method::from_bytes(raw.trim().to_ascii_uppercase().as_bytes())
        .map_err(|_| ConfigError::InvalidMethod(raw.to_string()))
}

fn parse_object(option: &'static str, raw: &str) -> Result<Map<String, Value>, ConfigError> {
    match serde_json::from_str(raw) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(ConfigError::NotAnObject { option }),
        Err(source) => Err(ConfigError::InvalidJson { option, source }),
    }
}

/// Resolve the `--body` value: `@path` reads JSON from a file, anything else is a JSON literal
pub fn resolve_body(raw: &str) -> Result<Value, ConfigError> {
    match raw.strip_prefix(BODY_FILE_MARKER) {
        Some(path) => {
            let path = PathBuf::from(path);
            let content = std::fs::read_to_string(&path).map_err(|source| ConfigError::BodyFile {
                path: path.clone(),
                source,
            })?;
            serde_json::from_str(&content).map_err(|source| ConfigError::BodyFileJson { path, source })
        }
        None => serde_json::from_str(raw).map_err(|source| ConfigError::InvalidJson {
            option: "body",
            source,
        }),
    }
}

fn validate_additional_params(additional: &Map<String, Value>) -> Result<(), ConfigError> {
    for key in additional.keys() {
        if key != HEADERS_KEY && key != QUERY_PARAMS_KEY {
            tracing::warn!("Ignoring unknown additional param `{}`", key);
        }
    }

    if let Some(headers) = additional.get(HEADERS_KEY) {
        let headers = headers
            .as_object()
            .ok_or(ConfigError::InvalidAdditionalParams { key: HEADERS_KEY })?;
        for (name, value) in headers {
            HeaderName::from_bytes(name.as_bytes()).map_err(|e| ConfigError::InvalidHeader {
                name: name.clone(),
                reason: e.to_string(),
            })?;
            let text = scalar_to_string(value).ok_or_else(|| ConfigError::InvalidHeader {
                name: name.clone(),
                reason: "value must be a string, number or boolean".to_string(),
            })?;
            HeaderValue::from_str(&text).map_err(|e| ConfigError::InvalidHeader {
                name: name.clone(),
                reason: e.to_string(),
            })?;
        }
    }

    if let Some(query) = additional.get(QUERY_PARAMS_KEY) {
        let query = query
            .as_object()
            .ok_or(ConfigError::InvalidAdditionalParams { key: QUERY_PARAMS_KEY })?;
        for (name, value) in query {
            if scalar_to_string(value).is_none() {
                return Err(ConfigError::InvalidQueryParam { name: name.clone() });
            }
        }
    }

    Ok(())
}

/// Text form of a JSON scalar; strings are taken verbatim
fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn string_pairs(value: Option<&Value>) -> Vec<(String, String)> {
    value
        .and_then(Value::as_object)
        .map(|map| {
            map.iter()
                .filter_map(|(k, v)| scalar_to_string(v).map(|v| (k.clone(), v)))
                .collect()
        })
        .unwrap_or_default()
}

/// Substitute `{name}` placeholders with percent-encoded values from `params`
///
/// String values are used verbatim, other values as their JSON text.
pub fn expand_path(template: &str, params: &Map<String, Value>) -> Result<String, ConfigError> {
    let mut expanded = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find('{') {
        expanded.push_str(&rest[..start]);
        let after = &rest[start + 1..];
        let end = after
            .find('}')
            .ok_or_else(|| ConfigError::MalformedPathTemplate(template.to_string()))?;
        let name = &after[..end];
        if name.is_empty() || name.contains('{') {
            return Err(ConfigError::MalformedPathTemplate(template.to_string()));
        }

        let value = params.get(name).ok_or_else(|| ConfigError::MissingPathParam {
            template: template.to_string(),
            name: name.to_string(),
        })?;
        let text = match value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        expanded.push_str(&urlencoding::encode(&text));

        rest = &after[end + 1..];
    }

    if rest.contains('}') {
        return Err(ConfigError::MalformedPathTemplate(template.to_string()));
    }
    expanded.push_str(rest);

    Ok(expanded)
}
