//! API Gateway client
//!
//! Expands the request template, signs it with the temporary credentials and
//! classifies the outcome into success, error response or transport failure.

use std::collections::BTreeMap;
use std::time::SystemTime;

use aws_credential_types::Credentials;
use aws_sigv4::http_request::{SignableBody, SignableRequest, SigningSettings, sign};
use aws_sigv4::sign::v4;
use reqwest::header::{HeaderName, HeaderValue};
use reqwest::{Client, Method, Url};

use crate::error::{ConfigError, InvokeError};
use crate::http_client::{ProxyConfig, REQUEST_TIMEOUT_SECS, build_client, error_chain};
use crate::model::config::Config;
use crate::model::credentials::TemporaryCredentials;
use crate::model::response::ResponseResult;
use crate::pipeline::Invoker;

use super::request::RequestSpec;

/// SigV4 service name of API Gateway
const SERVICE: &str = "execute-api";

/// Signed API Gateway client bound to one invoke URL and stage
pub struct ApiGatewayClient {
    client: Client,
    base_url: String,
    region: String,
    api_key: String,
}

impl ApiGatewayClient {
    pub fn new(config: &Config, stage: &str, proxy: Option<&ProxyConfig>) -> Result<Self, ConfigError> {
        let base_url = stage_url(&config.invoke_url, stage);
        Url::parse(&base_url).map_err(|e| ConfigError::InvalidUrl {
            url: base_url.clone(),
            reason: e.to_string(),
        })?;

        let client = build_client(proxy, REQUEST_TIMEOUT_SECS).map_err(ConfigError::HttpClient)?;

        Ok(Self {
            client,
            base_url,
            region: config.api_gateway_region.clone(),
            api_key: config.effective_api_key().to_string(),
        })
    }

    /// Full request URL including query parameters
    ///
    /// Query names and values are percent-encoded with `%20` for spaces, the
    /// same form the signature is computed over.
    pub fn request_url(&self, request: &RequestSpec) -> Result<Url, InvokeError> {
        let path = request
            .expanded_path()
            .map_err(|e| InvokeError::InvalidRequest(e.to_string()))?;
        let separator = if path.starts_with('/') || path.is_empty() { "" } else { "/" };
        let raw = format!("{}{}{}", self.base_url, separator, path);

        let mut url = Url::parse(&raw).map_err(|e| InvokeError::InvalidRequest(format!("{}: {}", raw, e)))?;

        let query = request.query_params();
        if !query.is_empty() {
            let encoded = query
                .iter()
                .map(|(name, value)| {
                    format!("{}={}", urlencoding::encode(name), urlencoding::encode(value))
                })
                .collect::<Vec<_>>()
                .join("&");
            url.set_query(Some(&encoded));
        }

        Ok(url)
    }

    /// Default headers merged with caller headers; names are lowercased
    fn build_headers(&self, request: &RequestSpec) -> BTreeMap<String, String> {
        let mut headers = BTreeMap::new();
        headers.insert("accept".to_string(), "application/json".to_string());
        headers.insert("content-type".to_string(), "application/json".to_string());
        if !self.api_key.is_empty() {
            headers.insert("x-api-key".to_string(), self.api_key.clone());
        }
        for (name, value) in request.headers() {
            headers.insert(name.to_ascii_lowercase(), value);
        }
        headers
    }

    /// SigV4 headers (`authorization`, `x-amz-date`, `x-amz-security-token`)
    /// for the request exactly as it goes on the wire
    fn signing_headers(
        &self,
        credentials: &TemporaryCredentials,
        method: &Method,
        url: &Url,
        headers: &BTreeMap<String, String>,
        payload: &[u8],
        time: SystemTime,
    ) -> Result<Vec<(String, String)>, InvokeError> {
        let identity = Credentials::new(
            &credentials.access_key_id,
            &credentials.secret_access_key,
            Some(credentials.session_token.clone()),
            None,
            "cognito-identity-pool",
        )
        .into();
        let params = v4::SigningParams::builder()
            .identity(&identity)
            .region(&self.region)
            .name(SERVICE)
            .time(time)
            .settings(SigningSettings::default())
            .build()
            .map_err(|e| InvokeError::InvalidRequest(format!("signing parameters: {}", e)))?
            .into();

        let signable = SignableRequest::new(
            method.as_str(),
            url.as_str(),
            headers.iter().map(|(name, value)| (name.as_str(), value.as_str())),
            SignableBody::Bytes(payload),
        )
        .map_err(|e| InvokeError::InvalidRequest(format!("unsignable request: {}", e)))?;

        let (instructions, _signature) = sign(signable, &params)
            .map_err(|e| InvokeError::InvalidRequest(format!("signing failed: {}", e)))?
            .into_parts();
        let (signed, _) = instructions.into_parts();

        Ok(signed
            .into_iter()
            .map(|header| (header.name().to_string(), header.value().to_string()))
            .collect())
    }
}

impl Invoker for ApiGatewayClient {
    async fn invoke(
        &self,
        credentials: &TemporaryCredentials,
        request: &RequestSpec,
    ) -> Result<ResponseResult, InvokeError> {
        let url = self.request_url(request)?;
        let payload = request_payload(request)?;
        let mut headers = self.build_headers(request);

        let signed = self.signing_headers(
            credentials,
            &request.method,
            &url,
            &headers,
            &payload,
            SystemTime::now(),
        )?;
        headers.extend(signed);

        tracing::debug!(method = %request.method, url = %url, "Dispatching signed request");

        let mut builder = self.client.request(request.method.clone(), url);
        for (name, value) in &headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| InvokeError::InvalidRequest(format!("header {}: {}", name, e)))?;
            let value = HeaderValue::from_str(value)
                .map_err(|e| InvokeError::InvalidRequest(format!("header {}: {}", name, e)))?;
            builder = builder.header(name, value);
        }

        let response = builder
            .body(payload)
            .send()
            .await
            .map_err(|e| InvokeError::Transport {
                message: error_chain(&e),
            })?;

        let status = response.status();
        let status_text = status.canonical_reason().unwrap_or_default().to_string();
        let body = response.text().await.map_err(|e| InvokeError::Transport {
            message: error_chain(&e),
        })?;

        let result = ResponseResult::new(status.as_u16(), status_text, ResponseResult::parse_data(&body));

        if status.is_success() {
            tracing::debug!("Request succeeded with status {}", status);
            Ok(result)
        } else {
            tracing::debug!("Request rejected with status {}", status);
            Err(InvokeError::Rejected(result))
        }
    }
}

/// Invoke URL joined with the deploy stage by a single `/`
pub fn stage_url(invoke_url: &str, stage: &str) -> String {
    let base = invoke_url.trim_end_matches('/');
    let stage = stage.trim_matches('/');
    if stage.is_empty() {
        base.to_string()
    } else {
        format!("{}/{}", base, stage)
    }
}

/// Serialized body; GET and HEAD requests carry none
fn request_payload(request: &RequestSpec) -> Result<Vec<u8>, InvokeError> {
    if request.method == Method::GET || request.method == Method::HEAD {
        return Ok(Vec::new());
    }
    serde_json::to_vec(&request.body).map_err(|e| InvokeError::InvalidRequest(e.to_string()))
}
