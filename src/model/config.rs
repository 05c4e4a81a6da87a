use std::path::{Path, PathBuf};

use crate::error::ConfigError;
use crate::http_client::ProxyConfig;

/// Environment variables that must be set
pub const REQUIRED_VARS: [&str; 8] = [
    "USER_POOL_ID",
    "APP_CLIENT_ID",
    "COGNITO_REGION",
    "IDENTITY_POOL_ID",
    "API_GATEWAY_REGION",
    "INVOKE_URL",
    "USERNAME",
    "PASSWORD",
];

/// User pool sign-in flow, from `COGNITO_AUTH_FLOW`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SignInFlow {
    /// `USER_SRP_AUTH`: the password never leaves the process
    #[default]
    Srp,
    /// `USER_PASSWORD_AUTH`: for app clients that do not allow SRP
    Password,
}

impl std::str::FromStr for SignInFlow {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "USER_SRP_AUTH" | "SRP" => Ok(SignInFlow::Srp),
            "USER_PASSWORD_AUTH" | "PASSWORD" => Ok(SignInFlow::Password),
            _ => Err(ConfigError::InvalidAuthFlow(s.to_string())),
        }
    }
}

/// Process configuration read from the environment
#[derive(Clone)]
pub struct Config {
    pub user_pool_id: String,
    pub app_client_id: String,
    pub cognito_region: String,
    pub identity_pool_id: String,
    pub api_gateway_region: String,
    pub invoke_url: String,
    pub username: String,
    pub password: String,

    /// Sign-in flow, SRP unless overridden
    pub auth_flow: SignInFlow,

    /// Value of the x-api-key header, falls back to app_client_id if not configured
    pub api_key: Option<String>,

    /// User pool endpoint override (e.g. a local emulator)
    pub cognito_idp_endpoint: Option<String>,

    /// Identity pool endpoint override
    pub cognito_identity_endpoint: Option<String>,

    /// HTTP proxy URL (optional)
    /// Supported formats: http://host:port, https://host:port, socks5://host:port
    pub proxy_url: Option<String>,

    /// Proxy authentication username (optional)
    pub proxy_username: Option<String>,

    /// Proxy authentication password (optional)
    pub proxy_password: Option<String>,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("user_pool_id", &self.user_pool_id)
            .field("app_client_id", &self.app_client_id)
            .field("cognito_region", &self.cognito_region)
            .field("identity_pool_id", &self.identity_pool_id)
            .field("api_gateway_region", &self.api_gateway_region)
            .field("invoke_url", &self.invoke_url)
            .field("username", &self.username)
            .field("auth_flow", &self.auth_flow)
            .field("proxy_url", &self.proxy_url)
            .finish_non_exhaustive()
    }
}

impl Config {
    /// Get default env file name
    pub fn default_env_file() -> &'static str {
        ".env"
    }

    /// Load an env file into the process environment
    ///
    /// Variables already set in the environment are kept. An explicit path must
    /// exist; the default `.env` is optional.
    pub fn load_env_file(path: Option<&Path>) -> Result<Option<PathBuf>, ConfigError> {
        match path {
            Some(path) => dotenvy::from_path(path)
                .map(|_| Some(path.to_path_buf()))
                .map_err(|source| ConfigError::EnvFile {
                    path: path.to_path_buf(),
                    source,
                }),
            None => match dotenvy::from_filename(Self::default_env_file()) {
                Ok(found) => Ok(Some(found)),
                Err(e) if e.not_found() => Ok(None),
                Err(source) => Err(ConfigError::EnvFile {
                    path: PathBuf::from(Self::default_env_file()),
                    source,
                }),
            },
        }
    }

    /// Read configuration from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read configuration through `lookup`, reporting every missing variable at once
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let optional = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let mut missing = Vec::new();
        let mut values = Vec::with_capacity(REQUIRED_VARS.len());
        for name in REQUIRED_VARS {
            match optional(name) {
                Some(value) => values.push(value),
                None => {
                    missing.push(name.to_string());
                    values.push(String::new());
                }
            }
        }

        if !missing.is_empty() {
            return Err(ConfigError::MissingEnv(missing));
        }

        let auth_flow = optional("COGNITO_AUTH_FLOW")
            .map(|flow| flow.parse::<SignInFlow>())
            .transpose()?
            .unwrap_or_default();

        let mut values = values.into_iter();
        let mut next = || values.next().unwrap_or_default();

        Ok(Self {
            user_pool_id: next(),
            app_client_id: next(),
            cognito_region: next(),
            identity_pool_id: next(),
            api_gateway_region: next(),
            invoke_url: next(),
            username: next(),
            password: next(),
            auth_flow,
            api_key: optional("API_KEY"),
            cognito_idp_endpoint: optional("COGNITO_IDP_ENDPOINT"),
            cognito_identity_endpoint: optional("COGNITO_IDENTITY_ENDPOINT"),
            proxy_url: optional("PROXY_URL"),
            proxy_username: optional("PROXY_USERNAME"),
            proxy_password: optional("PROXY_PASSWORD"),
        })
    }

    /// Get effective API key
    /// Prefers API_KEY, falls back to the app client id if not configured
    pub fn effective_api_key(&self) -> &str {
        self.api_key.as_deref().unwrap_or(&self.app_client_id)
    }

    /// Login map key identifying the user pool as the token issuer
    pub fn login_provider(&self) -> String {
        format!(
            "cognito-idp.{}.amazonaws.com/{}",
            self.cognito_region, self.user_pool_id
        )
    }

    /// Build proxy configuration
    pub fn proxy(&self) -> Option<ProxyConfig> {
        self.proxy_url.as_ref().map(|url| {
            let mut proxy = ProxyConfig::new(url);
            if let (Some(username), Some(password)) = (&self.proxy_username, &self.proxy_password) {
                proxy = proxy.with_auth(username, password);
            }
            proxy
        })
    }
}
