use std::path::PathBuf;

use clap::Parser;

/// Sign in to a Cognito user pool and call an IAM-protected API Gateway endpoint
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, disable_version_flag = true)]
pub struct Args {
    /// API request path parameters (JSON object)
    #[arg(long)]
    pub params: String,

    /// Deploy stage appended to the invoke URL
    #[arg(long, default_value = "dev")]
    pub stage: String,

    /// API path template, e.g. /items/{id}
    #[arg(long)]
    pub path_template: String,

    /// API method
    #[arg(long, default_value = "GET")]
    pub method: String,

    /// API request additional params (JSON object with optional `headers` and `queryParams`)
    #[arg(long, default_value = "{}")]
    pub additional_params: String,

    /// API request body (JSON, or @path to read JSON from a file)
    #[arg(long, default_value = "{}")]
    pub body: String,

    /// Header used to pass the access token with the request
    #[arg(long)]
    pub access_token_header: Option<String>,

    /// Env file to load before reading the environment (defaults to .env when present)
    #[arg(long)]
    pub env_file: Option<PathBuf>,

    /// Print version
    #[arg(short = 'v', long, action = clap::ArgAction::Version)]
    version: (),
}
