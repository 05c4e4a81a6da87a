mod cognito;
mod error;
mod gateway;
mod http_client;
mod model;
mod pipeline;
mod report;

use std::process::ExitCode;

use clap::Parser;
use cognito::identity_pool::IdentityPoolClient;
use cognito::user_pool::UserPoolClient;
use error::PipelineError;
use gateway::client::ApiGatewayClient;
use gateway::request::{RequestSpec, validate_header_name};
use model::arg::Args;
use model::config::Config;
use model::response::ResponseResult;

#[tokio::main]
async fn main() -> ExitCode {
    // Parse command line arguments
    let args = Args::parse();

    // Initialize logging; stdout is reserved for the result
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let outcome = execute(&args).await;
    let report = report::render(&outcome);
    if let Err(err) = &outcome {
        tracing::error!(class = err.class(), exit_code = report.exit_code, "{}", err);
    }
    if let Some(out) = &report.stdout {
        println!("{}", out);
    }
    if let Some(err) = &report.stderr {
        eprintln!("{}", err);
    }

    ExitCode::from(report.exit_code)
}

async fn execute(args: &Args) -> Result<ResponseResult, PipelineError> {
    // Load configuration
    if let Some(path) = Config::load_env_file(args.env_file.as_deref())? {
        tracing::debug!("Loaded env file {}", path.display());
    }
    let config = Config::from_env()?;
    tracing::debug!("Configuration: {:?}", config);

    // Validate the request before any network call
    let request = RequestSpec::from_args(args)?;
    let access_token_header = args
        .access_token_header
        .as_deref()
        .map(validate_header_name)
        .transpose()?;

    // Build proxy configuration
    let proxy = config.proxy();
    if let Some(proxy) = &proxy {
        tracing::info!("HTTP proxy configured: {}", proxy.url);
    }

    // Cognito calls go through the SDK clients; the proxy applies to the gateway call
    let sdk_config = cognito::load_sdk_config(&config).await;
    let user_pool = UserPoolClient::new(&config, &sdk_config);
    let identity_pool = IdentityPoolClient::new(&config, &sdk_config);
    let api_gateway = ApiGatewayClient::new(&config, &args.stage, proxy.as_ref())?;

    pipeline::run(
        &user_pool,
        &identity_pool,
        &api_gateway,
        request,
        access_token_header.as_deref(),
    )
    .await
}
