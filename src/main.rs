//! Command-line entry point.
//!
//! Reads one analysis request as JSON from a file path (or stdin when the
//! path is omitted or `-`), runs it and prints the result as JSON. Requests
//! without an `options` object use the configured analysis defaults.

use std::process::ExitCode;

use serde_json::{json, Value};
use thiserror::Error;
use tokio::io::AsyncReadExt;
use tracing::{error, info};

use jtbd_forces::application::RunForcesAnalysisCommand;
use jtbd_forces::config::{AppConfig, ConfigError};
use jtbd_forces::domain::analysis::{AnalysisError, AnalysisInput};

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Failed to read request: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed request: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Analysis(#[from] AnalysisError),

    #[error("Usage: jtbd-forces [REQUEST.json | -]")]
    Usage,
}

#[tokio::main]
async fn main() -> ExitCode {
    let config = match load_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = init_tracing(&config) {
        eprintln!("{}", e);
        return ExitCode::FAILURE;
    }

    match run(&config).await {
        Ok(output) => {
            println!("{}", output);
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, "Forces analysis failed");
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn load_config() -> Result<AppConfig, ConfigError> {
    let config = AppConfig::load()?;
    config.validate()?;
    Ok(config)
}

fn init_tracing(config: &AppConfig) -> Result<(), ConfigError> {
    let filter = config.logging.env_filter()?;
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    if config.logging.json {
        builder.json().init();
    } else {
        builder.init();
    }
    Ok(())
}

async fn run(config: &AppConfig) -> Result<String, CliError> {
    let raw = read_request().await?;
    let input = parse_request(&raw, config)?;

    info!(
        survey_id = %input.survey_id,
        responses = input.responses.len(),
        "Running forces analysis"
    );

    let handler = config.build_handler()?;
    let outcome = handler.handle(RunForcesAnalysisCommand::new(input)).await?;

    let output = json!({
        "cache_key": outcome.cache_key,
        "from_cache": outcome.from_cache,
        "result": outcome.result,
    });
    Ok(serde_json::to_string_pretty(&output)?)
}

async fn read_request() -> Result<String, CliError> {
    let mut args = std::env::args().skip(1);
    let path = args.next();
    if args.next().is_some() {
        return Err(CliError::Usage);
    }

    match path.as_deref() {
        None | Some("-") => {
            let mut raw = String::new();
            tokio::io::stdin().read_to_string(&mut raw).await?;
            Ok(raw)
        }
        Some("-h") | Some("--help") => Err(CliError::Usage),
        Some(path) => Ok(tokio::fs::read_to_string(path).await?),
    }
}

fn parse_request(raw: &str, config: &AppConfig) -> Result<AnalysisInput, CliError> {
    let mut request: Value = serde_json::from_str(raw)?;
    if let Value::Object(fields) = &mut request {
        if !fields.contains_key("options") {
            fields.insert("options".to_string(), serde_json::to_value(&config.analysis)?);
        }
    }
    Ok(serde_json::from_value(request)?)
}
