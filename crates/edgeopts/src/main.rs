// # edgeopts - Service Options CLI
//
// Thin command-line layer over `edgeopts-core`. It reads configuration from
// the environment, sets up logging, builds the HTTP client and hands the
// command to `OptionsUpdater`. No validation or update logic lives here.
//
// ## Configuration
//
// - `EDGEOPTS_API_TOKEN`: API token (required)
// - `EDGEOPTS_API_URL`: API base URL (optional)
// - `EDGEOPTS_TIMEOUT_SECS`: HTTP timeout in seconds (default: 30)
// - `EDGEOPTS_MODE`: `live` or `dry-run` (default: live)
// - `EDGEOPTS_PROTECT_KEY_ACTION`: `create` or `regenerate` (default: create)
// - `EDGEOPTS_LOG_LEVEL`: trace, debug, info, warn, error (default: info)
//
// ## Example
//
// ```bash
// export EDGEOPTS_API_TOKEN=your_token
//
// edgeopts metadata svc-123
// edgeopts validate svc-123 options.json
// EDGEOPTS_MODE=dry-run edgeopts update svc-123 options.json
// ```

use anyhow::Result;
use clap::{Parser, Subcommand};
use edgeopts_core::config::{ApiConfig, DEFAULT_API_URL};
use edgeopts_core::options::load_options_file;
use edgeopts_core::{Error, OptionsUpdater, ProtectKeyAction, UpdaterConfig};
use edgeopts_http::HttpOptionsApi;
use std::env;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{Level, error, info};
use tracing_subscriber::FmtSubscriber;

/// Exit codes for different termination scenarios
#[derive(Debug, Clone, Copy)]
enum EdgeoptsExitCode {
    /// Command succeeded
    Success = 0,
    /// Configuration error or startup failure
    ConfigError = 1,
    /// Remote or unexpected failure
    RuntimeError = 2,
    /// Options were rejected by validation
    ValidationFailed = 3,
}

impl From<EdgeoptsExitCode> for ExitCode {
    fn from(code: EdgeoptsExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

#[derive(Debug, Parser)]
#[command(name = "edgeopts", version, about = "Validate and update edge service options")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print a service's options metadata, grouped
    Metadata {
        /// Service ID
        service_id: String,
    },
    /// Print a service's current options as JSON
    Get {
        /// Service ID
        service_id: String,
    },
    /// Validate an options file against a service's metadata
    Validate {
        /// Service ID
        service_id: String,
        /// JSON file containing an options object
        file: PathBuf,
    },
    /// Validate and apply an options file
    Update {
        /// Service ID
        service_id: String,
        /// JSON file containing an options object
        file: PathBuf,
    },
}

/// Application configuration
struct Config {
    api: ApiConfig,
    protect_key_action: ProtectKeyAction,
    log_level: String,
}

impl Config {
    /// Load configuration from environment variables
    fn from_env() -> Result<Self> {
        let api_token = env::var("EDGEOPTS_API_TOKEN").map_err(|_| {
            anyhow::anyhow!(
                "EDGEOPTS_API_TOKEN is required. Set it via: export EDGEOPTS_API_TOKEN=your_token"
            )
        })?;

        let timeout_secs = match env::var("EDGEOPTS_TIMEOUT_SECS") {
            Ok(s) => s
                .parse()
                .map_err(|_| anyhow::anyhow!("EDGEOPTS_TIMEOUT_SECS must be a number. Got: {}", s))?,
            Err(_) => 30,
        };

        let dry_run = match env::var("EDGEOPTS_MODE")
            .unwrap_or_else(|_| "live".to_string())
            .to_lowercase()
            .as_str()
        {
            "live" => false,
            "dry-run" => true,
            other => anyhow::bail!(
                "EDGEOPTS_MODE '{}' is not valid. Valid modes: live, dry-run",
                other
            ),
        };

        let protect_key_action = env::var("EDGEOPTS_PROTECT_KEY_ACTION")
            .ok()
            .map(|s| s.parse::<ProtectKeyAction>())
            .transpose()?
            .unwrap_or_default();

        let api = ApiConfig::new(api_token)
            .with_base_url(env::var("EDGEOPTS_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string()))
            .with_timeout_secs(timeout_secs)
            .with_dry_run(dry_run);

        Ok(Self {
            api,
            protect_key_action,
            log_level: env::var("EDGEOPTS_LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
        })
    }

    /// Validate the configuration
    fn validate(&self) -> Result<()> {
        self.api.validate()?;

        match self.log_level.to_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => anyhow::bail!(
                "EDGEOPTS_LOG_LEVEL '{}' is not valid. \
                Valid levels: trace, debug, info, warn, error",
                self.log_level
            ),
        }

        Ok(())
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return EdgeoptsExitCode::ConfigError.into();
        }
    };

    if let Err(e) = config.validate() {
        eprintln!("Configuration validation error: {}", e);
        return EdgeoptsExitCode::ConfigError.into();
    }

    let log_level = match config.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return EdgeoptsExitCode::ConfigError.into();
    }

    let api = match HttpOptionsApi::new(&config.api) {
        Ok(api) => api,
        Err(e) => {
            error!("Failed to create API client: {}", e);
            return EdgeoptsExitCode::ConfigError.into();
        }
    };

    let updater = OptionsUpdater::with_config(
        Box::new(api),
        UpdaterConfig {
            protect_key_action: config.protect_key_action,
        },
    );

    let rt = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return EdgeoptsExitCode::RuntimeError.into();
        }
    };

    let result = rt.block_on(run(&updater, cli.command));

    match result {
        Ok(()) => EdgeoptsExitCode::Success.into(),
        Err(e) => report(e).into(),
    }
}

/// Run one command
async fn run(updater: &OptionsUpdater, command: Command) -> edgeopts_core::Result<()> {
    match command {
        Command::Metadata { service_id } => {
            let schema = updater.metadata(&service_id).await?;
            for (group, descriptors) in schema.grouped() {
                println!("{}", if group.is_empty() { "(ungrouped)" } else { group });
                for descriptor in descriptors {
                    let key = descriptor.option_key().unwrap_or("-");
                    let shape = descriptor
                        .property
                        .as_ref()
                        .map(|p| p.property_type.as_str())
                        .unwrap_or("standard");
                    println!(
                        "  {:<28} {:<12} {}{}",
                        key,
                        shape,
                        descriptor.name,
                        if descriptor.read_only { " (read-only)" } else { "" }
                    );
                }
            }
        }
        Command::Get { service_id } => {
            let options = updater.current(&service_id).await?;
            println!("{}", serde_json::to_string_pretty(&options)?);
        }
        Command::Validate { service_id, file } => {
            let options = load_options_file(&file).await?;
            let split = updater.check(&service_id, &options).await?;
            info!(
                "{} option(s) valid for service {}",
                split.remaining.len(),
                service_id
            );
            println!("OK");
        }
        Command::Update { service_id, file } => {
            let options = load_options_file(&file).await?;
            let result = updater.update(&service_id, &options).await?;
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
    }

    Ok(())
}

/// Print an error and pick the exit code
fn report(err: Error) -> EdgeoptsExitCode {
    match &err {
        Error::Validation(set) => {
            match serde_json::to_string_pretty(set) {
                Ok(json) => eprintln!("{}", json),
                Err(_) => eprintln!("{}", set),
            }
            EdgeoptsExitCode::ValidationFailed
        }
        Error::MissingId(_) | Error::InvalidInput(_) | Error::Config(_) => {
            error!("{}", err);
            EdgeoptsExitCode::ConfigError
        }
        _ => {
            error!("{}", err);
            EdgeoptsExitCode::RuntimeError
        }
    }
}
