//! Meridian project service entry point.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use meridian_core::{RandomUserDirectory, UuidIdentityVerifier};
use meridian_server::{create_project_handler, AppConfig, Server, VERSION};
use meridian_telemetry::init_logging;

/// Command-line arguments.
struct Args {
    /// Path to configuration file.
    config: Option<PathBuf>,
}

impl Args {
    fn parse() -> Self {
        let mut args = std::env::args().skip(1);
        let mut config = None;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--config" | "-c" => {
                    config = args.next().map(PathBuf::from);
                }
                "--help" | "-h" => {
                    print_help();
                    std::process::exit(0);
                }
                "--version" | "-v" => {
                    println!("meridian {VERSION}");
                    std::process::exit(0);
                }
                other => {
                    eprintln!("Unknown argument: {other}");
                    eprintln!("Use --help for usage information");
                    std::process::exit(1);
                }
            }
        }

        Self { config }
    }
}

fn print_help() {
    println!(
        r"Meridian - project service

USAGE:
    meridian [OPTIONS]

OPTIONS:
    -c, --config <PATH>    Path to configuration file (TOML or JSON)
    -h, --help             Print help information
    -v, --version          Print version information

ENVIRONMENT VARIABLES:
    MERIDIAN_HTTP_ADDR              Bind address (default: 0.0.0.0:8080)
    MERIDIAN_PORT                   Bind port, keeps the configured host
    MERIDIAN_LOG_LEVEL              Log filter directive (default: info)
    MERIDIAN_LOG_FORMAT             json or pretty (default: json)
    MERIDIAN_NOT_FOUND_THRESHOLD    Probability of reporting an unknown user (default: 0.3)
"
    );
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => AppConfig::from_file(path)
            .with_context(|| format!("failed to load configuration from {}", path.display()))?,
        None => AppConfig::default(),
    }
    .with_env_overrides()
    .context("invalid environment override")?;

    config.validate().context("invalid configuration")?;
    init_logging(&config.log_config()).context("failed to initialize logging")?;

    let server_config = config.server_config();
    tracing::info!(
        version = VERSION,
        addr = server_config.http_addr(),
        not_found_threshold = server_config.not_found_threshold(),
        "starting meridian"
    );

    let handler = create_project_handler(
        Arc::new(RandomUserDirectory::with_threshold(
            server_config.not_found_threshold(),
        )),
        Arc::new(UuidIdentityVerifier),
    );

    Server::new(server_config, handler)
        .run()
        .await
        .context("server error")
}
