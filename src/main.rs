use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use beacon::agent::Agent;
use beacon::config::AgentConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LogFormat {
    Pretty,
    Json,
}

/// Beaconing agent: polls a control endpoint for tasks and reports results.
#[derive(Debug, Parser)]
#[command(name = "beacon", version, about)]
struct Cli {
    /// TOML config file. Flags and environment variables override it.
    #[arg(long, env = "BEACON_CONFIG")]
    config: Option<PathBuf>,

    /// Control endpoint host.
    #[arg(long, env = "BEACON_HOST")]
    host: Option<String>,

    /// Control endpoint service (port).
    #[arg(long, env = "BEACON_SERVICE")]
    service: Option<String>,

    /// URL scheme (http or https).
    #[arg(long, env = "BEACON_SCHEME")]
    scheme: Option<String>,

    /// Request path on the control endpoint.
    #[arg(long, env = "BEACON_PATH")]
    path: Option<String>,

    /// Initial mean dwell between check-ins, in seconds.
    #[arg(long, env = "BEACON_MEAN_DWELL")]
    mean_dwell: Option<f64>,

    /// Round-trip timeout in seconds (0 disables it).
    #[arg(long, env = "BEACON_REQUEST_TIMEOUT")]
    request_timeout: Option<u64>,

    /// Cap on captured command output, in bytes.
    #[arg(long, env = "BEACON_MAX_OUTPUT_BYTES")]
    max_output_bytes: Option<usize>,

    /// Log output format.
    #[arg(long, env = "BEACON_LOG_FORMAT", value_enum, default_value = "pretty")]
    log_format: LogFormat,
}

impl Cli {
    fn into_config(self) -> beacon::Result<AgentConfig> {
        let mut config = match &self.config {
            Some(path) => AgentConfig::from_file(path)?,
            None => AgentConfig::default(),
        };

        if let Some(host) = self.host {
            config.host = host;
        }
        if let Some(service) = self.service {
            config.service = service;
        }
        if let Some(scheme) = self.scheme {
            config.scheme = scheme;
        }
        if let Some(path) = self.path {
            config.path = path;
        }
        if let Some(mean_dwell) = self.mean_dwell {
            config.mean_dwell = mean_dwell;
        }
        if let Some(timeout) = self.request_timeout {
            config.request_timeout_secs = timeout;
        }
        if let Some(max) = self.max_output_bytes {
            config.max_output_bytes = max;
        }

        config.validate()?;
        Ok(config)
    }
}

fn init_logging(format: LogFormat) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("beacon=info"));

    match format {
        LogFormat::Pretty => tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(false))
            .init(),
        LogFormat::Json => tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json())
            .init(),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env before clap reads environment fallbacks.
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    init_logging(cli.log_format);

    let config = cli.into_config()?;
    let mut agent = Agent::over_http(&config)?;

    let stop = agent.stop_handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Interrupt received, stopping after the current cycle");
            stop.stop();
        }
    });

    let stats = agent.serve().await;
    tracing::debug!(?stats, "Exiting");
    Ok(())
}
