use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use quote_relay::client::{ClientError, RelayClient};
use quote_relay::config::loader;
use quote_relay::observability::logging;

/// Exit status for a client-side timeout.
const EXIT_TIMEOUT: u8 = 2;

#[derive(Parser)]
#[command(name = "quote-client")]
#[command(about = "Fetches the current bid from the quotation relay and writes it to a file", long_about = None)]
struct Cli {
    /// TOML configuration file (shared with the server).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Relay endpoint URL.
    #[arg(short, long)]
    url: Option<String>,

    /// Outer request deadline in milliseconds.
    #[arg(short, long)]
    timeout_ms: Option<u64>,

    /// Output file.
    #[arg(short, long)]
    output: Option<String>,
}

#[tokio::main]
async fn main() -> ExitCode {
    match run(Cli::parse()).await {
        Ok(path) => {
            println!("Quotation written to {}", path.display());
            ExitCode::SUCCESS
        }
        Err(RunError::Client(e)) if e.is_timeout() => {
            tracing::warn!(error = %e, "Client deadline reached");
            eprintln!("Timeout: {}", e);
            ExitCode::from(EXIT_TIMEOUT)
        }
        Err(e) => {
            tracing::error!(error = %e, "Client run failed");
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

#[derive(Debug, thiserror::Error)]
enum RunError {
    #[error(transparent)]
    Config(#[from] loader::ConfigError),

    #[error("{0}")]
    Logging(String),

    #[error(transparent)]
    Client(#[from] ClientError),
}

async fn run(cli: Cli) -> Result<PathBuf, RunError> {
    let mut config = loader::read_or_default(cli.config.as_deref())?;
    if let Some(url) = cli.url {
        config.client.endpoint_url = url;
    }
    if let Some(ms) = cli.timeout_ms {
        config.timeouts.client_request_ms = ms;
    }
    if let Some(output) = cli.output {
        config.client.output_path = output;
    }
    let config = loader::finalize(config)?;

    logging::init_tracing(&config.observability).map_err(RunError::Logging)?;

    let client = RelayClient::from_config(&config.client, config.timeouts.client_request())?;
    let output = PathBuf::from(&config.client.output_path);
    tracing::info!(
        endpoint = %client.endpoint(),
        output = %output.display(),
        "Quote client starting"
    );
    client.run(&output, &config.client.label).await?;

    Ok(output)
}
