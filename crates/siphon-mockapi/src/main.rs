use std::net::SocketAddr;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use siphon_mockapi::MockApiConfig;

/// In-memory source/sink services with scripted failure injection.
#[derive(Debug, Parser)]
#[command(
    name = "siphon-mockapi",
    version,
    about = "Mock source/sink API for exercising siphon end to end"
)]
struct Cli {
    /// Port to listen on.
    #[arg(long, default_value_t = 8000)]
    port: u16,

    /// Number of records to seed into the source.
    #[arg(long, default_value_t = 25)]
    seed: usize,

    /// Disable failure injection entirely.
    #[arg(long, default_value_t = false)]
    reliable: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let filter = EnvFilter::try_from_env("SIPHON_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let config = if cli.reliable {
        MockApiConfig::reliable(cli.seed)
    } else {
        MockApiConfig {
            seed_count: cli.seed,
            ..MockApiConfig::default()
        }
    };

    let addr = SocketAddr::from(([127, 0, 0, 1], cli.port));
    match siphon_mockapi::serve(config, addr).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("error: {error}");
            ExitCode::FAILURE
        }
    }
}
