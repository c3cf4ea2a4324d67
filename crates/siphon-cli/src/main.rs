mod cli;
mod error;

use std::fs;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use siphon_core::{ReqwestHttpClient, RunContext, SyncEngine, TransferOptions};

use crate::cli::Cli;
use crate::error::CliError;

/// Exit code signalling that some records failed reconciliation.
const EXIT_PARTIAL: u8 = 2;

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();

    match run().await {
        Ok(code) => code,
        Err(error) => {
            eprintln!("error: {error}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("SIPHON_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

async fn run() -> Result<ExitCode, CliError> {
    let cli = Cli::parse();
    let ctx = RunContext::new(cli.resolve_base_url())?;
    tracing::info!(run_id = %ctx.run_id(), base_url = %ctx.base_url(), "run_start");

    let engine = SyncEngine::new(Arc::new(ReqwestHttpClient::new()));
    let options = TransferOptions {
        page_size: cli.page_size,
        limit: cli.limit,
    };

    if cli.dry_run {
        let report = engine.dry_run(&ctx, options).await?;
        if let Some(parent) = cli.report.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(&cli.report, serde_json::to_string_pretty(&report)?)?;
        tracing::info!(
            run_id = %ctx.run_id(),
            path = %cli.report.display(),
            count = report.count,
            "dry_run_report_written"
        );
        return Ok(ExitCode::SUCCESS);
    }

    let outcome = engine.sync(&ctx, options).await?;
    if outcome.is_clean() {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::from(EXIT_PARTIAL))
    }
}
