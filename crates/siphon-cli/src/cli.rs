//! CLI argument definitions for siphon.

use std::path::PathBuf;

use clap::Parser;

/// Base URL used when neither the flag nor the environment provides one.
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000";

/// Environment variable consulted when `--base-url` is absent.
pub const BASE_URL_ENV: &str = "SIPHON_BASE_URL";

/// Move records from a paginated source to an upsert sink.
///
/// Exit codes: 0 on full success or a completed dry run, 2 when one or more
/// records failed reconciliation, 1 on fatal errors (for example a
/// pagination abort, which performs zero writes).
#[derive(Debug, Parser)]
#[command(
    name = "siphon",
    author,
    version,
    about = "Resilient source-to-sink record transfer"
)]
pub struct Cli {
    /// Base URL of the source/sink API.
    ///
    /// Falls back to SIPHON_BASE_URL, then http://127.0.0.1:8000.
    #[arg(long)]
    pub base_url: Option<String>,

    /// Fetch and write a report without performing any sink writes.
    #[arg(long, default_value_t = false)]
    pub dry_run: bool,

    /// Maximum number of records to transfer.
    #[arg(long)]
    pub limit: Option<usize>,

    /// Records requested per source page.
    #[arg(long, default_value_t = 10)]
    pub page_size: usize,

    /// Destination of the dry-run report artifact.
    #[arg(long, default_value = "report.json")]
    pub report: PathBuf,
}

impl Cli {
    pub fn resolve_base_url(&self) -> String {
        self.base_url
            .clone()
            .or_else(|| std::env::var(BASE_URL_ENV).ok())
            .unwrap_or_else(|| String::from(DEFAULT_BASE_URL))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_cover_the_common_invocation() {
        let cli = Cli::try_parse_from(["siphon"]).expect("bare invocation must parse");

        assert!(!cli.dry_run);
        assert_eq!(cli.limit, None);
        assert_eq!(cli.page_size, 10);
        assert_eq!(cli.report, PathBuf::from("report.json"));
    }

    #[test]
    fn flags_parse_into_their_fields() {
        let cli = Cli::try_parse_from([
            "siphon",
            "--base-url",
            "http://api.test:9000",
            "--dry-run",
            "--limit",
            "5",
            "--page-size",
            "20",
            "--report",
            "artifacts/report.json",
        ])
        .expect("full invocation must parse");

        assert_eq!(cli.base_url.as_deref(), Some("http://api.test:9000"));
        assert!(cli.dry_run);
        assert_eq!(cli.limit, Some(5));
        assert_eq!(cli.page_size, 20);
        assert_eq!(cli.report, PathBuf::from("artifacts/report.json"));
    }

    #[test]
    fn explicit_base_url_wins_over_any_fallback() {
        let cli = Cli::try_parse_from(["siphon", "--base-url", "http://flag.test"])
            .expect("must parse");

        assert_eq!(cli.resolve_base_url(), "http://flag.test");
    }
}
