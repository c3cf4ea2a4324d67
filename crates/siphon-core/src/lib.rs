//! # Siphon Core
//!
//! Resilient transfer engine: moves records from a paginated source endpoint
//! to an upsert-style sink endpoint, tolerating transient failures on both
//! sides without duplicating or losing records.
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`domain`] | Record, page, outcome, and context types |
//! | [`engine`] | [`SyncEngine`] facade over the pipeline |
//! | [`error`] | Fault taxonomy and validation errors |
//! | [`executor`] | Retry executor with backoff and `Retry-After` support |
//! | [`fetcher`] | Cursor-following paginated fetcher |
//! | [`http_client`] | Transport abstraction (reqwest and scripted) |
//! | [`reconciler`] | Idempotent per-record upsert loop |
//! | [`report`] | Dry-run report artifact |
//! | [`retry`] | Retry policy and jitter sources |
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use siphon_core::{ReqwestHttpClient, RunContext, SyncEngine, TransferOptions};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let ctx = RunContext::new("http://127.0.0.1:8000")?;
//!     let engine = SyncEngine::new(Arc::new(ReqwestHttpClient::new()));
//!     let outcome = engine.sync(&ctx, TransferOptions::default()).await?;
//!     println!("created={} updated={} failed={}",
//!         outcome.created_count, outcome.updated_count, outcome.failed_count);
//!     Ok(())
//! }
//! ```
//!
//! ## Failure stance
//!
//! Pagination is fail-fast: a page that exhausts its retry budget aborts the
//! run before a single write happens, because a broken read cannot be
//! compensated for. Reconciliation is fail-isolated: a record that exhausts
//! its budget becomes a failure count and the run continues, because an
//! idempotent upsert is safely re-runnable. The asymmetry is deliberate.

pub mod domain;
pub mod engine;
pub mod error;
pub mod executor;
pub mod fetcher;
pub mod http_client;
pub mod reconciler;
pub mod report;
pub mod retry;

pub use domain::{PageResult, Record, RunContext, SyncOutcome, UpsertStatus, UtcDateTime};
pub use engine::{SyncEngine, TransferOptions};
pub use error::{AttemptFault, TransferError, ValidationError};
pub use executor::{retryable_status, RetryExecutor};
pub use fetcher::{PageFetcher, MAX_PAGES};
pub use http_client::{
    HttpClient, HttpError, HttpMethod, HttpRequest, HttpResponse, ReqwestHttpClient,
    ScriptedHttpClient,
};
pub use reconciler::{IdempotencyTokens, PrefixTokens, Reconciler};
pub use report::SyncReport;
pub use retry::{FixedJitter, JitterSource, RetryPolicy, UniformJitter};
