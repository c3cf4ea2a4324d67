//! One-stop facade over the transfer pipeline.

use std::sync::Arc;

use crate::domain::{Record, RunContext, SyncOutcome};
use crate::error::TransferError;
use crate::executor::RetryExecutor;
use crate::fetcher::PageFetcher;
use crate::http_client::HttpClient;
use crate::reconciler::{IdempotencyTokens, PrefixTokens, Reconciler};
use crate::report::SyncReport;

/// Knobs for one transfer run.
#[derive(Debug, Clone, Copy)]
pub struct TransferOptions {
    /// Records requested per source page.
    pub page_size: usize,
    /// Optional cap on how many records are fetched and reconciled.
    pub limit: Option<usize>,
}

impl Default for TransferOptions {
    fn default() -> Self {
        Self {
            page_size: 10,
            limit: None,
        }
    }
}

/// Composes the fetcher and the reconciler over one shared executor.
///
/// Callers hold one engine per run; the transport it owns is dropped with
/// it, fatal pagination failure included.
pub struct SyncEngine {
    executor: RetryExecutor,
    tokens: Box<dyn IdempotencyTokens>,
}

impl SyncEngine {
    pub fn new(client: Arc<dyn HttpClient>) -> Self {
        Self::with_parts(RetryExecutor::new(client), Box::new(PrefixTokens::default()))
    }

    pub fn with_parts(executor: RetryExecutor, tokens: Box<dyn IdempotencyTokens>) -> Self {
        Self { executor, tokens }
    }

    /// Assemble the full (or limit-truncated) record sequence from the
    /// source. Aborts on any page that exhausts its retry budget.
    pub async fn fetch(
        &self,
        ctx: &RunContext,
        options: TransferOptions,
    ) -> Result<Vec<Record>, TransferError> {
        let records = PageFetcher::new(&self.executor)
            .fetch_all(ctx, options.page_size, options.limit)
            .await?;
        tracing::info!(
            run_id = %ctx.run_id(),
            count = records.len(),
            "fetched_source"
        );
        Ok(records)
    }

    /// Full transfer: fetch everything, then upsert record by record.
    pub async fn sync(
        &self,
        ctx: &RunContext,
        options: TransferOptions,
    ) -> Result<SyncOutcome, TransferError> {
        let records = self.fetch(ctx, options).await?;
        let outcome = Reconciler::new(&self.executor, self.tokens.as_ref())
            .reconcile(ctx, &records)
            .await;

        tracing::info!(
            run_id = %ctx.run_id(),
            fetched_count = records.len(),
            created_count = outcome.created_count,
            updated_count = outcome.updated_count,
            failed_count = outcome.failed_count,
            "run_summary"
        );
        Ok(outcome)
    }

    /// Dry run: fetch and snapshot. Never touches the sink.
    pub async fn dry_run(
        &self,
        ctx: &RunContext,
        options: TransferOptions,
    ) -> Result<SyncReport, TransferError> {
        let records = self.fetch(ctx, options).await?;
        Ok(SyncReport::new(ctx, &records))
    }
}
