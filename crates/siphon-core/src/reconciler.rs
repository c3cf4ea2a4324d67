//! Per-record reconciliation against the sink.

use serde::Deserialize;

use crate::domain::{Record, RunContext, SyncOutcome, UpsertStatus};
use crate::error::TransferError;
use crate::executor::RetryExecutor;
use crate::http_client::HttpRequest;
use crate::retry::RetryPolicy;

/// Strategy producing the idempotency token submitted with each upsert.
///
/// Tokens must be a pure function of the record key: the same `external_id`
/// yields the same token across processes and runs, so the sink (or any
/// intermediary) can collapse duplicate submissions safely.
pub trait IdempotencyTokens: Send + Sync {
    fn token_for(&self, external_id: &str) -> String;
}

/// Default token scheme: a stable namespaced form of the record key.
#[derive(Debug, Clone)]
pub struct PrefixTokens {
    prefix: String,
}

impl PrefixTokens {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }
}

impl Default for PrefixTokens {
    fn default() -> Self {
        Self::new("sync")
    }
}

impl IdempotencyTokens for PrefixTokens {
    fn token_for(&self, external_id: &str) -> String {
        format!("{}:{}", self.prefix, external_id)
    }
}

#[derive(Debug, Deserialize)]
struct UpsertReply {
    status: UpsertStatus,
}

/// Pushes fetched records into the sink one upsert at a time.
pub struct Reconciler<'a> {
    executor: &'a RetryExecutor,
    tokens: &'a dyn IdempotencyTokens,
}

impl<'a> Reconciler<'a> {
    pub fn new(executor: &'a RetryExecutor, tokens: &'a dyn IdempotencyTokens) -> Self {
        Self { executor, tokens }
    }

    /// Upsert every record in the order supplied, tallying outcomes
    /// independently.
    ///
    /// A record whose retry budget runs out is counted as failed and the
    /// walk continues with the next record; an unfinished sync is
    /// recoverable by re-running it, so one bad record never aborts the run.
    /// Each record is attempted exactly once per run.
    pub async fn reconcile(&self, ctx: &RunContext, records: &[Record]) -> SyncOutcome {
        let mut outcome = SyncOutcome::default();
        let url = format!("{}/sink/items", ctx.base_url());

        for record in records {
            match self.upsert(ctx, &url, record).await {
                Ok(UpsertStatus::Created) => outcome.created_count += 1,
                Ok(UpsertStatus::Updated) => outcome.updated_count += 1,
                Err(error) => {
                    outcome.failed_count += 1;
                    tracing::error!(
                        run_id = %ctx.run_id(),
                        external_id = %record.external_id,
                        error = %error,
                        "upsert_failed"
                    );
                }
            }
        }

        outcome
    }

    async fn upsert(
        &self,
        ctx: &RunContext,
        url: &str,
        record: &Record,
    ) -> Result<UpsertStatus, TransferError> {
        let body = serde_json::to_string(record).map_err(|source| TransferError::Codec {
            url: url.to_owned(),
            source,
        })?;
        let request = HttpRequest::post(url)
            .with_header("idempotency-key", self.tokens.token_for(&record.external_id))
            .with_body(body);

        let response = self
            .executor
            .execute(&request, &RetryPolicy::default(), ctx)
            .await?;

        let reply: UpsertReply =
            serde_json::from_str(&response.body).map_err(|source| TransferError::Codec {
                url: url.to_owned(),
                source,
            })?;
        Ok(reply.status)
    }
}
