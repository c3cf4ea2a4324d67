use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// A single source record, moved to the sink unchanged.
///
/// `external_id` is the unique key; the mapping between source and sink is
/// the identity over these three fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub external_id: String,
    pub name: String,
    pub value: i64,
}

impl Record {
    pub fn new(
        external_id: impl Into<String>,
        name: impl Into<String>,
        value: i64,
    ) -> Result<Self, ValidationError> {
        let external_id = external_id.into();
        if external_id.is_empty() {
            return Err(ValidationError::EmptyExternalId);
        }

        Ok(Self {
            external_id,
            name: name.into(),
            value,
        })
    }
}

/// One page of the source listing, as it appears on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageResult {
    pub items: Vec<Record>,
    #[serde(default)]
    pub next_page: Option<u32>,
}

/// Sink verdict for a single upsert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpsertStatus {
    Created,
    Updated,
}

/// Reconciliation tallies for one run.
///
/// The three counts always sum to the number of records presented to the
/// reconciler.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncOutcome {
    pub created_count: u64,
    pub updated_count: u64,
    pub failed_count: u64,
}

impl SyncOutcome {
    pub const fn total(&self) -> u64 {
        self.created_count + self.updated_count + self.failed_count
    }

    pub const fn is_clean(&self) -> bool {
        self.failed_count == 0
    }
}

/// Immutable per-invocation correlation context.
///
/// Created once per run and threaded through every operation so log events
/// from one invocation can be tied together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunContext {
    run_id: String,
    base_url: String,
}

impl RunContext {
    /// Build a context with a freshly minted opaque run id.
    pub fn new(base_url: impl Into<String>) -> Result<Self, ValidationError> {
        Self::with_run_id(mint_run_id(), base_url)
    }

    pub fn with_run_id(
        run_id: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        if base_url.is_empty() {
            return Err(ValidationError::EmptyBaseUrl);
        }

        Ok(Self {
            run_id: run_id.into(),
            base_url,
        })
    }

    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

fn mint_run_id() -> String {
    let mut id = uuid::Uuid::new_v4().simple().to_string();
    id.truncate(10);
    id
}
