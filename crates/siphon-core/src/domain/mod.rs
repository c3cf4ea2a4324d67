//! Domain types for the transfer engine.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Record`] | The unit being moved, keyed by `external_id` |
//! | [`PageResult`] | One page of the source listing |
//! | [`UpsertStatus`] | Sink verdict for a single write |
//! | [`SyncOutcome`] | Per-run reconciliation tallies |
//! | [`RunContext`] | Per-invocation correlation context |
//! | [`UtcDateTime`] | UTC-pinned RFC3339 timestamp |

mod models;
mod timestamp;

pub use models::{PageResult, Record, RunContext, SyncOutcome, UpsertStatus};
pub use timestamp::UtcDateTime;
