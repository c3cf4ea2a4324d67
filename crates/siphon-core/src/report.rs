//! Dry-run report artifact.

use serde::{Deserialize, Serialize};

use crate::domain::{Record, RunContext, UtcDateTime};

/// Snapshot of what a write run would transfer.
///
/// Built from fetched records only; producing a report performs no sink-side
/// call, so a dry run is guaranteed to write nothing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncReport {
    pub run_id: String,
    pub timestamp: UtcDateTime,
    pub count: usize,
    pub external_ids: Vec<String>,
}

impl SyncReport {
    /// Preview size: the artifact carries at most this many external ids,
    /// keeping it small regardless of the run's size.
    pub const PREVIEW_LIMIT: usize = 20;

    pub fn new(ctx: &RunContext, records: &[Record]) -> Self {
        Self::with_timestamp(ctx, records, UtcDateTime::now())
    }

    pub fn with_timestamp(ctx: &RunContext, records: &[Record], timestamp: UtcDateTime) -> Self {
        Self {
            run_id: ctx.run_id().to_owned(),
            timestamp,
            count: records.len(),
            external_ids: records
                .iter()
                .take(Self::PREVIEW_LIMIT)
                .map(|record| record.external_id.clone())
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> RunContext {
        RunContext::with_run_id("report-run", "http://api.test").expect("context must build")
    }

    fn records(count: usize) -> Vec<Record> {
        (1..=count)
            .map(|i| {
                Record::new(format!("item-{i}"), format!("Item {i}"), i as i64)
                    .expect("seed record must build")
            })
            .collect()
    }

    #[test]
    fn counts_everything_but_previews_at_most_twenty_ids() {
        let report = SyncReport::new(&ctx(), &records(25));

        assert_eq!(report.run_id, "report-run");
        assert_eq!(report.count, 25);
        assert_eq!(report.external_ids.len(), SyncReport::PREVIEW_LIMIT);
        assert_eq!(report.external_ids[0], "item-1");
        assert_eq!(report.external_ids[19], "item-20");
    }

    #[test]
    fn small_runs_preview_every_id() {
        let report = SyncReport::new(&ctx(), &records(3));

        assert_eq!(report.count, 3);
        assert_eq!(report.external_ids, vec!["item-1", "item-2", "item-3"]);
    }

    #[test]
    fn artifact_shape_round_trips_through_json() {
        let timestamp = UtcDateTime::parse("2025-06-01T12:30:00Z").expect("must parse");
        let report = SyncReport::with_timestamp(&ctx(), &records(2), timestamp);

        let json = serde_json::to_value(&report).expect("must serialize");
        assert_eq!(
            json,
            serde_json::json!({
                "run_id": "report-run",
                "timestamp": "2025-06-01T12:30:00Z",
                "count": 2,
                "external_ids": ["item-1", "item-2"],
            })
        );

        let back: SyncReport = serde_json::from_value(json).expect("must deserialize");
        assert_eq!(back, report);
    }
}
