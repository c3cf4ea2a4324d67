//! Paginated source traversal.

use crate::domain::{PageResult, Record, RunContext};
use crate::error::TransferError;
use crate::executor::RetryExecutor;
use crate::http_client::HttpRequest;
use crate::retry::RetryPolicy;

/// Upper bound on page fetches per run. Guards against a source whose cursor
/// chain never terminates; not a normal termination path.
pub const MAX_PAGES: usize = 100;

/// Walks the source listing page by page, preserving source order.
pub struct PageFetcher<'a> {
    executor: &'a RetryExecutor,
}

impl<'a> PageFetcher<'a> {
    pub const fn new(executor: &'a RetryExecutor) -> Self {
        Self { executor }
    }

    /// Fetch every record the source reports, in the order the source
    /// returns them, following the `next_page` cursor until it is absent.
    ///
    /// A page that exhausts its retry budget aborts the whole fetch; a
    /// partially assembled sequence is never returned. With `limit` set,
    /// fetching stops once the accumulated count reaches it and the result
    /// is truncated to exactly `limit` records.
    pub async fn fetch_all(
        &self,
        ctx: &RunContext,
        page_size: usize,
        limit: Option<usize>,
    ) -> Result<Vec<Record>, TransferError> {
        let mut records = Vec::new();
        let mut page = 1u32;

        for _ in 0..MAX_PAGES {
            let url = format!(
                "{}/source/items?page={page}&limit={page_size}",
                ctx.base_url()
            );
            let request = HttpRequest::get(&url);
            let response = self
                .executor
                .execute(&request, &RetryPolicy::default(), ctx)
                .await?;

            let result: PageResult = serde_json::from_str(&response.body)
                .map_err(|source| TransferError::Codec { url, source })?;
            records.extend(result.items);

            if limit.is_some_and(|limit| records.len() >= limit) {
                break;
            }

            match result.next_page {
                Some(next) => page = next,
                None => break,
            }
        }

        if let Some(limit) = limit {
            records.truncate(limit);
        }

        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::http_client::{HttpClient, HttpResponse, ScriptedHttpClient};

    fn ctx() -> RunContext {
        RunContext::with_run_id("test-run", "http://source.test").expect("context must build")
    }

    fn page_json(range: std::ops::RangeInclusive<usize>, next_page: Option<u32>) -> String {
        let items: Vec<serde_json::Value> = range
            .map(|i| {
                serde_json::json!({
                    "external_id": format!("item-{i}"),
                    "name": format!("Item {i}"),
                    "value": i,
                })
            })
            .collect();
        serde_json::json!({ "items": items, "next_page": next_page }).to_string()
    }

    #[tokio::test]
    async fn follows_the_cursor_and_preserves_source_order() {
        let client = Arc::new(ScriptedHttpClient::new([
            Ok(HttpResponse::ok_json(page_json(1..=10, Some(2)))),
            Ok(HttpResponse::ok_json(page_json(11..=20, Some(3)))),
            Ok(HttpResponse::ok_json(page_json(21..=25, None))),
        ]));
        let executor = RetryExecutor::new(Arc::clone(&client) as Arc<dyn HttpClient>);

        let records = PageFetcher::new(&executor)
            .fetch_all(&ctx(), 10, None)
            .await
            .expect("fetch must succeed");

        assert_eq!(records.len(), 25);
        let ids: Vec<&str> = records.iter().map(|r| r.external_id.as_str()).collect();
        let expected: Vec<String> = (1..=25).map(|i| format!("item-{i}")).collect();
        assert_eq!(ids, expected.iter().map(String::as_str).collect::<Vec<_>>());

        let urls: Vec<String> = client.requests().into_iter().map(|r| r.url).collect();
        assert_eq!(
            urls,
            vec![
                "http://source.test/source/items?page=1&limit=10",
                "http://source.test/source/items?page=2&limit=10",
                "http://source.test/source/items?page=3&limit=10",
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn one_transient_page_failure_does_not_lose_records() {
        let client = Arc::new(ScriptedHttpClient::new([
            Ok(HttpResponse::ok_json(page_json(1..=10, Some(2)))),
            Ok(HttpResponse::new(500, "injected")),
            Ok(HttpResponse::ok_json(page_json(11..=20, Some(3)))),
            Ok(HttpResponse::ok_json(page_json(21..=25, None))),
        ]));
        let executor = RetryExecutor::new(Arc::clone(&client) as Arc<dyn HttpClient>);

        let records = PageFetcher::new(&executor)
            .fetch_all(&ctx(), 10, None)
            .await
            .expect("retry must absorb the transient failure");

        assert_eq!(records.len(), 25);
        assert_eq!(records[10].external_id, "item-11");
        assert_eq!(client.request_count(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn an_exhausted_page_aborts_the_whole_fetch() {
        let mut script = vec![Ok(HttpResponse::ok_json(page_json(1..=10, Some(2))))];
        script.extend((0..6).map(|_| Ok(HttpResponse::new(503, "down"))));
        let client = Arc::new(ScriptedHttpClient::new(script));
        let executor = RetryExecutor::new(Arc::clone(&client) as Arc<dyn HttpClient>);

        let error = PageFetcher::new(&executor)
            .fetch_all(&ctx(), 10, None)
            .await
            .expect_err("page 2 must exhaust its budget");

        assert!(matches!(error, TransferError::RetriesExhausted { .. }));
    }

    #[tokio::test]
    async fn limit_stops_fetching_and_truncates_mid_page() {
        let client = Arc::new(ScriptedHttpClient::new([Ok(HttpResponse::ok_json(
            page_json(1..=10, Some(2)),
        ))]));
        let executor = RetryExecutor::new(Arc::clone(&client) as Arc<dyn HttpClient>);

        let records = PageFetcher::new(&executor)
            .fetch_all(&ctx(), 10, Some(5))
            .await
            .expect("fetch must succeed");

        assert_eq!(records.len(), 5);
        assert_eq!(records.last().map(|r| r.external_id.as_str()), Some("item-5"));
        // Page 2 is never requested once the limit is reached.
        assert_eq!(client.request_count(), 1);
    }

    #[tokio::test]
    async fn page_cap_bounds_a_source_that_never_terminates() {
        let script: Vec<_> = (0..200)
            .map(|i| Ok(HttpResponse::ok_json(page_json(1..=1, Some(i + 2)))))
            .collect();
        let client = Arc::new(ScriptedHttpClient::new(script));
        let executor = RetryExecutor::new(Arc::clone(&client) as Arc<dyn HttpClient>);

        let records = PageFetcher::new(&executor)
            .fetch_all(&ctx(), 1, None)
            .await
            .expect("fetch must stop at the cap");

        assert_eq!(client.request_count(), MAX_PAGES);
        assert_eq!(records.len(), MAX_PAGES);
    }

    #[tokio::test]
    async fn an_undecodable_page_is_fatal() {
        let client = Arc::new(ScriptedHttpClient::new([Ok(HttpResponse::ok_json(
            "not json at all",
        ))]));
        let executor = RetryExecutor::new(Arc::clone(&client) as Arc<dyn HttpClient>);

        let error = PageFetcher::new(&executor)
            .fetch_all(&ctx(), 10, None)
            .await
            .expect_err("garbage must not pass");

        assert!(matches!(error, TransferError::Codec { .. }));
    }
}
