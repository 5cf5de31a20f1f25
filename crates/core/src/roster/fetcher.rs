//! Offset-cursor pagination over the roster collection

use std::sync::Arc;

use rostersync_domain::config::PageTermination;
use rostersync_domain::{AccessToken, ClientRecord, Result};
use tracing::debug;

use super::ports::ClientSource;

/// Walks the source collection page by page.
///
/// The offset advances by `limit` after every non-empty page. Once a page
/// ends the stream the fetcher is exhausted and makes no further calls.
pub struct PaginatedFetcher {
    source: Arc<dyn ClientSource>,
    token: AccessToken,
    limit: u32,
    termination: PageTermination,
    offset: u64,
    calls: u32,
    exhausted: bool,
}

impl PaginatedFetcher {
    pub fn new(source: Arc<dyn ClientSource>, token: AccessToken, limit: u32) -> Self {
        Self {
            source,
            token,
            limit: limit.max(1),
            termination: PageTermination::default(),
            offset: 0,
            calls: 0,
            exhausted: false,
        }
    }

    pub fn with_termination(mut self, termination: PageTermination) -> Self {
        self.termination = termination;
        self
    }

    /// Fetch the next page.
    ///
    /// Returns `Ok(None)` once the stream has ended. Errors from the source
    /// are returned as-is and leave the offset where it was.
    pub async fn next_page(&mut self) -> Result<Option<Vec<ClientRecord>>> {
        if self.exhausted {
            return Ok(None);
        }

        let page = self.source.fetch_page(&self.token, self.limit, self.offset).await?;
        self.calls += 1;
        debug!(offset = self.offset, limit = self.limit, records = page.len(), "fetched page");

        if page.is_empty() {
            self.exhausted = true;
            return Ok(None);
        }

        self.offset += u64::from(self.limit);
        if self.termination == PageTermination::ShortPage && page.len() < self.limit as usize {
            self.exhausted = true;
        }

        Ok(Some(page))
    }

    /// Offset the next request will use
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Number of successful source calls so far
    pub fn calls(&self) -> u32 {
        self.calls
    }

    pub fn token(&self) -> &AccessToken {
        &self.token
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{clients, FakeRoster};

    async fn drain(fetcher: &mut PaginatedFetcher) -> Vec<ClientRecord> {
        let mut all = Vec::new();
        while let Some(page) = fetcher.next_page().await.unwrap() {
            all.extend(page);
        }
        all
    }

    #[tokio::test]
    async fn fetches_ceil_n_over_l_plus_one_pages() {
        for (records, limit) in [(0_i64, 1000_u32), (1, 1000), (2500, 1000), (3000, 1000), (7, 3)] {
            let roster = Arc::new(FakeRoster::new(clients(records)));
            let mut fetcher =
                PaginatedFetcher::new(roster.clone(), AccessToken::new("t"), limit);

            let all = drain(&mut fetcher).await;

            let expected_calls = (records as u64).div_ceil(u64::from(limit)) + 1;
            assert_eq!(all.len() as i64, records);
            assert_eq!(roster.page_calls().len() as u64, expected_calls);
            assert_eq!(u64::from(fetcher.calls()), expected_calls);
        }
    }

    #[tokio::test]
    async fn advances_offset_by_limit() {
        let roster = Arc::new(FakeRoster::new(clients(5)));
        let mut fetcher = PaginatedFetcher::new(roster.clone(), AccessToken::new("t"), 2);

        drain(&mut fetcher).await;

        assert_eq!(roster.page_calls(), vec![(2, 0), (2, 2), (2, 4), (2, 6)]);
        assert_eq!(fetcher.offset(), 6);
    }

    #[tokio::test]
    async fn short_page_termination_skips_trailing_call() {
        let roster = Arc::new(FakeRoster::new(clients(5)));
        let mut fetcher = PaginatedFetcher::new(roster.clone(), AccessToken::new("t"), 2)
            .with_termination(PageTermination::ShortPage);

        let all = drain(&mut fetcher).await;

        assert_eq!(all.len(), 5);
        assert_eq!(roster.page_calls(), vec![(2, 0), (2, 2), (2, 4)]);
    }

    #[tokio::test]
    async fn exhausted_fetcher_makes_no_more_calls() {
        let roster = Arc::new(FakeRoster::new(Vec::new()));
        let mut fetcher = PaginatedFetcher::new(roster.clone(), AccessToken::new("t"), 10);

        assert!(fetcher.next_page().await.unwrap().is_none());
        assert!(fetcher.next_page().await.unwrap().is_none());
        assert_eq!(roster.page_calls().len(), 1);
    }

    #[tokio::test]
    async fn source_error_propagates_without_advancing() {
        let roster = Arc::new(FakeRoster::new(clients(5)).failing_fetch_at(2));
        let mut fetcher = PaginatedFetcher::new(roster.clone(), AccessToken::new("t"), 2);

        assert!(fetcher.next_page().await.unwrap().is_some());
        assert!(fetcher.next_page().await.is_err());
        assert_eq!(fetcher.offset(), 2);
    }

    #[tokio::test]
    async fn sends_token_with_every_call() {
        let roster = Arc::new(FakeRoster::new(clients(3)));
        let mut fetcher = PaginatedFetcher::new(roster.clone(), AccessToken::new("secret"), 2);

        drain(&mut fetcher).await;

        assert!(roster.tokens_seen().iter().all(|token| token == "secret"));
    }
}
