//! Bidirectional paging over a forward-only cursor.
//!
//! DynamoDB only answers "the page after this key". [`Pager`] keeps every page
//! it has seen so moving backward, and forward again over pages already
//! visited, never touches the network.
//!
//! The pager does not perform requests itself. [`Pager::first`] and
//! [`Pager::next`] hand out a [`PageFetch`] describing the request to run and
//! [`Pager::complete`] applies its outcome, so the fetch can run on another
//! task while the pager stays owned by the UI loop. [`Pager::load_first`] and
//! [`Pager::load_next`] chain the two steps for callers that can simply await.

use crate::dynamodb::client::{Backend, PageRequest, QueryResult, RetrievalClient};
use crate::dynamodb::value::{Item, Record};
use crate::error::Error;

/// One fetched page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageState {
    pub records: Vec<Record>,
    /// Token that produces the following page; `None` on the last page.
    pub last_evaluated_key: Option<Item>,
}

impl From<QueryResult> for PageState {
    fn from(result: QueryResult) -> Self {
        Self {
            records: result.records,
            last_evaluated_key: result.last_evaluated_key,
        }
    }
}

impl PageState {
    pub fn has_more(&self) -> bool {
        self.last_evaluated_key.is_some()
    }
}

/// A request the pager wants performed.
#[derive(Debug, Clone, PartialEq)]
pub struct PageFetch {
    pub generation: u64,
    /// 1-based number of the page this fetch produces.
    pub page: usize,
    pub request: PageRequest,
    pub start_key: Option<Item>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Advance {
    /// The next page was already held; the pager moved onto it.
    Cached,
    /// The next page has to be fetched.
    Fetch(PageFetch),
    /// The current page is the last one.
    End,
    /// A fetch is already outstanding.
    InFlight,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Completion {
    Applied,
    Failed(Error),
    /// The fetch was superseded or abandoned; its result was dropped.
    Stale,
}

#[derive(Debug, Default)]
pub struct Pager {
    history: Vec<PageState>,
    current: usize,
    request: Option<PageRequest>,
    generation: u64,
    in_flight: Option<usize>,
}

impl Pager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a new history for `request` and returns the fetch for page 1.
    /// Any fetch issued before becomes stale.
    pub fn first(&mut self, request: PageRequest) -> PageFetch {
        self.generation += 1;
        self.history.clear();
        self.current = 0;
        self.request = Some(request.clone());
        self.in_flight = Some(1);
        tracing::debug!(
            generation = self.generation,
            table = %request.table_name(),
            kind = request.label(),
            "pager_first"
        );
        PageFetch {
            generation: self.generation,
            page: 1,
            request,
            start_key: None,
        }
    }

    pub fn next(&mut self) -> Advance {
        if self.in_flight.is_some() {
            return Advance::InFlight;
        }
        if self.current < self.history.len() {
            self.current += 1;
            return Advance::Cached;
        }
        let (Some(page), Some(request)) = (self.current_page(), self.request.as_ref()) else {
            return Advance::End;
        };
        let Some(start_key) = page.last_evaluated_key.clone() else {
            return Advance::End;
        };
        let fetch = PageFetch {
            generation: self.generation,
            page: self.current + 1,
            request: request.clone(),
            start_key: Some(start_key),
        };
        self.in_flight = Some(fetch.page);
        Advance::Fetch(fetch)
    }

    /// Moves back one page. An outstanding fetch is abandoned.
    pub fn previous(&mut self) -> Option<&PageState> {
        if self.current <= 1 {
            return None;
        }
        self.abandon();
        self.current -= 1;
        self.history.get(self.current - 1)
    }

    /// Drops interest in the outstanding fetch, if any.
    pub fn abandon(&mut self) {
        if let Some(page) = self.in_flight.take() {
            self.generation += 1;
            tracing::debug!(generation = self.generation, page, "pager_abandon");
        }
    }

    pub fn complete(
        &mut self,
        fetch: &PageFetch,
        result: Result<QueryResult, Error>,
    ) -> Completion {
        let expected = fetch.generation == self.generation
            && self.in_flight == Some(fetch.page)
            && fetch.page == self.history.len() + 1
            && self.current + 1 == fetch.page;
        if !expected {
            tracing::debug!(
                generation = fetch.generation,
                page = fetch.page,
                "pager_stale_result"
            );
            return Completion::Stale;
        }
        self.in_flight = None;
        match result {
            Ok(result) => {
                self.history.push(PageState::from(result));
                self.current = fetch.page;
                Completion::Applied
            }
            Err(err) => Completion::Failed(err),
        }
    }

    pub fn current_page(&self) -> Option<&PageState> {
        self.current
            .checked_sub(1)
            .and_then(|index| self.history.get(index))
    }

    /// 1-based; 0 until the first page arrives.
    pub fn page_number(&self) -> usize {
        self.current
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    pub fn request(&self) -> Option<&PageRequest> {
        self.request.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn has_next(&self) -> bool {
        self.current < self.history.len()
            || self.current_page().is_some_and(PageState::has_more)
    }

    pub fn has_previous(&self) -> bool {
        self.current > 1
    }

    pub async fn load_first<B: Backend>(
        &mut self,
        client: &RetrievalClient<B>,
        request: PageRequest,
    ) -> Result<Option<&PageState>, Error> {
        let fetch = self.first(request);
        self.run(client, fetch).await
    }

    /// Returns `None` once there are no further pages.
    pub async fn load_next<B: Backend>(
        &mut self,
        client: &RetrievalClient<B>,
    ) -> Result<Option<&PageState>, Error> {
        match self.next() {
            Advance::Cached => Ok(self.current_page()),
            Advance::End | Advance::InFlight => Ok(None),
            Advance::Fetch(fetch) => self.run(client, fetch).await,
        }
    }

    async fn run<B: Backend>(
        &mut self,
        client: &RetrievalClient<B>,
        fetch: PageFetch,
    ) -> Result<Option<&PageState>, Error> {
        let result = client.fetch(&fetch.request, fetch.start_key.clone()).await;
        match self.complete(&fetch, result) {
            Completion::Applied => Ok(self.current_page()),
            Completion::Failed(err) => Err(err),
            Completion::Stale => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dynamodb::client::testing::{FakeBackend, item, numbered_pages};

    fn scan() -> PageRequest {
        PageRequest::Scan {
            table: "events".to_string(),
        }
    }

    fn ids(page: &PageState) -> Vec<String> {
        page.records
            .iter()
            .filter_map(|record| record.display("id").map(str::to_string))
            .collect()
    }

    #[tokio::test]
    async fn backward_then_forward_replays_without_fetching() {
        let client = RetrievalClient::new(FakeBackend::with_pages(numbered_pages(4, 3)));
        let mut pager = Pager::new();

        let mut seen = vec![ids(pager.load_first(&client, scan()).await.unwrap().unwrap())];
        while let Some(page) = pager.load_next(&client).await.unwrap() {
            seen.push(ids(page));
        }
        assert_eq!(seen.len(), 4);
        assert_eq!(client.backend().reads(), 4);

        let mut backward = Vec::new();
        while let Some(page) = pager.previous() {
            backward.push(ids(page));
        }
        assert_eq!(backward, vec![seen[2].clone(), seen[1].clone(), seen[0].clone()]);
        assert_eq!(pager.page_number(), 1);

        let mut replay = vec![ids(pager.current_page().unwrap())];
        for _ in 0..3 {
            assert_eq!(pager.next(), Advance::Cached);
            replay.push(ids(pager.current_page().unwrap()));
        }
        assert_eq!(replay, seen);
        assert_eq!(client.backend().reads(), 4);
    }

    #[tokio::test]
    async fn last_page_is_terminal() {
        let client = RetrievalClient::new(FakeBackend::with_pages(numbered_pages(2, 2)));
        let mut pager = Pager::new();
        pager.load_first(&client, scan()).await.unwrap();
        pager.load_next(&client).await.unwrap();
        assert!(!pager.has_next());

        for _ in 0..3 {
            assert_eq!(pager.next(), Advance::End);
            assert_eq!(pager.history_len(), 2);
            assert_eq!(pager.page_number(), 2);
        }
        assert_eq!(client.backend().reads(), 2);
    }

    #[tokio::test]
    async fn empty_page_with_token_is_not_the_end() {
        let pages = vec![vec![item(&[("id", "a")])], Vec::new(), vec![item(&[("id", "b")])]];
        let client = RetrievalClient::new(FakeBackend::with_pages(pages));
        let mut pager = Pager::new();
        pager.load_first(&client, scan()).await.unwrap();

        let empty = pager.load_next(&client).await.unwrap().unwrap();
        assert!(empty.records.is_empty());
        assert!(empty.has_more());

        let last = pager.load_next(&client).await.unwrap().unwrap();
        assert_eq!(ids(last), vec!["b"]);
        assert!(!last.has_more());
    }

    #[test]
    fn previous_on_first_page_is_none() {
        let mut pager = Pager::new();
        assert!(pager.previous().is_none());
        let fetch = pager.first(scan());
        pager.complete(&fetch, Ok(QueryResult::default()));
        assert!(pager.previous().is_none());
        assert_eq!(pager.page_number(), 1);
    }

    #[test]
    fn superseded_first_page_is_stale() {
        let mut pager = Pager::new();
        let old = pager.first(scan());
        let new = pager.first(scan());
        assert_eq!(pager.complete(&old, Ok(QueryResult::default())), Completion::Stale);
        assert_eq!(pager.page_number(), 0);
        assert_eq!(pager.complete(&new, Ok(QueryResult::default())), Completion::Applied);
        assert_eq!(pager.page_number(), 1);
    }

    #[test]
    fn second_next_while_fetching_is_refused() {
        let mut pager = Pager::new();
        let fetch = pager.first(scan());
        assert_eq!(pager.next(), Advance::InFlight);
        let page = QueryResult {
            records: Vec::new(),
            last_evaluated_key: Some(item(&[("id", "x")])),
        };
        pager.complete(&fetch, Ok(page));

        assert!(matches!(pager.next(), Advance::Fetch(_)));
        assert_eq!(pager.next(), Advance::InFlight);
    }

    #[tokio::test]
    async fn moving_back_abandons_the_outstanding_fetch() {
        let client = RetrievalClient::new(FakeBackend::with_pages(numbered_pages(3, 1)));
        let mut pager = Pager::new();
        pager.load_first(&client, scan()).await.unwrap();
        pager.load_next(&client).await.unwrap();

        let Advance::Fetch(fetch) = pager.next() else {
            panic!("expected a fetch for page 3");
        };
        assert_eq!(fetch.page, 3);
        assert!(pager.previous().is_some());
        let result = client.fetch(&fetch.request, fetch.start_key.clone()).await;
        assert_eq!(pager.complete(&fetch, result), Completion::Stale);
        assert_eq!(pager.history_len(), 2);
        assert_eq!(pager.page_number(), 1);

        assert_eq!(pager.next(), Advance::Cached);
        assert!(matches!(pager.next(), Advance::Fetch(_)));
    }

    #[test]
    fn failed_fetch_keeps_history() {
        let mut pager = Pager::new();
        let fetch = pager.first(scan());
        let err = Error::Backend(crate::error::BackendError::new("Scan", "throttled"));
        assert!(matches!(
            pager.complete(&fetch, Err(err)),
            Completion::Failed(_)
        ));
        assert!(!pager.is_loading());
        assert!(pager.current_page().is_none());
    }
}
