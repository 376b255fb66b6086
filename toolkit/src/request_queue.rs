//! A request-history wrapper that tracks how many recent queries came back
//! empty over a trailing window of requests.

use std::collections::VecDeque;

use search_core::{DocId, Document, DocumentStatus, SearchError, SearchServer};

pub struct RequestQueue<'a> {
    server: &'a SearchServer,
    /// Result counts of the most recent requests, oldest first.
    requests: VecDeque<usize>,
    no_result_requests: usize,
}

impl<'a> RequestQueue<'a> {
    /// Window length: one request per minute over a day.
    pub const WINDOW: usize = 1440;

    pub fn new(server: &'a SearchServer) -> Self {
        Self {
            server,
            requests: VecDeque::new(),
            no_result_requests: 0,
        }
    }

    /// Runs the default search and records its result count. A query that
    /// fails to parse propagates the error and is not recorded.
    pub fn add_find_request(&mut self, raw_query: &str) -> Result<Vec<Document>, SearchError> {
        let results = self.server.find_top_documents(raw_query)?;
        self.record(results.len());
        Ok(results)
    }

    pub fn add_find_request_with_status(
        &mut self,
        raw_query: &str,
        status: DocumentStatus,
    ) -> Result<Vec<Document>, SearchError> {
        let results = self.server.find_top_documents_with_status(raw_query, status)?;
        self.record(results.len());
        Ok(results)
    }

    pub fn add_find_request_with<P>(
        &mut self,
        raw_query: &str,
        predicate: P,
    ) -> Result<Vec<Document>, SearchError>
    where
        P: Fn(DocId, DocumentStatus, i32) -> bool + Sync,
    {
        let results = self.server.find_top_documents_with(
            search_core::ExecutionPolicy::Sequential,
            raw_query,
            predicate,
        )?;
        self.record(results.len());
        Ok(results)
    }

    /// How many requests in the current window returned no documents.
    pub fn no_result_requests(&self) -> usize {
        self.no_result_requests
    }

    fn record(&mut self, result_count: usize) {
        if result_count == 0 {
            self.no_result_requests += 1;
        }
        self.requests.push_back(result_count);
        if self.requests.len() > Self::WINDOW {
            if self.requests.pop_front() == Some(0) {
                self.no_result_requests -= 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corpus() -> SearchServer {
        let mut server = SearchServer::new(Vec::<String>::new()).unwrap();
        server
            .add_document(0, "curly dog", DocumentStatus::Actual, &[1])
            .unwrap();
        server
    }

    #[test]
    fn counts_empty_results() {
        let server = corpus();
        let mut queue = RequestQueue::new(&server);
        assert!(queue.add_find_request("dog").unwrap().len() == 1);
        assert!(queue.add_find_request("sparrow").unwrap().is_empty());
        assert!(queue.add_find_request("walrus").unwrap().is_empty());
        assert_eq!(queue.no_result_requests(), 2);
    }

    #[test]
    fn old_requests_fall_out_of_the_window() {
        let server = corpus();
        let mut queue = RequestQueue::new(&server);
        for _ in 0..RequestQueue::WINDOW {
            queue.add_find_request("sparrow").unwrap();
        }
        assert_eq!(queue.no_result_requests(), RequestQueue::WINDOW);
        // Each hit pushes one empty request out of the window.
        for expected in (0..RequestQueue::WINDOW).rev().take(3) {
            queue.add_find_request("dog").unwrap();
            assert_eq!(queue.no_result_requests(), expected);
        }
    }

    #[test]
    fn parse_errors_are_not_recorded() {
        let server = corpus();
        let mut queue = RequestQueue::new(&server);
        assert!(queue.add_find_request("dog --cat").is_err());
        assert_eq!(queue.no_result_requests(), 0);
    }
}
