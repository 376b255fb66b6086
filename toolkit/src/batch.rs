//! Batch query dispatch: apply the default search to many queries at once,
//! fanning out over the rayon pool while preserving query order.

use rayon::prelude::*;

use search_core::{Document, SearchError, SearchServer};

/// Runs the default search for every query. Results come back in query
/// order; the first failing query fails the whole batch.
pub fn process_queries(
    server: &SearchServer,
    queries: &[String],
) -> Result<Vec<Vec<Document>>, SearchError> {
    queries
        .par_iter()
        .map(|query| server.find_top_documents(query))
        .collect()
}

/// Like [`process_queries`], flattening all results into one sequence.
pub fn process_queries_joined(
    server: &SearchServer,
    queries: &[String],
) -> Result<Vec<Document>, SearchError> {
    Ok(process_queries(server, queries)?
        .into_iter()
        .flatten()
        .collect())
}
