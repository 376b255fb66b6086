//! The search server: stop words, the inverted index, and TF-IDF ranking.
//!
//! Ranking runs in two strictly ordered phases. Accumulation walks the plus
//! words and adds `tf * idf` to each matching document's score, honoring the
//! caller's predicate. Exclusion then removes every document containing a
//! minus word, without re-applying the predicate: exclusion always wins, even
//! for documents the predicate would have rejected. Under the parallel policy
//! the phase boundary is a hard join barrier; interleaving the phases would
//! let an erase race an increment for the same document.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

use rayon::prelude::*;

use crate::concurrent_map::ConcurrentMap;
use crate::index::InvertedIndex;
use crate::query::{parse_query, parse_query_raw, Query};
use crate::tokenizer::{is_clean_text, split_into_words};
use crate::{DocId, Document, DocumentStatus, SearchError};

/// Execution strategy for ranking, matching and removal. Both strategies are
/// synchronous and return only when the operation has fully completed; the
/// parallel one fans work out over the rayon pool with a join barrier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionPolicy {
    Sequential,
    Parallel,
}

pub struct SearchServer {
    stop_words: BTreeSet<String>,
    index: InvertedIndex,
}

impl SearchServer {
    /// Two scores closer than this are a tie, broken by rating.
    pub const SCORE_EPSILON: f64 = 1e-6;
    /// Ranked results are truncated to this many documents.
    pub const MAX_RESULT_COUNT: usize = 5;
    const ACCUMULATOR_SHARDS: usize = 100;

    /// Builds a server with the given stop words. Duplicates and empty
    /// entries collapse; a stop word with control characters rejects the
    /// whole set.
    pub fn new<I, S>(stop_words: I) -> Result<Self, SearchError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut words = BTreeSet::new();
        for word in stop_words {
            let word = word.as_ref();
            if !is_clean_text(word) {
                return Err(SearchError::InvalidArgument(
                    "stop word contains control characters".to_string(),
                ));
            }
            if !word.is_empty() {
                words.insert(word.to_string());
            }
        }
        Ok(Self {
            stop_words: words,
            index: InvertedIndex::new(),
        })
    }

    /// Convenience constructor taking one whitespace-separated string.
    pub fn from_stop_words_text(text: &str) -> Result<Self, SearchError> {
        Self::new(split_into_words(text))
    }

    /// Tokenizes `text` (minus stop words) and inserts it into the index.
    /// Fails without mutating anything on a negative or duplicate id, or on
    /// control characters in the text.
    pub fn add_document(
        &mut self,
        id: DocId,
        text: &str,
        status: DocumentStatus,
        ratings: &[i32],
    ) -> Result<(), SearchError> {
        if !is_clean_text(text) {
            return Err(SearchError::InvalidArgument(
                "document text contains control characters".to_string(),
            ));
        }
        let words: Vec<&str> = split_into_words(text)
            .into_iter()
            .filter(|word| !self.stop_words.contains(*word))
            .collect();
        self.index.add_document(id, &words, status, ratings)
    }

    /// Top documents for a query among those with `Actual` status.
    pub fn find_top_documents(&self, raw_query: &str) -> Result<Vec<Document>, SearchError> {
        self.find_top_documents_with_status(raw_query, DocumentStatus::Actual)
    }

    /// Top documents for a query among those with the given status.
    pub fn find_top_documents_with_status(
        &self,
        raw_query: &str,
        status: DocumentStatus,
    ) -> Result<Vec<Document>, SearchError> {
        self.find_top_documents_with(
            ExecutionPolicy::Sequential,
            raw_query,
            move |_, document_status, _| document_status == status,
        )
    }

    /// Top documents for a query among those accepted by `predicate`, ranked
    /// by TF-IDF descending with rating as the tie-breaker, truncated to
    /// [`SearchServer::MAX_RESULT_COUNT`].
    pub fn find_top_documents_with<P>(
        &self,
        policy: ExecutionPolicy,
        raw_query: &str,
        predicate: P,
    ) -> Result<Vec<Document>, SearchError>
    where
        P: Fn(DocId, DocumentStatus, i32) -> bool + Sync,
    {
        let query = parse_query(raw_query, &self.stop_words)?;
        let mut matched = match policy {
            ExecutionPolicy::Sequential => self.find_all_documents(&query, &predicate),
            ExecutionPolicy::Parallel => self.find_all_documents_parallel(&query, &predicate),
        };
        matched.sort_by(|lhs, rhs| {
            if (lhs.relevance - rhs.relevance).abs() < Self::SCORE_EPSILON {
                rhs.rating.cmp(&lhs.rating)
            } else {
                rhs.relevance
                    .partial_cmp(&lhs.relevance)
                    .unwrap_or(Ordering::Equal)
            }
        });
        matched.truncate(Self::MAX_RESULT_COUNT);
        Ok(matched)
    }

    /// Which plus words of the query appear in the given document. Any minus
    /// word hit empties the match list. The document's status is returned
    /// either way; an unknown id is an error.
    pub fn match_document(
        &self,
        raw_query: &str,
        id: DocId,
    ) -> Result<(Vec<String>, DocumentStatus), SearchError> {
        self.match_document_with(ExecutionPolicy::Sequential, raw_query, id)
    }

    pub fn match_document_with(
        &self,
        policy: ExecutionPolicy,
        raw_query: &str,
        id: DocId,
    ) -> Result<(Vec<String>, DocumentStatus), SearchError> {
        let status = self
            .index
            .document_data(id)
            .map(|data| data.status)
            .ok_or(SearchError::DocumentNotFound(id))?;
        match policy {
            ExecutionPolicy::Sequential => {
                let query = parse_query(raw_query, &self.stop_words)?;
                for word in &query.minus_words {
                    if self.word_occurs_in(word, id) {
                        return Ok((Vec::new(), status));
                    }
                }
                let matched = query
                    .plus_words
                    .iter()
                    .filter(|word| self.word_occurs_in(word.as_str(), id))
                    .cloned()
                    .collect();
                Ok((matched, status))
            }
            ExecutionPolicy::Parallel => {
                // The raw parse skips the sort; the surviving plus words are
                // sorted and deduplicated after the parallel filter instead.
                let query = parse_query_raw(raw_query, &self.stop_words)?;
                let excluded = query
                    .minus_words
                    .par_iter()
                    .any(|word| self.word_occurs_in(word, id));
                if excluded {
                    return Ok((Vec::new(), status));
                }
                let mut matched: Vec<String> = query
                    .plus_words
                    .into_par_iter()
                    .filter(|word| self.word_occurs_in(word, id))
                    .collect();
                matched.sort_unstable();
                matched.dedup();
                Ok((matched, status))
            }
        }
    }

    /// Removes a document; silently does nothing for an unknown id.
    pub fn remove_document(&mut self, id: DocId) {
        self.remove_document_with(ExecutionPolicy::Sequential, id);
    }

    /// Policy-parameterized removal. The parallel strategy fans out over the
    /// words of the document; it must not run concurrently with any other
    /// operation on this server.
    pub fn remove_document_with(&mut self, policy: ExecutionPolicy, id: DocId) {
        match policy {
            ExecutionPolicy::Sequential => self.index.remove_document(id),
            ExecutionPolicy::Parallel => self.index.remove_document_parallel(id),
        }
    }

    /// The word -> term-frequency mapping of one document.
    pub fn word_frequencies(&self, id: DocId) -> Result<&BTreeMap<String, f64>, SearchError> {
        self.index.word_frequencies(id)
    }

    pub fn document_count(&self) -> usize {
        self.index.document_count()
    }

    /// Document ids in ascending order.
    pub fn document_ids(&self) -> impl Iterator<Item = DocId> + '_ {
        self.index.ids()
    }

    fn word_occurs_in(&self, word: &str, id: DocId) -> bool {
        self.index
            .postings(word)
            .is_some_and(|postings| postings.contains_key(&id))
    }

    fn inverse_document_freq(&self, containing_docs: usize) -> f64 {
        (self.index.document_count() as f64 / containing_docs as f64).ln()
    }

    fn find_all_documents<P>(&self, query: &Query, predicate: &P) -> Vec<Document>
    where
        P: Fn(DocId, DocumentStatus, i32) -> bool,
    {
        let mut scores: BTreeMap<DocId, f64> = BTreeMap::new();
        for word in &query.plus_words {
            let Some(postings) = self.index.postings(word) else {
                continue;
            };
            let idf = self.inverse_document_freq(postings.len());
            for (&id, &term_freq) in postings {
                if let Some(data) = self.index.document_data(id) {
                    if predicate(id, data.status, data.rating) {
                        *scores.entry(id).or_insert(0.0) += term_freq * idf;
                    }
                }
            }
        }
        for word in &query.minus_words {
            if let Some(postings) = self.index.postings(word) {
                for id in postings.keys() {
                    scores.remove(id);
                }
            }
        }
        self.collect_documents(scores)
    }

    fn find_all_documents_parallel<P>(&self, query: &Query, predicate: &P) -> Vec<Document>
    where
        P: Fn(DocId, DocumentStatus, i32) -> bool + Sync,
    {
        let scores: ConcurrentMap<DocId, f64> = ConcurrentMap::new(Self::ACCUMULATOR_SHARDS);
        query.plus_words.par_iter().for_each(|word| {
            let Some(postings) = self.index.postings(word) else {
                return;
            };
            let idf = self.inverse_document_freq(postings.len());
            for (&id, &term_freq) in postings {
                if let Some(data) = self.index.document_data(id) {
                    if predicate(id, data.status, data.rating) {
                        scores.increment(id, term_freq * idf);
                    }
                }
            }
        });
        // Accumulation has fully joined before any erase starts.
        query.minus_words.par_iter().for_each(|word| {
            if let Some(postings) = self.index.postings(word) {
                for id in postings.keys() {
                    scores.erase(id);
                }
            }
        });
        self.collect_documents(scores.snapshot())
    }

    fn collect_documents(&self, scores: BTreeMap<DocId, f64>) -> Vec<Document> {
        scores
            .into_iter()
            .filter_map(|(id, relevance)| {
                self.index.document_data(id).map(|data| Document {
                    id,
                    relevance,
                    rating: data.rating,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stop_word_constructor_rejects_control_characters() {
        assert!(SearchServer::new(["in", "th\u{2}e"]).is_err());
    }

    #[test]
    fn stop_words_from_text_and_from_iterator_agree() {
        let mut from_text = SearchServer::from_stop_words_text("in the the at").unwrap();
        let mut from_iter = SearchServer::new(["at", "in", "the"]).unwrap();
        for server in [&mut from_text, &mut from_iter] {
            server
                .add_document(0, "the cat in the hat", DocumentStatus::Actual, &[1])
                .unwrap();
        }
        assert_eq!(
            from_text.word_frequencies(0).unwrap(),
            from_iter.word_frequencies(0).unwrap()
        );
    }

    #[test]
    fn add_document_validates_text_before_mutating() {
        let mut server = SearchServer::new(Vec::<String>::new()).unwrap();
        assert!(server
            .add_document(0, "bad\u{7}text", DocumentStatus::Actual, &[])
            .is_err());
        assert_eq!(server.document_count(), 0);
    }
}
