//! The inverted index: forward and reverse term-frequency tables plus
//! per-document metadata.
//!
//! The two tables are exact duals and are mutated together: a (word, doc)
//! pair exists in the forward table iff it exists in the reverse table. The
//! reverse table is what makes removal O(words-in-doc) and lets external
//! tooling compare documents by word set.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use rayon::prelude::*;
use tracing::debug;

use crate::{DocId, DocumentStatus, SearchError};

/// Per-document metadata recorded at ingestion.
#[derive(Debug, Clone, Copy)]
pub(crate) struct DocumentData {
    pub rating: i32,
    pub status: DocumentStatus,
}

#[derive(Debug, Default)]
pub struct InvertedIndex {
    /// word -> (document id -> term frequency)
    word_to_docs: HashMap<String, BTreeMap<DocId, f64>>,
    /// document id -> (word -> term frequency), the dual of `word_to_docs`
    doc_to_words: HashMap<DocId, BTreeMap<String, f64>>,
    documents: HashMap<DocId, DocumentData>,
    ids: BTreeSet<DocId>,
}

impl InvertedIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a document given its already tokenized, stop-word-free words.
    ///
    /// Validation happens before any mutation, so a failed call leaves the
    /// index untouched. A document whose word list is empty is still
    /// registered, with an empty reverse-table entry.
    pub(crate) fn add_document(
        &mut self,
        id: DocId,
        words: &[&str],
        status: DocumentStatus,
        ratings: &[i32],
    ) -> Result<(), SearchError> {
        if id < 0 {
            return Err(SearchError::InvalidArgument(format!(
                "document id {id} is negative"
            )));
        }
        if self.documents.contains_key(&id) {
            return Err(SearchError::InvalidArgument(format!(
                "document id {id} is already in the index"
            )));
        }

        let term_freq = 1.0 / words.len() as f64;
        let reverse = self.doc_to_words.entry(id).or_default();
        for &word in words {
            *reverse.entry(word.to_string()).or_insert(0.0) += term_freq;
            *self
                .word_to_docs
                .entry(word.to_string())
                .or_default()
                .entry(id)
                .or_insert(0.0) += term_freq;
        }
        self.documents.insert(
            id,
            DocumentData {
                rating: average_rating(ratings),
                status,
            },
        );
        self.ids.insert(id);
        debug!(id, word_count = words.len(), "document added");
        Ok(())
    }

    /// Removes a document and every forward-table posting that references it.
    /// Silently does nothing if the id is absent.
    pub fn remove_document(&mut self, id: DocId) {
        if self.documents.remove(&id).is_none() {
            return;
        }
        self.ids.remove(&id);
        if let Some(words) = self.doc_to_words.remove(&id) {
            for word in words.keys() {
                if let Some(postings) = self.word_to_docs.get_mut(word) {
                    postings.remove(&id);
                    if postings.is_empty() {
                        self.word_to_docs.remove(word);
                    }
                }
            }
        }
        debug!(id, "document removed");
    }

    /// Like [`InvertedIndex::remove_document`], but fans the per-word posting
    /// erases out across rayon workers. Each word owns a disjoint posting
    /// list, so the lists are detached first and the erases run in parallel.
    ///
    /// Precondition (not enforced): the index must not be concurrently read
    /// or written while a removal is in progress.
    pub fn remove_document_parallel(&mut self, id: DocId) {
        if self.documents.remove(&id).is_none() {
            return;
        }
        self.ids.remove(&id);
        let Some(words) = self.doc_to_words.remove(&id) else {
            return;
        };
        let mut detached: Vec<(String, BTreeMap<DocId, f64>)> = words
            .keys()
            .filter_map(|word| self.word_to_docs.remove_entry(word))
            .collect();
        detached.par_iter_mut().for_each(|(_, postings)| {
            postings.remove(&id);
        });
        for (word, postings) in detached {
            if !postings.is_empty() {
                self.word_to_docs.insert(word, postings);
            }
        }
        debug!(id, "document removed (parallel)");
    }

    /// The word -> term-frequency mapping of one document.
    pub fn word_frequencies(&self, id: DocId) -> Result<&BTreeMap<String, f64>, SearchError> {
        self.doc_to_words
            .get(&id)
            .ok_or(SearchError::DocumentNotFound(id))
    }

    /// Forward-table entry for a word, if any document contains it.
    pub fn postings(&self, word: &str) -> Option<&BTreeMap<DocId, f64>> {
        self.word_to_docs.get(word)
    }

    pub(crate) fn document_data(&self, id: DocId) -> Option<&DocumentData> {
        self.documents.get(&id)
    }

    pub fn contains(&self, id: DocId) -> bool {
        self.documents.contains_key(&id)
    }

    pub fn document_count(&self) -> usize {
        self.documents.len()
    }

    /// Document ids in ascending order.
    pub fn ids(&self) -> impl Iterator<Item = DocId> + '_ {
        self.ids.iter().copied()
    }
}

/// Truncating integer average of the ratings; an empty list averages to 0.
pub(crate) fn average_rating(ratings: &[i32]) -> i32 {
    if ratings.is_empty() {
        return 0;
    }
    ratings.iter().sum::<i32>() / ratings.len() as i32
}
