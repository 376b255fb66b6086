//! Duplicate-document detection over word sets.
//!
//! Two documents are duplicates when they contain exactly the same words,
//! regardless of frequencies. The lower-numbered document of each duplicate
//! group survives.

use std::collections::{BTreeMap, BTreeSet};

use tracing::info;

use search_core::{DocId, SearchServer};

/// Removes every document whose word set was already seen under a smaller id.
/// Returns the removed ids in ascending order.
pub fn remove_duplicates(server: &mut SearchServer) -> Vec<DocId> {
    let mut seen: BTreeMap<BTreeSet<String>, DocId> = BTreeMap::new();
    let mut duplicates = Vec::new();
    // Ids iterate ascending, so the first holder of a word set is the lowest.
    for id in server.document_ids().collect::<Vec<_>>() {
        let Ok(frequencies) = server.word_frequencies(id) else {
            continue;
        };
        let words: BTreeSet<String> = frequencies.keys().cloned().collect();
        if seen.contains_key(&words) {
            duplicates.push(id);
        } else {
            seen.insert(words, id);
        }
    }
    for &id in &duplicates {
        info!(id, "found duplicate document");
        server.remove_document(id);
    }
    duplicates
}
