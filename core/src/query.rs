//! Query validation and parsing.
//!
//! A raw query is scanned for syntax errors before tokenization: a doubled
//! minus sign, a minus sign with no word attached, or any control byte all
//! reject the whole query. Valid tokens are split into plus words and minus
//! words (leading `-` stripped), with stop words dropped from both classes.

use std::collections::BTreeSet;

use crate::tokenizer::{is_clean_text, split_into_words};
use crate::SearchError;

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Query {
    pub plus_words: Vec<String>,
    pub minus_words: Vec<String>,
}

/// Parses a query with both word classes sorted and deduplicated. This is the
/// form ranking consumes: word order is irrelevant once scores are summed.
pub fn parse_query(text: &str, stop_words: &BTreeSet<String>) -> Result<Query, SearchError> {
    let mut query = parse_query_raw(text, stop_words)?;
    for words in [&mut query.plus_words, &mut query.minus_words] {
        words.sort_unstable();
        words.dedup();
    }
    Ok(query)
}

/// Parses a query preserving token order and duplicates. Only for consumers
/// that re-sort or deduplicate downstream anyway.
pub fn parse_query_raw(text: &str, stop_words: &BTreeSet<String>) -> Result<Query, SearchError> {
    validate_query_text(text)?;
    let mut query = Query::default();
    for token in split_into_words(text) {
        let (word, is_minus) = match token.strip_prefix('-') {
            Some(rest) => (rest, true),
            None => (token, false),
        };
        if stop_words.contains(word) {
            continue;
        }
        if is_minus {
            query.minus_words.push(word.to_string());
        } else {
            query.plus_words.push(word.to_string());
        }
    }
    Ok(query)
}

fn validate_query_text(text: &str) -> Result<(), SearchError> {
    if !is_clean_text(text) {
        return Err(SearchError::InvalidArgument(
            "query contains control characters".to_string(),
        ));
    }
    let bytes = text.as_bytes();
    for (i, &byte) in bytes.iter().enumerate() {
        if byte != b'-' {
            continue;
        }
        match bytes.get(i + 1) {
            Some(b'-') => {
                return Err(SearchError::InvalidArgument(
                    "two consecutive minus signs in query".to_string(),
                ));
            }
            Some(b' ') | None => {
                return Err(SearchError::InvalidArgument(
                    "minus sign with no word attached".to_string(),
                ));
            }
            _ => {}
        }
    }
    Ok(())
}
