//! Identifier tokenizer: splits an arbitrary identifier into an ordered list of
//! stemmed lowercase terms.

use blockcut_core::FxHashMap;
use rust_stemmers::{Algorithm, Stemmer};
use std::cell::RefCell;

/// Splits identifiers into normalized term sequences and memoizes the result
/// for the lifetime of one clustering run. The cache dies with the `Tokenizer`;
/// nothing here is process-global.
pub struct Tokenizer {
    stemmer: Stemmer,
    stop_words: Vec<String>,
    cache: RefCell<FxHashMap<String, Vec<String>>>,
}

impl Tokenizer {
    /// A tokenizer using the workspace's default English stop-word set.
    pub fn new() -> Self {
        Self::with_stop_words(
            blockcut_core::constants::DEFAULT_STOP_WORDS
                .iter()
                .map(|s| s.to_string())
                .collect(),
        )
    }

    /// A tokenizer with an empty stop-word set: nothing is filtered after stemming.
    pub fn without_stop_words() -> Self {
        Self::with_stop_words(Vec::new())
    }

    pub fn with_stop_words(stop_words: Vec<String>) -> Self {
        Self {
            stemmer: Stemmer::create(Algorithm::English),
            stop_words,
            cache: RefCell::new(FxHashMap::default()),
        }
    }

    /// Split `identifier` into stemmed lowercase terms, left-to-right, memoized.
    pub fn termize(&self, identifier: &str) -> Vec<String> {
        if let Some(hit) = self.cache.borrow().get(identifier) {
            return hit.clone();
        }
        let terms = self.termize_uncached(identifier);
        self.cache
            .borrow_mut()
            .insert(identifier.to_string(), terms.clone());
        terms
    }

    /// The normalized name of a doc: its terms joined by underscore.
    pub fn normalize_name(&self, identifier: &str) -> String {
        self.termize(identifier).join("_")
    }

    fn termize_uncached(&self, identifier: &str) -> Vec<String> {
        let mut terms = Vec::new();
        for space_fragment in identifier.split(' ') {
            for fragment in space_fragment.split('_') {
                if fragment.is_empty() {
                    continue;
                }
                for sub in split_camel_and_digits(fragment) {
                    if sub.is_empty() {
                        continue;
                    }
                    let stemmed = self.stemmer.stem(&sub.to_lowercase()).into_owned();
                    if self.stop_words.iter().any(|sw| sw == &stemmed) {
                        continue;
                    }
                    terms.push(stemmed);
                }
            }
        }
        terms
    }
}

impl Default for Tokenizer {
    fn default() -> Self {
        Self::new()
    }
}

/// Splits `fragment` into camel-case subfragments, coalescing consecutive
/// single-character subfragments into one term (recovering acronyms such as
/// `parseHTTPResponse` -> "parse", "HTTP", "Response").
fn split_camel_and_digits(fragment: &str) -> Vec<String> {
    if fragment.chars().all(|c| !c.is_alphabetic() || c.is_uppercase()) {
        return vec![fragment.to_lowercase()];
    }

    let chars: Vec<char> = fragment.chars().collect();
    let mut raw_subfragments: Vec<String> = Vec::new();
    let mut current = String::new();
    for (i, &c) in chars.iter().enumerate() {
        let is_boundary = i > 0 && (c.is_uppercase() || c.is_ascii_digit());
        if is_boundary && !current.is_empty() {
            raw_subfragments.push(std::mem::take(&mut current));
        }
        current.push(c);
    }
    if !current.is_empty() {
        raw_subfragments.push(current);
    }

    let mut coalesced: Vec<String> = Vec::new();
    let mut pending_singles = String::new();
    for sub in raw_subfragments {
        if sub.chars().count() == 1 {
            pending_singles.push_str(&sub);
        } else {
            if !pending_singles.is_empty() {
                coalesced.push(std::mem::take(&mut pending_singles));
            }
            coalesced.push(sub);
        }
    }
    if !pending_singles.is_empty() {
        coalesced.push(pending_singles);
    }

    coalesced
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_http_response_acronym_coalescing() {
        let tok = Tokenizer::without_stop_words();
        let terms = tok.termize("parseHTTPResponse");
        assert_eq!(terms, vec!["pars", "http", "respons"]);
    }

    #[test]
    fn get_user_name_empty_stop_words() {
        let tok = Tokenizer::without_stop_words();
        assert_eq!(tok.termize("GET_USER_NAME"), vec!["get", "user", "name"]);
    }

    #[test]
    fn get_user_name_default_stop_words() {
        let tok = Tokenizer::new();
        assert_eq!(tok.termize("GET_USER_NAME"), vec!["user", "name"]);
    }

    #[test]
    fn all_uppercase_fragment_is_single_term() {
        let tok = Tokenizer::without_stop_words();
        assert_eq!(tok.termize("HTTP"), vec!["http"]);
    }

    #[test]
    fn empty_identifier_yields_no_terms() {
        let tok = Tokenizer::without_stop_words();
        assert!(tok.termize("").is_empty());
    }

    #[test]
    fn termize_is_memoized_and_pure() {
        let tok = Tokenizer::without_stop_words();
        let first = tok.termize("parseHTTPResponse");
        let second = tok.termize("parseHTTPResponse");
        assert_eq!(first, second);
    }

    #[test]
    fn renormalizing_preserves_term_count() {
        // Re-stemming an already-stemmed fragment can change its root, but the
        // underscore-joined term count must survive a second pass untouched.
        let tok = Tokenizer::without_stop_words();
        let x = "parseHTTPResponse";
        let normalized = tok.normalize_name(x);
        assert_eq!(tok.termize(&normalized).len(), tok.termize(x).len());
    }
}
