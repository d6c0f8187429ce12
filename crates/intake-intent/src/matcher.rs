//! Ordered substring matching.
//!
//! [`PhraseMatcher`] answers one question: *which registered phrase, in
//! registration order, is the first one that occurs anywhere in the text?*
//! Position in the text does not matter, only position in the list.
//!
//! All phrases are compiled into a single [`aho_corasick`] automaton so the
//! text is scanned once regardless of how many phrases are registered.

use aho_corasick::AhoCorasick;

/// An immutable, ordered set of phrases compiled for substring search.
#[derive(Debug, Clone)]
pub struct PhraseMatcher {
    phrases: Vec<String>,
    /// `None` if the phrase set is empty or the automaton failed to build;
    /// matching then falls back to a linear scan.
    automaton: Option<AhoCorasick>,
}

impl PhraseMatcher {
    /// Compile `phrases`, keeping their order.
    pub fn new(phrases: Vec<String>) -> Self {
        let automaton = if phrases.is_empty() {
            None
        } else {
            match AhoCorasick::new(&phrases) {
                Ok(ac) => {
                    tracing::trace!(count = phrases.len(), "aho-corasick automaton built");
                    Some(ac)
                }
                Err(e) => {
                    tracing::error!(error = %e, "failed to build aho-corasick automaton, using linear scan");
                    None
                }
            }
        };

        Self { phrases, automaton }
    }

    /// Index of the earliest-registered phrase contained in `haystack`.
    pub fn first_match(&self, haystack: &str) -> Option<usize> {
        match &self.automaton {
            // Overlapping iteration reports every occurrence of every phrase,
            // including phrases nested inside longer ones.
            Some(ac) => ac
                .find_overlapping_iter(haystack)
                .map(|m| m.pattern().as_usize())
                .min(),
            None => self
                .phrases
                .iter()
                .position(|phrase| haystack.contains(phrase.as_str())),
        }
    }

    /// The phrase at `index`.
    pub fn phrase(&self, index: usize) -> Option<&str> {
        self.phrases.get(index).map(String::as_str)
    }

    /// All phrases in registration order.
    pub fn phrases(&self) -> &[String] {
        &self.phrases
    }

    /// Number of registered phrases.
    pub fn len(&self) -> usize {
        self.phrases.len()
    }

    /// Whether no phrases are registered.
    pub fn is_empty(&self) -> bool {
        self.phrases.is_empty()
    }
}
