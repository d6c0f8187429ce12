//! Action taxonomy and process registry.
//!
//! A [`Catalog`] is built once at startup and never mutated.  It owns the
//! ordered trigger phrases for each [`Action`], the ordered process labels,
//! and the compiled matchers used for the exact-match pass.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{IntentError, Result};
use crate::matcher::PhraseMatcher;

// ---------------------------------------------------------------------------
// Action
// ---------------------------------------------------------------------------

/// The action categories a request can be classified into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    Create,
    Update,
    Delete,
    Retrieve,
    Query,
}

impl Action {
    /// Every action, in taxonomy order.
    pub const ALL: [Self; 5] = [
        Self::Create,
        Self::Update,
        Self::Delete,
        Self::Retrieve,
        Self::Query,
    ];

    /// The display name used on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Create => "Create",
            Self::Update => "Update",
            Self::Delete => "Delete",
            Self::Retrieve => "Retrieve",
            Self::Query => "Query",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Action {
    type Err = IntentError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|a| a.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| IntentError::InvalidCatalog {
                reason: format!("unknown action `{s}`"),
            })
    }
}

// ---------------------------------------------------------------------------
// Default tables
// ---------------------------------------------------------------------------

const DEFAULT_TAXONOMY: [(Action, &[&str]); 5] = [
    (Action::Create, &["create", "add new", "make"]),
    (Action::Update, &["modify", "update", "edit", "make changes"]),
    (Action::Delete, &["delete", "remove"]),
    (Action::Retrieve, &["view", "search", "show", "see"]),
    (Action::Query, &["query", "ask", "analyze"]),
];

const DEFAULT_PROCESS_COUNT: usize = 10;

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

/// The immutable classification tables.
#[derive(Debug, Clone)]
pub struct Catalog {
    /// Categories in taxonomy order with their phrases in phrase order.
    categories: Vec<(Action, Vec<String>)>,
    /// Owning action of each flattened trigger phrase.
    phrase_actions: Vec<Action>,
    /// Every trigger phrase, flattened in iteration order.
    action_matcher: PhraseMatcher,
    /// Process labels in registry order, as configured.
    process_labels: Vec<String>,
    /// Lowercased process labels, index-aligned with `process_labels`.
    process_matcher: PhraseMatcher,
}

impl Catalog {
    /// Build a catalog from explicit tables.
    ///
    /// Trigger phrases are lowercased so they can be matched against
    /// normalized text.  Process labels keep their configured spelling and
    /// are matched case-insensitively.  Empty tables, empty phrases, repeated
    /// actions and labels repeated in any casing are rejected.
    pub fn new(
        taxonomy: Vec<(Action, Vec<String>)>,
        processes: Vec<String>,
    ) -> Result<Self> {
        if taxonomy.is_empty() {
            return Err(invalid("action taxonomy is empty"));
        }
        if processes.is_empty() {
            return Err(invalid("process registry is empty"));
        }

        let mut seen_actions = Vec::with_capacity(taxonomy.len());
        let mut categories = Vec::with_capacity(taxonomy.len());
        for (action, phrases) in taxonomy {
            if seen_actions.contains(&action) {
                return Err(invalid(format!("action `{action}` listed twice")));
            }
            seen_actions.push(action);

            if phrases.is_empty() {
                return Err(invalid(format!("action `{action}` has no trigger phrases")));
            }
            let mut lowered = Vec::with_capacity(phrases.len());
            for phrase in phrases {
                if phrase.trim().is_empty() {
                    return Err(invalid(format!("action `{action}` has an empty trigger phrase")));
                }
                lowered.push(phrase.to_lowercase());
            }
            categories.push((action, lowered));
        }

        let mut lowered: Vec<String> = Vec::with_capacity(processes.len());
        for label in &processes {
            if label.trim().is_empty() {
                return Err(invalid("process registry has an empty label"));
            }
            let key = label.to_lowercase();
            if lowered.contains(&key) {
                return Err(invalid(format!("process `{label}` listed twice")));
            }
            lowered.push(key);
        }
        let labels = processes;

        Ok(Self::from_parts(categories, labels))
    }

    /// The built-in taxonomy (five actions) and `process 1` ... `process 10`.
    pub fn standard() -> Self {
        let categories = DEFAULT_TAXONOMY
            .iter()
            .map(|(action, phrases)| {
                (*action, phrases.iter().map(|p| (*p).to_owned()).collect())
            })
            .collect();
        let labels = (1..=DEFAULT_PROCESS_COUNT)
            .map(|n| format!("process {n}"))
            .collect();
        Self::from_parts(categories, labels)
    }

    fn from_parts(categories: Vec<(Action, Vec<String>)>, labels: Vec<String>) -> Self {
        let mut phrase_actions = Vec::new();
        let mut phrases = Vec::new();
        for (action, list) in &categories {
            for phrase in list {
                phrase_actions.push(*action);
                phrases.push(phrase.clone());
            }
        }

        let lowered = labels.iter().map(|l| l.to_lowercase()).collect();
        Self {
            categories,
            phrase_actions,
            action_matcher: PhraseMatcher::new(phrases),
            process_labels: labels,
            process_matcher: PhraseMatcher::new(lowered),
        }
    }

    // -- Accessors -----------------------------------------------------------

    /// Categories in taxonomy order.
    pub fn categories(&self) -> impl Iterator<Item = (Action, &[String])> {
        self.categories.iter().map(|(a, p)| (*a, p.as_slice()))
    }

    /// Every trigger phrase, flattened in iteration order.
    pub fn action_phrases(&self) -> &[String] {
        self.action_matcher.phrases()
    }

    /// The action owning the flattened phrase at `index`.
    pub fn action_at(&self, index: usize) -> Option<Action> {
        self.phrase_actions.get(index).copied()
    }

    /// Process labels in registry order, as configured.
    pub fn processes(&self) -> &[String] {
        &self.process_labels
    }

    /// Every distinct candidate text (trigger phrases, then process labels).
    pub fn candidate_texts(&self) -> Vec<String> {
        let mut out: Vec<String> = Vec::new();
        for text in self.action_phrases().iter().chain(self.processes()) {
            if !out.contains(text) {
                out.push(text.clone());
            }
        }
        out
    }

    // -- Exact matching ------------------------------------------------------

    /// First trigger phrase (in taxonomy order) contained in `normalized`.
    pub fn match_action(&self, normalized: &str) -> Option<(Action, &str)> {
        let index = self.action_matcher.first_match(normalized)?;
        Some((self.action_at(index)?, self.action_matcher.phrase(index)?))
    }

    /// First process label (in registry order) contained in `normalized`,
    /// compared case-insensitively and returned as configured.
    pub fn match_process(&self, normalized: &str) -> Option<&str> {
        let index = self.process_matcher.first_match(normalized)?;
        self.process_labels.get(index).map(String::as_str)
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::standard()
    }
}

fn invalid(reason: impl Into<String>) -> IntentError {
    IntentError::InvalidCatalog {
        reason: reason.into(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
