//! List filter state shared by the presentation layer and query collaborators.
//!
//! # Responsibility
//! - Hold "what subset of items the user currently wants to see".
//! - Define the single matching contract every item query must honor.
//!
//! # Invariants
//! - Active category filters have set semantics (no duplicates).
//! - An empty search term means "no text filter"; it is never absent.
//! - Queries only read a `FilterState`; mutation belongs to its owner.
//!
//! Criteria combine as OR within categories and AND across criteria kinds
//! (favorite / category / text).

use std::collections::BTreeSet;

/// Read-only view of an item as seen by [`FilterState::matches`].
pub trait FilterItem<F> {
    /// Category tag the item belongs to.
    fn category(&self) -> F;
    /// Whether the user marked this item as favorite.
    fn is_favorite(&self) -> bool;
    /// Text the search term is matched against.
    fn display_text(&self) -> &str;
}

/// Current search/filter criteria for one list screen.
///
/// `Default` yields the unfiltered state that matches every item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterState<F: Ord> {
    search_term: String,
    favorites_only: bool,
    active_filters: BTreeSet<F>,
}

impl<F: Ord> Default for FilterState<F> {
    fn default() -> Self {
        Self {
            search_term: String::new(),
            favorites_only: false,
            active_filters: BTreeSet::new(),
        }
    }
}

impl<F: Ord> FilterState<F> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flips the favorites-only restriction.
    pub fn toggle_favorites(&mut self) {
        self.favorites_only = !self.favorites_only;
    }

    /// Adds `tag` when absent, removes it when present.
    pub fn toggle_filter(&mut self, tag: F) {
        if !self.active_filters.remove(&tag) {
            self.active_filters.insert(tag);
        }
    }

    /// Replaces the search term verbatim. The empty string clears it.
    pub fn set_search_filter(&mut self, text: impl Into<String>) {
        self.search_term = text.into();
    }

    pub fn is_favorites(&self) -> bool {
        self.favorites_only
    }

    pub fn filters(&self) -> &BTreeSet<F> {
        &self.active_filters
    }

    pub fn search_term(&self) -> &str {
        &self.search_term
    }

    /// True when no criterion restricts the result set.
    pub fn is_unfiltered(&self) -> bool {
        !self.favorites_only && self.active_filters.is_empty() && self.search_term.is_empty()
    }

    /// Applies the matching contract to one item.
    pub fn matches<I: FilterItem<F>>(&self, item: &I) -> bool {
        if self.favorites_only && !item.is_favorite() {
            return false;
        }
        if !self.active_filters.is_empty() && !self.active_filters.contains(&item.category()) {
            return false;
        }
        contains_ignore_case(item.display_text(), &self.search_term)
    }
}

/// Case-insensitive substring test; an empty needle matches everything.
pub fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    if needle.is_empty() {
        return true;
    }
    fold_case(haystack).contains(&fold_case(needle))
}

// Per-char folding; `str::to_lowercase` maps a word-final `Σ` to `ς`, which
// breaks substring containment.
fn fold_case(value: &str) -> String {
    value.chars().flat_map(char::to_lowercase).collect()
}
