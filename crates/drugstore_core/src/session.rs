//! Dispensary screen session state.
//!
//! # Responsibility
//! - Own the screen's `FilterState` for its whole lifetime.
//! - Turn chip and search input into filter mutations.
//! - Hand immutable filter snapshots to the query pipeline and keep only the
//!   results of the newest one.
//!
//! # Invariants
//! - Every mutation supersedes all previously issued tickets.
//! - Rendered items always come from the latest ticket that completed;
//!   results of superseded tickets are dropped, never merged.

use crate::filter::FilterState;
use crate::model::drug::{DispensaryChip, Drug, DrugForm};
use crate::repo::drug_repo::{DrugRepository, RepoResult};
use crate::service::dispensary_service::DispensaryService;
use log::debug;

/// Snapshot of the filter state at the time a query was issued.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryTicket {
    generation: u64,
    filter: FilterState<DrugForm>,
}

impl QueryTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Filter the query must be run with.
    pub fn filter(&self) -> &FilterState<DrugForm> {
        &self.filter
    }
}

/// Per-screen dispensary state: filter criteria plus the rendered list.
#[derive(Debug, Default)]
pub struct DispensarySession {
    filter: FilterState<DrugForm>,
    generation: u64,
    items: Vec<Drug>,
}

impl DispensarySession {
    /// Starts a session with the unfiltered state and an empty list.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filter_state(&self) -> &FilterState<DrugForm> {
        &self.filter
    }

    /// Ticket for the current state without mutating it (initial load).
    pub fn current_ticket(&self) -> QueryTicket {
        QueryTicket {
            generation: self.generation,
            filter: self.filter.clone(),
        }
    }

    /// Applies a chip tap and returns the ticket for the follow-up query.
    pub fn toggle_chip(&mut self, chip: DispensaryChip) -> QueryTicket {
        match chip {
            DispensaryChip::Favorite => self.filter.toggle_favorites(),
            DispensaryChip::Form(form) => self.filter.toggle_filter(form),
        }
        self.bump()
    }

    /// Applies search box text (typed or submitted) verbatim.
    pub fn search(&mut self, text: impl Into<String>) -> QueryTicket {
        self.filter.set_search_filter(text);
        self.bump()
    }

    /// Delivers query results; returns `false` when `ticket` was superseded.
    pub fn complete(&mut self, ticket: &QueryTicket, items: Vec<Drug>) -> bool {
        if ticket.generation != self.generation {
            debug!(
                "event=dispensary_results module=session status=stale ticket={} latest={}",
                ticket.generation, self.generation
            );
            return false;
        }
        self.items = items;
        true
    }

    /// Queries synchronously with the current state and renders the result.
    pub fn refresh<R: DrugRepository>(
        &mut self,
        service: &DispensaryService<R>,
    ) -> RepoResult<&[Drug]> {
        let ticket = self.current_ticket();
        let items = service.get_all_dispensary_items(ticket.filter())?;
        self.complete(&ticket, items);
        Ok(&self.items)
    }

    pub fn items(&self) -> &[Drug] {
        &self.items
    }

    /// Whether the "no items" placeholder should replace the list.
    pub fn is_empty_view(&self) -> bool {
        self.items.is_empty()
    }

    fn bump(&mut self) -> QueryTicket {
        self.generation = self.generation.wrapping_add(1);
        self.current_ticket()
    }
}
