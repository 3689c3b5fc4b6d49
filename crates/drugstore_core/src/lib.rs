//! Core domain logic for the Drugstore dispensary app.
//! This crate is the single source of truth for inventory invariants.

pub mod db;
pub mod filter;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod session;

pub use filter::{FilterItem, FilterState};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::dispensation::{Dispensation, DispensationId, DispenseRequest};
pub use model::drug::{DispensaryChip, Drug, DrugForm, DrugId, DrugValidationError};
pub use model::signature::{Signature, SignatureId};
pub use model::todo::{Todo, TodoId};
pub use repo::drug_repo::{DrugRepository, RepoError, RepoResult, SqliteDrugRepository};
pub use repo::signature_repo::{SignatureRepository, SqliteSignatureRepository};
pub use repo::todo_repo::{SqliteTodoRepository, TodoRepository};
pub use service::dispensary_service::{DispensaryService, DispenseError};
pub use service::signature_service::{SignatureService, SignatureServiceError};
pub use service::todo_service::{TodoService, TodoServiceError};
pub use session::{DispensarySession, QueryTicket};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
