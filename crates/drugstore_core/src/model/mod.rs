//! Domain model for the clinical drug inventory.
//!
//! # Responsibility
//! - Define the records persisted by the repositories and shown by the UI.
//! - Keep write-side validation next to the data it guards.
//!
//! # Invariants
//! - Every record is identified by a stable UUID that is never reused.
//! - Timestamps are UTC with millisecond precision.

pub mod dispensation;
pub mod drug;
pub mod signature;
pub mod todo;
