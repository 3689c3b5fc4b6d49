//! Use-case services.
//!
//! # Responsibility
//! - Expose one entry point per user action of the dispensary app.
//! - Normalize raw UI input before it reaches the repositories.
//! - Keep UI/FFI layers decoupled from storage details.

pub mod dispensary_service;
pub mod signature_service;
pub mod todo_service;
