//! Flutter bridge crate for the Drugstore core.

pub mod api;
