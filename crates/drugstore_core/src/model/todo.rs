//! Ward todo entries.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type TodoId = Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Todo {
    pub uuid: TodoId,
    pub text: String,
    pub is_checked: bool,
}

impl Todo {
    /// Creates an unchecked todo with a generated ID.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            text: text.into(),
            is_checked: false,
        }
    }
}
