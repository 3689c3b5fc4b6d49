//! Inventory sign-off entries recorded by staff.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type SignatureId = Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signature {
    pub uuid: SignatureId,
    /// Employee who signed off the current inventory state.
    pub employee: String,
    pub signed_at: DateTime<Utc>,
}
