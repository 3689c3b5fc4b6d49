//! Dispensation records: who handed which dose of a drug to which patient.

use crate::model::drug::DrugId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type DispensationId = Uuid;

/// Validated input for recording one dispensation.
///
/// Built by the dispensary service after trimming names and parsing the
/// dosage text; repositories trust these fields.
#[derive(Debug, Clone, PartialEq)]
pub struct DispenseRequest {
    pub drug_id: DrugId,
    pub employee: String,
    pub patient: String,
    /// Amount in the drug's `dosage_unit`. Always finite and > 0.
    pub dosage: f64,
}

/// Persisted dispensation entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dispensation {
    pub uuid: DispensationId,
    pub drug_id: DrugId,
    pub employee: String,
    pub patient: String,
    pub dosage: f64,
    pub dispensed_at: DateTime<Utc>,
}
