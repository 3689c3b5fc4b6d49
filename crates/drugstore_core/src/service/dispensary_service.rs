//! Dispensary use-case service.
//!
//! # Responsibility
//! - List dispensary items for the current filter state.
//! - Manage the favorites list.
//! - Turn raw dispense form input into a validated dispensation.
//!
//! # Invariants
//! - Employee and patient names are trimmed and never blank when persisted.
//! - Dosage is finite and strictly positive.
//! - Log events carry IDs and counts only, never personal names.

use crate::filter::FilterState;
use crate::model::dispensation::{Dispensation, DispenseRequest};
use crate::model::drug::{Drug, DrugForm, DrugId};
use crate::repo::drug_repo::{DrugRepository, RepoError, RepoResult};
use log::{debug, info, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fmt::{Display, Formatter};

// Accepts `2`, `2.5` and the comma decimal separator used on Swiss keyboards.
static DOSAGE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d+(?:[.,]\d+)?$").expect("valid dosage regex"));

/// Errors from the dispense use-case.
#[derive(Debug)]
pub enum DispenseError {
    /// Dosage text is not a positive decimal number.
    InvalidDosage(String),
    BlankEmployee,
    BlankPatient,
    DrugNotFound(DrugId),
    InsufficientStock {
        drug_id: DrugId,
        available: f64,
        requested: f64,
    },
    Repo(RepoError),
}

impl Display for DispenseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidDosage(value) => write!(f, "invalid dosage: `{value}`"),
            Self::BlankEmployee => write!(f, "employee must not be blank"),
            Self::BlankPatient => write!(f, "patient must not be blank"),
            Self::DrugNotFound(id) => write!(f, "drug not found: {id}"),
            Self::InsufficientStock {
                drug_id,
                available,
                requested,
            } => write!(
                f,
                "insufficient stock for drug {drug_id}: available {available}, requested {requested}"
            ),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for DispenseError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for DispenseError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound(id) => Self::DrugNotFound(id),
            RepoError::InsufficientStock {
                drug_id,
                available,
                requested,
            } => Self::InsufficientStock {
                drug_id,
                available,
                requested,
            },
            other => Self::Repo(other),
        }
    }
}

/// Dispensary facade over a drug repository.
pub struct DispensaryService<R: DrugRepository> {
    repo: R,
}

impl<R: DrugRepository> DispensaryService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Adds a drug to the inventory.
    pub fn create_drug(&self, drug: &Drug) -> RepoResult<DrugId> {
        self.repo.create_drug(drug)
    }

    pub fn get_drug(&self, id: DrugId) -> RepoResult<Option<Drug>> {
        self.repo.get_drug(id)
    }

    /// Lists the dispensary items visible under `filter`.
    pub fn get_all_dispensary_items(&self, filter: &FilterState<DrugForm>) -> RepoResult<Vec<Drug>> {
        let items = self.repo.query_items(filter)?;
        debug!(
            "event=dispensary_query module=service status=ok favorites_only={} filter_count={} search_len={} result_count={}",
            filter.is_favorites(),
            filter.filters().len(),
            filter.search_term().chars().count(),
            items.len()
        );
        Ok(items)
    }

    pub fn add_to_favorites(&self, id: DrugId) -> RepoResult<()> {
        self.repo.set_favorite(id, true)?;
        info!("event=favorite_set module=service status=ok drug_id={id} favorite=true");
        Ok(())
    }

    pub fn remove_from_favorites(&self, id: DrugId) -> RepoResult<()> {
        self.repo.set_favorite(id, false)?;
        info!("event=favorite_set module=service status=ok drug_id={id} favorite=false");
        Ok(())
    }

    /// Records that `employee` handed `dosage_text` units of a drug to `patient`.
    ///
    /// # Errors
    /// - Input errors (`InvalidDosage`, `BlankEmployee`, `BlankPatient`) before
    ///   any storage access.
    /// - `DrugNotFound` / `InsufficientStock` from the stock check.
    pub fn dispense_drug(
        &mut self,
        drug_id: DrugId,
        employee: &str,
        patient: &str,
        dosage_text: &str,
    ) -> Result<Dispensation, DispenseError> {
        let employee = employee.trim();
        if employee.is_empty() {
            return Err(DispenseError::BlankEmployee);
        }
        let patient = patient.trim();
        if patient.is_empty() {
            return Err(DispenseError::BlankPatient);
        }
        let dosage = parse_dosage(dosage_text)?;

        let request = DispenseRequest {
            drug_id,
            employee: employee.to_string(),
            patient: patient.to_string(),
            dosage,
        };

        match self.repo.dispense(&request) {
            Ok(dispensation) => {
                info!(
                    "event=dispense module=service status=ok drug_id={drug_id} dispensation_id={} dosage={dosage}",
                    dispensation.uuid
                );
                Ok(dispensation)
            }
            Err(err) => {
                warn!("event=dispense module=service status=error drug_id={drug_id} error={err}");
                Err(err.into())
            }
        }
    }

    /// Dispensation history of one drug, newest first.
    pub fn list_dispensations(&self, drug_id: DrugId) -> RepoResult<Vec<Dispensation>> {
        self.repo.list_dispensations(drug_id)
    }
}

/// Parses dispense form dosage text into a positive amount.
pub fn parse_dosage(text: &str) -> Result<f64, DispenseError> {
    let trimmed = text.trim();
    if !DOSAGE_RE.is_match(trimmed) {
        return Err(DispenseError::InvalidDosage(text.to_string()));
    }

    let dosage: f64 = trimmed
        .replace(',', ".")
        .parse()
        .map_err(|_| DispenseError::InvalidDosage(text.to_string()))?;
    if !dosage.is_finite() || dosage <= 0.0 {
        return Err(DispenseError::InvalidDosage(text.to_string()));
    }
    Ok(dosage)
}
