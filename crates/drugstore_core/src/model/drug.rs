//! Drug inventory record and its dispensary categories.
//!
//! # Invariants
//! - `title` and `dosage_unit` are never blank.
//! - `stock_amount` is finite and never negative.

use crate::filter::FilterItem;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier of one drug in the inventory.
pub type DrugId = Uuid;

/// Route of administration, used as the dispensary filter category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DrugForm {
    Injection,
    Oral,
    OralLiquid,
    Plaster,
}

impl DrugForm {
    pub const ALL: [DrugForm; 4] = [
        DrugForm::Injection,
        DrugForm::Oral,
        DrugForm::OralLiquid,
        DrugForm::Plaster,
    ];

    /// Stable label used in storage and across the FFI boundary.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Injection => "injection",
            Self::Oral => "oral",
            Self::OralLiquid => "oral_liquid",
            Self::Plaster => "plaster",
        }
    }

    /// Parses a label produced by [`DrugForm::as_str`].
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "injection" => Some(Self::Injection),
            "oral" => Some(Self::Oral),
            "oral_liquid" => Some(Self::OralLiquid),
            "plaster" => Some(Self::Plaster),
            _ => None,
        }
    }
}

impl Display for DrugForm {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Filter chip on the dispensary screen.
///
/// The favorite chip is not a category: it drives the favorites-only flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispensaryChip {
    Favorite,
    Form(DrugForm),
}

/// Validation failures for drug writes.
#[derive(Debug, Clone, PartialEq)]
pub enum DrugValidationError {
    BlankTitle,
    BlankDosageUnit,
    InvalidStock(f64),
}

impl Display for DrugValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankTitle => write!(f, "drug title must not be blank"),
            Self::BlankDosageUnit => write!(f, "drug dosage_unit must not be blank"),
            Self::InvalidStock(value) => {
                write!(f, "drug stock_amount must be finite and >= 0, got {value}")
            }
        }
    }
}

impl Error for DrugValidationError {}

/// One drug kept in the clinic's dispensary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Drug {
    pub uuid: DrugId,
    /// Trade name shown in the dispensary grid and matched by search.
    pub title: String,
    /// Active substance, when known.
    pub substance: Option<String>,
    /// Unit a dosage is expressed in (`mg`, `ml`, `Stk`).
    pub dosage_unit: String,
    pub form: DrugForm,
    /// Remaining stock in `dosage_unit`.
    pub stock_amount: f64,
    pub is_favorite: bool,
}

impl Drug {
    /// Creates a non-favorite drug with a generated ID and empty stock.
    pub fn new(title: impl Into<String>, dosage_unit: impl Into<String>, form: DrugForm) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            title: title.into(),
            substance: None,
            dosage_unit: dosage_unit.into(),
            form,
            stock_amount: 0.0,
            is_favorite: false,
        }
    }

    pub fn with_stock(mut self, stock_amount: f64) -> Self {
        self.stock_amount = stock_amount;
        self
    }

    pub fn with_substance(mut self, substance: impl Into<String>) -> Self {
        self.substance = Some(substance.into());
        self
    }

    pub fn validate(&self) -> Result<(), DrugValidationError> {
        if self.title.trim().is_empty() {
            return Err(DrugValidationError::BlankTitle);
        }
        if self.dosage_unit.trim().is_empty() {
            return Err(DrugValidationError::BlankDosageUnit);
        }
        if !self.stock_amount.is_finite() || self.stock_amount < 0.0 {
            return Err(DrugValidationError::InvalidStock(self.stock_amount));
        }
        Ok(())
    }
}

impl FilterItem<DrugForm> for Drug {
    fn category(&self) -> DrugForm {
        self.form
    }

    fn is_favorite(&self) -> bool {
        self.is_favorite
    }

    fn display_text(&self) -> &str {
        &self.title
    }
}
