//! Drug inventory repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Persist drugs, favorites and dispensations.
//! - Answer dispensary list queries for a [`FilterState`].
//!
//! # Invariants
//! - `query_items` returns exactly the drugs `FilterState::matches` accepts,
//!   ordered by `title COLLATE NOCASE ASC, uuid ASC`.
//! - A dispensation and its stock decrement commit together or not at all.
//! - Stock never drops below zero.

use crate::db::convert::{now_millis_precision, to_epoch_millis};
use crate::db::DbError;
use crate::filter::FilterState;
use crate::model::dispensation::{Dispensation, DispenseRequest};
use crate::model::drug::{Drug, DrugForm, DrugId, DrugValidationError};
use crate::repo::{bool_to_int, ensure_tables, parse_flag, parse_timestamp, parse_uuid};
use rusqlite::types::Value;
use rusqlite::{
    params, params_from_iter, Connection, OptionalExtension, Row, TransactionBehavior,
};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

const DRUG_SELECT_SQL: &str = "SELECT
    uuid,
    title,
    substance,
    dosage_unit,
    form,
    stock_amount,
    is_favorite
FROM drugs";

const DISPENSATION_SELECT_SQL: &str = "SELECT
    uuid,
    drug_uuid,
    employee,
    patient,
    dosage,
    dispensed_at
FROM dispensations";

/// Tolerance for floating point residue when comparing stock with a dosage.
const STOCK_EPSILON: f64 = 1e-9;

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error shared by all inventory repositories.
#[derive(Debug)]
pub enum RepoError {
    Validation(DrugValidationError),
    Db(DbError),
    NotFound(Uuid),
    InvalidData(String),
    MissingRequiredTable(&'static str),
    InsufficientStock {
        drug_id: DrugId,
        available: f64,
        requested: f64,
    },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "record not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
            Self::MissingRequiredTable(table) => write!(f, "required table missing: {table}"),
            Self::InsufficientStock {
                drug_id,
                available,
                requested,
            } => write!(
                f,
                "insufficient stock for drug {drug_id}: available {available}, requested {requested}"
            ),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DrugValidationError> for RepoError {
    fn from(value: DrugValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Repository interface for the dispensary use-cases.
pub trait DrugRepository {
    fn create_drug(&self, drug: &Drug) -> RepoResult<DrugId>;
    fn get_drug(&self, id: DrugId) -> RepoResult<Option<Drug>>;
    /// Returns the drugs matching `filter`, in stable display order.
    fn query_items(&self, filter: &FilterState<DrugForm>) -> RepoResult<Vec<Drug>>;
    fn set_favorite(&self, id: DrugId, is_favorite: bool) -> RepoResult<()>;
    /// Records one dispensation and deducts its dosage from stock atomically.
    fn dispense(&mut self, request: &DispenseRequest) -> RepoResult<Dispensation>;
    /// Lists dispensations of one drug, newest first.
    fn list_dispensations(&self, drug_id: DrugId) -> RepoResult<Vec<Dispensation>>;
}

/// SQLite-backed drug repository.
pub struct SqliteDrugRepository<'conn> {
    conn: &'conn mut Connection,
}

impl<'conn> SqliteDrugRepository<'conn> {
    /// Wraps a migrated connection after checking the inventory tables exist.
    pub fn try_new(conn: &'conn mut Connection) -> RepoResult<Self> {
        ensure_tables(conn, &["drugs", "dispensations"])?;
        Ok(Self { conn })
    }
}

impl DrugRepository for SqliteDrugRepository<'_> {
    fn create_drug(&self, drug: &Drug) -> RepoResult<DrugId> {
        drug.validate()?;

        self.conn.execute(
            "INSERT INTO drugs (
                uuid,
                title,
                substance,
                dosage_unit,
                form,
                stock_amount,
                is_favorite
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7);",
            params![
                drug.uuid.to_string(),
                drug.title.as_str(),
                drug.substance.as_deref(),
                drug.dosage_unit.as_str(),
                drug.form.as_str(),
                drug.stock_amount,
                bool_to_int(drug.is_favorite),
            ],
        )?;

        Ok(drug.uuid)
    }

    fn get_drug(&self, id: DrugId) -> RepoResult<Option<Drug>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{DRUG_SELECT_SQL} WHERE uuid = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_drug_row(row)?));
        }
        Ok(None)
    }

    fn query_items(&self, filter: &FilterState<DrugForm>) -> RepoResult<Vec<Drug>> {
        let mut sql = format!("{DRUG_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        if filter.is_favorites() {
            sql.push_str(" AND is_favorite = 1");
        }

        if !filter.filters().is_empty() {
            let placeholders = vec!["?"; filter.filters().len()].join(", ");
            sql.push_str(&format!(" AND form IN ({placeholders})"));
            bind_values.extend(
                filter
                    .filters()
                    .iter()
                    .map(|form| Value::Text(form.as_str().to_string())),
            );
        }

        sql.push_str(" ORDER BY title COLLATE NOCASE ASC, uuid ASC");

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut drugs = Vec::new();

        // SQLite folds ASCII case only, so the text criterion runs here.
        while let Some(row) = rows.next()? {
            let drug = parse_drug_row(row)?;
            if filter.matches(&drug) {
                drugs.push(drug);
            }
        }

        Ok(drugs)
    }

    fn set_favorite(&self, id: DrugId, is_favorite: bool) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE drugs
             SET
                is_favorite = ?2,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE uuid = ?1;",
            params![id.to_string(), bool_to_int(is_favorite)],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        Ok(())
    }

    fn dispense(&mut self, request: &DispenseRequest) -> RepoResult<Dispensation> {
        let drug_id_text = request.drug_id.to_string();
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        let available: Option<f64> = tx
            .query_row(
                "SELECT stock_amount FROM drugs WHERE uuid = ?1;",
                [drug_id_text.as_str()],
                |row| row.get(0),
            )
            .optional()?;
        let Some(available) = available else {
            return Err(RepoError::NotFound(request.drug_id));
        };

        if request.dosage > available + STOCK_EPSILON {
            return Err(RepoError::InsufficientStock {
                drug_id: request.drug_id,
                available,
                requested: request.dosage,
            });
        }

        let dispensation = Dispensation {
            uuid: Uuid::new_v4(),
            drug_id: request.drug_id,
            employee: request.employee.clone(),
            patient: request.patient.clone(),
            dosage: request.dosage,
            dispensed_at: now_millis_precision(),
        };

        tx.execute(
            "INSERT INTO dispensations (
                uuid,
                drug_uuid,
                employee,
                patient,
                dosage,
                dispensed_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
            params![
                dispensation.uuid.to_string(),
                drug_id_text.as_str(),
                dispensation.employee.as_str(),
                dispensation.patient.as_str(),
                dispensation.dosage,
                to_epoch_millis(Some(&dispensation.dispensed_at)),
            ],
        )?;

        tx.execute(
            "UPDATE drugs
             SET
                stock_amount = MAX(stock_amount - ?2, 0),
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE uuid = ?1;",
            params![drug_id_text.as_str(), request.dosage],
        )?;

        tx.commit()?;
        Ok(dispensation)
    }

    fn list_dispensations(&self, drug_id: DrugId) -> RepoResult<Vec<Dispensation>> {
        let mut stmt = self.conn.prepare(&format!(
            "{DISPENSATION_SELECT_SQL}
             WHERE drug_uuid = ?1
             ORDER BY dispensed_at DESC, rowid DESC;"
        ))?;
        let mut rows = stmt.query([drug_id.to_string()])?;
        let mut dispensations = Vec::new();
        while let Some(row) = rows.next()? {
            dispensations.push(parse_dispensation_row(row)?);
        }
        Ok(dispensations)
    }
}

fn parse_drug_row(row: &Row<'_>) -> RepoResult<Drug> {
    let uuid_text: String = row.get("uuid")?;
    let form_text: String = row.get("form")?;
    let form = DrugForm::parse(&form_text).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid drug form `{form_text}` in drugs.form"))
    })?;

    let drug = Drug {
        uuid: parse_uuid(&uuid_text, "drugs.uuid")?,
        title: row.get("title")?,
        substance: row.get("substance")?,
        dosage_unit: row.get("dosage_unit")?,
        form,
        stock_amount: row.get("stock_amount")?,
        is_favorite: parse_flag(row.get("is_favorite")?, "drugs.is_favorite")?,
    };
    drug.validate().map_err(|err| {
        RepoError::InvalidData(format!("invalid drug row `{uuid_text}` in drugs: {err}"))
    })?;
    Ok(drug)
}

fn parse_dispensation_row(row: &Row<'_>) -> RepoResult<Dispensation> {
    let uuid_text: String = row.get("uuid")?;
    let drug_uuid_text: String = row.get("drug_uuid")?;
    Ok(Dispensation {
        uuid: parse_uuid(&uuid_text, "dispensations.uuid")?,
        drug_id: parse_uuid(&drug_uuid_text, "dispensations.drug_uuid")?,
        employee: row.get("employee")?,
        patient: row.get("patient")?,
        dosage: row.get("dosage")?,
        dispensed_at: parse_timestamp(row.get("dispensed_at")?, "dispensations.dispensed_at")?,
    })
}
