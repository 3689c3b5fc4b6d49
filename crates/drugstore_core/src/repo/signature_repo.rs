//! Inventory sign-off repository.

use crate::db::convert::to_epoch_millis;
use crate::model::signature::{Signature, SignatureId};
use crate::repo::drug_repo::RepoResult;
use crate::repo::{ensure_tables, parse_timestamp, parse_uuid};
use rusqlite::{params, Connection, Row};

pub trait SignatureRepository {
    fn create_signature(&self, signature: &Signature) -> RepoResult<SignatureId>;
    /// Lists all signatures, newest first.
    fn list_signatures(&self) -> RepoResult<Vec<Signature>>;
}

pub struct SqliteSignatureRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteSignatureRepository<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_tables(conn, &["signatures"])?;
        Ok(Self { conn })
    }
}

impl SignatureRepository for SqliteSignatureRepository<'_> {
    fn create_signature(&self, signature: &Signature) -> RepoResult<SignatureId> {
        self.conn.execute(
            "INSERT INTO signatures (uuid, employee, signed_at) VALUES (?1, ?2, ?3);",
            params![
                signature.uuid.to_string(),
                signature.employee.as_str(),
                to_epoch_millis(Some(&signature.signed_at)),
            ],
        )?;
        Ok(signature.uuid)
    }

    fn list_signatures(&self) -> RepoResult<Vec<Signature>> {
        let mut stmt = self.conn.prepare(
            "SELECT uuid, employee, signed_at
             FROM signatures
             ORDER BY signed_at DESC, rowid DESC;",
        )?;
        let mut rows = stmt.query([])?;
        let mut signatures = Vec::new();
        while let Some(row) = rows.next()? {
            signatures.push(parse_signature_row(row)?);
        }
        Ok(signatures)
    }
}

fn parse_signature_row(row: &Row<'_>) -> RepoResult<Signature> {
    let uuid_text: String = row.get("uuid")?;
    Ok(Signature {
        uuid: parse_uuid(&uuid_text, "signatures.uuid")?,
        employee: row.get("employee")?,
        signed_at: parse_timestamp(row.get("signed_at")?, "signatures.signed_at")?,
    })
}
