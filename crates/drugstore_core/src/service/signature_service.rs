//! Inventory sign-off use-case service.

use crate::db::convert::now_millis_precision;
use crate::model::signature::Signature;
use crate::repo::drug_repo::RepoError;
use crate::repo::signature_repo::SignatureRepository;
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

#[derive(Debug)]
pub enum SignatureServiceError {
    BlankEmployee,
    Repo(RepoError),
}

impl Display for SignatureServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankEmployee => write!(f, "employee must not be blank"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for SignatureServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            Self::BlankEmployee => None,
        }
    }
}

impl From<RepoError> for SignatureServiceError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

pub struct SignatureService<R: SignatureRepository> {
    repo: R,
}

impl<R: SignatureRepository> SignatureService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// All sign-offs, newest first.
    pub fn get_signatures(&self) -> Result<Vec<Signature>, SignatureServiceError> {
        Ok(self.repo.list_signatures()?)
    }

    /// Records a sign-off by `employee` at the current time.
    pub fn sign(&self, employee: &str) -> Result<Signature, SignatureServiceError> {
        let employee = employee.trim();
        if employee.is_empty() {
            return Err(SignatureServiceError::BlankEmployee);
        }
        let signature = Signature {
            uuid: Uuid::new_v4(),
            employee: employee.to_string(),
            signed_at: now_millis_precision(),
        };
        self.repo.create_signature(&signature)?;
        info!(
            "event=signature_create module=service status=ok signature_id={}",
            signature.uuid
        );
        Ok(signature)
    }
}
