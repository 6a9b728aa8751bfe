//! Errors for the account area: farm profile, certificates and zones

use thiserror::Error;

use super::{AuthError, ValidationErrors};

#[derive(Error, Debug)]
pub enum AccountError {
    #[error("Invalid input: {0}")]
    Validation(ValidationErrors),

    #[error("Farm {0} not found")]
    FarmNotFound(i32),

    #[error("Management zone {0} not found")]
    ZoneNotFound(i32),

    #[error("Certificate {0} not found")]
    CertificateNotFound(i32),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),
}

impl AccountError {
    pub fn http_status_code(&self) -> u16 {
        match self {
            AccountError::Validation(_) => 422,
            AccountError::FarmNotFound(_)
            | AccountError::ZoneNotFound(_)
            | AccountError::CertificateNotFound(_) => 404,
            AccountError::Auth(err) => err.http_status_code(),
            AccountError::Database(_) => 500,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            AccountError::Validation(_) => "VALIDATION_FAILED",
            AccountError::FarmNotFound(_) => "FARM_NOT_FOUND",
            AccountError::ZoneNotFound(_) => "ZONE_NOT_FOUND",
            AccountError::CertificateNotFound(_) => "CERTIFICATE_NOT_FOUND",
            AccountError::Auth(err) => err.error_code(),
            AccountError::Database(_) => "DATABASE_ERROR",
        }
    }

    pub fn validation_tree(&self) -> Option<&ValidationErrors> {
        match self {
            AccountError::Validation(tree) => Some(tree),
            _ => None,
        }
    }
}

impl From<ValidationErrors> for AccountError {
    fn from(tree: ValidationErrors) -> Self {
        AccountError::Validation(tree)
    }
}
