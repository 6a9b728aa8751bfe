//! Errors raised while saving and submitting the internal application

use thiserror::Error;

use super::{AuthError, ValidationErrors};

#[derive(Error, Debug)]
pub enum ApplicationError {
    /// Payload failed validation; the tree carries per-field messages
    #[error("Invalid application: {0}")]
    Validation(ValidationErrors),

    /// The caller's farm already submitted; the record is frozen
    #[error("Application has already been submitted")]
    AlreadySubmitted,

    /// Submission preconditions are not met
    #[error("Application is not ready to submit: {}", .missing.join(", "))]
    NotReady { missing: Vec<String> },

    /// Submit called without opening the confirmation first
    #[error("Submission has not been confirmed")]
    ConfirmationNotOpened,

    /// Submit called before the confirmation wait elapsed
    #[error("Please wait {remaining_secs}s before confirming submission")]
    ConfirmationPending { remaining_secs: i64 },

    /// No application row exists for the farm
    #[error("No application found for farm {0}")]
    NotFound(i32),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// Stored row could not be decoded back into answers
    #[error("Stored application is corrupt: {0}")]
    Corrupt(String),
}

impl ApplicationError {
    pub fn http_status_code(&self) -> u16 {
        match self {
            ApplicationError::Validation(_) => 422,
            ApplicationError::AlreadySubmitted => 409,
            ApplicationError::NotReady { .. } => 400,
            ApplicationError::ConfirmationNotOpened => 409,
            ApplicationError::ConfirmationPending { .. } => 429,
            ApplicationError::NotFound(_) => 404,
            ApplicationError::Auth(err) => err.http_status_code(),
            ApplicationError::Database(_) | ApplicationError::Corrupt(_) => 500,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            ApplicationError::Validation(_) => "VALIDATION_FAILED",
            ApplicationError::AlreadySubmitted => "ALREADY_SUBMITTED",
            ApplicationError::NotReady { .. } => "NOT_READY",
            ApplicationError::ConfirmationNotOpened => "CONFIRMATION_NOT_OPENED",
            ApplicationError::ConfirmationPending { .. } => "CONFIRMATION_PENDING",
            ApplicationError::NotFound(_) => "APPLICATION_NOT_FOUND",
            ApplicationError::Auth(err) => err.error_code(),
            ApplicationError::Database(_) => "DATABASE_ERROR",
            ApplicationError::Corrupt(_) => "CORRUPT_APPLICATION",
        }
    }

    /// The validation tree, when this is a validation failure
    pub fn validation_tree(&self) -> Option<&ValidationErrors> {
        match self {
            ApplicationError::Validation(tree) => Some(tree),
            _ => None,
        }
    }
}

impl From<ValidationErrors> for ApplicationError {
    fn from(tree: ValidationErrors) -> Self {
        ApplicationError::Validation(tree)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_ready_lists_missing_answers() {
        let err = ApplicationError::NotReady {
            missing: vec!["waterSource".to_string(), "mainCrops".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "Application is not ready to submit: waterSource, mainCrops"
        );
        assert_eq!(err.http_status_code(), 400);
    }

    #[test]
    fn test_auth_errors_keep_their_status() {
        let err: ApplicationError = AuthError::NoFarmAssociation.into();
        assert_eq!(err.http_status_code(), 403);
        assert_eq!(err.error_code(), "NO_FARM_ASSOCIATION");
        assert_eq!(err.to_string(), "No farm associated with this account");
    }

    #[test]
    fn test_validation_tree_is_exposed() {
        let err: ApplicationError = ValidationErrors::message("bad").into();
        assert!(err.validation_tree().is_some());
        assert_eq!(err.http_status_code(), 422);
    }
}
