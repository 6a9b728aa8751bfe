//! Authentication and authorisation error types
//!
//! Identity itself comes from an upstream provider; these errors cover
//! resolving that identity, scoping it to a farm, and the password and
//! invitation flows of the account area.
//!
//! # Examples
//!
//! ```rust
//! use farm_portal::errors::AuthError;
//!
//! let err = AuthError::NoFarmAssociation;
//! assert!(err.is_authorisation_error());
//! assert_eq!(err.http_status_code(), 403);
//! ```

use thiserror::Error;

/// Authentication and authorisation errors
#[derive(Error, Debug)]
pub enum AuthError {
    /// No identity was supplied with the request
    #[error("Authentication required")]
    AuthenticationRequired,

    /// Identity header present but does not resolve to a user
    #[error("Unknown user")]
    UnknownUser,

    /// Caller is authenticated but not attached to any farm
    #[error("No farm associated with this account")]
    NoFarmAssociation,

    /// Caller may not perform this action
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// User not found
    #[error("User not found")]
    UserNotFound,

    /// Current password did not verify
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Password does not meet requirements
    #[error("Password does not meet requirements: {0}")]
    WeakPassword(String),

    /// Invalid email format
    #[error("Invalid email: {0}")]
    InvalidEmail(String),

    /// A user with this email already exists
    #[error("User already exists")]
    UserAlreadyExists,

    /// Invitation token unknown or already used
    #[error("Invalid or expired invitation")]
    InvalidInvitation,

    /// Password hashing failed
    #[error("Password hashing failed: {0}")]
    Hashing(#[from] bcrypt::BcryptError),

    /// Database operation failed
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),
}

impl AuthError {
    /// Check if this is an authentication error (401)
    pub fn is_authentication_error(&self) -> bool {
        matches!(
            self,
            AuthError::AuthenticationRequired
                | AuthError::UnknownUser
                | AuthError::InvalidCredentials
        )
    }

    /// Check if this is an authorisation error (403)
    pub fn is_authorisation_error(&self) -> bool {
        matches!(
            self,
            AuthError::NoFarmAssociation | AuthError::PermissionDenied(_)
        )
    }

    /// Check if this is a validation error (400)
    pub fn is_validation_error(&self) -> bool {
        matches!(
            self,
            AuthError::WeakPassword(_) | AuthError::InvalidEmail(_) | AuthError::InvalidInvitation
        )
    }

    /// Get HTTP status code for this error
    pub fn http_status_code(&self) -> u16 {
        match self {
            AuthError::AuthenticationRequired
            | AuthError::UnknownUser
            | AuthError::InvalidCredentials => 401,
            AuthError::NoFarmAssociation | AuthError::PermissionDenied(_) => 403,
            AuthError::UserNotFound => 404,
            AuthError::WeakPassword(_)
            | AuthError::InvalidEmail(_)
            | AuthError::InvalidInvitation => 400,
            AuthError::UserAlreadyExists => 409,
            AuthError::Hashing(_) | AuthError::Database(_) => 500,
        }
    }

    /// Get error code for API responses
    pub fn error_code(&self) -> &'static str {
        match self {
            AuthError::AuthenticationRequired => "AUTHENTICATION_REQUIRED",
            AuthError::UnknownUser => "UNKNOWN_USER",
            AuthError::NoFarmAssociation => "NO_FARM_ASSOCIATION",
            AuthError::PermissionDenied(_) => "PERMISSION_DENIED",
            AuthError::UserNotFound => "USER_NOT_FOUND",
            AuthError::InvalidCredentials => "INVALID_CREDENTIALS",
            AuthError::WeakPassword(_) => "WEAK_PASSWORD",
            AuthError::InvalidEmail(_) => "INVALID_EMAIL",
            AuthError::UserAlreadyExists => "USER_ALREADY_EXISTS",
            AuthError::InvalidInvitation => "INVALID_INVITATION",
            AuthError::Hashing(_) => "HASHING_ERROR",
            AuthError::Database(_) => "DATABASE_ERROR",
        }
    }
}
