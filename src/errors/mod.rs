//! Domain-specific error types for farm-portal
//!
//! # Error Categories
//!
//! - **AuthError**: identity resolution, farm scoping, passwords and invitations
//! - **ApplicationError**: saving and submitting the internal application
//! - **AccountError**: farm profile, certificates and management zones
//! - **ExportError**: the spreadsheet side channel
//! - **ValidationErrors**: field-path tree shared by the other categories
//!
//! Server handlers turn these into JSON bodies of the form
//! `{"error": ..., "code": "..."}` (see `server::response`).

pub mod account;
pub mod application;
pub mod auth;
pub mod export;
pub mod validation;

pub use account::AccountError;
pub use application::ApplicationError;
pub use auth::AuthError;
pub use export::ExportError;
pub use validation::ValidationErrors;

/// Result type alias for authentication operations
pub type AuthResult<T> = Result<T, AuthError>;

/// Result type alias for application operations
pub type ApplicationResult<T> = Result<T, ApplicationError>;

/// Result type alias for account operations
pub type AccountResult<T> = Result<T, AccountError>;

/// Result type alias for export operations
pub type ExportResult<T> = Result<T, ExportError>;
