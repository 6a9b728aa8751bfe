//! Spreadsheet export errors
//!
//! None of these ever block the main application workflow; callers reduce
//! them to a message and carry on.

use thiserror::Error;

use super::AuthError;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("INTERNAL_APPLICATION_GOOGLE_SCRIPT_URL is not configured")]
    MissingUrl,

    #[error("Invalid export URL: {0}")]
    InvalidUrl(String),

    #[error("No application found for farm {0}")]
    NoApplication(i32),

    #[error("Export request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Export endpoint responded with status {0}")]
    UpstreamStatus(u16),

    #[error("Stored application is corrupt: {0}")]
    Corrupt(String),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),
}

impl ExportError {
    pub fn http_status_code(&self) -> u16 {
        match self {
            ExportError::MissingUrl | ExportError::InvalidUrl(_) => 503,
            ExportError::NoApplication(_) => 404,
            ExportError::Transport(_) | ExportError::UpstreamStatus(_) => 502,
            ExportError::Corrupt(_) | ExportError::Database(_) => 500,
            ExportError::Auth(err) => err.http_status_code(),
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            ExportError::MissingUrl => "EXPORT_NOT_CONFIGURED",
            ExportError::InvalidUrl(_) => "EXPORT_INVALID_URL",
            ExportError::NoApplication(_) => "APPLICATION_NOT_FOUND",
            ExportError::Transport(_) => "EXPORT_TRANSPORT",
            ExportError::UpstreamStatus(_) => "EXPORT_UPSTREAM_STATUS",
            ExportError::Corrupt(_) => "CORRUPT_APPLICATION",
            ExportError::Auth(err) => err.error_code(),
            ExportError::Database(_) => "DATABASE_ERROR",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_url_names_the_variable() {
        let err = ExportError::MissingUrl;
        assert!(err
            .to_string()
            .contains("INTERNAL_APPLICATION_GOOGLE_SCRIPT_URL"));
        assert_eq!(err.error_code(), "EXPORT_NOT_CONFIGURED");
    }
}
