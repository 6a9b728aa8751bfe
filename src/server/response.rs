//! JSON error bodies: `{"error": <message or validation tree>, "code": "..."}`

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};

use crate::errors::{AccountError, ApplicationError, AuthError, ExportError, ValidationErrors};

fn error_response(
    status: u16,
    code: &'static str,
    message: String,
    tree: Option<&ValidationErrors>,
) -> Response {
    let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let error = match tree {
        Some(tree) => serde_json::to_value(tree).unwrap_or(Value::String(message)),
        None if status.is_server_error() => {
            tracing::error!(code, "request failed: {}", message);
            Value::String("Internal server error".to_string())
        }
        None => Value::String(message),
    };
    (status, Json(json!({ "error": error, "code": code }))).into_response()
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        error_response(self.http_status_code(), self.error_code(), self.to_string(), None)
    }
}

impl IntoResponse for ApplicationError {
    fn into_response(self) -> Response {
        let retry_after = match &self {
            ApplicationError::ConfirmationPending { remaining_secs } => Some(*remaining_secs),
            _ => None,
        };
        let mut response = error_response(
            self.http_status_code(),
            self.error_code(),
            self.to_string(),
            self.validation_tree(),
        );
        if let Some(remaining_secs) = retry_after {
            if let Ok(value) = remaining_secs.to_string().parse() {
                response
                    .headers_mut()
                    .insert(axum::http::header::RETRY_AFTER, value);
            }
        }
        response
    }
}

impl IntoResponse for AccountError {
    fn into_response(self) -> Response {
        error_response(
            self.http_status_code(),
            self.error_code(),
            self.to_string(),
            self.validation_tree(),
        )
    }
}

impl IntoResponse for ExportError {
    fn into_response(self) -> Response {
        error_response(self.http_status_code(), self.error_code(), self.to_string(), None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            AuthError::AuthenticationRequired.into_response().status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApplicationError::AlreadySubmitted.into_response().status(),
            StatusCode::CONFLICT
        );
        let pending = ApplicationError::ConfirmationPending { remaining_secs: 3 }.into_response();
        assert_eq!(pending.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(pending.headers()[axum::http::header::RETRY_AFTER], "3");
        assert_eq!(
            AccountError::ZoneNotFound(1).into_response().status(),
            StatusCode::NOT_FOUND
        );
    }
}
