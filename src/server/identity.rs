use axum::{async_trait, extract::FromRequestParts, http::request::Parts};

use crate::errors::AuthError;
use crate::server::app::AppState;
use crate::services::Identity;

/// Resolves the caller from the upstream identity header
///
/// Handlers taking an `Identity` reject missing or unknown users with 401.
#[async_trait]
impl FromRequestParts<AppState> for Identity {
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let raw = parts
            .headers
            .get(state.identity_header.as_str())
            .and_then(|value| value.to_str().ok());
        state.authorization.resolve(raw).await
    }
}
