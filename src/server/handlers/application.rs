use axum::{extract::State, response::Json};
use serde_json::Value;

use crate::application::{ApplicationProgress, FarmInfoInternalApplication};
use crate::errors::ApplicationResult;
use crate::server::app::AppState;
use crate::services::{ActionResult, ConfirmationWindow, Identity, SubmissionReceipt};

#[utoipa::path(
    get,
    path = "/api/v1/application",
    responses(
        (status = 200, description = "Stored answers, or empty answers for the caller's farm", body = Object),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "No farm associated with the caller")
    )
)]
pub async fn get_application(
    State(state): State<AppState>,
    identity: Identity,
) -> ApplicationResult<Json<FarmInfoInternalApplication>> {
    Ok(Json(state.applications.get_application(&identity).await?))
}

#[utoipa::path(
    put,
    path = "/api/v1/application",
    request_body(content = Object, description = "Farm-information answers; farmId is required"),
    responses(
        (status = 200, description = "Saved", body = ActionResult),
        (status = 409, description = "Application already submitted"),
        (status = 422, description = "Validation failed; error holds the field tree")
    )
)]
pub async fn save_application(
    State(state): State<AppState>,
    identity: Identity,
    Json(payload): Json<Value>,
) -> ApplicationResult<Json<ActionResult>> {
    state
        .applications
        .save_application(&identity, &payload)
        .await?;
    Ok(Json(ActionResult::ok()))
}

#[utoipa::path(
    get,
    path = "/api/v1/application/progress",
    responses((status = 200, description = "Tab completeness", body = ApplicationProgress))
)]
pub async fn get_progress(
    State(state): State<AppState>,
    identity: Identity,
) -> ApplicationResult<Json<ApplicationProgress>> {
    Ok(Json(state.applications.progress(&identity).await?))
}

#[utoipa::path(
    post,
    path = "/api/v1/application/confirmation",
    responses(
        (status = 200, description = "Confirmation opened", body = ConfirmationWindow),
        (status = 400, description = "Earlier tabs are incomplete"),
        (status = 409, description = "Already submitted")
    )
)]
pub async fn open_confirmation(
    State(state): State<AppState>,
    identity: Identity,
) -> ApplicationResult<Json<ConfirmationWindow>> {
    Ok(Json(state.applications.open_confirmation(&identity).await?))
}

#[utoipa::path(
    delete,
    path = "/api/v1/application/confirmation",
    responses((status = 200, description = "Confirmation closed", body = ActionResult))
)]
pub async fn cancel_confirmation(
    State(state): State<AppState>,
    identity: Identity,
) -> ApplicationResult<Json<ActionResult>> {
    state.applications.cancel_confirmation(&identity)?;
    Ok(Json(ActionResult::ok()))
}

#[utoipa::path(
    post,
    path = "/api/v1/application/submit",
    responses(
        (status = 200, description = "Submitted", body = SubmissionReceipt),
        (status = 409, description = "Not confirmed or already submitted"),
        (status = 429, description = "Confirmation wait has not elapsed")
    )
)]
pub async fn submit_application(
    State(state): State<AppState>,
    identity: Identity,
) -> ApplicationResult<Json<SubmissionReceipt>> {
    Ok(Json(state.applications.submit(&identity).await?))
}

/// Always 200; failures are reported in `error`
#[utoipa::path(
    post,
    path = "/api/v1/application/export",
    responses((status = 200, description = "Export outcome", body = ActionResult))
)]
pub async fn export_application(
    State(state): State<AppState>,
    identity: Identity,
) -> Json<ActionResult> {
    Json(
        state
            .exporter
            .send_application_to_google_sheets(&identity)
            .await,
    )
}
