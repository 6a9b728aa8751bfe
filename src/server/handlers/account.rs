use axum::{
    extract::{Path, State},
    response::Json,
};

use crate::database::entities::{farm_certificates, management_zones};
use crate::errors::AccountResult;
use crate::server::app::AppState;
use crate::services::{
    ActionResult, CertificateInput, FarmData, GeneralBusinessInput, Identity, ZoneInput,
};

#[utoipa::path(
    get,
    path = "/api/v1/account/farm",
    responses((status = 200, description = "Farm profile, or null without a farm", body = FarmData))
)]
pub async fn get_farm(
    State(state): State<AppState>,
    identity: Identity,
) -> AccountResult<Json<Option<FarmData>>> {
    Ok(Json(state.accounts.get_farm_data(&identity).await?))
}

#[utoipa::path(
    put,
    path = "/api/v1/account/farm",
    request_body = GeneralBusinessInput,
    responses(
        (status = 200, description = "Updated farm profile", body = FarmData),
        (status = 422, description = "Validation failed")
    )
)]
pub async fn save_general_business(
    State(state): State<AppState>,
    identity: Identity,
    Json(payload): Json<GeneralBusinessInput>,
) -> AccountResult<Json<FarmData>> {
    Ok(Json(
        state
            .accounts
            .save_general_business(&identity, &payload)
            .await?,
    ))
}

#[utoipa::path(
    post,
    path = "/api/v1/account/farm/certificates",
    request_body = CertificateInput,
    responses((status = 200, description = "Certificate added", body = Object))
)]
pub async fn add_certificate(
    State(state): State<AppState>,
    identity: Identity,
    Json(payload): Json<CertificateInput>,
) -> AccountResult<Json<farm_certificates::Model>> {
    Ok(Json(state.accounts.add_certificate(&identity, &payload).await?))
}

#[utoipa::path(
    delete,
    path = "/api/v1/account/farm/certificates/{id}",
    params(("id" = i32, Path, description = "Certificate id")),
    responses(
        (status = 200, description = "Certificate removed", body = ActionResult),
        (status = 404, description = "No such certificate on the caller's farm")
    )
)]
pub async fn delete_certificate(
    State(state): State<AppState>,
    identity: Identity,
    Path(id): Path<i32>,
) -> AccountResult<Json<ActionResult>> {
    state.accounts.delete_certificate(&identity, id).await?;
    Ok(Json(ActionResult::ok()))
}

#[utoipa::path(
    get,
    path = "/api/v1/account/management-zones",
    responses((status = 200, description = "Zones of the caller's farm", body = [Object]))
)]
pub async fn list_zones(
    State(state): State<AppState>,
    identity: Identity,
) -> AccountResult<Json<Vec<management_zones::Model>>> {
    Ok(Json(
        state
            .accounts
            .get_account_management_data(&identity)
            .await?,
    ))
}

#[utoipa::path(
    post,
    path = "/api/v1/account/management-zones",
    request_body = ZoneInput,
    responses((status = 200, description = "Zone created", body = Object))
)]
pub async fn create_zone(
    State(state): State<AppState>,
    identity: Identity,
    Json(payload): Json<ZoneInput>,
) -> AccountResult<Json<management_zones::Model>> {
    Ok(Json(state.accounts.create_zone(&identity, &payload).await?))
}

#[utoipa::path(
    put,
    path = "/api/v1/account/management-zones/{id}",
    params(("id" = i32, Path, description = "Zone id")),
    request_body = ZoneInput,
    responses(
        (status = 200, description = "Zone updated", body = Object),
        (status = 404, description = "No such zone on the caller's farm")
    )
)]
pub async fn update_zone(
    State(state): State<AppState>,
    identity: Identity,
    Path(id): Path<i32>,
    Json(payload): Json<ZoneInput>,
) -> AccountResult<Json<management_zones::Model>> {
    Ok(Json(
        state.accounts.update_zone(&identity, id, &payload).await?,
    ))
}
