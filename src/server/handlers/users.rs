use axum::{extract::State, response::Json};

use crate::errors::AuthResult;
use crate::server::app::AppState;
use crate::services::{
    AcceptInvitationInput, ActionResult, Identity, Invitation, InviteInput, PasswordUpdateInput,
    UserData,
};

#[utoipa::path(
    get,
    path = "/api/v1/account/user",
    responses((status = 200, description = "Caller and colleagues", body = UserData))
)]
pub async fn get_user(
    State(state): State<AppState>,
    identity: Identity,
) -> AuthResult<Json<UserData>> {
    Ok(Json(state.users.get_user_data(&identity).await?))
}

#[utoipa::path(
    post,
    path = "/api/v1/account/users/invite",
    request_body = InviteInput,
    responses(
        (status = 200, description = "Invitation created; the token is shown once", body = Invitation),
        (status = 403, description = "Caller may not invite"),
        (status = 409, description = "Email already registered")
    )
)]
pub async fn invite_user(
    State(state): State<AppState>,
    identity: Identity,
    Json(payload): Json<InviteInput>,
) -> AuthResult<Json<Invitation>> {
    Ok(Json(state.users.invite_user(&identity, &payload).await?))
}

#[utoipa::path(
    post,
    path = "/api/v1/invitations/accept",
    request_body = AcceptInvitationInput,
    responses(
        (status = 200, description = "Invitation redeemed", body = Identity),
        (status = 400, description = "Unknown token or weak password")
    )
)]
pub async fn accept_invitation(
    State(state): State<AppState>,
    Json(payload): Json<AcceptInvitationInput>,
) -> AuthResult<Json<Identity>> {
    Ok(Json(state.users.accept_invitation(&payload).await?))
}

#[utoipa::path(
    put,
    path = "/api/v1/account/security/password",
    request_body = PasswordUpdateInput,
    responses(
        (status = 200, description = "Password changed", body = ActionResult),
        (status = 401, description = "Current password did not verify")
    )
)]
pub async fn update_password(
    State(state): State<AppState>,
    identity: Identity,
    Json(payload): Json<PasswordUpdateInput>,
) -> AuthResult<Json<ActionResult>> {
    state.users.update_password(&identity, &payload).await?;
    Ok(Json(ActionResult::ok()))
}
