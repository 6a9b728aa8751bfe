use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    http::HeaderValue,
    response::Json,
    routing::{delete, get, post, put},
    Router,
};
use sea_orm::DatabaseConnection;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

use super::handlers::{account, application, health, users};
use crate::config::AppConfig;
use crate::services::{
    AccountService, ApplicationService, AuthorizationService, SheetsExporter, UserService,
};

#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub config: Arc<AppConfig>,
    pub identity_header: String,
    pub authorization: AuthorizationService,
    pub applications: ApplicationService,
    pub accounts: AccountService,
    pub users: UserService,
    pub exporter: SheetsExporter,
}

impl AppState {
    pub fn new(db: DatabaseConnection, config: AppConfig) -> Result<Self> {
        let applications = ApplicationService::new(db.clone(), config.confirmation_wait());
        let exporter = SheetsExporter::new(&config, applications.clone())
            .context("Failed to build export client")?;
        Ok(Self {
            identity_header: config.identity_header.to_ascii_lowercase(),
            authorization: AuthorizationService::new(db.clone()),
            accounts: AccountService::new(db.clone()),
            users: UserService::new(db.clone()),
            applications,
            exporter,
            config: Arc::new(config),
            db,
        })
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        account::get_farm,
        account::save_general_business,
        account::add_certificate,
        account::delete_certificate,
        account::list_zones,
        account::create_zone,
        account::update_zone,
        users::get_user,
        users::invite_user,
        users::accept_invitation,
        users::update_password,
        application::get_application,
        application::save_application,
        application::get_progress,
        application::open_confirmation,
        application::cancel_confirmation,
        application::submit_application,
        application::export_application,
    ),
    components(schemas(
        crate::application::ApplicationProgress,
        crate::services::ActionResult,
        crate::services::ConfirmationWindow,
        crate::services::SubmissionReceipt,
        crate::services::FarmData,
        crate::services::GeneralBusinessInput,
        crate::services::LocationInput,
        crate::services::CertificateInput,
        crate::services::ZoneInput,
        crate::services::UserData,
        crate::services::InviteInput,
        crate::services::Invitation,
        crate::services::AcceptInvitationInput,
        crate::services::PasswordUpdateInput,
        crate::services::Identity,
    )),
    tags((name = "farm-portal", description = "Account area and farm application API"))
)]
pub struct ApiDoc;

pub async fn create_app(state: AppState, cors_origin: Option<&str>) -> Result<Router> {
    let cors = match cors_origin {
        Some(origin) => CorsLayer::new()
            .allow_origin(
                origin
                    .parse::<HeaderValue>()
                    .with_context(|| format!("Invalid CORS origin: {}", origin))?,
            )
            .allow_methods(Any)
            .allow_headers(Any),
        None => CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any),
    };

    let app = Router::new()
        .route("/health", get(health::health_check))
        .route("/api-docs/openapi.json", get(openapi_json))
        .nest("/api/v1", api_v1_routes())
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state);

    Ok(app)
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

fn api_v1_routes() -> Router<AppState> {
    Router::new()
        // Account area
        .route(
            "/account/farm",
            get(account::get_farm).put(account::save_general_business),
        )
        .route("/account/farm/certificates", post(account::add_certificate))
        .route(
            "/account/farm/certificates/:id",
            delete(account::delete_certificate),
        )
        .route("/account/user", get(users::get_user))
        .route(
            "/account/management-zones",
            get(account::list_zones).post(account::create_zone),
        )
        .route("/account/management-zones/:id", put(account::update_zone))
        .route("/account/users/invite", post(users::invite_user))
        .route("/account/security/password", put(users::update_password))
        .route("/invitations/accept", post(users::accept_invitation))
        // Apply flow
        .route(
            "/application",
            get(application::get_application).put(application::save_application),
        )
        .route("/application/progress", get(application::get_progress))
        .route(
            "/application/confirmation",
            post(application::open_confirmation).delete(application::cancel_confirmation),
        )
        .route("/application/submit", post(application::submit_application))
        .route("/application/export", post(application::export_application))
}
