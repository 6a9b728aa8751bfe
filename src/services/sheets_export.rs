//! Back-office spreadsheet export
//!
//! Posts a farm's latest stored application, flattened into one row, to a
//! Google Apps Script endpoint. Failures are reported to the caller but never
//! touch the application itself.

use chrono::Utc;
use serde::Serialize;
use serde_json::json;
use tracing::{info, warn};
use utoipa::ToSchema;

use crate::config::AppConfig;
use crate::errors::{ApplicationError, ExportError, ExportResult};
use crate::services::{ApplicationService, Identity};

/// Outcome of a form action as the UI reads it: `{ "error": null }` on success
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct ActionResult {
    pub error: Option<String>,
}

impl ActionResult {
    pub fn ok() -> Self {
        Self { error: None }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            error: Some(message.into()),
        }
    }
}

#[derive(Clone)]
pub struct SheetsExporter {
    client: reqwest::Client,
    url: Option<Result<url::Url, url::ParseError>>,
    applications: ApplicationService,
}

impl SheetsExporter {
    pub fn new(config: &AppConfig, applications: ApplicationService) -> ExportResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()?;
        Ok(Self {
            client,
            url: config.export_url(),
            applications,
        })
    }

    /// Send the caller's latest application, reducing any failure to a message
    pub async fn send_application_to_google_sheets(&self, identity: &Identity) -> ActionResult {
        match self.export(identity).await {
            Ok(()) => ActionResult::ok(),
            Err(err) => {
                warn!(
                    user_id = identity.id,
                    farm_id = ?identity.farm_id,
                    code = err.error_code(),
                    "spreadsheet export failed: {}",
                    err
                );
                ActionResult::failed(err.to_string())
            }
        }
    }

    pub async fn export(&self, identity: &Identity) -> ExportResult<()> {
        let farm_id = identity.require_farm()?;
        let url = self.endpoint()?;

        let record = self
            .applications
            .find_for_farm(farm_id)
            .await
            .map_err(|err| match err {
                ApplicationError::Database(db) => ExportError::Database(db),
                other => ExportError::Corrupt(other.to_string()),
            })?
            .ok_or(ExportError::NoApplication(farm_id))?;

        let payload = json!({
            "farmId": farm_id,
            "exportedAt": Utc::now(),
            "row": record.to_row(),
        });

        let response = self.client.post(url).json(&payload).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ExportError::UpstreamStatus(status.as_u16()));
        }

        info!(farm_id, user_id = identity.id, "exported application to spreadsheet");
        Ok(())
    }

    fn endpoint(&self) -> ExportResult<url::Url> {
        match &self.url {
            None => Err(ExportError::MissingUrl),
            Some(Ok(url)) => Ok(url.clone()),
            Some(Err(err)) => Err(ExportError::InvalidUrl(err.to_string())),
        }
    }
}
