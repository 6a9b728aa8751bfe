//! Spreadsheet and CSV exports

mod common;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use farm_portal::config::AppConfig;
use farm_portal::errors::ExportError;
use farm_portal::services::{write_applications_csv, ApplicationService, SheetsExporter};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tokio::sync::Mutex;

use common::*;

type Captured = Arc<Mutex<Vec<Value>>>;

/// Spawn a stand-in for the Apps Script endpoint answering with `status`
async fn spawn_sheet_endpoint(status: StatusCode) -> Result<(String, Captured)> {
    let captured: Captured = Arc::default();
    let app = Router::new()
        .route(
            "/exec",
            post(
                move |State(captured): State<Captured>, Json(body): Json<Value>| async move {
                    captured.lock().await.push(body);
                    status
                },
            ),
        )
        .with_state(captured.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    Ok((format!("http://{}/exec", addr), captured))
}

fn config_with_url(url: Option<&str>) -> AppConfig {
    AppConfig {
        google_script_url: url.map(str::to_string),
        request_timeout_secs: 5,
        ..AppConfig::default()
    }
}

#[tokio::test]
async fn test_export_posts_flattened_row() -> Result<()> {
    let db = setup_db().await?;
    let (farm, owner) = farm_owner(&db, "Sheet Farm").await?;
    let applications = ApplicationService::new(db, Duration::from_secs(5));
    applications
        .save_application(&owner, &json!({ "farmId": farm.id, "mainCrops": "Hops" }))
        .await?;

    let (url, captured) = spawn_sheet_endpoint(StatusCode::OK).await?;
    let exporter = SheetsExporter::new(&config_with_url(Some(&url)), applications)?;

    let result = exporter.send_application_to_google_sheets(&owner).await;
    assert_eq!(result.error, None);

    let bodies = captured.lock().await;
    assert_eq!(bodies.len(), 1);
    assert_eq!(bodies[0]["farmId"], farm.id);
    assert_eq!(bodies[0]["row"]["mainCrops"], "Hops");
    assert!(bodies[0]["exportedAt"].is_string());
    Ok(())
}

#[tokio::test]
async fn test_export_without_url_returns_error() -> Result<()> {
    let db = setup_db().await?;
    let (farm, owner) = farm_owner(&db, "Unconfigured Farm").await?;
    let applications = ApplicationService::new(db, Duration::from_secs(5));
    applications
        .save_application(&owner, &json!({ "farmId": farm.id }))
        .await?;
    let exporter = SheetsExporter::new(&config_with_url(None), applications)?;

    let result = exporter.send_application_to_google_sheets(&owner).await;
    assert!(result.error.is_some());
    assert!(matches!(
        exporter.export(&owner).await,
        Err(ExportError::MissingUrl)
    ));
    Ok(())
}

#[tokio::test]
async fn test_export_reports_upstream_failure() -> Result<()> {
    let db = setup_db().await?;
    let (farm, owner) = farm_owner(&db, "Flaky Farm").await?;
    let applications = ApplicationService::new(db.clone(), Duration::from_secs(5));
    applications
        .save_application(&owner, &json!({ "farmId": farm.id }))
        .await?;

    let (url, _captured) = spawn_sheet_endpoint(StatusCode::INTERNAL_SERVER_ERROR).await?;
    let exporter = SheetsExporter::new(&config_with_url(Some(&url)), applications.clone())?;

    assert!(matches!(
        exporter.export(&owner).await,
        Err(ExportError::UpstreamStatus(500))
    ));
    // the stored application is untouched by a failed export
    let stored = applications.get_application(&owner).await?;
    assert_eq!(stored.farm_id, farm.id);
    Ok(())
}

#[tokio::test]
async fn test_export_without_saved_application() -> Result<()> {
    let db = setup_db().await?;
    let (farm, owner) = farm_owner(&db, "Blank Farm").await?;
    let applications = ApplicationService::new(db, Duration::from_secs(5));
    let exporter = SheetsExporter::new(
        &config_with_url(Some("http://127.0.0.1:9/exec")),
        applications,
    )?;

    assert!(matches!(
        exporter.export(&owner).await,
        Err(ExportError::NoApplication(id)) if id == farm.id
    ));
    Ok(())
}

#[tokio::test]
async fn test_invalid_url_is_reported() -> Result<()> {
    let db = setup_db().await?;
    let (_farm, owner) = farm_owner(&db, "Typo Farm").await?;
    let applications = ApplicationService::new(db, Duration::from_secs(5));
    let exporter = SheetsExporter::new(&config_with_url(Some("not a url")), applications)?;

    let result = exporter.send_application_to_google_sheets(&owner).await;
    assert!(result.error.is_some());
    assert!(matches!(
        exporter.export(&owner).await,
        Err(ExportError::InvalidUrl(_))
    ));
    Ok(())
}

#[tokio::test]
async fn test_csv_export_writes_file() -> Result<()> {
    let db = setup_db().await?;
    let (farm, owner) = farm_owner(&db, "Csv Farm").await?;
    let applications = ApplicationService::new(db, Duration::from_secs(5));
    applications
        .save_application(&owner, &complete_answers(farm.id))
        .await?;

    let records = applications.all_applications().await?;
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("applications.csv");
    let written = write_applications_csv(&records, std::fs::File::create(&path)?)?;
    assert_eq!(written, 1);

    let content = std::fs::read_to_string(&path)?;
    let mut reader = csv::Reader::from_reader(content.as_bytes());
    let headers = reader.headers()?.clone();
    let row = reader.records().next().expect("one row")?;
    let main_crops = headers
        .iter()
        .position(|h| h == "mainCrops")
        .expect("mainCrops column");
    assert_eq!(&row[main_crops], "Pears, cherries");
    Ok(())
}
