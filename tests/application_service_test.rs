//! Saving, progress and submission of the internal application

mod common;

use std::time::Duration;

use anyhow::Result;
use farm_portal::application::{AutosaveSession, FieldEdit, WaterSource, YesNo};
use farm_portal::database::entities::{farm_internal_applications, farms};
use farm_portal::database::entities::users::UserRole;
use farm_portal::errors::{ApplicationError, AuthError};
use farm_portal::services::{ApplicationService, Identity};
use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter};
use serde_json::json;

use common::*;

#[tokio::test]
async fn test_empty_form_creates_default_row() -> Result<()> {
    let db = setup_db().await?;
    let (farm, owner) = farm_owner(&db, "Empty Acres").await?;
    let service = ApplicationService::new(db.clone(), Duration::from_secs(5));

    service
        .save_application(&owner, &json!({ "farmId": farm.id }))
        .await?;

    let rows = farm_internal_applications::Entity::find().all(&db).await?;
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].farm_id, farm.id);
    assert_eq!(rows[0].main_crops, "");
    assert_eq!(rows[0].to_record()?.wild_areas, YesNo::Unanswered);
    Ok(())
}

#[tokio::test]
async fn test_second_save_updates_same_row() -> Result<()> {
    let db = setup_db().await?;
    let (farm, owner) = farm_owner(&db, "Upsert Farm").await?;
    let service = ApplicationService::new(db.clone(), Duration::from_secs(5));

    service
        .save_application(&owner, &json!({ "farmId": farm.id, "mainCrops": "Kale" }))
        .await?;
    let first = farm_internal_applications::Entity::find().one(&db).await?.unwrap();

    service
        .save_application(&owner, &json!({ "farmId": farm.id, "mainCrops": "Kale, leeks" }))
        .await?;
    let rows = farm_internal_applications::Entity::find().all(&db).await?;

    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].id, first.id);
    assert_eq!(rows[0].main_crops, "Kale, leeks");
    assert!(rows[0].updated_at >= first.updated_at);
    Ok(())
}

#[tokio::test]
async fn test_concurrent_first_saves_leave_one_row() -> Result<()> {
    let db = setup_db().await?;
    let (farm, owner) = farm_owner(&db, "Race Farm").await?;
    let service = ApplicationService::new(db.clone(), Duration::from_secs(5));

    let saves = (0..8).map(|i| {
        let service = service.clone();
        let owner = owner.clone();
        let payload = json!({ "farmId": farm.id, "yearsFarming": i });
        tokio::spawn(async move { service.save_application(&owner, &payload).await })
    });
    for save in saves {
        save.await??;
    }

    let count = farm_internal_applications::Entity::find().count(&db).await?;
    assert_eq!(count, 1);
    Ok(())
}

#[tokio::test]
async fn test_invalid_payload_writes_nothing() -> Result<()> {
    let db = setup_db().await?;
    let (_farm, owner) = farm_owner(&db, "Strict Farm").await?;
    let service = ApplicationService::new(db.clone(), Duration::from_secs(5));

    let err = service
        .save_application(&owner, &json!({ "mainCrops": "Beans" }))
        .await
        .unwrap_err();

    let tree = err.validation_tree().expect("validation error");
    assert_eq!(tree.field_messages("farmId"), vec!["is required".to_string()]);
    assert_eq!(
        farm_internal_applications::Entity::find().count(&db).await?,
        0
    );
    Ok(())
}

#[tokio::test]
async fn test_nested_answer_round_trips_through_storage() -> Result<()> {
    let db = setup_db().await?;
    let (farm, owner) = farm_owner(&db, "Round Trip Farm").await?;
    let service = ApplicationService::new(db, Duration::from_secs(5));

    service
        .save_application(
            &owner,
            &json!({
                "farmId": farm.id,
                "nearContaminationSource": { "no": false, "yes": { "isYes": true, "description": "X" } }
            }),
        )
        .await?;

    let loaded = service.get_application(&owner).await?;
    assert_eq!(loaded.near_contamination_source, YesNo::Yes("X".to_string()));
    assert_eq!(
        loaded.to_json()["nearContaminationSource"],
        json!({ "no": false, "yes": { "isYes": true, "description": "X" } })
    );
    Ok(())
}

#[tokio::test]
async fn test_caller_without_farm_is_rejected() -> Result<()> {
    let db = setup_db().await?;
    let farm = create_farm(&db, "Someone Else's Farm").await?;
    let user = create_user(&db, "drifter@example.com", None, UserRole::Member).await?;
    let service = ApplicationService::new(db, Duration::from_secs(5));

    let err = service
        .save_application(&Identity::from_user(&user), &json!({ "farmId": farm.id }))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ApplicationError::Auth(AuthError::NoFarmAssociation)
    ));
    Ok(())
}

#[tokio::test]
async fn test_cannot_save_for_another_farm() -> Result<()> {
    let db = setup_db().await?;
    let (_mine, owner) = farm_owner(&db, "Mine").await?;
    let theirs = create_farm(&db, "Theirs").await?;
    let service = ApplicationService::new(db, Duration::from_secs(5));

    let err = service
        .save_application(&owner, &json!({ "farmId": theirs.id }))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ApplicationError::Auth(AuthError::PermissionDenied(_))
    ));
    Ok(())
}

#[tokio::test]
async fn test_submission_requires_wait_and_happens_once() -> Result<()> {
    let db = setup_db().await?;
    let (farm, owner) = farm_owner(&db, "Submit Farm").await?;
    complete_general_business(&db, &farm).await?;

    let waiting = ApplicationService::new(db.clone(), Duration::from_secs(5));
    waiting
        .save_application(&owner, &complete_answers(farm.id))
        .await?;
    assert!(waiting.progress(&owner).await?.can_submit);

    waiting.open_confirmation(&owner).await?;
    assert!(matches!(
        waiting.submit(&owner).await,
        Err(ApplicationError::ConfirmationPending { .. })
    ));

    let immediate = ApplicationService::new(db.clone(), Duration::ZERO);
    immediate.open_confirmation(&owner).await?;
    let receipt = immediate.submit(&owner).await?;
    assert_eq!(receipt.farm_id, farm.id);

    let stored = farms::Entity::find_by_id(farm.id).one(&db).await?.unwrap();
    assert!(stored.application_submitted_at.is_some());
    assert!(stored.terms_accepted_at.is_some());

    assert!(matches!(
        immediate.submit(&owner).await,
        Err(ApplicationError::AlreadySubmitted)
    ));
    assert!(matches!(
        immediate.open_confirmation(&owner).await,
        Err(ApplicationError::AlreadySubmitted)
    ));
    assert!(matches!(
        immediate
            .save_application(&owner, &json!({ "farmId": farm.id }))
            .await,
        Err(ApplicationError::AlreadySubmitted)
    ));
    Ok(())
}

#[tokio::test]
async fn test_incomplete_application_cannot_open_confirmation() -> Result<()> {
    let db = setup_db().await?;
    let (farm, owner) = farm_owner(&db, "Half Done Farm").await?;
    let service = ApplicationService::new(db, Duration::ZERO);
    service
        .save_application(&owner, &json!({ "farmId": farm.id, "totalAcreage": 4 }))
        .await?;

    match service.open_confirmation(&owner).await {
        Err(ApplicationError::NotReady { missing }) => {
            assert!(missing.contains(&"generalBusiness.location".to_string()));
            assert!(missing.contains(&"farmInformation.mainCrops".to_string()));
            assert!(!missing.contains(&"farmInformation.totalAcreage".to_string()));
        }
        other => panic!("unexpected result: {:?}", other),
    }
    Ok(())
}

#[tokio::test]
async fn test_autosave_session_persists_through_service() -> Result<()> {
    let db = setup_db().await?;
    let (farm, owner) = farm_owner(&db, "Autosave Farm").await?;
    let service = ApplicationService::new(db.clone(), Duration::from_secs(5));

    let initial = service.get_application(&owner).await?;
    let session = AutosaveSession::start(
        initial,
        service.sink_for(owner.clone()),
        Duration::from_millis(20),
    );
    session
        .apply(FieldEdit::new("waterSource", json!({ "well": true })))
        .await?;
    session.close().await?;

    let stored = service.get_application(&owner).await?;
    assert_eq!(stored.farm_id, farm.id);
    assert_eq!(stored.water_source, WaterSource::Well);
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_no_save_lands_after_submission() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let db = setup_file_db(&dir.path().join("portal.db")).await?;
    let (farm, owner) = farm_owner(&db, "Busy Farm").await?;
    complete_general_business(&db, &farm).await?;

    let service = ApplicationService::new(db.clone(), Duration::ZERO);
    service
        .save_application(&owner, &complete_answers(farm.id))
        .await?;
    service.open_confirmation(&owner).await?;

    let farm_id = farm.id;
    let writers: Vec<_> = (0..6)
        .map(|writer| {
            let service = service.clone();
            let owner = owner.clone();
            tokio::spawn(async move {
                let mut rejected = false;
                for edit in 0..40 {
                    let mut payload = complete_answers(farm_id);
                    payload["mainCrops"] = json!(format!("writer {} edit {}", writer, edit));
                    match service.save_application(&owner, &payload).await {
                        Ok(_) => assert!(!rejected, "save accepted after a rejected one"),
                        Err(ApplicationError::AlreadySubmitted) => rejected = true,
                        Err(other) => return Err(other),
                    }
                }
                Ok::<bool, ApplicationError>(rejected)
            })
        })
        .collect();

    tokio::time::sleep(Duration::from_millis(5)).await;
    let receipt = service.submit(&owner).await?;
    for writer in writers {
        writer.await??;
    }

    let row = farm_internal_applications::Entity::find()
        .filter(farm_internal_applications::Column::FarmId.eq(farm.id))
        .one(&db)
        .await?
        .expect("application row");
    let stored = farms::Entity::find_by_id(farm.id).one(&db).await?.unwrap();
    let submitted_at = stored
        .application_submitted_at
        .expect("submission stamped");
    assert!(row.updated_at <= submitted_at);
    assert!(row.to_record()?.is_complete());
    assert_eq!(receipt.farm_id, farm.id);
    assert!(matches!(
        service
            .save_application(&owner, &complete_answers(farm.id))
            .await,
        Err(ApplicationError::AlreadySubmitted)
    ));
    Ok(())
}
