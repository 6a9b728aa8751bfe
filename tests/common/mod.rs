#![allow(dead_code)]

use anyhow::Result;
use chrono::Utc;
use farm_portal::database::entities::users::UserRole;
use farm_portal::database::entities::{farm_locations, farms, users};
use farm_portal::database::{establish_connection, get_database_url};
use farm_portal::database::migrations::Migrator;
use farm_portal::services::Identity;
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set};
use sea_orm_migration::MigratorTrait;
use serde_json::{json, Value};

pub async fn setup_db() -> Result<DatabaseConnection> {
    let db = establish_connection("sqlite::memory:").await?;
    Migrator::up(&db, None).await?;
    Ok(db)
}

/// A migrated database file with a full connection pool
pub async fn setup_file_db(path: &std::path::Path) -> Result<DatabaseConnection> {
    let db = establish_connection(&get_database_url(Some(&path.to_string_lossy()))).await?;
    Migrator::up(&db, None).await?;
    Ok(db)
}

pub async fn create_farm(db: &DatabaseConnection, name: &str) -> Result<farms::Model> {
    Ok(farms::ActiveModel::new(name).insert(db).await?)
}

pub async fn create_user(
    db: &DatabaseConnection,
    email: &str,
    farm_id: Option<i32>,
    role: UserRole,
) -> Result<users::Model> {
    let mut user = users::ActiveModel::new(email, "Test Grower", role);
    user.farm_id = Set(farm_id);
    user.approved = Set(true);
    Ok(user.insert(db).await?)
}

/// A farm with an approved owner
pub async fn farm_owner(db: &DatabaseConnection, name: &str) -> Result<(farms::Model, Identity)> {
    let farm = create_farm(db, name).await?;
    let email = format!("owner{}@farm.example", farm.id);
    let user = create_user(db, &email, Some(farm.id), UserRole::Owner).await?;
    Ok((farm, Identity::from_user(&user)))
}

/// Fill in every general-business field and the location
pub async fn complete_general_business(db: &DatabaseConnection, farm: &farms::Model) -> Result<()> {
    let mut active: farms::ActiveModel = farm.clone().into();
    active.legal_name = Set(Some(format!("{} LLC", farm.name)));
    active.business_structure = Set(Some("llc".to_string()));
    active.phone = Set(Some("+1 555 010 2000".to_string()));
    active.update(db).await?;

    let now = Utc::now();
    farm_locations::ActiveModel {
        farm_id: Set(farm.id),
        street: Set("1 Orchard Lane".to_string()),
        city: Set("Hood River".to_string()),
        state: Set("OR".to_string()),
        zip: Set("97031".to_string()),
        county: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await?;
    Ok(())
}

fn yes(description: &str) -> Value {
    json!({ "no": false, "yes": { "isYes": true, "description": description } })
}

fn no() -> Value {
    json!({ "no": true, "yes": { "isYes": false, "description": "" } })
}

/// A fully answered farm-information payload
pub fn complete_answers(farm_id: i32) -> Value {
    json!({
        "farmId": farm_id,
        "totalAcreage": 80,
        "acresInProduction": 60.5,
        "grossIncome": 250000,
        "yearsFarming": 12,
        "mainCrops": "Pears, cherries",
        "fieldHistory": "Orchard since 1998",
        "nearContaminationSource": yes("Highway 35 on the east boundary"),
        "wildAreas": no(),
        "ownBranding": yes("Sold under Lane Orchards label"),
        "splitOperation": no(),
        "bufferZones": yes("30ft hedgerow"),
        "sharedEquipment": no(),
        "livestockOnFarm": no(),
        "prohibitedSubstances": no(),
        "gmoNeighbors": no(),
        "soilTesting": yes("Every spring"),
        "greenhouseProduction": no(),
        "previousCertification": no(),
        "certificationDenied": no(),
        "sewageSludgeApplied": no(),
        "waterSource": { "well": true },
        "irrigationMethod": { "drip": true },
        "pestControl": { "biological": { "isBiological": true, "description": "Predatory mites" } },
        "seedSource": { "certifiedOrganic": true },
        "fertilitySource": { "compost": true },
        "postHarvestHandling": { "onFarm": { "isOnFarm": true, "description": "Cold storage" } },
        "recordKeeping": { "digital": true }
    })
}
