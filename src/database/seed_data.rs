use anyhow::Result;
use chrono::Utc;
use sea_orm::*;
use tracing::info;

use crate::database::entities::users::UserRole;
use crate::database::entities::{farm_locations, farms, management_zones, users};
use crate::services::UserService;

pub const DEMO_FARM_NAME: &str = "Demo Valley Farm";

/// What the seed created; the owner signs in by redeeming `invitation_token`
#[derive(Debug, Clone)]
pub struct SeedSummary {
    pub farm_id: i32,
    pub owner_id: i32,
    pub invitation_token: Option<String>,
}

/// Create a demo farm with an owner for local development
///
/// Does nothing if the demo farm already exists.
pub async fn create_demo_farm(db: &DatabaseConnection, owner_email: &str) -> Result<SeedSummary> {
    let existing = farms::Entity::find()
        .filter(farms::Column::Name.eq(DEMO_FARM_NAME))
        .one(db)
        .await?;
    if let Some(farm) = existing {
        info!(farm_id = farm.id, "Demo farm already exists, skipping seed data creation");
        let owner = users::Entity::find()
            .filter(users::Column::FarmId.eq(farm.id))
            .filter(users::Column::Role.eq(UserRole::Owner.as_str()))
            .one(db)
            .await?;
        return Ok(SeedSummary {
            farm_id: farm.id,
            owner_id: owner.map(|o| o.id).unwrap_or_default(),
            invitation_token: None,
        });
    }

    info!("Creating demo farm");
    let mut farm = farms::ActiveModel::new(DEMO_FARM_NAME);
    farm.legal_name = Set(Some("Demo Valley Farm LLC".to_string()));
    farm.business_structure = Set(Some("llc".to_string()));
    farm.phone = Set(Some("+1 555 010 2000".to_string()));
    let farm = farm.insert(db).await?;

    let now = Utc::now();
    farm_locations::ActiveModel {
        farm_id: Set(farm.id),
        street: Set("1200 River Road".to_string()),
        city: Set("Salem".to_string()),
        state: Set("OR".to_string()),
        zip: Set("97301".to_string()),
        county: Set(Some("Marion".to_string())),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await?;

    for (name, acreage, crop) in [
        ("North field", 40.0, "Winter squash"),
        ("Orchard block", 12.5, "Apples"),
    ] {
        management_zones::ActiveModel {
            farm_id: Set(farm.id),
            name: Set(name.to_string()),
            acreage: Set(Some(acreage)),
            crop: Set(Some(crop.to_string())),
            notes: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(db)
        .await?;
    }

    let token = uuid::Uuid::new_v4().simple().to_string();
    let mut owner = users::ActiveModel::new(owner_email.trim().to_lowercase(), "Demo Owner", UserRole::Owner);
    owner.farm_id = Set(Some(farm.id));
    owner.invite_token_hash = Set(Some(UserService::hash_token(&token)));
    let owner = owner.insert(db).await?;

    info!(farm_id = farm.id, owner_id = owner.id, "Created demo farm");
    Ok(SeedSummary {
        farm_id: farm.id,
        owner_id: owner.id,
        invitation_token: Some(token),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::test_utils::setup_test_db;

    #[tokio::test]
    async fn test_seed_is_idempotent() {
        let db = setup_test_db().await;
        let first = create_demo_farm(&db, "owner@demo.example").await.unwrap();
        assert!(first.invitation_token.is_some());

        let second = create_demo_farm(&db, "owner@demo.example").await.unwrap();
        assert_eq!(second.farm_id, first.farm_id);
        assert_eq!(second.owner_id, first.owner_id);
        assert!(second.invitation_token.is_none());
        assert_eq!(farms::Entity::find().count(&db).await.unwrap(), 1);
    }
}
