use sea_orm::entity::prelude::*;
use sea_orm::{ActiveValue, Set};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub email: String,
    pub name: String,
    pub role: String,
    pub farm_id: Option<i32>,
    pub approved: bool,
    #[serde(skip_serializing)]
    pub password_hash: Option<String>,
    #[serde(skip_serializing)]
    pub invite_token_hash: Option<String>,
    pub created_at: ChronoDateTimeUtc,
    pub updated_at: ChronoDateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::farms::Entity",
        from = "Column::FarmId",
        to = "super::farms::Column::Id",
        on_delete = "SetNull"
    )]
    Farm,
}

impl Related<super::farms::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Farm.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Roles a user can hold on their farm
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserRole {
    Owner,
    Member,
    Admin,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Owner => "owner",
            UserRole::Member => "member",
            UserRole::Admin => "admin",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "owner" => Some(UserRole::Owner),
            "member" => Some(UserRole::Member),
            "admin" => Some(UserRole::Admin),
            _ => None,
        }
    }

    /// Owners and admins may invite colleagues
    pub fn can_invite(&self) -> bool {
        matches!(self, UserRole::Owner | UserRole::Admin)
    }
}

impl ActiveModel {
    pub fn new(email: impl Into<String>, name: impl Into<String>, role: UserRole) -> Self {
        let now = chrono::Utc::now();
        Self {
            id: ActiveValue::NotSet,
            email: Set(email.into()),
            name: Set(name.into()),
            role: Set(role.as_str().to_string()),
            farm_id: Set(None),
            approved: Set(false),
            password_hash: Set(None),
            invite_token_hash: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        }
    }

    pub fn set_updated_at(mut self) -> Self {
        self.updated_at = Set(chrono::Utc::now());
        self
    }
}
