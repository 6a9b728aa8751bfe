use bcrypt::{hash, verify, DEFAULT_COST};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::info;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::database::entities::users::{self, UserRole};
use crate::errors::{AuthError, AuthResult};
use crate::services::{Identity, ValidationService};

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserData {
    #[schema(value_type = Object)]
    pub user: users::Model,
    /// Other users on the same farm
    #[schema(value_type = Vec<Object>)]
    pub colleagues: Vec<users::Model>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InviteInput {
    pub email: String,
    pub name: String,
}

/// The raw token is only ever returned here
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Invitation {
    pub user_id: i32,
    pub email: String,
    pub token: String,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AcceptInvitationInput {
    pub token: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PasswordUpdateInput {
    pub current_password: Option<String>,
    pub new_password: String,
}

/// Colleagues, invitations and passwords
#[derive(Clone, Debug)]
pub struct UserService {
    db: DatabaseConnection,
    bcrypt_cost: u32,
}

impl UserService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            db,
            bcrypt_cost: DEFAULT_COST,
        }
    }

    /// Lower hashing cost for tests
    pub fn with_bcrypt_cost(mut self, cost: u32) -> Self {
        self.bcrypt_cost = cost;
        self
    }

    pub fn hash_password(&self, password: &str) -> AuthResult<String> {
        ValidationService::password(password)?;
        Ok(hash(password, self.bcrypt_cost)?)
    }

    pub fn hash_token(token: &str) -> String {
        format!("{:x}", Sha256::digest(token.as_bytes()))
    }

    pub async fn get_user_data(&self, identity: &Identity) -> AuthResult<UserData> {
        let user = users::Entity::find_by_id(identity.id)
            .one(&self.db)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        let colleagues = match user.farm_id {
            Some(farm_id) => {
                users::Entity::find()
                    .filter(users::Column::FarmId.eq(farm_id))
                    .filter(users::Column::Id.ne(user.id))
                    .order_by_asc(users::Column::Name)
                    .all(&self.db)
                    .await?
            }
            None => Vec::new(),
        };

        Ok(UserData { user, colleagues })
    }

    /// Add an unapproved member to the caller's farm
    pub async fn invite_user(
        &self,
        identity: &Identity,
        input: &InviteInput,
    ) -> AuthResult<Invitation> {
        let farm_id = identity.require_inviter()?;
        let email = ValidationService::email(&input.email)?;
        let name = match input.name.trim() {
            "" => email.split('@').next().unwrap_or_default().to_string(),
            name => name.to_string(),
        };

        let existing = users::Entity::find()
            .filter(users::Column::Email.eq(email.as_str()))
            .one(&self.db)
            .await?;
        if existing.is_some() {
            return Err(AuthError::UserAlreadyExists);
        }

        let token = Uuid::new_v4().simple().to_string();
        let mut user = users::ActiveModel::new(email.clone(), name, UserRole::Member);
        user.farm_id = Set(Some(farm_id));
        user.invite_token_hash = Set(Some(Self::hash_token(&token)));
        let user = user.insert(&self.db).await?;

        info!(farm_id, user_id = user.id, invited_by = identity.id, "invited user");
        Ok(Invitation {
            user_id: user.id,
            email,
            token,
        })
    }

    /// Redeem an invitation: set the password and approve the user
    pub async fn accept_invitation(&self, input: &AcceptInvitationInput) -> AuthResult<Identity> {
        let token = input.token.trim();
        if token.is_empty() {
            return Err(AuthError::InvalidInvitation);
        }
        let user = users::Entity::find()
            .filter(users::Column::InviteTokenHash.eq(Self::hash_token(token)))
            .one(&self.db)
            .await?
            .ok_or(AuthError::InvalidInvitation)?;
        let password_hash = self.hash_password(&input.password)?;

        let mut active: users::ActiveModel = user.into();
        active.password_hash = Set(Some(password_hash));
        active.invite_token_hash = Set(None);
        active.approved = Set(true);
        let user = active.set_updated_at().update(&self.db).await?;

        info!(user_id = user.id, "accepted invitation");
        Ok(Identity::from_user(&user))
    }

    /// Replace the caller's password, verifying the current one when set
    pub async fn update_password(
        &self,
        identity: &Identity,
        input: &PasswordUpdateInput,
    ) -> AuthResult<()> {
        let user = users::Entity::find_by_id(identity.id)
            .one(&self.db)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        if let Some(current_hash) = &user.password_hash {
            let current = input
                .current_password
                .as_deref()
                .ok_or(AuthError::InvalidCredentials)?;
            if !verify(current, current_hash)? {
                return Err(AuthError::InvalidCredentials);
            }
        }
        let password_hash = self.hash_password(&input.new_password)?;

        let mut active: users::ActiveModel = user.into();
        active.password_hash = Set(Some(password_hash));
        active.set_updated_at().update(&self.db).await?;

        info!(user_id = identity.id, "updated password");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_hash_is_stable_hex() {
        let hashed = UserService::hash_token("abc");
        assert_eq!(hashed.len(), 64);
        assert_eq!(hashed, UserService::hash_token("abc"));
        assert_ne!(hashed, UserService::hash_token("abd"));
    }
}
