use sea_orm::{DatabaseConnection, EntityTrait};
use serde::Serialize;
use tracing::debug;
use utoipa::ToSchema;

use crate::database::entities::users::{self, UserRole};
use crate::errors::{AuthError, AuthResult};

/// The caller as resolved from the upstream identity provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub id: i32,
    pub farm_id: Option<i32>,
    pub role: String,
    pub approved: bool,
    pub email: String,
}

impl Identity {
    pub fn from_user(user: &users::Model) -> Self {
        Self {
            id: user.id,
            farm_id: user.farm_id,
            role: user.role.clone(),
            approved: user.approved,
            email: user.email.clone(),
        }
    }

    /// The caller's farm, or `NoFarmAssociation`
    pub fn require_farm(&self) -> AuthResult<i32> {
        self.farm_id.ok_or(AuthError::NoFarmAssociation)
    }

    pub fn role(&self) -> Option<UserRole> {
        UserRole::parse(&self.role)
    }

    /// Farm id of a caller allowed to invite colleagues
    pub fn require_inviter(&self) -> AuthResult<i32> {
        let farm_id = self.require_farm()?;
        match self.role() {
            Some(role) if role.can_invite() && self.approved => Ok(farm_id),
            _ => Err(AuthError::PermissionDenied(
                "only approved farm owners can invite users".to_string(),
            )),
        }
    }
}

/// Resolves upstream identities against the users table
#[derive(Clone, Debug)]
pub struct AuthorizationService {
    db: DatabaseConnection,
}

impl AuthorizationService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Look up the caller named by an identity header value
    pub async fn resolve(&self, raw_user_id: Option<&str>) -> AuthResult<Identity> {
        let raw = raw_user_id
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .ok_or(AuthError::AuthenticationRequired)?;
        let user_id: i32 = raw.parse().map_err(|_| AuthError::UnknownUser)?;

        let user = users::Entity::find_by_id(user_id)
            .one(&self.db)
            .await?
            .ok_or(AuthError::UnknownUser)?;

        debug!(user_id = user.id, farm_id = ?user.farm_id, "resolved identity");
        Ok(Identity::from_user(&user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity(farm_id: Option<i32>, role: &str, approved: bool) -> Identity {
        Identity {
            id: 1,
            farm_id,
            role: role.to_string(),
            approved,
            email: "grower@example.com".to_string(),
        }
    }

    #[test]
    fn test_require_farm() {
        assert_eq!(identity(Some(3), "member", true).require_farm().unwrap(), 3);
        assert!(matches!(
            identity(None, "member", true).require_farm(),
            Err(AuthError::NoFarmAssociation)
        ));
    }

    #[test]
    fn test_only_approved_owners_invite() {
        assert_eq!(identity(Some(3), "owner", true).require_inviter().unwrap(), 3);
        assert!(identity(Some(3), "owner", false).require_inviter().is_err());
        assert!(identity(Some(3), "member", true).require_inviter().is_err());
        assert!(matches!(
            identity(None, "owner", true).require_inviter(),
            Err(AuthError::NoFarmAssociation)
        ));
    }

    #[tokio::test]
    async fn test_resolve_rejects_missing_and_unknown() {
        let db = crate::database::test_utils::setup_test_db().await;
        let service = AuthorizationService::new(db);

        assert!(matches!(
            service.resolve(None).await,
            Err(AuthError::AuthenticationRequired)
        ));
        assert!(matches!(
            service.resolve(Some("abc")).await,
            Err(AuthError::UnknownUser)
        ));
        assert!(matches!(
            service.resolve(Some("42")).await,
            Err(AuthError::UnknownUser)
        ));
    }
}
