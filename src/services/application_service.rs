use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    TransactionTrait,
};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn};
use utoipa::ToSchema;

use crate::application::{
    ApplicationProgress, ApplicationSink, FarmInfoInternalApplication, SubmissionFlow,
    SubmissionState,
};
use crate::database::entities::{farm_internal_applications, farm_locations, farms};
use crate::errors::{ApplicationError, ApplicationResult, AuthError};
use crate::services::Identity;

/// Returned when the confirmation dialog opens
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmationWindow {
    pub opened_at: DateTime<Utc>,
    pub confirmable_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionReceipt {
    pub farm_id: i32,
    pub submitted_at: DateTime<Utc>,
}

/// Saving, progress and submission of a farm's internal application
#[derive(Clone)]
pub struct ApplicationService {
    db: DatabaseConnection,
    confirmations: Arc<DashMap<i32, SubmissionFlow>>,
    confirmation_wait: Duration,
}

impl ApplicationService {
    pub fn new(db: DatabaseConnection, confirmation_wait: Duration) -> Self {
        Self {
            db,
            confirmations: Arc::new(DashMap::new()),
            confirmation_wait,
        }
    }

    /// The caller's stored answers, or empty answers if nothing was saved yet
    pub async fn get_application(
        &self,
        identity: &Identity,
    ) -> ApplicationResult<FarmInfoInternalApplication> {
        let farm_id = identity.require_farm()?;
        Ok(self
            .find_for_farm(farm_id)
            .await?
            .unwrap_or_else(|| FarmInfoInternalApplication::new(farm_id)))
    }

    /// Latest stored answers for a farm
    pub async fn find_for_farm(
        &self,
        farm_id: i32,
    ) -> ApplicationResult<Option<FarmInfoInternalApplication>> {
        Self::find_in(&self.db, farm_id).await
    }

    async fn find_in<C: ConnectionTrait>(
        conn: &C,
        farm_id: i32,
    ) -> ApplicationResult<Option<FarmInfoInternalApplication>> {
        let row = farm_internal_applications::Entity::find()
            .filter(farm_internal_applications::Column::FarmId.eq(farm_id))
            .one(conn)
            .await?;
        row.map(|row| row.to_record()).transpose()
    }

    /// Every stored application, ordered by farm
    pub async fn all_applications(&self) -> ApplicationResult<Vec<FarmInfoInternalApplication>> {
        farm_internal_applications::Entity::find()
            .order_by_asc(farm_internal_applications::Column::FarmId)
            .all(&self.db)
            .await?
            .iter()
            .map(|row| row.to_record())
            .collect()
    }

    /// Validate a form payload and upsert it for the caller's farm
    ///
    /// Nothing is written when validation fails.
    pub async fn save_application(
        &self,
        identity: &Identity,
        payload: &Value,
    ) -> ApplicationResult<FarmInfoInternalApplication> {
        let farm_id = identity.require_farm()?;
        let record = FarmInfoInternalApplication::from_json(payload)?;
        if record.farm_id != farm_id {
            return Err(AuthError::PermissionDenied(format!(
                "cannot save an application for farm {}",
                record.farm_id
            ))
            .into());
        }
        self.save_record(identity, record).await
    }

    /// Upsert an already-parsed record for the caller's farm
    pub async fn save_record(
        &self,
        identity: &Identity,
        record: FarmInfoInternalApplication,
    ) -> ApplicationResult<FarmInfoInternalApplication> {
        let farm_id = identity.require_farm()?;
        if record.farm_id != farm_id {
            return Err(AuthError::PermissionDenied(format!(
                "cannot save an application for farm {}",
                record.farm_id
            ))
            .into());
        }

        // the submitted check and the upsert commit together
        let txn = self.db.begin().await?;
        Self::lock_unsubmitted(&txn, farm_id).await?;
        Self::upsert(&txn, &record).await?;
        txn.commit().await?;

        debug!(farm_id, user_id = identity.id, "saved internal application");
        Ok(record)
    }

    async fn upsert<C: ConnectionTrait>(
        conn: &C,
        record: &FarmInfoInternalApplication,
    ) -> ApplicationResult<()> {
        farm_internal_applications::Entity::insert(
            farm_internal_applications::ActiveModel::from_record(record),
        )
        .on_conflict(
            OnConflict::column(farm_internal_applications::Column::FarmId)
                .update_columns(farm_internal_applications::ANSWER_COLUMNS.iter().copied())
                .to_owned(),
        )
        .exec_without_returning(conn)
        .await?;
        Ok(())
    }

    /// Write-lock the farm row, failing once it has been submitted
    ///
    /// Must be the first statement of its transaction: on SQLite the write
    /// takes the database lock, so saves and submissions for the farm
    /// serialise behind it.
    async fn lock_unsubmitted<C: ConnectionTrait>(conn: &C, farm_id: i32) -> ApplicationResult<()> {
        let result = farms::Entity::update_many()
            .col_expr(farms::Column::UpdatedAt, Expr::col(farms::Column::UpdatedAt).into())
            .filter(farms::Column::Id.eq(farm_id))
            .filter(farms::Column::ApplicationSubmittedAt.is_null())
            .exec(conn)
            .await?;
        if result.rows_affected == 0 {
            Self::load_farm_in(conn, farm_id).await?;
            return Err(ApplicationError::AlreadySubmitted);
        }
        Ok(())
    }

    async fn load_farm_in<C: ConnectionTrait>(
        conn: &C,
        farm_id: i32,
    ) -> ApplicationResult<farms::Model> {
        farms::Entity::find_by_id(farm_id)
            .one(conn)
            .await?
            .ok_or(ApplicationError::NotFound(farm_id))
    }

    /// Completeness of the general-business and farm-information tabs
    pub async fn progress(&self, identity: &Identity) -> ApplicationResult<ApplicationProgress> {
        let farm_id = identity.require_farm()?;
        self.progress_for_farm(farm_id).await
    }

    async fn progress_for_farm(&self, farm_id: i32) -> ApplicationResult<ApplicationProgress> {
        Self::progress_in(&self.db, farm_id).await
    }

    async fn progress_in<C: ConnectionTrait>(
        conn: &C,
        farm_id: i32,
    ) -> ApplicationResult<ApplicationProgress> {
        let farm = Self::load_farm_in(conn, farm_id).await?;
        let location = farm_locations::Entity::find()
            .filter(farm_locations::Column::FarmId.eq(farm_id))
            .one(conn)
            .await?;

        let mut general_business = farm.missing_business_fields();
        match location {
            Some(location) => general_business.extend(location.missing_fields()),
            None => general_business.push("location".to_string()),
        }

        let farm_information = Self::find_in(conn, farm_id)
            .await?
            .unwrap_or_else(|| FarmInfoInternalApplication::new(farm_id))
            .missing_answers();

        Ok(ApplicationProgress::new(
            general_business,
            farm_information,
            farm.is_submitted(),
        ))
    }

    /// Open the confirming dialog and start the wait window
    pub async fn open_confirmation(
        &self,
        identity: &Identity,
    ) -> ApplicationResult<ConfirmationWindow> {
        let farm_id = identity.require_farm()?;
        let progress = self.progress_for_farm(farm_id).await?;
        let now = Utc::now();

        let mut flow = self
            .confirmations
            .entry(farm_id)
            .or_insert_with(|| SubmissionFlow::new(self.confirmation_wait));
        if progress.submitted && !flow.is_submitted() {
            *flow = SubmissionFlow::with_state(
                SubmissionState::Submitted { at: now },
                self.confirmation_wait,
            );
        }
        flow.open(&progress, now)?;

        info!(farm_id, user_id = identity.id, "opened submission confirmation");
        Ok(ConfirmationWindow {
            opened_at: now,
            confirmable_at: now + flow.remaining(now).unwrap_or_else(chrono::Duration::zero),
        })
    }

    /// Close the confirming dialog without submitting
    pub fn cancel_confirmation(&self, identity: &Identity) -> ApplicationResult<()> {
        let farm_id = identity.require_farm()?;
        if let Some(mut flow) = self.confirmations.get_mut(&farm_id) {
            flow.cancel();
        }
        Ok(())
    }

    /// Confirm the submission once the wait window has elapsed
    ///
    /// Stamps the terms acceptance and submission times; a farm can be
    /// submitted only once. Completeness is re-checked under the same write
    /// lock that saves take, so no save lands between the check and the stamp.
    pub async fn submit(&self, identity: &Identity) -> ApplicationResult<SubmissionReceipt> {
        let farm_id = identity.require_farm()?;
        if self.progress_for_farm(farm_id).await?.submitted {
            return Err(ApplicationError::AlreadySubmitted);
        }
        let mut flow = self
            .confirmations
            .get(&farm_id)
            .map(|flow| flow.value().clone())
            .ok_or(ApplicationError::ConfirmationNotOpened)?;

        let txn = self.db.begin().await?;
        if let Err(err) = Self::lock_unsubmitted(&txn, farm_id).await {
            if matches!(err, ApplicationError::AlreadySubmitted) {
                warn!(farm_id, "concurrent submission rejected");
            }
            return Err(err);
        }

        let progress = Self::progress_in(&txn, farm_id).await?;
        if !progress.can_submit {
            return Err(ApplicationError::NotReady {
                missing: progress.missing(),
            });
        }
        let submitted_at = flow.confirm(Utc::now())?;

        farms::Entity::update_many()
            .col_expr(farms::Column::TermsAcceptedAt, Expr::value(submitted_at))
            .col_expr(farms::Column::ApplicationSubmittedAt, Expr::value(submitted_at))
            .col_expr(farms::Column::UpdatedAt, Expr::value(submitted_at))
            .filter(farms::Column::Id.eq(farm_id))
            .exec(&txn)
            .await?;
        txn.commit().await?;

        self.confirmations.insert(farm_id, flow);
        info!(farm_id, user_id = identity.id, "application submitted");
        Ok(SubmissionReceipt {
            farm_id,
            submitted_at,
        })
    }

    /// Autosave target bound to one caller
    pub fn sink_for(&self, identity: Identity) -> ServiceSink {
        ServiceSink {
            service: self.clone(),
            identity,
        }
    }
}

/// [`ApplicationSink`] that saves through [`ApplicationService`] as a given caller
#[derive(Clone)]
pub struct ServiceSink {
    service: ApplicationService,
    identity: Identity,
}

#[async_trait]
impl ApplicationSink for ServiceSink {
    async fn save(&self, record: FarmInfoInternalApplication) -> ApplicationResult<()> {
        self.service.save_record(&self.identity, record).await?;
        Ok(())
    }
}
