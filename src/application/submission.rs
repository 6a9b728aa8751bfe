//! Terms acceptance and final submission
//!
//! `Editable -> PendingConfirmation -> Submitted`. Opening the confirmation
//! requires both earlier tabs to be complete; confirming requires the wait
//! window to have elapsed since the confirmation was opened. `Submitted` is
//! terminal.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::errors::{ApplicationError, ApplicationResult};

pub const DEFAULT_CONFIRMATION_WAIT_SECS: u64 = 5;
/// Longest accepted confirmation wait
pub const MAX_CONFIRMATION_WAIT_SECS: u64 = 3600;

/// Completeness of the tabs that gate the terms tab
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationProgress {
    pub general_business_complete: bool,
    pub farm_information_complete: bool,
    pub general_business_missing: Vec<String>,
    pub farm_information_missing: Vec<String>,
    pub can_submit: bool,
    pub submitted: bool,
}

impl ApplicationProgress {
    pub fn new(
        general_business_missing: Vec<String>,
        farm_information_missing: Vec<String>,
        submitted: bool,
    ) -> Self {
        let general_business_complete = general_business_missing.is_empty();
        let farm_information_complete = farm_information_missing.is_empty();
        Self {
            general_business_complete,
            farm_information_complete,
            general_business_missing,
            farm_information_missing,
            can_submit: general_business_complete && farm_information_complete && !submitted,
            submitted,
        }
    }

    /// Everything still missing, prefixed by tab
    pub fn missing(&self) -> Vec<String> {
        self.general_business_missing
            .iter()
            .map(|field| format!("generalBusiness.{}", field))
            .chain(
                self.farm_information_missing
                    .iter()
                    .map(|field| format!("farmInformation.{}", field)),
            )
            .collect()
    }
}

fn max_wait() -> Duration {
    Duration::seconds(MAX_CONFIRMATION_WAIT_SECS as i64)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionState {
    Editable,
    PendingConfirmation { opened_at: DateTime<Utc> },
    Submitted { at: DateTime<Utc> },
}

#[derive(Debug, Clone)]
pub struct SubmissionFlow {
    state: SubmissionState,
    wait: Duration,
}

impl SubmissionFlow {
    pub fn new(wait: std::time::Duration) -> Self {
        Self::with_state(SubmissionState::Editable, wait)
    }

    pub fn with_state(state: SubmissionState, wait: std::time::Duration) -> Self {
        Self {
            state,
            wait: Duration::from_std(wait)
                .map(|wait| wait.min(max_wait()))
                .unwrap_or_else(|_| max_wait()),
        }
    }

    pub fn state(&self) -> SubmissionState {
        self.state
    }

    pub fn is_submitted(&self) -> bool {
        matches!(self.state, SubmissionState::Submitted { .. })
    }

    /// Open the confirming dialog and start the wait window
    ///
    /// Re-opening while pending restarts the window.
    pub fn open(&mut self, progress: &ApplicationProgress, now: DateTime<Utc>) -> ApplicationResult<()> {
        if self.is_submitted() {
            return Err(ApplicationError::AlreadySubmitted);
        }
        if !progress.can_submit {
            return Err(ApplicationError::NotReady {
                missing: progress.missing(),
            });
        }
        self.state = SubmissionState::PendingConfirmation { opened_at: now };
        Ok(())
    }

    /// Time left before confirming is allowed, if pending
    pub fn remaining(&self, now: DateTime<Utc>) -> Option<Duration> {
        match self.state {
            SubmissionState::PendingConfirmation { opened_at } => {
                let deadline = opened_at
                    .checked_add_signed(self.wait)
                    .unwrap_or(DateTime::<Utc>::MAX_UTC);
                Some((deadline - now).max(Duration::zero()))
            }
            _ => None,
        }
    }

    pub fn can_confirm(&self, now: DateTime<Utc>) -> bool {
        self.remaining(now) == Some(Duration::zero())
    }

    /// Confirm the submission once the window has elapsed
    pub fn confirm(&mut self, now: DateTime<Utc>) -> ApplicationResult<DateTime<Utc>> {
        match self.state {
            SubmissionState::Editable => Err(ApplicationError::ConfirmationNotOpened),
            SubmissionState::Submitted { .. } => Err(ApplicationError::AlreadySubmitted),
            SubmissionState::PendingConfirmation { .. } => {
                let remaining = self.remaining(now).unwrap_or_else(Duration::zero);
                if remaining > Duration::zero() {
                    // round up so the client never retries too early
                    let remaining_secs = (remaining.num_milliseconds() + 999) / 1000;
                    return Err(ApplicationError::ConfirmationPending { remaining_secs });
                }
                self.state = SubmissionState::Submitted { at: now };
                Ok(now)
            }
        }
    }

    /// Close the dialog without submitting
    pub fn cancel(&mut self) {
        if let SubmissionState::PendingConfirmation { .. } = self.state {
            self.state = SubmissionState::Editable;
        }
    }
}
