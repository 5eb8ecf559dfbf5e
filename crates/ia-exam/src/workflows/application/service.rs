use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};

use super::domain::{is_valid_email, ApplicationRecord, ApplicationStatus, AuditAction, UserId};
use crate::store::{RecordStore, StoreError};

/// State machine over an application's status. Every mutation goes through the shared store,
/// which stamps `updated_at` and writes the audit entry.
pub struct ApplicationWorkflow<S> {
    store: Arc<S>,
}

impl<S> Clone for ApplicationWorkflow<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S> ApplicationWorkflow<S>
where
    S: RecordStore + 'static,
{
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Create a `DRAFT` application.
    pub fn create(
        &self,
        user_id: &UserId,
        name: &str,
        email: &str,
    ) -> Result<ApplicationRecord, WorkflowError> {
        if !is_valid_email(email) {
            warn!(%user_id, "rejected application with malformed email");
            return Err(WorkflowError::Validation("Invalid email format".to_string()));
        }

        match self.store.create_application(user_id, name, email) {
            Ok(record) => {
                info!(%user_id, "application created");
                Ok(record)
            }
            Err(StoreError::Conflict) => Err(WorkflowError::Duplicate(user_id.clone())),
            Err(other) => Err(other.into()),
        }
    }

    pub fn get(&self, user_id: &UserId) -> Result<ApplicationRecord, WorkflowError> {
        self.store
            .get_application(user_id)?
            .ok_or_else(|| WorkflowError::NotFound(user_id.clone()))
    }

    /// `DRAFT` → `SUBMITTED`.
    pub fn submit(&self, user_id: &UserId) -> Result<ApplicationRecord, WorkflowError> {
        let record = self.get(user_id)?;
        if record.status != ApplicationStatus::Draft {
            return Err(WorkflowError::InvalidTransition {
                from: record.status,
                to: ApplicationStatus::Submitted,
            });
        }

        let updated = self
            .store
            .update_application_status(user_id, ApplicationStatus::Submitted)?;
        info!(%user_id, status = %updated.status, "application submitted");
        Ok(updated)
    }

    /// Records approval and opens the exam: `APPROVED` then `PENDING_EXAM`, from any status.
    pub fn approve(&self, user_id: &UserId) -> Result<ApplicationRecord, WorkflowError> {
        let record = self.get(user_id)?;

        let updated = self.store.atomically(|state| {
            let now = Utc::now();
            state.update_application_status(user_id, ApplicationStatus::Approved, now)?;
            state.update_application_status(user_id, ApplicationStatus::PendingExam, now)
        })?;
        info!(
            %user_id,
            previous = %record.status,
            status = %updated.status,
            "application approved, exam unlocked"
        );
        Ok(updated)
    }

    pub fn reject(
        &self,
        user_id: &UserId,
        reason: &str,
    ) -> Result<ApplicationRecord, WorkflowError> {
        self.get(user_id)?;

        let updated = self.store.atomically(|state| {
            let now = Utc::now();
            let updated =
                state.update_application_status(user_id, ApplicationStatus::Rejected, now)?;
            state.append_audit(user_id, AuditAction::ApplicationRejected, reason, now);
            Ok(updated)
        })?;
        info!(%user_id, reason, "application rejected");
        Ok(updated)
    }

    pub fn status_of(&self, user_id: &UserId) -> Result<ApplicationStatus, WorkflowError> {
        Ok(self.get(user_id)?.status)
    }
}

/// Error raised by the application workflow. The display text is the caller-facing message.
#[derive(Debug, thiserror::Error)]
pub enum WorkflowError {
    #[error("{0}")]
    Validation(String),
    #[error("User already has an application")]
    Duplicate(UserId),
    #[error("Application not found")]
    NotFound(UserId),
    #[error("Cannot {} application in {from} state", transition_verb(.to))]
    InvalidTransition {
        from: ApplicationStatus,
        to: ApplicationStatus,
    },
    #[error(transparent)]
    Store(#[from] StoreError),
}

fn transition_verb(to: &ApplicationStatus) -> &'static str {
    match to {
        ApplicationStatus::Submitted => "submit",
        ApplicationStatus::UnderReview => "review",
        ApplicationStatus::Approved | ApplicationStatus::PendingExam => "approve",
        ApplicationStatus::Rejected => "reject",
        ApplicationStatus::Draft => "reopen",
    }
}
