//! Persistence contract shared by the application workflow and the exam engine.

mod memory;
#[cfg(test)]
pub(crate) mod testing;

pub use memory::{MemoryRecordStore, StoreSnapshot};

use crate::workflows::application::{
    ApplicationRecord, ApplicationStatus, AuditAction, AuditEntry, UserId,
};
use crate::workflows::exam::{AnswerRecord, AttemptId, ExamAttempt, NewExamAttempt};

/// Storage abstraction so the workflow and engine can be exercised in isolation.
///
/// Implementations own audit bookkeeping for the operations that imply it: creating an
/// application, changing its status, and saving an exam attempt each append one entry.
pub trait RecordStore: Send + Sync {
    /// Inserts a `DRAFT` application. Fails with [`StoreError::Conflict`] when the user id exists.
    fn create_application(
        &self,
        user_id: &UserId,
        name: &str,
        email: &str,
    ) -> Result<ApplicationRecord, StoreError>;

    fn get_application(&self, user_id: &UserId) -> Result<Option<ApplicationRecord>, StoreError>;

    /// Sets the status, touches `updated_at`, and appends a `STATUS_UPDATED` entry.
    fn update_application_status(
        &self,
        user_id: &UserId,
        status: ApplicationStatus,
    ) -> Result<ApplicationRecord, StoreError>;

    fn save_exam_attempt(&self, attempt: NewExamAttempt) -> Result<AttemptId, StoreError>;

    fn save_answers(&self, attempt_id: AttemptId, answers: &[AnswerRecord])
        -> Result<(), StoreError>;

    /// Attempts for the user, most recent first.
    fn exam_history(&self, user_id: &UserId) -> Result<Vec<ExamAttempt>, StoreError>;

    fn answers_for(&self, attempt_id: AttemptId) -> Result<Vec<AnswerRecord>, StoreError>;

    fn append_audit(
        &self,
        user_id: &UserId,
        action: AuditAction,
        details: &str,
    ) -> Result<(), StoreError>;

    /// Audit entries for the user, oldest first.
    fn audit_trail(&self, user_id: &UserId) -> Result<Vec<AuditEntry>, StoreError>;

    /// Runs `apply` against the store contents as one unit of work. Either every change it makes
    /// is committed or, when it or the commit fails, none is visible.
    fn atomically<T, F>(&self, apply: F) -> Result<T, StoreError>
    where
        F: FnOnce(&mut StoreSnapshot) -> Result<T, StoreError>;
}

/// Error enumeration for storage failures.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("record store unavailable: {0}")]
    Unavailable(String),
}
