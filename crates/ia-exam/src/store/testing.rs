use super::{MemoryRecordStore, RecordStore, StoreError, StoreSnapshot};
use crate::workflows::application::{
    ApplicationRecord, ApplicationStatus, AuditAction, AuditEntry, UserId,
};
use crate::workflows::exam::{AnswerRecord, AttemptId, ExamAttempt, NewExamAttempt};

/// In-memory store whose single-record calls succeed but whose multi-step commits fail, as when
/// the disk fills up halfway through an operation.
#[derive(Debug, Default)]
pub(crate) struct CommitFailingStore {
    inner: MemoryRecordStore,
}

impl CommitFailingStore {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn snapshot(&self) -> Result<StoreSnapshot, StoreError> {
        self.inner.snapshot()
    }
}

impl RecordStore for CommitFailingStore {
    fn create_application(
        &self,
        user_id: &UserId,
        name: &str,
        email: &str,
    ) -> Result<ApplicationRecord, StoreError> {
        self.inner.create_application(user_id, name, email)
    }

    fn get_application(&self, user_id: &UserId) -> Result<Option<ApplicationRecord>, StoreError> {
        self.inner.get_application(user_id)
    }

    fn update_application_status(
        &self,
        user_id: &UserId,
        status: ApplicationStatus,
    ) -> Result<ApplicationRecord, StoreError> {
        self.inner.update_application_status(user_id, status)
    }

    fn save_exam_attempt(&self, attempt: NewExamAttempt) -> Result<AttemptId, StoreError> {
        self.inner.save_exam_attempt(attempt)
    }

    fn save_answers(
        &self,
        attempt_id: AttemptId,
        answers: &[AnswerRecord],
    ) -> Result<(), StoreError> {
        self.inner.save_answers(attempt_id, answers)
    }

    fn exam_history(&self, user_id: &UserId) -> Result<Vec<ExamAttempt>, StoreError> {
        self.inner.exam_history(user_id)
    }

    fn answers_for(&self, attempt_id: AttemptId) -> Result<Vec<AnswerRecord>, StoreError> {
        self.inner.answers_for(attempt_id)
    }

    fn append_audit(
        &self,
        user_id: &UserId,
        action: AuditAction,
        details: &str,
    ) -> Result<(), StoreError> {
        self.inner.append_audit(user_id, action, details)
    }

    fn audit_trail(&self, user_id: &UserId) -> Result<Vec<AuditEntry>, StoreError> {
        self.inner.audit_trail(user_id)
    }

    fn atomically<T, F>(&self, apply: F) -> Result<T, StoreError>
    where
        F: FnOnce(&mut StoreSnapshot) -> Result<T, StoreError>,
    {
        let mut scratch = self.inner.snapshot()?;
        apply(&mut scratch)?;
        Err(StoreError::Unavailable("commit failed: disk full".to_string()))
    }
}
