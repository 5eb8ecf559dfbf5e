use std::sync::Arc;

use crate::store::{MemoryRecordStore, RecordStore, StoreError, StoreSnapshot};
use crate::workflows::application::{
    ApplicationRecord, ApplicationStatus, ApplicationWorkflow, AuditAction, AuditEntry, UserId,
};
use crate::workflows::exam::{AnswerRecord, AttemptId, ExamAttempt, NewExamAttempt};

pub(super) fn user(id: &str) -> UserId {
    UserId::from(id)
}

pub(super) fn build_workflow() -> (
    ApplicationWorkflow<MemoryRecordStore>,
    Arc<MemoryRecordStore>,
) {
    let store = Arc::new(MemoryRecordStore::new());
    let workflow = ApplicationWorkflow::new(store.clone());
    (workflow, store)
}

pub(super) fn drafted(workflow: &ApplicationWorkflow<MemoryRecordStore>, id: &str) -> UserId {
    let user_id = user(id);
    workflow
        .create(&user_id, "Test Applicant", &format!("{id}@example.com"))
        .expect("draft created");
    user_id
}

pub(super) fn audit_actions(store: &MemoryRecordStore, user_id: &UserId) -> Vec<AuditAction> {
    store
        .audit_trail(user_id)
        .expect("audit trail readable")
        .into_iter()
        .map(|entry| entry.action)
        .collect()
}

/// Store whose backing database is offline.
pub(super) struct UnavailableStore;

fn offline<T>() -> Result<T, StoreError> {
    Err(StoreError::Unavailable("database offline".to_string()))
}

impl RecordStore for UnavailableStore {
    fn create_application(
        &self,
        _user_id: &UserId,
        _name: &str,
        _email: &str,
    ) -> Result<ApplicationRecord, StoreError> {
        offline()
    }

    fn get_application(&self, _user_id: &UserId) -> Result<Option<ApplicationRecord>, StoreError> {
        offline()
    }

    fn update_application_status(
        &self,
        _user_id: &UserId,
        _status: ApplicationStatus,
    ) -> Result<ApplicationRecord, StoreError> {
        offline()
    }

    fn save_exam_attempt(&self, _attempt: NewExamAttempt) -> Result<AttemptId, StoreError> {
        offline()
    }

    fn save_answers(
        &self,
        _attempt_id: AttemptId,
        _answers: &[AnswerRecord],
    ) -> Result<(), StoreError> {
        offline()
    }

    fn exam_history(&self, _user_id: &UserId) -> Result<Vec<ExamAttempt>, StoreError> {
        offline()
    }

    fn answers_for(&self, _attempt_id: AttemptId) -> Result<Vec<AnswerRecord>, StoreError> {
        offline()
    }

    fn append_audit(
        &self,
        _user_id: &UserId,
        _action: AuditAction,
        _details: &str,
    ) -> Result<(), StoreError> {
        offline()
    }

    fn audit_trail(&self, _user_id: &UserId) -> Result<Vec<AuditEntry>, StoreError> {
        offline()
    }

    fn atomically<T, F>(&self, _apply: F) -> Result<T, StoreError>
    where
        F: FnOnce(&mut StoreSnapshot) -> Result<T, StoreError>,
    {
        offline()
    }
}
