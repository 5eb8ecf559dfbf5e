use std::collections::BTreeMap;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{RecordStore, StoreError};
use crate::workflows::application::{
    ApplicationRecord, ApplicationStatus, AuditAction, AuditEntry, UserId,
};
use crate::workflows::exam::{AnswerRecord, AttemptId, ExamAttempt, NewExamAttempt};

/// Complete store contents. Serializable so file-backed stores can persist it as one document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreSnapshot {
    #[serde(default)]
    applications: BTreeMap<UserId, ApplicationRecord>,
    #[serde(default)]
    attempts: Vec<ExamAttempt>,
    #[serde(default)]
    answers: BTreeMap<AttemptId, Vec<AnswerRecord>>,
    #[serde(default)]
    audit: Vec<AuditEntry>,
    #[serde(default)]
    last_attempt_id: u64,
}

impl StoreSnapshot {
    pub fn create_application(
        &mut self,
        user_id: &UserId,
        name: &str,
        email: &str,
        now: DateTime<Utc>,
    ) -> Result<ApplicationRecord, StoreError> {
        if self.applications.contains_key(user_id) {
            return Err(StoreError::Conflict);
        }

        let record = ApplicationRecord {
            user_id: user_id.clone(),
            name: name.to_string(),
            email: email.to_string(),
            status: ApplicationStatus::Draft,
            created_at: now,
            updated_at: now,
        };
        self.applications.insert(user_id.clone(), record.clone());
        self.append_audit(
            user_id,
            AuditAction::ApplicationCreated,
            &format!("Application created for {name}"),
            now,
        );
        Ok(record)
    }

    pub fn get_application(&self, user_id: &UserId) -> Option<ApplicationRecord> {
        self.applications.get(user_id).cloned()
    }

    pub fn update_application_status(
        &mut self,
        user_id: &UserId,
        status: ApplicationStatus,
        now: DateTime<Utc>,
    ) -> Result<ApplicationRecord, StoreError> {
        let record = self
            .applications
            .get_mut(user_id)
            .ok_or(StoreError::NotFound)?;
        record.status = status;
        record.updated_at = now;
        let updated = record.clone();

        self.append_audit(
            user_id,
            AuditAction::StatusUpdated,
            &format!("Status changed to {status}"),
            now,
        );
        Ok(updated)
    }

    pub fn save_exam_attempt(&mut self, attempt: NewExamAttempt, now: DateTime<Utc>) -> AttemptId {
        self.last_attempt_id += 1;
        let id = AttemptId(self.last_attempt_id);
        let outcome = if attempt.passed { "PASSED" } else { "FAILED" };
        let details = format!("Exam completed with score {} - {outcome}", attempt.score);

        self.attempts.push(ExamAttempt {
            id,
            user_id: attempt.user_id.clone(),
            score: attempt.score,
            passed: attempt.passed,
            time_taken_minutes: attempt.time_taken_minutes,
            attempt_number: attempt.attempt_number,
            category: attempt.category,
            timestamp: now,
        });
        self.append_audit(&attempt.user_id, AuditAction::ExamCompleted, &details, now);
        id
    }

    pub fn save_answers(
        &mut self,
        attempt_id: AttemptId,
        answers: &[AnswerRecord],
    ) -> Result<(), StoreError> {
        if !self.attempts.iter().any(|attempt| attempt.id == attempt_id) {
            return Err(StoreError::NotFound);
        }
        self.answers
            .entry(attempt_id)
            .or_default()
            .extend_from_slice(answers);
        Ok(())
    }

    pub fn exam_history(&self, user_id: &UserId) -> Vec<ExamAttempt> {
        let mut history: Vec<ExamAttempt> = self
            .attempts
            .iter()
            .filter(|attempt| &attempt.user_id == user_id)
            .cloned()
            .collect();
        history.sort_by(|a, b| b.timestamp.cmp(&a.timestamp).then(b.id.cmp(&a.id)));
        history
    }

    pub fn answers_for(&self, attempt_id: AttemptId) -> Vec<AnswerRecord> {
        self.answers.get(&attempt_id).cloned().unwrap_or_default()
    }

    pub fn append_audit(
        &mut self,
        user_id: &UserId,
        action: AuditAction,
        details: &str,
        now: DateTime<Utc>,
    ) {
        self.audit.push(AuditEntry {
            user_id: user_id.clone(),
            action,
            details: details.to_string(),
            timestamp: now,
        });
    }

    pub fn audit_trail(&self, user_id: &UserId) -> Vec<AuditEntry> {
        self.audit
            .iter()
            .filter(|entry| &entry.user_id == user_id)
            .cloned()
            .collect()
    }
}

/// Mutex-guarded in-process store.
#[derive(Debug, Default)]
pub struct MemoryRecordStore {
    state: Mutex<StoreSnapshot>,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> Result<StoreSnapshot, StoreError> {
        self.with_state(|state| Ok(state.clone()))
    }

    fn with_state<T>(
        &self,
        f: impl FnOnce(&mut StoreSnapshot) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let mut guard = self
            .state
            .lock()
            .map_err(|_| StoreError::Unavailable("memory store lock poisoned".to_string()))?;
        f(&mut guard)
    }
}

impl RecordStore for MemoryRecordStore {
    fn create_application(
        &self,
        user_id: &UserId,
        name: &str,
        email: &str,
    ) -> Result<ApplicationRecord, StoreError> {
        self.with_state(|state| state.create_application(user_id, name, email, Utc::now()))
    }

    fn get_application(&self, user_id: &UserId) -> Result<Option<ApplicationRecord>, StoreError> {
        self.with_state(|state| Ok(state.get_application(user_id)))
    }

    fn update_application_status(
        &self,
        user_id: &UserId,
        status: ApplicationStatus,
    ) -> Result<ApplicationRecord, StoreError> {
        self.with_state(|state| state.update_application_status(user_id, status, Utc::now()))
    }

    fn save_exam_attempt(&self, attempt: NewExamAttempt) -> Result<AttemptId, StoreError> {
        self.with_state(|state| Ok(state.save_exam_attempt(attempt, Utc::now())))
    }

    fn save_answers(
        &self,
        attempt_id: AttemptId,
        answers: &[AnswerRecord],
    ) -> Result<(), StoreError> {
        self.with_state(|state| state.save_answers(attempt_id, answers))
    }

    fn exam_history(&self, user_id: &UserId) -> Result<Vec<ExamAttempt>, StoreError> {
        self.with_state(|state| Ok(state.exam_history(user_id)))
    }

    fn answers_for(&self, attempt_id: AttemptId) -> Result<Vec<AnswerRecord>, StoreError> {
        self.with_state(|state| Ok(state.answers_for(attempt_id)))
    }

    fn append_audit(
        &self,
        user_id: &UserId,
        action: AuditAction,
        details: &str,
    ) -> Result<(), StoreError> {
        self.with_state(|state| {
            state.append_audit(user_id, action, details, Utc::now());
            Ok(())
        })
    }

    fn audit_trail(&self, user_id: &UserId) -> Result<Vec<AuditEntry>, StoreError> {
        self.with_state(|state| Ok(state.audit_trail(user_id)))
    }

    fn atomically<T, F>(&self, apply: F) -> Result<T, StoreError>
    where
        F: FnOnce(&mut StoreSnapshot) -> Result<T, StoreError>,
    {
        self.with_state(|state| {
            let mut next = state.clone();
            let value = apply(&mut next)?;
            *state = next;
            Ok(value)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, 9, minute, 0)
            .single()
            .expect("valid timestamp")
    }

    fn attempt(user: &str, score: u8, number: u32) -> NewExamAttempt {
        NewExamAttempt {
            user_id: UserId::from(user),
            score,
            passed: score >= 70,
            time_taken_minutes: 0,
            attempt_number: number,
            category: "General".to_string(),
        }
    }

    #[test]
    fn create_rejects_duplicate_without_touching_original() {
        let mut state = StoreSnapshot::default();
        let user = UserId::from("user001");
        state
            .create_application(&user, "John Doe", "john@example.com", at(0))
            .expect("first insert");

        let err = state
            .create_application(&user, "Other", "other@example.com", at(1))
            .expect_err("duplicate insert");
        assert!(matches!(err, StoreError::Conflict));

        let stored = state.get_application(&user).expect("record present");
        assert_eq!(stored.name, "John Doe");
        assert_eq!(stored.created_at, at(0));
        assert_eq!(state.audit_trail(&user).len(), 1);
    }

    #[test]
    fn status_update_touches_timestamp_and_audits() {
        let mut state = StoreSnapshot::default();
        let user = UserId::from("user002");
        state
            .create_application(&user, "Jane", "jane@example.com", at(0))
            .expect("insert");

        let updated = state
            .update_application_status(&user, ApplicationStatus::Submitted, at(5))
            .expect("update");
        assert_eq!(updated.status, ApplicationStatus::Submitted);
        assert_eq!(updated.updated_at, at(5));
        assert_eq!(updated.created_at, at(0));

        let trail = state.audit_trail(&user);
        assert_eq!(trail.len(), 2);
        assert_eq!(trail[1].action, AuditAction::StatusUpdated);
        assert_eq!(trail[1].details, "Status changed to SUBMITTED");
    }

    #[test]
    fn status_update_for_missing_user_is_not_found() {
        let mut state = StoreSnapshot::default();
        let err = state
            .update_application_status(&UserId::from("ghost"), ApplicationStatus::Approved, at(0))
            .expect_err("missing record");
        assert!(matches!(err, StoreError::NotFound));
    }

    #[test]
    fn history_is_most_recent_first_with_id_tiebreak() {
        let mut state = StoreSnapshot::default();
        let first = state.save_exam_attempt(attempt("u", 40, 1), at(1));
        let second = state.save_exam_attempt(attempt("u", 60, 2), at(1));
        let third = state.save_exam_attempt(attempt("u", 90, 3), at(7));
        state.save_exam_attempt(attempt("someone-else", 10, 1), at(9));

        let ids: Vec<AttemptId> = state
            .exam_history(&UserId::from("u"))
            .into_iter()
            .map(|attempt| attempt.id)
            .collect();
        assert_eq!(ids, vec![third, second, first]);
    }

    #[test]
    fn saving_attempt_logs_outcome() {
        let mut state = StoreSnapshot::default();
        state.save_exam_attempt(attempt("u", 40, 1), at(0));
        let trail = state.audit_trail(&UserId::from("u"));
        assert_eq!(trail[0].action, AuditAction::ExamCompleted);
        assert_eq!(trail[0].details, "Exam completed with score 40 - FAILED");
    }

    #[test]
    fn answers_require_existing_attempt() {
        let mut state = StoreSnapshot::default();
        let err = state
            .save_answers(AttemptId(42), &[])
            .expect_err("no such attempt");
        assert!(matches!(err, StoreError::NotFound));
    }

    #[test]
    fn failed_unit_of_work_discards_earlier_steps() {
        let store = MemoryRecordStore::new();
        let user = UserId::from("batched");
        store
            .create_application(&user, "B", "b@example.com")
            .expect("insert");
        let before = store.snapshot().expect("snapshot");

        let result = store.atomically(|state| {
            let id = state.save_exam_attempt(attempt("batched", 40, 1), at(2));
            state.update_application_status(&user, ApplicationStatus::Approved, at(2))?;
            state.save_answers(AttemptId(id.0 + 100), &[])
        });

        assert!(matches!(result, Err(StoreError::NotFound)));
        assert_eq!(store.snapshot().expect("snapshot"), before);
        assert!(store.exam_history(&user).expect("history").is_empty());
    }

    #[test]
    fn snapshot_survives_json_round_trip() {
        let store = MemoryRecordStore::new();
        let user = UserId::from("persisted");
        store
            .create_application(&user, "P", "p@example.com")
            .expect("insert");
        let id = store
            .save_exam_attempt(attempt("persisted", 80, 1))
            .expect("attempt");
        store
            .save_answers(
                id,
                &[AnswerRecord {
                    question_id: crate::workflows::exam::QuestionId(1),
                    user_answer: "B".to_string(),
                    correct_answer: "B".to_string(),
                    is_correct: true,
                }],
            )
            .expect("answers");

        let snapshot = store.snapshot().expect("snapshot");
        let json = serde_json::to_string(&snapshot).expect("serialize");
        let restored: StoreSnapshot = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(restored, snapshot);
        assert_eq!(restored.answers_for(id).len(), 1);
    }
}
