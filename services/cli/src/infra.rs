use chrono::{DateTime, Utc};
use ia_exam::store::{RecordStore, StoreError, StoreSnapshot};
use ia_exam::workflows::application::{
    ApplicationRecord, ApplicationStatus, AuditAction, AuditEntry, UserId,
};
use ia_exam::workflows::exam::{AnswerRecord, AttemptId, ExamAttempt, NewExamAttempt};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::debug;

/// Record store persisted as a single JSON document.
///
/// Every mutation is applied to a copy of the snapshot, written to disk, and only then committed
/// in memory, so a failed write leaves both the file and the process state untouched.
#[derive(Debug)]
pub(crate) struct JsonFileStore {
    path: PathBuf,
    state: Mutex<StoreSnapshot>,
}

impl JsonFileStore {
    /// Opens `path`, treating a missing file as an empty store.
    pub(crate) fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let snapshot = match fs::read(&path) {
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(|err| {
                StoreError::Unavailable(format!("{} is not a valid store: {err}", path.display()))
            })?,
            Err(err) if err.kind() == ErrorKind::NotFound => StoreSnapshot::default(),
            Err(err) => {
                return Err(StoreError::Unavailable(format!(
                    "failed to read {}: {err}",
                    path.display()
                )))
            }
        };
        debug!(path = %path.display(), "record store loaded");

        Ok(Self {
            path,
            state: Mutex::new(snapshot),
        })
    }

    fn read<T>(&self, f: impl FnOnce(&StoreSnapshot) -> T) -> Result<T, StoreError> {
        let guard = self
            .state
            .lock()
            .map_err(|_| StoreError::Unavailable("file store lock poisoned".to_string()))?;
        Ok(f(&guard))
    }

    fn mutate<T>(
        &self,
        f: impl FnOnce(&mut StoreSnapshot) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let mut guard = self
            .state
            .lock()
            .map_err(|_| StoreError::Unavailable("file store lock poisoned".to_string()))?;
        let mut next = guard.clone();
        let value = f(&mut next)?;
        persist(&self.path, &next)?;
        *guard = next;
        Ok(value)
    }
}

fn persist(path: &Path, snapshot: &StoreSnapshot) -> Result<(), StoreError> {
    let unavailable =
        |err: std::io::Error| StoreError::Unavailable(format!("{}: {err}", path.display()));

    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(unavailable)?;
    }
    let body = serde_json::to_vec_pretty(snapshot)
        .map_err(|err| StoreError::Unavailable(format!("failed to encode store: {err}")))?;

    let mut staging = path.as_os_str().to_owned();
    staging.push(".tmp");
    let staging = PathBuf::from(staging);
    fs::write(&staging, body).map_err(unavailable)?;
    fs::rename(&staging, path).map_err(unavailable)
}

fn now() -> DateTime<Utc> {
    Utc::now()
}

impl RecordStore for JsonFileStore {
    fn create_application(
        &self,
        user_id: &UserId,
        name: &str,
        email: &str,
    ) -> Result<ApplicationRecord, StoreError> {
        self.mutate(|state| state.create_application(user_id, name, email, now()))
    }

    fn get_application(&self, user_id: &UserId) -> Result<Option<ApplicationRecord>, StoreError> {
        self.read(|state| state.get_application(user_id))
    }

    fn update_application_status(
        &self,
        user_id: &UserId,
        status: ApplicationStatus,
    ) -> Result<ApplicationRecord, StoreError> {
        self.mutate(|state| state.update_application_status(user_id, status, now()))
    }

    fn save_exam_attempt(&self, attempt: NewExamAttempt) -> Result<AttemptId, StoreError> {
        self.mutate(|state| Ok(state.save_exam_attempt(attempt, now())))
    }

    fn save_answers(
        &self,
        attempt_id: AttemptId,
        answers: &[AnswerRecord],
    ) -> Result<(), StoreError> {
        self.mutate(|state| state.save_answers(attempt_id, answers))
    }

    fn exam_history(&self, user_id: &UserId) -> Result<Vec<ExamAttempt>, StoreError> {
        self.read(|state| state.exam_history(user_id))
    }

    fn answers_for(&self, attempt_id: AttemptId) -> Result<Vec<AnswerRecord>, StoreError> {
        self.read(|state| state.answers_for(attempt_id))
    }

    fn append_audit(
        &self,
        user_id: &UserId,
        action: AuditAction,
        details: &str,
    ) -> Result<(), StoreError> {
        self.mutate(|state| {
            state.append_audit(user_id, action, details, now());
            Ok(())
        })
    }

    fn audit_trail(&self, user_id: &UserId) -> Result<Vec<AuditEntry>, StoreError> {
        self.read(|state| state.audit_trail(user_id))
    }

    fn atomically<T, F>(&self, apply: F) -> Result<T, StoreError>
    where
        F: FnOnce(&mut StoreSnapshot) -> Result<T, StoreError>,
    {
        self.mutate(apply)
    }
}
