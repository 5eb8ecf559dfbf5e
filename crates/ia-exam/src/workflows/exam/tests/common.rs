use std::sync::Arc;

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::store::MemoryRecordStore;
use crate::workflows::application::{ApplicationWorkflow, UserId};
use crate::workflows::exam::{ExamConfig, ExamEngine, QuestionBank, SubmittedAnswer};

pub(super) struct Harness {
    pub(super) store: Arc<MemoryRecordStore>,
    pub(super) workflow: ApplicationWorkflow<MemoryRecordStore>,
    pub(super) engine: ExamEngine<MemoryRecordStore>,
}

pub(super) fn harness() -> Harness {
    harness_with(ExamConfig::default())
}

pub(super) fn harness_with(config: ExamConfig) -> Harness {
    let store = Arc::new(MemoryRecordStore::new());
    let workflow = ApplicationWorkflow::new(store.clone());
    let engine = ExamEngine::new(store.clone(), QuestionBank::builtin(), config);
    Harness {
        store,
        workflow,
        engine,
    }
}

pub(super) fn seeded_rng() -> StdRng {
    StdRng::seed_from_u64(7)
}

/// Creates, submits, and approves an application so the user is `PENDING_EXAM`.
pub(super) fn eligible(harness: &Harness, id: &str) -> UserId {
    let user_id = UserId::from(id);
    harness
        .workflow
        .create(&user_id, "Exam Candidate", &format!("{id}@example.com"))
        .expect("created");
    harness.workflow.submit(&user_id).expect("submitted");
    harness.workflow.approve(&user_id).expect("approved");
    user_id
}

/// Answer key for the builtin bank.
pub(super) fn all_correct() -> Vec<SubmittedAnswer> {
    vec![
        SubmittedAnswer::new(1, "B"),
        SubmittedAnswer::new(2, "B"),
        SubmittedAnswer::new(3, "C"),
        SubmittedAnswer::new(4, "B"),
        SubmittedAnswer::new(5, "B"),
    ]
}

pub(super) fn all_wrong() -> Vec<SubmittedAnswer> {
    vec![
        SubmittedAnswer::new(1, "A"),
        SubmittedAnswer::new(2, "A"),
        SubmittedAnswer::new(3, "A"),
    ]
}
