//! Information Assurance exam: question bank, grading, and attempt accounting.

pub mod bank;
pub mod config;
pub mod domain;
pub mod engine;
pub mod export;
pub mod scoring;

#[cfg(test)]
mod tests;

pub use bank::{QuestionBank, QuestionBankError};
pub use config::ExamConfig;
pub use domain::{
    AnswerOption, AnswerRecord, AttemptId, Difficulty, ExamAttempt, ExamOutcome, ExamSession,
    NewExamAttempt, PublicQuestion, Question, QuestionId, SubmittedAnswer,
};
pub use engine::{ExamEngine, ExamError, Ineligibility};
pub use export::write_attempts_csv;
