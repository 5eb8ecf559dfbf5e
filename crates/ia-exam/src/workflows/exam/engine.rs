use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use rand::seq::SliceRandom;
use rand::Rng;
use tracing::{info, warn};

use super::bank::QuestionBank;
use super::config::ExamConfig;
use super::domain::{
    AnswerRecord, AttemptId, ExamAttempt, ExamOutcome, ExamSession, NewExamAttempt,
    PublicQuestion, SubmittedAnswer,
};
use super::scoring;
use crate::store::{RecordStore, StoreError};
use crate::workflows::application::{ApplicationStatus, UserId};

/// Draws exams, grades submissions, and enforces the attempt cap. Holds no per-user state:
/// attempts and statuses live in the shared store.
pub struct ExamEngine<S> {
    store: Arc<S>,
    bank: QuestionBank,
    config: ExamConfig,
}

impl<S> ExamEngine<S>
where
    S: RecordStore + 'static,
{
    pub fn new(store: Arc<S>, bank: QuestionBank, config: ExamConfig) -> Self {
        Self {
            store,
            bank,
            config,
        }
    }

    pub fn start(&self, user_id: &UserId) -> Result<ExamSession, ExamError> {
        self.start_with_rng(user_id, &mut rand::thread_rng())
    }

    /// Opens a session for a `PENDING_EXAM` applicant who still has attempts left. The returned
    /// questions carry no answer key.
    pub fn start_with_rng<G>(
        &self,
        user_id: &UserId,
        rng: &mut G,
    ) -> Result<ExamSession, ExamError>
    where
        G: Rng + ?Sized,
    {
        let record = self
            .store
            .get_application(user_id)?
            .ok_or(ExamError::NotEligible(Ineligibility::NoApplication))?;
        if record.status != ApplicationStatus::PendingExam {
            warn!(
                %user_id,
                status = %record.status,
                "exam refused, application not pending exam"
            );
            return Err(ExamError::NotEligible(Ineligibility::Status(record.status)));
        }

        let failed = self.failed_attempts(user_id)?;
        if failed >= self.config.max_attempts {
            warn!(
                %user_id,
                failed,
                max = self.config.max_attempts,
                "exam refused, attempts exhausted"
            );
            return Err(ExamError::AttemptsExceeded {
                failed,
                max: self.config.max_attempts,
            });
        }

        let count = self.config.questions_per_exam.min(self.bank.len());
        let mut questions: Vec<PublicQuestion> = self
            .bank
            .questions()
            .choose_multiple(rng, count)
            .map(|question| question.public_view())
            .collect();
        questions.shuffle(rng);

        let started_at = Utc::now();
        let deadline = started_at + Duration::minutes(i64::from(self.config.time_limit_minutes));
        info!(%user_id, questions = questions.len(), "exam started");

        Ok(ExamSession {
            user_id: user_id.clone(),
            started_at,
            time_limit_minutes: self.config.time_limit_minutes,
            deadline,
            questions,
        })
    }

    pub fn submit(
        &self,
        user_id: &UserId,
        answers: &[SubmittedAnswer],
    ) -> Result<ExamOutcome, ExamError> {
        self.submit_timed(user_id, answers, None)
    }

    /// Grades and records a submission. `started_at` only feeds the recorded duration; the time
    /// limit is not enforced.
    pub fn submit_timed(
        &self,
        user_id: &UserId,
        answers: &[SubmittedAnswer],
        started_at: Option<DateTime<Utc>>,
    ) -> Result<ExamOutcome, ExamError> {
        if answers.is_empty() {
            return Err(ExamError::EmptyInput);
        }
        if self.store.get_application(user_id)?.is_none() {
            return Err(ExamError::ApplicationNotFound(user_id.clone()));
        }

        let graded = scoring::grade(&self.bank, answers);
        let passed = graded.score >= self.config.min_passing_score;
        let time_taken_minutes = started_at
            .map(|start| (Utc::now() - start).num_minutes().max(0))
            .map(|minutes| u32::try_from(minutes).unwrap_or(u32::MAX))
            .unwrap_or(0);

        // Attempt, answers and the pass transition commit as one unit.
        let (attempt_id, attempt_number) = self.store.atomically(|state| {
            let now = Utc::now();
            let attempt_number = state.exam_history(user_id).len() as u32 + 1;
            let attempt_id = state.save_exam_attempt(
                NewExamAttempt {
                    user_id: user_id.clone(),
                    score: graded.score,
                    passed,
                    time_taken_minutes,
                    attempt_number,
                    category: self.config.category.clone(),
                },
                now,
            );
            state.save_answers(attempt_id, &graded.answers)?;
            if passed {
                state.update_application_status(user_id, ApplicationStatus::Approved, now)?;
            }
            Ok((attempt_id, attempt_number))
        })?;

        info!(
            %user_id,
            score = graded.score,
            passed,
            attempt_number,
            correct = graded.correct,
            total = graded.total,
            "exam graded"
        );

        Ok(ExamOutcome {
            attempt_id,
            attempt_number,
            score: graded.score,
            passed,
            correct_answers: graded.correct,
            total_questions: graded.total,
        })
    }

    /// All attempts for the user, most recent first.
    pub fn results(&self, user_id: &UserId) -> Result<Vec<ExamAttempt>, ExamError> {
        let history = self.store.exam_history(user_id)?;
        if history.is_empty() {
            return Err(ExamError::NotFound(user_id.clone()));
        }
        Ok(history)
    }

    pub fn answers(&self, attempt_id: AttemptId) -> Result<Vec<AnswerRecord>, ExamError> {
        Ok(self.store.answers_for(attempt_id)?)
    }

    pub fn failed_attempts(&self, user_id: &UserId) -> Result<u32, ExamError> {
        let history = self.store.exam_history(user_id)?;
        Ok(history.iter().filter(|attempt| !attempt.passed).count() as u32)
    }

    pub fn attempts_remaining(&self, user_id: &UserId) -> Result<u32, ExamError> {
        let failed = self.failed_attempts(user_id)?;
        Ok(self.config.max_attempts.saturating_sub(failed))
    }
}

/// Reason an applicant cannot start an exam.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ineligibility {
    NoApplication,
    Status(ApplicationStatus),
}

impl fmt::Display for Ineligibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ineligibility::NoApplication => write!(f, "Application not found"),
            Ineligibility::Status(_) => write!(f, "User not eligible for exam"),
        }
    }
}

/// Error raised by the exam engine. The display text is the caller-facing message.
#[derive(Debug, thiserror::Error)]
pub enum ExamError {
    #[error("{0}")]
    NotEligible(Ineligibility),
    #[error("Maximum exam attempts exceeded")]
    AttemptsExceeded { failed: u32, max: u32 },
    #[error("No answers provided")]
    EmptyInput,
    #[error("No exam results found")]
    NotFound(UserId),
    #[error("Application not found")]
    ApplicationNotFound(UserId),
    #[error(transparent)]
    Store(#[from] StoreError),
}
