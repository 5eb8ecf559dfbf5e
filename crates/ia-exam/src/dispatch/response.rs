use serde::{Deserialize, Serialize};

use crate::workflows::application::{ApplicationRecord, ApplicationStatus, UserId};
use crate::workflows::exam::{ExamAttempt, ExamOutcome, ExamSession};

/// Structured result handed back to presentation code.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Response {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<UserId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<ApplicationRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ApplicationStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exam_session: Option<ExamSession>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub passed: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correct_answers: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_questions: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub results: Option<Vec<ExamAttempt>>,
}

impl Response {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            ..Self::default()
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
            ..Self::default()
        }
    }

    pub(crate) fn created(user_id: UserId) -> Self {
        Self {
            user_id: Some(user_id),
            ..Self::success("Application created successfully")
        }
    }

    pub(crate) fn application(record: ApplicationRecord) -> Self {
        Self {
            success: true,
            data: Some(record),
            ..Self::default()
        }
    }

    pub(crate) fn status(status: ApplicationStatus) -> Self {
        Self {
            success: true,
            status: Some(status),
            ..Self::default()
        }
    }

    pub(crate) fn exam_started(session: ExamSession) -> Self {
        Self {
            exam_session: Some(session),
            ..Self::success("Exam started")
        }
    }

    pub(crate) fn exam_graded(outcome: &ExamOutcome) -> Self {
        Self {
            score: Some(outcome.score),
            passed: Some(outcome.passed),
            correct_answers: Some(outcome.correct_answers),
            total_questions: Some(outcome.total_questions),
            ..Self::success(outcome.message())
        }
    }

    pub(crate) fn results(results: Vec<ExamAttempt>) -> Self {
        Self {
            success: true,
            results: Some(results),
            ..Self::default()
        }
    }
}
