use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::workflows::application::UserId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuestionId(pub u32);

impl fmt::Display for QuestionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Store-assigned identifier of a persisted exam attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AttemptId(pub u64);

impl fmt::Display for AttemptId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

/// A labeled choice such as `B` / `Unauthorized network access`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerOption {
    pub label: String,
    pub text: String,
}

impl AnswerOption {
    pub fn new(label: &str, text: &str) -> Self {
        Self {
            label: label.to_string(),
            text: text.to_string(),
        }
    }
}

/// Static bank entry including its answer key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub id: QuestionId,
    pub category: String,
    pub prompt: String,
    pub options: Vec<AnswerOption>,
    pub correct_answer: String,
    pub difficulty: Difficulty,
}

impl Question {
    pub fn public_view(&self) -> PublicQuestion {
        PublicQuestion {
            id: self.id,
            category: self.category.clone(),
            prompt: self.prompt.clone(),
            options: self.options.clone(),
            difficulty: self.difficulty,
        }
    }

    pub fn has_option(&self, label: &str) -> bool {
        self.options.iter().any(|option| option.label == label)
    }
}

/// Question as handed to an examinee: everything but the answer key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicQuestion {
    pub id: QuestionId,
    pub category: String,
    pub prompt: String,
    pub options: Vec<AnswerOption>,
    pub difficulty: Difficulty,
}

/// Examinee's choice for one question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmittedAnswer {
    pub question_id: QuestionId,
    pub answer: String,
}

impl SubmittedAnswer {
    pub fn new(question_id: u32, answer: &str) -> Self {
        Self {
            question_id: QuestionId(question_id),
            answer: answer.to_string(),
        }
    }
}

/// Graded answer persisted alongside its attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerRecord {
    pub question_id: QuestionId,
    pub user_answer: String,
    pub correct_answer: String,
    pub is_correct: bool,
}

/// Attempt fields supplied by the engine; the store assigns id and timestamp.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewExamAttempt {
    pub user_id: UserId,
    pub score: u8,
    pub passed: bool,
    pub time_taken_minutes: u32,
    pub attempt_number: u32,
    pub category: String,
}

/// Immutable record of one exam submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExamAttempt {
    pub id: AttemptId,
    pub user_id: UserId,
    pub score: u8,
    pub passed: bool,
    pub time_taken_minutes: u32,
    pub attempt_number: u32,
    pub category: String,
    pub timestamp: DateTime<Utc>,
}

/// Descriptor returned when an exam starts. The deadline is informational.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExamSession {
    pub user_id: UserId,
    pub started_at: DateTime<Utc>,
    pub time_limit_minutes: u32,
    pub deadline: DateTime<Utc>,
    pub questions: Vec<PublicQuestion>,
}

/// Result of grading and recording a submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExamOutcome {
    pub attempt_id: AttemptId,
    pub attempt_number: u32,
    pub score: u8,
    pub passed: bool,
    pub correct_answers: u32,
    pub total_questions: u32,
}

impl ExamOutcome {
    pub fn message(&self) -> &'static str {
        if self.passed {
            "Exam passed!"
        } else {
            "Exam failed. Please review and try again."
        }
    }
}
