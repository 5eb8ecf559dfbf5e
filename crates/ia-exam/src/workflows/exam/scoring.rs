use tracing::debug;

use super::bank::QuestionBank;
use super::domain::{AnswerRecord, SubmittedAnswer};

/// Graded submission before it is persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GradedSubmission {
    pub answers: Vec<AnswerRecord>,
    pub correct: u32,
    pub total: u32,
    pub score: u8,
}

/// Grades answers against the bank. Answers naming an unknown question id are dropped and do
/// not count toward the total.
pub fn grade(bank: &QuestionBank, submitted: &[SubmittedAnswer]) -> GradedSubmission {
    let mut answers = Vec::with_capacity(submitted.len());
    let mut correct = 0u32;

    for answer in submitted {
        let Some(question) = bank.get(answer.question_id) else {
            debug!(question_id = %answer.question_id, "skipping answer for unknown question");
            continue;
        };

        let is_correct = answer.answer == question.correct_answer;
        if is_correct {
            correct += 1;
        }
        answers.push(AnswerRecord {
            question_id: question.id,
            user_answer: answer.answer.clone(),
            correct_answer: question.correct_answer.clone(),
            is_correct,
        });
    }

    let total = answers.len() as u32;
    GradedSubmission {
        answers,
        correct,
        total,
        score: percentage(correct, total),
    }
}

/// Integer percentage, truncated: 2 of 3 is 66.
pub fn percentage(correct: u32, total: u32) -> u8 {
    if total == 0 {
        return 0;
    }
    let pct = u64::from(correct) * 100 / u64::from(total);
    pct.min(100) as u8
}
