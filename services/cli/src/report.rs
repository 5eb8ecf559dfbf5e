use chrono::{DateTime, Utc};
use ia_exam::dispatch::RequestKind;
use ia_exam::workflows::application::{ApplicationRecord, ApplicationStatus, AuditEntry, UserId};
use ia_exam::workflows::exam::{AnswerRecord, ExamAttempt, ExamSession};

pub(crate) fn format_timestamp(timestamp: &DateTime<Utc>) -> String {
    timestamp.format("%Y-%m-%d %H:%M:%S").to_string()
}

pub(crate) fn application(record: &ApplicationRecord) -> String {
    [
        format!("Application for {}", record.user_id),
        format!("  Name: {}", record.name),
        format!("  Email: {}", record.email),
        format!("  Status: {}", record.status),
        format!("  Created: {}", format_timestamp(&record.created_at)),
        format!("  Updated: {}", format_timestamp(&record.updated_at)),
    ]
    .join("\n")
}

pub(crate) fn status(user_id: &UserId, status: ApplicationStatus) -> String {
    format!("{user_id}: {status}")
}

/// Question sheet handed to the candidate; never includes the answer key.
pub(crate) fn session(session: &ExamSession) -> String {
    let mut lines = vec![
        format!("Exam for {}", session.user_id),
        format!(
            "  Started: {}  Deadline: {} ({} minutes)",
            format_timestamp(&session.started_at),
            format_timestamp(&session.deadline),
            session.time_limit_minutes
        ),
    ];
    for (index, question) in session.questions.iter().enumerate() {
        lines.push(String::new());
        lines.push(format!(
            "Q{} [id {}, {}] {}",
            index + 1,
            question.id,
            question.category,
            question.prompt
        ));
        for option in &question.options {
            lines.push(format!("  {}) {}", option.label, option.text));
        }
    }
    lines.join("\n")
}

pub(crate) fn outcome(
    message: &str,
    score: u8,
    passed: bool,
    correct_answers: u32,
    total_questions: u32,
) -> String {
    [
        message.to_string(),
        format!("  Score: {score}%"),
        format!("  Result: {}", if passed { "PASSED" } else { "FAILED" }),
        format!("  Correct: {correct_answers}/{total_questions}"),
    ]
    .join("\n")
}

/// Latest attempt in detail followed by the full history, most recent first.
pub(crate) fn exam_report(
    user_id: &UserId,
    attempts: &[ExamAttempt],
    latest_answers: &[AnswerRecord],
    attempts_remaining: u32,
) -> String {
    let Some(latest) = attempts.first() else {
        return "No exam results found.".to_string();
    };

    let mut lines = vec![
        format!("EXAM REPORT - {user_id}"),
        format!("  Score: {}%", latest.score),
        format!(
            "  Status: {}",
            if latest.passed { "PASSED" } else { "FAILED" }
        ),
        format!("  Attempt: {}", latest.attempt_number),
        format!("  Date: {}", format_timestamp(&latest.timestamp)),
        format!("  Category: {}", latest.category),
        format!("  Attempts remaining: {attempts_remaining}"),
    ];

    if !latest_answers.is_empty() {
        lines.push(String::new());
        lines.push("Answers".to_string());
        for answer in latest_answers {
            let verdict = if answer.is_correct {
                "correct".to_string()
            } else {
                format!("expected {}", answer.correct_answer)
            };
            lines.push(format!(
                "  Q{:<3} {:<3} {}",
                answer.question_id.0, answer.user_answer, verdict
            ));
        }
    }

    if attempts.len() > 1 {
        lines.push(String::new());
        lines.push("History".to_string());
        for attempt in attempts {
            lines.push(format!(
                "  #{:<3} {:>3}%  {:<6}  {:>3} min  {}",
                attempt.attempt_number,
                attempt.score,
                if attempt.passed { "PASSED" } else { "FAILED" },
                attempt.time_taken_minutes,
                format_timestamp(&attempt.timestamp)
            ));
        }
    }
    lines.join("\n")
}

pub(crate) fn audit_trail(user_id: &UserId, entries: &[AuditEntry]) -> String {
    if entries.is_empty() {
        return format!("No audit entries for {user_id}");
    }
    entries
        .iter()
        .map(|entry| {
            format!(
                "{}  {:<20}  {}",
                format_timestamp(&entry.timestamp),
                entry.action.label(),
                entry.details
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub(crate) fn commands(help: &[(RequestKind, &'static str)]) -> String {
    help.iter()
        .map(|(kind, text)| format!("{:<20} {}", kind.as_str(), text))
        .collect::<Vec<_>>()
        .join("\n")
}
