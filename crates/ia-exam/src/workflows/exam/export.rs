use std::io::Write;

use serde::Serialize;

use super::domain::ExamAttempt;

#[derive(Debug, Serialize)]
struct AttemptRow<'a> {
    attempt_id: u64,
    user_id: &'a str,
    attempt_number: u32,
    score: u8,
    passed: bool,
    time_taken_minutes: u32,
    category: &'a str,
    timestamp: String,
}

/// Writes attempts as CSV in the order given. The header row is emitted with the first record.
pub fn write_attempts_csv<W: Write>(
    attempts: &[ExamAttempt],
    writer: W,
) -> Result<(), csv::Error> {
    let mut out = csv::Writer::from_writer(writer);
    for attempt in attempts {
        out.serialize(AttemptRow {
            attempt_id: attempt.id.0,
            user_id: attempt.user_id.as_str(),
            attempt_number: attempt.attempt_number,
            score: attempt.score,
            passed: attempt.passed,
            time_taken_minutes: attempt.time_taken_minutes,
            category: &attempt.category,
            timestamp: attempt.timestamp.to_rfc3339(),
        })?;
    }
    out.flush()?;
    Ok(())
}
