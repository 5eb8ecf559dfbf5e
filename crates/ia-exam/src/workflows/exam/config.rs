use serde::{Deserialize, Serialize};

/// Exam rules injected into the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExamConfig {
    pub min_passing_score: u8,
    pub max_attempts: u32,
    pub time_limit_minutes: u32,
    pub questions_per_exam: usize,
    pub category: String,
}

impl Default for ExamConfig {
    fn default() -> Self {
        Self {
            min_passing_score: 70,
            max_attempts: 3,
            time_limit_minutes: 120,
            questions_per_exam: 5,
            category: "General".to_string(),
        }
    }
}
