use std::env;
use std::fmt;
use std::path::PathBuf;

use crate::workflows::exam::{ExamConfig, QuestionBank, QuestionBankError};

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub storage: StorageConfig,
    pub telemetry: TelemetryConfig,
    pub exam: ExamConfig,
    pub question_bank: Option<PathBuf>,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let data_path = env::var("APP_DATA_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("data/ia_exam.json"));
        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let defaults = ExamConfig::default();
        let min_passing_score: u8 =
            parse_var("EXAM_MIN_PASSING_SCORE", defaults.min_passing_score)?;
        if min_passing_score > 100 {
            return Err(ConfigError::OutOfRange {
                key: "EXAM_MIN_PASSING_SCORE",
                expected: "a score between 0 and 100",
            });
        }
        let max_attempts: u32 = parse_var("EXAM_MAX_ATTEMPTS", defaults.max_attempts)?;
        if max_attempts == 0 {
            return Err(ConfigError::OutOfRange {
                key: "EXAM_MAX_ATTEMPTS",
                expected: "at least one attempt",
            });
        }
        let questions_per_exam: usize =
            parse_var("EXAM_QUESTIONS_PER_EXAM", defaults.questions_per_exam)?;
        if questions_per_exam == 0 {
            return Err(ConfigError::OutOfRange {
                key: "EXAM_QUESTIONS_PER_EXAM",
                expected: "at least one question",
            });
        }
        let time_limit_minutes: u32 =
            parse_var("EXAM_TIME_LIMIT_MINUTES", defaults.time_limit_minutes)?;
        let category = env::var("EXAM_CATEGORY").unwrap_or(defaults.category);
        let question_bank = env::var("EXAM_QUESTION_BANK").ok().map(PathBuf::from);

        Ok(Self {
            environment,
            storage: StorageConfig { data_path },
            telemetry: TelemetryConfig { log_level },
            exam: ExamConfig {
                min_passing_score,
                max_attempts,
                time_limit_minutes,
                questions_per_exam,
                category,
            },
            question_bank,
        })
    }

    /// The configured bank file, or the builtin bank when none is set.
    pub fn load_question_bank(&self) -> Result<QuestionBank, QuestionBankError> {
        match &self.question_bank {
            Some(path) => QuestionBank::from_path(path),
            None => Ok(QuestionBank::builtin()),
        }
    }
}

fn parse_var<T: std::str::FromStr>(key: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|_| ConfigError::InvalidNumber { key, value: raw }),
        Err(_) => Ok(default),
    }
}

/// Location of the persisted record store.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub data_path: PathBuf,
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidNumber {
        key: &'static str,
        value: String,
    },
    OutOfRange {
        key: &'static str,
        expected: &'static str,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidNumber { key, value } => {
                write!(f, "{key} must be a non-negative integer, got '{value}'")
            }
            ConfigError::OutOfRange { key, expected } => write!(f, "{key} must be {expected}"),
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::{Mutex, OnceLock};

    fn env_guard() -> &'static Mutex<()> {
        static GUARD: OnceLock<Mutex<()>> = OnceLock::new();
        GUARD.get_or_init(|| Mutex::new(()))
    }

    fn reset_env() {
        for key in [
            "APP_ENV",
            "APP_LOG_LEVEL",
            "APP_DATA_PATH",
            "EXAM_MIN_PASSING_SCORE",
            "EXAM_MAX_ATTEMPTS",
            "EXAM_TIME_LIMIT_MINUTES",
            "EXAM_QUESTIONS_PER_EXAM",
            "EXAM_CATEGORY",
            "EXAM_QUESTION_BANK",
        ] {
            env::remove_var(key);
        }
    }

    #[test]
    fn load_uses_defaults_when_env_missing() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        let config = AppConfig::load().expect("config loads with defaults");
        assert_eq!(config.environment, AppEnvironment::Development);
        assert_eq!(config.telemetry.log_level, "info");
        assert_eq!(config.storage.data_path, PathBuf::from("data/ia_exam.json"));
        assert_eq!(config.exam, ExamConfig::default());
        assert!(config.question_bank.is_none());
        assert_eq!(config.load_question_bank().expect("builtin").len(), 5);
    }

    #[test]
    fn exam_rules_come_from_env() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_ENV", "ci");
        env::set_var("EXAM_MIN_PASSING_SCORE", "80");
        env::set_var("EXAM_MAX_ATTEMPTS", "5");
        env::set_var("EXAM_QUESTIONS_PER_EXAM", " 3 ");
        env::set_var("EXAM_CATEGORY", "Network Security");
        let config = AppConfig::load().expect("config loads");
        reset_env();

        assert_eq!(config.environment, AppEnvironment::Test);
        assert_eq!(config.exam.min_passing_score, 80);
        assert_eq!(config.exam.max_attempts, 5);
        assert_eq!(config.exam.questions_per_exam, 3);
        assert_eq!(config.exam.time_limit_minutes, 120);
        assert_eq!(config.exam.category, "Network Security");
    }

    #[test]
    fn rejects_malformed_and_out_of_range_values() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("EXAM_MAX_ATTEMPTS", "three");
        let err = AppConfig::load().expect_err("non-numeric attempts");
        assert!(matches!(
            err,
            ConfigError::InvalidNumber {
                key: "EXAM_MAX_ATTEMPTS",
                ..
            }
        ));

        reset_env();
        env::set_var("EXAM_MIN_PASSING_SCORE", "120");
        let err = AppConfig::load().expect_err("score above 100");
        assert!(matches!(
            err,
            ConfigError::OutOfRange {
                key: "EXAM_MIN_PASSING_SCORE",
                ..
            }
        ));
        reset_env();
    }
}
