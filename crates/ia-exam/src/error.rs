use crate::config::ConfigError;
use crate::store::StoreError;
use crate::telemetry::TelemetryError;
use crate::workflows::application::WorkflowError;
use crate::workflows::exam::QuestionBankError;
use std::fmt;

/// Process-level failure reported by the binary before exiting.
#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Io(std::io::Error),
    Store(StoreError),
    QuestionBank(QuestionBankError),
    Export(csv::Error),
    Workflow(WorkflowError),
    /// A request the workflow or engine declined, carrying the caller-facing message.
    Refused(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::Store(err) => write!(f, "storage error: {}", err),
            AppError::QuestionBank(err) => write!(f, "question bank error: {}", err),
            AppError::Export(err) => write!(f, "export error: {}", err),
            AppError::Workflow(err) => write!(f, "{}", err),
            AppError::Refused(message) => write!(f, "{}", message),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Telemetry(err) => Some(err),
            AppError::Io(err) => Some(err),
            AppError::Store(err) => Some(err),
            AppError::QuestionBank(err) => Some(err),
            AppError::Export(err) => Some(err),
            AppError::Workflow(err) => Some(err),
            AppError::Refused(_) => None,
        }
    }
}

impl AppError {
    /// Domain refusals are expected outcomes; everything else is an operational failure.
    pub fn is_refusal(&self) -> bool {
        match self {
            AppError::Workflow(WorkflowError::Store(_)) => false,
            AppError::Workflow(_) | AppError::Refused(_) => true,
            _ => false,
        }
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<TelemetryError> for AppError {
    fn from(value: TelemetryError) -> Self {
        Self::Telemetry(value)
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<StoreError> for AppError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

impl From<QuestionBankError> for AppError {
    fn from(value: QuestionBankError) -> Self {
        Self::QuestionBank(value)
    }
}

impl From<csv::Error> for AppError {
    fn from(value: csv::Error) -> Self {
        Self::Export(value)
    }
}

impl From<WorkflowError> for AppError {
    fn from(value: WorkflowError) -> Self {
        Self::Workflow(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::application::UserId;

    #[test]
    fn domain_refusals_are_separated_from_storage_failures() {
        let missing = AppError::from(WorkflowError::NotFound(UserId::from("ghost")));
        assert!(missing.is_refusal());
        assert_eq!(missing.to_string(), "Application not found");

        let offline = AppError::from(WorkflowError::Store(StoreError::Unavailable(
            "disk full".to_string(),
        )));
        assert!(!offline.is_refusal());

        let store = AppError::from(StoreError::NotFound);
        assert!(!store.is_refusal());
        assert!(store.to_string().starts_with("storage error: "));
    }
}
