use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::workflows::application::UserId;
use crate::workflows::exam::SubmittedAnswer;

/// Closed set of caller-facing request kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestKind {
    CreateApplication,
    GetApplication,
    SubmitApplication,
    GetStatus,
    StartExam,
    SubmitExam,
    GetExamResults,
}

impl RequestKind {
    pub const ALL: [RequestKind; 7] = [
        RequestKind::CreateApplication,
        RequestKind::GetApplication,
        RequestKind::SubmitApplication,
        RequestKind::GetStatus,
        RequestKind::StartExam,
        RequestKind::SubmitExam,
        RequestKind::GetExamResults,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            RequestKind::CreateApplication => "create_application",
            RequestKind::GetApplication => "get_application",
            RequestKind::SubmitApplication => "submit_application",
            RequestKind::GetStatus => "get_status",
            RequestKind::StartExam => "start_exam",
            RequestKind::SubmitExam => "submit_exam",
            RequestKind::GetExamResults => "get_exam_results",
        }
    }

    pub const fn description(self) -> &'static str {
        match self {
            RequestKind::CreateApplication => "Create a new application",
            RequestKind::GetApplication => "Get your application details",
            RequestKind::SubmitApplication => "Submit your application for review",
            RequestKind::GetStatus => "Check your application status",
            RequestKind::StartExam => "Start the IA exam",
            RequestKind::SubmitExam => "Submit exam answers",
            RequestKind::GetExamResults => "View your exam results",
        }
    }
}

impl fmt::Display for RequestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RequestKind {
    type Err = RequestError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        RequestKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == value)
            .ok_or_else(|| RequestError::Unknown(value.to_string()))
    }
}

/// A typed request with its payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    CreateApplication {
        user_id: UserId,
        name: String,
        email: String,
    },
    GetApplication {
        user_id: UserId,
    },
    SubmitApplication {
        user_id: UserId,
    },
    GetStatus {
        user_id: UserId,
    },
    StartExam {
        user_id: UserId,
    },
    SubmitExam {
        user_id: UserId,
        answers: Vec<SubmittedAnswer>,
        started_at: Option<DateTime<Utc>>,
    },
    GetExamResults {
        user_id: UserId,
    },
}

#[derive(Debug, Default, Deserialize)]
struct CreatePayload {
    #[serde(default)]
    name: String,
    #[serde(default)]
    email: String,
}

#[derive(Debug, Default, Deserialize)]
struct SubmitExamPayload {
    #[serde(default)]
    answers: Vec<SubmittedAnswer>,
    #[serde(default)]
    started_at: Option<DateTime<Utc>>,
}

impl Request {
    /// Builds a request from a kind name, a user id, and a JSON keyword payload. Kinds without a
    /// payload ignore it; a `null` payload is treated as `{}`.
    pub fn from_parts(kind: &str, user_id: UserId, payload: Value) -> Result<Self, RequestError> {
        let kind: RequestKind = kind.parse()?;
        let payload = match payload {
            Value::Null => Value::Object(Default::default()),
            other => other,
        };

        let request = match kind {
            RequestKind::CreateApplication => {
                let CreatePayload { name, email } = parse_payload(kind, payload)?;
                Request::CreateApplication {
                    user_id,
                    name,
                    email,
                }
            }
            RequestKind::GetApplication => Request::GetApplication { user_id },
            RequestKind::SubmitApplication => Request::SubmitApplication { user_id },
            RequestKind::GetStatus => Request::GetStatus { user_id },
            RequestKind::StartExam => Request::StartExam { user_id },
            RequestKind::SubmitExam => {
                let SubmitExamPayload {
                    answers,
                    started_at,
                } = parse_payload(kind, payload)?;
                Request::SubmitExam {
                    user_id,
                    answers,
                    started_at,
                }
            }
            RequestKind::GetExamResults => Request::GetExamResults { user_id },
        };
        Ok(request)
    }

    pub fn kind(&self) -> RequestKind {
        match self {
            Request::CreateApplication { .. } => RequestKind::CreateApplication,
            Request::GetApplication { .. } => RequestKind::GetApplication,
            Request::SubmitApplication { .. } => RequestKind::SubmitApplication,
            Request::GetStatus { .. } => RequestKind::GetStatus,
            Request::StartExam { .. } => RequestKind::StartExam,
            Request::SubmitExam { .. } => RequestKind::SubmitExam,
            Request::GetExamResults { .. } => RequestKind::GetExamResults,
        }
    }

    pub fn user_id(&self) -> &UserId {
        match self {
            Request::CreateApplication { user_id, .. }
            | Request::GetApplication { user_id }
            | Request::SubmitApplication { user_id }
            | Request::GetStatus { user_id }
            | Request::StartExam { user_id }
            | Request::SubmitExam { user_id, .. }
            | Request::GetExamResults { user_id } => user_id,
        }
    }
}

fn parse_payload<T>(kind: RequestKind, payload: Value) -> Result<T, RequestError>
where
    T: for<'de> Deserialize<'de>,
{
    serde_json::from_value(payload).map_err(|source| RequestError::Payload { kind, source })
}

#[derive(Debug, thiserror::Error)]
pub enum RequestError {
    #[error("Unknown request type: {0}")]
    Unknown(String),
    #[error("Invalid request payload for {kind}: {source}")]
    Payload {
        kind: RequestKind,
        source: serde_json::Error,
    },
}
