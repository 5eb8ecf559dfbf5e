//! Single entry point routing typed requests to the workflow and the exam engine.

mod request;
mod response;


pub use request::{Request, RequestError, RequestKind};
pub use response::Response;

use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use crate::store::{RecordStore, StoreError};
use crate::workflows::application::{ApplicationWorkflow, UserId, WorkflowError};
use crate::workflows::exam::{ExamConfig, ExamEngine, ExamError, QuestionBank};

/// Owns one workflow and one engine over the same store.
pub struct Dispatcher<S> {
    workflow: ApplicationWorkflow<S>,
    exam: ExamEngine<S>,
}

impl<S> Dispatcher<S>
where
    S: RecordStore + 'static,
{
    pub fn new(store: Arc<S>, bank: QuestionBank, config: ExamConfig) -> Self {
        let workflow = ApplicationWorkflow::new(Arc::clone(&store));
        let exam = ExamEngine::new(store, bank, config);
        Self { workflow, exam }
    }

    pub fn workflow(&self) -> &ApplicationWorkflow<S> {
        &self.workflow
    }

    pub fn exam(&self) -> &ExamEngine<S> {
        &self.exam
    }

    /// Runs one request. Domain refusals come back as `success: false` responses; only storage
    /// failures are returned as errors.
    pub fn handle(&self, request: Request) -> Result<Response, StoreError> {
        debug!(kind = %request.kind(), user_id = %request.user_id(), "dispatching request");

        match request {
            Request::CreateApplication {
                user_id,
                name,
                email,
            } => self
                .workflow
                .create(&user_id, &name, &email)
                .map(|record| Response::created(record.user_id))
                .or_else(workflow_failure),
            Request::GetApplication { user_id } => self
                .workflow
                .get(&user_id)
                .map(Response::application)
                .or_else(workflow_failure),
            Request::SubmitApplication { user_id } => self
                .workflow
                .submit(&user_id)
                .map(|_| Response::success("Application submitted successfully"))
                .or_else(workflow_failure),
            Request::GetStatus { user_id } => self
                .workflow
                .status_of(&user_id)
                .map(Response::status)
                .or_else(workflow_failure),
            Request::StartExam { user_id } => self
                .exam
                .start(&user_id)
                .map(Response::exam_started)
                .or_else(exam_failure),
            Request::SubmitExam {
                user_id,
                answers,
                started_at,
            } => self
                .exam
                .submit_timed(&user_id, &answers, started_at)
                .map(|outcome| Response::exam_graded(&outcome))
                .or_else(exam_failure),
            Request::GetExamResults { user_id } => self
                .exam
                .results(&user_id)
                .map(Response::results)
                .or_else(exam_failure),
        }
    }

    /// String-keyed boundary: unknown kinds and malformed payloads become failure responses.
    pub fn handle_raw(
        &self,
        kind: &str,
        user_id: UserId,
        payload: Value,
    ) -> Result<Response, StoreError> {
        match Request::from_parts(kind, user_id, payload) {
            Ok(request) => self.handle(request),
            Err(err) => Ok(Response::failure(err.to_string())),
        }
    }

    /// Request kinds paired with their help text.
    pub fn help() -> Vec<(RequestKind, &'static str)> {
        RequestKind::ALL
            .into_iter()
            .map(|kind| (kind, kind.description()))
            .collect()
    }
}

fn workflow_failure(err: WorkflowError) -> Result<Response, StoreError> {
    match err {
        WorkflowError::Store(err) => Err(err),
        other => Ok(Response::failure(other.to_string())),
    }
}

fn exam_failure(err: ExamError) -> Result<Response, StoreError> {
    match err {
        ExamError::Store(err) => Err(err),
        other => Ok(Response::failure(other.to_string())),
    }
}
