//! Applicant intake and review state machine.
//!
//! Applications start as `DRAFT`, are submitted by the applicant, and are approved (which opens
//! the exam) or rejected by a reviewer. Passing the exam closes the workflow in `APPROVED`.

pub mod domain;
pub mod service;

#[cfg(test)]
mod tests;

pub use domain::{
    is_valid_email, ApplicationRecord, ApplicationStatus, AuditAction, AuditEntry, UserId,
};
pub use service::{ApplicationWorkflow, WorkflowError};
