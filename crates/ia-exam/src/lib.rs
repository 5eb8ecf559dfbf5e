//! Applicant workflow and Information Assurance exam engine.
//!
//! The [`workflows::application`] state machine moves an applicant from draft through review to
//! exam eligibility, and the [`workflows::exam`] engine draws, grades, and records exam attempts.
//! Both delegate persistence to a shared [`store::RecordStore`]. Callers talk to the pair through
//! the [`dispatch::Dispatcher`].

pub mod config;
pub mod dispatch;
pub mod error;
pub mod store;
pub mod telemetry;
pub mod workflows;
