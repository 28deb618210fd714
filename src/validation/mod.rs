//! Request body validation.
//!
//! # Data Flow
//! ```text
//! decoded body (JSON object or form fields)
//!     → schema.rs (generic evaluation of field → constraint rules)
//!     → submission.rs (typed SubmissionRequest)
//! ```
//!
//! # Design Decisions
//! - Every field is checked; the error lists all failures, not the first
//! - Validation has no side effects

pub mod schema;
pub mod submission;

pub use schema::{validate, Constraint, FieldIssue, FieldRule, IssueCode, Schema};
pub use submission::SubmissionRequest;

/// Body rejected by the validator.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("validation failed for {} field issue(s)", .issues.len())]
pub struct ValidationError {
    issues: Vec<FieldIssue>,
}

impl ValidationError {
    pub fn new(issues: Vec<FieldIssue>) -> Self {
        Self { issues }
    }

    /// The body could not be decoded at all.
    pub fn malformed_body(reason: impl Into<String>) -> Self {
        Self::new(vec![FieldIssue::new("body", IssueCode::MalformedBody, reason)])
    }

    pub fn issues(&self) -> &[FieldIssue] {
        &self.issues
    }
}
