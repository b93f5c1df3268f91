//! # Structured Error Handling
//!
//! Error taxonomy for the COB orchestration core. Batch-level failures
//! (job resolution, job launch, lock claims) surface as errors to the
//! caller; per-loan step failures never do — they are recorded as hard
//! locks on the offending loan and the run continues.

use chrono::NaiveDate;
use thiserror::Error;

/// Errors surfaced by the COB orchestration components
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CobError {
    /// Named job is not present in the job catalog
    #[error("Job '{job_name}' not found")]
    JobNotFound { job_name: String },

    /// A submitted step name does not belong to the job's configured steps
    #[error("Step '{step_name}' does not belong to job '{job_name}'")]
    StepNotInJob {
        job_name: String,
        step_name: String,
    },

    /// One or more loans in a claim batch hold locks that cannot be overruled
    #[error("Loan account locks cannot be overruled for loans {loan_ids:?}")]
    LockCannotBeOverruled { loan_ids: Vec<i64> },

    /// Job launch failed or terminated with a non-completed status
    #[error("Execution of job '{job_name}' failed: {reason}")]
    JobExecutionFailed { job_name: String, reason: String },

    /// A COB catch-up pass is already in flight
    #[error("Loan COB catch-up is already running (processing business date {processing_business_date:?})")]
    CatchUpAlreadyRunning {
        processing_business_date: Option<NaiveDate>,
    },

    /// Requested loan IDs do not reference existing loans
    #[error("Loans {loan_ids:?} not found")]
    LoanNotFound { loan_ids: Vec<i64> },

    /// Request-level validation failure
    #[error("Validation error: {reason}")]
    Validation { reason: String },

    /// Invalid argument passed to an orchestration operation
    #[error("Invalid argument: {reason}")]
    InvalidArgument { reason: String },

    /// Configuration could not be loaded or parsed
    #[error("Configuration error: {reason}")]
    ConfigurationError { reason: String },
}

pub type Result<T> = std::result::Result<T, CobError>;
