//! Shared result and status types for the orchestration components.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Caller-visible status of the catch-up pipeline, derived from the
/// run-history ledger rather than any in-process flag
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatchUpStatus {
    pub running: bool,
    pub processing_business_date: Option<NaiveDate>,
}

impl CatchUpStatus {
    pub fn idle() -> Self {
        Self {
            running: false,
            processing_business_date: None,
        }
    }
}

/// Outcome of a catch-up trigger request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CatchUpTrigger {
    /// A catch-up pass was launched for the inclusive date range
    Accepted { from: NaiveDate, to: NaiveDate },
    /// The oldest processed date already equals the current COB date;
    /// nothing was launched
    UpToDate,
}

/// Result envelope returned by the operator-facing inline entry point
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandProcessingResult {
    pub command_id: Uuid,
    pub job_name: String,
    pub loan_ids: Vec<i64>,
    pub run_id: Uuid,
}

/// Summary of one job run, aggregated across its partitions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunReport {
    pub run_id: Uuid,
    pub job_name: String,
    pub business_date: NaiveDate,
    /// Loans whose full step chain completed and whose lock was released
    pub processed_loan_ids: Vec<i64>,
    /// Loans hard-locked by a step failure during this run
    pub failed_loan_ids: Vec<i64>,
    /// Eligible loans skipped because their lock could not be claimed
    pub skipped_loan_ids: Vec<i64>,
}
