//! Job catalog and run-history entities.
//!
//! A `ScheduledJobDetail` row registers a job by name; each launch appends
//! a `JobRun` row that is created at start and finalized at end. Run-scoped
//! parameters are immutable once attached; the serialized loan-ID list is
//! persisted as a `CustomJobParameter` and referenced by ID to keep the run
//! row bounded.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Terminal and in-flight statuses of one job run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobRunStatus {
    /// Run-history row created, execution in progress
    Started,
    /// Run finished with every partition terminal
    Completed,
    /// Run could not launch or aborted at the batch level
    Failed,
}

impl JobRunStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    pub fn is_active(&self) -> bool {
        matches!(self, Self::Started)
    }
}

impl fmt::Display for JobRunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Started => write!(f, "started"),
            Self::Completed => write!(f, "completed"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

/// Scheduling metadata for a registered job.
///
/// Cron expressions are catalog metadata consumed by an external trigger;
/// the orchestrator itself only resolves jobs by name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledJobDetail {
    pub job_name: String,
    /// Step category the job resolves its implementations from
    pub step_category: String,
    pub cron_expression: Option<String>,
    pub active: bool,
}

impl ScheduledJobDetail {
    pub fn new(job_name: impl Into<String>, step_category: impl Into<String>) -> Self {
        Self {
            job_name: job_name.into(),
            step_category: step_category.into(),
            cron_expression: None,
            active: true,
        }
    }
}

/// Run-scoped key/value parameter attached to one execution
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobParameter {
    pub name: String,
    pub value: String,
}

impl JobParameter {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Out-of-row parameter payload referenced by ID from a run, used for
/// unbounded values such as serialized loan-ID lists
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomJobParameter {
    pub id: Uuid,
    pub value: String,
}

/// One row of the job run-history ledger
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobRun {
    pub run_id: Uuid,
    pub job_name: String,
    pub status: JobRunStatus,
    pub business_date: NaiveDate,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub error_message: Option<String>,
    pub parameters: Vec<JobParameter>,
}

impl JobRun {
    pub fn start(
        job_name: impl Into<String>,
        business_date: NaiveDate,
        parameters: Vec<JobParameter>,
    ) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            job_name: job_name.into(),
            status: JobRunStatus::Started,
            business_date,
            started_at: Utc::now(),
            finished_at: None,
            error_message: None,
            parameters,
        }
    }

    pub fn parameter(&self, name: &str) -> Option<&str> {
        self.parameters
            .iter()
            .find(|p| p.name == name)
            .map(|p| p.value.as_str())
    }

    pub fn has_parameter(&self, name: &str) -> bool {
        self.parameters.iter().any(|p| p.name == name)
    }
}
