//! Business step configuration entities.
//!
//! A business step is one named, orderable unit of processing applied to
//! a loan during a COB run. Step *behavior* lives in the implementations
//! registered with the step registry; these types only carry the ordering
//! configuration per job.

use serde::{Deserialize, Serialize};

/// One ordered step belonging to a named job.
///
/// Within a job, `order` values are unique and form a contiguous ranking
/// starting at 1.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusinessStep {
    pub step_name: String,
    pub order: i32,
}

impl BusinessStep {
    pub fn new(step_name: impl Into<String>, order: i32) -> Self {
        Self {
            step_name: step_name.into(),
            order,
        }
    }
}

/// The resolved, ordered pipeline for a job. Derived read view over the
/// step rows grouped by job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobBusinessStepConfig {
    pub job_name: String,
    pub steps: Vec<BusinessStep>,
}

/// A step implementation available under a job's category, as exposed to
/// operators choosing a step ordering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailableBusinessStep {
    pub step_name: String,
    pub human_readable_name: String,
}
