//! # Business Step Registry
//!
//! Ordered step configuration per named job, plus the job catalog itself.
//! Operators reorder or drop processing stages here without a deployment;
//! step *behavior* is supplied by the implementations in
//! [`step_registry`](super::step_registry).
//!
//! Step rows are seeded at deployment and mutated only through
//! [`BusinessStepRegistry::update_step_order`], which is all-or-nothing:
//! either the whole reorder commits or no step changes.

use crate::error::{CobError, Result};
use crate::models::{AvailableBusinessStep, BusinessStep, JobBusinessStepConfig, ScheduledJobDetail};
use crate::registry::step_registry::StepImplementationRegistry;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, instrument};

/// Thin ordered-list store for per-job step configuration
pub struct BusinessStepRegistry {
    jobs: Arc<RwLock<HashMap<String, ScheduledJobDetail>>>,
    steps: Arc<RwLock<HashMap<String, Vec<BusinessStep>>>>,
    implementations: Arc<StepImplementationRegistry>,
}

impl BusinessStepRegistry {
    pub fn new(implementations: Arc<StepImplementationRegistry>) -> Self {
        Self {
            jobs: Arc::new(RwLock::new(HashMap::new())),
            steps: Arc::new(RwLock::new(HashMap::new())),
            implementations,
        }
    }

    /// Register a job in the catalog with its seeded step ordering.
    /// Replaces any previous configuration for the job wholesale.
    pub async fn register_job(&self, job: ScheduledJobDetail, seeded_steps: Vec<BusinessStep>) {
        info!(
            job_name = %job.job_name,
            step_count = seeded_steps.len(),
            "Registered job with seeded step configuration"
        );
        let job_name = job.job_name.clone();
        self.jobs.write().await.insert(job_name.clone(), job);
        let mut ordered = seeded_steps;
        ordered.sort_by_key(|s| s.order);
        self.steps.write().await.insert(job_name, ordered);
    }

    /// Look up a job's catalog entry
    pub async fn job(&self, job_name: &str) -> Result<ScheduledJobDetail> {
        self.jobs
            .read()
            .await
            .get(job_name)
            .cloned()
            .ok_or_else(|| CobError::JobNotFound {
                job_name: job_name.to_string(),
            })
    }

    /// The resolved, ordered pipeline for a job
    pub async fn configured_steps_for_job(&self, job_name: &str) -> Result<Vec<BusinessStep>> {
        let steps = self.steps.read().await;
        steps
            .get(job_name)
            .cloned()
            .ok_or_else(|| CobError::JobNotFound {
                job_name: job_name.to_string(),
            })
    }

    /// Same, as the derived config view
    pub async fn step_config_for_job(&self, job_name: &str) -> Result<JobBusinessStepConfig> {
        Ok(JobBusinessStepConfig {
            job_name: job_name.to_string(),
            steps: self.configured_steps_for_job(job_name).await?,
        })
    }

    /// Reorder a job's existing steps, all-or-nothing.
    ///
    /// Every submitted step name must already belong to the job — this
    /// path reorders existing slots, it never creates steps. Orders are
    /// renumbered contiguously from 1 in the submitted sequence.
    #[instrument(skip(self, new_ordered_steps))]
    pub async fn update_step_order(
        &self,
        job_name: &str,
        new_ordered_steps: &[BusinessStep],
    ) -> Result<Vec<BusinessStep>> {
        let mut steps = self.steps.write().await;
        let current = steps
            .get(job_name)
            .ok_or_else(|| CobError::JobNotFound {
                job_name: job_name.to_string(),
            })?;

        // Validate the whole batch before mutating anything
        for submitted in new_ordered_steps {
            if !current.iter().any(|s| s.step_name == submitted.step_name) {
                return Err(CobError::StepNotInJob {
                    job_name: job_name.to_string(),
                    step_name: submitted.step_name.clone(),
                });
            }
        }

        let mut reordered: Vec<BusinessStep> = new_ordered_steps.to_vec();
        reordered.sort_by_key(|s| s.order);
        for (i, step) in reordered.iter_mut().enumerate() {
            step.order = i as i32 + 1;
        }

        info!(
            job_name = job_name,
            step_count = reordered.len(),
            "Updated business step order"
        );
        steps.insert(job_name.to_string(), reordered.clone());
        Ok(reordered)
    }

    /// Implementations available under the job's step category. An empty
    /// result signals "no steps available", not an error.
    pub async fn available_steps_for_job(
        &self,
        job_name: &str,
    ) -> Result<Vec<AvailableBusinessStep>> {
        let job = self.job(job_name).await?;
        Ok(self.implementations.available_steps(&job.step_category))
    }

    /// Ordered step names for a job, for resolution against the
    /// implementation registry
    pub async fn configured_step_names(&self, job_name: &str) -> Result<Vec<String>> {
        Ok(self
            .configured_steps_for_job(job_name)
            .await?
            .into_iter()
            .map(|s| s.step_name)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> BusinessStepRegistry {
        BusinessStepRegistry::new(Arc::new(StepImplementationRegistry::new()))
    }

    fn seeded() -> Vec<BusinessStep> {
        vec![
            BusinessStep::new("ACCRUE_INTEREST", 1),
            BusinessStep::new("APPLY_PENALTY", 2),
            BusinessStep::new("UPDATE_DELINQUENCY", 3),
        ]
    }

    #[tokio::test]
    async fn test_unknown_job_is_not_found() {
        let registry = registry();
        let err = registry.configured_steps_for_job("NOPE").await.unwrap_err();
        assert_eq!(
            err,
            CobError::JobNotFound {
                job_name: "NOPE".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_configured_steps_are_ordered() {
        let registry = registry();
        registry
            .register_job(
                ScheduledJobDetail::new("LOAN_COB", "loan_cob"),
                vec![
                    BusinessStep::new("UPDATE_DELINQUENCY", 3),
                    BusinessStep::new("ACCRUE_INTEREST", 1),
                    BusinessStep::new("APPLY_PENALTY", 2),
                ],
            )
            .await;

        let steps = registry.configured_steps_for_job("LOAN_COB").await.unwrap();
        let orders: Vec<i32> = steps.iter().map(|s| s.order).collect();
        assert_eq!(orders, vec![1, 2, 3]);
        assert_eq!(steps[0].step_name, "ACCRUE_INTEREST");
    }

    #[tokio::test]
    async fn test_update_step_order_renumbers_contiguously() {
        let registry = registry();
        registry
            .register_job(ScheduledJobDetail::new("LOAN_COB", "loan_cob"), seeded())
            .await;

        let reordered = registry
            .update_step_order(
                "LOAN_COB",
                &[
                    BusinessStep::new("APPLY_PENALTY", 10),
                    BusinessStep::new("ACCRUE_INTEREST", 20),
                ],
            )
            .await
            .unwrap();

        let names: Vec<&str> = reordered.iter().map(|s| s.step_name.as_str()).collect();
        assert_eq!(names, vec!["APPLY_PENALTY", "ACCRUE_INTEREST"]);
        let orders: Vec<i32> = reordered.iter().map(|s| s.order).collect();
        assert_eq!(orders, vec![1, 2]);
    }

    #[tokio::test]
    async fn test_update_step_order_is_all_or_nothing() {
        let registry = registry();
        registry
            .register_job(ScheduledJobDetail::new("LOAN_COB", "loan_cob"), seeded())
            .await;

        let err = registry
            .update_step_order(
                "LOAN_COB",
                &[
                    BusinessStep::new("ACCRUE_INTEREST", 1),
                    BusinessStep::new("NOT_A_STEP", 2),
                ],
            )
            .await
            .unwrap_err();
        assert_eq!(
            err,
            CobError::StepNotInJob {
                job_name: "LOAN_COB".to_string(),
                step_name: "NOT_A_STEP".to_string()
            }
        );

        // Mixed valid/invalid batch left the configuration untouched
        let steps = registry.configured_steps_for_job("LOAN_COB").await.unwrap();
        assert_eq!(steps, seeded());
    }

    #[tokio::test]
    async fn test_available_steps_empty_when_category_unpopulated() {
        let registry = registry();
        registry
            .register_job(ScheduledJobDetail::new("LOAN_COB", "loan_cob"), seeded())
            .await;
        let available = registry.available_steps_for_job("LOAN_COB").await.unwrap();
        assert!(available.is_empty());
    }
}
