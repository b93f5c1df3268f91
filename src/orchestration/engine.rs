//! # Job Execution Engine
//!
//! Runs the configured business steps over partitions of loans for one
//! business date, records run history, and isolates per-loan failures.
//!
//! ## Execution shape
//!
//! - Partitions within one run are processed concurrently on spawned
//!   workers, bounded by `max_concurrent_partitions`.
//! - Loans within a partition are processed sequentially.
//! - Steps within a loan are strictly sequential: each step's output is
//!   the next step's input.
//!
//! ## Failure semantics
//!
//! Batch-level failures (unknown job, unresolvable steps, panicked
//! worker) finalize the run as failed and surface `JobExecutionFailed`.
//! A per-loan step failure hard-locks that loan with the error message
//! and the run continues for the remaining loans.

use crate::config::CobConfig;
use crate::constants::{
    BUSINESS_DATE_PARAMETER_NAME, IS_CATCH_UP_PARAMETER_NAME, LOAN_IDS_PARAMETER_NAME,
};
use crate::error::{CobError, Result};
use crate::models::{JobParameter, JobRun, JobRunStatus, LoanCobPartition, LockOwner};
use crate::orchestration::context::CobContext;
use crate::orchestration::lock_manager::AccountLockManager;
use crate::orchestration::partitioner::{slice_into_partitions, LoanCobPartitioner};
use crate::orchestration::types::RunReport;
use crate::registry::step_registry::CobBusinessStep;
use crate::registry::{BusinessStepRegistry, StepImplementationRegistry};
use crate::store::{JobRunStore, LoanStore};
use chrono::NaiveDate;
use futures::future::join_all;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

pub struct JobExecutionEngine {
    config: CobConfig,
    registry: Arc<BusinessStepRegistry>,
    implementations: Arc<StepImplementationRegistry>,
    partitioner: Arc<LoanCobPartitioner>,
    lock_manager: Arc<AccountLockManager>,
    loan_store: Arc<dyn LoanStore>,
    run_store: Arc<dyn JobRunStore>,
}

impl JobExecutionEngine {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        config: CobConfig,
        registry: Arc<BusinessStepRegistry>,
        implementations: Arc<StepImplementationRegistry>,
        partitioner: Arc<LoanCobPartitioner>,
        lock_manager: Arc<AccountLockManager>,
        loan_store: Arc<dyn LoanStore>,
        run_store: Arc<dyn JobRunStore>,
    ) -> Self {
        Self {
            config,
            registry,
            implementations,
            partitioner,
            lock_manager,
            loan_store,
            run_store,
        }
    }

    pub fn config(&self) -> &CobConfig {
        &self.config
    }

    /// Synchronous inline entry point: claim the explicit loan set under
    /// inline ownership and run the named job against it on the calling
    /// task.
    #[instrument(skip(self, loan_ids, ctx), fields(batch_size = loan_ids.len()))]
    pub async fn execute(
        &self,
        loan_ids: &[i64],
        job_name: &str,
        ctx: &CobContext,
    ) -> Result<RunReport> {
        if self.config.partition_size == 0 {
            return Err(CobError::InvalidArgument {
                reason: "partition size must be a positive integer".to_string(),
            });
        }

        let steps = self.resolve_job_steps(job_name).await?;

        let mut batch: Vec<i64> = loan_ids.to_vec();
        batch.sort_unstable();
        batch.dedup();

        // Inline claims must be visible to concurrent batch workers
        // before the run starts; the store commits them atomically.
        self.lock_manager
            .claim(&batch, LockOwner::LoanInlineCobProcessing, &ctx.principal)
            .await?;

        let run_id = self
            .create_run(job_name, ctx.business_date, &batch, ctx.is_catch_up)
            .await;

        let mut processed = Vec::new();
        let mut failed = Vec::new();
        for partition in slice_into_partitions(&batch, self.config.partition_size) {
            let (ok, bad) = process_partition(
                Arc::clone(&self.loan_store),
                Arc::clone(&self.lock_manager),
                partition.into_loan_ids(),
                steps.clone(),
                ctx.clone(),
            )
            .await;
            processed.extend(ok);
            failed.extend(bad);
        }

        self.run_store
            .finalize_run(run_id, JobRunStatus::Completed, None)
            .await;
        info!(
            job_name = job_name,
            run_id = %run_id,
            processed = processed.len(),
            failed = failed.len(),
            "Inline COB run finished"
        );

        Ok(RunReport {
            run_id,
            job_name: job_name.to_string(),
            business_date: ctx.business_date,
            processed_loan_ids: processed,
            failed_loan_ids: failed,
            skipped_loan_ids: Vec::new(),
        })
    }

    /// Scheduled/catch-up entry point: partition the eligible population
    /// for `business_date` and process the partitions concurrently.
    ///
    /// Loans whose locks cannot be claimed are skipped (reported, not
    /// fatal) so one blocked loan never stalls a business day.
    #[instrument(skip(self, base_ctx))]
    pub async fn run_for_date(
        &self,
        business_date: NaiveDate,
        is_catch_up: bool,
        job_name: &str,
        base_ctx: &CobContext,
    ) -> Result<RunReport> {
        let mut ctx = base_ctx.for_date(business_date);
        if is_catch_up {
            ctx = ctx.as_catch_up();
        }

        let steps = self.resolve_job_steps(job_name).await?;

        let partitions = self
            .partitioner
            .retrieve_loan_cob_partitions(
                self.config.days_behind,
                business_date,
                false,
                self.config.partition_size,
            )
            .await?;
        let eligible: Vec<i64> = partitions
            .into_iter()
            .flat_map(LoanCobPartition::into_loan_ids)
            .collect();

        let (claimable, skipped) = self
            .lock_manager
            .partition_claimable(&eligible, &ctx.principal)
            .await;
        if !skipped.is_empty() {
            warn!(
                business_date = %business_date,
                skipped_loan_ids = ?skipped,
                "Skipping loans with non-overrulable locks"
            );
        }
        self.lock_manager
            .claim(&claimable, LockOwner::LoanCobPartitioning, &ctx.principal)
            .await?;

        let run_id = self
            .create_run(job_name, business_date, &claimable, is_catch_up)
            .await;

        let semaphore = Arc::new(Semaphore::new(self.config.max_concurrent_partitions.max(1)));
        let mut workers = Vec::new();
        for partition in slice_into_partitions(&claimable, self.config.partition_size) {
            let loan_store = Arc::clone(&self.loan_store);
            let lock_manager = Arc::clone(&self.lock_manager);
            let steps = steps.clone();
            let worker_ctx = ctx.clone();
            let semaphore = Arc::clone(&semaphore);
            workers.push(tokio::spawn(async move {
                let _permit = semaphore.acquire_owned().await;
                process_partition(
                    loan_store,
                    lock_manager,
                    partition.into_loan_ids(),
                    steps,
                    worker_ctx,
                )
                .await
            }));
        }

        let mut processed = Vec::new();
        let mut failed = Vec::new();
        let mut worker_panic = None;
        for outcome in join_all(workers).await {
            match outcome {
                Ok((ok, bad)) => {
                    processed.extend(ok);
                    failed.extend(bad);
                }
                Err(join_err) => {
                    error!(job_name = job_name, error = %join_err, "Partition worker panicked");
                    worker_panic = Some(join_err.to_string());
                }
            }
        }

        if let Some(reason) = worker_panic {
            self.run_store
                .finalize_run(run_id, JobRunStatus::Failed, Some(reason.clone()))
                .await;
            return Err(CobError::JobExecutionFailed {
                job_name: job_name.to_string(),
                reason,
            });
        }

        processed.sort_unstable();
        failed.sort_unstable();
        self.run_store
            .finalize_run(run_id, JobRunStatus::Completed, None)
            .await;
        info!(
            job_name = job_name,
            run_id = %run_id,
            business_date = %business_date,
            processed = processed.len(),
            failed = failed.len(),
            skipped = skipped.len(),
            "COB run finished"
        );

        Ok(RunReport {
            run_id,
            job_name: job_name.to_string(),
            business_date,
            processed_loan_ids: processed,
            failed_loan_ids: failed,
            skipped_loan_ids: skipped,
        })
    }

    /// Resolve the job's ordered step implementations; an unknown job is
    /// `JobNotFound`, an unresolvable step name is a launch failure.
    async fn resolve_job_steps(&self, job_name: &str) -> Result<Vec<Arc<dyn CobBusinessStep>>> {
        let job = self.registry.job(job_name).await?;
        let step_names = self.registry.configured_step_names(job_name).await?;
        self.implementations
            .resolve_all(&job.step_category, &step_names)
            .map_err(|e| CobError::JobExecutionFailed {
                job_name: job_name.to_string(),
                reason: e.to_string(),
            })
    }

    /// Create the run-history row. The loan-ID list is persisted as a
    /// custom parameter and referenced by ID to keep the row bounded.
    async fn create_run(
        &self,
        job_name: &str,
        business_date: NaiveDate,
        loan_ids: &[i64],
        is_catch_up: bool,
    ) -> Uuid {
        let serialized = serde_json::to_string(loan_ids).unwrap_or_else(|_| "[]".to_string());
        let parameter_id = self.run_store.save_custom_parameter(serialized).await;

        let mut parameters = vec![
            JobParameter::new(BUSINESS_DATE_PARAMETER_NAME, business_date.to_string()),
            JobParameter::new(LOAN_IDS_PARAMETER_NAME, parameter_id.to_string()),
        ];
        if is_catch_up {
            parameters.push(JobParameter::new(IS_CATCH_UP_PARAMETER_NAME, "true"));
        }

        self.run_store
            .create_run(JobRun::start(job_name, business_date, parameters))
            .await
    }
}

/// Process one partition: loans sequentially, steps in registry order
/// within each loan. Returns (processed, hard-locked) loan IDs.
///
/// Free-standing so spawned workers capture only the collaborators they
/// need.
async fn process_partition(
    loan_store: Arc<dyn LoanStore>,
    lock_manager: Arc<AccountLockManager>,
    loan_ids: Vec<i64>,
    steps: Vec<Arc<dyn CobBusinessStep>>,
    ctx: CobContext,
) -> (Vec<i64>, Vec<i64>) {
    let mut processed = Vec::new();
    let mut failed = Vec::new();

    'loans: for &loan_id in &loan_ids {
        let Some(mut loan) = loan_store.find(loan_id).await else {
            lock_manager
                .mark_failed(loan_id, "loan not found in loan store")
                .await;
            failed.push(loan_id);
            continue;
        };

        for step in &steps {
            match step.execute(loan, &ctx).await {
                Ok(updated) => loan = updated,
                Err(e) => {
                    lock_manager
                        .mark_failed(loan_id, format!("{}: {e}", step.step_name()))
                        .await;
                    failed.push(loan_id);
                    continue 'loans;
                }
            }
        }

        loan_store.save(loan).await;
        processed.push(loan_id);
    }

    // Successful loans advance their last-closed date and unlock together;
    // hard locks stay behind
    loan_store
        .advance_last_closed_date(&processed, ctx.business_date)
        .await;
    lock_manager.release(&processed).await;
    debug!(
        partition_size = loan_ids.len(),
        processed = processed.len(),
        failed = failed.len(),
        "Partition processed"
    );
    (processed, failed)
}
