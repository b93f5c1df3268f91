//! # Catch-Up Controller
//!
//! Detects the oldest business date COB has not yet closed and drives
//! day-by-day re-execution until the tenant's current COB date is
//! reached. Each day's computation depends on the prior day's closing
//! state, so dates run strictly in ascending order with exactly one in
//! flight.
//!
//! "Is a catch-up running" is derived from unfinished run-history rows
//! carrying the catch-up parameter — shared-storage truth that stays
//! consistent across orchestrator instances, never an in-memory flag.

use crate::constants::IS_CATCH_UP_PARAMETER_NAME;
use crate::error::{CobError, Result};
use crate::models::{JobParameter, JobRun, JobRunStatus, OldestCobProcessedLoan};
use crate::orchestration::context::CobContext;
use crate::orchestration::engine::JobExecutionEngine;
use crate::orchestration::lock_manager::AccountLockManager;
use crate::orchestration::types::{CatchUpStatus, CatchUpTrigger};
use crate::store::{JobRunStore, LoanStore};
use async_trait::async_trait;
use chrono::{Duration, NaiveDate};
use std::sync::Arc;
use tracing::{error, info, instrument};

/// External boundary supplying the tenant's current COB business date
#[async_trait]
pub trait BusinessDateProvider: Send + Sync {
    async fn current_cob_date(&self, tenant_id: &str) -> NaiveDate;
}

/// Fixed-date provider for tests and embedded deployments
pub struct FixedBusinessDateProvider {
    date: NaiveDate,
}

impl FixedBusinessDateProvider {
    pub fn new(date: NaiveDate) -> Self {
        Self { date }
    }
}

#[async_trait]
impl BusinessDateProvider for FixedBusinessDateProvider {
    async fn current_cob_date(&self, _tenant_id: &str) -> NaiveDate {
        self.date
    }
}

pub struct CatchUpController {
    engine: Arc<JobExecutionEngine>,
    lock_manager: Arc<AccountLockManager>,
    loan_store: Arc<dyn LoanStore>,
    run_store: Arc<dyn JobRunStore>,
    business_dates: Arc<dyn BusinessDateProvider>,
    job_name: String,
}

impl CatchUpController {
    pub fn new(
        engine: Arc<JobExecutionEngine>,
        lock_manager: Arc<AccountLockManager>,
        loan_store: Arc<dyn LoanStore>,
        run_store: Arc<dyn JobRunStore>,
        business_dates: Arc<dyn BusinessDateProvider>,
        job_name: impl Into<String>,
    ) -> Self {
        Self {
            engine,
            lock_manager,
            loan_store,
            run_store,
            business_dates,
            job_name: job_name.into(),
        }
    }

    /// The laggard loans: everything sitting at the minimum last-closed
    /// business date, compared against the current COB date. `None` when
    /// the portfolio has no active loans.
    pub async fn oldest_cob_processed_loan(
        &self,
        tenant_id: &str,
    ) -> Option<OldestCobProcessedLoan> {
        let (loan_ids, cob_processed_date) = self.loan_store.oldest_last_closed().await?;
        let cob_business_date = self.business_dates.current_cob_date(tenant_id).await;
        Some(OldestCobProcessedLoan {
            loan_ids,
            cob_processed_date,
            cob_business_date,
        })
    }

    /// Whether a catch-up pass is in flight, and for which business date
    pub async fn is_catch_up_running(&self) -> CatchUpStatus {
        let active = self
            .run_store
            .active_runs_with_parameter(IS_CATCH_UP_PARAMETER_NAME)
            .await;
        match active.first() {
            Some(run) => CatchUpStatus {
                running: true,
                processing_business_date: Some(run.business_date),
            },
            None => CatchUpStatus::idle(),
        }
    }

    /// Trigger an asynchronous catch-up pass.
    ///
    /// Fails fast with `CatchUpAlreadyRunning` when a tagged run is still
    /// active; returns `UpToDate` without launching anything when the
    /// oldest processed date already equals the current COB date.
    #[instrument(skip(self, ctx))]
    pub async fn execute_loan_cob_catch_up(&self, ctx: CobContext) -> Result<CatchUpTrigger> {
        let status = self.is_catch_up_running().await;
        if status.running {
            return Err(CobError::CatchUpAlreadyRunning {
                processing_business_date: status.processing_business_date,
            });
        }

        let Some(oldest) = self.oldest_cob_processed_loan(&ctx.tenant_id).await else {
            return Ok(CatchUpTrigger::UpToDate);
        };
        if oldest.is_up_to_date() {
            return Ok(CatchUpTrigger::UpToDate);
        }

        let from = oldest.cob_processed_date + Duration::days(1);
        let to = oldest.cob_business_date;
        info!(
            from = %from,
            to = %to,
            laggard_loans = oldest.loan_ids.len(),
            "Launching COB catch-up"
        );

        // The tagged marker row is written before the detached task spawns,
        // so a second trigger arriving right after this one already sees a
        // running catch-up.
        let marker_id = self
            .run_store
            .create_run(JobRun::start(
                &self.job_name,
                from,
                vec![JobParameter::new(IS_CATCH_UP_PARAMETER_NAME, "true")],
            ))
            .await;

        // The detached task carries its own clones of the collaborators
        // and an explicit context value; nothing ambient crosses over.
        let engine = Arc::clone(&self.engine);
        let run_store = Arc::clone(&self.run_store);
        let job_name = self.job_name.clone();
        tokio::spawn(async move {
            match run_range(engine, &job_name, from, to, &ctx).await {
                Ok(()) => {
                    run_store
                        .finalize_run(marker_id, JobRunStatus::Completed, None)
                        .await;
                }
                Err(e) => {
                    error!(error = %e, "COB catch-up aborted");
                    run_store
                        .finalize_run(marker_id, JobRunStatus::Failed, Some(e.to_string()))
                        .await;
                }
            }
        });

        Ok(CatchUpTrigger::Accepted { from, to })
    }

    /// The sequential day-by-day loop: each date's run must reach a
    /// terminal state before the next date begins; a date-level failure
    /// aborts the remaining dates.
    pub async fn run_catch_up_range(
        &self,
        from: NaiveDate,
        to: NaiveDate,
        ctx: &CobContext,
    ) -> Result<()> {
        run_range(Arc::clone(&self.engine), &self.job_name, from, to, ctx).await
    }

    /// Clear hard locks so previously failed loans re-enter processing
    pub async fn unlock_hard_locked_loans(&self) -> Vec<i64> {
        self.lock_manager.unlock_hard_locked().await
    }
}

async fn run_range(
    engine: Arc<JobExecutionEngine>,
    job_name: &str,
    from: NaiveDate,
    to: NaiveDate,
    ctx: &CobContext,
) -> Result<()> {
    let mut date = from;
    while date <= to {
        info!(business_date = %date, "Catch-up processing business date");
        engine.run_for_date(date, true, job_name, ctx).await?;
        date += Duration::days(1);
    }
    info!(from = %from, to = %to, "COB catch-up completed");
    Ok(())
}
