//! # COB Demo
//!
//! Standalone binary that wires the in-memory COB system, seeds a small
//! loan portfolio, and runs one business date end to end. Useful for
//! eyeballing the structured logs the pipeline emits.

use anyhow::Result;
use chrono::NaiveDate;
use loan_cob_core::config::CobConfig;
use loan_cob_core::constants::{LOAN_COB_JOB_NAME, LOAN_COB_STEP_CATEGORY};
use loan_cob_core::logging::init_logging;
use loan_cob_core::models::{BusinessStep, LoanAccount, ScheduledJobDetail};
use loan_cob_core::orchestration::{
    AccountLockManager, CobContext, JobExecutionEngine, LoanCobPartitioner,
};
use loan_cob_core::registry::{BusinessStepRegistry, StepImplementationRegistry};
use loan_cob_core::steps::register_default_steps;
use loan_cob_core::store::{InMemoryJobRunStore, InMemoryLoanStore, InMemoryLockStore, LoanStore};
use rust_decimal::Decimal;
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();

    let config = CobConfig::from_env()?;
    let business_date = NaiveDate::from_ymd_opt(2023, 6, 14)
        .ok_or_else(|| anyhow::anyhow!("invalid demo business date"))?;

    let loan_store = Arc::new(InMemoryLoanStore::new());
    let lock_store = Arc::new(InMemoryLockStore::new());
    let run_store = Arc::new(InMemoryJobRunStore::new());

    let implementations = Arc::new(StepImplementationRegistry::new());
    register_default_steps(&implementations);

    let registry = Arc::new(BusinessStepRegistry::new(Arc::clone(&implementations)));
    registry
        .register_job(
            ScheduledJobDetail::new(LOAN_COB_JOB_NAME, LOAN_COB_STEP_CATEGORY),
            vec![
                BusinessStep::new("ACCRUE_INTEREST", 1),
                BusinessStep::new("APPLY_PENALTY", 2),
                BusinessStep::new("UPDATE_DELINQUENCY", 3),
            ],
        )
        .await;

    for id in 1..=10 {
        let mut loan = LoanAccount::new(
            id,
            business_date - chrono::Duration::days(id),
            Decimal::new(36_500_00, 2),
        );
        if id % 4 == 0 {
            loan.overdue_since = Some(business_date - chrono::Duration::days(id));
        }
        loan_store.insert(loan).await;
    }

    let lock_manager = Arc::new(AccountLockManager::new(
        lock_store,
        config.bypass_users.clone(),
    ));
    let partitioner = Arc::new(LoanCobPartitioner::new(loan_store.clone()));
    let engine = Arc::new(JobExecutionEngine::new(
        config,
        registry,
        implementations,
        partitioner,
        lock_manager,
        loan_store.clone(),
        run_store,
    ));

    let ctx = CobContext::new("default", business_date, "demo");
    let report = engine
        .run_for_date(business_date, false, LOAN_COB_JOB_NAME, &ctx)
        .await?;

    println!(
        "COB run {} for {}: {} processed, {} failed, {} skipped",
        report.run_id,
        report.business_date,
        report.processed_loan_ids.len(),
        report.failed_loan_ids.len(),
        report.skipped_loan_ids.len()
    );
    for id in report.processed_loan_ids {
        if let Some(loan) = loan_store.find(id).await {
            println!(
                "  loan {:>3}: accrued {}, penalties {}, bucket {}",
                id, loan.accrued_interest, loan.penalty_charges, loan.delinquency_bucket
            );
        }
    }

    Ok(())
}
