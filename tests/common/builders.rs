//! Shared fixtures for the COB orchestration integration tests: a fully
//! wired in-memory system plus instrumented step implementations.

use async_trait::async_trait;
use chrono::NaiveDate;
use loan_cob_core::config::CobConfig;
use loan_cob_core::constants::{LOAN_COB_JOB_NAME, LOAN_COB_STEP_CATEGORY};
use loan_cob_core::error::{CobError, Result};
use loan_cob_core::models::{BusinessStep, LoanAccount, ScheduledJobDetail};
use loan_cob_core::orchestration::{
    AccountLockManager, CatchUpController, CobContext, FixedBusinessDateProvider, InlineExecutor,
    JobExecutionEngine, LoanCobPartitioner,
};
use loan_cob_core::registry::{BusinessStepRegistry, CobBusinessStep, StepImplementationRegistry};
use loan_cob_core::store::{InMemoryJobRunStore, InMemoryLoanStore, InMemoryLockStore};
use rust_decimal::Decimal;
use std::sync::{Arc, Mutex};

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn test_loan(loan_id: i64, opened_on: NaiveDate) -> LoanAccount {
    LoanAccount::new(loan_id, opened_on, Decimal::new(36_500_00, 2))
}

/// Step that records every (loan_id, business_date, step_name) execution
/// into a shared log, then passes the loan through unchanged.
pub struct RecordingStep {
    name: &'static str,
    log: ExecutionLog,
}

pub type ExecutionLog = Arc<Mutex<Vec<(i64, NaiveDate, &'static str)>>>;

impl RecordingStep {
    pub fn new(name: &'static str, log: ExecutionLog) -> Self {
        Self { name, log }
    }
}

#[async_trait]
impl CobBusinessStep for RecordingStep {
    fn step_name(&self) -> &'static str {
        self.name
    }

    fn human_readable_name(&self) -> &'static str {
        "Records executions for test assertions"
    }

    async fn execute(&self, loan: LoanAccount, ctx: &CobContext) -> Result<LoanAccount> {
        self.log
            .lock()
            .unwrap()
            .push((loan.loan_id, ctx.business_date, self.name));
        Ok(loan)
    }
}

/// Step that fails for a configured set of loan IDs.
pub struct FailingStep {
    fail_for: Vec<i64>,
}

impl FailingStep {
    pub fn new(fail_for: Vec<i64>) -> Self {
        Self { fail_for }
    }
}

#[async_trait]
impl CobBusinessStep for FailingStep {
    fn step_name(&self) -> &'static str {
        "FAIL_SOME"
    }

    fn human_readable_name(&self) -> &'static str {
        "Fails for configured loans"
    }

    async fn execute(&self, loan: LoanAccount, _ctx: &CobContext) -> Result<LoanAccount> {
        if self.fail_for.contains(&loan.loan_id) {
            return Err(CobError::Validation {
                reason: format!("induced failure for loan {}", loan.loan_id),
            });
        }
        Ok(loan)
    }
}

/// Fully wired in-memory COB system.
pub struct TestSystem {
    pub loan_store: Arc<InMemoryLoanStore>,
    pub lock_store: Arc<InMemoryLockStore>,
    pub run_store: Arc<InMemoryJobRunStore>,
    pub implementations: Arc<StepImplementationRegistry>,
    pub registry: Arc<BusinessStepRegistry>,
    pub lock_manager: Arc<AccountLockManager>,
    pub engine: Arc<JobExecutionEngine>,
    pub controller: CatchUpController,
    pub inline: InlineExecutor,
}

pub struct TestSystemBuilder {
    config: CobConfig,
    current_cob_date: NaiveDate,
    steps: Vec<Arc<dyn CobBusinessStep>>,
}

impl TestSystemBuilder {
    pub fn new() -> Self {
        Self {
            config: CobConfig {
                partition_size: 2,
                days_behind: 365,
                max_concurrent_partitions: 2,
                bypass_users: vec!["admin".to_string()],
            },
            current_cob_date: date(2023, 6, 14),
            steps: Vec::new(),
        }
    }

    pub fn with_config(mut self, config: CobConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_current_cob_date(mut self, cob_date: NaiveDate) -> Self {
        self.current_cob_date = cob_date;
        self
    }

    pub fn with_step(mut self, step: Arc<dyn CobBusinessStep>) -> Self {
        self.steps.push(step);
        self
    }

    pub async fn build(self) -> TestSystem {
        let loan_store = Arc::new(InMemoryLoanStore::new());
        let lock_store = Arc::new(InMemoryLockStore::new());
        let run_store = Arc::new(InMemoryJobRunStore::new());

        let implementations = Arc::new(StepImplementationRegistry::new());
        let mut seeded = Vec::new();
        for (i, step) in self.steps.iter().enumerate() {
            seeded.push(BusinessStep::new(step.step_name(), i as i32 + 1));
            implementations.register(LOAN_COB_STEP_CATEGORY, Arc::clone(step));
        }

        let registry = Arc::new(BusinessStepRegistry::new(Arc::clone(&implementations)));
        registry
            .register_job(
                ScheduledJobDetail::new(LOAN_COB_JOB_NAME, LOAN_COB_STEP_CATEGORY),
                seeded,
            )
            .await;

        let lock_manager = Arc::new(AccountLockManager::new(
            lock_store.clone(),
            self.config.bypass_users.clone(),
        ));
        let partitioner = Arc::new(LoanCobPartitioner::new(loan_store.clone()));
        let engine = Arc::new(JobExecutionEngine::new(
            self.config,
            Arc::clone(&registry),
            Arc::clone(&implementations),
            partitioner,
            Arc::clone(&lock_manager),
            loan_store.clone(),
            run_store.clone(),
        ));
        let controller = CatchUpController::new(
            Arc::clone(&engine),
            Arc::clone(&lock_manager),
            loan_store.clone(),
            run_store.clone(),
            Arc::new(FixedBusinessDateProvider::new(self.current_cob_date)),
            LOAN_COB_JOB_NAME,
        );
        let inline = InlineExecutor::new(Arc::clone(&engine), loan_store.clone());

        TestSystem {
            loan_store,
            lock_store,
            run_store,
            implementations,
            registry,
            lock_manager,
            engine,
            controller,
            inline,
        }
    }
}

impl Default for TestSystemBuilder {
    fn default() -> Self {
        Self::new()
    }
}

pub fn test_context(business_date: NaiveDate) -> CobContext {
    CobContext::new("default", business_date, "scheduler")
}
