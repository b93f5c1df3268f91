//! # Inline Executor
//!
//! Operator-facing "run COB now for these loans" entry point. Runs
//! outside the scheduled cadence but under the same locking discipline:
//! request validation happens before any lock is acquired, then the job
//! execution engine claims and runs the batch synchronously.

use crate::error::{CobError, Result};
use crate::orchestration::context::CobContext;
use crate::orchestration::engine::JobExecutionEngine;
use crate::orchestration::types::CommandProcessingResult;
use crate::store::LoanStore;
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

pub struct InlineExecutor {
    engine: Arc<JobExecutionEngine>,
    loan_store: Arc<dyn LoanStore>,
}

impl InlineExecutor {
    pub fn new(engine: Arc<JobExecutionEngine>, loan_store: Arc<dyn LoanStore>) -> Self {
        Self { engine, loan_store }
    }

    /// Validate the requested loan set and run the named job against it
    /// on the calling task.
    #[instrument(skip(self, loan_ids, ctx), fields(batch_size = loan_ids.len()))]
    pub async fn execute_inline_job(
        &self,
        loan_ids: &[i64],
        job_name: &str,
        ctx: &CobContext,
    ) -> Result<CommandProcessingResult> {
        if loan_ids.is_empty() {
            return Err(CobError::Validation {
                reason: "loan ID list must not be empty".to_string(),
            });
        }

        let missing = self.loan_store.missing_loan_ids(loan_ids).await;
        if !missing.is_empty() {
            return Err(CobError::LoanNotFound { loan_ids: missing });
        }

        let report = self.engine.execute(loan_ids, job_name, ctx).await?;
        info!(
            job_name = job_name,
            run_id = %report.run_id,
            processed = report.processed_loan_ids.len(),
            failed = report.failed_loan_ids.len(),
            "Inline COB command completed"
        );

        Ok(CommandProcessingResult {
            command_id: Uuid::new_v4(),
            job_name: job_name.to_string(),
            loan_ids: loan_ids.to_vec(),
            run_id: report.run_id,
        })
    }
}
