//! Delinquency classification step.

use crate::error::Result;
use crate::models::LoanAccount;
use crate::orchestration::context::CobContext;
use crate::registry::CobBusinessStep;
use async_trait::async_trait;
use tracing::debug;

/// Classifies days overdue into delinquency buckets:
/// 0 = current, 1 = 1-30 days, 2 = 31-60, 3 = 61-90, 4 = over 90.
#[derive(Debug, Clone, Default)]
pub struct UpdateDelinquencyBucketStep;

fn bucket_for(days_overdue: i64) -> u32 {
    match days_overdue {
        d if d <= 0 => 0,
        d if d <= 30 => 1,
        d if d <= 60 => 2,
        d if d <= 90 => 3,
        _ => 4,
    }
}

#[async_trait]
impl CobBusinessStep for UpdateDelinquencyBucketStep {
    fn step_name(&self) -> &'static str {
        "UPDATE_DELINQUENCY"
    }

    fn human_readable_name(&self) -> &'static str {
        "Reclassify loan delinquency bucket from days overdue"
    }

    async fn execute(&self, mut loan: LoanAccount, ctx: &CobContext) -> Result<LoanAccount> {
        let bucket = bucket_for(loan.days_overdue(ctx.business_date));
        if bucket != loan.delinquency_bucket {
            debug!(
                loan_id = loan.loan_id,
                from = loan.delinquency_bucket,
                to = bucket,
                "Delinquency bucket changed"
            );
            loan.delinquency_bucket = bucket;
        }
        Ok(loan)
    }
}
