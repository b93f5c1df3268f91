//! Overdue penalty step.

use crate::error::Result;
use crate::models::LoanAccount;
use crate::orchestration::context::CobContext;
use crate::registry::CobBusinessStep;
use async_trait::async_trait;
use rust_decimal::Decimal;
use tracing::debug;

/// Applies a flat daily penalty charge once a loan has been overdue for
/// longer than the grace window.
#[derive(Debug, Clone)]
pub struct ApplyOverduePenaltyStep {
    grace_days: i64,
    daily_penalty: Decimal,
}

impl Default for ApplyOverduePenaltyStep {
    fn default() -> Self {
        Self {
            grace_days: 3,
            daily_penalty: Decimal::new(25_00, 2), // 25.00 per day past grace
        }
    }
}

#[async_trait]
impl CobBusinessStep for ApplyOverduePenaltyStep {
    fn step_name(&self) -> &'static str {
        "APPLY_PENALTY"
    }

    fn human_readable_name(&self) -> &'static str {
        "Apply penalty charge to loans overdue past the grace window"
    }

    async fn execute(&self, mut loan: LoanAccount, ctx: &CobContext) -> Result<LoanAccount> {
        let days_overdue = loan.days_overdue(ctx.business_date);
        if days_overdue <= self.grace_days {
            return Ok(loan);
        }

        loan.penalty_charges += self.daily_penalty;
        debug!(
            loan_id = loan.loan_id,
            days_overdue = days_overdue,
            penalty = %self.daily_penalty,
            "Applied overdue penalty"
        );
        Ok(loan)
    }
}
