//! Daily interest accrual step.

use crate::error::Result;
use crate::models::LoanAccount;
use crate::orchestration::context::CobContext;
use crate::registry::CobBusinessStep;
use async_trait::async_trait;
use rust_decimal::Decimal;
use tracing::debug;

const DAYS_IN_YEAR: i64 = 365;

/// Accrues one day of simple interest on the outstanding principal.
#[derive(Debug, Clone)]
pub struct AccrueInterestStep {
    days_in_year: i64,
}

impl Default for AccrueInterestStep {
    fn default() -> Self {
        Self {
            days_in_year: DAYS_IN_YEAR,
        }
    }
}

#[async_trait]
impl CobBusinessStep for AccrueInterestStep {
    fn step_name(&self) -> &'static str {
        "ACCRUE_INTEREST"
    }

    fn human_readable_name(&self) -> &'static str {
        "Accrue one day of interest on outstanding principal"
    }

    async fn execute(&self, mut loan: LoanAccount, ctx: &CobContext) -> Result<LoanAccount> {
        if loan.principal_outstanding <= Decimal::ZERO {
            return Ok(loan);
        }

        let daily_rate =
            loan.interest_rate / Decimal::from(100) / Decimal::from(self.days_in_year);
        let accrual = (loan.principal_outstanding * daily_rate).round_dp(2);
        loan.accrued_interest += accrual;

        debug!(
            loan_id = loan.loan_id,
            business_date = %ctx.business_date,
            accrual = %accrual,
            "Accrued daily interest"
        );
        Ok(loan)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn ctx() -> CobContext {
        CobContext::new(
            "default",
            NaiveDate::from_ymd_opt(2023, 6, 14).unwrap(),
            "scheduler",
        )
    }

    #[tokio::test]
    async fn test_accrues_one_day_of_simple_interest() {
        let step = AccrueInterestStep::default();
        let loan = LoanAccount::new(
            1,
            NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(),
            Decimal::new(36_500_00, 2), // 36,500.00 at 12% -> 12.00/day
        );

        let updated = step.execute(loan, &ctx()).await.unwrap();
        assert_eq!(updated.accrued_interest, Decimal::new(12_00, 2));
    }

    #[tokio::test]
    async fn test_zero_principal_accrues_nothing() {
        let step = AccrueInterestStep::default();
        let loan = LoanAccount::new(
            1,
            NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(),
            Decimal::ZERO,
        );

        let updated = step.execute(loan, &ctx()).await.unwrap();
        assert_eq!(updated.accrued_interest, Decimal::ZERO);
    }
}
