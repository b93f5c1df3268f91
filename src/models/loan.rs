//! Loan account state as seen by the COB pipeline.
//!
//! This is the per-loan state the business steps transform. The wider
//! lifecycle of a loan (origination, disbursement, repayment schedule)
//! belongs to the surrounding platform; COB only needs the fields that
//! drive eligibility and the day-boundary bookkeeping.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Loan lifecycle status; only active loans are COB-eligible
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoanStatus {
    Active,
    Closed,
    Overpaid,
    WrittenOff,
}

impl LoanStatus {
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Active)
    }
}

impl fmt::Display for LoanStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Active => write!(f, "active"),
            Self::Closed => write!(f, "closed"),
            Self::Overpaid => write!(f, "overpaid"),
            Self::WrittenOff => write!(f, "written_off"),
        }
    }
}

/// Per-loan state advanced by the COB business steps
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanAccount {
    pub loan_id: i64,
    pub external_id: String,
    pub status: LoanStatus,
    /// Date the loan was opened; bounds the partitioner's days-behind window
    pub opened_on: NaiveDate,
    /// Last business date COB closed for this loan; `None` means never run
    pub last_closed_business_date: Option<NaiveDate>,
    pub principal_outstanding: Decimal,
    /// Nominal annual interest rate in percent
    pub interest_rate: Decimal,
    pub accrued_interest: Decimal,
    pub penalty_charges: Decimal,
    /// First date an installment went unpaid, if any
    pub overdue_since: Option<NaiveDate>,
    /// Delinquency classification, highest bucket reached
    pub delinquency_bucket: u32,
}

impl LoanAccount {
    pub fn new(loan_id: i64, opened_on: NaiveDate, principal: Decimal) -> Self {
        Self {
            loan_id,
            external_id: format!("loan-{loan_id}"),
            status: LoanStatus::Active,
            opened_on,
            last_closed_business_date: None,
            principal_outstanding: principal,
            interest_rate: Decimal::new(1200, 2), // 12.00% nominal annual
            accrued_interest: Decimal::ZERO,
            penalty_charges: Decimal::ZERO,
            overdue_since: None,
            delinquency_bucket: 0,
        }
    }

    /// Days overdue as of the given business date; zero when not overdue
    pub fn days_overdue(&self, business_date: NaiveDate) -> i64 {
        self.overdue_since
            .map(|since| (business_date - since).num_days().max(0))
            .unwrap_or(0)
    }

    /// Whether this loan still lags the given business date
    pub fn is_behind(&self, business_date: NaiveDate) -> bool {
        self.status.is_active()
            && self
                .last_closed_business_date
                .map(|closed| closed < business_date)
                .unwrap_or(true)
    }
}

/// Derived answer to the "oldest COB processed" query: the laggard loans,
/// their minimum last-closed date, and the tenant's current COB date
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OldestCobProcessedLoan {
    pub loan_ids: Vec<i64>,
    pub cob_processed_date: NaiveDate,
    pub cob_business_date: NaiveDate,
}

impl OldestCobProcessedLoan {
    /// Nothing to catch up when the laggards already sit at the current date
    pub fn is_up_to_date(&self) -> bool {
        self.cob_processed_date >= self.cob_business_date
    }
}
