//! Transient partition of loan IDs produced for one run invocation.

use serde::{Deserialize, Serialize};

/// An immutable, bounded-size slice of loan IDs processed together in one
/// unit of work. Never persisted; recomputed each run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanCobPartition {
    loan_ids: Vec<i64>,
}

impl LoanCobPartition {
    pub fn new(loan_ids: Vec<i64>) -> Self {
        Self { loan_ids }
    }

    pub fn loan_ids(&self) -> &[i64] {
        &self.loan_ids
    }

    pub fn len(&self) -> usize {
        self.loan_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.loan_ids.is_empty()
    }

    pub fn into_loan_ids(self) -> Vec<i64> {
        self.loan_ids
    }
}
