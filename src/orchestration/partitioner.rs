//! # Loan COB Partitioner
//!
//! Splits the COB-eligible loan population for a business date into
//! bounded, deterministic partitions. Selection and slicing are stable
//! (ascending loan ID, fixed chunk size), so repeated calls with the same
//! inputs produce the same partitions.

use crate::error::{CobError, Result};
use crate::models::LoanCobPartition;
use crate::store::LoanStore;
use chrono::NaiveDate;
use std::sync::Arc;
use tracing::{debug, instrument};

/// Produces transient loan-ID partitions for one run invocation
pub struct LoanCobPartitioner {
    loan_store: Arc<dyn LoanStore>,
}

impl LoanCobPartitioner {
    pub fn new(loan_store: Arc<dyn LoanStore>) -> Self {
        Self { loan_store }
    }

    /// Select eligible loans as of `business_date` and slice them into
    /// partitions of at most `partition_size` IDs.
    ///
    /// `inline` widens the selection to every lagging active loan,
    /// ignoring the `days_behind` opening window. Zero eligible loans
    /// yields an empty sequence.
    #[instrument(skip(self))]
    pub async fn retrieve_loan_cob_partitions(
        &self,
        days_behind: i64,
        business_date: NaiveDate,
        inline: bool,
        partition_size: usize,
    ) -> Result<Vec<LoanCobPartition>> {
        if partition_size == 0 {
            return Err(CobError::InvalidArgument {
                reason: "partition size must be a positive integer".to_string(),
            });
        }

        let eligible = self
            .loan_store
            .eligible_loan_ids(business_date, days_behind, inline)
            .await;
        let partitions = slice_into_partitions(&eligible, partition_size);

        debug!(
            business_date = %business_date,
            eligible_count = eligible.len(),
            partition_count = partitions.len(),
            partition_size = partition_size,
            "Partitioned eligible loans"
        );
        Ok(partitions)
    }
}

/// Slice an ordered ID list into fixed-size partitions; the last partition
/// may be short
pub fn slice_into_partitions(loan_ids: &[i64], partition_size: usize) -> Vec<LoanCobPartition> {
    loan_ids
        .chunks(partition_size)
        .map(|chunk| LoanCobPartition::new(chunk.to_vec()))
        .collect()
}
