//! # Storage Seams
//!
//! Trait boundaries between the orchestration components and the shared
//! mutable state they coordinate through: loan accounts, the lock table,
//! and the run-history ledger. The surrounding platform owns the real
//! schema; these traits carry only the operations the COB pipeline needs.
//!
//! The in-memory implementations in [`memory`] back tests and embedded
//! deployments. The lock-claim compare-and-swap lives *inside* the store
//! (`LockStore::claim_all`) so visibility of a claimed batch is immediate
//! to concurrent workers, independent of any caller-side state.

pub mod memory;

use crate::models::{CustomJobParameter, JobRun, JobRunStatus, LoanAccount, LockOwner};
use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;

pub use memory::{InMemoryJobRunStore, InMemoryLoanStore, InMemoryLockStore};

/// Loan account lookup and COB bookkeeping operations
#[async_trait]
pub trait LoanStore: Send + Sync {
    async fn find(&self, loan_id: i64) -> Option<LoanAccount>;

    async fn save(&self, loan: LoanAccount);

    /// IDs from the request that reference no existing loan
    async fn missing_loan_ids(&self, loan_ids: &[i64]) -> Vec<i64>;

    /// Loan IDs eligible for COB as of `business_date`, ascending.
    ///
    /// Active loans whose last-closed business date lags `business_date`,
    /// bounded to loans opened within `days_behind` days; `inline` widens
    /// the selection to every lagging active loan regardless of the window.
    async fn eligible_loan_ids(
        &self,
        business_date: NaiveDate,
        days_behind: i64,
        inline: bool,
    ) -> Vec<i64>;

    /// The minimum last-closed business date across active loans and the
    /// loans sitting at it; `None` when there are no active loans
    async fn oldest_last_closed(&self) -> Option<(Vec<i64>, NaiveDate)>;

    /// Advance the last-closed business date for the given loans
    async fn advance_last_closed_date(&self, loan_ids: &[i64], date: NaiveDate);
}

/// The lock table: the single shared mutable resource coordinating
/// concurrent access to a loan
#[async_trait]
pub trait LockStore: Send + Sync {
    async fn find(&self, loan_id: i64) -> Option<crate::models::LoanAccountLock>;

    async fn all(&self) -> Vec<crate::models::LoanAccountLock>;

    /// Atomic batch claim: either every loan in the batch ends up locked by
    /// `owner`, or no lock changes and the blocking loan IDs come back as
    /// the error value. Runs as one write section so a committed claim is
    /// visible to concurrent workers before the caller's job starts.
    async fn claim_all(
        &self,
        loan_ids: &[i64],
        owner: LockOwner,
        bypass: bool,
    ) -> std::result::Result<(), Vec<i64>>;

    /// Record a per-loan failure: the lock becomes a hard lock carrying the
    /// error message, same owner
    async fn mark_failed(&self, loan_id: i64, error: String);

    /// Remove lock rows after a successful run
    async fn remove(&self, loan_ids: &[i64]);

    /// Clear every hard lock, returning the affected loan IDs
    async fn remove_hard_locked(&self) -> Vec<i64>;
}

/// Run-history ledger and run-scoped parameter persistence
#[async_trait]
pub trait JobRunStore: Send + Sync {
    async fn create_run(&self, run: JobRun) -> Uuid;

    async fn finalize_run(&self, run_id: Uuid, status: JobRunStatus, error: Option<String>);

    async fn find_run(&self, run_id: Uuid) -> Option<JobRun>;

    /// Unfinished runs carrying the named parameter; the shared-storage
    /// truth behind "is catch-up running"
    async fn active_runs_with_parameter(&self, name: &str) -> Vec<JobRun>;

    async fn runs_for_job(&self, job_name: &str) -> Vec<JobRun>;

    /// Persist an out-of-row parameter payload, returning its reference ID
    async fn save_custom_parameter(&self, value: String) -> Uuid;

    async fn custom_parameter(&self, id: Uuid) -> Option<CustomJobParameter>;
}
