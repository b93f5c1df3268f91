//! In-memory store implementations.
//!
//! Shared `RwLock<HashMap>` state, safe for concurrent access from spawned
//! partition workers. These back the test suite and embedded deployments;
//! a database-backed platform substitutes its own implementations of the
//! same traits.

use super::{JobRunStore, LoanStore, LockStore};
use crate::models::{
    CustomJobParameter, JobRun, JobRunStatus, LoanAccount, LoanAccountLock, LockOwner,
};
use async_trait::async_trait;
use chrono::{Duration, NaiveDate, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Effective last-closed date: loans COB never ran for count from the day
/// before they were opened
fn effective_last_closed(loan: &LoanAccount) -> NaiveDate {
    loan.last_closed_business_date
        .unwrap_or(loan.opened_on - Duration::days(1))
}

/// Loan accounts keyed by ID
#[derive(Clone, Default)]
pub struct InMemoryLoanStore {
    loans: Arc<RwLock<HashMap<i64, LoanAccount>>>,
}

impl InMemoryLoanStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, loan: LoanAccount) {
        self.loans.write().await.insert(loan.loan_id, loan);
    }

    pub async fn len(&self) -> usize {
        self.loans.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.loans.read().await.is_empty()
    }
}

#[async_trait]
impl LoanStore for InMemoryLoanStore {
    async fn find(&self, loan_id: i64) -> Option<LoanAccount> {
        self.loans.read().await.get(&loan_id).cloned()
    }

    async fn save(&self, loan: LoanAccount) {
        self.loans.write().await.insert(loan.loan_id, loan);
    }

    async fn missing_loan_ids(&self, loan_ids: &[i64]) -> Vec<i64> {
        let loans = self.loans.read().await;
        loan_ids
            .iter()
            .copied()
            .filter(|id| !loans.contains_key(id))
            .collect()
    }

    async fn eligible_loan_ids(
        &self,
        business_date: NaiveDate,
        days_behind: i64,
        inline: bool,
    ) -> Vec<i64> {
        let window_start = business_date - Duration::days(days_behind);
        let loans = self.loans.read().await;
        let mut ids: Vec<i64> = loans
            .values()
            .filter(|loan| loan.is_behind(business_date))
            .filter(|loan| inline || loan.opened_on >= window_start)
            .map(|loan| loan.loan_id)
            .collect();
        ids.sort_unstable();
        ids
    }

    async fn oldest_last_closed(&self) -> Option<(Vec<i64>, NaiveDate)> {
        let loans = self.loans.read().await;
        let oldest = loans
            .values()
            .filter(|loan| loan.status.is_active())
            .map(effective_last_closed)
            .min()?;
        let mut ids: Vec<i64> = loans
            .values()
            .filter(|loan| loan.status.is_active() && effective_last_closed(loan) == oldest)
            .map(|loan| loan.loan_id)
            .collect();
        ids.sort_unstable();
        Some((ids, oldest))
    }

    async fn advance_last_closed_date(&self, loan_ids: &[i64], date: NaiveDate) {
        let mut loans = self.loans.write().await;
        for id in loan_ids {
            if let Some(loan) = loans.get_mut(id) {
                loan.last_closed_business_date = Some(date);
            }
        }
    }
}

/// Advisory lock table keyed by loan ID
#[derive(Clone, Default)]
pub struct InMemoryLockStore {
    locks: Arc<RwLock<HashMap<i64, LoanAccountLock>>>,
}

impl InMemoryLockStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, lock: LoanAccountLock) {
        self.locks.write().await.insert(lock.loan_id, lock);
    }
}

#[async_trait]
impl LockStore for InMemoryLockStore {
    async fn find(&self, loan_id: i64) -> Option<LoanAccountLock> {
        self.locks.read().await.get(&loan_id).cloned()
    }

    async fn all(&self) -> Vec<LoanAccountLock> {
        let mut locks: Vec<LoanAccountLock> = self.locks.read().await.values().cloned().collect();
        locks.sort_by_key(|l| l.loan_id);
        locks
    }

    async fn claim_all(
        &self,
        loan_ids: &[i64],
        owner: LockOwner,
        bypass: bool,
    ) -> std::result::Result<(), Vec<i64>> {
        // Single write section: validate the whole batch before touching
        // any row, so a rejected batch leaves every lock unchanged.
        let mut locks = self.locks.write().await;

        let blocking: Vec<i64> = loan_ids
            .iter()
            .copied()
            .filter(|id| {
                locks
                    .get(id)
                    .is_some_and(|existing| !existing.is_overrulable_by(bypass))
            })
            .collect();
        if !blocking.is_empty() {
            return Err(blocking);
        }

        for id in loan_ids {
            locks.insert(*id, LoanAccountLock::new(*id, owner));
        }
        Ok(())
    }

    async fn mark_failed(&self, loan_id: i64, error: String) {
        let mut locks = self.locks.write().await;
        if let Some(lock) = locks.get_mut(&loan_id) {
            lock.error = Some(error);
        } else {
            // A failure on a loan whose lock was never written still has
            // to leave a hard lock behind.
            let mut lock = LoanAccountLock::new(loan_id, LockOwner::LoanCobPartitioning);
            lock.error = Some(error);
            locks.insert(loan_id, lock);
        }
    }

    async fn remove(&self, loan_ids: &[i64]) {
        let mut locks = self.locks.write().await;
        for id in loan_ids {
            locks.remove(id);
        }
    }

    async fn remove_hard_locked(&self) -> Vec<i64> {
        let mut locks = self.locks.write().await;
        let mut cleared: Vec<i64> = locks
            .values()
            .filter(|l| l.is_hard_locked())
            .map(|l| l.loan_id)
            .collect();
        for id in &cleared {
            locks.remove(id);
        }
        cleared.sort_unstable();
        cleared
    }
}

/// Run-history ledger and custom-parameter rows
#[derive(Clone, Default)]
pub struct InMemoryJobRunStore {
    runs: Arc<RwLock<HashMap<Uuid, JobRun>>>,
    custom_parameters: Arc<RwLock<HashMap<Uuid, CustomJobParameter>>>,
}

impl InMemoryJobRunStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl JobRunStore for InMemoryJobRunStore {
    async fn create_run(&self, run: JobRun) -> Uuid {
        let run_id = run.run_id;
        self.runs.write().await.insert(run_id, run);
        run_id
    }

    async fn finalize_run(&self, run_id: Uuid, status: JobRunStatus, error: Option<String>) {
        let mut runs = self.runs.write().await;
        if let Some(run) = runs.get_mut(&run_id) {
            run.status = status;
            run.finished_at = Some(Utc::now());
            run.error_message = error;
        }
    }

    async fn find_run(&self, run_id: Uuid) -> Option<JobRun> {
        self.runs.read().await.get(&run_id).cloned()
    }

    async fn active_runs_with_parameter(&self, name: &str) -> Vec<JobRun> {
        let runs = self.runs.read().await;
        let mut active: Vec<JobRun> = runs
            .values()
            .filter(|run| run.status.is_active() && run.finished_at.is_none())
            .filter(|run| run.has_parameter(name))
            .cloned()
            .collect();
        active.sort_by_key(|run| run.started_at);
        active
    }

    async fn runs_for_job(&self, job_name: &str) -> Vec<JobRun> {
        let runs = self.runs.read().await;
        let mut matching: Vec<JobRun> = runs
            .values()
            .filter(|run| run.job_name == job_name)
            .cloned()
            .collect();
        matching.sort_by_key(|run| run.started_at);
        matching
    }

    async fn save_custom_parameter(&self, value: String) -> Uuid {
        let id = Uuid::new_v4();
        self.custom_parameters
            .write()
            .await
            .insert(id, CustomJobParameter { id, value });
        id
    }

    async fn custom_parameter(&self, id: Uuid) -> Option<CustomJobParameter> {
        self.custom_parameters.read().await.get(&id).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn loan(id: i64, opened: NaiveDate, closed: Option<NaiveDate>) -> LoanAccount {
        let mut loan = LoanAccount::new(id, opened, Decimal::new(500_000, 2));
        loan.last_closed_business_date = closed;
        loan
    }

    #[tokio::test]
    async fn test_eligibility_respects_days_behind_window() {
        let store = InMemoryLoanStore::new();
        let business_date = date(2023, 6, 14);
        // Opened long before the window
        store.insert(loan(1, date(2023, 1, 1), None)).await;
        // Opened inside the window
        store.insert(loan(2, date(2023, 6, 10), None)).await;
        // Already closed for the business date
        store
            .insert(loan(3, date(2023, 6, 10), Some(business_date)))
            .await;

        let scheduled = store.eligible_loan_ids(business_date, 7, false).await;
        assert_eq!(scheduled, vec![2]);

        let inline = store.eligible_loan_ids(business_date, 7, true).await;
        assert_eq!(inline, vec![1, 2]);
    }

    #[tokio::test]
    async fn test_oldest_last_closed_picks_all_laggards() {
        let store = InMemoryLoanStore::new();
        store
            .insert(loan(1, date(2023, 1, 1), Some(date(2023, 6, 10))))
            .await;
        store
            .insert(loan(2, date(2023, 1, 1), Some(date(2023, 6, 10))))
            .await;
        store
            .insert(loan(3, date(2023, 1, 1), Some(date(2023, 6, 13))))
            .await;

        let (ids, oldest) = store.oldest_last_closed().await.unwrap();
        assert_eq!(ids, vec![1, 2]);
        assert_eq!(oldest, date(2023, 6, 10));
    }

    #[tokio::test]
    async fn test_never_closed_loan_counts_from_day_before_opening() {
        let store = InMemoryLoanStore::new();
        store.insert(loan(1, date(2023, 6, 12), None)).await;
        let (ids, oldest) = store.oldest_last_closed().await.unwrap();
        assert_eq!(ids, vec![1]);
        assert_eq!(oldest, date(2023, 6, 11));
    }

    #[tokio::test]
    async fn test_claim_all_is_all_or_nothing() {
        let store = InMemoryLockStore::new();
        let mut hard = LoanAccountLock::new(9, LockOwner::LoanInlineCobProcessing);
        hard.error = Some("boom".to_string());
        store.insert(hard).await;
        let mut held = LoanAccountLock::new(12, LockOwner::LoanInlineCobProcessing);
        held.error = None;
        store.insert(held.clone()).await;

        // 12 is held by inline processing with no error: not overrulable
        let blocked = store
            .claim_all(&[5, 12], LockOwner::LoanInlineCobProcessing, false)
            .await
            .unwrap_err();
        assert_eq!(blocked, vec![12]);
        assert!(store.find(5).await.is_none());
        assert_eq!(store.find(12).await.unwrap(), held);

        // 9 is hard-locked, so it may be reclaimed for retry
        store
            .claim_all(&[5, 9], LockOwner::LoanInlineCobProcessing, false)
            .await
            .unwrap();
        assert!(!store.find(9).await.unwrap().is_hard_locked());
    }

    #[tokio::test]
    async fn test_remove_hard_locked_only_clears_errored_rows() {
        let store = InMemoryLockStore::new();
        store
            .claim_all(&[1, 2], LockOwner::LoanCobPartitioning, false)
            .await
            .unwrap();
        store.mark_failed(2, "step failed".to_string()).await;

        let cleared = store.remove_hard_locked().await;
        assert_eq!(cleared, vec![2]);
        assert!(store.find(1).await.is_some());
        assert!(store.find(2).await.is_none());
    }

    #[tokio::test]
    async fn test_run_finalization_and_tagged_lookup() {
        let store = InMemoryJobRunStore::new();
        let run = JobRun::start(
            "LOAN_COB",
            date(2023, 6, 14),
            vec![crate::models::JobParameter::new("IS_CATCH_UP", "true")],
        );
        let run_id = store.create_run(run).await;

        let active = store.active_runs_with_parameter("IS_CATCH_UP").await;
        assert_eq!(active.len(), 1);

        store
            .finalize_run(run_id, JobRunStatus::Completed, None)
            .await;
        assert!(store
            .active_runs_with_parameter("IS_CATCH_UP")
            .await
            .is_empty());
        let finalized = store.find_run(run_id).await.unwrap();
        assert_eq!(finalized.status, JobRunStatus::Completed);
        assert!(finalized.finished_at.is_some());
    }

    #[tokio::test]
    async fn test_custom_parameter_round_trip() {
        let store = InMemoryJobRunStore::new();
        let id = store.save_custom_parameter("[5,9,12]".to_string()).await;
        let param = store.custom_parameter(id).await.unwrap();
        assert_eq!(param.value, "[5,9,12]");
    }
}
