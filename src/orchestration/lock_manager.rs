//! # Account Lock Manager
//!
//! Gatekeeper for the per-loan advisory lock table. Every component that
//! touches a loan for COB purposes claims it here first; all lock-state
//! mutation goes through these operations.
//!
//! Claim semantics are batch all-or-nothing: if any loan in a requested
//! batch holds a lock the claim cannot overrule, the entire batch is
//! rejected with every blocking loan ID and no lock changes. The
//! compare-and-swap itself runs inside the lock store's own write section,
//! so a committed claim is visible to concurrent workers before the
//! long-running job starts.

use crate::error::{CobError, Result};
use crate::models::{LoanAccountLock, LockOwner};
use crate::store::LockStore;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

pub struct AccountLockManager {
    lock_store: Arc<dyn LockStore>,
    bypass_users: Vec<String>,
}

impl AccountLockManager {
    pub fn new(lock_store: Arc<dyn LockStore>, bypass_users: Vec<String>) -> Self {
        Self {
            lock_store,
            bypass_users,
        }
    }

    /// Whether the principal may overrule any existing lock
    pub fn is_bypass_user(&self, principal: &str) -> bool {
        self.bypass_users.iter().any(|u| u == principal)
    }

    /// Claim every loan in the batch for `owner`, or fail with the full
    /// list of blocking loan IDs and change nothing
    #[instrument(skip(self, loan_ids), fields(batch_size = loan_ids.len(), owner = %owner))]
    pub async fn claim(&self, loan_ids: &[i64], owner: LockOwner, principal: &str) -> Result<()> {
        let bypass = self.is_bypass_user(principal);
        match self.lock_store.claim_all(loan_ids, owner, bypass).await {
            Ok(()) => {
                debug!(owner = %owner, claimed = loan_ids.len(), "Claimed loan account locks");
                Ok(())
            }
            Err(blocking) => {
                warn!(
                    owner = %owner,
                    blocking_loan_ids = ?blocking,
                    "Lock claim batch rejected"
                );
                Err(CobError::LockCannotBeOverruled {
                    loan_ids: blocking,
                })
            }
        }
    }

    /// Split a batch into loans that a claim for `principal` would succeed
    /// on and loans whose locks would block it. Used by the scheduled run
    /// to skip blocked loans instead of aborting the whole day.
    pub async fn partition_claimable(
        &self,
        loan_ids: &[i64],
        principal: &str,
    ) -> (Vec<i64>, Vec<i64>) {
        let bypass = self.is_bypass_user(principal);
        let mut claimable = Vec::new();
        let mut blocked = Vec::new();
        for id in loan_ids {
            match self.lock_store.find(*id).await {
                Some(existing) if !existing.is_overrulable_by(bypass) => blocked.push(*id),
                _ => claimable.push(*id),
            }
        }
        (claimable, blocked)
    }

    /// Record a per-loan run failure: the loan's lock becomes a hard lock
    /// carrying the error message
    pub async fn mark_failed(&self, loan_id: i64, error: impl Into<String>) {
        let error = error.into();
        warn!(loan_id = loan_id, error = %error, "Hard-locking loan after step failure");
        self.lock_store.mark_failed(loan_id, error).await;
    }

    /// Release locks after a successful run
    pub async fn release(&self, loan_ids: &[i64]) {
        debug!(released = loan_ids.len(), "Released loan account locks");
        self.lock_store.remove(loan_ids).await;
    }

    /// Clear every hard lock, returning the affected loan IDs
    pub async fn unlock_hard_locked(&self) -> Vec<i64> {
        let cleared = self.lock_store.remove_hard_locked().await;
        if !cleared.is_empty() {
            info!(loan_ids = ?cleared, "Cleared hard-locked loan accounts");
        }
        cleared
    }

    /// Current lock row for a loan, if any
    pub async fn lock_status(&self, loan_id: i64) -> Option<LoanAccountLock> {
        self.lock_store.find(loan_id).await
    }

    /// Every current lock row, ordered by loan ID
    pub async fn all_locks(&self) -> Vec<LoanAccountLock> {
        self.lock_store.all().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryLockStore;

    fn manager(bypass: Vec<String>) -> (AccountLockManager, Arc<InMemoryLockStore>) {
        let store = Arc::new(InMemoryLockStore::new());
        (AccountLockManager::new(store.clone(), bypass), store)
    }

    #[tokio::test]
    async fn test_claim_unlocked_batch() {
        let (manager, _) = manager(vec![]);
        manager
            .claim(&[1, 2, 3], LockOwner::LoanCobPartitioning, "scheduler")
            .await
            .unwrap();
        let lock = manager.lock_status(2).await.unwrap();
        assert_eq!(lock.lock_owner, LockOwner::LoanCobPartitioning);
        assert!(!lock.is_hard_locked());
    }

    #[tokio::test]
    async fn test_inline_claim_overrules_partitioning_lock() {
        let (manager, _) = manager(vec![]);
        manager
            .claim(&[7], LockOwner::LoanCobPartitioning, "scheduler")
            .await
            .unwrap();
        manager
            .claim(&[7], LockOwner::LoanInlineCobProcessing, "operator")
            .await
            .unwrap();
        let lock = manager.lock_status(7).await.unwrap();
        assert_eq!(lock.lock_owner, LockOwner::LoanInlineCobProcessing);
    }

    #[tokio::test]
    async fn test_mixed_batch_rejection_leaves_state_unchanged() {
        let (manager, _) = manager(vec![]);
        // B (9) is locked by inline processing with no error
        manager
            .claim(&[9], LockOwner::LoanInlineCobProcessing, "operator")
            .await
            .unwrap();

        let err = manager
            .claim(&[5, 9], LockOwner::LoanInlineCobProcessing, "operator")
            .await
            .unwrap_err();
        assert_eq!(err, CobError::LockCannotBeOverruled { loan_ids: vec![9] });

        // A (5) stayed unlocked, B (9) kept its lock
        assert!(manager.lock_status(5).await.is_none());
        assert_eq!(
            manager.lock_status(9).await.unwrap().lock_owner,
            LockOwner::LoanInlineCobProcessing
        );
    }

    #[tokio::test]
    async fn test_bypass_user_overrules_inline_lock() {
        let (manager, _) = manager(vec!["admin".to_string()]);
        manager
            .claim(&[4], LockOwner::LoanInlineCobProcessing, "operator")
            .await
            .unwrap();

        let err = manager
            .claim(&[4], LockOwner::LoanInlineCobProcessing, "operator")
            .await
            .unwrap_err();
        assert!(matches!(err, CobError::LockCannotBeOverruled { .. }));

        manager
            .claim(&[4], LockOwner::LoanInlineCobProcessing, "admin")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_hard_locked_loan_can_be_reclaimed_for_retry() {
        let (manager, _) = manager(vec![]);
        manager
            .claim(&[3], LockOwner::LoanInlineCobProcessing, "operator")
            .await
            .unwrap();
        manager.mark_failed(3, "step APPLY_PENALTY failed").await;
        assert!(manager.lock_status(3).await.unwrap().is_hard_locked());

        manager
            .claim(&[3], LockOwner::LoanInlineCobProcessing, "operator")
            .await
            .unwrap();
        assert!(!manager.lock_status(3).await.unwrap().is_hard_locked());
    }

    #[tokio::test]
    async fn test_partition_claimable_splits_blocked_loans() {
        let (manager, _) = manager(vec![]);
        manager
            .claim(&[2], LockOwner::LoanInlineCobProcessing, "operator")
            .await
            .unwrap();

        let (claimable, blocked) = manager.partition_claimable(&[1, 2, 3], "scheduler").await;
        assert_eq!(claimable, vec![1, 3]);
        assert_eq!(blocked, vec![2]);
    }

    #[tokio::test]
    async fn test_unlock_hard_locked() {
        let (manager, _) = manager(vec![]);
        manager
            .claim(&[1, 2], LockOwner::LoanCobPartitioning, "scheduler")
            .await
            .unwrap();
        manager.mark_failed(1, "boom").await;

        let cleared = manager.unlock_hard_locked().await;
        assert_eq!(cleared, vec![1]);
        assert!(manager.lock_status(1).await.is_none());
        assert!(manager.lock_status(2).await.is_some());
    }
}
