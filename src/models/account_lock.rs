//! Per-loan advisory lock entities.
//!
//! Presence of a lock row means the loan is claimed by its owner; a
//! non-blank `error` marks a hard lock left behind by a failed run, which
//! blocks further claims until explicitly cleared or reclaimed for retry.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Owner tag recorded on a loan account lock
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LockOwner {
    /// Claimed by the partitioner for a scheduled/catch-up run
    LoanCobPartitioning,
    /// Claimed by the inline executor for an ad-hoc run
    LoanInlineCobProcessing,
}

impl LockOwner {
    /// Partitioning locks may always be superseded by a later claim
    pub fn is_overrulable(&self) -> bool {
        matches!(self, Self::LoanCobPartitioning)
    }
}

impl fmt::Display for LockOwner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LoanCobPartitioning => write!(f, "LOAN_COB_PARTITIONING"),
            Self::LoanInlineCobProcessing => write!(f, "LOAN_INLINE_COB_PROCESSING"),
        }
    }
}

/// Advisory lock row for one loan; at most one per loan ID
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanAccountLock {
    pub loan_id: i64,
    pub lock_owner: LockOwner,
    /// Non-blank means the loan is hard-locked by a prior failure
    pub error: Option<String>,
    pub locked_at: DateTime<Utc>,
}

impl LoanAccountLock {
    pub fn new(loan_id: i64, lock_owner: LockOwner) -> Self {
        Self {
            loan_id,
            lock_owner,
            error: None,
            locked_at: Utc::now(),
        }
    }

    /// A hard lock carries a non-blank error message
    pub fn is_hard_locked(&self) -> bool {
        self.error
            .as_deref()
            .is_some_and(|e| !e.trim().is_empty())
    }

    /// Whether a new claim may supersede this lock.
    ///
    /// True when the current owner is the partitioner, when the claiming
    /// principal is a designated bypass user, or when the lock carries an
    /// error (a failed run's lock may be reclaimed for retry).
    pub fn is_overrulable_by(&self, bypass_user: bool) -> bool {
        self.lock_owner.is_overrulable() || bypass_user || self.is_hard_locked()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partitioning_lock_is_always_overrulable() {
        let lock = LoanAccountLock::new(7, LockOwner::LoanCobPartitioning);
        assert!(lock.is_overrulable_by(false));
    }

    #[test]
    fn test_inline_lock_requires_bypass_or_error() {
        let mut lock = LoanAccountLock::new(7, LockOwner::LoanInlineCobProcessing);
        assert!(!lock.is_overrulable_by(false));
        assert!(lock.is_overrulable_by(true));

        lock.error = Some("step ACCRUE_INTEREST failed".to_string());
        assert!(lock.is_hard_locked());
        assert!(lock.is_overrulable_by(false));
    }

    #[test]
    fn test_blank_error_is_not_a_hard_lock() {
        let mut lock = LoanAccountLock::new(9, LockOwner::LoanInlineCobProcessing);
        lock.error = Some("   ".to_string());
        assert!(!lock.is_hard_locked());
    }

    #[test]
    fn test_lock_owner_display() {
        assert_eq!(
            LockOwner::LoanCobPartitioning.to_string(),
            "LOAN_COB_PARTITIONING"
        );
        assert_eq!(
            LockOwner::LoanInlineCobProcessing.to_string(),
            "LOAN_INLINE_COB_PROCESSING"
        );
    }
}
