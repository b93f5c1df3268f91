//! Domain model layer for the COB orchestration core.

pub mod account_lock;
pub mod business_step;
pub mod job;
pub mod loan;
pub mod partition;

pub use account_lock::{LoanAccountLock, LockOwner};
pub use business_step::{AvailableBusinessStep, BusinessStep, JobBusinessStepConfig};
pub use job::{CustomJobParameter, JobParameter, JobRun, JobRunStatus, ScheduledJobDetail};
pub use loan::{LoanAccount, LoanStatus, OldestCobProcessedLoan};
pub use partition::LoanCobPartition;
