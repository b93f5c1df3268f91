#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # Loan COB Core
//!
//! Close-of-business (COB) loan batch orchestration: a day-boundary
//! driven, partition-based, lock-coordinated batch execution pipeline.
//!
//! ## Overview
//!
//! At each business-day boundary, every active loan is advanced through
//! an ordered list of business steps (interest accrual, penalty
//! application, delinquency classification). This crate provides the
//! orchestration around those steps: who runs, in what order, under
//! which locks, and what happens when a loan fails.
//!
//! ## Architecture
//!
//! - **Business Step Registry**: named, orderable processing steps per
//!   job, reconfigurable at runtime without a deployment
//! - **Partitioner**: deterministic bounded partitions of the eligible
//!   loan population for one business date
//! - **Account Lock Manager**: per-loan advisory locks with batch
//!   all-or-nothing claim semantics; failed loans become hard locks
//! - **Job Execution Engine**: concurrent partition workers, sequential
//!   loans per partition, strictly sequential steps per loan
//! - **Catch-Up Controller**: sequential day-by-day re-execution of
//!   missed business dates up to the current COB date
//! - **Inline Executor**: operator-triggered ad-hoc runs for explicit
//!   loan sets
//!
//! ## Module Organization
//!
//! - [`models`] - Domain entities (steps, locks, loans, runs, partitions)
//! - [`store`] - Storage seams with in-memory implementations
//! - [`registry`] - Step configuration and step implementation registries
//! - [`steps`] - Concrete business steps for the default loan COB job
//! - [`orchestration`] - Partitioner, lock manager, engine, catch-up,
//!   inline execution
//! - [`config`] - Configuration management
//! - [`error`] - Structured error handling
//!
//! ## Quick Start
//!
//! ```rust
//! use loan_cob_core::config::CobConfig;
//! use loan_cob_core::registry::StepImplementationRegistry;
//! use loan_cob_core::steps::register_default_steps;
//!
//! let config = CobConfig::default();
//! let registry = StepImplementationRegistry::new();
//! register_default_steps(&registry);
//!
//! assert_eq!(registry.available_steps("loan_cob").len(), 3);
//! assert_eq!(config.partition_size, 100);
//! ```

pub mod config;
pub mod constants;
pub mod error;
pub mod logging;
pub mod models;
pub mod orchestration;
pub mod registry;
pub mod steps;
pub mod store;

pub use config::CobConfig;
pub use error::{CobError, Result};
pub use models::{
    AvailableBusinessStep, BusinessStep, JobBusinessStepConfig, JobRun, JobRunStatus, LoanAccount,
    LoanAccountLock, LoanCobPartition, LoanStatus, LockOwner, OldestCobProcessedLoan,
    ScheduledJobDetail,
};
pub use orchestration::{
    AccountLockManager, BusinessDateProvider, CatchUpController, CatchUpStatus, CatchUpTrigger,
    CobContext, CommandProcessingResult, FixedBusinessDateProvider, InlineExecutor,
    JobExecutionEngine, LoanCobPartitioner, RunReport,
};
pub use registry::{BusinessStepRegistry, CobBusinessStep, StepImplementationRegistry};
pub use store::{
    InMemoryJobRunStore, InMemoryLoanStore, InMemoryLockStore, JobRunStore, LoanStore, LockStore,
};
