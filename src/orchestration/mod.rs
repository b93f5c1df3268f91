//! # COB Orchestration
//!
//! The batch execution pipeline that advances loan accounts across daily
//! business-date boundaries.
//!
//! ## Core Components
//!
//! - **LoanCobPartitioner**: deterministic bounded partitions of the
//!   eligible loan population
//! - **AccountLockManager**: per-loan advisory locks with batch
//!   all-or-nothing claim semantics and hard-lock error state
//! - **JobExecutionEngine**: runs the configured steps over partitions,
//!   records run history, isolates per-loan failures
//! - **CatchUpController**: sequential day-by-day re-execution of missed
//!   business dates, status derived from the run-history ledger
//! - **InlineExecutor**: operator-triggered ad-hoc runs for explicit loan
//!   sets under the same locking discipline
//!
//! Components receive an explicit immutable [`context::CobContext`];
//! spawned workers and the detached catch-up task never inherit ambient
//! state.

pub mod catch_up;
pub mod context;
pub mod engine;
pub mod inline;
pub mod lock_manager;
pub mod partitioner;
pub mod types;

pub use catch_up::{BusinessDateProvider, CatchUpController, FixedBusinessDateProvider};
pub use context::CobContext;
pub use engine::JobExecutionEngine;
pub use inline::InlineExecutor;
pub use lock_manager::AccountLockManager;
pub use partitioner::{slice_into_partitions, LoanCobPartitioner};
pub use types::{CatchUpStatus, CatchUpTrigger, CommandProcessingResult, RunReport};
