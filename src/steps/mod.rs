//! Concrete COB business steps shipped under the `loan_cob` category.
//!
//! These are the processing stages the default loan COB job applies to
//! every eligible loan at the day boundary. Each step transforms one loan
//! and is invoked in the order configured in the business step registry.

pub mod accrue_interest;
pub mod apply_overdue_penalty;
pub mod update_delinquency_bucket;

pub use accrue_interest::AccrueInterestStep;
pub use apply_overdue_penalty::ApplyOverduePenaltyStep;
pub use update_delinquency_bucket::UpdateDelinquencyBucketStep;

use crate::constants::LOAN_COB_STEP_CATEGORY;
use crate::registry::StepImplementationRegistry;
use std::sync::Arc;

/// Register the default loan COB steps under the `loan_cob` category
pub fn register_default_steps(registry: &StepImplementationRegistry) {
    registry.register(LOAN_COB_STEP_CATEGORY, Arc::new(AccrueInterestStep::default()));
    registry.register(
        LOAN_COB_STEP_CATEGORY,
        Arc::new(ApplyOverduePenaltyStep::default()),
    );
    registry.register(
        LOAN_COB_STEP_CATEGORY,
        Arc::new(UpdateDelinquencyBucketStep),
    );
}
