//! System-wide names shared across orchestration components.
//!
//! Job names, step categories, and run-parameter keys are matched by
//! string in the job catalog and the run-history rows, so they live in
//! one place.

/// Canonical name of the loan close-of-business batch job
pub const LOAN_COB_JOB_NAME: &str = "LOAN_COB";

/// Step category the loan COB job resolves its implementations from
pub const LOAN_COB_STEP_CATEGORY: &str = "loan_cob";

/// Run parameter: the business date the run closes
pub const BUSINESS_DATE_PARAMETER_NAME: &str = "BusinessDate";

/// Run parameter: reference (by ID) to the persisted loan-ID list
pub const LOAN_IDS_PARAMETER_NAME: &str = "LoanIds";

/// Run parameter: marks a run launched by the catch-up controller
pub const IS_CATCH_UP_PARAMETER_NAME: &str = "IS_CATCH_UP";

/// Environment variable prefix for configuration overrides
pub const ENV_PREFIX: &str = "LOAN_COB";
