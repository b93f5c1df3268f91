//! # Step Implementation Registry
//!
//! Explicit registry of [`CobBusinessStep`] implementations keyed by job
//! category. Jobs hold ordered lists of step *names*; this registry
//! resolves those names to behavior. Built at startup by the embedding
//! host — there is no runtime scanning or reflection.
//!
//! ## Usage
//!
//! ```rust
//! use loan_cob_core::registry::step_registry::StepImplementationRegistry;
//! use loan_cob_core::steps::AccrueInterestStep;
//! use std::sync::Arc;
//!
//! let registry = StepImplementationRegistry::new();
//! registry.register("loan_cob", Arc::new(AccrueInterestStep::default()));
//! assert!(registry.resolve("loan_cob", "ACCRUE_INTEREST").is_some());
//! ```

use crate::error::Result;
use crate::models::{AvailableBusinessStep, LoanAccount};
use crate::orchestration::context::CobContext;
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;

/// One named, orderable unit of processing applied to a loan during a COB
/// run. Implementations are stateless, shareable, and invoked sequentially
/// per loan: each step receives the previous step's output.
#[async_trait]
pub trait CobBusinessStep: Send + Sync {
    /// Enum-styled identifier matched against configured step names
    fn step_name(&self) -> &'static str;

    /// Operator-facing description of what the step does
    fn human_readable_name(&self) -> &'static str;

    /// Transform one loan for the context's business date. An error marks
    /// the loan hard-locked; it never aborts the surrounding run.
    async fn execute(&self, loan: LoanAccount, ctx: &CobContext) -> Result<LoanAccount>;
}

impl std::fmt::Debug for dyn CobBusinessStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CobBusinessStep")
            .field("step_name", &self.step_name())
            .finish()
    }
}

/// Registry of step implementations, keyed category → step name
#[derive(Default)]
pub struct StepImplementationRegistry {
    categories: RwLock<HashMap<String, HashMap<String, Arc<dyn CobBusinessStep>>>>,
}

impl StepImplementationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a step implementation under a category. Re-registering a
    /// name replaces the previous implementation.
    pub fn register(&self, category: &str, step: Arc<dyn CobBusinessStep>) {
        info!(
            category = category,
            step_name = step.step_name(),
            "Registered COB business step"
        );
        self.categories
            .write()
            .entry(category.to_string())
            .or_default()
            .insert(step.step_name().to_string(), step);
    }

    /// Resolve a step implementation by category and name
    pub fn resolve(&self, category: &str, step_name: &str) -> Option<Arc<dyn CobBusinessStep>> {
        self.categories
            .read()
            .get(category)
            .and_then(|steps| steps.get(step_name))
            .cloned()
    }

    /// Resolve an ordered list of step names, erroring on the first name
    /// with no registered implementation
    pub fn resolve_all(
        &self,
        category: &str,
        step_names: &[String],
    ) -> Result<Vec<Arc<dyn CobBusinessStep>>> {
        step_names
            .iter()
            .map(|name| {
                self.resolve(category, name)
                    .ok_or_else(|| crate::error::CobError::Validation {
                        reason: format!(
                            "No step implementation '{name}' registered under category '{category}'"
                        ),
                    })
            })
            .collect()
    }

    /// All implementations registered under a category, sorted by step
    /// name. Empty means "no steps available", not an error.
    pub fn available_steps(&self, category: &str) -> Vec<AvailableBusinessStep> {
        let categories = self.categories.read();
        let mut steps: Vec<AvailableBusinessStep> = categories
            .get(category)
            .map(|steps| {
                steps
                    .values()
                    .map(|step| AvailableBusinessStep {
                        step_name: step.step_name().to_string(),
                        human_readable_name: step.human_readable_name().to_string(),
                    })
                    .collect()
            })
            .unwrap_or_default();
        steps.sort_by(|a, b| a.step_name.cmp(&b.step_name));
        steps
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NoopStep;

    #[async_trait]
    impl CobBusinessStep for NoopStep {
        fn step_name(&self) -> &'static str {
            "NOOP"
        }

        fn human_readable_name(&self) -> &'static str {
            "Does nothing"
        }

        async fn execute(&self, loan: LoanAccount, _ctx: &CobContext) -> Result<LoanAccount> {
            Ok(loan)
        }
    }

    #[test]
    fn test_register_and_resolve() {
        let registry = StepImplementationRegistry::new();
        registry.register("loan_cob", Arc::new(NoopStep));

        assert!(registry.resolve("loan_cob", "NOOP").is_some());
        assert!(registry.resolve("loan_cob", "MISSING").is_none());
        assert!(registry.resolve("other", "NOOP").is_none());
    }

    #[test]
    fn test_available_steps_empty_for_unknown_category() {
        let registry = StepImplementationRegistry::new();
        assert!(registry.available_steps("unknown").is_empty());
    }

    #[test]
    fn test_resolve_all_fails_on_unregistered_name() {
        let registry = StepImplementationRegistry::new();
        registry.register("loan_cob", Arc::new(NoopStep));

        let resolved = registry.resolve_all("loan_cob", &["NOOP".to_string()]).unwrap();
        assert_eq!(resolved.len(), 1);

        let err = registry
            .resolve_all("loan_cob", &["NOOP".to_string(), "MISSING".to_string()])
            .unwrap_err();
        assert!(err.to_string().contains("MISSING"));
    }
}
