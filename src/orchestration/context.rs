//! Explicit execution context passed through the COB pipeline.
//!
//! Spawned tasks (partition workers, the catch-up loop) run on different
//! worker threads, so everything they need travels in this immutable value
//! rather than in ambient thread-local state.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Immutable per-invocation context: tenant, business date, acting
/// principal, and whether the invocation belongs to a catch-up pass
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CobContext {
    pub tenant_id: String,
    pub business_date: NaiveDate,
    pub principal: String,
    pub is_catch_up: bool,
}

impl CobContext {
    pub fn new(
        tenant_id: impl Into<String>,
        business_date: NaiveDate,
        principal: impl Into<String>,
    ) -> Self {
        Self {
            tenant_id: tenant_id.into(),
            business_date,
            principal: principal.into(),
            is_catch_up: false,
        }
    }

    /// Same context re-pointed at another business date; used by the
    /// catch-up loop as it walks dates forward
    pub fn for_date(&self, business_date: NaiveDate) -> Self {
        Self {
            business_date,
            ..self.clone()
        }
    }

    pub fn as_catch_up(mut self) -> Self {
        self.is_catch_up = true;
        self
    }
}
