//! Component registration and discovery for the COB pipeline.

pub mod business_step_registry;
pub mod step_registry;

pub use business_step_registry::BusinessStepRegistry;
pub use step_registry::{CobBusinessStep, StepImplementationRegistry};
