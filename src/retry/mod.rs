//! Retry module (ergonomic namespace)
//! - policy.rs: retry configuration and status classification
//! - budget.rs: per-call attempt accounting

pub mod budget;
pub mod policy;

pub use budget::RetryBudget;
pub use policy::RetryPolicy;
