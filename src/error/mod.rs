//! Error Handling Module
//!
//! This module provides the error type shared by every stage of a bound API
//! call, including:
//! - Core error types (`BindError`, `ErrorCategory`)
//! - Type conversions from common error types
//!
//! # Example
//!
//! ```rust
//! use apibind::error::{BindError, ErrorCategory};
//!
//! let error = BindError::DuplicateParameter { name: "id".into() };
//! assert_eq!(error.category(), ErrorCategory::Validation);
//! assert!(error.response().is_none());
//! ```

mod conversions;
pub mod types;

pub use types::*;
