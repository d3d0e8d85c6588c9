//! Shared utilities

pub mod error;

pub use error::{FailoverError, FailoverResult, HealthError, LocatorError};
