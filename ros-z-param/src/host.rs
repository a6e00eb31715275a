//! The boundary between a loader and whatever holds the parameters.

use crate::error::Result;
use crate::types::{ParameterDescriptor, ParameterValue};

/// A node (or anything else) that owns a parameter store.
///
/// Implementations decide their own locking; every method must be callable
/// concurrently. Nothing here makes a check followed by a declare atomic.
pub trait ParameterHost: Send + Sync {
    /// Whether `name` is currently declared.
    fn has_parameter(&self, name: &str) -> bool;

    /// Declare `name` with a default and descriptor, returning the initial
    /// value actually stored (an override may replace the default).
    fn declare_parameter(
        &self,
        name: &str,
        default: ParameterValue,
        descriptor: ParameterDescriptor,
    ) -> Result<ParameterValue>;

    /// Current value of a declared parameter.
    fn get_parameter(&self, name: &str) -> Result<ParameterValue>;
}
