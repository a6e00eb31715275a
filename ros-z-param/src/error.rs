//! Error types for parameter declaration and loading

use std::path::PathBuf;

use crate::types::ParameterType;

pub type Result<T> = std::result::Result<T, ParameterError>;

/// Failure reported by a parameter store or host node.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParameterError {
    #[error("invalid parameter name '{name}': {reason}")]
    InvalidName { name: String, reason: &'static str },

    #[error("parameter '{0}' already declared")]
    AlreadyDeclared(String),

    #[error("parameter '{0}' not declared")]
    NotDeclared(String),

    #[error("parameter '{0}' is read-only")]
    ReadOnly(String),

    #[error("parameter '{name}': type mismatch, expected {expected} but got {actual}")]
    TypeMismatch {
        name: String,
        expected: ParameterType,
        actual: ParameterType,
    },

    #[error("invalid value for parameter '{name}': {reason}")]
    InvalidValue { name: String, reason: String },

    #[error("invalid node name '{name}': {reason}")]
    InvalidNodeName { name: String, reason: &'static str },

    #[error("failed to read parameter file {path:?}: {reason}")]
    File { path: PathBuf, reason: String },

    #[error("failed to parse parameter YAML: {0}")]
    Yaml(String),
}

impl From<serde_yaml::Error> for ParameterError {
    fn from(e: serde_yaml::Error) -> Self {
        Self::Yaml(e.to_string())
    }
}

/// Step of a load at which the host reported a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum LoadStage {
    #[strum(serialize = "declare")]
    Declare,
    #[strum(serialize = "get")]
    Get,
}

/// Failure of [`ParameterLoader::load`](crate::ParameterLoader::load).
///
/// Displays exactly the message of the host error that caused it.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{source}")]
pub struct LoadError {
    pub name: String,
    pub stage: LoadStage,
    #[source]
    pub source: ParameterError,
}

impl LoadError {
    pub(crate) fn new(name: &str, stage: LoadStage, source: ParameterError) -> Self {
        Self {
            name: name.to_string(),
            stage,
            source,
        }
    }

    /// The message of the underlying host error.
    pub fn message(&self) -> String {
        self.source.to_string()
    }
}
