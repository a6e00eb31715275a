//! Declare-if-absent, then get.
//!
//! Component startup usually loads a long list of parameters, each of which
//! must be declared with a default and documentation before it can be read.
//! [`ParameterLoader`] folds both steps into one call:
//!
//! ```ignore
//! let node = Arc::new(ParameterNode::builder("ik").build()?);
//! let load = ParameterLoader::new(node);
//!
//! let max_iterations: i64 = load.load(
//!     "max_iterations",
//!     100,
//!     "max solver iterations",
//!     "must be positive",
//! )?;
//! let timeout = load.request("timeout", 1.0).description("seconds").load()?;
//! ```

use std::sync::Arc;

use tracing::{debug, warn};

use crate::error::{LoadError, LoadStage, ParameterError};
use crate::host::ParameterHost;
use crate::node::ParameterNode;
use crate::types::ParameterDescriptor;
use crate::variant::ParameterVariant;

/// Loads typed parameters from a shared host, declaring them on first use.
pub struct ParameterLoader<H: ?Sized = ParameterNode> {
    host: Arc<H>,
}

impl<H: ?Sized> Clone for ParameterLoader<H> {
    fn clone(&self) -> Self {
        Self {
            host: self.host.clone(),
        }
    }
}

impl<H: ParameterHost + ?Sized> ParameterLoader<H> {
    pub fn new(host: Arc<H>) -> Self {
        Self { host }
    }

    pub fn host(&self) -> &Arc<H> {
        &self.host
    }

    /// Make sure `name` is declared, then return its current value as `T`.
    ///
    /// When the host does not have `name` yet it is declared with
    /// `default_value` and a descriptor carrying `description` and
    /// `constraints`, typed as `T`. The returned value is whatever the host
    /// holds afterwards, which is not necessarily `default_value`: an
    /// override or an earlier declaration wins. An override of another type
    /// fails the declaration.
    ///
    /// A failed declaration is returned without attempting the get. The
    /// presence check and the declaration are separate host calls, so two
    /// callers racing on a new name may see the second declaration fail.
    pub fn load<T: ParameterVariant>(
        &self,
        name: &str,
        default_value: T,
        description: &str,
        constraints: &str,
    ) -> Result<T, LoadError> {
        if !self.host.has_parameter(name) {
            let descriptor = ParameterDescriptor {
                type_: T::TYPE,
                ..ParameterDescriptor::documented(description, constraints)
            };
            self.host
                .declare_parameter(name, default_value.into_value(), descriptor)
                .map_err(|e| fail(name, LoadStage::Declare, e))?;
            debug!("[PRM] Declared {} as {}", name, T::TYPE);
        }

        let value = self
            .host
            .get_parameter(name)
            .map_err(|e| fail(name, LoadStage::Get, e))?;

        let typed = T::from_value(&value).ok_or_else(|| {
            let source = ParameterError::TypeMismatch {
                name: name.to_string(),
                expected: T::TYPE,
                actual: value.parameter_type(),
            };
            fail(name, LoadStage::Get, source)
        })?;

        debug!("[PRM] Loaded {} = {:?}", name, value);
        Ok(typed)
    }

    /// Start a load with empty description and constraints.
    pub fn request<'a, T: ParameterVariant>(
        &'a self,
        name: &'a str,
        default_value: T,
    ) -> LoadRequest<'a, H, T> {
        LoadRequest {
            loader: self,
            name,
            default_value,
            description: "",
            constraints: "",
        }
    }
}

fn fail(name: &str, stage: LoadStage, source: ParameterError) -> LoadError {
    warn!("[PRM] Failed to {} parameter {}: {}", stage, name, source);
    LoadError::new(name, stage, source)
}

/// A pending [`ParameterLoader::load`] with optional documentation.
#[must_use = "a LoadRequest does nothing until `load` is called"]
pub struct LoadRequest<'a, H: ?Sized, T> {
    loader: &'a ParameterLoader<H>,
    name: &'a str,
    default_value: T,
    description: &'a str,
    constraints: &'a str,
}

impl<'a, H: ParameterHost + ?Sized, T: ParameterVariant> LoadRequest<'a, H, T> {
    pub fn description(mut self, description: &'a str) -> Self {
        self.description = description;
        self
    }

    pub fn constraints(mut self, constraints: &'a str) -> Self {
        self.constraints = constraints;
        self
    }

    pub fn load(self) -> Result<T, LoadError> {
        self.loader.load(
            self.name,
            self.default_value,
            self.description,
            self.constraints,
        )
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::Builder;
    use crate::types::{ParameterType, ParameterValue};

    fn loader() -> ParameterLoader {
        let node = ParameterNode::builder("loader_test")
            .without_env_overrides()
            .build()
            .expect("node");
        ParameterLoader::new(Arc::new(node))
    }

    #[test]
    fn test_declares_then_returns_default() {
        let load = loader();
        let v: i64 = load
            .load("max_iterations", 100, "max solver iterations", "must be positive")
            .unwrap();
        assert_eq!(v, 100);

        let desc = load.host().describe_parameter("max_iterations").unwrap();
        assert_eq!(desc.type_, ParameterType::Integer);
        assert_eq!(desc.description, "max solver iterations");
        assert_eq!(desc.additional_constraints, "must be positive");
    }

    #[test]
    fn test_existing_value_wins() {
        let load = loader();
        assert_eq!(load.load("max_iterations", 100i64, "", "").unwrap(), 100);
        assert_eq!(load.load("max_iterations", 999i64, "", "").unwrap(), 100);
        assert_eq!(load.host().parameters().len(), 1);
    }

    #[test]
    fn test_type_mismatch_on_get() {
        let load = loader();
        load.load("timeout", 5.0, "", "").unwrap();

        let err = load.load("timeout", 1i64, "", "").unwrap_err();
        assert_eq!(err.stage, LoadStage::Get);
        assert_eq!(err.name, "timeout");
        assert_eq!(
            err.to_string(),
            "parameter 'timeout': type mismatch, expected integer but got double"
        );
    }

    #[test]
    fn test_declare_failure_skips_get() {
        struct RejectingHost {
            gets: AtomicUsize,
        }

        impl ParameterHost for RejectingHost {
            fn has_parameter(&self, _name: &str) -> bool {
                false
            }

            fn declare_parameter(
                &self,
                name: &str,
                _default: ParameterValue,
                _descriptor: ParameterDescriptor,
            ) -> crate::Result<ParameterValue> {
                Err(ParameterError::InvalidName {
                    name: name.to_string(),
                    reason: "rejected",
                })
            }

            fn get_parameter(&self, _name: &str) -> crate::Result<ParameterValue> {
                self.gets.fetch_add(1, Ordering::SeqCst);
                Ok(ParameterValue::Integer(1))
            }
        }

        let host = Arc::new(RejectingHost {
            gets: AtomicUsize::new(0),
        });
        let load = ParameterLoader::new(host.clone());
        let err = load.load("x", 1i64, "", "").unwrap_err();
        assert_eq!(err.stage, LoadStage::Declare);
        assert_eq!(err.message(), "invalid parameter name 'x': rejected");
        assert_eq!(host.gets.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_request_defaults_to_empty_docs() {
        let load = loader();
        let frame = load
            .request("frame", "base_link".to_string())
            .description("IK base frame")
            .load()
            .unwrap();
        assert_eq!(frame, "base_link");

        let desc = load.host().describe_parameter("frame").unwrap();
        assert_eq!(desc.description, "IK base frame");
        assert!(desc.additional_constraints.is_empty());
    }

    #[test]
    fn test_dyn_host() {
        let node = ParameterNode::builder("dyn_host")
            .without_env_overrides()
            .build()
            .unwrap();
        let host: Arc<dyn ParameterHost> = Arc::new(node);
        let load = ParameterLoader::new(host);
        assert!(load.load("enabled", true, "", "").unwrap());
    }
}
