//! ROS 2-style parameters for ros-z nodes, and a loader that declares and
//! reads them in one call.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │  ParameterLoader<H>                                          │
//! │  └── host: Arc<H: ParameterHost>                             │
//! │        has_parameter → declare_parameter → get_parameter     │
//! ├──────────────────────────────────────────────────────────────┤
//! │  ParameterNode (the bundled ParameterHost)                   │
//! │  └── store: RwLock<ParameterStore>                           │
//! │      ├── parameters: name → (value, descriptor)              │
//! │      └── overrides: YAML files, maps, ROSZ_PARAM_OVERRIDE    │
//! └──────────────────────────────────────────────────────────────┘
//! ```

pub mod error;
pub mod host;
pub mod loader;
pub mod node;
mod store;
pub mod types;
pub mod variant;
pub mod yaml;

pub use error::{LoadError, LoadStage, ParameterError, Result};
pub use host::ParameterHost;
pub use loader::{LoadRequest, ParameterLoader};
pub use node::{PARAM_OVERRIDE_ENV, ParameterNode, ParameterNodeBuilder};
pub use store::DEPTH_RECURSIVE;
pub use types::{
    FloatingPointRange, IntegerRange, ListParametersResult, Parameter, ParameterDescriptor,
    ParameterType, ParameterValue,
};
pub use variant::ParameterVariant;

/// Builds a configured object, consuming the builder.
///
/// Bring it into scope to call `build()`:
///
/// ```rust,ignore
/// use ros_z_param::Builder;
/// let node = ParameterNode::builder("ik").build()?;
/// ```
pub trait Builder {
    /// The type produced by this builder.
    type Output;
    /// Consume the builder and construct the configured object.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or an override
    /// source could not be read or parsed.
    fn build(self) -> Result<Self::Output>;
}
