use std::collections::HashMap;
use std::path::PathBuf;

use parking_lot::RwLock;
use tracing::{debug, info};

use crate::{
    Builder,
    error::{ParameterError, Result},
    host::ParameterHost,
    store::ParameterStore,
    types::{ListParametersResult, Parameter, ParameterDescriptor, ParameterValue},
    yaml,
};

/// Environment variable holding `name=value;...` parameter overrides.
///
/// Applied after every other override source, so it wins.
pub const PARAM_OVERRIDE_ENV: &str = "ROSZ_PARAM_OVERRIDE";

/// A named node owning a parameter store.
///
/// All access goes through an internal lock, so a node can be shared behind
/// an `Arc` between loaders and threads.
#[derive(Debug)]
pub struct ParameterNode {
    name: String,
    namespace: String,
    store: RwLock<ParameterStore>,
}

enum OverrideSource {
    Map(HashMap<String, ParameterValue>),
    File(PathBuf),
    Yaml(String),
    Pairs(String),
}

pub struct ParameterNodeBuilder {
    pub name: String,
    pub namespace: String,
    sources: Vec<OverrideSource>,
    use_env: bool,
}

impl ParameterNodeBuilder {
    pub fn new<S: AsRef<str>>(name: S) -> Self {
        Self {
            name: name.as_ref().to_owned(),
            namespace: String::new(),
            sources: Vec::new(),
            use_env: true,
        }
    }

    pub fn with_namespace<S: AsRef<str>>(mut self, namespace: S) -> Self {
        self.namespace = namespace.as_ref().to_owned();
        self
    }

    /// Set initial parameter overrides for this node.
    ///
    /// When a parameter is declared, if an override exists for its name, the
    /// override value is used instead of the default. Sources are applied in
    /// call order; the last one to mention a name wins.
    pub fn with_parameter_overrides(mut self, overrides: HashMap<String, ParameterValue>) -> Self {
        self.sources.push(OverrideSource::Map(overrides));
        self
    }

    /// Load initial parameter values from a ROS 2-style YAML file.
    ///
    /// The file is read at `build()` time and filtered by the node's
    /// fully-qualified name.
    pub fn with_parameter_file<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.sources.push(OverrideSource::File(path.into()));
        self
    }

    /// Same as [`with_parameter_file`](Self::with_parameter_file) for YAML
    /// already in memory.
    pub fn with_parameter_string<S: Into<String>>(mut self, yaml: S) -> Self {
        self.sources.push(OverrideSource::Yaml(yaml.into()));
        self
    }

    /// Overrides in the `name=value;name2=value2` form used by
    /// [`PARAM_OVERRIDE_ENV`].
    pub fn with_override_string<S: Into<String>>(mut self, pairs: S) -> Self {
        self.sources.push(OverrideSource::Pairs(pairs.into()));
        self
    }

    /// Ignore [`PARAM_OVERRIDE_ENV`].
    pub fn without_env_overrides(mut self) -> Self {
        self.use_env = false;
        self
    }

    fn apply_env_overrides(mut self) -> Self {
        if !self.use_env {
            return self;
        }
        if let Ok(pairs) = std::env::var(PARAM_OVERRIDE_ENV) {
            debug!(
                "[NOD] Applying parameter overrides from {}: {}",
                PARAM_OVERRIDE_ENV, pairs
            );
            self.sources.push(OverrideSource::Pairs(pairs));
        }
        self
    }
}

impl Builder for ParameterNodeBuilder {
    type Output = ParameterNode;

    fn build(self) -> Result<ParameterNode> {
        validate_node_name(&self.name)?;
        let namespace = normalize_namespace(&self.namespace)?;
        let node_fqn = fully_qualified_name(&namespace, &self.name);

        let builder = self.apply_env_overrides();
        let mut overrides = HashMap::new();
        for source in builder.sources {
            let values = match source {
                OverrideSource::Map(values) => values,
                OverrideSource::File(path) => {
                    debug!("[NOD] Reading parameter file {:?}", path);
                    yaml::load_parameter_file(&path, &node_fqn)?
                }
                OverrideSource::Yaml(text) => yaml::load_parameter_string(&text, &node_fqn)?,
                OverrideSource::Pairs(pairs) => yaml::parse_override_string(&pairs)?,
            };
            overrides.extend(values);
        }

        info!(
            "[NOD] Node {} created with {} parameter override(s)",
            node_fqn,
            overrides.len()
        );

        Ok(ParameterNode {
            name: builder.name,
            namespace,
            store: RwLock::new(ParameterStore::with_overrides(overrides)),
        })
    }
}

impl ParameterNode {
    pub fn builder<S: AsRef<str>>(name: S) -> ParameterNodeBuilder {
        ParameterNodeBuilder::new(name)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// `/namespace/name`, or `/name` in the root namespace.
    pub fn fully_qualified_name(&self) -> String {
        fully_qualified_name(&self.namespace, &self.name)
    }

    pub fn has_parameter(&self, name: &str) -> bool {
        self.store.read().has(name)
    }

    /// Declare a parameter with a default value and descriptor.
    ///
    /// Returns the actual initial value, which may differ from `default` if an
    /// override was configured on the builder.
    pub fn declare_parameter(
        &self,
        name: &str,
        default: ParameterValue,
        descriptor: ParameterDescriptor,
    ) -> Result<ParameterValue> {
        let value = self.store.write().declare(name, default, descriptor)?;
        debug!("[NOD] Declared parameter {} = {:?}", name, value);
        Ok(value)
    }

    /// Get the current value of a declared parameter.
    pub fn get_parameter(&self, name: &str) -> Result<ParameterValue> {
        self.store
            .read()
            .get(name)
            .ok_or_else(|| ParameterError::NotDeclared(name.to_string()))
    }

    pub fn describe_parameter(&self, name: &str) -> Result<ParameterDescriptor> {
        self.store
            .read()
            .describe(name)
            .ok_or_else(|| ParameterError::NotDeclared(name.to_string()))
    }

    /// Set the value of a declared parameter, returning the previous value.
    ///
    /// The change is validated against the parameter's descriptor.
    pub fn set_parameter(&self, param: Parameter) -> Result<ParameterValue> {
        let old = self.store.write().set(&param)?;
        debug!("[NOD] Set parameter {} = {:?}", param.name, param.value);
        Ok(old)
    }

    pub fn undeclare_parameter(&self, name: &str) -> Result<()> {
        self.store.write().undeclare(name)
    }

    /// List declared parameter names under `prefixes`, at most `depth`
    /// segments deep (`DEPTH_RECURSIVE` for no limit).
    pub fn list_parameters(&self, prefixes: &[String], depth: u64) -> ListParametersResult {
        self.store.read().list(prefixes, depth)
    }

    /// Snapshot of every declared parameter, sorted by name.
    pub fn parameters(&self) -> Vec<Parameter> {
        self.store.read().snapshot()
    }

    /// Current parameters rendered in the ROS 2 parameter file format.
    pub fn dump_parameters(&self) -> Result<String> {
        yaml::dump_parameter_string(&self.fully_qualified_name(), &self.parameters())
    }
}

impl ParameterHost for ParameterNode {
    fn has_parameter(&self, name: &str) -> bool {
        ParameterNode::has_parameter(self, name)
    }

    fn declare_parameter(
        &self,
        name: &str,
        default: ParameterValue,
        descriptor: ParameterDescriptor,
    ) -> Result<ParameterValue> {
        ParameterNode::declare_parameter(self, name, default, descriptor)
    }

    fn get_parameter(&self, name: &str) -> Result<ParameterValue> {
        ParameterNode::get_parameter(self, name)
    }
}

fn fully_qualified_name(namespace: &str, name: &str) -> String {
    if namespace == "/" {
        format!("/{}", name)
    } else {
        format!("{}/{}", namespace, name)
    }
}

fn is_valid_token(token: &str) -> bool {
    let mut chars = token.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}

fn validate_node_name(name: &str) -> Result<()> {
    if is_valid_token(name) {
        Ok(())
    } else {
        Err(ParameterError::InvalidNodeName {
            name: name.to_string(),
            reason: "must be non-empty, alphanumeric or '_', and not start with a digit",
        })
    }
}

fn normalize_namespace(namespace: &str) -> Result<String> {
    let trimmed = namespace.trim_matches('/');
    if trimmed.is_empty() {
        return Ok("/".to_string());
    }
    if !trimmed.split('/').all(is_valid_token) {
        return Err(ParameterError::InvalidNodeName {
            name: namespace.to_string(),
            reason: "namespace segments must be alphanumeric or '_'",
        });
    }
    Ok(format!("/{}", trimmed))
}
