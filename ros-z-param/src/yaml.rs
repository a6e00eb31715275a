//! ROS 2-style YAML parameter file loading.
//!
//! Supports the standard ROS 2 parameter file format:
//!
//! ```yaml
//! /**:
//!   ros__parameters:
//!     my_param: 42
//!     another: "hello"
//!
//! /my_node:
//!   ros__parameters:
//!     solver:
//!       max_iterations: 100
//!
//! /my_ns/my_node:
//!   ros__parameters:
//!     nested_param: 3.14
//! ```
//!
//! Node patterns support wildcards: `/**` matches all nodes, `/ns/**` every
//! node below `/ns` and `/ns/*` its direct children. Nested mappings below
//! `ros__parameters` become dotted names (`solver.max_iterations`).

use std::collections::HashMap;
use std::path::Path;

use serde_yaml::{Mapping, Value};

use crate::error::{ParameterError, Result};
use crate::types::{Parameter, ParameterValue};

const PARAMETERS_KEY: &str = "ros__parameters";

/// Load parameter overrides from a YAML file for the given node.
///
/// Returns a map of parameter name → value containing only the parameters
/// applicable to the specified node (by its fully-qualified name).
pub fn load_parameter_file(
    path: &Path,
    node_fqn: &str,
) -> Result<HashMap<String, ParameterValue>> {
    let content = std::fs::read_to_string(path).map_err(|e| ParameterError::File {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    load_parameter_string(&content, node_fqn)
}

/// Parse a YAML string and extract parameter overrides for the given node.
///
/// Selectors are applied in file order, so a later node-specific block
/// overrides an earlier wildcard one.
pub fn load_parameter_string(
    yaml: &str,
    node_fqn: &str,
) -> Result<HashMap<String, ParameterValue>> {
    let mut result = HashMap::new();
    if yaml.trim().is_empty() {
        return Ok(result);
    }

    let doc: Value = serde_yaml::from_str(yaml)?;
    if doc.is_null() {
        return Ok(result);
    }

    let mapping = doc
        .as_mapping()
        .ok_or_else(|| ParameterError::Yaml("YAML root must be a mapping".to_string()))?;

    for (key, node_val) in mapping {
        let selector = key
            .as_str()
            .ok_or_else(|| ParameterError::Yaml("node selectors must be strings".to_string()))?;

        if !matches_node(selector, node_fqn) {
            continue;
        }

        let node_map = node_val.as_mapping().ok_or_else(|| {
            ParameterError::Yaml(format!("value for '{}' must be a mapping", selector))
        })?;

        if let Some(params) = node_map.get(PARAMETERS_KEY) {
            let params_map = params.as_mapping().ok_or_else(|| {
                ParameterError::Yaml(format!("{} must be a mapping", PARAMETERS_KEY))
            })?;
            flatten_parameters("", params_map, &mut result)?;
        }
    }

    Ok(result)
}

/// Parse an override string of the form `name=value;name2=value2`.
///
/// Each value is parsed as YAML, so `rate=10`, `mode="fast"`, `gains=[1.0, 2.0]`
/// produce integer, string and double array values.
pub fn parse_override_string(overrides: &str) -> Result<HashMap<String, ParameterValue>> {
    let mut result = HashMap::new();

    for pair in overrides.split(';') {
        let pair = pair.trim();
        if pair.is_empty() {
            continue;
        }

        let (name, raw) = pair.split_once('=').ok_or_else(|| {
            ParameterError::Yaml(format!("invalid override '{}', expected name=value", pair))
        })?;
        let name = name.trim();
        if name.is_empty() {
            return Err(ParameterError::Yaml(format!(
                "invalid override '{}', missing parameter name",
                pair
            )));
        }

        let value: Value = serde_yaml::from_str(raw.trim())?;
        result.insert(name.to_string(), yaml_value_to_parameter(name, &value)?);
    }

    Ok(result)
}

/// Render parameters for a node in the parameter file format.
///
/// YAML has no byte arrays and no typed empty sequences, so reading the
/// output back with [`load_parameter_string`] yields `IntegerArray` for byte
/// arrays and `StringArray` for every empty array. Used as overrides, the
/// store converts these back to the declared array type.
pub fn dump_parameter_string(node_fqn: &str, params: &[Parameter]) -> Result<String> {
    let mut values = Mapping::new();
    for param in params {
        values.insert(
            Value::String(param.name.clone()),
            serde_yaml::to_value(&param.value)?,
        );
    }

    let mut node = Mapping::new();
    node.insert(Value::String(PARAMETERS_KEY.to_string()), Value::Mapping(values));

    let mut root = Mapping::new();
    root.insert(Value::String(node_fqn.to_string()), Value::Mapping(node));

    Ok(serde_yaml::to_string(&Value::Mapping(root))?)
}

fn flatten_parameters(
    prefix: &str,
    map: &Mapping,
    out: &mut HashMap<String, ParameterValue>,
) -> Result<()> {
    for (pname, pval) in map {
        let key = pname
            .as_str()
            .ok_or_else(|| ParameterError::Yaml("parameter names must be strings".to_string()))?;
        let name = if prefix.is_empty() {
            key.to_string()
        } else {
            format!("{}.{}", prefix, key)
        };

        match pval {
            Value::Mapping(nested) => flatten_parameters(&name, nested, out)?,
            _ => {
                let value = yaml_value_to_parameter(&name, pval)?;
                out.insert(name, value);
            }
        }
    }
    Ok(())
}

/// Check whether a node selector matches the given fully-qualified node name.
///
/// Selectors:
/// - `/**`: matches any node
/// - `/some_ns/**`: matches any node under `/some_ns/`
/// - `/some_ns/*`: matches nodes directly in `/some_ns`
/// - `/node_name` or `/ns/node_name`: exact match
fn matches_node(selector: &str, node_fqn: &str) -> bool {
    if selector == "/**" || selector == "**" {
        return true;
    }

    if let Some(prefix) = selector.strip_suffix("/**") {
        return node_fqn
            .strip_prefix(prefix)
            .is_some_and(|rest| rest.starts_with('/'));
    }

    if let Some(prefix) = selector.strip_suffix("/*") {
        return node_fqn
            .strip_prefix(prefix)
            .and_then(|rest| rest.strip_prefix('/'))
            .is_some_and(|rest| !rest.is_empty() && !rest.contains('/'));
    }

    selector == node_fqn
}

/// Convert a YAML value to a ParameterValue.
///
/// - Integer → Integer, float → Double, boolean → Bool, string → String
/// - null → NotSet
/// - Sequences must be homogeneous; integer sequences are IntegerArray,
///   sequences containing a float are DoubleArray, empty sequences are
///   StringArray
fn yaml_value_to_parameter(name: &str, val: &Value) -> Result<ParameterValue> {
    let invalid = |reason: &str| ParameterError::InvalidValue {
        name: name.to_string(),
        reason: reason.to_string(),
    };

    match val {
        Value::Null => Ok(ParameterValue::NotSet),
        Value::Bool(b) => Ok(ParameterValue::Bool(*b)),
        Value::Number(n) => n
            .as_i64()
            .map(ParameterValue::Integer)
            .or_else(|| n.as_f64().map(ParameterValue::Double))
            .ok_or_else(|| invalid("unsupported number")),
        Value::String(s) => Ok(ParameterValue::String(s.clone())),
        Value::Sequence(seq) => {
            infer_sequence_type(seq).ok_or_else(|| invalid("sequence items must share one type"))
        }
        Value::Mapping(_) => Err(invalid("mappings are not parameter values")),
        Value::Tagged(tagged) => yaml_value_to_parameter(name, &tagged.value),
    }
}

fn infer_sequence_type(seq: &[Value]) -> Option<ParameterValue> {
    match seq.first() {
        None => Some(ParameterValue::StringArray(vec![])),
        Some(Value::Bool(_)) => seq
            .iter()
            .map(Value::as_bool)
            .collect::<Option<Vec<_>>>()
            .map(ParameterValue::BoolArray),
        Some(Value::Number(_)) => {
            if let Some(ints) = seq.iter().map(Value::as_i64).collect::<Option<Vec<_>>>() {
                Some(ParameterValue::IntegerArray(ints))
            } else {
                seq.iter()
                    .map(Value::as_f64)
                    .collect::<Option<Vec<_>>>()
                    .map(ParameterValue::DoubleArray)
            }
        }
        Some(Value::String(_)) => seq
            .iter()
            .map(|v| v.as_str().map(str::to_string))
            .collect::<Option<Vec<_>>>()
            .map(ParameterValue::StringArray),
        _ => None,
    }
}
