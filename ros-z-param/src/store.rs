//! Parameter storage with validation.
//!
//! `ParameterStore` holds all declared parameters for a node. It enforces
//! type constraints, range checks, and read-only restrictions.

use std::collections::{BTreeSet, HashMap};

use crate::error::{ParameterError, Result};
use crate::types::{
    FloatingPointRange, IntegerRange, ListParametersResult, Parameter, ParameterDescriptor,
    ParameterType, ParameterValue,
};

/// Depth value meaning "no depth limit" for [`crate::ParameterNode::list_parameters`].
pub const DEPTH_RECURSIVE: u64 = 0;

#[derive(Debug, Clone)]
struct ParameterEntry {
    value: ParameterValue,
    descriptor: ParameterDescriptor,
}

/// Parameter store holding all declared parameters for a node.
#[derive(Debug, Default)]
pub(crate) struct ParameterStore {
    parameters: HashMap<String, ParameterEntry>,
    /// Parameter overrides applied at declaration time.
    overrides: HashMap<String, ParameterValue>,
}

impl ParameterStore {
    pub fn with_overrides(overrides: HashMap<String, ParameterValue>) -> Self {
        Self {
            parameters: HashMap::new(),
            overrides,
        }
    }

    /// Declare a parameter with a default value and descriptor.
    ///
    /// If an override exists for this parameter name, the override value is used
    /// instead of the default. Returns the actual initial value.
    pub fn declare(
        &mut self,
        name: &str,
        default: ParameterValue,
        mut descriptor: ParameterDescriptor,
    ) -> Result<ParameterValue> {
        validate_name(name)?;
        if self.parameters.contains_key(name) {
            return Err(ParameterError::AlreadyDeclared(name.to_string()));
        }

        // The default fixes the type; an override must then match it.
        if descriptor.type_ == ParameterType::NotSet {
            descriptor.type_ = default.parameter_type();
        }
        let initial_value = match self.overrides.get(name) {
            Some(value) => coerce_override(value, descriptor.type_),
            None => default,
        };
        if descriptor.type_ == ParameterType::NotSet {
            descriptor.type_ = initial_value.parameter_type();
        }
        descriptor.name = name.to_string();

        validate_value(name, &initial_value, &descriptor)?;

        // Only consumed once the declaration is accepted.
        self.overrides.remove(name);
        self.parameters.insert(
            name.to_string(),
            ParameterEntry {
                value: initial_value.clone(),
                descriptor,
            },
        );

        Ok(initial_value)
    }

    pub fn get(&self, name: &str) -> Option<ParameterValue> {
        self.parameters.get(name).map(|e| e.value.clone())
    }

    pub fn describe(&self, name: &str) -> Option<ParameterDescriptor> {
        self.parameters.get(name).map(|e| e.descriptor.clone())
    }

    pub fn has(&self, name: &str) -> bool {
        self.parameters.contains_key(name)
    }

    /// Validate a parameter change without committing it.
    pub fn validate_set(&self, param: &Parameter) -> Result<()> {
        let entry = self
            .parameters
            .get(&param.name)
            .ok_or_else(|| ParameterError::NotDeclared(param.name.clone()))?;

        if entry.descriptor.read_only {
            return Err(ParameterError::ReadOnly(param.name.clone()));
        }

        validate_value(&param.name, &param.value, &entry.descriptor)
    }

    /// Set a parameter value after validating it. Returns the previous value.
    pub fn set(&mut self, param: &Parameter) -> Result<ParameterValue> {
        self.validate_set(param)?;
        let entry = self
            .parameters
            .get_mut(&param.name)
            .ok_or_else(|| ParameterError::NotDeclared(param.name.clone()))?;
        Ok(std::mem::replace(&mut entry.value, param.value.clone()))
    }

    pub fn undeclare(&mut self, name: &str) -> Result<()> {
        match self.parameters.get(name) {
            None => Err(ParameterError::NotDeclared(name.to_string())),
            Some(entry) if entry.descriptor.read_only => {
                Err(ParameterError::ReadOnly(name.to_string()))
            }
            Some(_) => {
                self.parameters.remove(name);
                Ok(())
            }
        }
    }

    /// All parameters, sorted by name.
    pub fn snapshot(&self) -> Vec<Parameter> {
        let mut params: Vec<Parameter> = self
            .parameters
            .iter()
            .map(|(name, e)| Parameter::new(name.clone(), e.value.clone()))
            .collect();
        params.sort_by(|a, b| a.name.cmp(&b.name));
        params
    }

    /// List parameters matching the given prefixes and depth.
    ///
    /// An empty prefix list matches everything. `depth` counts dotted name
    /// segments below the matched prefix; [`DEPTH_RECURSIVE`] disables the
    /// limit.
    pub fn list(&self, prefixes: &[String], depth: u64) -> ListParametersResult {
        let mut names = Vec::new();
        let mut result_prefixes = BTreeSet::new();

        for param_name in self.parameters.keys() {
            let matched = if prefixes.is_empty() {
                Some("")
            } else {
                prefixes
                    .iter()
                    .find(|p| {
                        p.is_empty()
                            || param_name == p.as_str()
                            || param_name
                                .strip_prefix(p.as_str())
                                .is_some_and(|rest| rest.starts_with('.'))
                    })
                    .map(|s| s.as_str())
            };
            let Some(prefix) = matched else {
                continue;
            };

            if depth != DEPTH_RECURSIVE {
                let suffix = if prefix.is_empty() {
                    param_name.as_str()
                } else if param_name == prefix {
                    ""
                } else {
                    &param_name[prefix.len() + 1..]
                };
                let param_depth = if suffix.is_empty() {
                    0
                } else {
                    suffix.matches('.').count() as u64 + 1
                };
                if param_depth > depth {
                    continue;
                }
            }

            names.push(param_name.clone());
            if let Some(dot_pos) = param_name.rfind('.') {
                result_prefixes.insert(param_name[..dot_pos].to_string());
            }
        }

        names.sort();
        ListParametersResult {
            names,
            prefixes: result_prefixes.into_iter().collect(),
        }
    }
}

/// Check a parameter name. Names are dot-separated tokens.
fn validate_name(name: &str) -> Result<()> {
    let reason = if name.is_empty() {
        "name must not be empty"
    } else if name.chars().any(char::is_whitespace) {
        "name must not contain whitespace"
    } else if name.starts_with('.') || name.ends_with('.') {
        "name must not start or end with '.'"
    } else if name.contains("..") {
        "name must not contain empty segments"
    } else {
        return Ok(());
    };
    Err(ParameterError::InvalidName {
        name: name.to_string(),
        reason,
    })
}

/// Recover array types that YAML cannot express.
///
/// Byte arrays are written as integer sequences, and every empty sequence
/// reads back as a string array. Anything else is returned unchanged.
fn coerce_override(value: &ParameterValue, type_: ParameterType) -> ParameterValue {
    let coerced = match (value, type_) {
        (ParameterValue::IntegerArray(ints), ParameterType::ByteArray) => ints
            .iter()
            .map(|&v| u8::try_from(v).ok())
            .collect::<Option<Vec<_>>>()
            .map(ParameterValue::ByteArray),
        (ParameterValue::StringArray(items), _) if items.is_empty() && type_.is_array() => {
            match type_ {
                ParameterType::ByteArray => Some(ParameterValue::ByteArray(vec![])),
                ParameterType::BoolArray => Some(ParameterValue::BoolArray(vec![])),
                ParameterType::IntegerArray => Some(ParameterValue::IntegerArray(vec![])),
                ParameterType::DoubleArray => Some(ParameterValue::DoubleArray(vec![])),
                _ => None,
            }
        }
        _ => None,
    };
    coerced.unwrap_or_else(|| value.clone())
}

/// Validate a value against a parameter descriptor's constraints.
fn validate_value(
    name: &str,
    value: &ParameterValue,
    descriptor: &ParameterDescriptor,
) -> Result<()> {
    if descriptor.type_ != ParameterType::NotSet
        && !descriptor.dynamic_typing
        && value.is_set()
        && value.parameter_type() != descriptor.type_
    {
        return Err(ParameterError::TypeMismatch {
            name: name.to_string(),
            expected: descriptor.type_,
            actual: value.parameter_type(),
        });
    }

    let range_check = match (value, &descriptor.floating_point_range, &descriptor.integer_range) {
        (ParameterValue::Double(v), Some(range), _) => validate_float_range(*v, range),
        (ParameterValue::Integer(v), _, Some(range)) => validate_integer_range(*v, range),
        _ => Ok(()),
    };

    range_check.map_err(|reason| ParameterError::InvalidValue {
        name: name.to_string(),
        reason,
    })
}

fn validate_float_range(value: f64, range: &FloatingPointRange) -> std::result::Result<(), String> {
    if value < range.from_value || value > range.to_value {
        return Err(format!(
            "value {} out of range [{}, {}]",
            value, range.from_value, range.to_value
        ));
    }

    if range.step != 0.0 {
        let offset = value - range.from_value;
        let remainder = offset % range.step.abs();
        // Upper bound is always valid
        if remainder > 1e-9
            && (range.step.abs() - remainder) > 1e-9
            && (value - range.to_value).abs() > 1e-9
        {
            return Err(format!(
                "value {} not on step grid (from={}, step={})",
                value, range.from_value, range.step
            ));
        }
    }

    Ok(())
}

fn validate_integer_range(value: i64, range: &IntegerRange) -> std::result::Result<(), String> {
    if value < range.from_value || value > range.to_value {
        return Err(format!(
            "value {} out of range [{}, {}]",
            value, range.from_value, range.to_value
        ));
    }

    if range.step != 0 {
        let offset = value.abs_diff(range.from_value);
        if offset % range.step != 0 && value != range.to_value {
            return Err(format!(
                "value {} not on step grid (from={}, step={})",
                value, range.from_value, range.step
            ));
        }
    }

    Ok(())
}
