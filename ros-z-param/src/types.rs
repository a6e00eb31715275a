//! User-facing parameter types.
//!
//! These mirror the `rcl_interfaces` parameter messages closely enough that
//! values and descriptors read the same way they do in any ROS 2 node.

use serde::Serialize;

/// The type of a parameter value.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, strum::Display, strum::EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ParameterType {
    NotSet,
    Bool,
    Integer,
    Double,
    String,
    ByteArray,
    BoolArray,
    IntegerArray,
    DoubleArray,
    StringArray,
}

impl ParameterType {
    pub fn is_array(self) -> bool {
        matches!(
            self,
            Self::ByteArray
                | Self::BoolArray
                | Self::IntegerArray
                | Self::DoubleArray
                | Self::StringArray
        )
    }
}

/// A typed parameter value.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ParameterValue {
    #[default]
    NotSet,
    Bool(bool),
    Integer(i64),
    Double(f64),
    String(std::string::String),
    ByteArray(Vec<u8>),
    BoolArray(Vec<bool>),
    IntegerArray(Vec<i64>),
    DoubleArray(Vec<f64>),
    StringArray(Vec<std::string::String>),
}

impl ParameterValue {
    /// Returns the parameter type of this value.
    pub fn parameter_type(&self) -> ParameterType {
        match self {
            Self::NotSet => ParameterType::NotSet,
            Self::Bool(_) => ParameterType::Bool,
            Self::Integer(_) => ParameterType::Integer,
            Self::Double(_) => ParameterType::Double,
            Self::String(_) => ParameterType::String,
            Self::ByteArray(_) => ParameterType::ByteArray,
            Self::BoolArray(_) => ParameterType::BoolArray,
            Self::IntegerArray(_) => ParameterType::IntegerArray,
            Self::DoubleArray(_) => ParameterType::DoubleArray,
            Self::StringArray(_) => ParameterType::StringArray,
        }
    }

    pub fn is_set(&self) -> bool {
        !matches!(self, Self::NotSet)
    }
}

/// A parameter with its name and value.
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    pub name: std::string::String,
    pub value: ParameterValue,
}

impl Parameter {
    pub fn new(name: impl Into<std::string::String>, value: ParameterValue) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

/// Range constraint for floating point parameters.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FloatingPointRange {
    pub from_value: f64,
    pub to_value: f64,
    pub step: f64,
}

/// Range constraint for integer parameters.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IntegerRange {
    pub from_value: i64,
    pub to_value: i64,
    pub step: u64,
}

/// Descriptor for a parameter, including constraints.
///
/// `additional_constraints` is free-form documentation of rules enforced
/// elsewhere; the store never interprets it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParameterDescriptor {
    pub name: std::string::String,
    #[serde(rename = "type")]
    pub type_: ParameterType,
    pub description: std::string::String,
    pub additional_constraints: std::string::String,
    pub read_only: bool,
    pub dynamic_typing: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub floating_point_range: Option<FloatingPointRange>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub integer_range: Option<IntegerRange>,
}

impl Default for ParameterDescriptor {
    fn default() -> Self {
        Self {
            name: std::string::String::new(),
            type_: ParameterType::NotSet,
            description: std::string::String::new(),
            additional_constraints: std::string::String::new(),
            read_only: false,
            dynamic_typing: false,
            floating_point_range: None,
            integer_range: None,
        }
    }
}

impl ParameterDescriptor {
    /// Create a new descriptor with the given name and type.
    pub fn new(name: impl Into<std::string::String>, type_: ParameterType) -> Self {
        Self {
            name: name.into(),
            type_,
            ..Default::default()
        }
    }

    /// Descriptor carrying only documentation. An unset name or type is
    /// filled in by the store at declaration time.
    pub fn documented(
        description: impl Into<std::string::String>,
        additional_constraints: impl Into<std::string::String>,
    ) -> Self {
        Self::default()
            .with_description(description)
            .with_additional_constraints(additional_constraints)
    }

    pub fn with_description(mut self, description: impl Into<std::string::String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_additional_constraints(
        mut self,
        constraints: impl Into<std::string::String>,
    ) -> Self {
        self.additional_constraints = constraints.into();
        self
    }

    pub fn with_integer_range(mut self, from_value: i64, to_value: i64, step: u64) -> Self {
        self.integer_range = Some(IntegerRange {
            from_value,
            to_value,
            step,
        });
        self
    }

    pub fn with_floating_point_range(mut self, from_value: f64, to_value: f64, step: f64) -> Self {
        self.floating_point_range = Some(FloatingPointRange {
            from_value,
            to_value,
            step,
        });
        self
    }

    pub fn read_only(mut self) -> Self {
        self.read_only = true;
        self
    }
}

/// Result of listing parameters by prefix and depth.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListParametersResult {
    pub names: Vec<std::string::String>,
    pub prefixes: Vec<std::string::String>,
}
