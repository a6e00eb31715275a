//! Rust types that can be stored as parameter values.
//!
//! The set is closed: [`ParameterVariant`] is sealed and implemented only for
//! the scalar and array types a ROS 2 parameter can hold, plus `i32` and
//! `f32`, which are stored as `integer` and `double`.

use crate::types::{ParameterType, ParameterValue};

mod private {
    pub trait Sealed {}
}

/// A Rust type with a fixed mapping onto [`ParameterValue`].
pub trait ParameterVariant: private::Sealed + Sized {
    /// Parameter type this Rust type is stored as.
    const TYPE: ParameterType;

    fn into_value(self) -> ParameterValue;

    /// Returns `None` when `value` does not hold this type.
    fn from_value(value: &ParameterValue) -> Option<Self>;
}

macro_rules! impl_variant {
    ($ty:ty, $variant:ident) => {
        impl private::Sealed for $ty {}

        impl ParameterVariant for $ty {
            const TYPE: ParameterType = ParameterType::$variant;

            fn into_value(self) -> ParameterValue {
                ParameterValue::$variant(self)
            }

            fn from_value(value: &ParameterValue) -> Option<Self> {
                match value {
                    ParameterValue::$variant(v) => Some(v.to_owned()),
                    _ => None,
                }
            }
        }
    };
}

impl_variant!(bool, Bool);
impl_variant!(i64, Integer);
impl_variant!(f64, Double);
impl_variant!(String, String);
impl_variant!(Vec<u8>, ByteArray);
impl_variant!(Vec<bool>, BoolArray);
impl_variant!(Vec<i64>, IntegerArray);
impl_variant!(Vec<f64>, DoubleArray);
impl_variant!(Vec<String>, StringArray);

impl private::Sealed for i32 {}

impl ParameterVariant for i32 {
    const TYPE: ParameterType = ParameterType::Integer;

    fn into_value(self) -> ParameterValue {
        ParameterValue::Integer(i64::from(self))
    }

    fn from_value(value: &ParameterValue) -> Option<Self> {
        match value {
            ParameterValue::Integer(v) => i32::try_from(*v).ok(),
            _ => None,
        }
    }
}

impl private::Sealed for f32 {}

impl ParameterVariant for f32 {
    const TYPE: ParameterType = ParameterType::Double;

    fn into_value(self) -> ParameterValue {
        ParameterValue::Double(f64::from(self))
    }

    fn from_value(value: &ParameterValue) -> Option<Self> {
        match value {
            ParameterValue::Double(v)
                if v.is_finite() && !(f32::MIN as f64..=f32::MAX as f64).contains(v) =>
            {
                None
            }
            ParameterValue::Double(v) => Some(*v as f32),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_mapping() {
        assert_eq!(true.into_value(), ParameterValue::Bool(true));
        assert_eq!(<i64 as ParameterVariant>::TYPE, ParameterType::Integer);
        assert_eq!(
            String::from_value(&ParameterValue::String("map".into())),
            Some("map".to_string())
        );
    }

    #[test]
    fn test_wrong_variant_is_none() {
        assert_eq!(f64::from_value(&ParameterValue::Integer(5)), None);
        assert_eq!(Vec::<i64>::from_value(&ParameterValue::ByteArray(vec![1])), None);
        assert_eq!(bool::from_value(&ParameterValue::NotSet), None);
    }

    #[test]
    fn test_narrow_integer() {
        assert_eq!(7i32.into_value(), ParameterValue::Integer(7));
        assert_eq!(i32::from_value(&ParameterValue::Integer(-3)), Some(-3));
        assert_eq!(
            i32::from_value(&ParameterValue::Integer(i64::from(i32::MAX) + 1)),
            None
        );
    }

    #[test]
    fn test_single_precision() {
        assert_eq!(0.5f32.into_value(), ParameterValue::Double(0.5));
        assert_eq!(f32::from_value(&ParameterValue::Double(0.25)), Some(0.25));
        assert_eq!(<f32 as ParameterVariant>::TYPE, ParameterType::Double);
    }

    #[test]
    fn test_single_precision_out_of_range() {
        assert_eq!(f32::from_value(&ParameterValue::Double(1e300)), None);
        assert_eq!(f32::from_value(&ParameterValue::Double(-1e300)), None);
        assert_eq!(
            f32::from_value(&ParameterValue::Double(f64::from(f32::MAX))),
            Some(f32::MAX)
        );
        assert_eq!(
            f32::from_value(&ParameterValue::Double(f64::INFINITY)),
            Some(f32::INFINITY)
        );
    }
}
