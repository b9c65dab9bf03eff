use super::{Type, Value};
use crate::{Error, Result};

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

/// A host type that can be stored in a record property.
///
/// `Option<T>` is implemented for every `T: ValueType` and reports the same
/// [`Type`] with `NULLABLE` set, so a nullable wrapper maps to its base SQL type.
pub trait ValueType: Sized {
    const NULLABLE: bool = false;

    fn ty() -> Type;

    fn to_value(&self) -> Value;

    fn from_value(value: Value) -> Result<Self>;
}

macro_rules! impl_value_type {
    ( $( $host:ty => $variant:ident, )* ) => {
        $(
            impl ValueType for $host {
                fn ty() -> Type {
                    Type::$variant
                }

                fn to_value(&self) -> Value {
                    Value::$variant(self.clone())
                }

                fn from_value(value: Value) -> Result<Self> {
                    match Type::$variant.cast(value)? {
                        Value::$variant(v) => Ok(v),
                        value => Err(Error::type_conversion(value, stringify!($host))),
                    }
                }
            }
        )*
    };
}

impl_value_type! {
    bool => Bool,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    f32 => F32,
    f64 => F64,
    Decimal => Decimal,
    String => String,
    Vec<u8> => Bytes,
    Uuid => Uuid,
    NaiveDate => Date,
    NaiveTime => Time,
    NaiveDateTime => Timestamp,
    DateTime<Utc> => TimestampTz,
}

impl<T: ValueType> ValueType for Option<T> {
    const NULLABLE: bool = true;

    fn ty() -> Type {
        T::ty()
    }

    fn to_value(&self) -> Value {
        match self {
            Some(v) => v.to_value(),
            None => Value::Null,
        }
    }

    fn from_value(value: Value) -> Result<Self> {
        if value.is_null() {
            Ok(None)
        } else {
            T::from_value(value).map(Some)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn option_is_nullable_with_base_type() {
        assert!(<Option<i32> as ValueType>::NULLABLE);
        assert!(!<i32 as ValueType>::NULLABLE);
        assert_eq!(<Option<i32> as ValueType>::ty(), Type::I32);
    }

    #[test]
    fn from_value_casts() {
        assert_eq!(i64::from_value(Value::I32(9)).unwrap(), 9);
        assert_eq!(Option::<String>::from_value(Value::Null).unwrap(), None);
    }

    #[test]
    fn null_into_required_property_fails() {
        let err = i32::from_value(Value::Null).unwrap_err();
        assert!(err.is_type_conversion());
        assert_eq!(err.to_string(), "cannot convert null to i32");
    }
}
