use super::Value;
use crate::{Error, Result};

use rust_decimal::Decimal;

/// The host-side type of a record property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Type {
    /// Boolean value
    Bool,

    /// Signed 16-bit integer
    I16,

    /// Signed 32-bit integer
    I32,

    /// Signed 64-bit integer
    I64,

    /// 32-bit float
    F32,

    /// 64-bit float
    F64,

    /// Arbitrary precision decimal
    Decimal,

    /// String type
    String,

    /// Raw bytes
    Bytes,

    /// UUID
    Uuid,

    /// Calendar date
    Date,

    /// Time of day
    Time,

    /// Timestamp without time zone
    Timestamp,

    /// Timestamp in UTC
    TimestampTz,

    /// A field-less enum stored by its discriminant
    Enum,
}

impl Type {
    /// The SQL type used when no explicit column type is configured.
    pub fn sql_type_name(&self) -> &'static str {
        match self {
            Self::Bool => "boolean",
            Self::I16 => "smallint",
            Self::I32 | Self::Enum => "integer",
            Self::I64 => "bigint",
            Self::F32 => "real",
            Self::F64 => "double precision",
            Self::Decimal => "numeric",
            Self::String => "text",
            Self::Bytes => "bytea",
            Self::Uuid => "uuid",
            Self::Date => "date",
            Self::Time => "time",
            Self::Timestamp => "timestamp",
            Self::TimestampTz => "timestamptz",
        }
    }

    /// Textual types are the only ones a collation applies to.
    pub fn is_textual(&self) -> bool {
        matches!(self, Self::String)
    }

    /// Casts `value` to this type.
    ///
    /// Integers convert between widths with bounds checking, numbers widen to
    /// floats and decimals, strings parse into UUIDs and the two timestamp
    /// flavors convert through UTC. Null is passed through unchanged.
    pub fn cast(&self, value: Value) -> Result<Value> {
        if value.is_null() {
            return Ok(value);
        }

        Ok(match (self, value) {
            (Self::Bool, value @ Value::Bool(_)) => value,
            (Self::I16, value) => Value::I16(cast_int(value, "i16")?),
            (Self::I32 | Self::Enum, value) => Value::I32(cast_int(value, "i32")?),
            (Self::I64, value) => Value::I64(cast_int(value, "i64")?),
            (Self::F32, value) => Value::F32(match value {
                Value::F32(v) => v,
                Value::F64(v) => v as f32,
                Value::I16(v) => f32::from(v),
                Value::I32(v) => v as f32,
                Value::I64(v) => v as f32,
                value => return Err(Error::type_conversion(value, "f32")),
            }),
            (Self::F64, value) => Value::F64(match value {
                Value::F32(v) => f64::from(v),
                Value::F64(v) => v,
                Value::I16(v) => f64::from(v),
                Value::I32(v) => f64::from(v),
                Value::I64(v) => v as f64,
                value => return Err(Error::type_conversion(value, "f64")),
            }),
            (Self::Decimal, value) => Value::Decimal(match value {
                Value::Decimal(v) => v,
                Value::I16(v) => Decimal::from(v),
                Value::I32(v) => Decimal::from(v),
                Value::I64(v) => Decimal::from(v),
                Value::F32(v) => Decimal::try_from(v)?,
                Value::F64(v) => Decimal::try_from(v)?,
                value => return Err(Error::type_conversion(value, "Decimal")),
            }),
            (Self::String, value @ Value::String(_)) => value,
            (Self::String, Value::Uuid(v)) => Value::String(v.to_string()),
            (Self::Bytes, value @ Value::Bytes(_)) => value,
            (Self::Uuid, value @ Value::Uuid(_)) => value,
            (Self::Uuid, Value::String(v)) => Value::Uuid(v.parse()?),
            (Self::Date, value @ Value::Date(_)) => value,
            (Self::Time, value @ Value::Time(_)) => value,
            (Self::Timestamp, value @ Value::Timestamp(_)) => value,
            (Self::Timestamp, Value::TimestampTz(v)) => Value::Timestamp(v.naive_utc()),
            (Self::TimestampTz, value @ Value::TimestampTz(_)) => value,
            (Self::TimestampTz, Value::Timestamp(v)) => Value::TimestampTz(v.and_utc()),
            (ty, value) => return Err(Error::type_conversion(value, ty.sql_type_name())),
        })
    }
}

fn cast_int<T>(value: Value, to_type: &'static str) -> Result<T>
where
    T: TryFrom<i64> + TryFrom<Decimal>,
{
    let converted = match &value {
        Value::I16(v) => T::try_from(i64::from(*v)).ok(),
        Value::I32(v) => T::try_from(i64::from(*v)).ok(),
        Value::I64(v) => T::try_from(*v).ok(),
        Value::Decimal(v) if v.fract().is_zero() => T::try_from(*v).ok(),
        _ => None,
    };
    converted.ok_or_else(|| Error::type_conversion(value, to_type))
}
