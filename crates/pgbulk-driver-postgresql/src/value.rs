use pgbulk_core::stmt::{self, Value as CoreValue};
use postgres_types::{accepts, private::BytesMut, to_sql_checked, IsNull, ToSql, Type};
use rust_decimal::{prelude::ToPrimitive, Decimal};

type BoxError = Box<dyn std::error::Error + Sync + Send>;

/// Encodes a pgbulk value as whichever PostgreSQL type the server expects.
///
/// Integers widen or narrow (checked) to the column's width, numbers convert
/// between floats and `numeric`, and strings, UUIDs and timestamps convert
/// where PostgreSQL would accept an implicit cast.
#[derive(Debug)]
pub struct Value(CoreValue);

impl From<CoreValue> for Value {
    fn from(value: CoreValue) -> Self {
        Self(value)
    }
}

fn mismatch(value: &CoreValue, ty: &Type) -> BoxError {
    format!("cannot encode {value:?} as PostgreSQL `{ty}`").into()
}

fn encode_int(value: i64, ty: &Type, out: &mut BytesMut) -> Result<IsNull, BoxError> {
    match *ty {
        Type::INT2 => i16::try_from(value)?.to_sql(ty, out),
        Type::INT4 => i32::try_from(value)?.to_sql(ty, out),
        Type::INT8 => value.to_sql(ty, out),
        Type::FLOAT4 => (value as f32).to_sql(ty, out),
        Type::FLOAT8 => (value as f64).to_sql(ty, out),
        Type::NUMERIC => Decimal::from(value).to_sql(ty, out),
        Type::TEXT | Type::VARCHAR | Type::BPCHAR => value.to_string().to_sql(ty, out),
        _ => Err(mismatch(&CoreValue::I64(value), ty)),
    }
}

fn encode_float(value: f64, ty: &Type, out: &mut BytesMut) -> Result<IsNull, BoxError> {
    match *ty {
        Type::FLOAT4 => (value as f32).to_sql(ty, out),
        Type::FLOAT8 => value.to_sql(ty, out),
        Type::NUMERIC => Decimal::try_from(value)?.to_sql(ty, out),
        _ => Err(mismatch(&CoreValue::F64(value), ty)),
    }
}

fn encode_str(value: &str, ty: &Type, out: &mut BytesMut) -> Result<IsNull, BoxError> {
    match *ty {
        Type::JSON => {
            out.extend_from_slice(value.as_bytes());
            Ok(IsNull::No)
        }
        Type::JSONB => {
            // jsonb binary format version
            out.extend_from_slice(&[1]);
            out.extend_from_slice(value.as_bytes());
            Ok(IsNull::No)
        }
        Type::UUID => value.parse::<uuid::Uuid>()?.to_sql(ty, out),
        _ => value.to_sql(ty, out),
    }
}

impl ToSql for Value {
    fn to_sql(&self, ty: &Type, out: &mut BytesMut) -> Result<IsNull, BoxError>
    where
        Self: Sized,
    {
        match &self.0 {
            stmt::Value::Null => Ok(IsNull::Yes),
            stmt::Value::Bool(value) => match *ty {
                Type::BOOL => value.to_sql(ty, out),
                _ => Err(mismatch(&self.0, ty)),
            },
            stmt::Value::I16(value) => encode_int(i64::from(*value), ty, out),
            stmt::Value::I32(value) => encode_int(i64::from(*value), ty, out),
            stmt::Value::I64(value) => encode_int(*value, ty, out),
            stmt::Value::F32(value) => encode_float(f64::from(*value), ty, out),
            stmt::Value::F64(value) => encode_float(*value, ty, out),
            stmt::Value::Decimal(value) => match *ty {
                Type::NUMERIC => value.to_sql(ty, out),
                Type::FLOAT8 => value
                    .to_f64()
                    .ok_or_else(|| mismatch(&self.0, ty))?
                    .to_sql(ty, out),
                Type::INT8 => value
                    .to_i64()
                    .ok_or_else(|| mismatch(&self.0, ty))?
                    .to_sql(ty, out),
                _ => Err(mismatch(&self.0, ty)),
            },
            stmt::Value::String(value) => encode_str(value, ty, out),
            stmt::Value::Bytes(value) => match *ty {
                Type::BYTEA => value.to_sql(ty, out),
                _ => Err(mismatch(&self.0, ty)),
            },
            stmt::Value::Uuid(value) => match *ty {
                Type::UUID => value.to_sql(ty, out),
                _ => value.to_string().to_sql(ty, out),
            },
            stmt::Value::Date(value) => value.to_sql(ty, out),
            stmt::Value::Time(value) => value.to_sql(ty, out),
            stmt::Value::Timestamp(value) => match *ty {
                Type::TIMESTAMPTZ => value.and_utc().to_sql(ty, out),
                _ => value.to_sql(ty, out),
            },
            stmt::Value::TimestampTz(value) => match *ty {
                Type::TIMESTAMP => value.naive_utc().to_sql(ty, out),
                _ => value.to_sql(ty, out),
            },
        }
    }

    accepts!(
        BOOL,
        INT2,
        INT4,
        INT8,
        FLOAT4,
        FLOAT8,
        NUMERIC,
        TEXT,
        VARCHAR,
        BPCHAR,
        NAME,
        UNKNOWN,
        JSON,
        JSONB,
        BYTEA,
        UUID,
        DATE,
        TIME,
        TIMESTAMP,
        TIMESTAMPTZ
    );
    to_sql_checked!();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(value: CoreValue, ty: &Type) -> Result<BytesMut, BoxError> {
        let mut out = BytesMut::new();
        Value::from(value).to_sql(ty, &mut out)?;
        Ok(out)
    }

    #[test]
    fn integers_follow_column_width() {
        assert_eq!(encode(CoreValue::I64(7), &Type::INT4).unwrap().len(), 4);
        assert_eq!(encode(CoreValue::I16(7), &Type::INT8).unwrap().len(), 8);
        assert!(encode(CoreValue::I64(i64::MAX), &Type::INT4).is_err());
    }

    #[test]
    fn jsonb_gets_version_prefix() {
        let out = encode(CoreValue::from("{}"), &Type::JSONB).unwrap();
        assert_eq!(&out[..], b"\x01{}");
    }

    #[test]
    fn null_is_null() {
        let mut out = BytesMut::new();
        let is_null = Value::from(CoreValue::Null)
            .to_sql(&Type::INT4, &mut out)
            .unwrap();
        assert!(matches!(is_null, IsNull::Yes));
    }

    #[test]
    fn mismatch_is_an_error() {
        let err = encode(CoreValue::Bytes(vec![1]), &Type::INT4).unwrap_err();
        assert!(err.to_string().contains("cannot"), "{err}");
    }
}
