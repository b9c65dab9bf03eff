use crate::stmt::{Type, Value};
use crate::Result;

use std::fmt;
use std::sync::Arc;

type ConvertFn = Arc<dyn Fn(Value) -> Result<Value> + Send + Sync>;

/// A bidirectional conversion between a property value and the value stored
/// in the database.
///
/// A converter also changes the column's inferred SQL type to the provider
/// type, e.g. an enum stored as its name is staged as `text`.
#[derive(Clone)]
pub struct ValueConverter {
    provider_ty: Type,
    to_provider: ConvertFn,
    from_provider: ConvertFn,
}

impl ValueConverter {
    pub fn new<To, From>(provider_ty: Type, to_provider: To, from_provider: From) -> Self
    where
        To: Fn(Value) -> Result<Value> + Send + Sync + 'static,
        From: Fn(Value) -> Result<Value> + Send + Sync + 'static,
    {
        Self {
            provider_ty,
            to_provider: Arc::new(to_provider),
            from_provider: Arc::new(from_provider),
        }
    }

    pub fn provider_ty(&self) -> Type {
        self.provider_ty
    }

    /// Converts a property value into the value written to the database.
    pub fn to_provider(&self, value: Value) -> Result<Value> {
        (self.to_provider)(value)
    }

    /// Converts a database value back into a property value.
    pub fn from_provider(&self, value: Value) -> Result<Value> {
        (self.from_provider)(value)
    }
}

impl fmt::Debug for ValueConverter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValueConverter")
            .field("provider_ty", &self.provider_ty)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    fn level_as_text() -> ValueConverter {
        ValueConverter::new(
            Type::String,
            |value| match value {
                Value::I32(0) => Ok(Value::from("low")),
                Value::I32(1) => Ok(Value::from("high")),
                value => Err(Error::type_conversion(value, "Level")),
            },
            |value| match value.as_str() {
                Some("low") => Ok(Value::I32(0)),
                Some("high") => Ok(Value::I32(1)),
                _ => Err(Error::type_conversion(value, "Level")),
            },
        )
    }

    #[test]
    fn converts_both_ways() {
        let converter = level_as_text();
        assert_eq!(converter.provider_ty(), Type::String);
        assert_eq!(
            converter.to_provider(Value::I32(1)).unwrap(),
            Value::from("high")
        );
        assert_eq!(
            converter.from_provider(Value::from("low")).unwrap(),
            Value::I32(0)
        );
        assert!(converter.to_provider(Value::I32(9)).is_err());
    }
}
