use super::{Property, TableDescriptor};
use crate::{stmt::Value, Result};

/// Property-level access to a record type.
///
/// Implementations are usually generated with [`record!`](crate::record).
/// Nested properties are exposed with a dotted name (`Address.Street`) and
/// must be handled by a hand-written implementation.
pub trait Record: Send + Sync + 'static {
    /// All persisted properties, in declaration order.
    fn properties() -> Vec<Property>
    where
        Self: Sized;

    /// Reads a property. Returns `None` if the property does not exist.
    fn get(&self, name: &str) -> Option<Value>;

    /// Writes a property, casting `value` to the property's type.
    fn set(&mut self, name: &str, value: Value) -> Result<()>;

    /// Describes the table this record type is stored in.
    ///
    /// Used when no descriptor has been registered for the type.
    fn describe() -> Option<TableDescriptor>
    where
        Self: Sized,
    {
        None
    }
}
