use super::Record;
use crate::stmt::{Type, ValueType};

use std::any::TypeId;
use std::collections::HashMap;
use std::sync::{Arc, OnceLock, PoisonError, RwLock};

/// A single persisted property of a record type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Property {
    /// Property name; nested properties use a dotted path.
    pub name: String,

    /// Host type of the property
    pub ty: Type,

    /// `true` when the property is an `Option`
    pub nullable: bool,
}

impl Property {
    pub fn new(name: impl Into<String>, ty: Type, nullable: bool) -> Self {
        Self {
            name: name.into(),
            ty,
            nullable,
        }
    }

    /// Describes a field from its accessor, inferring type and nullability.
    pub fn of<R, V: ValueType>(name: impl Into<String>, _field: fn(&R) -> &V) -> Self {
        Self::new(name, V::ty(), V::NULLABLE)
    }
}

type Cache = RwLock<HashMap<TypeId, Arc<[Property]>>>;

static PROPERTIES: OnceLock<Cache> = OnceLock::new();

/// Returns the cached property list for `T`.
///
/// The list is computed once per type; concurrent first use yields the same
/// list to every caller.
pub fn properties<T: Record>() -> Arc<[Property]> {
    let cache = PROPERTIES.get_or_init(Default::default);
    let key = TypeId::of::<T>();

    if let Some(props) = cache
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .get(&key)
    {
        return props.clone();
    }

    let mut cache = cache.write().unwrap_or_else(PoisonError::into_inner);
    cache
        .entry(key)
        .or_insert_with(|| T::properties().into())
        .clone()
}
