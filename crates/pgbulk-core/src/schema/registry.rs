//! Process-wide table descriptors, keyed by record type.

use super::{Record, TableDescriptor};
use crate::{Error, Result};

use std::any::{type_name, TypeId};
use std::collections::HashMap;
use std::sync::{Arc, OnceLock, PoisonError, RwLock};

type Registry = RwLock<HashMap<TypeId, Arc<TableDescriptor>>>;

static REGISTRY: OnceLock<Registry> = OnceLock::new();

fn registry() -> &'static Registry {
    REGISTRY.get_or_init(Default::default)
}

/// Registers the table descriptor for `T`, replacing any previous one.
pub fn register<T: Record>(descriptor: TableDescriptor) {
    registry()
        .write()
        .unwrap_or_else(PoisonError::into_inner)
        .insert(TypeId::of::<T>(), Arc::new(descriptor));
}

/// Returns `true` if a descriptor is available for `T` without asking the type.
pub fn is_registered<T: Record>() -> bool {
    registry()
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .contains_key(&TypeId::of::<T>())
}

/// Resolves the table descriptor for `T`.
///
/// A registered descriptor wins. Otherwise [`Record::describe`] is asked once
/// and its answer is cached; concurrent first use still caches a single
/// descriptor.
pub fn resolve<T: Record>() -> Result<Arc<TableDescriptor>> {
    let key = TypeId::of::<T>();

    if let Some(descriptor) = registry()
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .get(&key)
    {
        return Ok(descriptor.clone());
    }

    let mut guard = registry().write().unwrap_or_else(PoisonError::into_inner);

    if let Some(descriptor) = guard.get(&key) {
        return Ok(descriptor.clone());
    }

    let Some(descriptor) = T::describe() else {
        return Err(Error::configuration(format!(
            "type `{}` has not been registered",
            type_name::<T>()
        )));
    };

    let descriptor = Arc::new(descriptor);
    guard.insert(key, descriptor.clone());
    Ok(descriptor)
}
