//! Name to type descriptor registry.
//!
//! The configuration loader, the serializer and the cluster-sync layer look
//! classes up here by name. Registration normally happens once at startup
//! through each crate's bootstrap function.

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::sync::{Arc, LazyLock};

use parking_lot::RwLock;
use tracing::{debug, warn};

use crate::error::{ObjectError, ObjectResult};
use crate::object::{BaseObject, Object, Reflect};
use crate::ownership::{ObjectHandle, downcast_object};
use crate::types::Type;

static GLOBAL: LazyLock<TypeRegistry> = LazyLock::new(TypeRegistry::with_builtins);

/// Thread-safe mapping from type name to descriptor.
#[derive(Debug, Default)]
pub struct TypeRegistry {
    types: RwLock<BTreeMap<String, Arc<Type>>>,
}

impl TypeRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry holding the root `Object` type.
    #[must_use]
    pub fn with_builtins() -> Self {
        let registry = Self::new();
        registry
            .types
            .write()
            .insert("Object".to_string(), BaseObject::type_instance());
        registry
    }

    /// The process-wide registry, pre-populated with the root `Object` type.
    pub fn global() -> &'static Self {
        &GLOBAL
    }

    /// Registers a descriptor under its name.
    ///
    /// Registering the same descriptor again is a no-op; registering a
    /// different descriptor under a taken name fails.
    pub fn register(&self, ty: Arc<Type>) -> ObjectResult<()> {
        let mut types = self.types.write();
        match types.entry(ty.name().to_string()) {
            Entry::Occupied(existing) => {
                if Arc::ptr_eq(existing.get(), &ty) {
                    return Ok(());
                }
                warn!(type_name = %ty.name(), "Type name already registered");
                Err(ObjectError::DuplicateType(ty.name().to_string()))
            }
            Entry::Vacant(slot) => {
                debug!(type_name = %ty.name(), fields = ty.fields().len(), "Type registered");
                slot.insert(ty);
                Ok(())
            }
        }
    }

    /// Looks a descriptor up by name.
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<Arc<Type>> {
        self.types.read().get(name).cloned()
    }

    /// Looks a descriptor up by name, failing with [`ObjectError::TypeNotFound`].
    pub fn get(&self, name: &str) -> ObjectResult<Arc<Type>> {
        self.lookup(name).ok_or_else(|| {
            warn!(type_name = %name, "Unknown type requested");
            ObjectError::TypeNotFound(name.to_string())
        })
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.types.read().contains_key(name)
    }

    /// Returns all registered names, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        self.types.read().keys().cloned().collect()
    }

    /// Returns all registered descriptors, sorted by name.
    #[must_use]
    pub fn types(&self) -> Vec<Arc<Type>> {
        self.types.read().values().cloned().collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.types.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.types.read().is_empty()
    }

    /// Constructs a new object of the named type.
    pub fn create(&self, name: &str) -> ObjectResult<ObjectHandle> {
        self.get(name)?.instantiate()
    }

    /// Constructs a new object of the named type as class `T`.
    ///
    /// Fails with [`ObjectError::TypeMismatch`] if the named type is not `T`.
    pub fn create_as<T: Object>(&self, name: &str) -> ObjectResult<Arc<T>> {
        let object = self.create(name)?;
        downcast_object::<T>(object).map_err(|object| ObjectError::TypeMismatch {
            expected: std::any::type_name::<T>().to_string(),
            actual: object.reflection_type().name().to_string(),
        })
    }
}

/// Constructs a new object of the named type from the global registry.
pub fn create_by_type_name(name: &str) -> ObjectResult<ObjectHandle> {
    TypeRegistry::global().create(name)
}
