//! The [`Object`] trait and the header every class embeds.

use std::any::Any;
use std::fmt;
use std::sync::{Arc, LazyLock};

use vigil_types::{FieldId, ObjectId};

use crate::field::{FieldError, FieldResult};
use crate::lock::{self, ObjectLock, ObjectMutex};
use crate::ownership::{ObjectCore, SelfRef};
use crate::types::{Type, default_factory};
use crate::value::Value;

/// Conversion to `Any`, implemented for every sized `Send + Sync` type.
///
/// Lets a handle to `dyn Object` be downcast to its concrete class.
pub trait AsAny: Any + Send + Sync {
    /// Converts an owning handle into an `Any` handle.
    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync>;
}

impl<T: Any + Send + Sync> AsAny for T {
    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }
}

/// Base trait of every domain entity.
///
/// A class opting into the runtime:
/// 1. embeds an [`ObjectBase`] and returns its core from [`core`](Object::core),
/// 2. backs a static descriptor slot and returns it from
///    [`reflection_type`](Object::reflection_type) and [`Reflect::type_instance`],
/// 3. gives the descriptor a factory (usually [`default_factory`]),
/// 4. registers the descriptor with a [`TypeRegistry`](crate::TypeRegistry)
///    before the class is used by name.
///
/// Instances only live behind [`make_object`](crate::make_object) handles.
pub trait Object: AsAny {
    /// Returns the object's identity and self-reference slot.
    fn core(&self) -> &ObjectCore;

    /// Returns the descriptor of the object's concrete class.
    fn reflection_type(&self) -> Arc<Type>;

    /// Returns the object's id.
    fn object_id(&self) -> ObjectId {
        self.core().id()
    }

    /// Returns true if the calling thread holds this object's lock.
    ///
    /// Only tracked in debug builds; always false in release builds.
    fn owns_lock(&self) -> bool {
        lock::owns_lock(self.object_id())
    }

    /// Reads the field `id`, boxed.
    ///
    /// Acquires the object's lock; do not call while holding it.
    fn get_field(&self, id: FieldId) -> FieldResult<Value> {
        Err(FieldError::not_found(&self.reflection_type(), id))
    }

    /// Writes the field `id` from a boxed value.
    ///
    /// On error the object is left unchanged. Acquires the object's lock;
    /// do not call while holding it.
    fn set_field(&self, id: FieldId, value: Value) -> FieldResult<()> {
        let _ = value;
        Err(FieldError::not_found(&self.reflection_type(), id))
    }
}

/// Static access to a class's descriptor.
pub trait Reflect: Object + Sized {
    /// Returns the class's descriptor, the same one
    /// [`reflection_type`](Object::reflection_type) returns for its instances.
    fn type_instance() -> Arc<Type>;
}

impl fmt::Debug for dyn Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.reflection_type().name(), self.object_id())
    }
}

/// Header embedded in every class: identity, self reference and the lock
/// guarding the class's mutable state `S`.
#[derive(Debug)]
pub struct ObjectBase<S = ()> {
    core: ObjectCore,
    mutex: ObjectMutex<S>,
}

impl<S> ObjectBase<S> {
    /// Creates a header owning `state`.
    pub fn new(state: S) -> Self {
        let core = ObjectCore::new();
        let mutex = ObjectMutex::new(core.id(), state);
        Self { core, mutex }
    }

    /// Returns the core, for [`Object::core`].
    #[must_use]
    pub const fn core(&self) -> &ObjectCore {
        &self.core
    }

    /// Returns the object's id.
    #[must_use]
    pub const fn id(&self) -> ObjectId {
        self.core.id()
    }

    /// Returns the object's lock.
    #[must_use]
    pub const fn mutex(&self) -> &ObjectMutex<S> {
        &self.mutex
    }

    /// Locks the object.
    pub fn lock(&self) -> ObjectLock<'_, S> {
        self.mutex.lock()
    }

    /// Returns true if the calling thread holds the object's lock.
    #[must_use]
    pub fn owns_lock(&self) -> bool {
        self.mutex.owns_lock()
    }

    /// Returns a holder for an owning handle to the object.
    ///
    /// For the class's own implementation. Keep the `ObjectBase` field
    /// private; this is the only path to the self reference.
    ///
    /// # Panics
    ///
    /// Panics if the object is not owned by a shared handle.
    pub fn self_ref(&self) -> SelfRef {
        self.core.self_ref()
    }
}

impl<S: Default> Default for ObjectBase<S> {
    fn default() -> Self {
        Self::new(S::default())
    }
}

static OBJECT_TYPE: LazyLock<Arc<Type>> =
    LazyLock::new(|| Type::builder("Object").factory(default_factory::<BaseObject>).build());

/// The root class: an object with a lock and no fields.
#[derive(Debug, Default)]
pub struct BaseObject {
    base: ObjectBase,
}

impl BaseObject {
    /// Locks the object.
    pub fn lock(&self) -> ObjectLock<'_, ()> {
        self.base.lock()
    }
}

impl Reflect for BaseObject {
    fn type_instance() -> Arc<Type> {
        Arc::clone(&OBJECT_TYPE)
    }
}

impl Object for BaseObject {
    fn core(&self) -> &ObjectCore {
        self.base.core()
    }

    fn reflection_type(&self) -> Arc<Type> {
        Self::type_instance()
    }
}
