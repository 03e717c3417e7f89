//! Shared ownership, weak references and the self-reference accessor.

use std::any::type_name;
use std::fmt;
use std::sync::{Arc, OnceLock, Weak};

use vigil_types::ObjectId;

use crate::object::Object;
use crate::value::Value;

/// Owning handle to any object.
pub type ObjectHandle = Arc<dyn Object>;

/// Non-owning handle to any object.
pub type WeakObjectHandle = Weak<dyn Object>;

/// Places an object under shared ownership.
///
/// This is the only supported way to create a handle: it attaches the
/// object's self-reference slot so that
/// [`ObjectBase::self_ref`](crate::ObjectBase::self_ref) works.
pub fn make_object<T: Object>(object: T) -> Arc<T> {
    let object = Arc::new(object);
    let this: Weak<T> = Arc::downgrade(&object);
    object.core().attach(this);
    object
}

/// Checked downcast of a handle to a concrete class.
///
/// Returns the original handle untouched when the object is not a `T`.
pub fn downcast_object<T: Object>(object: ObjectHandle) -> Result<Arc<T>, ObjectHandle> {
    object.clone().into_any().downcast::<T>().map_err(|_| object)
}

/// Returns true if `weak` still refers to `object`.
///
/// A dead weak handle never compares equal, even if the allocation address
/// has been reused.
pub fn weak_ptr_eq<T: ?Sized>(weak: &Weak<T>, object: &T) -> bool {
    weak.strong_count() > 0 && std::ptr::addr_eq(weak.as_ptr(), object as *const T)
}

/// Identity and self-reference slot of one object instance.
///
/// Not `Clone`: objects have reference semantics, only their handles are copied.
///
/// The self reference is only reachable through
/// [`ObjectBase::self_ref`](crate::ObjectBase::self_ref), which classes keep
/// behind a private field. Holders of a handle cannot mint one:
///
/// ```compile_fail
/// use vigil_base::{BaseObject, Object, make_object};
///
/// let object = make_object(BaseObject::default());
/// let _ = object.core().self_ref();
/// ```
pub struct ObjectCore {
    id: ObjectId,
    this: OnceLock<WeakObjectHandle>,
}

impl ObjectCore {
    /// Creates a core with a fresh id and no self reference yet.
    #[must_use]
    pub fn new() -> Self {
        Self {
            id: ObjectId::new(),
            this: OnceLock::new(),
        }
    }

    /// Returns the object's id.
    #[must_use]
    pub const fn id(&self) -> ObjectId {
        self.id
    }

    /// Returns a holder for an owning handle to this object.
    ///
    /// # Panics
    ///
    /// Panics if the object was not created through [`make_object`], or is
    /// being destroyed.
    pub(crate) fn self_ref(&self) -> SelfRef {
        match self.this.get().and_then(Weak::upgrade) {
            Some(object) => SelfRef::new(object),
            None => panic!("object {} is not owned by a shared handle", self.id),
        }
    }

    fn attach(&self, this: WeakObjectHandle) {
        if self.this.set(this).is_err() {
            panic!("object {} is already owned by a shared handle", self.id);
        }
    }
}

impl Default for ObjectCore {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ObjectCore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectCore").field("id", &self.id).finish()
    }
}

/// Short-lived holder returned by [`ObjectBase::self_ref`](crate::ObjectBase::self_ref).
///
/// Converts into a strong or weak handle of the requested class. The cast is
/// always checked; asking for a class the object is not is a programming
/// error and panics.
pub struct SelfRef {
    object: ObjectHandle,
}

impl SelfRef {
    /// Wraps an existing handle.
    #[must_use]
    pub fn new(object: ObjectHandle) -> Self {
        Self { object }
    }

    /// Returns the untyped handle.
    #[must_use]
    pub fn handle(self) -> ObjectHandle {
        self.object
    }

    /// Converts to a handle of class `T`.
    ///
    /// # Panics
    ///
    /// Panics if the object is not a `T`.
    #[must_use]
    pub fn cast<T: Object>(self) -> Arc<T> {
        match downcast_object::<T>(self.object) {
            Ok(object) => object,
            Err(object) => panic!(
                "invalid self reference cast: {} {} is not a {}",
                object.reflection_type().name(),
                object.object_id(),
                type_name::<T>()
            ),
        }
    }

    /// Converts to a handle of class `T`, or `None` if the object is not a `T`.
    #[must_use]
    pub fn try_cast<T: Object>(self) -> Option<Arc<T>> {
        downcast_object::<T>(self.object).ok()
    }

    /// Converts to a weak handle of class `T`.
    ///
    /// # Panics
    ///
    /// Panics if the object is not a `T`.
    #[must_use]
    pub fn downgrade<T: Object>(self) -> Weak<T> {
        Arc::downgrade(&self.cast::<T>())
    }
}

impl fmt::Debug for SelfRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SelfRef").field(&self.object).finish()
    }
}

impl From<SelfRef> for ObjectHandle {
    fn from(holder: SelfRef) -> Self {
        holder.object
    }
}

impl<T: Object> From<SelfRef> for Arc<T> {
    fn from(holder: SelfRef) -> Self {
        holder.cast()
    }
}

impl<T: Object> From<SelfRef> for Weak<T> {
    fn from(holder: SelfRef) -> Self {
        holder.downgrade()
    }
}

impl From<SelfRef> for Value {
    fn from(holder: SelfRef) -> Self {
        Value::Object(holder.object)
    }
}
