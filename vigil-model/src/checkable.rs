use std::fmt;
use std::sync::{Arc, LazyLock};

use vigil_base::{BaseObject, Object, ObjectHandle, Reflect, Type, downcast_object};

use crate::host::Host;
use crate::service::Service;

static CHECKABLE_TYPE: LazyLock<Arc<Type>> =
    LazyLock::new(|| Type::builder("Checkable").base(BaseObject::type_instance()).build());

/// Everything that is actively checked: hosts and services.
///
/// The matching descriptor is abstract; it is the base of the `Host` and
/// `Service` descriptors.
pub trait Checkable: Object {
    /// Name shown in check results. Services are qualified by their host as
    /// `host!service`.
    fn display_name(&self) -> String;

    /// Failed checks needed before a problem counts as confirmed.
    fn max_check_attempts(&self) -> i64;

    /// Returns an owning handle to this object as a checkable.
    ///
    /// # Panics
    ///
    /// Panics if the object was not created through
    /// [`make_object`](vigil_base::make_object).
    fn to_checkable(&self) -> Arc<dyn Checkable>;
}

impl fmt::Debug for dyn Checkable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.reflection_type().name(), self.object_id())
    }
}

/// Returns the abstract `Checkable` descriptor.
pub fn checkable_type() -> Arc<Type> {
    Arc::clone(&CHECKABLE_TYPE)
}

/// Returns true if `ty` is a checkable class.
#[must_use]
pub fn is_checkable(ty: &Type) -> bool {
    CHECKABLE_TYPE.is_assignable_from(ty)
}

/// Checked conversion of a handle to a checkable.
///
/// Returns the original handle untouched when the object is not checkable.
pub fn downcast_checkable(object: ObjectHandle) -> Result<Arc<dyn Checkable>, ObjectHandle> {
    let object = match downcast_object::<Host>(object) {
        Ok(host) => {
            let host: Arc<dyn Checkable> = host;
            return Ok(host);
        }
        Err(object) => object,
    };
    downcast_object::<Service>(object).map(|service| {
        let service: Arc<dyn Checkable> = service;
        service
    })
}
