//! Object runtime for Vigil.
//!
//! Every domain entity of the engine (hosts, services, checks, config items,
//! cluster messages) is built on the pieces in this crate:
//! - [`Object`]: the base trait, with polymorphic [`Type`] lookup and the
//!   reflective [`get_field`](Object::get_field)/[`set_field`](Object::set_field) protocol
//! - [`ObjectBase`]: the header every class embeds: identity, self reference
//!   and the single per-instance lock
//! - [`ObjectLock`]: the scoped guard, instrumented in debug builds
//! - [`TypeRegistry`]: name to [`Type`] mapping used to construct objects by name
//! - [`Value`]: the dynamic container fields are boxed into
//!
//! Objects are always shared through [`ObjectHandle`]s (`Arc<dyn Object>`);
//! [`make_object`] is the only supported way to bring one under shared ownership.
//!
//! # Locking
//!
//! The runtime guarantees mutual exclusion per object. It does not impose a
//! global lock order: code holding one object's lock while acquiring another's
//! must agree on an order with every other such caller, or use [`lock_pair`],
//! which orders by [`ObjectId`].

mod error;
mod field;
mod lock;
mod object;
mod ownership;
mod registry;
mod serialize;
mod types;
mod value;

pub use error::{ObjectError, ObjectResult};
pub use field::{FieldError, FieldInfo, FieldResult, unbox_field};
pub use lock::{ObjectLock, ObjectMutex, lock_pair, locks_held_by_current_thread, owns_lock};
pub use object::{AsAny, BaseObject, Object, ObjectBase, Reflect};
pub use ownership::{
    ObjectCore, ObjectHandle, SelfRef, WeakObjectHandle, downcast_object, make_object, weak_ptr_eq,
};
pub use registry::{TypeRegistry, create_by_type_name};
pub use serialize::{from_json, to_json, value_to_json};
pub use types::{ObjectFactory, Type, TypeBuilder, default_factory};
pub use value::{FromValue, Value, ValueError, ValueKind};
pub use vigil_types::{FieldId, ObjectId};
