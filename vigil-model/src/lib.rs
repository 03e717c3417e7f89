//! Monitoring domain classes for Vigil.
//!
//! Hosts and services are ordinary runtime objects: they embed an
//! [`ObjectBase`](vigil_base::ObjectBase), expose their configuration through
//! the reflective field protocol and are constructed by name once
//! [`register_types`] has run.

mod checkable;
mod host;
mod service;

pub use checkable::{Checkable, checkable_type, downcast_checkable, is_checkable};
pub use host::{Host, HostState};
pub use service::{Service, ServiceState};

use vigil_base::{ObjectResult, Reflect, TypeRegistry};

/// Registers every class of this crate with `registry`.
///
/// Idempotent: calling it again with the same registry is a no-op.
pub fn register_types(registry: &TypeRegistry) -> ObjectResult<()> {
    registry.register(checkable_type())?;
    registry.register(Host::type_instance())?;
    registry.register(Service::type_instance())?;
    Ok(())
}
