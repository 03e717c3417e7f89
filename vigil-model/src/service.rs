use std::sync::{Arc, LazyLock};

use tracing::debug;
use vigil_base::{
    FieldError, FieldId, FieldResult, Object, ObjectBase, ObjectCore, ObjectLock, Reflect, Type,
    Value, ValueKind, default_factory, unbox_field,
};

use crate::checkable::{Checkable, checkable_type};
use crate::host::Host;

/// Configuration of a [`Service`].
#[derive(Debug)]
pub struct ServiceState {
    pub name: String,
    pub max_check_attempts: i64,
    pub notes: String,
    host: Option<Arc<Host>>,
}

impl Default for ServiceState {
    fn default() -> Self {
        Self {
            name: String::new(),
            max_check_attempts: 3,
            notes: String::new(),
            host: None,
        }
    }
}

impl ServiceState {
    #[must_use]
    pub fn host(&self) -> Option<&Arc<Host>> {
        self.host.as_ref()
    }
}

/// A check bound to one host.
///
/// A service owns its host; the host only sees the service through a weak
/// reference. Locks are taken service first, then host.
#[derive(Debug, Default)]
pub struct Service {
    base: ObjectBase<ServiceState>,
}

static SERVICE_TYPE: LazyLock<Arc<Type>> = LazyLock::new(|| {
    Type::builder("Service")
        .base(checkable_type())
        .factory(default_factory::<Service>)
        .field(Service::NAME, "name", ValueKind::String)
        .field(Service::HOST, "host", ValueKind::Object)
        .field(Service::MAX_CHECK_ATTEMPTS, "max_check_attempts", ValueKind::Integer)
        .field(Service::NOTES, "notes", ValueKind::String)
        .build()
});

impl Service {
    pub const NAME: FieldId = 1;
    pub const HOST: FieldId = 2;
    pub const MAX_CHECK_ATTEMPTS: FieldId = 3;
    pub const NOTES: FieldId = 4;

    /// Locks the service.
    pub fn lock(&self) -> ObjectLock<'_, ServiceState> {
        self.base.lock()
    }

    /// Returns the host this service runs on.
    pub fn host(&self) -> Option<Arc<Host>> {
        self.base.lock().host.clone()
    }

    /// Moves the service to `host`, or detaches it with `None`.
    ///
    /// The previous host forgets the service; the new one records a weak
    /// reference to it.
    ///
    /// # Panics
    ///
    /// Panics if the service was not created through
    /// [`make_object`](vigil_base::make_object).
    pub fn set_host(&self, host: Option<Arc<Host>>) {
        let mut state = self.base.lock();
        if let Some(previous) = state.host.take() {
            previous.remove_service(self);
        }
        if let Some(host) = &host {
            host.add_service(self.base.self_ref().downgrade());
            debug!(service = %self.base.id(), host = %host.object_id(), "Service attached to host");
        }
        state.host = host;
    }
}

impl Checkable for Service {
    fn display_name(&self) -> String {
        let (name, host) = {
            let state = self.base.lock();
            (state.name.clone(), state.host.clone())
        };
        match host {
            Some(host) => format!("{}!{name}", host.display_name()),
            None => name,
        }
    }

    fn max_check_attempts(&self) -> i64 {
        self.base.lock().max_check_attempts
    }

    fn to_checkable(&self) -> Arc<dyn Checkable> {
        self.base.self_ref().cast::<Service>()
    }
}

impl Reflect for Service {
    fn type_instance() -> Arc<Type> {
        Arc::clone(&SERVICE_TYPE)
    }
}

impl Object for Service {
    fn core(&self) -> &ObjectCore {
        self.base.core()
    }

    fn reflection_type(&self) -> Arc<Type> {
        Self::type_instance()
    }

    fn get_field(&self, id: FieldId) -> FieldResult<Value> {
        let state = self.base.lock();
        Ok(match id {
            Self::NAME => state.name.clone().into(),
            Self::HOST => state.host.clone().into(),
            Self::MAX_CHECK_ATTEMPTS => state.max_check_attempts.into(),
            Self::NOTES => state.notes.clone().into(),
            _ => return Err(FieldError::not_found(&self.reflection_type(), id)),
        })
    }

    fn set_field(&self, id: FieldId, value: Value) -> FieldResult<()> {
        let ty = self.reflection_type();
        match id {
            Self::NAME => {
                let name = unbox_field(&ty, id, value)?;
                self.base.lock().name = name;
            }
            Self::HOST => {
                let host: Option<Arc<Host>> = unbox_field(&ty, id, value)?;
                self.set_host(host);
            }
            Self::MAX_CHECK_ATTEMPTS => {
                let attempts: i64 = unbox_field(&ty, id, value)?;
                if attempts < 1 {
                    return Err(FieldError::invalid(&ty, id, "must be at least 1"));
                }
                self.base.lock().max_check_attempts = attempts;
            }
            Self::NOTES => {
                let notes = unbox_field(&ty, id, value)?;
                self.base.lock().notes = notes;
            }
            _ => return Err(FieldError::not_found(&ty, id)),
        }
        Ok(())
    }
}
