use std::sync::{Arc, LazyLock, Weak};

use vigil_base::{
    FieldError, FieldId, FieldResult, Object, ObjectBase, ObjectCore, ObjectLock, Reflect, Type,
    Value, ValueKind, default_factory, unbox_field, weak_ptr_eq,
};

use crate::checkable::{Checkable, checkable_type};
use crate::service::Service;

/// Configuration and runtime state of a [`Host`].
#[derive(Debug)]
pub struct HostState {
    pub name: String,
    pub address: String,
    pub retries: i64,
    pub enabled: bool,
    /// Seconds between checks.
    pub check_interval: f64,
    pub groups: Vec<String>,
    services: Vec<Weak<Service>>,
}

impl Default for HostState {
    fn default() -> Self {
        Self {
            name: String::new(),
            address: String::new(),
            retries: 3,
            enabled: true,
            check_interval: 60.0,
            groups: Vec::new(),
            services: Vec::new(),
        }
    }
}

/// A monitored host.
///
/// Services attached to the host are tracked through weak references: the
/// host never keeps a service alive.
#[derive(Debug, Default)]
pub struct Host {
    base: ObjectBase<HostState>,
}

static HOST_TYPE: LazyLock<Arc<Type>> = LazyLock::new(|| {
    Type::builder("Host")
        .base(checkable_type())
        .factory(default_factory::<Host>)
        .field(Host::RETRIES, "retries", ValueKind::Integer)
        .field(Host::NAME, "name", ValueKind::String)
        .field(Host::ADDRESS, "address", ValueKind::String)
        .field(Host::ENABLED, "enabled", ValueKind::Boolean)
        .field(Host::CHECK_INTERVAL, "check_interval", ValueKind::Number)
        .field(Host::GROUPS, "groups", ValueKind::Array)
        .build()
});

impl Host {
    pub const RETRIES: FieldId = 1;
    pub const NAME: FieldId = 2;
    pub const ADDRESS: FieldId = 3;
    pub const ENABLED: FieldId = 4;
    pub const CHECK_INTERVAL: FieldId = 5;
    pub const GROUPS: FieldId = 6;

    /// Locks the host.
    pub fn lock(&self) -> ObjectLock<'_, HostState> {
        self.base.lock()
    }

    /// Returns the live services attached to this host.
    ///
    /// Dropped services are pruned.
    pub fn services(&self) -> Vec<Arc<Service>> {
        let mut state = self.base.lock();
        state.services.retain(|s| s.strong_count() > 0);
        state.services.iter().filter_map(Weak::upgrade).collect()
    }

    pub(crate) fn add_service(&self, service: Weak<Service>) {
        let mut state = self.base.lock();
        state.services.retain(|s| s.strong_count() > 0);
        if !state.services.iter().any(|s| Weak::ptr_eq(s, &service)) {
            state.services.push(service);
        }
    }

    pub(crate) fn remove_service(&self, service: &Service) {
        self.base
            .lock()
            .services
            .retain(|s| s.strong_count() > 0 && !weak_ptr_eq(s, service));
    }
}

impl Checkable for Host {
    fn display_name(&self) -> String {
        self.base.lock().name.clone()
    }

    fn max_check_attempts(&self) -> i64 {
        self.base.lock().retries
    }

    fn to_checkable(&self) -> Arc<dyn Checkable> {
        self.base.self_ref().cast::<Host>()
    }
}

impl Reflect for Host {
    fn type_instance() -> Arc<Type> {
        Arc::clone(&HOST_TYPE)
    }
}

impl Object for Host {
    fn core(&self) -> &ObjectCore {
        self.base.core()
    }

    fn reflection_type(&self) -> Arc<Type> {
        Self::type_instance()
    }

    fn get_field(&self, id: FieldId) -> FieldResult<Value> {
        let state = self.base.lock();
        Ok(match id {
            Self::RETRIES => state.retries.into(),
            Self::NAME => state.name.clone().into(),
            Self::ADDRESS => state.address.clone().into(),
            Self::ENABLED => state.enabled.into(),
            Self::CHECK_INTERVAL => state.check_interval.into(),
            Self::GROUPS => state.groups.clone().into(),
            _ => return Err(FieldError::not_found(&self.reflection_type(), id)),
        })
    }

    fn set_field(&self, id: FieldId, value: Value) -> FieldResult<()> {
        let ty = self.reflection_type();
        match id {
            Self::RETRIES => {
                let retries: i64 = unbox_field(&ty, id, value)?;
                if retries < 0 {
                    return Err(FieldError::invalid(&ty, id, "must not be negative"));
                }
                self.base.lock().retries = retries;
            }
            Self::NAME => {
                let name = unbox_field(&ty, id, value)?;
                self.base.lock().name = name;
            }
            Self::ADDRESS => {
                let address = unbox_field(&ty, id, value)?;
                self.base.lock().address = address;
            }
            Self::ENABLED => {
                let enabled = unbox_field(&ty, id, value)?;
                self.base.lock().enabled = enabled;
            }
            Self::CHECK_INTERVAL => {
                let interval: f64 = unbox_field(&ty, id, value)?;
                if !interval.is_finite() || interval <= 0.0 {
                    return Err(FieldError::invalid(&ty, id, "must be a positive number of seconds"));
                }
                self.base.lock().check_interval = interval;
            }
            Self::GROUPS => {
                let groups = unbox_field(&ty, id, value)?;
                self.base.lock().groups = groups;
            }
            _ => return Err(FieldError::not_found(&ty, id)),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vigil_base::make_object;

    #[test]
    fn defaults() {
        let host = make_object(Host::default());
        let state = host.lock();
        assert_eq!(state.retries, 3);
        assert!(state.enabled);
        assert_eq!(state.check_interval, 60.0);
        assert!(state.services.is_empty());
    }

    #[test]
    fn dropped_services_do_not_accumulate() {
        let host = make_object(Host::default());
        for _ in 0..1_000 {
            let service = make_object(Service::default());
            service.set_host(Some(Arc::clone(&host)));
        }
        assert!(host.lock().services.len() <= 1);
        assert!(host.services().is_empty());
    }

    #[test]
    fn descriptor_fields_match_accessors() {
        let host = make_object(Host::default());
        for field in Host::type_instance().fields() {
            let value = host.get_field(field.id).unwrap();
            assert_eq!(value.kind(), field.kind, "{}", field.name);
        }
    }
}
