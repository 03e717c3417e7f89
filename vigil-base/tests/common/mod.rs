//! Test classes shared by the integration tests.

#![allow(dead_code)]

use std::sync::{Arc, LazyLock, Weak};

use vigil_base::{
    BaseObject, FieldError, FieldId, FieldResult, Object, ObjectBase, ObjectCore, ObjectHandle,
    ObjectLock, ObjectMutex, Reflect, Type, TypeRegistry, Value, ValueKind, default_factory, unbox_field,
};

// ── Probe: one field per value kind ──────────────────────────────

#[derive(Debug, Default)]
pub struct ProbeState {
    pub flag: bool,
    pub count: i64,
    pub ratio: f64,
    pub label: String,
    pub items: Vec<Value>,
    pub target: Option<ObjectHandle>,
}

#[derive(Debug, Default)]
pub struct Probe {
    base: ObjectBase<ProbeState>,
}

impl Probe {
    pub const FLAG: FieldId = 1;
    pub const COUNT: FieldId = 2;
    pub const RATIO: FieldId = 3;
    pub const LABEL: FieldId = 4;
    pub const ITEMS: FieldId = 5;
    pub const TARGET: FieldId = 6;

    pub fn lock(&self) -> ObjectLock<'_, ProbeState> {
        self.base.lock()
    }

    pub fn mutex(&self) -> &ObjectMutex<ProbeState> {
        self.base.mutex()
    }

    /// Exposes the self-reference accessor to the tests.
    pub fn me(&self) -> vigil_base::SelfRef {
        self.base.self_ref()
    }

    pub fn weak_me(&self) -> Weak<Probe> {
        self.base.self_ref().downgrade()
    }
}

static PROBE_TYPE: LazyLock<Arc<Type>> = LazyLock::new(|| {
    Type::builder("Probe")
        .base(BaseObject::type_instance())
        .factory(default_factory::<Probe>)
        .field(Probe::FLAG, "flag", ValueKind::Boolean)
        .field(Probe::COUNT, "count", ValueKind::Integer)
        .field(Probe::RATIO, "ratio", ValueKind::Number)
        .field(Probe::LABEL, "label", ValueKind::String)
        .field(Probe::ITEMS, "items", ValueKind::Array)
        .field(Probe::TARGET, "target", ValueKind::Object)
        .build()
});

impl Reflect for Probe {
    fn type_instance() -> Arc<Type> {
        Arc::clone(&PROBE_TYPE)
    }
}

impl Object for Probe {
    fn core(&self) -> &ObjectCore {
        self.base.core()
    }

    fn reflection_type(&self) -> Arc<Type> {
        Self::type_instance()
    }

    fn get_field(&self, id: FieldId) -> FieldResult<Value> {
        let state = self.base.lock();
        Ok(match id {
            Self::FLAG => state.flag.into(),
            Self::COUNT => state.count.into(),
            Self::RATIO => state.ratio.into(),
            Self::LABEL => state.label.clone().into(),
            Self::ITEMS => Value::Array(state.items.clone()),
            Self::TARGET => state.target.clone().into(),
            _ => return Err(FieldError::not_found(&self.reflection_type(), id)),
        })
    }

    fn set_field(&self, id: FieldId, value: Value) -> FieldResult<()> {
        let ty = self.reflection_type();
        match id {
            Self::FLAG => {
                let flag = unbox_field(&ty, id, value)?;
                self.base.lock().flag = flag;
            }
            Self::COUNT => {
                let count = unbox_field(&ty, id, value)?;
                self.base.lock().count = count;
            }
            Self::RATIO => {
                let ratio = unbox_field(&ty, id, value)?;
                self.base.lock().ratio = ratio;
            }
            Self::LABEL => {
                let label = unbox_field(&ty, id, value)?;
                self.base.lock().label = label;
            }
            Self::ITEMS => {
                let items = unbox_field(&ty, id, value)?;
                self.base.lock().items = items;
            }
            Self::TARGET => {
                let target = unbox_field(&ty, id, value)?;
                self.base.lock().target = target;
            }
            _ => return Err(FieldError::not_found(&ty, id)),
        }
        Ok(())
    }
}

// ── Other: an unrelated class, never registered by default ───────

#[derive(Debug, Default)]
pub struct Other {
    base: ObjectBase,
}

static OTHER_TYPE: LazyLock<Arc<Type>> = LazyLock::new(|| {
    Type::builder("Other")
        .base(BaseObject::type_instance())
        .factory(default_factory::<Other>)
        .build()
});

impl Reflect for Other {
    fn type_instance() -> Arc<Type> {
        Arc::clone(&OTHER_TYPE)
    }
}

impl Object for Other {
    fn core(&self) -> &ObjectCore {
        self.base.core()
    }

    fn reflection_type(&self) -> Arc<Type> {
        Self::type_instance()
    }
}

/// A registry with `Object` and `Probe`.
pub fn probe_registry() -> TypeRegistry {
    let registry = TypeRegistry::with_builtins();
    registry.register(Probe::type_instance()).unwrap();
    registry
}
