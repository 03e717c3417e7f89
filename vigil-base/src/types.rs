//! Run-time type descriptors.

use std::sync::Arc;

use tracing::debug;
use vigil_types::FieldId;

use crate::error::{ObjectError, ObjectResult};
use crate::field::FieldInfo;
use crate::object::Object;
use crate::ownership::{ObjectHandle, make_object};
use crate::value::ValueKind;

/// Constructs a new, default-initialized instance of one class.
pub type ObjectFactory = fn() -> ObjectResult<ObjectHandle>;

/// Factory for any class with a `Default` implementation.
pub fn default_factory<T: Object + Default>() -> ObjectResult<ObjectHandle> {
    let object: ObjectHandle = make_object(T::default());
    Ok(object)
}

/// Descriptor of one concrete class.
///
/// Created once per class, usually in a `LazyLock` static, and shared by
/// every instance of the class.
#[derive(Debug)]
pub struct Type {
    name: String,
    base: Option<Arc<Type>>,
    factory: Option<ObjectFactory>,
    fields: Vec<FieldInfo>,
}

impl Type {
    /// Starts building a descriptor.
    pub fn builder(name: impl Into<String>) -> TypeBuilder {
        TypeBuilder {
            name: name.into(),
            base: None,
            factory: None,
            fields: Vec::new(),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the base class descriptor, if any.
    #[must_use]
    pub fn base(&self) -> Option<&Arc<Type>> {
        self.base.as_ref()
    }

    /// Returns true if the class has no factory.
    #[must_use]
    pub const fn is_abstract(&self) -> bool {
        self.factory.is_none()
    }

    /// Returns the class's fields, ordered by id.
    #[must_use]
    pub fn fields(&self) -> &[FieldInfo] {
        &self.fields
    }

    #[must_use]
    pub fn field(&self, id: FieldId) -> Option<&FieldInfo> {
        self.fields.iter().find(|f| f.id == id)
    }

    #[must_use]
    pub fn field_by_name(&self, name: &str) -> Option<&FieldInfo> {
        self.fields.iter().find(|f| f.name == name)
    }

    #[must_use]
    pub fn field_id(&self, name: &str) -> Option<FieldId> {
        self.field_by_name(name).map(|f| f.id)
    }

    /// Returns true if `other` is this class or derives from it.
    ///
    /// Classes are compared by descriptor identity, not by name.
    #[must_use]
    pub fn is_assignable_from(&self, other: &Type) -> bool {
        let mut current = Some(other);
        while let Some(ty) = current {
            if std::ptr::eq(ty, self) {
                return true;
            }
            current = ty.base.as_deref();
        }
        false
    }

    /// Constructs a new instance through the factory.
    ///
    /// The factory's output must report this very descriptor; a mismatching
    /// object is dropped and an error returned.
    pub fn instantiate(&self) -> ObjectResult<ObjectHandle> {
        let factory = self
            .factory
            .ok_or_else(|| ObjectError::NotInstantiable(self.name.clone()))?;
        let object = factory()?;

        let actual = object.reflection_type();
        if !std::ptr::eq(actual.as_ref(), self) {
            return Err(ObjectError::TypeMismatch {
                expected: self.name.clone(),
                actual: actual.name().to_string(),
            });
        }

        debug!(type_name = %self.name, object_id = %object.object_id(), "Object constructed");
        Ok(object)
    }
}

/// Builder for [`Type`].
#[derive(Debug)]
pub struct TypeBuilder {
    name: String,
    base: Option<Arc<Type>>,
    factory: Option<ObjectFactory>,
    fields: Vec<FieldInfo>,
}

impl TypeBuilder {
    #[must_use]
    pub fn base(mut self, base: Arc<Type>) -> Self {
        self.base = Some(base);
        self
    }

    #[must_use]
    pub fn factory(mut self, factory: ObjectFactory) -> Self {
        self.factory = Some(factory);
        self
    }

    /// Declares a field.
    ///
    /// # Panics
    ///
    /// Panics if the id or name is already declared.
    #[must_use]
    pub fn field(mut self, id: FieldId, name: impl Into<String>, kind: ValueKind) -> Self {
        let info = FieldInfo::new(id, name, kind);
        assert!(
            !self.fields.iter().any(|f| f.id == info.id || f.name == info.name),
            "{}: field {} ({}) declared twice",
            self.name,
            info.id,
            info.name
        );
        self.fields.push(info);
        self
    }

    pub fn build(mut self) -> Arc<Type> {
        self.fields.sort_by_key(|f| f.id);
        Arc::new(Type {
            name: self.name,
            base: self.base,
            factory: self.factory,
            fields: self.fields,
        })
    }
}
