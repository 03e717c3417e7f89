//! Registry bootstrap and the operations behind the `vigil` binary.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use tracing::info;
use vigil_base::{FieldInfo, ObjectHandle, Type, TypeRegistry, from_json, to_json};

/// Description of one registered type, as printed by `vigil types`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeSummary {
    pub name: String,
    pub base: Option<String>,
    #[serde(rename = "abstract")]
    pub is_abstract: bool,
    pub fields: Vec<FieldInfo>,
}

impl From<&Type> for TypeSummary {
    fn from(ty: &Type) -> Self {
        Self {
            name: ty.name().to_string(),
            base: ty.base().map(|b| b.name().to_string()),
            is_abstract: ty.is_abstract(),
            fields: ty.fields().to_vec(),
        }
    }
}

/// Builds a registry holding the root type and every model class.
pub fn bootstrap() -> Result<TypeRegistry> {
    let registry = TypeRegistry::with_builtins();
    vigil_model::register_types(&registry).context("Failed to register model types")?;
    info!(types = registry.len(), "Type registry ready");
    Ok(registry)
}

/// Summarizes every registered type, sorted by name.
pub fn describe_types(registry: &TypeRegistry) -> Vec<TypeSummary> {
    registry.types().iter().map(|ty| TypeSummary::from(ty.as_ref())).collect()
}

/// Instantiates a default object of `type_name` and returns its JSON form.
pub fn create_object(registry: &TypeRegistry, type_name: &str) -> Result<serde_json::Value> {
    let object = registry
        .create(type_name)
        .with_context(|| format!("Failed to create {type_name}"))?;
    Ok(to_json(object.as_ref())?)
}

/// Reads a JSON file holding one declaration or an array of them and
/// instantiates every object.
pub fn load_declarations(registry: &TypeRegistry, path: &Path) -> Result<Vec<ObjectHandle>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let document: serde_json::Value = serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse {}", path.display()))?;

    let declarations = match document {
        serde_json::Value::Array(items) => items,
        decl @ serde_json::Value::Object(_) => vec![decl],
        _ => bail!("{}: expected an object declaration or an array of them", path.display()),
    };

    let objects = declarations
        .iter()
        .enumerate()
        .map(|(index, decl)| {
            from_json(registry, decl)
                .with_context(|| format!("{}: declaration #{index}", path.display()))
        })
        .collect::<Result<Vec<_>>>()?;

    info!(path = %path.display(), objects = objects.len(), "Declarations loaded");
    Ok(objects)
}

/// Renders loaded objects back to JSON.
pub fn render_objects(objects: &[ObjectHandle]) -> Result<serde_json::Value> {
    let rendered = objects
        .iter()
        .map(|object| to_json(object.as_ref()))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(serde_json::Value::Array(rendered))
}
