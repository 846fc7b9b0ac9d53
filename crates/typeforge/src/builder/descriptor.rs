//! Type descriptors: the mutable, in-progress form of a synthesized type

use std::sync::Arc;

use tracing::debug;

use crate::class::{ClassRef, ConstructorInfo, MetadataRecord};
use crate::error::{TypeError, TypeResult};
use crate::registry::ClassRegistry;
use crate::types::TypeRef;

use super::constructors::{forward_constructors, ForwardedConstructor};

/// Handle to a property defined on a [`TypeDescriptor`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PropertyId(pub(crate) usize);

/// One synthesized property
#[derive(Debug, Clone)]
pub struct PropertyDescriptor {
    /// Property name, unique within the descriptor
    pub name: String,
    /// Declared value type
    pub ty: TypeRef,
    /// Backing slot name, derived from `name`
    pub backing_slot: String,
    /// Property-level metadata, in attachment order
    pub attributes: Vec<MetadataRecord>,
}

/// Base type captured when the descriptor was opened
#[derive(Debug, Clone)]
pub struct BaseTypeBinding {
    /// Base class
    pub base: ClassRef,
    /// The base class's constructor signatures at open time
    pub constructors: Vec<ConstructorInfo>,
}

/// Where a metadata record is attached
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttachTarget {
    /// The type itself
    Type,
    /// One previously defined property
    Property(PropertyId),
}

/// In-progress type
#[derive(Debug)]
pub struct TypeDescriptor {
    pub(crate) registry: Arc<ClassRegistry>,
    /// Declared type name
    pub name: String,
    /// Owning container name
    pub container: String,
    /// Base type, if the type derives from one
    pub base: Option<BaseTypeBinding>,
    /// Constructors forwarded from the base type
    pub constructors: Vec<ForwardedConstructor>,
    /// Properties, in definition order
    pub properties: Vec<PropertyDescriptor>,
    /// Type-level metadata, in attachment order
    pub attributes: Vec<MetadataRecord>,
    pub(crate) frozen: bool,
}

/// Check that `name` is a non-empty identifier: a letter or underscore
/// followed by letters, digits or underscores
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || c == '_')
}

/// Open a new type-construction context.
///
/// When `base` is given the new type derives from it and every constructor
/// the base declares is forwarded.
pub fn open(
    registry: &Arc<ClassRegistry>,
    name: &str,
    container: Option<&str>,
    base: Option<&ClassRef>,
) -> TypeResult<TypeDescriptor> {
    if !is_identifier(name) {
        return Err(TypeError::InvalidIdentifier {
            name: name.to_string(),
        });
    }

    let container = registry.container_name(container);
    let base = base.map(|class| BaseTypeBinding {
        base: Arc::clone(class),
        constructors: class.constructors.clone(),
    });
    let constructors = base.as_ref().map(forward_constructors).unwrap_or_default();

    debug!(
        type_name = %name,
        container = %container,
        base = ?base.as_ref().map(|b| b.base.name.as_str()),
        forwarded = constructors.len(),
        "Opened type descriptor"
    );

    Ok(TypeDescriptor {
        registry: Arc::clone(registry),
        name: name.to_string(),
        container,
        base,
        constructors,
        properties: Vec::new(),
        attributes: Vec::new(),
        frozen: false,
    })
}

impl TypeDescriptor {
    /// Whether the descriptor has been realized
    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    /// Registry the type will be realized into
    pub fn registry(&self) -> &Arc<ClassRegistry> {
        &self.registry
    }

    /// Base class, if any
    pub fn base_class(&self) -> Option<&ClassRef> {
        self.base.as_ref().map(|b| &b.base)
    }

    /// Property by handle
    pub fn property(&self, id: PropertyId) -> Option<&PropertyDescriptor> {
        self.properties.get(id.0)
    }

    /// Property handle by name
    pub fn property_id(&self, name: &str) -> Option<PropertyId> {
        self.properties
            .iter()
            .position(|p| p.name == name)
            .map(PropertyId)
    }

    /// Fail with `Frozen` once the descriptor has been realized
    pub(crate) fn ensure_open(&self) -> TypeResult<()> {
        if self.frozen {
            return Err(TypeError::Frozen {
                type_name: self.name.clone(),
            });
        }
        Ok(())
    }

    /// Drop the most recently defined property
    pub(crate) fn remove_property(&mut self, id: PropertyId) {
        if id.0 + 1 == self.properties.len() {
            self.properties.pop();
        }
    }
}
