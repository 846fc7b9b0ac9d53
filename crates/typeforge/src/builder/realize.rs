//! Freezing a descriptor into a realized class

use std::sync::Arc;

use tracing::debug;

use crate::class::{ClassKind, ClassParts, ClassRef, Visibility};
use crate::error::TypeResult;

use super::constructors::ForwardedConstructor;
use super::descriptor::TypeDescriptor;

/// Compile `descriptor` into a class and register it.
///
/// On success the descriptor is frozen and rejects further changes. Every
/// call yields a new class identity, even for a name already realized in the
/// same container.
pub fn realize(descriptor: &mut TypeDescriptor) -> TypeResult<ClassRef> {
    descriptor.ensure_open()?;

    let registry = Arc::clone(&descriptor.registry);
    let base = descriptor.base_class().cloned();
    // Deriving from an attribute class yields an attribute class
    let kind = base.as_ref().map_or(ClassKind::Plain, |b| b.kind);

    let mut parts = ClassParts::new(
        registry.allocate_id(),
        descriptor.name.clone(),
        descriptor.container.clone(),
        Visibility::Public,
        kind,
        base,
    );

    for prop in &descriptor.properties {
        parts.add_slot_property(
            prop.name.clone(),
            prop.backing_slot.clone(),
            prop.ty.clone(),
            true,
            prop.attributes.clone(),
        );
    }
    parts.constructors = descriptor
        .constructors
        .iter()
        .map(ForwardedConstructor::compile)
        .collect();
    parts.attributes = descriptor.attributes.clone();

    let class = registry.register(parts);
    descriptor.frozen = true;

    debug!(
        type_name = %class.name,
        container = %class.container,
        properties = class.properties.len(),
        constructors = class.constructors.len(),
        attributes = class.attributes.len(),
        "Realized type"
    );

    Ok(class)
}
