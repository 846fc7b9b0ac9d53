//! Property definition

use tracing::debug;

use crate::error::{TypeError, TypeResult};
use crate::types::TypeRef;

use super::descriptor::{is_identifier, PropertyDescriptor, PropertyId, TypeDescriptor};

/// Backing slot name: prefix followed by the name with its first character
/// lower-cased (`"Age"` with prefix `"_"` gives `"_age"`)
pub fn backing_slot_name(prefix: &str, name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => format!("{}{}{}", prefix, first.to_lowercase(), chars.as_str()),
        None => prefix.to_string(),
    }
}

/// Add a slot-backed property with a get/set accessor pair.
///
/// Names must be unique within the descriptor; a second definition under the
/// same name is rejected with `DuplicateProperty`.
pub fn define_property(
    descriptor: &mut TypeDescriptor,
    name: &str,
    ty: TypeRef,
) -> TypeResult<PropertyId> {
    descriptor.ensure_open()?;

    if !is_identifier(name) {
        return Err(TypeError::InvalidIdentifier {
            name: name.to_string(),
        });
    }
    if descriptor.property_id(name).is_some() {
        return Err(TypeError::DuplicateProperty {
            type_name: descriptor.name.clone(),
            property: name.to_string(),
        });
    }

    let backing_slot = backing_slot_name(&descriptor.registry.options().backing_slot_prefix, name);

    debug!(
        type_name = %descriptor.name,
        property = %name,
        ty = %ty,
        slot = %backing_slot,
        "Defining property"
    );

    descriptor.properties.push(PropertyDescriptor {
        name: name.to_string(),
        ty,
        backing_slot,
        attributes: Vec::new(),
    });
    Ok(PropertyId(descriptor.properties.len() - 1))
}
