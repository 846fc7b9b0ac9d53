//! Metadata (attribute) validation and attachment

use tracing::debug;

use crate::class::{ClassRef, MetadataRecord};
use crate::error::{TypeError, TypeResult};
use crate::value::Value;

use super::descriptor::{AttachTarget, TypeDescriptor};

/// Validate an attribute application and resolve it to a record.
///
/// Checks run in order and stop at the first failure: attribute kind,
/// visibility, constructor signature (exact match on the runtime types of
/// `ctor_args`), override member names (all unknown names reported
/// together), override value types.
pub fn resolve_metadata(
    kind: &ClassRef,
    ctor_args: &[Value],
    overrides: Option<&[(&str, Value)]>,
) -> TypeResult<MetadataRecord> {
    if !kind.is_attribute() {
        return Err(TypeError::NotAnAttribute {
            kind: kind.name.clone(),
        });
    }

    if !kind.visibility.is_externally_visible() {
        return Err(TypeError::InvalidMetadataVisibility {
            kind: kind.name.clone(),
            param: "kind",
        });
    }

    let constructor = kind
        .constructors
        .iter()
        .position(|c| c.matches_exactly(ctor_args))
        .ok_or_else(|| TypeError::NoMatchingConstructor {
            kind: kind.name.clone(),
            arg_types: ctor_args.iter().map(Value::type_name).collect(),
            param: "ctor_args",
        })?;

    let Some(overrides) = overrides else {
        return Ok(MetadataRecord {
            kind: ClassRef::clone(kind),
            constructor,
            args: ctor_args.to_vec(),
            overrides: Vec::new(),
        });
    };

    let missing: Vec<String> = overrides
        .iter()
        .filter(|(name, _)| kind.writable_member(name).is_none())
        .map(|(name, _)| name.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(TypeError::UnknownMetadataMember {
            kind: kind.name.clone(),
            members: missing,
            param: "overrides",
        });
    }

    let mut resolved = Vec::with_capacity(overrides.len());
    for (name, value) in overrides {
        let ty = kind
            .writable_member(name)
            .map(|m| m.ty().clone())
            .ok_or_else(|| TypeError::UnknownMember {
                type_name: kind.name.clone(),
                member: name.to_string(),
            })?;
        if !ty.accepts(value) {
            return Err(TypeError::TypeMismatch {
                member: name.to_string(),
                expected: ty.name(),
                actual: value.type_name(),
            });
        }
        resolved.push((name.to_string(), value.clone()));
    }

    Ok(MetadataRecord {
        kind: ClassRef::clone(kind),
        constructor,
        args: ctor_args.to_vec(),
        overrides: resolved,
    })
}

/// Validate and attach an attribute to the type or to one of its
/// properties. Nothing is attached unless every check passes.
pub fn attach(
    descriptor: &mut TypeDescriptor,
    target: AttachTarget,
    kind: &ClassRef,
    ctor_args: &[Value],
    overrides: Option<&[(&str, Value)]>,
) -> TypeResult<()> {
    descriptor.ensure_open()?;

    if let AttachTarget::Property(id) = target {
        if descriptor.property(id).is_none() {
            return Err(TypeError::UnknownMember {
                type_name: descriptor.name.clone(),
                member: format!("property #{}", id.0),
            });
        }
    }

    let record = resolve_metadata(kind, ctor_args, overrides)?;

    let attributes = match target {
        AttachTarget::Type => &mut descriptor.attributes,
        AttachTarget::Property(id) => &mut descriptor.properties[id.0].attributes,
    };
    attributes.push(record);

    debug!(
        type_name = %descriptor.name,
        target = ?target,
        attribute = %kind.name,
        args = ctor_args.len(),
        overrides = overrides.map_or(0, |o| o.len()),
        "Attached attribute"
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::builder::descriptor::open;
    use crate::builder::property::define_property;
    use crate::class::Visibility;
    use crate::declare::{ClassDecl, CtorDecl};
    use crate::registry::ClassRegistry;
    use crate::types::TypeRef;

    fn display_attribute(registry: &ClassRegistry) -> ClassRef {
        registry
            .declare(
                ClassDecl::attribute("Display")
                    .readonly_property("Label", TypeRef::Str)
                    .property("Order", TypeRef::Int)
                    .field("Hidden", TypeRef::Bool)
                    .constructor(CtorDecl::new())
                    .constructor(CtorDecl::new().param("label", TypeRef::Str).assign("label", "Label")),
            )
            .unwrap()
    }

    #[test]
    fn test_resolve_parameterless() {
        let registry = ClassRegistry::new();
        let kind = display_attribute(&registry);

        let record = resolve_metadata(&kind, &[], None).unwrap();
        assert_eq!(record.constructor, 0);
        assert!(record.args.is_empty());
        assert!(record.overrides.is_empty());
    }

    #[test]
    fn test_resolve_with_args_picks_exact_signature() {
        let registry = ClassRegistry::new();
        let kind = display_attribute(&registry);

        let record = resolve_metadata(&kind, &[Value::from("Full name")], None).unwrap();
        assert_eq!(record.constructor, 1);

        let instance = record.instantiate().unwrap();
        assert_eq!(instance.get("Label").unwrap(), Value::from("Full name"));
    }

    #[test]
    fn test_no_matching_constructor() {
        let registry = ClassRegistry::new();
        let kind = display_attribute(&registry);

        let err = resolve_metadata(&kind, &[Value::from(3)], None).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Attribute of type: Display has no constructor with parameters of types: Int64. (Parameter 'ctor_args')"
        );

        // Overrides never rescue a bad constructor call
        let overrides = [("Order", Value::from(1))];
        let err = resolve_metadata(&kind, &[Value::from(3)], Some(&overrides)).unwrap_err();
        assert!(matches!(err, TypeError::NoMatchingConstructor { .. }));
    }

    #[test]
    fn test_no_parameterless_constructor() {
        let registry = ClassRegistry::new();
        let kind = registry
            .declare(
                ClassDecl::attribute("Required")
                    .readonly_property("Reason", TypeRef::Str)
                    .constructor(CtorDecl::new().param("reason", TypeRef::Str).assign("reason", "Reason")),
            )
            .unwrap();

        let err = resolve_metadata(&kind, &[], None).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Attribute of type: Required has no constructor without parameters. (Parameter 'ctor_args')"
        );
    }

    #[test]
    fn test_visibility_checked_before_constructor() {
        let registry = ClassRegistry::new();
        for visibility in [Visibility::Internal, Visibility::Private] {
            let kind = registry
                .declare(
                    ClassDecl::attribute("Hidden")
                        .in_container(&format!("{:?}", visibility))
                        .visibility(visibility),
                )
                .unwrap();
            let err = resolve_metadata(&kind, &[Value::from("x")], None).unwrap_err();
            assert_eq!(
                err.to_string(),
                "Attribute of type Hidden is not public. Cannot use it to extend type property. (Parameter 'kind')"
            );
        }
    }

    #[test]
    fn test_plain_class_is_not_an_attribute() {
        let registry = ClassRegistry::new();
        let plain = registry.declare(ClassDecl::new("Plain")).unwrap();
        assert!(matches!(
            resolve_metadata(&plain, &[], None),
            Err(TypeError::NotAnAttribute { .. })
        ));
    }

    #[test]
    fn test_unknown_members_aggregated() {
        let registry = ClassRegistry::new();
        let kind = display_attribute(&registry);

        let overrides = [
            ("Width", Value::from(1)),
            ("Order", Value::from(2)),
            ("Color", Value::from("red")),
            ("Label", Value::from("read-only")),
        ];
        let err = resolve_metadata(&kind, &[], Some(&overrides)).unwrap_err();
        assert_eq!(
            err,
            TypeError::UnknownMetadataMember {
                kind: "Display".to_string(),
                members: vec!["Width".to_string(), "Color".to_string(), "Label".to_string()],
                param: "overrides",
            }
        );
    }

    #[test]
    fn test_override_type_mismatch() {
        let registry = ClassRegistry::new();
        let kind = display_attribute(&registry);

        let overrides = [("Order", Value::from("first"))];
        let err = resolve_metadata(&kind, &[], Some(&overrides)).unwrap_err();
        assert_eq!(
            err,
            TypeError::TypeMismatch {
                member: "Order".to_string(),
                expected: "Int64".to_string(),
                actual: "String".to_string(),
            }
        );
    }

    #[test]
    fn test_overrides_applied_on_instantiate() {
        let registry = ClassRegistry::new();
        let kind = display_attribute(&registry);

        let overrides = [("Order", Value::from(7)), ("Hidden", Value::from(true))];
        let record = resolve_metadata(&kind, &[Value::from("Id")], Some(&overrides)).unwrap();
        let instance = record.instantiate().unwrap();

        assert_eq!(instance.get("Label").unwrap(), Value::from("Id"));
        assert_eq!(instance.get("Order").unwrap(), Value::Int(7));
        assert_eq!(instance.field("Hidden").unwrap(), Value::Bool(true));
    }

    #[test]
    fn test_attach_is_all_or_nothing() {
        let registry = Arc::new(ClassRegistry::new());
        let kind = display_attribute(&registry);
        let mut desc = open(&registry, "Poco", None, None).unwrap();
        let age = define_property(&mut desc, "Age", TypeRef::Int).unwrap();

        let bad = [("Missing", Value::from(1))];
        assert!(attach(&mut desc, AttachTarget::Type, &kind, &[], Some(&bad)).is_err());
        assert!(attach(&mut desc, AttachTarget::Property(age), &kind, &[], Some(&bad)).is_err());
        assert!(desc.attributes.is_empty());
        assert!(desc.properties[0].attributes.is_empty());

        attach(&mut desc, AttachTarget::Type, &kind, &[], None).unwrap();
        attach(&mut desc, AttachTarget::Property(age), &kind, &[Value::from("Age")], None).unwrap();
        attach(&mut desc, AttachTarget::Property(age), &kind, &[], None).unwrap();
        assert_eq!(desc.attributes.len(), 1);
        assert_eq!(desc.properties[0].attributes.len(), 2);
        assert_eq!(desc.properties[0].attributes[0].constructor, 1);
        assert_eq!(desc.properties[0].attributes[1].constructor, 0);
    }

    #[test]
    fn test_readonly_field_not_an_override_target() {
        let registry = ClassRegistry::new();
        let kind = registry
            .declare(
                ClassDecl::attribute("Schema")
                    .readonly_field("Version", TypeRef::Int)
                    .field("Comment", TypeRef::Str)
                    .constructor(CtorDecl::new()),
            )
            .unwrap();

        let overrides = [("Comment", Value::from("ok")), ("Version", Value::from(2))];
        let err = resolve_metadata(&kind, &[], Some(&overrides)).unwrap_err();
        assert_eq!(
            err,
            TypeError::UnknownMetadataMember {
                kind: "Schema".to_string(),
                members: vec!["Version".to_string()],
                param: "overrides",
            }
        );
    }
}
