//! Fluent builders
//!
//! Two front ends drive the same descriptor machinery:
//!
//! - [`TypeBuilder`]: free-form, properties given by name and type.
//! - [`TypedTypeBuilder`]: bound to an existing class; properties are
//!   selected by name from that class and copy its declared type.
//!
//! ```rust,ignore
//! let mut builder = TypeBuilder::new("Person")?;
//! builder
//!     .property("Age", TypeRef::Int)?
//!     .property_with("Name", TypeRef::Str, |p| {
//!         p.add_attribute(&required, &[], None)?;
//!         Ok(())
//!     })?
//!     .add_attribute(&table, &[Value::from("people")], None)?;
//! let person = builder.build()?;
//! ```

use std::sync::Arc;

use crate::class::ClassRef;
use crate::error::{TypeError, TypeResult};
use crate::registry::ClassRegistry;
use crate::types::TypeRef;
use crate::value::Value;

use super::descriptor::{open, AttachTarget, PropertyId, TypeDescriptor};
use super::metadata::attach;
use super::property::define_property;
use super::realize::realize;

/// Attribute application scoped to one property
pub struct PropertyBuilder<'a> {
    descriptor: &'a mut TypeDescriptor,
    property: PropertyId,
}

impl PropertyBuilder<'_> {
    /// Handle of the property being configured
    pub fn id(&self) -> PropertyId {
        self.property
    }

    /// Name of the property being configured
    pub fn name(&self) -> &str {
        &self.descriptor.properties[self.property.0].name
    }

    /// Attach an attribute to the property
    pub fn add_attribute(
        &mut self,
        kind: &ClassRef,
        ctor_args: &[Value],
        overrides: Option<&[(&str, Value)]>,
    ) -> TypeResult<&mut Self> {
        attach(
            self.descriptor,
            AttachTarget::Property(self.property),
            kind,
            ctor_args,
            overrides,
        )?;
        Ok(self)
    }
}

/// Free-form runtime type builder
///
/// Lifecycle: open, any number of property/attribute operations, then
/// [`build`](Self::build). A built builder rejects every further call;
/// a second `build` fails with `AlreadyBuilt`.
#[derive(Debug)]
pub struct TypeBuilder {
    descriptor: TypeDescriptor,
    built: Option<ClassRef>,
}

impl TypeBuilder {
    /// Open a type in the global registry's default container
    pub fn new(name: &str) -> TypeResult<Self> {
        Self::open(&ClassRegistry::global(), name, None, None)
    }

    /// Open a type in `registry`, optionally in a named container and
    /// derived from `base`
    pub fn open(
        registry: &Arc<ClassRegistry>,
        name: &str,
        container: Option<&str>,
        base: Option<&ClassRef>,
    ) -> TypeResult<Self> {
        Ok(Self {
            descriptor: open(registry, name, container, base)?,
            built: None,
        })
    }

    /// The in-progress descriptor
    pub fn descriptor(&self) -> &TypeDescriptor {
        &self.descriptor
    }

    fn ensure_not_built(&self) -> TypeResult<()> {
        if self.built.is_some() {
            return Err(TypeError::Frozen {
                type_name: self.descriptor.name.clone(),
            });
        }
        Ok(())
    }

    /// Define a property and return its handle, so attributes can be added
    /// later through [`for_property`](Self::for_property)
    pub fn define_property(&mut self, name: &str, ty: TypeRef) -> TypeResult<PropertyId> {
        self.ensure_not_built()?;
        define_property(&mut self.descriptor, name, ty)
    }

    /// Define a property
    pub fn property(&mut self, name: &str, ty: TypeRef) -> TypeResult<&mut Self> {
        self.define_property(name, ty)?;
        Ok(self)
    }

    /// Define a property and configure its attributes.
    ///
    /// If `configure` fails the property is removed again.
    pub fn property_with<F>(&mut self, name: &str, ty: TypeRef, configure: F) -> TypeResult<&mut Self>
    where
        F: FnOnce(&mut PropertyBuilder<'_>) -> TypeResult<()>,
    {
        let id = self.define_property(name, ty)?;
        let mut property = PropertyBuilder {
            descriptor: &mut self.descriptor,
            property: id,
        };
        if let Err(err) = configure(&mut property) {
            self.descriptor.remove_property(id);
            return Err(err);
        }
        Ok(self)
    }

    /// Scoped builder for a property defined earlier
    pub fn for_property(&mut self, id: PropertyId) -> TypeResult<PropertyBuilder<'_>> {
        self.ensure_not_built()?;
        if self.descriptor.property(id).is_none() {
            return Err(TypeError::UnknownMember {
                type_name: self.descriptor.name.clone(),
                member: format!("property #{}", id.0),
            });
        }
        Ok(PropertyBuilder {
            descriptor: &mut self.descriptor,
            property: id,
        })
    }

    /// Attach an attribute to the type
    pub fn add_attribute(
        &mut self,
        kind: &ClassRef,
        ctor_args: &[Value],
        overrides: Option<&[(&str, Value)]>,
    ) -> TypeResult<&mut Self> {
        self.ensure_not_built()?;
        attach(&mut self.descriptor, AttachTarget::Type, kind, ctor_args, overrides)?;
        Ok(self)
    }

    /// Freeze the type and return the realized class
    pub fn build(&mut self) -> TypeResult<ClassRef> {
        if self.built.is_some() {
            return Err(TypeError::AlreadyBuilt {
                type_name: self.descriptor.name.clone(),
            });
        }
        let class = realize(&mut self.descriptor)?;
        self.built = Some(ClassRef::clone(&class));
        Ok(class)
    }

    /// Whether [`build`](Self::build) has succeeded
    pub fn is_built(&self) -> bool {
        self.built.is_some()
    }
}

/// Runtime type builder bound to an existing class
///
/// Properties are selected by name from the bound class (including
/// inherited ones) and keep its declared type. The new type derives from
/// the bound class only when `inherit` is set.
#[derive(Debug)]
pub struct TypedTypeBuilder {
    source: ClassRef,
    inner: TypeBuilder,
}

impl TypedTypeBuilder {
    /// Bind to `source` in the global registry. The type is named after the
    /// source class and does not derive from it.
    pub fn new(source: &ClassRef) -> TypeResult<Self> {
        Self::open(&ClassRegistry::global(), source, None, None, false)
    }

    /// Bind to `source` in `registry`. `name` defaults to the source class
    /// name.
    pub fn open(
        registry: &Arc<ClassRegistry>,
        source: &ClassRef,
        name: Option<&str>,
        container: Option<&str>,
        inherit: bool,
    ) -> TypeResult<Self> {
        let name = name.unwrap_or(&source.name);
        let base = inherit.then_some(source);
        Ok(Self {
            source: ClassRef::clone(source),
            inner: TypeBuilder::open(registry, name, container, base)?,
        })
    }

    /// The bound class
    pub fn source(&self) -> &ClassRef {
        &self.source
    }

    /// The in-progress descriptor
    pub fn descriptor(&self) -> &TypeDescriptor {
        self.inner.descriptor()
    }

    fn source_type(&self, property: &str) -> TypeResult<TypeRef> {
        self.source
            .property(property)
            .map(|(_, p)| p.ty.clone())
            .ok_or_else(|| TypeError::UnknownSourceProperty {
                type_name: self.source.name.clone(),
                property: property.to_string(),
                param: "property_selector",
            })
    }

    /// Define a property mirroring `property` on the bound class and return
    /// its handle
    pub fn define_property(&mut self, property: &str) -> TypeResult<PropertyId> {
        let ty = self.source_type(property)?;
        self.inner.define_property(property, ty)
    }

    /// Define a property mirroring `property` on the bound class
    pub fn property(&mut self, property: &str) -> TypeResult<&mut Self> {
        self.define_property(property)?;
        Ok(self)
    }

    /// Define a mirrored property and configure its attributes
    pub fn property_with<F>(&mut self, property: &str, configure: F) -> TypeResult<&mut Self>
    where
        F: FnOnce(&mut PropertyBuilder<'_>) -> TypeResult<()>,
    {
        let ty = self.source_type(property)?;
        self.inner.property_with(property, ty, configure)?;
        Ok(self)
    }

    /// Scoped builder for a property defined earlier
    pub fn for_property(&mut self, id: PropertyId) -> TypeResult<PropertyBuilder<'_>> {
        self.inner.for_property(id)
    }

    /// Attach an attribute to the type
    pub fn add_attribute(
        &mut self,
        kind: &ClassRef,
        ctor_args: &[Value],
        overrides: Option<&[(&str, Value)]>,
    ) -> TypeResult<&mut Self> {
        self.inner.add_attribute(kind, ctor_args, overrides)?;
        Ok(self)
    }

    /// Freeze the type and return the realized class
    pub fn build(&mut self) -> TypeResult<ClassRef> {
        self.inner.build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::declare::{ClassDecl, CtorDecl};
    use crate::instance::Instance;

    fn registry() -> Arc<ClassRegistry> {
        Arc::new(ClassRegistry::new())
    }

    fn marker(registry: &ClassRegistry) -> ClassRef {
        registry
            .declare(ClassDecl::attribute("Marker").constructor(CtorDecl::new()))
            .unwrap()
    }

    #[test]
    fn test_fluent_chain() {
        let registry = registry();
        let marker = marker(&registry);

        let mut builder = TypeBuilder::open(&registry, "Person", None, None).unwrap();
        builder
            .property("Age", TypeRef::Int)
            .unwrap()
            .property_with("Name", TypeRef::Str, |p| {
                assert_eq!(p.name(), "Name");
                p.add_attribute(&marker, &[], None)?.add_attribute(&marker, &[], None)?;
                Ok(())
            })
            .unwrap()
            .add_attribute(&marker, &[], None)
            .unwrap();
        let person = builder.build().unwrap();

        assert_eq!(person.properties.len(), 2);
        assert_eq!(person.attributes.len(), 1);
        assert_eq!(person.declared_property("Name").unwrap().attributes.len(), 2);
        assert!(person.declared_property("Age").unwrap().attributes.is_empty());
    }

    #[test]
    fn test_failed_configure_rolls_back_property() {
        let registry = registry();
        let marker = marker(&registry);

        let mut builder = TypeBuilder::open(&registry, "Person", None, None).unwrap();
        let result = builder.property_with("Name", TypeRef::Str, |p| {
            p.add_attribute(&marker, &[Value::from("unexpected")], None)?;
            Ok(())
        });
        assert!(matches!(result, Err(TypeError::NoMatchingConstructor { .. })));
        assert!(builder.descriptor().properties.is_empty());

        // Retry with corrected arguments
        builder
            .property_with("Name", TypeRef::Str, |p| {
                p.add_attribute(&marker, &[], None)?;
                Ok(())
            })
            .unwrap();
        assert_eq!(builder.descriptor().properties.len(), 1);
    }

    #[test]
    fn test_attribute_added_later_through_handle() {
        let registry = registry();
        let marker = marker(&registry);

        let mut builder = TypeBuilder::open(&registry, "Person", None, None).unwrap();
        let id = builder.define_property("Age", TypeRef::Int).unwrap();
        builder.property("Name", TypeRef::Str).unwrap();
        builder.for_property(id).unwrap().add_attribute(&marker, &[], None).unwrap();

        let person = builder.build().unwrap();
        assert_eq!(person.declared_property("Age").unwrap().attributes.len(), 1);
        assert!(person.declared_property("Name").unwrap().attributes.is_empty());
    }

    #[test]
    fn test_build_twice_rejected() {
        let registry = registry();
        let mut builder = TypeBuilder::open(&registry, "Once", None, None).unwrap();
        builder.build().unwrap();
        assert!(builder.is_built());

        assert!(matches!(builder.build(), Err(TypeError::AlreadyBuilt { .. })));
        assert!(matches!(
            builder.property("Late", TypeRef::Int),
            Err(TypeError::Frozen { .. })
        ));
    }

    #[test]
    fn test_typed_builder_copies_source_property_types() {
        let registry = registry();
        let source = registry
            .declare(
                ClassDecl::new("Source")
                    .readonly_property("Title", TypeRef::Str)
                    .property("Count", TypeRef::Int)
                    .constructor(CtorDecl::new().param("title", TypeRef::Str).assign("title", "Title")),
            )
            .unwrap();

        let mut builder = TypedTypeBuilder::open(&registry, &source, Some("Copy"), None, false).unwrap();
        builder.property("Title").unwrap().property("Count").unwrap();
        let copy = builder.build().unwrap();

        assert_eq!(copy.name, "Copy");
        assert!(copy.parent.is_none());
        assert_eq!(copy.declared_property("Title").unwrap().ty, TypeRef::Str);
        assert_eq!(copy.declared_property("Count").unwrap().ty, TypeRef::Int);
        // Copied properties are always read/write
        assert!(copy.declared_property("Title").unwrap().setter.is_some());

        let mut instance = Instance::new(&copy, &[]).unwrap();
        instance.set("Title", Value::from("x")).unwrap();
        assert_eq!(instance.get("Title").unwrap(), Value::from("x"));
    }

    #[test]
    fn test_typed_builder_unknown_source_property() {
        let registry = registry();
        let source = registry.declare(ClassDecl::new("Source")).unwrap();

        let mut builder = TypedTypeBuilder::open(&registry, &source, None, None, false).unwrap();
        let err = builder.property("Missing").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Type Source has no property with name: Missing. (Parameter 'property_selector')"
        );
        assert!(builder.descriptor().properties.is_empty());
    }
}
