//! Host class declarations
//!
//! Classes that exist before any synthesis happens (base types to derive
//! from, attribute kinds to attach) are declared with [`ClassDecl`] and
//! realized through [`ClassRegistry::declare`].
//!
//! ```rust,ignore
//! let registry = ClassRegistry::new();
//! let person = registry.declare(
//!     ClassDecl::new("Person")
//!         .readonly_property("Name", TypeRef::Str)
//!         .constructor(CtorDecl::new().param("name", TypeRef::Str).assign("name", "Name")),
//! )?;
//! ```

use tracing::debug;

use crate::builder::resolve_metadata;
use crate::bytecode;
use crate::class::{
    ClassKind, ClassParts, ClassRef, ConstructorInfo, FieldInfo, ParameterInfo, Visibility,
};
use crate::error::{TypeError, TypeResult};
use crate::registry::ClassRegistry;
use crate::types::TypeRef;
use crate::value::Value;

/// Field declaration
#[derive(Debug, Clone)]
pub struct FieldDecl {
    /// Field name
    pub name: String,
    /// Declared type
    pub ty: TypeRef,
    /// Public visibility
    pub is_public: bool,
    /// Readonly after construction
    pub is_readonly: bool,
}

/// Slot-backed property declaration
#[derive(Debug, Clone)]
pub struct PropertyDecl {
    /// Property name
    pub name: String,
    /// Declared type
    pub ty: TypeRef,
    /// Has a setter
    pub writable: bool,
}

/// Constructor declaration: typed parameters, each optionally stored into
/// a field or property backing slot
#[derive(Debug, Clone, Default)]
pub struct CtorDecl {
    /// Parameter names and types
    pub params: Vec<(String, TypeRef)>,
    /// (parameter name, member name) pairs
    pub assignments: Vec<(String, String)>,
    /// (parameter name, attribute kind, constructor arguments)
    pub param_attributes: Vec<(String, ClassRef, Vec<Value>)>,
}

impl CtorDecl {
    /// Create an empty (parameterless) constructor
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a parameter
    pub fn param(mut self, name: &str, ty: TypeRef) -> Self {
        self.params.push((name.to_string(), ty));
        self
    }

    /// Store parameter `param` into `member`
    pub fn assign(mut self, param: &str, member: &str) -> Self {
        self.assignments.push((param.to_string(), member.to_string()));
        self
    }

    /// Attach an attribute to parameter `param`
    pub fn param_attribute(mut self, param: &str, kind: &ClassRef, args: &[Value]) -> Self {
        self.param_attributes
            .push((param.to_string(), ClassRef::clone(kind), args.to_vec()));
        self
    }
}

/// Declaration of a host class
#[derive(Debug, Clone)]
pub struct ClassDecl {
    /// Class name
    pub name: String,
    /// Container (registry default if `None`)
    pub container: Option<String>,
    /// Visibility
    pub visibility: Visibility,
    /// Kind
    pub kind: ClassKind,
    /// Parent class
    pub parent: Option<ClassRef>,
    /// Fields
    pub fields: Vec<FieldDecl>,
    /// Properties
    pub properties: Vec<PropertyDecl>,
    /// Constructors
    pub constructors: Vec<CtorDecl>,
}

impl ClassDecl {
    /// Declare a public plain class
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            container: None,
            visibility: Visibility::Public,
            kind: ClassKind::Plain,
            parent: None,
            fields: Vec::new(),
            properties: Vec::new(),
            constructors: Vec::new(),
        }
    }

    /// Declare a public attribute class
    pub fn attribute(name: &str) -> Self {
        Self::new(name).kind(ClassKind::Attribute)
    }

    /// Place the class in a container
    pub fn in_container(mut self, container: &str) -> Self {
        self.container = Some(container.to_string());
        self
    }

    /// Set visibility
    pub fn visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    /// Set kind
    pub fn kind(mut self, kind: ClassKind) -> Self {
        self.kind = kind;
        self
    }

    /// Derive from `parent`
    pub fn extends(mut self, parent: &ClassRef) -> Self {
        self.parent = Some(ClassRef::clone(parent));
        self
    }

    /// Add a public, writable field
    pub fn field(mut self, name: &str, ty: TypeRef) -> Self {
        self.fields.push(FieldDecl {
            name: name.to_string(),
            ty,
            is_public: true,
            is_readonly: false,
        });
        self
    }

    /// Add a public field that only constructors may store into
    pub fn readonly_field(mut self, name: &str, ty: TypeRef) -> Self {
        self.fields.push(FieldDecl {
            name: name.to_string(),
            ty,
            is_public: true,
            is_readonly: true,
        });
        self
    }

    /// Add a private field
    pub fn private_field(mut self, name: &str, ty: TypeRef) -> Self {
        self.fields.push(FieldDecl {
            name: name.to_string(),
            ty,
            is_public: false,
            is_readonly: false,
        });
        self
    }

    /// Add a get/set property
    pub fn property(mut self, name: &str, ty: TypeRef) -> Self {
        self.properties.push(PropertyDecl {
            name: name.to_string(),
            ty,
            writable: true,
        });
        self
    }

    /// Add a get-only property (settable from constructors)
    pub fn readonly_property(mut self, name: &str, ty: TypeRef) -> Self {
        self.properties.push(PropertyDecl {
            name: name.to_string(),
            ty,
            writable: false,
        });
        self
    }

    /// Add a constructor
    pub fn constructor(mut self, ctor: CtorDecl) -> Self {
        self.constructors.push(ctor);
        self
    }
}

impl ClassRegistry {
    /// Realize a host class declaration
    pub fn declare(&self, decl: ClassDecl) -> TypeResult<ClassRef> {
        let container = self.container_name(decl.container.as_deref());
        let mut parts = ClassParts::new(
            self.allocate_id(),
            decl.name.clone(),
            container,
            decl.visibility,
            decl.kind,
            decl.parent.clone(),
        );

        for field in &decl.fields {
            let slot = parts.add_slot(field.name.clone(), field.ty.clone());
            parts.fields.push(FieldInfo {
                name: field.name.clone(),
                ty: field.ty.clone(),
                slot,
                is_public: field.is_public,
                is_readonly: field.is_readonly,
            });
        }

        for prop in &decl.properties {
            parts.add_slot_property(
                prop.name.clone(),
                format!("<{}>k__BackingField", prop.name),
                prop.ty.clone(),
                prop.writable,
                Vec::new(),
            );
        }

        // Host constructors chain to the parent's parameterless constructor
        let base = match &decl.parent {
            Some(parent) if !parent.constructors.is_empty() => Some(
                parent
                    .constructors
                    .iter()
                    .position(|c| c.parameters.is_empty())
                    .ok_or_else(|| TypeError::NoMatchingConstructor {
                        kind: parent.name.clone(),
                        arg_types: Vec::new(),
                        param: "parent",
                    })?,
            ),
            _ => None,
        };

        for ctor in &decl.constructors {
            let mut assignments = Vec::with_capacity(ctor.assignments.len());
            for (param, member) in &ctor.assignments {
                let arg = ctor
                    .params
                    .iter()
                    .position(|(name, _)| name == param)
                    .ok_or_else(|| TypeError::UnknownMember {
                        type_name: decl.name.clone(),
                        member: param.clone(),
                    })?;
                let slot = member_slot(&parts, member).ok_or_else(|| TypeError::UnknownMember {
                    type_name: decl.name.clone(),
                    member: member.clone(),
                })?;
                assignments.push((arg, slot));
            }

            let mut parameters: Vec<ParameterInfo> = ctor
                .params
                .iter()
                .enumerate()
                .map(|(index, (name, ty))| ParameterInfo {
                    name: name.clone(),
                    ty: ty.clone(),
                    index,
                    attributes: Vec::new(),
                })
                .collect();
            for (param, kind, args) in &ctor.param_attributes {
                let target = parameters
                    .iter_mut()
                    .find(|p| &p.name == param)
                    .ok_or_else(|| TypeError::UnknownMember {
                        type_name: decl.name.clone(),
                        member: param.clone(),
                    })?;
                target.attributes.push(resolve_metadata(kind, args, None)?);
            }

            parts.constructors.push(ConstructorInfo {
                parameters,
                code: bytecode::storing_constructor(base, &assignments),
            });
        }

        debug!(
            class = %decl.name,
            kind = ?decl.kind,
            visibility = ?decl.visibility,
            "Declaring host class"
        );

        Ok(self.register(parts))
    }
}

/// Slot of a field or property declared on `parts` or inherited
fn member_slot(parts: &ClassParts, member: &str) -> Option<usize> {
    if let Some(field) = parts.fields.iter().find(|f| f.name == member) {
        return Some(field.slot);
    }
    if let Some(prop) = parts.properties.iter().find(|p| p.name == member) {
        return prop.backing_slot;
    }
    let parent = parts.parent.as_deref()?;
    if let Some(field) = parent.field(member) {
        return Some(field.slot);
    }
    parent.property(member).and_then(|(_, p)| p.backing_slot)
}
