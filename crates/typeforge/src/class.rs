//! Realized classes
//!
//! A [`Class`] is the frozen, instantiable result of either a host
//! declaration ([`crate::ClassDecl`]) or a synthesized type
//! ([`crate::TypeBuilder`]). Classes are immutable once created and are
//! shared as [`ClassRef`] handles.

use std::fmt;
use std::sync::Arc;

use rustc_hash::FxHashMap;
use serde::Serialize;

use crate::bytecode::{self, Op};
use crate::error::TypeResult;
use crate::instance::Instance;
use crate::types::TypeRef;
use crate::value::Value;

/// Shared handle to a realized class
pub type ClassRef = Arc<Class>;

/// Unique class identifier within a registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ClassId(pub usize);

impl fmt::Display for ClassId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ClassId({})", self.0)
    }
}

/// Class visibility
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Visibility {
    /// Visible outside its container
    Public,
    /// Visible only inside its container
    Internal,
    /// Nested private class
    Private,
}

impl Visibility {
    /// Whether code outside the declaring container may reference the class
    pub fn is_externally_visible(self) -> bool {
        matches!(self, Visibility::Public)
    }
}

/// Class kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ClassKind {
    /// Ordinary class
    Plain,
    /// Attribute class, usable as metadata
    Attribute,
}

/// One storage slot in the instance layout
#[derive(Debug, Clone)]
pub struct SlotInfo {
    /// Slot name (field name or backing slot name)
    pub name: String,
    /// Declared type
    pub ty: TypeRef,
}

/// Named field
#[derive(Debug, Clone)]
pub struct FieldInfo {
    /// Field name
    pub name: String,
    /// Declared type
    pub ty: TypeRef,
    /// Slot index in the instance layout
    pub slot: usize,
    /// Whether the field is public
    pub is_public: bool,
    /// Whether the field is readonly after construction
    pub is_readonly: bool,
}

/// Property backed by accessor methods
#[derive(Debug, Clone)]
pub struct PropertyInfo {
    /// Property name
    pub name: String,
    /// Declared type
    pub ty: TypeRef,
    /// Getter method index
    pub getter: Option<usize>,
    /// Setter method index
    pub setter: Option<usize>,
    /// Backing slot, if the property is slot-backed
    pub backing_slot: Option<usize>,
    /// Attached metadata, in attachment order
    pub attributes: Vec<MetadataRecord>,
}

/// Parameter of a method or constructor
#[derive(Debug, Clone)]
pub struct ParameterInfo {
    /// Parameter name
    pub name: String,
    /// Declared type
    pub ty: TypeRef,
    /// Position in the parameter list
    pub index: usize,
    /// Parameter-level metadata
    pub attributes: Vec<MetadataRecord>,
}

/// Method with a bytecode body
#[derive(Debug, Clone)]
pub struct MethodInfo {
    /// Method name
    pub name: String,
    /// Parameters
    pub parameters: Vec<ParameterInfo>,
    /// Return type (`None` for void)
    pub return_type: Option<TypeRef>,
    /// Body
    pub code: Vec<Op>,
}

/// Constructor with a bytecode body
#[derive(Debug, Clone)]
pub struct ConstructorInfo {
    /// Parameters
    pub parameters: Vec<ParameterInfo>,
    /// Body
    pub code: Vec<Op>,
}

impl ConstructorInfo {
    /// Parameter types in order
    pub fn parameter_types(&self) -> Vec<TypeRef> {
        self.parameters.iter().map(|p| p.ty.clone()).collect()
    }

    /// Arity and assignability check for an argument list
    pub fn accepts(&self, args: &[Value]) -> bool {
        self.parameters.len() == args.len()
            && self.parameters.iter().zip(args).all(|(p, a)| p.ty.accepts(a))
    }

    /// Exact signature match against the runtime types of `args`
    pub fn matches_exactly(&self, args: &[Value]) -> bool {
        self.parameters.len() == args.len()
            && self
                .parameters
                .iter()
                .zip(args)
                .all(|(p, a)| p.ty.matches_exactly(a))
    }
}

/// A resolved metadata (attribute) instance attached to a class or property
#[derive(Debug, Clone)]
pub struct MetadataRecord {
    /// Attribute class
    pub kind: ClassRef,
    /// Index of the resolved constructor on `kind`
    pub constructor: usize,
    /// Constructor arguments, in order
    pub args: Vec<Value>,
    /// Post-construction member overrides, in the order supplied
    pub overrides: Vec<(String, Value)>,
}

impl MetadataRecord {
    /// Construct the attribute instance this record describes
    pub fn instantiate(&self) -> TypeResult<Instance> {
        let mut instance = Instance::construct(&self.kind, self.constructor, &self.args)?;
        for (member, value) in &self.overrides {
            instance.set_member(member, value.clone())?;
        }
        Ok(instance)
    }

    /// Whether the record is an instance of `kind`
    pub fn is(&self, kind: &ClassRef) -> bool {
        self.kind.is_subclass_of(kind)
    }
}

/// A member that can be written after construction
#[derive(Debug, Clone, Copy)]
pub enum WritableMember<'a> {
    /// Property with a setter
    Property(&'a PropertyInfo),
    /// Public, non-readonly field
    Field(&'a FieldInfo),
}

impl WritableMember<'_> {
    /// Declared type of the member
    pub fn ty(&self) -> &TypeRef {
        match self {
            WritableMember::Property(p) => &p.ty,
            WritableMember::Field(f) => &f.ty,
        }
    }
}

/// Everything needed to assemble a [`Class`]
#[derive(Debug)]
pub(crate) struct ClassParts {
    pub id: ClassId,
    pub name: String,
    pub container: String,
    pub visibility: Visibility,
    pub kind: ClassKind,
    pub parent: Option<ClassRef>,
    pub slots: Vec<SlotInfo>,
    pub fields: Vec<FieldInfo>,
    pub properties: Vec<PropertyInfo>,
    pub methods: Vec<MethodInfo>,
    pub constructors: Vec<ConstructorInfo>,
    pub attributes: Vec<MetadataRecord>,
}

impl ClassParts {
    /// Start an empty class, inheriting the parent's slot layout
    pub fn new(
        id: ClassId,
        name: String,
        container: String,
        visibility: Visibility,
        kind: ClassKind,
        parent: Option<ClassRef>,
    ) -> Self {
        let slots = parent.as_ref().map(|p| p.slots.clone()).unwrap_or_default();
        Self {
            id,
            name,
            container,
            visibility,
            kind,
            parent,
            slots,
            fields: Vec::new(),
            properties: Vec::new(),
            methods: Vec::new(),
            constructors: Vec::new(),
            attributes: Vec::new(),
        }
    }

    /// Append a slot to the layout, returning its index
    pub fn add_slot(&mut self, name: String, ty: TypeRef) -> usize {
        self.slots.push(SlotInfo { name, ty });
        self.slots.len() - 1
    }

    /// Add a method, returning its index
    pub fn add_method(&mut self, method: MethodInfo) -> usize {
        self.methods.push(method);
        self.methods.len() - 1
    }

    /// Add a slot-backed property with generated `get_`/`set_` accessors
    pub fn add_slot_property(
        &mut self,
        name: String,
        slot_name: String,
        ty: TypeRef,
        writable: bool,
        attributes: Vec<MetadataRecord>,
    ) {
        let slot = self.add_slot(slot_name, ty.clone());
        let getter = self.add_method(MethodInfo {
            name: format!("get_{}", name),
            parameters: Vec::new(),
            return_type: Some(ty.clone()),
            code: bytecode::getter(slot),
        });
        let setter = writable.then(|| {
            self.add_method(MethodInfo {
                name: format!("set_{}", name),
                parameters: vec![ParameterInfo {
                    name: "value".to_string(),
                    ty: ty.clone(),
                    index: 0,
                    attributes: Vec::new(),
                }],
                return_type: None,
                code: bytecode::setter(slot),
            })
        });
        self.properties.push(PropertyInfo {
            name,
            ty,
            getter: Some(getter),
            setter,
            backing_slot: Some(slot),
            attributes,
        });
    }
}

/// Realized class
#[derive(Debug)]
pub struct Class {
    /// Class ID
    pub id: ClassId,
    /// Class name
    pub name: String,
    /// Owning container name
    pub container: String,
    /// Visibility
    pub visibility: Visibility,
    /// Kind
    pub kind: ClassKind,
    /// Parent class
    pub parent: Option<ClassRef>,
    /// Full slot layout, inherited slots first
    pub slots: Vec<SlotInfo>,
    /// Declared fields
    pub fields: Vec<FieldInfo>,
    /// Declared properties
    pub properties: Vec<PropertyInfo>,
    /// Declared methods (accessors included)
    pub methods: Vec<MethodInfo>,
    /// Declared constructors
    pub constructors: Vec<ConstructorInfo>,
    /// Class-level metadata, in attachment order
    pub attributes: Vec<MetadataRecord>,
    property_indices: FxHashMap<String, usize>,
    field_indices: FxHashMap<String, usize>,
}

impl Class {
    /// Assemble a class from its parts
    pub(crate) fn from_parts(parts: ClassParts) -> Self {
        let property_indices = parts
            .properties
            .iter()
            .enumerate()
            .map(|(i, p)| (p.name.clone(), i))
            .collect();
        let field_indices = parts
            .fields
            .iter()
            .enumerate()
            .map(|(i, f)| (f.name.clone(), i))
            .collect();
        Self {
            id: parts.id,
            name: parts.name,
            container: parts.container,
            visibility: parts.visibility,
            kind: parts.kind,
            parent: parts.parent,
            slots: parts.slots,
            fields: parts.fields,
            properties: parts.properties,
            methods: parts.methods,
            constructors: parts.constructors,
            attributes: parts.attributes,
            property_indices,
            field_indices,
        }
    }

    /// Class identity comparison
    pub fn same(a: &Class, b: &Class) -> bool {
        std::ptr::eq(a, b)
    }

    /// Qualified name: `container::Name`
    pub fn qualified_name(&self) -> String {
        format!("{}::{}", self.container, self.name)
    }

    /// Whether this is an attribute class
    pub fn is_attribute(&self) -> bool {
        self.kind == ClassKind::Attribute
    }

    /// Check if `self` is `other` or derives from it
    pub fn is_subclass_of(&self, other: &Class) -> bool {
        let mut current = Some(self);
        while let Some(class) = current {
            if Class::same(class, other) {
                return true;
            }
            current = class.parent.as_deref();
        }
        false
    }

    /// Number of slots in an instance
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    /// Property declared directly on this class
    pub fn declared_property(&self, name: &str) -> Option<&PropertyInfo> {
        self.property_indices.get(name).map(|&i| &self.properties[i])
    }

    /// Find a property on this class or its ancestors, with its declaring class
    pub fn property(&self, name: &str) -> Option<(&Class, &PropertyInfo)> {
        let mut current = Some(self);
        while let Some(class) = current {
            if let Some(prop) = class.declared_property(name) {
                return Some((class, prop));
            }
            current = class.parent.as_deref();
        }
        None
    }

    /// Every visible property, most-derived first; hidden base properties are skipped
    pub fn all_properties(&self) -> Vec<&PropertyInfo> {
        let mut seen = Vec::new();
        let mut result = Vec::new();
        let mut current = Some(self);
        while let Some(class) = current {
            for prop in &class.properties {
                if !seen.contains(&prop.name.as_str()) {
                    seen.push(prop.name.as_str());
                    result.push(prop);
                }
            }
            current = class.parent.as_deref();
        }
        result
    }

    /// Find a field on this class or its ancestors
    pub fn field(&self, name: &str) -> Option<&FieldInfo> {
        let mut current = Some(self);
        while let Some(class) = current {
            if let Some(&i) = class.field_indices.get(name) {
                return Some(&class.fields[i]);
            }
            current = class.parent.as_deref();
        }
        None
    }

    /// Resolve a member that may be assigned after construction
    pub fn writable_member(&self, name: &str) -> Option<WritableMember<'_>> {
        if let Some((_, prop)) = self.property(name) {
            if prop.setter.is_some() {
                return Some(WritableMember::Property(prop));
            }
            return None;
        }
        self.field(name)
            .filter(|f| f.is_public && !f.is_readonly)
            .map(WritableMember::Field)
    }

    /// Get a declared method by index
    pub fn method(&self, index: usize) -> Option<&MethodInfo> {
        self.methods.get(index)
    }

    /// Class-level metadata of the given kind
    pub fn attributes_of(&self, kind: &ClassRef) -> Vec<&MetadataRecord> {
        self.attributes.iter().filter(|r| r.is(kind)).collect()
    }

    /// Structural summary, independent of class identity
    pub fn shape(&self) -> TypeShape {
        TypeShape {
            name: self.name.clone(),
            base: self.parent.as_ref().map(|p| p.name.clone()),
            properties: self
                .properties
                .iter()
                .map(|p| PropertyShape {
                    name: p.name.clone(),
                    ty: p.ty.name(),
                    readable: p.getter.is_some(),
                    writable: p.setter.is_some(),
                    attributes: p.attributes.iter().map(AttributeShape::from).collect(),
                })
                .collect(),
            constructors: self
                .constructors
                .iter()
                .map(|c| {
                    c.parameters
                        .iter()
                        .map(|p| ParameterShape {
                            name: p.name.clone(),
                            ty: p.ty.name(),
                            attributes: p.attributes.iter().map(AttributeShape::from).collect(),
                        })
                        .collect()
                })
                .collect(),
            attributes: self.attributes.iter().map(AttributeShape::from).collect(),
        }
    }
}

/// Serializable structural description of a class
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TypeShape {
    /// Class name
    pub name: String,
    /// Parent class name
    pub base: Option<String>,
    /// Declared properties
    pub properties: Vec<PropertyShape>,
    /// Constructor parameter lists
    pub constructors: Vec<Vec<ParameterShape>>,
    /// Class-level attributes
    pub attributes: Vec<AttributeShape>,
}

/// Property part of a [`TypeShape`]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PropertyShape {
    /// Property name
    pub name: String,
    /// Type name
    pub ty: String,
    /// Has a getter
    pub readable: bool,
    /// Has a setter
    pub writable: bool,
    /// Attached attributes
    pub attributes: Vec<AttributeShape>,
}

/// Parameter part of a [`TypeShape`]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParameterShape {
    /// Parameter name
    pub name: String,
    /// Type name
    pub ty: String,
    /// Attached attributes
    pub attributes: Vec<AttributeShape>,
}

/// Attribute part of a [`TypeShape`]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttributeShape {
    /// Attribute class name
    pub kind: String,
    /// Rendered constructor arguments
    pub args: Vec<String>,
    /// Rendered overrides
    pub overrides: Vec<(String, String)>,
}

impl From<&MetadataRecord> for AttributeShape {
    fn from(record: &MetadataRecord) -> Self {
        Self {
            kind: record.kind.name.clone(),
            args: record.args.iter().map(|a| a.to_string()).collect(),
            overrides: record
                .overrides
                .iter()
                .map(|(k, v)| (k.clone(), v.to_string()))
                .collect(),
        }
    }
}
