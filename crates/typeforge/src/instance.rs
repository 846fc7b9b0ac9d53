//! Instances of realized classes

use std::sync::Arc;

use crate::bytecode::{self, Receiver};
use crate::class::{Class, ClassRef, WritableMember};
use crate::error::{TypeError, TypeResult};
use crate::types::TypeRef;
use crate::value::Value;

/// Instance of a runtime class: class handle plus slot storage
#[derive(Debug, Clone)]
pub struct Instance {
    class: ClassRef,
    slots: Vec<Value>,
}

fn default_value(ty: &TypeRef) -> Value {
    match ty {
        TypeRef::Bool => Value::Bool(false),
        TypeRef::Int => Value::Int(0),
        TypeRef::Float => Value::Float(0.0),
        _ => Value::Null,
    }
}

fn no_matching_constructor(class: &Class, args: &[Value]) -> TypeError {
    TypeError::NoMatchingConstructor {
        kind: class.name.clone(),
        arg_types: args.iter().map(Value::type_name).collect(),
        param: "args",
    }
}

impl Instance {
    fn blank(class: &ClassRef) -> Self {
        Self {
            class: Arc::clone(class),
            slots: class.slots.iter().map(|s| default_value(&s.ty)).collect(),
        }
    }

    /// Create an instance, picking the first constructor whose parameter list
    /// accepts `args`.
    ///
    /// A class without constructors gets an implicit parameterless one.
    pub fn new(class: &ClassRef, args: &[Value]) -> TypeResult<Self> {
        if class.constructors.is_empty() {
            if !args.is_empty() {
                return Err(no_matching_constructor(class, args));
            }
            let mut instance = Self::blank(class);
            run_implicit_constructor(class, &mut instance)?;
            return Ok(instance);
        }

        let index = class
            .constructors
            .iter()
            .position(|c| c.accepts(args))
            .ok_or_else(|| no_matching_constructor(class, args))?;
        Self::construct(class, index, args)
    }

    /// Create an instance with a specific constructor
    pub(crate) fn construct(class: &ClassRef, index: usize, args: &[Value]) -> TypeResult<Self> {
        let ctor = class
            .constructors
            .get(index)
            .ok_or_else(|| no_matching_constructor(class, args))?;
        if !ctor.accepts(args) {
            return Err(no_matching_constructor(class, args));
        }
        let mut instance = Self::blank(class);
        let context = format!("{}::.ctor", class.name);
        bytecode::execute(
            class,
            &context,
            &ctor.code,
            Receiver::Exclusive(&mut instance),
            args,
        )?;
        Ok(instance)
    }

    /// The instance's class
    pub fn class(&self) -> &ClassRef {
        &self.class
    }

    /// Check class membership (including subclasses)
    pub fn is_instance_of(&self, class: &Class) -> bool {
        self.class.is_subclass_of(class)
    }

    /// Raw slot value
    pub fn slot(&self, index: usize) -> Option<&Value> {
        self.slots.get(index)
    }

    /// Type-checked slot store
    pub(crate) fn store_slot(&mut self, index: usize, value: Value) -> TypeResult<()> {
        let slot = self.class.slots.get(index).ok_or_else(|| TypeError::InvalidBytecode {
            context: self.class.name.clone(),
            reason: format!("slot {} out of range", index),
        })?;
        if !slot.ty.accepts(&value) {
            return Err(TypeError::TypeMismatch {
                member: slot.name.clone(),
                expected: slot.ty.name(),
                actual: value.type_name(),
            });
        }
        self.slots[index] = value;
        Ok(())
    }

    fn unknown_member(&self, member: &str) -> TypeError {
        TypeError::UnknownMember {
            type_name: self.class.name.clone(),
            member: member.to_string(),
        }
    }

    /// Read a property through its getter
    pub fn get(&self, property: &str) -> TypeResult<Value> {
        let (owner, prop) = self
            .class
            .property(property)
            .ok_or_else(|| self.unknown_member(property))?;
        let getter = prop
            .getter
            .and_then(|i| owner.method(i))
            .ok_or_else(|| self.unknown_member(property))?;
        let context = format!("{}::{}", owner.name, getter.name);
        let value = bytecode::execute(owner, &context, &getter.code, Receiver::Shared(self), &[])?;
        Ok(value.unwrap_or(Value::Null))
    }

    /// Write a property through its setter
    pub fn set(&mut self, property: &str, value: Value) -> TypeResult<()> {
        let class = Arc::clone(&self.class);
        let (owner, prop) = class
            .property(property)
            .ok_or_else(|| self.unknown_member(property))?;
        let setter = prop
            .setter
            .and_then(|i| owner.method(i))
            .ok_or_else(|| self.unknown_member(property))?;
        if !prop.ty.accepts(&value) {
            return Err(TypeError::TypeMismatch {
                member: property.to_string(),
                expected: prop.ty.name(),
                actual: value.type_name(),
            });
        }
        let context = format!("{}::{}", owner.name, setter.name);
        bytecode::execute(
            owner,
            &context,
            &setter.code,
            Receiver::Exclusive(self),
            &[value],
        )?;
        Ok(())
    }

    /// Read a named field
    pub fn field(&self, name: &str) -> TypeResult<Value> {
        let field = self
            .class
            .field(name)
            .ok_or_else(|| self.unknown_member(name))?;
        Ok(self.slots[field.slot].clone())
    }

    /// Assign a writable member: a property with a setter or a public,
    /// non-readonly field
    pub fn set_member(&mut self, name: &str, value: Value) -> TypeResult<()> {
        let class = Arc::clone(&self.class);
        match class.writable_member(name) {
            Some(WritableMember::Property(_)) => self.set(name, value),
            Some(WritableMember::Field(field)) => self.store_slot(field.slot, value),
            None => Err(self.unknown_member(name)),
        }
    }
}

/// Run the nearest ancestor's parameterless constructor, if any ancestor
/// declares constructors at all
fn run_implicit_constructor(class: &Class, instance: &mut Instance) -> TypeResult<()> {
    let mut current = class.parent.as_deref();
    while let Some(parent) = current {
        if parent.constructors.is_empty() {
            current = parent.parent.as_deref();
            continue;
        }
        let ctor = parent
            .constructors
            .iter()
            .find(|c| c.parameters.is_empty())
            .ok_or_else(|| no_matching_constructor(parent, &[]))?;
        let context = format!("{}::.ctor", parent.name);
        bytecode::execute(parent, &context, &ctor.code, Receiver::Exclusive(instance), &[])?;
        break;
    }
    Ok(())
}
