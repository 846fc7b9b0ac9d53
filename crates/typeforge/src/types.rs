//! Declared types for slots, properties and parameters

use std::fmt;
use std::sync::Arc;

use crate::class::{Class, ClassRef};
use crate::value::Value;

/// A declared type
#[derive(Debug, Clone)]
pub enum TypeRef {
    /// Top type, accepts every value
    Any,
    /// Boolean
    Bool,
    /// 64-bit signed integer
    Int,
    /// 64-bit float
    Float,
    /// String
    Str,
    /// Runtime class (nominal)
    Class(ClassRef),
}

impl TypeRef {
    /// Create a class type
    pub fn class(class: &ClassRef) -> Self {
        TypeRef::Class(Arc::clone(class))
    }

    /// Exact runtime type of a value (`None` for null)
    pub fn of_value(value: &Value) -> Option<TypeRef> {
        match value {
            Value::Null => None,
            Value::Bool(_) => Some(TypeRef::Bool),
            Value::Int(_) => Some(TypeRef::Int),
            Value::Float(_) => Some(TypeRef::Float),
            Value::Str(_) => Some(TypeRef::Str),
            Value::Object(obj) => Some(TypeRef::Class(Arc::clone(obj.class()))),
        }
    }

    /// Type name as reported in error messages and shapes
    pub fn name(&self) -> String {
        match self {
            TypeRef::Any => "Object".to_string(),
            TypeRef::Bool => "Boolean".to_string(),
            TypeRef::Int => "Int64".to_string(),
            TypeRef::Float => "Double".to_string(),
            TypeRef::Str => "String".to_string(),
            TypeRef::Class(class) => class.name.clone(),
        }
    }

    /// Whether null is assignable
    pub fn is_reference(&self) -> bool {
        matches!(self, TypeRef::Any | TypeRef::Str | TypeRef::Class(_))
    }

    /// Assignability check: can `value` be stored in a slot of this type?
    pub fn accepts(&self, value: &Value) -> bool {
        match (self, value) {
            (TypeRef::Any, _) => true,
            (ty, Value::Null) => ty.is_reference(),
            (TypeRef::Bool, Value::Bool(_)) => true,
            (TypeRef::Int, Value::Int(_)) => true,
            (TypeRef::Float, Value::Float(_)) => true,
            (TypeRef::Str, Value::Str(_)) => true,
            (TypeRef::Class(expected), Value::Object(obj)) => obj.class().is_subclass_of(expected),
            _ => false,
        }
    }

    /// Exact signature match used for constructor resolution.
    ///
    /// Null arguments match any reference parameter.
    pub fn matches_exactly(&self, value: &Value) -> bool {
        match TypeRef::of_value(value) {
            Some(actual) => *self == actual,
            None => self.is_reference(),
        }
    }
}

impl PartialEq for TypeRef {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (TypeRef::Any, TypeRef::Any)
            | (TypeRef::Bool, TypeRef::Bool)
            | (TypeRef::Int, TypeRef::Int)
            | (TypeRef::Float, TypeRef::Float)
            | (TypeRef::Str, TypeRef::Str) => true,
            (TypeRef::Class(a), TypeRef::Class(b)) => Class::same(a, b),
            _ => false,
        }
    }
}

impl Eq for TypeRef {}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primitive_accepts() {
        assert!(TypeRef::Int.accepts(&Value::from(5)));
        assert!(!TypeRef::Int.accepts(&Value::from(5.0)));
        assert!(!TypeRef::Int.accepts(&Value::Null));
        assert!(TypeRef::Str.accepts(&Value::from("a")));
        assert!(TypeRef::Str.accepts(&Value::Null));
        assert!(TypeRef::Any.accepts(&Value::from(true)));
    }

    #[test]
    fn test_exact_match() {
        assert!(TypeRef::Str.matches_exactly(&Value::from("a")));
        assert!(!TypeRef::Any.matches_exactly(&Value::from("a")));
        assert!(TypeRef::Any.matches_exactly(&Value::Null));
        assert!(!TypeRef::Float.matches_exactly(&Value::from(1)));
    }

    #[test]
    fn test_names() {
        assert_eq!(TypeRef::Str.to_string(), "String");
        assert_eq!(TypeRef::Int.name(), "Int64");
        assert_eq!(TypeRef::of_value(&Value::from(1.0)), Some(TypeRef::Float));
        assert_eq!(TypeRef::of_value(&Value::Null), None);
    }
}
