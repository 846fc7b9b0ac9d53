//! Type synthesis errors

use thiserror::Error;

/// Errors raised while declaring, synthesizing or using runtime types.
///
/// Every error aborts only the operation that raised it. A builder that
/// returned an error is still usable.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum TypeError {
    /// Attribute kind is not externally visible
    #[error("Attribute of type {kind} is not public. Cannot use it to extend type property. (Parameter '{param}')")]
    InvalidMetadataVisibility {
        /// Attribute kind name
        kind: String,
        /// Parameter at fault
        param: &'static str,
    },

    /// Attribute kind has no constructor with the supplied argument types
    #[error("{}", no_matching_constructor(kind, arg_types, param))]
    NoMatchingConstructor {
        /// Class or attribute kind name
        kind: String,
        /// Runtime type names of the supplied arguments
        arg_types: Vec<String>,
        /// Parameter at fault
        param: &'static str,
    },

    /// One or more override keys do not name a writable member
    #[error("Attribute of type: {kind} has no properties with names: {}. (Parameter '{param}')", members.join(", "))]
    UnknownMetadataMember {
        /// Attribute kind name
        kind: String,
        /// Every key that failed to resolve
        members: Vec<String>,
        /// Parameter at fault
        param: &'static str,
    },

    /// A value is not assignable to the declared type of its target
    #[error("Type mismatch for '{member}': expected {expected}, got {actual}")]
    TypeMismatch {
        /// Member, slot or parameter receiving the value
        member: String,
        /// Declared type
        expected: String,
        /// Runtime type of the value
        actual: String,
    },

    /// The typed builder's selector names a property the base type lacks
    #[error("Type {type_name} has no property with name: {property}. (Parameter '{param}')")]
    UnknownSourceProperty {
        /// Bound base type name
        type_name: String,
        /// Selected property name
        property: String,
        /// Parameter at fault
        param: &'static str,
    },

    /// Metadata kind is not an attribute class
    #[error("Type {kind} is not an attribute type")]
    NotAnAttribute {
        /// Offending class name
        kind: String,
    },

    /// Type or property name is not a valid identifier
    #[error("Invalid identifier: '{name}'")]
    InvalidIdentifier {
        /// Rejected name
        name: String,
    },

    /// Property already defined on the type under construction
    #[error("Property '{property}' is already defined on type {type_name}")]
    DuplicateProperty {
        /// Type under construction
        type_name: String,
        /// Duplicate property name
        property: String,
    },

    /// Mutation attempted on a type that has been built
    #[error("Cannot modify type {type_name}: it has already been built")]
    Frozen {
        /// Frozen type name
        type_name: String,
    },

    /// `build()` called twice on the same builder
    #[error("Type {type_name} has already been built")]
    AlreadyBuilt {
        /// Built type name
        type_name: String,
    },

    /// Property or field does not exist, or lacks the requested accessor
    #[error("Type {type_name} has no accessible member '{member}'")]
    UnknownMember {
        /// Class name
        type_name: String,
        /// Member name
        member: String,
    },

    /// Qualified class name could not be resolved
    #[error("Unknown class: {name}")]
    UnknownClass {
        /// Name that failed to resolve
        name: String,
    },

    /// Malformed constructor or accessor body
    #[error("Invalid bytecode in {context}: {reason}")]
    InvalidBytecode {
        /// Method being executed
        context: String,
        /// What went wrong
        reason: String,
    },
}

fn no_matching_constructor(kind: &str, arg_types: &[String], param: &str) -> String {
    if arg_types.is_empty() {
        format!("Attribute of type: {kind} has no constructor without parameters. (Parameter '{param}')")
    } else {
        format!(
            "Attribute of type: {kind} has no constructor with parameters of types: {}. (Parameter '{param}')",
            arg_types.join(", ")
        )
    }
}

/// Result alias for type synthesis operations
pub type TypeResult<T> = Result<T, TypeError>;
