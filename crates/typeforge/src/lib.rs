//! Typeforge
//!
//! Runtime type synthesis over a small dynamic object model:
//! - **Object model**: values, type references, classes and instances
//!   (`value`, `types`, `class`, `instance` modules)
//! - **Code**: accessor and constructor bodies as interpreted ops
//!   (`bytecode` module)
//! - **Registry**: containers of realized classes, host class declarations
//!   (`registry`, `declare` modules)
//! - **Builder**: synthesized types with slot-backed properties, validated
//!   attributes and forwarded base constructors (`builder` module)
//!
//! # Example
//!
//! ```rust,ignore
//! use typeforge::{TypeBuilder, TypeRef, Instance, Value};
//!
//! let mut builder = TypeBuilder::new("Person")?;
//! builder.property("Age", TypeRef::Int)?;
//! let person = builder.build()?;
//!
//! let mut instance = Instance::new(&person, &[])?;
//! instance.set("Age", Value::from(5))?;
//! assert_eq!(instance.get("Age")?, Value::Int(5));
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

// ============================================================================
// Object Model
// ============================================================================

/// Error types
pub mod error;

/// Runtime values
pub mod value;

/// Type references
pub mod types;

/// Realized classes and member metadata
pub mod class;

/// Accessor and constructor code
pub mod bytecode;

/// Class instances
pub mod instance;

// ============================================================================
// Registry
// ============================================================================

/// Synthesis options
pub mod config;

/// Class registry and containers
pub mod registry;

/// Host class declarations
pub mod declare;

// ============================================================================
// Synthesis
// ============================================================================

/// Runtime type builders
pub mod builder;

// ============================================================================
// Re-exports
// ============================================================================

pub use builder::{
    AttachTarget, PropertyBuilder, PropertyId, TypeBuilder, TypeDescriptor, TypedTypeBuilder,
};
pub use class::{
    AttributeShape, Class, ClassId, ClassKind, ClassRef, ConstructorInfo, MetadataRecord,
    PropertyInfo, PropertyShape, TypeShape, Visibility,
};
pub use config::SynthesisOptions;
pub use declare::{ClassDecl, CtorDecl};
pub use error::{TypeError, TypeResult};
pub use instance::Instance;
pub use registry::{ClassRegistry, Container};
pub use types::TypeRef;
pub use value::Value;
