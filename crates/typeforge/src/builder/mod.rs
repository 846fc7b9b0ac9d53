//! Runtime type synthesis
//!
//! A synthesized type goes through two states:
//!
//! 1. **Open**: a [`TypeDescriptor`] collects properties, attributes and the
//!    constructors forwarded from an optional base type.
//! 2. **Frozen**: [`realize`] compiles the descriptor into a [`Class`],
//!    registers it in its container and rejects further changes.
//!
//! [`TypeBuilder`] and [`TypedTypeBuilder`] are the fluent front ends; the
//! free functions underneath are usable on their own.
//!
//! [`Class`]: crate::class::Class

mod constructors;
mod descriptor;
mod metadata;
mod property;
mod realize;
mod type_builder;

pub use constructors::{forward_constructors, ForwardedConstructor};
pub use descriptor::{
    is_identifier, open, AttachTarget, BaseTypeBinding, PropertyDescriptor, PropertyId,
    TypeDescriptor,
};
pub use metadata::{attach, resolve_metadata};
pub use property::{backing_slot_name, define_property};
pub use realize::realize;
pub use type_builder::{PropertyBuilder, TypeBuilder, TypedTypeBuilder};
