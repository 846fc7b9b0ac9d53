//! Shared Default Container Tests
//!
//! Builders on several threads realize types into the process-wide
//! registry's default container at the same time, and the same name may be
//! realized there again and again. The global registry outlives every test
//! in the binary, so name lookups only use names unique to one test.
//!
//! # Running Tests
//! ```bash
//! cargo test --test global_registry_tests
//! ```

use std::sync::Arc;
use std::thread;

use typeforge::{
    Class, ClassDecl, ClassRegistry, CtorDecl, Instance, TypeBuilder, TypeRef, TypedTypeBuilder,
    Value,
};

#[test]
fn test_concurrent_builders_on_default_container() {
    let handles: Vec<_> = (0..8)
        .map(|worker| {
            thread::spawn(move || {
                (0..16)
                    .map(|n| {
                        let name = format!("Concurrent_{}_{}", worker, n);
                        let mut builder = TypeBuilder::new(&name).unwrap();
                        builder.property("Value", TypeRef::Int).unwrap();
                        builder.build().unwrap()
                    })
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    let mut built = Vec::new();
    for handle in handles {
        built.extend(handle.join().unwrap());
    }
    assert_eq!(built.len(), 128);

    let registry = ClassRegistry::global();
    for class in &built {
        assert_eq!(class.container, "DynamicAssembly");
        let found = registry.get_by_name(None, &class.name).unwrap();
        assert_eq!(found.id, class.id);
    }
}

#[test]
fn test_realized_types_shared_across_threads() {
    let mut builder = TypeBuilder::new("SharedAcrossThreads").unwrap();
    builder.property("Count", TypeRef::Int).unwrap();
    let class = builder.build().unwrap();

    let handles: Vec<_> = (0..4)
        .map(|i| {
            let class = class.clone();
            thread::spawn(move || {
                let mut instance = Instance::new(&class, &[]).unwrap();
                instance.set("Count", Value::from(i)).unwrap();
                instance.get("Count").unwrap()
            })
        })
        .collect();

    let mut seen: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    seen.sort_by_key(|v| v.as_int());
    assert_eq!(seen, vec![Value::Int(0), Value::Int(1), Value::Int(2), Value::Int(3)]);
}

#[test]
fn test_same_name_built_repeatedly_on_default_container() {
    let built: Vec<_> = (0..3)
        .map(|_| {
            let mut builder = TypeBuilder::new("RepeatedPoco").unwrap();
            builder.property("Age", TypeRef::Int).unwrap();
            builder.build().unwrap()
        })
        .collect();

    assert_ne!(built[0].id, built[1].id);
    assert_ne!(built[1].id, built[2].id);
    assert_eq!(built[0].shape(), built[2].shape());

    let mut instance = Instance::new(&built[1], &[]).unwrap();
    instance.set("Age", Value::from(5)).unwrap();
    assert_eq!(instance.get("Age").unwrap(), Value::Int(5));
}

#[test]
fn test_default_named_typed_builders_on_default_container() {
    let registry = ClassRegistry::global();
    let source = registry
        .declare(
            ClassDecl::new("DefaultNamedSource")
                .readonly_property("Property", TypeRef::Str)
                .constructor(
                    CtorDecl::new()
                        .param("property", TypeRef::Str)
                        .assign("property", "Property"),
                ),
        )
        .unwrap();
    assert_eq!(source.container, "DynamicAssembly");

    for _ in 0..2 {
        let mut builder = TypedTypeBuilder::new(&source).unwrap();
        builder.property("Property").unwrap();
        let copy = builder.build().unwrap();

        assert_eq!(copy.qualified_name(), "DynamicAssembly::DefaultNamedSource");
        assert!(!Arc::ptr_eq(&copy, &source));
        assert!(!copy.is_subclass_of(&source));
        assert_eq!(copy.declared_property("Property").unwrap().ty, TypeRef::Str);
    }

    let mut builder = TypedTypeBuilder::open(&registry, &source, None, None, true).unwrap();
    builder.property("Property").unwrap();
    let derived = builder.build().unwrap();

    assert_eq!(derived.name, "DefaultNamedSource");
    assert!(derived.is_subclass_of(&source));
    assert!(!Class::same(&derived, &source));
    let instance = Instance::new(&derived, &[Value::from("base value")]).unwrap();
    assert!(instance.is_instance_of(&source));

    // The original declaration stays reachable by id
    assert!(Arc::ptr_eq(&registry.get(source.id).unwrap(), &source));
}
