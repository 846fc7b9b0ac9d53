//! Constructor forwarding for derived synthesized types

use tracing::trace;

use crate::bytecode;
use crate::class::{ConstructorInfo, ParameterInfo};

use super::descriptor::BaseTypeBinding;

/// A constructor on the new type that passes its arguments, unchanged and in
/// order, to a base constructor
#[derive(Debug, Clone)]
pub struct ForwardedConstructor {
    /// Parameter list copied from the base constructor (names, types and
    /// attributes)
    pub parameters: Vec<ParameterInfo>,
    /// Index of the target constructor on the base type
    pub base_constructor: usize,
}

impl ForwardedConstructor {
    /// Compile to a constructor whose body is a single base call
    pub fn compile(&self) -> ConstructorInfo {
        ConstructorInfo {
            parameters: self.parameters.clone(),
            code: bytecode::forwarding_constructor(self.base_constructor, self.parameters.len()),
        }
    }
}

/// Mirror every constructor declared on the bound base type
pub fn forward_constructors(binding: &BaseTypeBinding) -> Vec<ForwardedConstructor> {
    binding
        .constructors
        .iter()
        .enumerate()
        .map(|(index, ctor)| {
            trace!(
                base = %binding.base.name,
                constructor = index,
                params = ctor.parameters.len(),
                "Forwarding constructor"
            );
            ForwardedConstructor {
                parameters: ctor.parameters.clone(),
                base_constructor: index,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bytecode::Op;
    use crate::declare::{ClassDecl, CtorDecl};
    use crate::registry::ClassRegistry;
    use crate::types::TypeRef;

    fn binding(registry: &ClassRegistry, decl: ClassDecl) -> BaseTypeBinding {
        let base = registry.declare(decl).unwrap();
        BaseTypeBinding {
            constructors: base.constructors.clone(),
            base,
        }
    }

    #[test]
    fn test_forward_all_constructors() {
        let registry = ClassRegistry::new();
        let binding = binding(
            &registry,
            ClassDecl::new("Point")
                .field("X", TypeRef::Int)
                .field("Y", TypeRef::Int)
                .constructor(CtorDecl::new())
                .constructor(
                    CtorDecl::new()
                        .param("x", TypeRef::Int)
                        .param("y", TypeRef::Int)
                        .assign("x", "X")
                        .assign("y", "Y"),
                ),
        );

        let forwarded = forward_constructors(&binding);
        assert_eq!(forwarded.len(), 2);
        assert!(forwarded[0].parameters.is_empty());
        assert_eq!(forwarded[1].base_constructor, 1);

        let names: Vec<_> = forwarded[1].parameters.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["x", "y"]);
        assert_eq!(forwarded[1].parameters[0].ty, TypeRef::Int);

        let compiled = forwarded[1].compile();
        assert_eq!(
            compiled.code,
            vec![
                Op::LoadArg(0),
                Op::LoadArg(1),
                Op::CallBase { constructor: 1, argc: 2 },
                Op::Return,
            ]
        );
    }

    #[test]
    fn test_no_constructors_forwarded_from_constructorless_base() {
        let registry = ClassRegistry::new();
        let binding = binding(&registry, ClassDecl::new("Empty"));
        assert!(forward_constructors(&binding).is_empty());
    }

    #[test]
    fn test_parameter_attributes_forwarded() {
        let registry = ClassRegistry::new();
        let not_null = registry
            .declare(ClassDecl::attribute("NotNull").constructor(CtorDecl::new()))
            .unwrap();
        let binding = binding(
            &registry,
            ClassDecl::new("Named")
                .readonly_property("Name", TypeRef::Str)
                .constructor(
                    CtorDecl::new()
                        .param("name", TypeRef::Str)
                        .param_attribute("name", &not_null, &[])
                        .assign("name", "Name"),
                ),
        );

        let compiled = forward_constructors(&binding)[0].compile();
        let param = &compiled.parameters[0];
        assert_eq!(param.name, "name");
        assert_eq!(param.attributes.len(), 1);
        assert!(param.attributes[0].is(&not_null));
    }
}
