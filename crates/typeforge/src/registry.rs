//! Class registry and containers
//!
//! The registry owns every realized class and groups them into containers.
//! A container is a naming scope. Every realization gets its own class
//! identity, so the same name may be realized any number of times in one
//! container; lookup by name yields the most recent one. Types opened
//! without a container land in the registry's default container.
//!
//! A process-wide registry is created on first use by
//! [`ClassRegistry::global`] and lives for the rest of the process. All
//! access goes through an internal lock, so builders on different threads
//! may realize types into the shared default container concurrently.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, LazyLock};

use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use tracing::debug;

use crate::class::{Class, ClassId, ClassParts, ClassRef};
use crate::config::SynthesisOptions;
use crate::error::{TypeError, TypeResult};

static GLOBAL_REGISTRY: LazyLock<Arc<ClassRegistry>> =
    LazyLock::new(|| Arc::new(ClassRegistry::new()));

/// Named scope holding realized classes
#[derive(Debug, Default)]
pub struct Container {
    /// Container name
    pub name: String,
    /// Type name to the latest class realized under it
    types: FxHashMap<String, ClassRef>,
    /// Types in realization order
    order: Vec<ClassRef>,
}

impl Container {
    fn new(name: String) -> Self {
        Self {
            name,
            types: FxHashMap::default(),
            order: Vec::new(),
        }
    }

    /// Latest type realized under `name`
    pub fn get(&self, name: &str) -> Option<&ClassRef> {
        self.types.get(name)
    }

    /// Check if a type name is taken
    pub fn contains(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    /// All types, in realization order
    pub fn types(&self) -> &[ClassRef] {
        &self.order
    }
}

#[derive(Debug, Default)]
struct RegistryInner {
    /// Classes indexed by ID
    classes: Vec<ClassRef>,
    /// Containers by name
    containers: FxHashMap<String, Container>,
}

/// Registry of realized classes
#[derive(Debug)]
pub struct ClassRegistry {
    options: SynthesisOptions,
    next_id: AtomicUsize,
    inner: RwLock<RegistryInner>,
}

impl ClassRegistry {
    /// Create a new empty registry with default options
    pub fn new() -> Self {
        Self::with_options(SynthesisOptions::default())
    }

    /// Create a new empty registry with specific options
    pub fn with_options(options: SynthesisOptions) -> Self {
        Self {
            options,
            next_id: AtomicUsize::new(0),
            inner: RwLock::new(RegistryInner::default()),
        }
    }

    /// The process-wide registry
    pub fn global() -> Arc<ClassRegistry> {
        Arc::clone(&GLOBAL_REGISTRY)
    }

    /// Registry options
    pub fn options(&self) -> &SynthesisOptions {
        &self.options
    }

    /// Resolve an optional container name to the one actually used
    pub fn container_name(&self, container: Option<&str>) -> String {
        container
            .unwrap_or(&self.options.default_container)
            .to_string()
    }

    /// Allocate the next class ID
    pub(crate) fn allocate_id(&self) -> ClassId {
        ClassId(self.next_id.fetch_add(1, Ordering::Relaxed))
    }

    /// Freeze `parts` into a class and register it in its container.
    ///
    /// An earlier class with the same name stays registered and reachable by
    /// id, but name lookup now yields the new one.
    pub(crate) fn register(&self, parts: ClassParts) -> ClassRef {
        let mut inner = self.inner.write();

        let class: ClassRef = Arc::new(Class::from_parts(parts));
        let container = inner
            .containers
            .entry(class.container.clone())
            .or_insert_with(|| Container::new(class.container.clone()));
        let shadowed = container
            .types
            .insert(class.name.clone(), Arc::clone(&class))
            .is_some();
        container.order.push(Arc::clone(&class));
        inner.classes.push(Arc::clone(&class));

        debug!(
            class = %class.qualified_name(),
            id = class.id.0,
            slots = class.slot_count(),
            shadowed,
            "Class registered"
        );

        class
    }

    /// Get class by ID
    pub fn get(&self, id: ClassId) -> Option<ClassRef> {
        self.inner
            .read()
            .classes
            .iter()
            .find(|c| c.id == id)
            .cloned()
    }

    /// Latest class realized under `name` within a container (default
    /// container if `None`)
    pub fn get_by_name(&self, container: Option<&str>, name: &str) -> Option<ClassRef> {
        let container = self.container_name(container);
        self.inner
            .read()
            .containers
            .get(&container)
            .and_then(|c| c.get(name))
            .cloned()
    }

    /// Resolve `container::Name`, or a bare `Name` in the default container
    pub fn resolve(&self, qualified: &str) -> TypeResult<ClassRef> {
        let found = match qualified.rsplit_once("::") {
            Some((container, name)) => self.get_by_name(Some(container), name),
            None => self.get_by_name(None, qualified),
        };
        found.ok_or_else(|| TypeError::UnknownClass {
            name: qualified.to_string(),
        })
    }

    /// Types in a container, in realization order
    pub fn container_types(&self, container: &str) -> Vec<ClassRef> {
        self.inner
            .read()
            .containers
            .get(container)
            .map(|c| c.types().to_vec())
            .unwrap_or_default()
    }

    /// Names of all containers
    pub fn containers(&self) -> Vec<String> {
        let mut names: Vec<String> = self.inner.read().containers.keys().cloned().collect();
        names.sort();
        names
    }

    /// Number of registered classes
    pub fn len(&self) -> usize {
        self.inner.read().classes.len()
    }

    /// Check if registry is empty
    pub fn is_empty(&self) -> bool {
        self.inner.read().classes.is_empty()
    }
}

impl Default for ClassRegistry {
    fn default() -> Self {
        Self::new()
    }
}
