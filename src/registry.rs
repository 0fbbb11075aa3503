use alloc::{collections::BTreeMap, sync::Arc, vec::Vec};
use tracing::{debug, info, warn};

use crate::{
    any::{Instance, TypeInfo},
    component::{Caster, ClassDescriptor},
    errors::InvalidClassDefinition,
    key::BindingKey,
    scanner::{ClassMetadata, Scanner},
};

/// Class bound under a key, with the cast to the bound type
#[derive(Clone)]
pub struct BindingTarget {
    class: Arc<ClassMetadata>,
    provides: TypeInfo,
    caster: Caster,
}

impl BindingTarget {
    #[inline]
    #[must_use]
    pub fn class(&self) -> &Arc<ClassMetadata> {
        &self.class
    }

    #[inline]
    #[must_use]
    pub const fn provides(&self) -> TypeInfo {
        self.provides
    }

    #[inline]
    pub(crate) fn cast(&self, instance: &Instance) -> Option<Instance> {
        (self.caster)(instance)
    }
}

/// Result of an exact key lookup
pub enum Lookup<'a> {
    Single(&'a BindingTarget),
    /// More than one class is bound under the key, in registration order
    Multiple(&'a [BindingTarget]),
}

/// Immutable map from binding keys to the classes producing them
#[derive(Default)]
pub struct Registry {
    classes: Vec<Arc<ClassMetadata>>,
    bindings: BTreeMap<BindingKey, Vec<BindingTarget>>,
    by_type: BTreeMap<TypeInfo, Vec<BindingTarget>>,
}

impl Registry {
    #[inline]
    #[must_use]
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    /// Exact-match lookup: an identifier never falls back to the unqualified binding, nor the other way around
    #[must_use]
    pub fn lookup(&self, key: &BindingKey) -> Option<Lookup<'_>> {
        match self.bindings.get(key).map(Vec::as_slice) {
            None | Some([]) => None,
            Some([target]) => Some(Lookup::Single(target)),
            Some(targets) => Some(Lookup::Multiple(targets)),
        }
    }

    /// Every class bound under `type_info`, with or without identifier, in registration order
    #[must_use]
    pub fn lookup_all(&self, type_info: TypeInfo) -> &[BindingTarget] {
        self.by_type.get(&type_info).map(Vec::as_slice).unwrap_or_default()
    }

    #[inline]
    #[must_use]
    pub fn contains(&self, key: &BindingKey) -> bool {
        self.bindings.contains_key(key)
    }

    /// Metadata of a registered class by its own type
    #[must_use]
    pub fn get_class(&self, type_info: TypeInfo) -> Option<&Arc<ClassMetadata>> {
        self.classes.iter().find(|class| class.type_info() == type_info)
    }

    /// Registered classes in registration order
    pub fn classes(&self) -> impl Iterator<Item = &Arc<ClassMetadata>> + '_ {
        self.classes.iter()
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.classes.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    fn bind(&mut self, class: Arc<ClassMetadata>) {
        for binding in class.bindings() {
            let key = BindingKey::new(binding.provides, class.key().identifier);
            let target = BindingTarget {
                class: class.clone(),
                provides: binding.provides,
                caster: binding.caster.clone(),
            };

            let targets = self.bindings.entry(key).or_default();
            if !targets.is_empty() {
                debug!(provides = %binding.provides, "Appended to multi-binding");
            }
            targets.push(target.clone());
            self.by_type.entry(binding.provides).or_default().push(target);
        }
        self.classes.push(class);
    }
}

/// Collects class descriptions; [`RegistryBuilder::build`] scans them all before anything can be constructed
#[derive(Default)]
pub struct RegistryBuilder {
    descriptors: Vec<ClassDescriptor>,
}

impl RegistryBuilder {
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self { descriptors: Vec::new() }
    }

    #[inline]
    #[must_use]
    pub fn register(mut self, descriptor: impl Into<ClassDescriptor>) -> Self {
        self.add(descriptor);
        self
    }

    #[inline]
    pub fn add(&mut self, descriptor: impl Into<ClassDescriptor>) -> &mut Self {
        self.descriptors.push(descriptor.into());
        self
    }

    /// Scans every description in registration order and binds the resulting classes.
    /// The first invalid class aborts the build.
    pub fn build(self) -> Result<Registry, InvalidClassDefinition> {
        let mut scanner = Scanner::new();
        let mut registry = Registry::default();

        for descriptor in self.descriptors {
            let class = scanner.scan(descriptor)?;
            if registry.classes.iter().any(|registered| Arc::ptr_eq(registered, &class)) {
                warn!(class = %class.type_info(), "Class is registered more than once, skipping");
                continue;
            }
            registry.bind(class);
        }

        info!(classes = registry.classes.len(), bindings = registry.bindings.len(), "Registry built");
        Ok(registry)
    }
}
