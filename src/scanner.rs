use alloc::{collections::BTreeMap, sync::Arc, vec::Vec};
use tracing::{debug, debug_span, error, warn};

use crate::{
    any::TypeInfo,
    component::{Binding, ClassDescriptor},
    dependency_resolver::InjectionPoint,
    errors::InvalidClassDefinition,
    field::Field,
    instantiator::{Constructor, Wrapper},
    key::{BindingKey, Identifier},
    post_construct::Hook,
    scope::Lifetime,
};

/// Checked, immutable description of a class. Built once per type by the [`Scanner`].
pub struct ClassMetadata {
    type_info: TypeInfo,
    identifier: Option<Identifier>,
    lifetime: Lifetime,
    is_main: bool,
    constructor: Constructor,
    fields: Vec<Field>,
    post_constructs: Vec<Hook>,
    bindings: Vec<Binding>,
    wrapper: Wrapper,
}

impl ClassMetadata {
    #[inline]
    #[must_use]
    pub const fn type_info(&self) -> TypeInfo {
        self.type_info
    }

    #[inline]
    #[must_use]
    pub fn identifier(&self) -> Option<&str> {
        self.identifier.as_deref()
    }

    #[inline]
    #[must_use]
    pub const fn lifetime(&self) -> Lifetime {
        self.lifetime
    }

    #[inline]
    #[must_use]
    pub const fn is_main(&self) -> bool {
        self.is_main
    }

    /// Key of the class itself: its concrete type and declared identifier
    #[inline]
    #[must_use]
    pub fn key(&self) -> BindingKey {
        BindingKey::new(self.type_info, self.identifier.clone())
    }

    #[inline]
    #[must_use]
    pub fn constructor_parameters(&self) -> &[InjectionPoint] {
        &self.constructor.parameters
    }

    /// Field names with their injection points, in declaration order
    pub fn injected_fields(&self) -> impl Iterator<Item = (&'static str, &[InjectionPoint])> + '_ {
        self.fields.iter().map(|field| (field.name, field.points.as_slice()))
    }

    /// Post-construct hook names, in call order
    pub fn post_construct_methods(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.post_constructs.iter().map(|hook| hook.name)
    }

    /// Types the class is bound under, its own type first
    pub fn provided_types(&self) -> impl Iterator<Item = TypeInfo> + '_ {
        self.bindings.iter().map(|binding| binding.provides)
    }

    #[inline]
    pub(crate) const fn constructor(&self) -> &Constructor {
        &self.constructor
    }

    #[inline]
    pub(crate) fn fields(&self) -> &[Field] {
        &self.fields
    }

    #[inline]
    pub(crate) fn post_constructs(&self) -> &[Hook] {
        &self.post_constructs
    }

    #[inline]
    pub(crate) fn bindings(&self) -> &[Binding] {
        &self.bindings
    }

    #[inline]
    pub(crate) const fn wrapper(&self) -> Wrapper {
        self.wrapper
    }
}

/// Validates class descriptions and caches the resulting metadata per type
#[derive(Default)]
pub struct Scanner {
    cache: BTreeMap<TypeInfo, Arc<ClassMetadata>>,
}

impl Scanner {
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self { cache: BTreeMap::new() }
    }

    /// Returns the metadata of the described class.
    ///
    /// A type is scanned once: later calls return the cached metadata and ignore the new description.
    pub fn scan(&mut self, descriptor: impl Into<ClassDescriptor>) -> Result<Arc<ClassMetadata>, InvalidClassDefinition> {
        let descriptor = descriptor.into();

        let span = debug_span!("scan", class = %descriptor.type_info);
        let _guard = span.enter();

        if let Some(metadata) = self.cache.get(&descriptor.type_info) {
            debug!("Found in cache");
            return Ok(metadata.clone());
        }
        debug!("Not found in cache");

        let metadata = Arc::new(check(descriptor).inspect_err(|err| error!("{}", err))?);
        self.cache.insert(metadata.type_info, metadata.clone());

        debug!("Scanned");
        Ok(metadata)
    }

    #[inline]
    #[must_use]
    pub fn get(&self, type_info: TypeInfo) -> Option<&Arc<ClassMetadata>> {
        self.cache.get(&type_info)
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.cache.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }
}

fn check(descriptor: ClassDescriptor) -> Result<ClassMetadata, InvalidClassDefinition> {
    let ClassDescriptor {
        type_info,
        mut constructors,
        default_constructor,
        fields,
        post_constructs,
        identifier,
        mut lifetime,
        is_main,
        bindings,
        wrapper,
    } = descriptor;

    if identifier.as_deref().is_some_and(str::is_empty) {
        return Err(InvalidClassDefinition::EmptyIdentifier { class: type_info });
    }

    let constructor = match (constructors.len(), default_constructor) {
        (1, _) => constructors.remove(0),
        (0, Some(default_constructor)) => {
            debug!("No injectable constructor, using the default one");
            default_constructor
        }
        (0, None) => return Err(InvalidClassDefinition::NoInjectableConstructor { class: type_info }),
        (count, _) => return Err(InvalidClassDefinition::MultipleInjectableConstructors { class: type_info, count }),
    };

    if let Some(hook) = post_constructs.iter().find(|hook| !hook.parameters.is_empty()) {
        return Err(InvalidClassDefinition::ParameterizedPostConstruct {
            class: type_info,
            method: hook.name,
            parameters: hook.parameters.len(),
        });
    }

    if is_main && !lifetime.is_scoped() {
        warn!("Main class can't be transient, treating it as scoped");
        lifetime = Lifetime::Scoped;
    }

    Ok(ClassMetadata {
        type_info,
        identifier,
        lifetime,
        is_main,
        constructor,
        fields,
        post_constructs,
        bindings,
        wrapper,
    })
}
