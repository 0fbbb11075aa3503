use alloc::{sync::Arc, vec::Vec};
use core::marker::PhantomData;
use tracing::warn;

use crate::{
    any::{Instance, TypeInfo},
    dependency_resolver::DependencyResolver,
    field::{Field, FieldInjector},
    instantiator::{wrap_instance, Constructor, Instantiator, Wrapper},
    key::Identifier,
    post_construct::{Hook, PostConstruct},
    scope::Lifetime,
};

/// Casts the shared instance of a class to one of the types it is bound under
pub(crate) type Caster = Arc<dyn Fn(&Instance) -> Option<Instance> + Send + Sync>;

/// Type a class is bound under, with the cast producing it
#[derive(Clone)]
pub(crate) struct Binding {
    pub(crate) provides: TypeInfo,
    pub(crate) caster: Caster,
}

/// Raw description of a class, as registered.
/// Checked and turned into [`ClassMetadata`](crate::ClassMetadata) by the [`Scanner`](crate::Scanner).
pub struct ClassDescriptor {
    pub(crate) type_info: TypeInfo,
    pub(crate) constructors: Vec<Constructor>,
    pub(crate) default_constructor: Option<Constructor>,
    pub(crate) fields: Vec<Field>,
    pub(crate) post_constructs: Vec<Hook>,
    pub(crate) identifier: Option<Identifier>,
    pub(crate) lifetime: Lifetime,
    pub(crate) is_main: bool,
    pub(crate) bindings: Vec<Binding>,
    pub(crate) wrapper: Wrapper,
}

impl ClassDescriptor {
    #[inline]
    #[must_use]
    pub const fn type_info(&self) -> TypeInfo {
        self.type_info
    }
}

/// Starts the description of class `T`
#[inline]
#[must_use]
pub fn component<T: Send + Sync + 'static>() -> ComponentBuilder<T> {
    ComponentBuilder::new()
}

/// Declarative description of a class: its injection points, identifier, lifetime
/// and the interface types it is bound under.
///
/// ```
/// use modinject::{component, Inject};
///
/// struct Config;
/// struct Service {
///     config: Option<std::sync::Arc<Config>>,
///     ready: bool,
/// }
///
/// let descriptor = component::<Service>()
///     .constructor(|| Ok(Service { config: None, ready: false }))
///     .field("config", |service: &mut Service, Inject(config): Inject<Config>| service.config = Some(config))
///     .post_construct("initialize", |service: &mut Service| {
///         service.ready = true;
///         Ok(())
///     })
///     .build();
/// ```
pub struct ComponentBuilder<T> {
    descriptor: ClassDescriptor,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Send + Sync + 'static> ComponentBuilder<T> {
    #[must_use]
    pub fn new() -> Self {
        let identity = Binding {
            provides: TypeInfo::of::<T>(),
            caster: Arc::new(|instance: &Instance| Some(instance.clone())),
        };

        Self {
            descriptor: ClassDescriptor {
                type_info: TypeInfo::of::<T>(),
                constructors: Vec::new(),
                default_constructor: None,
                fields: Vec::new(),
                post_constructs: Vec::new(),
                identifier: None,
                lifetime: Lifetime::default(),
                is_main: false,
                bindings: alloc::vec![identity],
                wrapper: wrap_instance::<T>,
            },
            _marker: PhantomData,
        }
    }

    /// Marks a constructor as the injection point of the class.
    /// Dependencies are resolved in parameter declaration order.
    #[inline]
    #[allow(private_bounds)]
    #[must_use]
    pub fn constructor<Inst, Deps>(mut self, instantiator: Inst) -> Self
    where
        Inst: Instantiator<Deps, Provides = T, Error = anyhow::Error> + Send + Sync,
        Deps: DependencyResolver,
    {
        self.descriptor.constructors.push(Constructor::new(instantiator));
        self
    }

    /// Zero-argument fallback, used only when no constructor is marked as the injection point
    #[inline]
    #[must_use]
    pub fn default_constructor(mut self) -> Self
    where
        T: Default,
    {
        self.descriptor.default_constructor = Some(Constructor::new(|| Ok::<_, anyhow::Error>(T::default())));
        self
    }

    /// Declares an injectable field. Fields are injected in declaration order, after construction.
    #[inline]
    #[allow(private_bounds)]
    #[must_use]
    pub fn field<Inj, Deps>(mut self, name: &'static str, injector: Inj) -> Self
    where
        Inj: FieldInjector<T, Deps> + Send + Sync,
        Deps: DependencyResolver,
    {
        self.descriptor.fields.push(Field::new::<T, Inj, Deps>(name, injector));
        self
    }

    /// Declares a post-construct hook. Hooks run in declaration order, after field injection.
    #[inline]
    #[allow(private_bounds)]
    #[must_use]
    pub fn post_construct<H, Deps>(mut self, name: &'static str, hook: H) -> Self
    where
        H: PostConstruct<T, Deps, Error = anyhow::Error> + Send + Sync,
        Deps: DependencyResolver,
    {
        self.descriptor.post_constructs.push(Hook::new::<T, H, Deps>(name, hook));
        self
    }

    /// Qualifies every binding of the class with `identifier`
    #[inline]
    #[must_use]
    pub fn identifier(mut self, identifier: impl Into<Identifier>) -> Self {
        self.descriptor.identifier = Some(identifier.into());
        self
    }

    #[inline]
    #[must_use]
    pub fn scoped(self) -> Self {
        self.lifetime(Lifetime::Scoped)
    }

    #[inline]
    #[must_use]
    pub fn transient(self) -> Self {
        self.lifetime(Lifetime::Transient)
    }

    #[inline]
    #[must_use]
    pub fn lifetime(mut self, lifetime: Lifetime) -> Self {
        self.descriptor.lifetime = lifetime;
        self
    }

    /// Marks the class as the root of the mod, built by [`Container::bootstrap`](crate::Container::bootstrap)
    #[inline]
    #[must_use]
    pub fn main(mut self) -> Self {
        self.descriptor.is_main = true;
        self
    }

    /// Binds the class under interface type `I` as well, e.g.
    /// `.provides::<dyn Storage>(|storage| storage)`
    #[must_use]
    pub fn provides<I>(mut self, cast: fn(Arc<T>) -> Arc<I>) -> Self
    where
        I: ?Sized + Send + Sync + 'static,
    {
        let provides = TypeInfo::of::<I>();
        if self.descriptor.bindings.iter().any(|binding| binding.provides == provides) {
            warn!(class = %self.descriptor.type_info, provides = %provides, "Class is already bound under this type, skipping");
            return self;
        }

        self.descriptor.bindings.push(Binding {
            provides,
            caster: Arc::new(move |instance: &Instance| {
                instance
                    .downcast_ref::<Arc<T>>()
                    .map(|concrete| Arc::new(cast(concrete.clone())) as Instance)
            }),
        });
        self
    }

    #[inline]
    #[must_use]
    pub fn build(self) -> ClassDescriptor {
        self.descriptor
    }
}

impl<T: Send + Sync + 'static> Default for ComponentBuilder<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> From<ComponentBuilder<T>> for ClassDescriptor {
    fn from(builder: ComponentBuilder<T>) -> Self {
        builder.descriptor
    }
}
