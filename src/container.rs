use alloc::sync::Arc;
use core::sync::atomic::{AtomicBool, Ordering};
use parking_lot::{Mutex, ReentrantMutex};
use tracing::{debug, error, info, info_span};

use crate::{
    any::TypeInfo,
    bean_list::BeanList,
    config::Config,
    errors::{BootstrapErrorKind, ResolveErrorKind},
    key::{BindingKey, Identifier},
    registry::{Lookup, Registry},
    resolver::{Frame, Resolution},
    scope::ScopeStore,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// Created, bootstrap not finished yet
    Initializing,
    /// Main class built, ready to resolve
    Running,
    /// Bootstrap failed; every later request fails too
    Failed,
}

struct ContainerInner {
    mod_id: &'static str,
    registry: Registry,
    store: ScopeStore,
    config: Config,
    status: Mutex<Status>,
    started: AtomicBool,
    /// Serializes root requests, so a scoped class is never built twice.
    /// Requests nested in a constructor re-enter on the same thread and share the frame.
    resolution_lock: ReentrantMutex<Frame>,
}

/// Dependency container of one mod: owns the registry and the scope store.
///
/// Cheap to clone, clones share the same instances.
#[derive(Clone)]
pub struct Container {
    inner: Arc<ContainerInner>,
}

impl Container {
    #[inline]
    #[must_use]
    pub fn new(mod_id: &'static str, registry: Registry) -> Self {
        Self::new_with_config(mod_id, registry, Config::default())
    }

    #[must_use]
    pub fn new_with_config(mod_id: &'static str, registry: Registry, config: Config) -> Self {
        Self {
            inner: Arc::new(ContainerInner {
                mod_id,
                registry,
                store: ScopeStore::new(),
                config,
                status: Mutex::new(Status::Initializing),
                started: AtomicBool::new(false),
                resolution_lock: ReentrantMutex::new(Frame::default()),
            }),
        }
    }

    /// Builds and initializes the main class of the mod. Called once, at mod start.
    ///
    /// With [`Config::eager_init`] every scoped class is built first, in registration order.
    /// Any failure turns the container [`Status::Failed`].
    pub fn bootstrap<Main: Send + Sync + 'static>(&self) -> Result<Arc<Main>, BootstrapErrorKind> {
        let span = info_span!("bootstrap", mod_id = self.inner.mod_id, main = %TypeInfo::of::<Main>());
        let _guard = span.enter();

        if self.inner.started.swap(true, Ordering::SeqCst) {
            let err = BootstrapErrorKind::AlreadyInitialized {
                mod_id: self.inner.mod_id,
            };
            error!("{}", err);
            return Err(err);
        }

        let result = self.build_main::<Main>();
        *self.inner.status.lock() = match &result {
            Ok(_) => {
                info!("Container is running");
                Status::Running
            }
            Err(err) => {
                error!("Bootstrap failed: {}", err);
                Status::Failed
            }
        };
        result
    }

    fn build_main<Main: Send + Sync + 'static>(&self) -> Result<Arc<Main>, BootstrapErrorKind> {
        let ContainerInner {
            registry,
            store,
            config,
            resolution_lock,
            ..
        } = &*self.inner;

        let Some(main) = registry.get_class(TypeInfo::of::<Main>()) else {
            return Err(ResolveErrorKind::UnresolvedBinding {
                key: BindingKey::of::<Main>(),
                requested_by: None,
            }
            .into());
        };
        if !main.is_main() {
            return Err(BootstrapErrorKind::NoMainClass { class: main.type_info() });
        }

        let frame = resolution_lock.lock();
        let mut resolution = Resolution::new(registry, store, &frame);

        if config.eager_init {
            for class in registry.classes().filter(|class| class.lifetime().is_scoped() && !class.is_main()) {
                resolution.resolve_class(class)?;
            }
            debug!(instances = store.len(), "Scoped classes built");
        }

        Ok(resolution.resolve(main.key())?)
    }

    /// Resolves the unqualified binding of `T`
    #[inline]
    pub fn resolve<T: ?Sized + 'static>(&self) -> Result<Arc<T>, ResolveErrorKind> {
        self.resolve_key(BindingKey::of::<T>())
    }

    /// Resolves the binding of `T` qualified with `identifier`. No fallback to the unqualified binding.
    #[inline]
    pub fn resolve_named<T: ?Sized + 'static>(&self, identifier: impl Into<Identifier>) -> Result<Arc<T>, ResolveErrorKind> {
        self.resolve_key(BindingKey::named::<T>(identifier))
    }

    pub fn resolve_key<T: ?Sized + 'static>(&self, key: BindingKey) -> Result<Arc<T>, ResolveErrorKind> {
        let span = info_span!("resolve", mod_id = self.inner.mod_id, key = %key);
        let _guard = span.enter();

        self.check_running()?;

        let frame = self.inner.resolution_lock.lock();
        Resolution::new(&self.inner.registry, &self.inner.store, &frame).resolve(key)
    }

    /// Resolves every implementation bound to `T`, qualified or not, in registration order
    pub fn resolve_all<T: ?Sized + 'static>(&self) -> Result<BeanList<T>, ResolveErrorKind> {
        let span = info_span!("resolve_all", mod_id = self.inner.mod_id, collection = %TypeInfo::of::<T>());
        let _guard = span.enter();

        self.check_running()?;

        let frame = self.inner.resolution_lock.lock();
        Resolution::new(&self.inner.registry, &self.inner.store, &frame)
            .resolve_all()
            .map(BeanList::new)
    }

    fn check_running(&self) -> Result<(), ResolveErrorKind> {
        let mod_id = self.inner.mod_id;
        let err = match *self.inner.status.lock() {
            Status::Running => return Ok(()),
            Status::Initializing => ResolveErrorKind::NotInitialized { mod_id },
            Status::Failed => ResolveErrorKind::Failed { mod_id },
        };
        error!("{}", err);
        Err(err)
    }

    /// Drops every scoped instance. Later requests build fresh ones.
    pub fn shutdown(&self) {
        let _lock = self.inner.resolution_lock.lock();

        let instances = self.inner.store.len();
        self.inner.store.clear();
        info!(mod_id = self.inner.mod_id, instances, "Scope store cleared");
    }

    #[inline]
    #[must_use]
    pub fn status(&self) -> Status {
        *self.inner.status.lock()
    }

    #[inline]
    #[must_use]
    pub fn mod_id(&self) -> &'static str {
        self.inner.mod_id
    }

    #[inline]
    #[must_use]
    pub fn registry(&self) -> &Registry {
        &self.inner.registry
    }

    /// Whether every class bound under `key` already has its scoped instance built.
    /// For a multi-bound key, all candidates must be built.
    #[must_use]
    pub fn is_instantiated(&self, key: &BindingKey) -> bool {
        let store = &self.inner.store;
        match self.inner.registry.lookup(key) {
            Some(Lookup::Single(target)) => store.contains(&target.class().key()),
            Some(Lookup::Multiple(targets)) => targets.iter().all(|target| store.contains(&target.class().key())),
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::{Container, Status};
    use crate::{
        component::component,
        config::Config,
        errors::{BootstrapErrorKind, ResolveErrorKind},
        inject::Inject,
        key::BindingKey,
        registry::{Registry, RegistryBuilder},
    };

    use alloc::{
        format,
        string::{String, ToString as _},
        sync::Arc,
    };
    use core::sync::atomic::{AtomicU8, Ordering};
    use tracing_test::traced_test;

    struct Settings;
    struct Service(Arc<Settings>);
    struct Main(Arc<Service>);

    fn registry(settings_calls: Arc<AtomicU8>) -> Registry {
        RegistryBuilder::new()
            .register(component::<Settings>().constructor(move || {
                settings_calls.fetch_add(1, Ordering::SeqCst);
                Ok(Settings)
            }))
            .register(component::<Service>().constructor(|Inject(settings): Inject<Settings>| Ok(Service(settings))))
            .register(
                component::<Main>()
                    .main()
                    .constructor(|Inject(service): Inject<Service>| Ok(Main(service))),
            )
            .build()
            .unwrap()
    }

    #[test]
    #[traced_test]
    fn test_bootstrap() {
        let calls = Arc::new(AtomicU8::new(0));
        let container = Container::new("test_mod", registry(calls.clone()));
        assert_eq!(container.status(), Status::Initializing);

        let main = container.bootstrap::<Main>().unwrap();
        let service = container.resolve::<Service>().unwrap();

        assert_eq!(container.status(), Status::Running);
        assert!(Arc::ptr_eq(&main.0, &service));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(container.is_instantiated(&BindingKey::of::<Main>()));
        assert!(logs_contain("Container is running"));
    }

    #[test]
    #[traced_test]
    fn test_bootstrap_twice() {
        let container = Container::new("test_mod", registry(Arc::new(AtomicU8::new(0))));

        container.bootstrap::<Main>().unwrap();
        assert!(matches!(
            container.bootstrap::<Main>(),
            Err(BootstrapErrorKind::AlreadyInitialized { mod_id: "test_mod" })
        ));
        assert_eq!(container.status(), Status::Running);
    }

    #[test]
    #[traced_test]
    fn test_resolve_before_bootstrap() {
        let container = Container::new("test_mod", registry(Arc::new(AtomicU8::new(0))));

        assert!(matches!(
            container.resolve::<Service>(),
            Err(ResolveErrorKind::NotInitialized { mod_id: "test_mod" })
        ));
    }

    #[test]
    #[traced_test]
    fn test_main_class_required() {
        let container = Container::new("test_mod", registry(Arc::new(AtomicU8::new(0))));

        assert!(matches!(
            container.bootstrap::<Service>(),
            Err(BootstrapErrorKind::NoMainClass { .. })
        ));
        assert_eq!(container.status(), Status::Failed);
        assert!(matches!(
            container.resolve::<Service>(),
            Err(ResolveErrorKind::Failed { mod_id: "test_mod" })
        ));
    }

    #[test]
    #[traced_test]
    fn test_lazy_init() {
        let calls = Arc::new(AtomicU8::new(0));
        let registry = RegistryBuilder::new()
            .register(component::<Settings>().constructor({
                let calls = calls.clone();
                move || {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(Settings)
                }
            }))
            .register(component::<Main>().main().constructor(|| Ok(Main(Arc::new(Service(Arc::new(Settings)))))))
            .build()
            .unwrap();
        let container = Container::new_with_config("test_mod", registry, Config { eager_init: false });

        container.bootstrap::<Main>().unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert!(!container.is_instantiated(&BindingKey::of::<Settings>()));

        container.resolve::<Settings>().unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    #[traced_test]
    fn test_shutdown_clears_scope_store() {
        let calls = Arc::new(AtomicU8::new(0));
        let container = Container::new("test_mod", registry(calls.clone()));
        container.bootstrap::<Main>().unwrap();

        let before = container.resolve::<Settings>().unwrap();
        container.shutdown();
        assert!(!container.is_instantiated(&BindingKey::of::<Settings>()));

        let after = container.resolve::<Settings>().unwrap();
        assert!(!Arc::ptr_eq(&before, &after));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(container.mod_id(), "test_mod");
    }
}
