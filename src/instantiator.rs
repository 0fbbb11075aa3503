use alloc::{boxed::Box, sync::Arc, vec::Vec};
use tracing::{debug, error};

use crate::{
    any::{BoxedInstance, Instance, TypeInfo},
    dependency_resolver::{injection_points_of, DependencyResolver, InjectionPoint},
    errors::{InstantiatorErrorKind, ResolveErrorKind},
    resolver::Resolution,
    scanner::ClassMetadata,
};

/// Constructor of a class. Implemented for closures taking injection wrappers,
/// e.g. `|Inject(config): Inject<Config>| Ok(Service::new(config))`.
pub(crate) trait Instantiator<Deps>: 'static
where
    Deps: DependencyResolver,
{
    type Provides: 'static;
    type Error: Into<anyhow::Error>;

    fn instantiate(&self, dependencies: Deps) -> Result<Self::Provides, Self::Error>;
}

pub(crate) type BoxedConstructor =
    Box<dyn Fn(&mut Resolution<'_>) -> Result<BoxedInstance, InstantiatorErrorKind<ResolveErrorKind, anyhow::Error>> + Send + Sync>;

/// Turns the half-built instance into its shared form once the lifecycle is over
pub(crate) type Wrapper = fn(BoxedInstance) -> Result<Instance, ResolveErrorKind>;

pub(crate) struct Constructor {
    pub(crate) parameters: Vec<InjectionPoint>,
    pub(crate) instantiate: BoxedConstructor,
}

impl Constructor {
    #[must_use]
    pub(crate) fn new<Inst, Deps>(instantiator: Inst) -> Self
    where
        Inst: Instantiator<Deps> + Send + Sync,
        Inst::Provides: Send + Sync,
        Deps: DependencyResolver,
    {
        Self {
            parameters: injection_points_of::<Deps>(),
            instantiate: boxed_constructor(instantiator),
        }
    }
}

#[must_use]
pub(crate) fn boxed_constructor<Inst, Deps>(instantiator: Inst) -> BoxedConstructor
where
    Inst: Instantiator<Deps> + Send + Sync,
    Inst::Provides: Send + Sync,
    Deps: DependencyResolver,
{
    Box::new(move |resolution| {
        let dependencies = Deps::resolve(resolution).map_err(InstantiatorErrorKind::Deps)?;
        let instance = instantiator
            .instantiate(dependencies)
            .map_err(|err| InstantiatorErrorKind::Factory(err.into()))?;

        Ok(Box::new(instance) as BoxedInstance)
    })
}

pub(crate) fn wrap_instance<T: Send + Sync + 'static>(instance: BoxedInstance) -> Result<Instance, ResolveErrorKind> {
    let actual = (*instance).type_id();
    match instance.downcast::<T>() {
        Ok(instance) => Ok(Arc::new(Arc::<T>::from(instance)) as Instance),
        Err(_) => {
            let err = ResolveErrorKind::IncorrectType {
                expected: TypeInfo::of::<T>(),
                actual,
            };
            error!("{}", err);
            Err(err)
        }
    }
}

/// Runs the whole lifecycle of a fresh instance: constructor, field injection in declaration order,
/// then post-construct hooks in declaration order.
///
/// The instance is returned only if every step succeeded.
pub(crate) fn instantiate(class: &ClassMetadata, resolution: &mut Resolution<'_>) -> Result<Instance, ResolveErrorKind> {
    let mut instance = match (class.constructor().instantiate)(resolution) {
        Ok(instance) => instance,
        Err(InstantiatorErrorKind::Deps(err)) => return Err(err),
        Err(InstantiatorErrorKind::Factory(source)) => {
            let source = nested_resolve_error(source)?;
            error!("Construction of {} failed: {:#}", class.type_info(), source);
            return Err(ResolveErrorKind::BeanConstructionFailed {
                class: class.type_info(),
                source,
            });
        }
    };
    debug!("Constructed");

    for field in class.fields() {
        (field.inject)(resolution, &mut instance)?;
        debug!(field = field.name, "Field injected");
    }

    for hook in class.post_constructs() {
        match (hook.call)(resolution, &mut instance) {
            Ok(()) => debug!(method = hook.name, "Post-construct called"),
            Err(InstantiatorErrorKind::Deps(err)) => return Err(err),
            Err(InstantiatorErrorKind::Factory(source)) => {
                let source = nested_resolve_error(source)?;
                error!("Post-construct method {}::{} failed: {:#}", class.type_info(), hook.name, source);
                return Err(ResolveErrorKind::PostConstructFailed {
                    class: class.type_info(),
                    method: hook.name,
                    source,
                });
            }
        }
    }

    (class.wrapper())(instance)
}

/// User code may resolve from the container itself; such a failure keeps its kind
/// instead of being reported as a construction failure.
fn nested_resolve_error(source: anyhow::Error) -> Result<anyhow::Error, ResolveErrorKind> {
    match source.downcast::<ResolveErrorKind>() {
        Ok(err) => Err(err),
        Err(source) => Ok(source),
    }
}

macro_rules! impl_instantiator {
    (
        [$($ty:ident),*]
    ) => {
        #[allow(non_snake_case)]
        impl<F, Response, Err, $($ty,)*> Instantiator<($($ty,)*)> for F
        where
            F: Fn($($ty,)*) -> Result<Response, Err> + 'static,
            Response: 'static,
            Err: Into<anyhow::Error>,
            $( $ty: DependencyResolver, )*
        {
            type Provides = Response;
            type Error = Err;

            #[inline]
            fn instantiate(&self, ($($ty,)*): ($($ty,)*)) -> Result<Self::Provides, Self::Error> {
                self($($ty,)*)
            }
        }
    };
}

all_the_tuples!(impl_instantiator);

#[cfg(test)]
mod tests {
    extern crate std;

    use super::{boxed_constructor, nested_resolve_error, wrap_instance, Instantiator};
    use crate::{
        dependency_resolver::DependencyResolver,
        errors::{InstantiatorErrorKind, ResolveErrorKind},
        inject::Inject,
        registry::Registry,
        resolver::{Frame, Resolution},
        scope::ScopeStore,
    };

    use alloc::{
        boxed::Box,
        format,
        string::{String, ToString as _},
        sync::Arc,
    };
    use core::sync::atomic::{AtomicU8, Ordering};
    use tracing::debug;
    use tracing_test::traced_test;

    struct Config(u8);

    #[test]
    #[allow(dead_code)]
    fn test_instantiator_helper() {
        fn resolver<Deps: DependencyResolver, F: Instantiator<Deps, Error = anyhow::Error>>(_f: F) {}
        fn resolver_with_dep() {
            resolver(|| Ok(()));
            resolver(|Inject(_config): Inject<Config>| Ok(()));
        }
    }

    #[test]
    #[traced_test]
    fn test_boxed_constructor() {
        let calls = Arc::new(AtomicU8::new(0));
        let constructor = boxed_constructor({
            let calls = calls.clone();
            move || {
                calls.fetch_add(1, Ordering::SeqCst);

                debug!("Call constructor");
                Ok::<_, anyhow::Error>(Config(1))
            }
        });

        let registry = Registry::default();
        let store = ScopeStore::new();
        let frame = Frame::default();
        let mut resolution = Resolution::new(&registry, &store, &frame);

        let instance = constructor(&mut resolution).unwrap();
        let instance = wrap_instance::<Config>(instance).unwrap();

        assert_eq!(instance.downcast_ref::<Arc<Config>>().unwrap().0, 1);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(logs_contain("Call constructor"));
    }

    #[test]
    #[traced_test]
    fn test_boxed_constructor_errors() {
        let failing = boxed_constructor(|| Err::<Config, _>(anyhow::anyhow!("disk is full")));
        let missing = boxed_constructor(|Inject(config): Inject<Config>| Ok::<_, anyhow::Error>(Config(config.0)));

        let registry = Registry::default();
        let store = ScopeStore::new();
        let frame = Frame::default();
        let mut resolution = Resolution::new(&registry, &store, &frame);

        match failing(&mut resolution) {
            Err(InstantiatorErrorKind::Factory(err)) => assert_eq!(err.to_string(), "disk is full"),
            _ => panic!("constructor failure expected"),
        }
        match missing(&mut resolution) {
            Err(InstantiatorErrorKind::Deps(ResolveErrorKind::UnresolvedBinding { .. })) => {}
            _ => panic!("unresolved dependency expected"),
        }
    }

    #[test]
    fn test_nested_resolve_error_keeps_kind() {
        let nested = anyhow::Error::from(ResolveErrorKind::NotInitialized { mod_id: "test_mod" });

        assert!(matches!(
            nested_resolve_error(nested),
            Err(ResolveErrorKind::NotInitialized { mod_id: "test_mod" })
        ));
        assert_eq!(nested_resolve_error(anyhow::anyhow!("disk is full")).unwrap().to_string(), "disk is full");
    }

    #[test]
    fn test_wrap_incorrect_type() {
        let instance = Box::new(Config(1)) as _;

        assert!(matches!(
            wrap_instance::<u8>(instance),
            Err(ResolveErrorKind::IncorrectType { .. })
        ));
    }
}
