use alloc::{boxed::Box, vec::Vec};
use tracing::error;

use crate::{
    any::{BoxedInstance, TypeInfo},
    dependency_resolver::{injection_points_of, DependencyResolver, InjectionPoint},
    errors::ResolveErrorKind,
    resolver::Resolution,
};

/// Setter of an injectable field, called right after construction.
/// Implemented for closures like `|service: &mut Service, Inject(config): Inject<Config>| service.config = Some(config)`.
pub(crate) trait FieldInjector<T, Deps>: 'static
where
    Deps: DependencyResolver,
{
    fn inject(&self, target: &mut T, dependencies: Deps);
}

pub(crate) type BoxedFieldInjector = Box<dyn Fn(&mut Resolution<'_>, &mut BoxedInstance) -> Result<(), ResolveErrorKind> + Send + Sync>;

pub(crate) struct Field {
    pub(crate) name: &'static str,
    pub(crate) points: Vec<InjectionPoint>,
    pub(crate) inject: BoxedFieldInjector,
}

impl Field {
    #[must_use]
    pub(crate) fn new<T, Inj, Deps>(name: &'static str, injector: Inj) -> Self
    where
        T: 'static,
        Inj: FieldInjector<T, Deps> + Send + Sync,
        Deps: DependencyResolver,
    {
        Self {
            name,
            points: injection_points_of::<Deps>(),
            inject: boxed_field_injector::<T, Inj, Deps>(injector),
        }
    }
}

#[must_use]
pub(crate) fn boxed_field_injector<T, Inj, Deps>(injector: Inj) -> BoxedFieldInjector
where
    T: 'static,
    Inj: FieldInjector<T, Deps> + Send + Sync,
    Deps: DependencyResolver,
{
    Box::new(move |resolution, instance| {
        let dependencies = Deps::resolve(resolution)?;

        let actual = (**instance).type_id();
        let Some(target) = instance.downcast_mut::<T>() else {
            let err = ResolveErrorKind::IncorrectType {
                expected: TypeInfo::of::<T>(),
                actual,
            };
            error!("{}", err);
            return Err(err);
        };

        injector.inject(target, dependencies);
        Ok(())
    })
}

macro_rules! impl_field_injector {
    (
        [$($ty:ident),*]
    ) => {
        #[allow(non_snake_case)]
        impl<F, T, $($ty,)*> FieldInjector<T, ($($ty,)*)> for F
        where
            F: Fn(&mut T, $($ty,)*) + 'static,
            $( $ty: DependencyResolver, )*
        {
            #[inline]
            fn inject(&self, target: &mut T, ($($ty,)*): ($($ty,)*)) {
                self(target, $($ty,)*)
            }
        }
    };
}

all_the_tuples!(impl_field_injector);

#[cfg(test)]
mod tests {
    extern crate std;

    use super::{Field, FieldInjector};
    use crate::{
        any::BoxedInstance,
        component::component,
        dependency_resolver::{DependencyResolver, InjectionPoint},
        errors::ResolveErrorKind,
        inject::Inject,
        key::BindingKey,
        registry::{Registry, RegistryBuilder},
        resolver::{Frame, Resolution},
        scope::ScopeStore,
    };

    use alloc::{
        boxed::Box,
        format,
        string::{String, ToString as _},
        sync::Arc,
    };
    use tracing_test::traced_test;

    struct Config(u8);

    #[derive(Default)]
    struct Service {
        config: Option<Arc<Config>>,
    }

    #[test]
    #[allow(dead_code)]
    fn test_field_injector_helper() {
        fn injector<T, Deps: DependencyResolver, F: FieldInjector<T, Deps>>(_f: F) {}
        fn injector_with_dep() {
            injector(|service: &mut Service, Inject(config): Inject<Config>| service.config = Some(config));
        }
    }

    #[test]
    #[traced_test]
    fn test_field_injection() {
        let registry = RegistryBuilder::new()
            .register(component::<Config>().constructor(|| Ok(Config(7))))
            .build()
            .unwrap();
        let store = ScopeStore::new();
        let frame = Frame::default();
        let mut resolution = Resolution::new(&registry, &store, &frame);

        let field = Field::new("config", |service: &mut Service, Inject(config): Inject<Config>| {
            service.config = Some(config);
        });
        assert_eq!(field.points, [InjectionPoint::single(BindingKey::of::<Config>())]);

        let mut instance: BoxedInstance = Box::new(Service::default());
        (field.inject)(&mut resolution, &mut instance).unwrap();

        let service = instance.downcast::<Service>().unwrap();
        assert_eq!(service.config.as_ref().map(|config| config.0), Some(7));
    }

    #[test]
    #[traced_test]
    fn test_field_injection_wrong_target() {
        let registry = Registry::default();
        let store = ScopeStore::new();
        let frame = Frame::default();
        let mut resolution = Resolution::new(&registry, &store, &frame);

        let field = Field::new("config", |_service: &mut Service| {});
        let mut instance: BoxedInstance = Box::new(Config(1));

        assert!(matches!(
            (field.inject)(&mut resolution, &mut instance),
            Err(ResolveErrorKind::IncorrectType { .. })
        ));
    }
}
