use alloc::{boxed::Box, vec::Vec};
use tracing::error;

use crate::{
    any::{BoxedInstance, TypeInfo},
    dependency_resolver::{injection_points_of, DependencyResolver, InjectionPoint},
    errors::{InstantiatorErrorKind, ResolveErrorKind},
    resolver::Resolution,
};

/// Initialization hook, called once every field of a fresh instance is injected.
///
/// Only zero-argument hooks (`|service: &mut Service| Ok(())`) pass scanning.
/// Hooks declaring injection wrappers are accepted here so the scanner can report them.
pub(crate) trait PostConstruct<T, Deps>: 'static
where
    Deps: DependencyResolver,
{
    type Error: Into<anyhow::Error>;

    fn call(&self, target: &mut T, dependencies: Deps) -> Result<(), Self::Error>;
}

pub(crate) type BoxedPostConstruct =
    Box<dyn Fn(&mut Resolution<'_>, &mut BoxedInstance) -> Result<(), InstantiatorErrorKind<ResolveErrorKind, anyhow::Error>> + Send + Sync>;

pub(crate) struct Hook {
    pub(crate) name: &'static str,
    pub(crate) parameters: Vec<InjectionPoint>,
    pub(crate) call: BoxedPostConstruct,
}

impl Hook {
    #[must_use]
    pub(crate) fn new<T, H, Deps>(name: &'static str, hook: H) -> Self
    where
        T: 'static,
        H: PostConstruct<T, Deps> + Send + Sync,
        Deps: DependencyResolver,
    {
        Self {
            name,
            parameters: injection_points_of::<Deps>(),
            call: boxed_post_construct::<T, H, Deps>(hook),
        }
    }
}

#[must_use]
pub(crate) fn boxed_post_construct<T, H, Deps>(hook: H) -> BoxedPostConstruct
where
    T: 'static,
    H: PostConstruct<T, Deps> + Send + Sync,
    Deps: DependencyResolver,
{
    Box::new(move |resolution, instance| {
        let dependencies = Deps::resolve(resolution).map_err(InstantiatorErrorKind::Deps)?;

        let actual = (**instance).type_id();
        let Some(target) = instance.downcast_mut::<T>() else {
            let err = ResolveErrorKind::IncorrectType {
                expected: TypeInfo::of::<T>(),
                actual,
            };
            error!("{}", err);
            return Err(InstantiatorErrorKind::Deps(err));
        };

        hook.call(target, dependencies)
            .map_err(|err| InstantiatorErrorKind::Factory(err.into()))
    })
}

macro_rules! impl_post_construct {
    (
        [$($ty:ident),*]
    ) => {
        #[allow(non_snake_case)]
        impl<F, T, Err, $($ty,)*> PostConstruct<T, ($($ty,)*)> for F
        where
            F: Fn(&mut T, $($ty,)*) -> Result<(), Err> + 'static,
            Err: Into<anyhow::Error>,
            $( $ty: DependencyResolver, )*
        {
            type Error = Err;

            #[inline]
            fn call(&self, target: &mut T, ($($ty,)*): ($($ty,)*)) -> Result<(), Self::Error> {
                self(target, $($ty,)*)
            }
        }
    };
}

all_the_tuples!(impl_post_construct);
