use alloc::vec::Vec;

use crate::{errors::ResolveErrorKind, key::BindingKey, resolver::Resolution};

/// What an injection point asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InjectionKind {
    /// Exactly one implementation of the key
    Single,
    /// Every implementation of the key type, in registration order
    Collection,
}

/// One dependency of a constructor, field or hook
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InjectionPoint {
    pub key: BindingKey,
    pub kind: InjectionKind,
}

impl InjectionPoint {
    #[inline]
    #[must_use]
    pub const fn single(key: BindingKey) -> Self {
        Self {
            key,
            kind: InjectionKind::Single,
        }
    }

    #[inline]
    #[must_use]
    pub const fn collection(key: BindingKey) -> Self {
        Self {
            key,
            kind: InjectionKind::Collection,
        }
    }
}

pub(crate) trait DependencyResolver: Sized + 'static {
    fn resolve(resolution: &mut Resolution<'_>) -> Result<Self, ResolveErrorKind>;

    /// Appends the keys this resolver asks for, in resolution order
    fn injection_points(points: &mut Vec<InjectionPoint>);
}

#[must_use]
pub(crate) fn injection_points_of<Deps: DependencyResolver>() -> Vec<InjectionPoint> {
    let mut points = Vec::new();
    Deps::injection_points(&mut points);
    points
}

macro_rules! impl_dependency_resolver {
    (
        [$($ty:ident),*]
    ) => {
        #[allow(non_snake_case)]
        impl<$($ty,)*> DependencyResolver for ($($ty,)*)
        where
            $( $ty: DependencyResolver, )*
        {
            #[inline]
            #[allow(unused_variables)]
            fn resolve(resolution: &mut Resolution<'_>) -> Result<Self, ResolveErrorKind> {
                Ok(($($ty::resolve(resolution)?,)*))
            }

            #[inline]
            #[allow(unused_variables)]
            fn injection_points(points: &mut Vec<InjectionPoint>) {
                $( $ty::injection_points(points); )*
            }
        }
    };
}

all_the_tuples!(impl_dependency_resolver);
