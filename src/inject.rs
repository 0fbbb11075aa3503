use alloc::{borrow::Cow, sync::Arc, vec::Vec};
use core::{marker::PhantomData, ops::Deref};

use crate::{
    any::TypeInfo,
    dependency_resolver::{DependencyResolver, InjectionPoint},
    errors::ResolveErrorKind,
    key::BindingKey,
    resolver::Resolution,
};

/// Unqualified dependency: the single binding of `Dep` without an identifier
pub struct Inject<Dep: ?Sized>(pub Arc<Dep>);

impl<Dep: ?Sized> Inject<Dep> {
    #[inline]
    #[must_use]
    pub fn into_inner(self) -> Arc<Dep> {
        self.0
    }
}

impl<Dep: ?Sized> Deref for Inject<Dep> {
    type Target = Dep;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<Dep: ?Sized + 'static> DependencyResolver for Inject<Dep> {
    #[inline]
    fn resolve(resolution: &mut Resolution<'_>) -> Result<Self, ResolveErrorKind> {
        resolution.resolve(BindingKey::of::<Dep>()).map(Self)
    }

    #[inline]
    fn injection_points(points: &mut Vec<InjectionPoint>) {
        points.push(InjectionPoint::single(BindingKey::of::<Dep>()));
    }
}

/// Compile-time identifier of a qualified injection point.
/// Declare implementors with [`qualifier!`](crate::qualifier).
pub trait Qualifier: 'static {
    const IDENTIFIER: &'static str;
}

/// Qualified dependency: the binding of `Dep` registered with identifier `Q::IDENTIFIER`.
///
/// Qualifiers match exactly. An unqualified binding of `Dep` never satisfies it.
pub struct Named<Dep: ?Sized, Q>(pub Arc<Dep>, pub PhantomData<Q>);

impl<Dep: ?Sized, Q> Named<Dep, Q> {
    #[inline]
    #[must_use]
    pub fn into_inner(self) -> Arc<Dep> {
        self.0
    }
}

impl<Dep: ?Sized, Q> Deref for Named<Dep, Q> {
    type Target = Dep;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<Dep: ?Sized, Q: Qualifier> Named<Dep, Q> {
    #[inline]
    #[must_use]
    pub fn identifier(&self) -> &'static str {
        Q::IDENTIFIER
    }
}

fn qualified_key<Dep: ?Sized + 'static, Q: Qualifier>() -> BindingKey {
    BindingKey::new(TypeInfo::of::<Dep>(), Some(Cow::Borrowed(Q::IDENTIFIER)))
}

impl<Dep: ?Sized + 'static, Q: Qualifier> DependencyResolver for Named<Dep, Q> {
    #[inline]
    fn resolve(resolution: &mut Resolution<'_>) -> Result<Self, ResolveErrorKind> {
        resolution
            .resolve(qualified_key::<Dep, Q>())
            .map(|dependency| Self(dependency, PhantomData))
    }

    #[inline]
    fn injection_points(points: &mut Vec<InjectionPoint>) {
        points.push(InjectionPoint::single(qualified_key::<Dep, Q>()));
    }
}

/// Declares unit structs implementing [`Qualifier`].
///
/// ```
/// modinject::qualifier! {
///     /// File backed storage
///     pub FileQualifier = "file";
///     pub DatabaseQualifier = "database";
/// }
///
/// use modinject::Qualifier as _;
/// assert_eq!(FileQualifier::IDENTIFIER, "file");
/// ```
#[macro_export]
macro_rules! qualifier {
    (
        $( $(#[$meta:meta])* $vis:vis $name:ident = $identifier:literal );+ $(;)?
    ) => {
        $(
            $(#[$meta])*
            #[derive(Debug, Clone, Copy, Default)]
            $vis struct $name;

            impl $crate::Qualifier for $name {
                const IDENTIFIER: &'static str = $identifier;
            }
        )+
    };
}
