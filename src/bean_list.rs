use alloc::{sync::Arc, vec::Vec};
use core::{ops::Index, slice};

use crate::{
    dependency_resolver::{DependencyResolver, InjectionPoint},
    errors::ResolveErrorKind,
    key::BindingKey,
    resolver::Resolution,
};

/// Every implementation bound to `T`, qualified or not, in registration order.
///
/// Each implementation appears exactly once. An empty list is valid.
pub struct BeanList<T: ?Sized> {
    beans: Vec<Arc<T>>,
}

impl<T: ?Sized> BeanList<T> {
    #[inline]
    #[must_use]
    pub const fn new(beans: Vec<Arc<T>>) -> Self {
        Self { beans }
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.beans.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.beans.is_empty()
    }

    #[inline]
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Arc<T>> {
        self.beans.get(index)
    }

    #[inline]
    #[must_use]
    pub fn first(&self) -> Option<&Arc<T>> {
        self.beans.first()
    }

    #[inline]
    #[must_use]
    pub fn last(&self) -> Option<&Arc<T>> {
        self.beans.last()
    }

    #[inline]
    pub fn iter(&self) -> slice::Iter<'_, Arc<T>> {
        self.beans.iter()
    }

    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[Arc<T>] {
        &self.beans
    }

    #[inline]
    #[must_use]
    pub fn into_vec(self) -> Vec<Arc<T>> {
        self.beans
    }
}

impl<T: ?Sized> Clone for BeanList<T> {
    fn clone(&self) -> Self {
        Self {
            beans: self.beans.clone(),
        }
    }
}

impl<T: ?Sized> Default for BeanList<T> {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl<T: ?Sized> Index<usize> for BeanList<T> {
    type Output = Arc<T>;

    fn index(&self, index: usize) -> &Self::Output {
        &self.beans[index]
    }
}

impl<T: ?Sized> IntoIterator for BeanList<T> {
    type Item = Arc<T>;
    type IntoIter = alloc::vec::IntoIter<Arc<T>>;

    fn into_iter(self) -> Self::IntoIter {
        self.beans.into_iter()
    }
}

impl<'a, T: ?Sized> IntoIterator for &'a BeanList<T> {
    type Item = &'a Arc<T>;
    type IntoIter = slice::Iter<'a, Arc<T>>;

    fn into_iter(self) -> Self::IntoIter {
        self.beans.iter()
    }
}

impl<T: ?Sized + 'static> DependencyResolver for BeanList<T> {
    #[inline]
    fn resolve(resolution: &mut Resolution<'_>) -> Result<Self, ResolveErrorKind> {
        resolution.resolve_all().map(Self::new)
    }

    #[inline]
    fn injection_points(points: &mut Vec<InjectionPoint>) {
        points.push(InjectionPoint::collection(BindingKey::of::<T>()));
    }
}
