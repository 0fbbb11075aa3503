use alloc::collections::BTreeMap;
use parking_lot::Mutex;

use crate::{any::Instance, key::BindingKey};

/// How long a class instance lives
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Lifetime {
    /// One instance per container, created on first resolution and reused afterwards
    #[default]
    Scoped,
    /// A fresh instance for every injection point and every request
    Transient,
}

impl Lifetime {
    #[inline]
    #[must_use]
    pub const fn is_scoped(self) -> bool {
        matches!(self, Self::Scoped)
    }
}

/// Fully initialized scoped instances, keyed by the key of their class.
///
/// No eviction: entries live until [`ScopeStore::clear`].
#[derive(Default)]
pub(crate) struct ScopeStore {
    instances: Mutex<BTreeMap<BindingKey, Instance>>,
}

impl ScopeStore {
    #[inline]
    #[must_use]
    pub(crate) fn new() -> Self {
        Self {
            instances: Mutex::new(BTreeMap::new()),
        }
    }

    #[inline]
    #[must_use]
    pub(crate) fn get(&self, key: &BindingKey) -> Option<Instance> {
        self.instances.lock().get(key).cloned()
    }

    /// Stores the instance unless the key is already occupied.
    /// Returns the instance that ends up in the store.
    pub(crate) fn put(&self, key: BindingKey, instance: Instance) -> Instance {
        self.instances.lock().entry(key).or_insert(instance).clone()
    }

    #[inline]
    pub(crate) fn contains(&self, key: &BindingKey) -> bool {
        self.instances.lock().contains_key(key)
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.instances.lock().len()
    }

    #[inline]
    pub(crate) fn clear(&self) {
        self.instances.lock().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::{Lifetime, ScopeStore};
    use crate::{any::Instance, key::BindingKey};

    use alloc::sync::Arc;

    struct FileStorage;

    fn instance(value: u8) -> Instance {
        Arc::new(Arc::new(value))
    }

    #[test]
    fn test_default_lifetime_is_scoped() {
        assert_eq!(Lifetime::default(), Lifetime::Scoped);
        assert!(Lifetime::Scoped.is_scoped());
        assert!(!Lifetime::Transient.is_scoped());
    }

    #[test]
    fn test_put_keeps_first_instance() {
        let store = ScopeStore::new();
        let key = BindingKey::of::<FileStorage>();

        let first = store.put(key.clone(), instance(1));
        let second = store.put(key.clone(), instance(2));

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(**store.get(&key).unwrap().downcast_ref::<Arc<u8>>().unwrap(), 1);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_qualified_entries_are_separate() {
        let store = ScopeStore::new();
        store.put(BindingKey::named::<FileStorage>("file"), instance(1));

        assert!(store.get(&BindingKey::of::<FileStorage>()).is_none());
        assert!(store.contains(&BindingKey::named::<FileStorage>("file")));

        store.clear();
        assert_eq!(store.len(), 0);
    }
}
