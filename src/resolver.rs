use alloc::{sync::Arc, vec::Vec};
use core::cell::RefCell;
use tracing::{debug, debug_span, error, warn};

use crate::{
    any::{Instance, TypeInfo},
    errors::ResolveErrorKind,
    instantiator::instantiate,
    key::BindingKey,
    registry::{BindingTarget, Lookup, Registry},
    scanner::ClassMetadata,
    scope::ScopeStore,
};

/// Keys of the classes currently under construction, outermost first.
///
/// Shared by every request nested in a constructor, field setter or hook,
/// so a cycle through a dynamic lookup is still detected.
pub(crate) type Frame = RefCell<Vec<BindingKey>>;

/// State of one root request: the registry and store it reads from,
/// and the frame of classes under construction.
pub(crate) struct Resolution<'a> {
    registry: &'a Registry,
    store: &'a ScopeStore,
    frame: &'a Frame,
}

impl<'a> Resolution<'a> {
    #[inline]
    #[must_use]
    pub(crate) const fn new(registry: &'a Registry, store: &'a ScopeStore, frame: &'a Frame) -> Self {
        Self { registry, store, frame }
    }

    /// Class that asked for the dependency being resolved right now
    #[inline]
    #[must_use]
    pub(crate) fn requester(&self) -> Option<TypeInfo> {
        self.frame.borrow().last().map(|key| key.type_info)
    }

    /// Resolves exactly one implementation bound to `key`
    pub(crate) fn resolve<T: ?Sized + 'static>(&mut self, key: BindingKey) -> Result<Arc<T>, ResolveErrorKind> {
        let registry = self.registry;

        let target = match registry.lookup(&key) {
            Some(Lookup::Single(target)) => target,
            Some(Lookup::Multiple(targets)) => {
                let err = ResolveErrorKind::AmbiguousBinding {
                    key,
                    candidates: targets.iter().map(|target| target.class().type_info()).collect(),
                };
                error!("{}", err);
                return Err(err);
            }
            None => {
                let err = ResolveErrorKind::UnresolvedBinding {
                    key,
                    requested_by: self.requester(),
                };
                error!("{}", err);
                return Err(err);
            }
        };

        let instance = self.resolve_target(target)?;
        downcast(&instance)
    }

    /// Resolves every implementation bound to `T` under any identifier, in registration order
    pub(crate) fn resolve_all<T: ?Sized + 'static>(&mut self) -> Result<Vec<Arc<T>>, ResolveErrorKind> {
        let registry = self.registry;
        let type_info = TypeInfo::of::<T>();

        let targets = registry.lookup_all(type_info);
        if targets.is_empty() {
            warn!(collection = %type_info, "No implementations registered, injecting an empty collection");
        }

        let mut beans = Vec::with_capacity(targets.len());
        for target in targets {
            let instance = self.resolve_target(target)?;
            beans.push(downcast(&instance)?);
        }
        Ok(beans)
    }

    fn resolve_target(&mut self, target: &BindingTarget) -> Result<Instance, ResolveErrorKind> {
        let instance = self.resolve_class(target.class())?;

        target.cast(&instance).ok_or_else(|| {
            let err = ResolveErrorKind::IncorrectType {
                expected: target.provides(),
                actual: (*instance).type_id(),
            };
            error!("{}", err);
            err
        })
    }

    /// Returns the instance of the class itself, reusing the scope store for scoped classes
    pub(crate) fn resolve_class(&mut self, class: &ClassMetadata) -> Result<Instance, ResolveErrorKind> {
        let key = class.key();

        let span = debug_span!("resolve", class = %key);
        let _guard = span.enter();

        if self.frame.borrow().contains(&key) {
            let mut path = self.frame.borrow().clone();
            path.push(key);

            let err = ResolveErrorKind::CyclicDependency {
                path: path.into_boxed_slice(),
            };
            error!("{}", err);
            return Err(err);
        }

        let scoped = class.lifetime().is_scoped();
        if scoped {
            if let Some(instance) = self.store.get(&key) {
                debug!("Found in scope store");
                return Ok(instance);
            }
            debug!("Not found in scope store");
        }

        self.frame.borrow_mut().push(key);
        let result = instantiate(class, self);
        let key = self.frame.borrow_mut().pop();

        let instance = result?;
        match key {
            Some(key) if scoped => {
                debug!("Stored in scope store");
                Ok(self.store.put(key, instance))
            }
            _ => Ok(instance),
        }
    }
}

fn downcast<T: ?Sized + 'static>(instance: &Instance) -> Result<Arc<T>, ResolveErrorKind> {
    match instance.downcast_ref::<Arc<T>>() {
        Some(instance) => Ok(instance.clone()),
        None => {
            let err = ResolveErrorKind::IncorrectType {
                expected: TypeInfo::of::<T>(),
                actual: (**instance).type_id(),
            };
            error!("{}", err);
            Err(err)
        }
    }
}
