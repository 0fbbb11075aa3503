#![no_std]

extern crate alloc;

#[macro_use]
pub(crate) mod macros;

pub(crate) mod any;
pub(crate) mod bean_list;
pub(crate) mod component;
pub(crate) mod config;
pub(crate) mod container;
pub(crate) mod dependency_resolver;
pub(crate) mod errors;
pub(crate) mod field;
pub(crate) mod inject;
pub(crate) mod instantiator;
pub(crate) mod key;
pub(crate) mod post_construct;
pub(crate) mod registry;
pub(crate) mod resolver;
pub(crate) mod scanner;
pub(crate) mod scope;

pub use any::TypeInfo;
pub use bean_list::BeanList;
pub use component::{component, ClassDescriptor, ComponentBuilder};
pub use config::Config;
pub use container::{Container, Status};
pub use dependency_resolver::{InjectionKind, InjectionPoint};
pub use errors::{BootstrapErrorKind, InstantiatorErrorKind, InvalidClassDefinition, ResolveErrorKind};
pub use inject::{Inject, Named, Qualifier};
pub use key::{BindingKey, Identifier};
pub use registry::{BindingTarget, Lookup, Registry, RegistryBuilder};
pub use scanner::{ClassMetadata, Scanner};
pub use scope::Lifetime;
