mod container;
mod dependency_resolver;
mod instantiator;
mod scanner;

pub use container::BootstrapErrorKind;
pub use dependency_resolver::ResolveErrorKind;
pub use instantiator::InstantiatorErrorKind;
pub use scanner::InvalidClassDefinition;
