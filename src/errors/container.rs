use super::dependency_resolver::ResolveErrorKind;
use crate::any::TypeInfo;

#[derive(thiserror::Error, Debug)]
pub enum BootstrapErrorKind {
    #[error("Container for mod {mod_id} has already been bootstrapped. Bootstrap must only be called once")]
    AlreadyInitialized { mod_id: &'static str },
    #[error("Class {class} isn't marked as the main class. Mark the root class of the mod as main")]
    NoMainClass { class: TypeInfo },
    #[error(transparent)]
    Resolve(#[from] ResolveErrorKind),
}
