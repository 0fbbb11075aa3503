use crate::any::TypeInfo;

/// Configuration error found while scanning a class description.
/// Always fatal: registry building stops before any instance is constructed.
#[derive(thiserror::Error, Debug)]
pub enum InvalidClassDefinition {
    #[error("Class {class} has {count} constructors marked as injectable. Only one constructor can be marked for injection")]
    MultipleInjectableConstructors { class: TypeInfo, count: usize },
    #[error(
        "Class {class} has no injectable constructor. \
        Mark exactly one constructor as injectable or provide a default constructor"
    )]
    NoInjectableConstructor { class: TypeInfo },
    #[error("Post-construct method {class}::{method} declares {parameters} parameter(s), but hooks must not take any")]
    ParameterizedPostConstruct {
        class: TypeInfo,
        method: &'static str,
        parameters: usize,
    },
    #[error("Class {class} declares an empty identifier, so its bindings can't be told apart from unqualified ones")]
    EmptyIdentifier { class: TypeInfo },
}
