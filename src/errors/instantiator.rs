/// Failure of a constructor or a hook call: either one of its dependencies couldn't be resolved,
/// or the user code itself returned an error
#[derive(thiserror::Error, Debug)]
pub enum InstantiatorErrorKind<DepsErr, FactoryErr> {
    #[error(transparent)]
    Deps(DepsErr),
    #[error(transparent)]
    Factory(FactoryErr),
}
