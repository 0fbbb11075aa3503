use alloc::boxed::Box;
use core::{
    any::TypeId,
    fmt::{self, Display, Formatter},
};

use crate::{any::TypeInfo, key::BindingKey};

#[derive(thiserror::Error, Debug)]
pub enum ResolveErrorKind {
    #[error("No binding registered for {key}, requested by {}", Requester(.requested_by))]
    UnresolvedBinding {
        key: BindingKey,
        requested_by: Option<TypeInfo>,
    },
    #[error(
        "Ambiguous binding for {key}: {} implementations registered ({}). \
        Qualify the injection point with an identifier or request a bean list",
        .candidates.len(), Candidates(.candidates)
    )]
    AmbiguousBinding { key: BindingKey, candidates: Box<[TypeInfo]> },
    #[error("Cyclic dependency detected: {}", CyclePath(.path))]
    CyclicDependency { path: Box<[BindingKey]> },
    #[error("Construction of {class} failed")]
    BeanConstructionFailed {
        class: TypeInfo,
        #[source]
        source: anyhow::Error,
    },
    #[error("Post-construct method {class}::{method} failed")]
    PostConstructFailed {
        class: TypeInfo,
        method: &'static str,
        #[source]
        source: anyhow::Error,
    },
    #[error("Incorrect instance type. Actual: {actual:?}, expected: {expected}")]
    IncorrectType { expected: TypeInfo, actual: TypeId },
    #[error("Container for mod {mod_id} isn't bootstrapped yet")]
    NotInitialized { mod_id: &'static str },
    #[error("Container for mod {mod_id} failed to bootstrap and can't be used. Check the earlier bootstrap error")]
    Failed { mod_id: &'static str },
}

impl ResolveErrorKind {
    /// Keys of the cycle itself, without the path that led into it.
    /// Empty for every other error kind.
    #[must_use]
    pub fn cycle(&self) -> &[BindingKey] {
        match self {
            Self::CyclicDependency { path } => {
                let Some(last) = path.last() else {
                    return &[];
                };
                let start = path.iter().position(|key| key == last).unwrap_or(0);
                &path[start..]
            }
            _ => &[],
        }
    }
}

struct Requester<'a>(&'a Option<TypeInfo>);

impl Display for Requester<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(type_info) => write!(f, "{type_info}"),
            None => f.write_str("root request"),
        }
    }
}

struct Candidates<'a>(&'a [TypeInfo]);

impl Display for Candidates<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for (index, candidate) in self.0.iter().enumerate() {
            if index > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{candidate}")?;
        }
        Ok(())
    }
}

struct CyclePath<'a>(&'a [BindingKey]);

impl Display for CyclePath<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for (index, key) in self.0.iter().enumerate() {
            if index > 0 {
                f.write_str(" -> ")?;
            }
            write!(f, "{key}")?;
        }
        Ok(())
    }
}
