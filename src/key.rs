use alloc::borrow::Cow;
use core::fmt::{self, Display, Formatter};

use crate::any::TypeInfo;

/// Disambiguating name of a binding, e.g. `"file"` or `"database"`
pub type Identifier = Cow<'static, str>;

/// Requested type, optionally qualified by an identifier.
///
/// Keys that differ only by identifier are distinct and never collide.
/// An unqualified key never matches a qualified binding and vice versa.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct BindingKey {
    pub type_info: TypeInfo,
    pub identifier: Option<Identifier>,
}

impl BindingKey {
    #[inline]
    #[must_use]
    pub const fn new(type_info: TypeInfo, identifier: Option<Identifier>) -> Self {
        Self { type_info, identifier }
    }

    #[inline]
    #[must_use]
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self::new(TypeInfo::of::<T>(), None)
    }

    #[inline]
    #[must_use]
    pub fn named<T: ?Sized + 'static>(identifier: impl Into<Identifier>) -> Self {
        Self::new(TypeInfo::of::<T>(), Some(identifier.into()))
    }

    #[inline]
    #[must_use]
    pub const fn is_qualified(&self) -> bool {
        self.identifier.is_some()
    }
}

impl Display for BindingKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match &self.identifier {
            Some(identifier) => write!(f, "{}(\"{identifier}\")", self.type_info),
            None => write!(f, "{}", self.type_info),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::BindingKey;

    use alloc::{collections::BTreeSet, string::ToString as _};

    struct Storage;

    #[test]
    fn test_qualified_keys_never_collide() {
        let keys = BTreeSet::from([
            BindingKey::of::<Storage>(),
            BindingKey::named::<Storage>("file"),
            BindingKey::named::<Storage>("database"),
        ]);

        assert_eq!(keys.len(), 3);
        assert!(keys.contains(&BindingKey::named::<Storage>("file")));
        assert!(!BindingKey::of::<Storage>().is_qualified());
        assert!(BindingKey::named::<Storage>("file").is_qualified());
    }

    #[test]
    fn test_display() {
        assert_eq!(BindingKey::of::<Storage>().to_string(), "Storage");
        assert_eq!(BindingKey::named::<Storage>("file").to_string(), "Storage(\"file\")");
    }
}
