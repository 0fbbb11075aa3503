use alloc::{boxed::Box, sync::Arc};
use core::{
    any::{type_name, Any, TypeId},
    cmp::Ordering,
    fmt::{self, Display, Formatter, Write as _},
};

/// Instance under construction: owned and still mutable, so fields can be injected and hooks called
pub(crate) type BoxedInstance = Box<dyn Any + Send + Sync>;

/// Fully initialized instance. Always holds an `Arc<T>`, where `T` is the concrete class
/// or the interface type it was cast to.
pub(crate) type Instance = Arc<dyn Any + Send + Sync>;

#[derive(Debug, Clone, Copy)]
pub struct TypeInfo {
    pub name: &'static str,
    pub id: TypeId,
}

impl PartialEq for TypeInfo {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeInfo {}

impl PartialOrd for TypeInfo {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TypeInfo {
    fn cmp(&self, other: &Self) -> Ordering {
        self.id.cmp(&other.id)
    }
}

impl TypeInfo {
    #[inline]
    #[must_use]
    pub fn of<T>() -> Self
    where
        T: ?Sized + 'static,
    {
        Self {
            name: type_name::<T>(),
            id: TypeId::of::<T>(),
        }
    }

    #[inline]
    #[must_use]
    pub fn short_name(&self) -> &'static str {
        short_segment(self.name)
    }
}

#[inline]
fn short_segment(path: &str) -> &str {
    path.rsplit_once("::").map_or(path, |(_, name)| name)
}

/// Writes the type name with every path prefix stripped, generics included:
/// `alloc::sync::Arc<dyn my_mod::Storage>` is shown as `Arc<dyn Storage>`.
impl Display for TypeInfo {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let mut token_start = 0;
        for (index, ch) in self.name.char_indices() {
            if matches!(ch, '<' | '>' | ',' | ' ' | '(' | ')' | '[' | ']' | '&' | ';') {
                f.write_str(short_segment(&self.name[token_start..index]))?;
                f.write_char(ch)?;
                token_start = index + ch.len_utf8();
            }
        }
        f.write_str(short_segment(&self.name[token_start..]))
    }
}

#[cfg(test)]
mod tests {
    use super::TypeInfo;

    use alloc::{string::ToString as _, sync::Arc};

    trait Storage {}

    struct FileStorage;

    #[test]
    fn test_equality_by_id() {
        let mut renamed = TypeInfo::of::<FileStorage>();
        renamed.name = "other";

        assert_eq!(renamed, TypeInfo::of::<FileStorage>());
        assert_ne!(TypeInfo::of::<FileStorage>(), TypeInfo::of::<dyn Storage>());
    }

    #[test]
    fn test_display_strips_paths() {
        assert_eq!(TypeInfo::of::<FileStorage>().to_string(), "FileStorage");
        assert_eq!(TypeInfo::of::<dyn Storage>().to_string(), "dyn Storage");
        assert_eq!(TypeInfo::of::<Arc<dyn Storage>>().to_string(), "Arc<dyn Storage>");
        assert_eq!(TypeInfo::of::<(u8, FileStorage)>().to_string(), "(u8, FileStorage)");
    }

    #[test]
    fn test_short_name() {
        assert_eq!(TypeInfo::of::<FileStorage>().short_name(), "FileStorage");
    }
}
