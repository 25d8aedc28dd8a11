use alloc::{boxed::Box, collections::BTreeMap};
use core::{
    any::{type_name, Any, TypeId},
    cmp::Ordering,
    fmt::{self, Debug, Display, Formatter},
};

/// Identity of a capability or an implementation.
///
/// Compared and ordered by [`TypeId`] only, the name is kept for logs and errors.
#[derive(Clone, Copy)]
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

impl Debug for TypeInfo {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

impl Display for TypeInfo {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.short_name())
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
        self.name.rsplit_once("::").map_or(self.name, |(_, name)| name)
    }
}

pub(crate) type BoxAny = Box<dyn Any + Send + Sync>;

pub(crate) type Map<V> = BTreeMap<TypeInfo, V>;

#[cfg(test)]
mod tests {
    use super::TypeInfo;

    trait Greeter {}
    struct LoudGreeter;

    #[test]
    fn test_eq_by_id() {
        assert_eq!(TypeInfo::of::<LoudGreeter>(), TypeInfo::of::<LoudGreeter>());
        assert_ne!(TypeInfo::of::<LoudGreeter>(), TypeInfo::of::<dyn Greeter>());
    }

    #[test]
    fn test_short_name() {
        assert_eq!(TypeInfo::of::<LoudGreeter>().short_name(), "LoudGreeter");
        assert_eq!(TypeInfo::of::<u8>().short_name(), "u8");
    }
}
