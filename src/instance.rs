use alloc::{boxed::Box, sync::Arc};

use crate::any::{BoxAny, TypeInfo};

/// Shared handle to a constructed object, typed by the capability it is exposed as.
///
/// Holds an `Arc<C>` behind [`core::any::Any`], so it can travel through configurators,
/// proxy wrappers and the singleton cache without knowing `C`.
pub struct Instance {
    capability: TypeInfo,
    value: BoxAny,
}

impl Instance {
    #[inline]
    #[must_use]
    pub fn new<C>(value: Arc<C>) -> Self
    where
        C: ?Sized + Send + Sync + 'static,
    {
        Self {
            capability: TypeInfo::of::<C>(),
            value: Box::new(value),
        }
    }

    /// Capability the handle is typed by
    #[inline]
    #[must_use]
    pub fn capability(&self) -> TypeInfo {
        self.capability
    }

    #[inline]
    #[must_use]
    pub fn is<C: ?Sized + 'static>(&self) -> bool {
        self.capability == TypeInfo::of::<C>()
    }

    /// Returns a new reference to the object if the handle is typed by `C`
    #[inline]
    #[must_use]
    pub fn downcast<C>(&self) -> Option<Arc<C>>
    where
        C: ?Sized + Send + Sync + 'static,
    {
        self.value.downcast_ref::<Arc<C>>().cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::Instance;

    use alloc::sync::Arc;

    trait Greeter: Send + Sync {
        fn greet(&self) -> &'static str;
    }

    struct LoudGreeter;

    impl Greeter for LoudGreeter {
        fn greet(&self) -> &'static str {
            "HELLO"
        }
    }

    #[test]
    fn test_downcast_by_capability() {
        let greeter: Arc<dyn Greeter> = Arc::new(LoudGreeter);
        let instance = Instance::new(greeter.clone());

        assert!(instance.is::<dyn Greeter>());
        assert!(!instance.is::<LoudGreeter>());
        assert!(instance.downcast::<LoudGreeter>().is_none());

        let resolved = instance.downcast::<dyn Greeter>().unwrap();
        assert!(Arc::ptr_eq(&resolved, &greeter));
        assert_eq!(resolved.greet(), "HELLO");
    }
}
