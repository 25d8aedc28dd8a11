use alloc::sync::Arc;

use crate::{
    any::{Map, TypeInfo},
    instance::Instance,
};

/// Fully constructed singletons keyed by the capability they were requested as.
/// Entries live as long as the context, nothing is evicted.
#[derive(Default)]
pub(crate) struct Cache {
    map: Map<Instance>,
}

impl Cache {
    #[inline]
    #[must_use]
    pub(crate) fn new() -> Self {
        Self { map: Map::new() }
    }

    #[must_use]
    pub(crate) fn get<C>(&self, capability: &TypeInfo) -> Option<Arc<C>>
    where
        C: ?Sized + Send + Sync + 'static,
    {
        self.map.get(capability).and_then(Instance::downcast)
    }

    #[inline]
    #[must_use]
    pub(crate) fn contains(&self, capability: &TypeInfo) -> bool {
        self.map.contains_key(capability)
    }

    #[inline]
    pub(crate) fn insert(&mut self, capability: TypeInfo, instance: Instance) -> Option<Instance> {
        self.map.insert(capability, instance)
    }

    #[inline]
    #[must_use]
    pub(crate) fn len(&self) -> usize {
        self.map.len()
    }
}
