use alloc::{collections::BTreeMap, sync::Arc};
use parking_lot::Mutex;

/// One construction lock per key.
///
/// Threads building different keys never wait on each other, so a thread holding the lock of
/// a component can take the locks of its dependencies.
pub(crate) struct KeyedLocks<K> {
    locks: Mutex<BTreeMap<K, Arc<Mutex<()>>>>,
}

impl<K: Ord> KeyedLocks<K> {
    #[inline]
    #[must_use]
    pub(crate) fn new() -> Self {
        Self {
            locks: Mutex::new(BTreeMap::new()),
        }
    }

    #[must_use]
    pub(crate) fn get(&self, key: K) -> Arc<Mutex<()>> {
        self.locks.lock().entry(key).or_default().clone()
    }
}

impl<K: Ord> Default for KeyedLocks<K> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}
