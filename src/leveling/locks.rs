use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::{
    Mutex as AsyncMutex, OwnedMutexGuard, OwnedRwLockReadGuard, OwnedRwLockWriteGuard, RwLock,
};

/// One async mutex per key, created on demand.
///
/// Serializes read-modify-write cycles on the same key while leaving
/// unrelated keys free to proceed concurrently.
pub struct KeyedLocks<K> {
    locks: Mutex<HashMap<K, Arc<AsyncMutex<()>>>>,
}

impl<K> Default for KeyedLocks<K> {
    fn default() -> Self {
        Self {
            locks: Mutex::new(HashMap::new()),
        }
    }
}

impl<K: Eq + Hash + Clone> KeyedLocks<K> {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn lock(&self, key: K) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
            locks.entry(key).or_default().clone()
        };
        lock.lock_owned().await
    }

    /// Drops mutexes nobody holds or waits on.
    pub fn prune(&self) {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        locks.retain(|_, lock| Arc::strong_count(lock) > 1);
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.locks.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}

/// One async read/write lock per key.
///
/// Many holders may share a key for reading; a writer waits for them to
/// drain and then excludes everyone.
pub struct KeyedRwLocks<K> {
    locks: Mutex<HashMap<K, Arc<RwLock<()>>>>,
}

impl<K> Default for KeyedRwLocks<K> {
    fn default() -> Self {
        Self {
            locks: Mutex::new(HashMap::new()),
        }
    }
}

impl<K: Eq + Hash + Clone> KeyedRwLocks<K> {
    pub fn new() -> Self {
        Self::default()
    }

    fn entry(&self, key: K) -> Arc<RwLock<()>> {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        locks.entry(key).or_default().clone()
    }

    pub async fn read(&self, key: K) -> OwnedRwLockReadGuard<()> {
        self.entry(key).read_owned().await
    }

    pub async fn write(&self, key: K) -> OwnedRwLockWriteGuard<()> {
        self.entry(key).write_owned().await
    }

    pub fn prune(&self) {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        locks.retain(|_, lock| Arc::strong_count(lock) > 1);
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.locks.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn same_key_is_exclusive() {
        let locks = KeyedLocks::new();
        let guard = locks.lock((1u64, 2u64)).await;

        let second = tokio::time::timeout(Duration::from_millis(50), locks.lock((1, 2))).await;
        assert!(second.is_err());

        drop(guard);
        let third = tokio::time::timeout(Duration::from_millis(50), locks.lock((1, 2))).await;
        assert!(third.is_ok());
    }

    #[tokio::test]
    async fn different_keys_do_not_block() {
        let locks = KeyedLocks::new();
        let _a = locks.lock((1u64, 2u64)).await;

        let b = tokio::time::timeout(Duration::from_millis(50), locks.lock((1, 3))).await;
        assert!(b.is_ok());
    }

    #[tokio::test]
    async fn prune_keeps_held_locks() {
        let locks = KeyedLocks::new();
        let held = locks.lock(1u64).await;
        drop(locks.lock(2u64).await);

        locks.prune();
        assert_eq!(locks.len(), 1);

        drop(held);
        locks.prune();
        assert_eq!(locks.len(), 0);
    }

    #[tokio::test]
    async fn readers_share_writer_excludes() {
        let locks = KeyedRwLocks::new();
        let first = locks.read(7u64).await;
        let second = tokio::time::timeout(Duration::from_millis(50), locks.read(7)).await;
        assert!(second.is_ok());

        let writer = tokio::time::timeout(Duration::from_millis(50), locks.write(7)).await;
        assert!(writer.is_err());

        drop(first);
        drop(second);
        let writer = locks.write(7).await;
        let reader = tokio::time::timeout(Duration::from_millis(50), locks.read(7)).await;
        assert!(reader.is_err());

        let other = tokio::time::timeout(Duration::from_millis(50), locks.read(8)).await;
        assert!(other.is_ok());
        drop(writer);
    }

    #[tokio::test]
    async fn rw_prune_keeps_held_locks() {
        let locks = KeyedRwLocks::new();
        let held = locks.read(1u64).await;
        drop(locks.write(2u64).await);

        locks.prune();
        assert_eq!(locks.len(), 1);

        drop(held);
        locks.prune();
        assert_eq!(locks.len(), 0);
    }
}
