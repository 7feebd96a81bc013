//! Per-record locking.

use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::debug;

/// Default interval between cleanup runs (10 minutes).
pub const DEFAULT_CLEANUP_INTERVAL: Duration = Duration::from_secs(600);

/// Default max idle age before a lock is considered stale (30 minutes).
pub const DEFAULT_MAX_IDLE_AGE: Duration = Duration::from_secs(1800);

/// Maps key to (lock, last_access_time).
type LockStorage<K> = DashMap<K, (Arc<Mutex<()>>, Instant)>;

/// Per-key async mutex with stale entry cleanup.
///
/// Operations on the same key are serialized while different keys proceed
/// concurrently. The student update path holds the lock for one id across
/// its fetch, merge and write so concurrent patches cannot interleave.
#[derive(Debug)]
pub struct KeyedLocks<K: Eq + Hash> {
    locks: Arc<LockStorage<K>>,
}

impl<K: Eq + Hash> Clone for KeyedLocks<K> {
    fn clone(&self) -> Self {
        Self {
            locks: Arc::clone(&self.locks),
        }
    }
}

impl<K> KeyedLocks<K>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self {
            locks: Arc::new(DashMap::new()),
        }
    }

    /// Create a lock collection and spawn its cleanup task.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn with_cleanup(name: &'static str) -> Self {
        let locks = Self::new();
        locks
            .clone()
            .spawn_cleanup_task(DEFAULT_CLEANUP_INTERVAL, DEFAULT_MAX_IDLE_AGE, name);
        locks
    }

    /// Get or create the lock for `key`, refreshing its last-access time.
    pub fn get(&self, key: &K) -> Arc<Mutex<()>> {
        let now = Instant::now();
        self.locks
            .entry(key.clone())
            .and_modify(|(_, last_access)| *last_access = now)
            .or_insert_with(|| (Arc::new(Mutex::new(())), now))
            .0
            .clone()
    }

    /// Remove entries idle for longer than `max_age` that nobody holds.
    ///
    /// Returns the number of entries removed.
    pub fn cleanup_stale(&self, max_age: Duration) -> usize {
        let now = Instant::now();
        let before = self.locks.len();
        self.locks.retain(|_, (lock, last_access)| {
            Arc::strong_count(lock) > 1 || now.duration_since(*last_access) <= max_age
        });
        before.saturating_sub(self.locks.len())
    }

    fn spawn_cleanup_task(self, interval: Duration, max_age: Duration, name: &'static str) {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;
                let removed = self.cleanup_stale(max_age);
                if removed > 0 {
                    debug!(
                        removed = removed,
                        remaining = self.len(),
                        locks = name,
                        "Cleaned up stale locks"
                    );
                }
            }
        });
    }

    pub fn len(&self) -> usize {
        self.locks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}

impl<K> Default for KeyedLocks<K>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_id_shares_a_lock() {
        let locks = KeyedLocks::<i64>::new();
        assert!(Arc::ptr_eq(&locks.get(&1), &locks.get(&1)));
        assert!(!Arc::ptr_eq(&locks.get(&1), &locks.get(&2)));
        assert_eq!(locks.len(), 2);
    }

    #[tokio::test]
    async fn same_id_serializes() {
        let locks = KeyedLocks::<i64>::new();
        let lock = locks.get(&7);
        let _guard = lock.try_lock().unwrap();

        assert!(locks.get(&7).try_lock().is_err());
        assert!(locks.get(&8).try_lock().is_ok());
    }

    #[test]
    fn cleanup_removes_only_idle_unheld_entries() {
        let locks = KeyedLocks::<i64>::new();
        let old = Instant::now() - Duration::from_secs(10);

        locks.locks.insert(1, (Arc::new(Mutex::new(())), old));
        let held = Arc::new(Mutex::new(()));
        locks.locks.insert(2, (Arc::clone(&held), old));
        locks.get(&3);

        let removed = locks.cleanup_stale(Duration::from_secs(5));

        assert_eq!(removed, 1);
        assert!(!locks.locks.contains_key(&1));
        assert!(locks.locks.contains_key(&2));
        assert!(locks.locks.contains_key(&3));
    }

    #[test]
    fn cleanup_on_empty_is_safe() {
        let locks = KeyedLocks::<i64>::default();
        assert_eq!(locks.cleanup_stale(Duration::from_secs(1)), 0);
        assert!(locks.is_empty());
    }
}
