// CLASSIFICATION: COMMUNITY
// Filename: src/lock_table.rs v0.3
// Author: Lukas Bower
// Date Modified: 2027-09-02

//! Per-path mutual exclusion for concurrent file operations.
//!
//! The table hands out one lock handle per distinct resolved path so that
//! concurrent operations on the same file execute one at a time while
//! operations on different files proceed in parallel. Entries are created
//! lazily, looked up by exact string match, and retained for the process
//! lifetime. The table is capacity-bounded: once full, lookups for new
//! paths return `None` and the caller proceeds without synchronisation.

use std::sync::{Arc, Mutex, MutexGuard};

use log::warn;

struct PathLockEntry {
    resolved_path: String,
    handle: Arc<Mutex<()>>,
}

/// Registry mapping resolved paths to their lock handles.
///
/// The table itself is guarded by one table-wide mutex, distinct from the
/// per-path locks it hands out. [`PathLockTable::acquire_for`] only
/// finds or creates a handle; callers lock the returned handle around the
/// filesystem operation, never while the table-wide lock is held.
pub struct PathLockTable {
    entries: Mutex<Vec<PathLockEntry>>,
    capacity: usize,
}

impl PathLockTable {
    /// Create an empty table that tracks at most `capacity` distinct paths.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: Mutex::new(Vec::new()),
            capacity,
        }
    }

    /// Find or create the lock handle for `resolved_path`.
    ///
    /// Returns `None` when the path is untracked and the table is full;
    /// the caller must then operate without synchronisation. The returned
    /// handle is not locked by this call.
    pub fn acquire_for(&self, resolved_path: &str) -> Option<Arc<Mutex<()>>> {
        let mut entries = lock_entries(&self.entries);
        if let Some(entry) = entries
            .iter()
            .find(|entry| entry.resolved_path == resolved_path)
        {
            return Some(entry.handle.clone());
        }
        if entries.len() >= self.capacity {
            warn!(
                "lock table full ({} paths); {} proceeds unsynchronised",
                self.capacity, resolved_path
            );
            return None;
        }
        let handle = Arc::new(Mutex::new(()));
        entries.push(PathLockEntry {
            resolved_path: resolved_path.to_owned(),
            handle: handle.clone(),
        });
        Some(handle)
    }

    /// Number of distinct paths currently tracked.
    #[must_use]
    pub fn len(&self) -> usize {
        lock_entries(&self.entries).len()
    }

    /// Whether no path has been tracked yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Maximum number of distinct paths this table will ever track.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

fn lock_entries(entries: &Mutex<Vec<PathLockEntry>>) -> MutexGuard<'_, Vec<PathLockEntry>> {
    match entries.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_path_shares_one_handle() {
        let table = PathLockTable::new(4);
        let first = table.acquire_for("/srv/a").expect("handle");
        let second = table.acquire_for("/srv/a").expect("handle");
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn distinct_paths_get_distinct_handles() {
        let table = PathLockTable::new(4);
        let a = table.acquire_for("/srv/a").expect("handle");
        let b = table.acquire_for("/srv/b").expect("handle");
        assert!(!Arc::ptr_eq(&a, &b));
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn full_table_degrades_to_none_for_new_paths() {
        let table = PathLockTable::new(2);
        assert!(table.acquire_for("/srv/a").is_some());
        assert!(table.acquire_for("/srv/b").is_some());
        assert!(table.acquire_for("/srv/c").is_none());
        // Existing paths keep resolving after the table fills up.
        assert!(table.acquire_for("/srv/a").is_some());
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn handles_are_returned_unlocked() {
        let table = PathLockTable::new(1);
        let handle = table.acquire_for("/srv/a").expect("handle");
        let guard = handle.try_lock();
        assert!(guard.is_ok());
    }
}
