//! Mutual exclusion for write-side file operations.

use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError};

/// Handle serializing file mutations.
///
/// Clones share the same lock. Each create, remove or move operation holds
/// it for exactly that one operation and releases it on every exit path.
/// Readers such as the walker never take it.
#[derive(Debug, Clone, Default)]
pub struct FileLock {
    inner: Arc<Mutex<()>>,
}

impl FileLock {
    /// Create an independent lock.
    pub fn new() -> Self {
        Self::default()
    }

    /// The lock shared by everything in the process that asks for it.
    pub fn global() -> Self {
        static GLOBAL: OnceLock<FileLock> = OnceLock::new();
        GLOBAL.get_or_init(FileLock::new).clone()
    }

    /// Block until the lock is held. Released when the guard drops.
    ///
    /// A panic inside a previous critical section does not poison the lock.
    pub fn acquire(&self) -> MutexGuard<'_, ()> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Run `f` while holding the lock.
    pub fn with<T>(&self, f: impl FnOnce() -> T) -> T {
        let _guard = self.acquire();
        f()
    }

    /// True if both handles guard the same lock.
    pub fn same_as(&self, other: &FileLock) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_critical_sections_do_not_overlap() {
        let lock = FileLock::new();
        let inside = Arc::new(AtomicBool::new(false));
        let overlaps = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let lock = lock.clone();
                let inside = inside.clone();
                let overlaps = overlaps.clone();
                thread::spawn(move || {
                    for _ in 0..20 {
                        lock.with(|| {
                            if inside.swap(true, Ordering::SeqCst) {
                                overlaps.fetch_add(1, Ordering::SeqCst);
                            }
                            thread::sleep(Duration::from_micros(50));
                            inside.store(false, Ordering::SeqCst);
                        });
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(overlaps.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_released_after_panic() {
        let lock = FileLock::new();
        let worker = lock.clone();
        let result = thread::spawn(move || {
            worker.with(|| panic!("write failed"));
        })
        .join();
        assert!(result.is_err());

        // Still usable
        assert_eq!(lock.with(|| 7), 7);
    }

    #[test]
    fn test_global_is_shared() {
        assert!(FileLock::global().same_as(&FileLock::global()));
        assert!(!FileLock::new().same_as(&FileLock::new()));
    }
}
