//! Monitor-based reader-writer lock
//!
//! Any number of readers may hold the lock at once; a writer holds it alone.
//! There is no fairness: while readers keep arriving a waiting writer can be
//! starved indefinitely.

use std::cell::UnsafeCell;
use std::ops::{Deref, DerefMut};
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};

#[derive(Debug, Default)]
struct LockState {
    readers: usize,
    writer: bool,
}

/// ReadWriteLock guards a value with shared-read, exclusive-write access
///
/// Acquisition returns a guard; dropping the guard releases the lock and wakes
/// every waiter so each can re-check whether it may proceed.
pub struct ReadWriteLock<T> {
    state: Mutex<LockState>,
    changed: Condvar,
    value: UnsafeCell<T>,
}

// Access to `value` is mediated by `state`: shared references only while
// readers > 0 and no writer, a unique reference only while writer is set.
unsafe impl<T: Send> Send for ReadWriteLock<T> {}
unsafe impl<T: Send + Sync> Sync for ReadWriteLock<T> {}

impl<T> ReadWriteLock<T> {
    pub fn new(value: T) -> Self {
        Self {
            state: Mutex::new(LockState::default()),
            changed: Condvar::new(),
            value: UnsafeCell::new(value),
        }
    }

    fn lock_state(&self) -> MutexGuard<'_, LockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Blocks while a writer is active, then registers as a reader
    pub fn acquire_read(&self) -> ReadGuard<'_, T> {
        let mut state = self.lock_state();
        while state.writer {
            state = self
                .changed
                .wait(state)
                .unwrap_or_else(PoisonError::into_inner);
        }
        state.readers += 1;
        ReadGuard { lock: self }
    }

    /// Blocks while any reader or another writer is active, then claims the lock
    pub fn acquire_write(&self) -> WriteGuard<'_, T> {
        let mut state = self.lock_state();
        while state.writer || state.readers > 0 {
            state = self
                .changed
                .wait(state)
                .unwrap_or_else(PoisonError::into_inner);
        }
        state.writer = true;
        WriteGuard { lock: self }
    }

    fn release_read(&self) {
        let mut state = self.lock_state();
        state.readers = state.readers.saturating_sub(1);
        self.changed.notify_all();
    }

    fn release_write(&self) {
        let mut state = self.lock_state();
        state.writer = false;
        self.changed.notify_all();
    }

    /// Number of readers currently holding the lock
    pub fn readers(&self) -> usize {
        self.lock_state().readers
    }

    /// Returns true if a writer currently holds the lock
    pub fn is_write_locked(&self) -> bool {
        self.lock_state().writer
    }

    pub fn into_inner(self) -> T {
        self.value.into_inner()
    }
}

impl<T: Default> Default for ReadWriteLock<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

/// Shared access to the guarded value
pub struct ReadGuard<'a, T> {
    lock: &'a ReadWriteLock<T>,
}

impl<T> Deref for ReadGuard<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        // SAFETY: this guard is a registered reader, so no writer is active
        unsafe { &*self.lock.value.get() }
    }
}

impl<T> Drop for ReadGuard<'_, T> {
    fn drop(&mut self) {
        self.lock.release_read();
    }
}

/// Exclusive access to the guarded value
pub struct WriteGuard<'a, T> {
    lock: &'a ReadWriteLock<T>,
}

impl<T> Deref for WriteGuard<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        // SAFETY: this guard is the only active writer and there are no readers
        unsafe { &*self.lock.value.get() }
    }
}

impl<T> DerefMut for WriteGuard<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        // SAFETY: as above, and `&mut self` keeps the reference unique
        unsafe { &mut *self.lock.value.get() }
    }
}

impl<T> Drop for WriteGuard<'_, T> {
    fn drop(&mut self) {
        self.lock.release_write();
    }
}
