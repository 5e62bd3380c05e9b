use core::cell::UnsafeCell;
use core::fmt;
use core::ops::{Deref, DerefMut};
use core::sync::atomic::{AtomicU8, AtomicUsize, Ordering};

use crate::sync::os::{os_mutex_create, os_mutex_give, os_mutex_take};

/// Raw mutex trait.
///
/// This mutex is "raw", which means it does not actually contain the protected data, it
/// just implements the mutex mechanism. For most uses you should use [`Mutex`] instead,
/// which is generic over a RawMutex and contains the protected data.
///
/// Unlike a plain spin lock, the underlying object has to be created before first use,
/// and acquisition is bounded by a timeout.
///
/// # Safety
///
/// RawMutex implementations must ensure that, while locked, no other task can lock
/// the RawMutex concurrently.
///
/// Unsafe code is allowed to rely on this fact, so incorrect implementations will cause undefined behavior.
pub unsafe trait RawMutex {
    /// An instance that has not been created yet.
    ///
    /// This is a const instead of a method to allow creating instances in const context.
    const INIT: Self;

    /// Creates the underlying lock object. Calling this on an already created
    /// mutex is a no-op that returns `true`.
    fn create(&self) -> bool;

    fn is_created(&self) -> bool;

    /// Tries to lock this `RawMutex`, waiting at most `wait_ms` milliseconds.
    fn try_lock_for(&self, wait_ms: u32) -> bool;

    /// Unlock this `RawMutex`.
    fn unlock(&self);
}

const UNCREATED: u8 = 0;
const CREATING: u8 = 1;
const CREATED: u8 = 2;

/// Raw mutex backed by an RTOS mutex object.
///
/// Creation is claimed with a compare-exchange, so racing `create` calls
/// produce a single OS object. A loser spins until the winner finishes.
pub struct RtosRawMutex {
    state: AtomicU8,
    handle: AtomicUsize,
}

impl RtosRawMutex {
    pub const fn new() -> Self {
        Self { state: AtomicU8::new(UNCREATED), handle: AtomicUsize::new(0) }
    }
}

impl Default for RtosRawMutex {
    fn default() -> Self {
        Self::new()
    }
}

unsafe impl RawMutex for RtosRawMutex {
    const INIT: Self = Self::new();

    fn create(&self) -> bool {
        loop {
            match self.state.compare_exchange(UNCREATED, CREATING, Ordering::Acquire, Ordering::Acquire) {
                Ok(_) => {
                    return match os_mutex_create() {
                        Some(handle) => {
                            self.handle.store(handle, Ordering::Relaxed);
                            self.state.store(CREATED, Ordering::Release);
                            true
                        }
                        None => {
                            // let a later call retry
                            self.state.store(UNCREATED, Ordering::Release);
                            false
                        }
                    };
                }
                Err(CREATED) => return true,
                Err(_) => core::hint::spin_loop(),
            }
        }
    }

    fn is_created(&self) -> bool {
        self.state.load(Ordering::Acquire) == CREATED
    }

    fn try_lock_for(&self, wait_ms: u32) -> bool {
        self.is_created() && os_mutex_take(self.handle.load(Ordering::Relaxed), wait_ms)
    }

    fn unlock(&self) {
        let handle = self.handle.load(Ordering::Relaxed);
        if !os_mutex_give(handle) {
            debug!("mutex {:#x}: give failed", handle);
        }
    }
}

/// Why a lock attempt failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockError {
    /// `create` was never called, or failed
    NotCreated,
    /// The wait expired before the lock became available
    Timeout,
}

/// A mutual exclusion primitive that owns the data it protects.
///
/// The data can only be accessed through the RAII guard returned from [`lock`],
/// which guarantees that the data is only ever accessed when the mutex is locked.
/// The mutex has to be created with [`create`] before it can be locked.
///
/// [`lock`]: Self::lock
/// [`create`]: Self::create
pub struct Mutex<R: RawMutex, T: ?Sized> {
    raw: R,
    data: UnsafeCell<T>,
}

/// Mutex over an RTOS mutex object.
pub type OsMutex<T> = Mutex<RtosRawMutex, T>;

// these are the only places where `T: Send` matters; all other
// functionality works fine on a single task.
unsafe impl<R: RawMutex + Send, T: ?Sized + Send> Send for Mutex<R, T> {}
unsafe impl<R: RawMutex + Sync, T: ?Sized + Send> Sync for Mutex<R, T> {}

/// An RAII implementation of a "scoped lock" of a mutex. When this structure is
/// dropped (falls out of scope), the lock will be unlocked.
///
/// The data protected by the mutex can be accessed through this guard via its
/// [`Deref`] and [`DerefMut`] implementations.
pub struct MutexGuard<'a, R: RawMutex, T: ?Sized + 'a> {
    lock: &'a Mutex<R, T>,
}

unsafe impl<R: RawMutex + Sync, T: ?Sized + Sync> Sync for MutexGuard<'_, R, T> {}

impl<R: RawMutex, T> Mutex<R, T> {
    /// Creates a new mutex. The lock object itself is not created yet.
    pub const fn new(t: T) -> Self {
        Mutex { raw: R::INIT, data: UnsafeCell::new(t) }
    }
}

impl<R: RawMutex, T: ?Sized> Mutex<R, T> {
    /// Creates the underlying lock object. Returns `false` if the OS could not
    /// provide one. A mutex is created at most once and never destroyed.
    pub fn create(&self) -> bool {
        self.raw.create()
    }

    pub fn is_created(&self) -> bool {
        self.raw.is_created()
    }

    /// Acquires the mutex, blocking the current task for at most `wait_ms`
    /// milliseconds.
    ///
    /// # Errors
    ///
    /// * `LockError::NotCreated` if the mutex was never created
    /// * `LockError::Timeout` if the mutex could not be acquired in time
    pub fn lock(&self, wait_ms: u32) -> Result<MutexGuard<'_, R, T>, LockError> {
        if !self.raw.is_created() {
            return Err(LockError::NotCreated);
        }

        if self.raw.try_lock_for(wait_ms) {
            Ok(MutexGuard { lock: self })
        } else {
            Err(LockError::Timeout)
        }
    }

    /// Returns a mutable reference to the underlying data.
    ///
    /// Since this call borrows the `Mutex` mutably, no actual locking needs to
    /// take place -- the mutable borrow statically guarantees no locks exist.
    pub fn get_mut(&mut self) -> &mut T {
        self.data.get_mut()
    }
}

impl<R: RawMutex, T: ?Sized> Deref for MutexGuard<'_, R, T> {
    type Target = T;

    fn deref(&self) -> &T {
        unsafe { &*self.lock.data.get() }
    }
}

impl<R: RawMutex, T: ?Sized> DerefMut for MutexGuard<'_, R, T> {
    fn deref_mut(&mut self) -> &mut T {
        unsafe { &mut *self.lock.data.get() }
    }
}

impl<R: RawMutex, T: ?Sized> Drop for MutexGuard<'_, R, T> {
    #[inline]
    fn drop(&mut self) {
        self.lock.raw.unlock();
    }
}

impl<R: RawMutex, T: ?Sized + fmt::Debug> fmt::Debug for MutexGuard<'_, R, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&**self, f)
    }
}
