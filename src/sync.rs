//! Lock primitives for the shared clustering engine.
//!
//! Uses `parking_lot::Mutex` when the `fast-lock` feature is enabled and
//! `std::sync::Mutex` otherwise. Callers go through [`lock`] and
//! [`try_lock`] so the choice stays invisible to them.

#[cfg(feature = "fast-lock")]
use parking_lot::Mutex as ParkingLotMutex;

#[cfg(not(feature = "fast-lock"))]
use std::sync::Mutex as StdMutex;

/// Mutex type backing [`crate::engine::SharedEngine`].
///
/// ```rust
/// use coreflink::sync::{lock, Mutex};
///
/// let data = Mutex::new(42);
/// *lock(&data) = 100;
/// assert_eq!(*lock(&data), 100);
/// ```
#[cfg(feature = "fast-lock")]
pub type Mutex<T> = ParkingLotMutex<T>;

/// Mutex type backing [`crate::engine::SharedEngine`].
///
/// ```rust
/// use coreflink::sync::{lock, Mutex};
///
/// let data = Mutex::new(42);
/// *lock(&data) = 100;
/// assert_eq!(*lock(&data), 100);
/// ```
#[cfg(not(feature = "fast-lock"))]
pub type Mutex<T> = StdMutex<T>;

/// Guard returned by [`lock`] and [`try_lock`].
#[cfg(feature = "fast-lock")]
pub type MutexGuard<'a, T> = parking_lot::MutexGuard<'a, T>;

/// Guard returned by [`lock`] and [`try_lock`].
#[cfg(not(feature = "fast-lock"))]
pub type MutexGuard<'a, T> = std::sync::MutexGuard<'a, T>;

/// Block until the mutex is acquired.
///
/// A poisoned `std` mutex is recovered: an engine that panicked mid-call
/// does not lock every later document out.
#[cfg(feature = "fast-lock")]
pub fn lock<T: ?Sized>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock()
}

/// Block until the mutex is acquired.
///
/// A poisoned `std` mutex is recovered: an engine that panicked mid-call
/// does not lock every later document out.
#[cfg(not(feature = "fast-lock"))]
pub fn lock<T: ?Sized>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

/// Acquire the mutex only if nobody holds it.
#[cfg(feature = "fast-lock")]
pub fn try_lock<T: ?Sized>(mutex: &Mutex<T>) -> crate::Result<MutexGuard<'_, T>> {
    mutex
        .try_lock()
        .ok_or_else(|| crate::Error::engine_busy("lock held by another caller"))
}

/// Acquire the mutex only if nobody holds it.
#[cfg(not(feature = "fast-lock"))]
pub fn try_lock<T: ?Sized>(mutex: &Mutex<T>) -> crate::Result<MutexGuard<'_, T>> {
    match mutex.try_lock() {
        Ok(guard) => Ok(guard),
        Err(std::sync::TryLockError::Poisoned(poison)) => Ok(poison.into_inner()),
        Err(std::sync::TryLockError::WouldBlock) => {
            Err(crate::Error::engine_busy("lock held by another caller"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_try_lock_reports_contention() {
        let mutex = Mutex::new(1);
        let _held = lock(&mutex);
        let err = try_lock(&mutex).err().unwrap();
        assert!(matches!(err, crate::Error::EngineBusy(_)));
    }

    #[test]
    fn test_try_lock_succeeds_when_free() {
        let mutex = Mutex::new(1);
        assert_eq!(*try_lock(&mutex).unwrap(), 1);
    }
}
