//! Optional references over repository slots.
//!
//! Every data access resolves to an [`OptRef`] or [`OptMut`]: either a
//! reference that keeps the slot's reader-writer guard alive for its own
//! lifetime, or an absence marker. Absence is how permission mismatches and
//! unconstructed slots surface; callers decide whether to branch on it with
//! [`match_with`](OptRef::match_with) or to treat it as a bug with
//! [`require`](OptRef::require).

use std::any;
use std::fmt;
use std::ops;

use parking_lot::{MappedRwLockReadGuard, MappedRwLockWriteGuard};

/// A shared reference to a slot value, or an absence marker.
pub struct OptRef<'t, T> {
    inner: Option<MappedRwLockReadGuard<'t, T>>,
}

impl<'t, T> OptRef<'t, T> {
    pub(crate) fn present(guard: MappedRwLockReadGuard<'t, T>) -> Self {
        Self { inner: Some(guard) }
    }

    pub(crate) fn absent() -> Self { Self { inner: None } }

    /// Whether a value is present.
    pub fn has_value(&self) -> bool { self.inner.is_some() }

    /// The value, or `None` when absent.
    pub fn get(&self) -> Option<&T> { self.inner.as_deref() }

    /// Calls `empty` or `present` depending on whether a value is present.
    pub fn match_with<R>(&self, empty: impl FnOnce() -> R, present: impl FnOnce(&T) -> R) -> R {
        match &self.inner {
            Some(value) => present(value),
            None => empty(),
        }
    }

    /// Calls `present` with the value.
    ///
    /// # Panics
    /// Panics when the reference is absent.
    pub fn require<R>(&self, present: impl FnOnce(&T) -> R) -> R {
        match &self.inner {
            Some(value) => present(value),
            None => panic!("required {} value is absent", any::type_name::<T>()),
        }
    }
}

impl<'t, T> ops::Deref for OptRef<'t, T> {
    type Target = T;

    fn deref(&self) -> &T {
        match &self.inner {
            Some(value) => value,
            None => panic!("dereferenced an absent {} reference", any::type_name::<T>()),
        }
    }
}

impl<'t, T: fmt::Debug> fmt::Debug for OptRef<'t, T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.inner {
            Some(value) => f.debug_tuple("Present").field(&**value).finish(),
            None => f.write_str("Absent"),
        }
    }
}

/// An exclusive reference to a slot value, or an absence marker.
pub struct OptMut<'t, T> {
    inner: Option<MappedRwLockWriteGuard<'t, T>>,
}

impl<'t, T> OptMut<'t, T> {
    pub(crate) fn present(guard: MappedRwLockWriteGuard<'t, T>) -> Self {
        Self { inner: Some(guard) }
    }

    pub(crate) fn absent() -> Self { Self { inner: None } }

    /// Whether a value is present.
    pub fn has_value(&self) -> bool { self.inner.is_some() }

    /// The value, or `None` when absent.
    pub fn get(&self) -> Option<&T> { self.inner.as_deref() }

    /// The value for mutation, or `None` when absent.
    pub fn get_mut(&mut self) -> Option<&mut T> { self.inner.as_deref_mut() }

    /// Calls `empty` or `present` depending on whether a value is present.
    pub fn match_with<R>(
        &mut self,
        empty: impl FnOnce() -> R,
        present: impl FnOnce(&mut T) -> R,
    ) -> R {
        match &mut self.inner {
            Some(value) => present(value),
            None => empty(),
        }
    }

    /// Calls `present` with the value.
    ///
    /// # Panics
    /// Panics when the reference is absent.
    pub fn require<R>(&mut self, present: impl FnOnce(&mut T) -> R) -> R {
        match &mut self.inner {
            Some(value) => present(value),
            None => panic!("required {} value is absent", any::type_name::<T>()),
        }
    }
}

impl<'t, T> ops::Deref for OptMut<'t, T> {
    type Target = T;

    fn deref(&self) -> &T {
        match &self.inner {
            Some(value) => value,
            None => panic!("dereferenced an absent {} reference", any::type_name::<T>()),
        }
    }
}

impl<'t, T> ops::DerefMut for OptMut<'t, T> {
    fn deref_mut(&mut self) -> &mut T {
        match &mut self.inner {
            Some(value) => value,
            None => panic!("dereferenced an absent {} reference", any::type_name::<T>()),
        }
    }
}

impl<'t, T: fmt::Debug> fmt::Debug for OptMut<'t, T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.inner {
            Some(value) => f.debug_tuple("Present").field(&**value).finish(),
            None => f.write_str("Absent"),
        }
    }
}
