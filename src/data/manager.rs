use std::any;

use parking_lot::{RwLockReadGuard, RwLockWriteGuard};

use super::repo::{DataRepo, Slot};
use super::{Access, AccessController, AccessMode, Data, DataType, Grant, LifeSpan, UserId};
use crate::optref::{OptMut, OptRef};

/// Couples the repository with the access registry and resolves
/// permission-checked operations.
///
/// Mismatched and absent accesses are answered with absent references, never
/// with panics; bootstrap conflicts are reported through `bool` returns and
/// escalated by the schema installer. Returned references hold the slot's
/// reader-writer guard, so they must be dropped before the same task touches
/// the same slot again.
#[derive(Default)]
pub struct DataManager {
    acl:  AccessController,
    repo: DataRepo,
}

impl DataManager {
    /// Records an access grant of `user` on `(T, span)`.
    ///
    /// `Create*` grants also register the slot and seed it with
    /// [`Data::initial`]. Returns `false` when the triple is already
    /// registered, or when another user already holds the `Create*` grant of
    /// the pair.
    pub fn apply<T: Data>(&mut self, user: UserId, span: LifeSpan, grant: Grant) -> bool {
        let data = DataType::of::<T>();
        let mode = grant.mode();

        if mode.creates() && self.repo.has_slot(span, data) {
            log::trace!("rejected second producer of {data} in {span:?}: {user}");
            return false;
        }
        if !self.acl.register(user, data, span, Access { mode, sync: grant.sync() }) {
            log::trace!("rejected re-registration of {data} in {span:?} by {user}");
            return false;
        }
        if mode.creates() {
            let registered = self.repo.register_slot::<T>(span, mode == AccessMode::CreateSync);
            debug_assert!(registered, "slot absence was checked above");
        }
        true
    }

    /// Constructs the value of `(T, span)`, replacing any existing one, and
    /// returns a reference to it.
    ///
    /// Admitted only for the `Create*` holder; everyone else gets an absent
    /// reference and the slot is left untouched.
    pub fn create<T: Data>(&self, user: UserId, span: LifeSpan, value: T) -> OptMut<'_, T> {
        let access = self.acl.access_of(user, DataType::of::<T>(), span);
        if !access.mode.creates() {
            log::trace!("denied create of {} in {span:?} by {user}", DataType::of::<T>());
            return OptMut::absent();
        }
        let Some(slot) = self.repo.slot::<T>(span) else { return OptMut::absent() };

        let mut cell = lock_write(slot, access);
        *cell = Some(value);
        OptMut::present(RwLockWriteGuard::map(cell, |cell| {
            cell.as_mut().expect("the value was just constructed")
        }))
    }

    /// Destroys the value of `(T, span)` if constructed; the slot remains
    /// registered. Returns whether a value was destroyed.
    ///
    /// Admitted only for the `Create*` holder.
    pub fn destroy<T: Data>(&self, user: UserId, span: LifeSpan) -> bool {
        let access = self.acl.access_of(user, DataType::of::<T>(), span);
        if !access.mode.creates() {
            log::trace!("denied destroy of {} in {span:?} by {user}", DataType::of::<T>());
            return false;
        }
        let Some(slot) = self.repo.slot::<T>(span) else { return false };

        lock_write(slot, access).take().is_some()
    }

    /// Exclusive view of the value of `(T, span)`, if constructed.
    ///
    /// Admitted for `Write` and `Create*` holders.
    pub fn write<T: Data>(&self, user: UserId, span: LifeSpan) -> OptMut<'_, T> {
        let access = self.acl.access_of(user, DataType::of::<T>(), span);
        if !access.mode.writes() {
            log::trace!("denied write of {} in {span:?} by {user}", DataType::of::<T>());
            return OptMut::absent();
        }
        let Some(slot) = self.repo.slot::<T>(span) else { return OptMut::absent() };

        match RwLockWriteGuard::try_map(lock_write(slot, access), Option::as_mut) {
            Ok(value) => OptMut::present(value),
            Err(_) => OptMut::absent(),
        }
    }

    /// Shared view of the value of `(T, span)`, if constructed.
    ///
    /// Admitted for `Read` holders only; producers use
    /// [`write`](Self::write) for their own data.
    pub fn read<T: Data>(&self, user: UserId, span: LifeSpan) -> OptRef<'_, T> {
        let access = self.acl.access_of(user, DataType::of::<T>(), span);
        if access.mode != AccessMode::Read {
            log::trace!("denied read of {} in {span:?} by {user}", DataType::of::<T>());
            return OptRef::absent();
        }
        let Some(slot) = self.repo.slot::<T>(span) else { return OptRef::absent() };

        match RwLockReadGuard::try_map(lock_read(slot, access), Option::as_ref) {
            Ok(value) => OptRef::present(value),
            Err(_) => OptRef::absent(),
        }
    }

    /// The registered mode of a triple, or [`AccessMode::None`].
    pub fn mode_of(&self, user: UserId, data: DataType, span: LifeSpan) -> AccessMode {
        self.acl.mode_of(user, data, span)
    }

    /// Destroys every value in `span`, then re-seeds the slots that have an
    /// initial value. Idempotent; not subject to access control.
    pub fn reset_span(&self, span: LifeSpan) { self.repo.reset_span(span) }

    /// Runs [`Data::clear`] on every constructed value in `span`.
    pub fn clear_span(&self, span: LifeSpan) { self.repo.clear_span(span) }
}

/// Acquires the exclusive slot lock under the user's lock discipline.
///
/// Non-sync accesses must never contend by contract; contention there is a
/// plan bug, not a domain failure.
fn lock_write<'t, T: Data>(slot: &'t Slot<T>, access: Access) -> RwLockWriteGuard<'t, Option<T>> {
    if access.sync || slot.sync {
        slot.cell.write()
    } else {
        match slot.cell.try_write() {
            Some(guard) => guard,
            None => panic!(
                "{} slot is contended without a sync grant; maybe a plan bug?",
                any::type_name::<T>()
            ),
        }
    }
}

fn lock_read<'t, T: Data>(slot: &'t Slot<T>, access: Access) -> RwLockReadGuard<'t, Option<T>> {
    if access.sync || slot.sync {
        slot.cell.read()
    } else {
        match slot.cell.try_read() {
            Some(guard) => guard,
            None => panic!(
                "{} slot is contended without a sync grant; maybe a plan bug?",
                any::type_name::<T>()
            ),
        }
    }
}
