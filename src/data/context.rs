use static_assertions::assert_impl_all;

use super::{Data, DataManager, LifeSpan, UserId};
use crate::optref::{OptMut, OptRef};

/// The permission-aware front door algorithms use to exchange payloads.
///
/// Every verb takes the calling algorithm by reference, so the user identity
/// is inferred from its type; the actual admission decision lives in the
/// [`DataManager`]. The span-inline variants cover the common case of a call
/// site that knows its partition.
pub struct DataContext {
    manager: DataManager,
}

assert_impl_all!(DataContext: Send, Sync);

impl DataContext {
    pub(crate) fn new(manager: DataManager) -> Self { Self { manager } }

    /// The underlying manager, e.g. for span resets and mode queries.
    pub fn manager(&self) -> &DataManager { &self.manager }

    pub(crate) fn manager_mut(&mut self) -> &mut DataManager { &mut self.manager }

    /// Shared view of `(T, span)` for a `Read` holder.
    pub fn read<T: Data, U: 'static>(&self, _user: &U, span: LifeSpan) -> OptRef<'_, T> {
        self.manager.read::<T>(UserId::of::<U>(), span)
    }

    /// Exclusive view of `(T, span)` for a `Write` or `Create*` holder.
    pub fn write<T: Data, U: 'static>(&self, _user: &U, span: LifeSpan) -> OptMut<'_, T> {
        self.manager.write::<T>(UserId::of::<U>(), span)
    }

    /// Constructs the value of `(T, span)`, replacing any existing one.
    pub fn create<T: Data, U: 'static>(
        &self,
        _user: &U,
        span: LifeSpan,
        value: T,
    ) -> OptMut<'_, T> {
        self.manager.create(UserId::of::<U>(), span, value)
    }

    /// Destroys the value of `(T, span)`; the slot remains registered.
    pub fn destroy<T: Data, U: 'static>(&self, _user: &U, span: LifeSpan) -> bool {
        self.manager.destroy::<T>(UserId::of::<U>(), span)
    }

    /// [`read`](Self::read) in the frame span.
    pub fn read_frame<T: Data, U: 'static>(&self, user: &U) -> OptRef<'_, T> {
        self.read(user, LifeSpan::Frame)
    }

    /// [`read`](Self::read) in the cache span.
    pub fn read_cache<T: Data, U: 'static>(&self, user: &U) -> OptRef<'_, T> {
        self.read(user, LifeSpan::Cache)
    }

    /// [`read`](Self::read) in the global span.
    pub fn read_global<T: Data, U: 'static>(&self, user: &U) -> OptRef<'_, T> {
        self.read(user, LifeSpan::Global)
    }

    /// [`write`](Self::write) in the frame span.
    pub fn write_frame<T: Data, U: 'static>(&self, user: &U) -> OptMut<'_, T> {
        self.write(user, LifeSpan::Frame)
    }

    /// [`write`](Self::write) in the cache span.
    pub fn write_cache<T: Data, U: 'static>(&self, user: &U) -> OptMut<'_, T> {
        self.write(user, LifeSpan::Cache)
    }

    /// [`write`](Self::write) in the global span.
    pub fn write_global<T: Data, U: 'static>(&self, user: &U) -> OptMut<'_, T> {
        self.write(user, LifeSpan::Global)
    }

    /// [`create`](Self::create) in the frame span.
    pub fn create_frame<T: Data, U: 'static>(&self, user: &U, value: T) -> OptMut<'_, T> {
        self.create(user, LifeSpan::Frame, value)
    }

    /// [`create`](Self::create) in the cache span.
    pub fn create_cache<T: Data, U: 'static>(&self, user: &U, value: T) -> OptMut<'_, T> {
        self.create(user, LifeSpan::Cache, value)
    }

    /// [`create`](Self::create) in the global span.
    pub fn create_global<T: Data, U: 'static>(&self, user: &U, value: T) -> OptMut<'_, T> {
        self.create(user, LifeSpan::Global, value)
    }

    /// [`destroy`](Self::destroy) in the frame span.
    pub fn destroy_frame<T: Data, U: 'static>(&self, user: &U) -> bool {
        self.destroy::<T, U>(user, LifeSpan::Frame)
    }

    /// [`destroy`](Self::destroy) in the cache span.
    pub fn destroy_cache<T: Data, U: 'static>(&self, user: &U) -> bool {
        self.destroy::<T, U>(user, LifeSpan::Cache)
    }

    /// [`destroy`](Self::destroy) in the global span.
    pub fn destroy_global<T: Data, U: 'static>(&self, user: &U) -> bool {
        self.destroy::<T, U>(user, LifeSpan::Global)
    }
}
