use std::any::Any;
use std::collections::hash_map::Entry;
use std::collections::HashMap;

use parking_lot::RwLock;

use super::{Data, DataType, LifeSpan};

/// Span-indexed storage: one slot per registered `(life span, data type)`
/// pair.
///
/// Slots come into existence only when a `Create*` grant is applied; the
/// maps themselves are immutable afterwards, so steady-state lookups take no
/// lock. Only slot contents change while a plan is running.
#[derive(Default)]
pub(crate) struct DataRepo {
    spans: [HashMap<DataType, Box<dyn AnySlot>>; 3],
}

impl DataRepo {
    /// Registers the slot of `(span, T)` and seeds it with [`Data::initial`].
    ///
    /// Returns `false` when the pair already has a slot.
    pub(crate) fn register_slot<T: Data>(&mut self, span: LifeSpan, sync: bool) -> bool {
        match self.spans[span.index()].entry(DataType::of::<T>()) {
            Entry::Occupied(_) => false,
            Entry::Vacant(entry) => {
                entry.insert(Box::new(Slot::<T> { cell: RwLock::new(T::initial()), sync }));
                true
            }
        }
    }

    pub(crate) fn has_slot(&self, span: LifeSpan, data: DataType) -> bool {
        self.spans[span.index()].contains_key(&data)
    }

    /// The typed slot of `(span, T)`, if registered.
    pub(crate) fn slot<T: Data>(&self, span: LifeSpan) -> Option<&Slot<T>> {
        let slot = self.spans[span.index()].get(&DataType::of::<T>())?;
        Some(slot.as_any().downcast_ref::<Slot<T>>().expect("TypeId mismatch"))
    }

    /// Destroys every value in the span, then re-seeds the slots that have
    /// an initial value. Idempotent.
    pub(crate) fn reset_span(&self, span: LifeSpan) {
        for (data, slot) in &self.spans[span.index()] {
            slot.reset();
            log::trace!("reset {data} in {span:?}: constructed = {}", slot.constructed());
        }
    }

    /// Runs the clear hook on every constructed value in the span.
    pub(crate) fn clear_span(&self, span: LifeSpan) {
        for slot in self.spans[span.index()].values() {
            slot.clear();
        }
    }
}

/// The capability surface the repository uses to treat slots uniformly.
trait AnySlot: Send + Sync {
    /// Whether the cell currently holds a value.
    fn constructed(&self) -> bool;
    /// Whether the payload type provides an initial value.
    fn constructable(&self) -> bool;
    /// Destroys the value and re-attempts default construction.
    fn reset(&self);
    /// Empties a constructed value in place.
    fn clear(&self);
    fn as_any(&self) -> &dyn Any;
}

/// The storage cell of one `(life span, data type)` pair.
pub(crate) struct Slot<T: Data> {
    /// `Some` iff the slot is constructed.
    pub(crate) cell: RwLock<Option<T>>,
    /// Accesses to a sync slot block on the lock; non-sync accesses treat
    /// contention as a violated plan contract.
    pub(crate) sync: bool,
}

impl<T: Data> AnySlot for Slot<T> {
    fn constructed(&self) -> bool { self.cell.read().is_some() }

    fn constructable(&self) -> bool { T::initial().is_some() }

    fn reset(&self) { *self.cell.write() = T::initial(); }

    fn clear(&self) {
        if let Some(value) = self.cell.write().as_mut() {
            value.clear();
        }
    }

    fn as_any(&self) -> &dyn Any { self }
}
