use std::collections::hash_map::Entry;
use std::collections::HashMap;

use super::{Access, AccessMode, DataType, LifeSpan, UserId};

/// Registry mapping `(user, data type, life span)` to the registered access.
///
/// Populated during bootstrap and read-only afterwards; the manager only
/// hands out `&mut` access while the repository is still exclusively owned.
#[derive(Default)]
pub struct AccessController {
    accessors: HashMap<UserId, HashMap<(DataType, LifeSpan), Access>>,
}

impl AccessController {
    /// Records an access triple.
    ///
    /// Returns `false` when the triple is already registered, leaving the
    /// previous registration untouched.
    pub fn register(
        &mut self,
        user: UserId,
        data: DataType,
        span: LifeSpan,
        access: Access,
    ) -> bool {
        match self.accessors.entry(user).or_default().entry((data, span)) {
            Entry::Occupied(_) => false,
            Entry::Vacant(entry) => {
                entry.insert(access);
                true
            }
        }
    }

    /// The registered access of a triple, or the no-access default.
    pub fn access_of(&self, user: UserId, data: DataType, span: LifeSpan) -> Access {
        self.accessors
            .get(&user)
            .and_then(|grants| grants.get(&(data, span)))
            .copied()
            .unwrap_or(Access::NONE)
    }

    /// The registered mode of a triple, or [`AccessMode::None`].
    pub fn mode_of(&self, user: UserId, data: DataType, span: LifeSpan) -> AccessMode {
        self.access_of(user, data, span).mode
    }
}
