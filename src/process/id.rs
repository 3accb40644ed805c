use std::fmt;

use itertools::Itertools;

/// Hierarchical processor identity packed into 64 bits.
///
/// The top byte stores the depth (1..=8); byte `i` of the low seven bytes
/// stores the 1-based child index at level `i`, level 0 being the root.
/// Construction and comparison are O(1), and the id is compact enough to key
/// tracing maps without string allocation while still printing as a
/// deterministic dotted path.
///
/// The `Default` value is the unassigned id every processor carries before
/// its plan is initialised; it has depth 0 and displays as `null`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ProcessorId {
    value: u64,
}

impl ProcessorId {
    /// The maximum nesting depth a plan may have.
    pub const MAX_DEPTH: u32 = 8;

    const BITS_PER_LEVEL: u32 = 8;
    const LEVEL_MASK: u64 = 0xFF;

    /// The id of a plan root: depth 1, index 1.
    pub fn root() -> Self { Self { value: (1 << 56) | 1 } }

    /// Derives the id of the `index`-th child.
    ///
    /// Saturates: at the depth limit the parent id is returned unchanged.
    /// Plan initialisation rejects such plans up front, so saturation never
    /// produces aliased ids in an initialised plan.
    pub fn child(self, index: u32) -> Self {
        let depth = self.depth();
        if depth >= Self::MAX_DEPTH {
            return self;
        }
        let shift = depth * Self::BITS_PER_LEVEL;
        let value = self.value | (u64::from(index) & Self::LEVEL_MASK) << shift;
        Self { value: with_depth(value, depth + 1) }
    }

    /// The id one level up, or `None` for the root and the unassigned id.
    pub fn parent(self) -> Option<Self> {
        let depth = self.depth();
        if depth <= 1 {
            return None;
        }
        let value = self.value & !(Self::LEVEL_MASK << ((depth - 1) * Self::BITS_PER_LEVEL));
        Some(Self { value: with_depth(value, depth - 1) })
    }

    /// The nesting depth; 0 for the unassigned id.
    pub fn depth(self) -> u32 { ((self.value >> 56) & Self::LEVEL_MASK) as u32 }

    /// The child index at `level`, or 0 when `level >= depth()`.
    pub fn level_value(self, level: u32) -> u8 {
        if level >= self.depth() {
            return 0;
        }
        ((self.value >> (level * Self::BITS_PER_LEVEL)) & Self::LEVEL_MASK) as u8
    }

    /// The raw packed value.
    pub fn value(self) -> u64 { self.value }
}

fn with_depth(value: u64, depth: u32) -> u64 {
    (value & !(ProcessorId::LEVEL_MASK << 56)) | (u64::from(depth) << 56)
}

impl fmt::Display for ProcessorId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.depth() == 0 {
            return f.write_str("null");
        }
        write!(f, "{}", (0..self.depth()).map(|level| self.level_value(level)).join("."))
    }
}

impl fmt::Debug for ProcessorId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result { fmt::Display::fmt(self, f) }
}

/// Name path and identity of a processor, as seen by trackers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessorInfo {
    name: String,
    id:   ProcessorId,
}

impl ProcessorInfo {
    /// Bundles a name path with an id.
    pub fn new(name: impl Into<String>, id: ProcessorId) -> Self {
        Self { name: name.into(), id }
    }

    /// The info every plan root is initialised against.
    pub fn root() -> Self { Self::new("root", ProcessorId::root()) }

    /// The slash-separated name path.
    pub fn name(&self) -> &str { &self.name }

    /// The packed id.
    pub fn id(&self) -> ProcessorId { self.id }

    /// Derives this node's identity from its parent and child position and
    /// prefixes the parent's name path.
    ///
    /// # Panics
    /// Panics when the plan exceeds [`ProcessorId::MAX_DEPTH`] levels or 255
    /// children under one node; both are plan construction bugs.
    pub(crate) fn assign(&mut self, parent: &ProcessorInfo, child_index: u32) {
        self.id = if parent.id == ProcessorId::root() && child_index == 0 {
            ProcessorId::root()
        } else {
            assert!(
                parent.id.depth() < ProcessorId::MAX_DEPTH,
                "plan exceeds {} nesting levels below {}",
                ProcessorId::MAX_DEPTH,
                parent.name,
            );
            assert!(
                (1..=255).contains(&child_index),
                "{} has more than 255 children",
                parent.name,
            );
            parent.id.child(child_index)
        };
        self.name = format!("{}/{}", parent.name, self.name);
    }
}

impl fmt::Display for ProcessorInfo {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} [{}]", self.name, self.id)
    }
}
