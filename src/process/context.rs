use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use static_assertions::assert_impl_all;

use super::tracker::ProcessTracker;
use super::{ProcessorInfo, Status};
use crate::data::DataContext;

/// Per-run scope carrying the shared data context, cooperative cancellation
/// and the tracker chain.
///
/// Clones share the same flags; [`sub_context`](Self::sub_context) starts a
/// fresh flag that still observes every ancestor. Cancellation is strictly
/// cooperative: a processor that never re-checks the context runs to
/// completion.
#[derive(Clone)]
pub struct ProcessContext {
    data:      Arc<DataContext>,
    stop:      Arc<AtomicBool>,
    ancestors: Vec<Arc<AtomicBool>>,
    tracker:   Option<Arc<dyn ProcessTracker>>,
}

assert_impl_all!(ProcessContext: Send, Sync);

impl ProcessContext {
    /// Creates the root context of a run.
    pub fn new(data: Arc<DataContext>) -> Self {
        Self {
            data,
            stop: Arc::new(AtomicBool::new(false)),
            ancestors: Vec::new(),
            tracker: None,
        }
    }

    pub(crate) fn with_tracker(data: Arc<DataContext>, tracker: Arc<dyn ProcessTracker>) -> Self {
        Self { tracker: Some(tracker), ..Self::new(data) }
    }

    /// The shared data context.
    pub fn data(&self) -> &DataContext { &self.data }

    /// Requests cancellation of this scope and everything below it.
    pub fn stop(&self) { self.stop.store(true, Ordering::SeqCst) }

    /// Clears this scope's own flag. Ancestor flags are not touched.
    pub fn resume(&self) { self.stop.store(false, Ordering::SeqCst) }

    /// Atomically sets the flag; `true` only for the first caller.
    ///
    /// Race composites use this to let exactly one winning branch publish
    /// its status.
    pub fn try_stop(&self) -> bool {
        self.stop.compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst).is_ok()
    }

    /// Whether this scope or any ancestor has been stopped.
    pub fn is_stopped(&self) -> bool {
        self.stop.load(Ordering::SeqCst)
            || self.ancestors.iter().any(|flag| flag.load(Ordering::SeqCst))
    }

    /// Derives a child scope: a fresh stop flag that observes this scope's
    /// flag as a parent.
    pub fn sub_context(&self) -> Self {
        let mut ancestors = self.ancestors.clone();
        ancestors.push(Arc::clone(&self.stop));
        Self {
            data: Arc::clone(&self.data),
            stop: Arc::new(AtomicBool::new(false)),
            ancestors,
            tracker: self.tracker.clone(),
        }
    }

    pub(crate) fn enter(&self, info: &ProcessorInfo) {
        if let Some(tracker) = &self.tracker {
            tracker.on_enter(info);
        }
    }

    pub(crate) fn exit(&self, info: &ProcessorInfo, status: Status) {
        if let Some(tracker) = &self.tracker {
            tracker.on_exit(info, status);
        }
    }
}
