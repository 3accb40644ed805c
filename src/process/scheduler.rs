use std::sync::Arc;

use super::tracker::{GroupTracker, ProcessTracker};
use super::{ProcessContext, Processor, ProcessorInfo, Status};
use crate::data::DataContext;

/// Owns an initialised plan tree and runs it.
pub struct Scheduler {
    root:    Arc<dyn Processor>,
    tracker: Arc<GroupTracker>,
}

impl Scheduler {
    /// Takes ownership of the plan and initialises it: ids, name paths and
    /// per-algorithm init, with plan shape validated along the way.
    ///
    /// # Panics
    /// Panics when the plan is deeper than
    /// [`ProcessorId::MAX_DEPTH`](super::ProcessorId::MAX_DEPTH) levels,
    /// wider than 255 children under one node, or already shared.
    pub fn new(mut root: Arc<dyn Processor>) -> Self {
        Arc::get_mut(&mut root)
            .expect("the plan root must not be shared before initialisation")
            .init(&ProcessorInfo::root(), 0);
        Self { root, tracker: Arc::new(GroupTracker::default()) }
    }

    /// Appends a tracker to the aggregate.
    ///
    /// # Panics
    /// Panics when detached race branches of a previous run still hold the
    /// tracker chain.
    pub fn add_tracker(&mut self, tracker: Box<dyn ProcessTracker>) {
        Arc::get_mut(&mut self.tracker)
            .expect("trackers must be added while no run is in flight")
            .add(tracker);
    }

    /// Runs the plan to completion and returns the root status.
    pub fn run(&self, data: &Arc<DataContext>) -> Status {
        let tracker = Arc::clone(&self.tracker) as Arc<dyn ProcessTracker>;
        let ctx = ProcessContext::with_tracker(Arc::clone(data), tracker);
        self.root.process(&ctx)
    }

    /// Forwards to every tracker's dump.
    pub fn dump(&self) { self.tracker.dump() }
}
