use std::sync::Arc;
use std::time::{Duration, Instant};

use indexmap::IndexMap;
use parking_lot::Mutex;

use super::{ProcessorId, ProcessorInfo, Status};

/// An observer of every `process` call in a run.
///
/// Methods default to no-ops so implementations override only what they
/// need. Trackers are shared across worker threads and must synchronise
/// their own state.
pub trait ProcessTracker: Send + Sync {
    /// A processor is about to run.
    fn on_enter(&self, _info: &ProcessorInfo) {}

    /// A processor finished with `status`.
    fn on_exit(&self, _info: &ProcessorInfo, _status: Status) {}

    /// Reports whatever the tracker aggregated.
    fn dump(&self) {}
}

impl<T: ProcessTracker + ?Sized> ProcessTracker for Arc<T> {
    fn on_enter(&self, info: &ProcessorInfo) { (**self).on_enter(info) }

    fn on_exit(&self, info: &ProcessorInfo, status: Status) { (**self).on_exit(info, status) }

    fn dump(&self) { (**self).dump() }
}

/// Logs every enter and exit through the `log` façade.
pub struct LogTracker(
    /// The level events are logged with.
    pub log::Level,
);

impl ProcessTracker for LogTracker {
    fn on_enter(&self, info: &ProcessorInfo) {
        if info.id() == ProcessorId::root() {
            log::log!(self.0, "============ schedule start ============");
        }
        log::log!(self.0, "{info} enter");
    }

    fn on_exit(&self, info: &ProcessorInfo, status: Status) {
        log::log!(self.0, "{info} exit with status {status}");
    }
}

/// Aggregates per-node wall time and dumps it as an indented tree.
#[derive(Default)]
pub struct TimingTracker {
    timings: Mutex<IndexMap<ProcessorId, NodeTiming>>,
}

struct NodeTiming {
    name:    String,
    started: Instant,
    elapsed: Option<Duration>,
}

impl ProcessTracker for TimingTracker {
    fn on_enter(&self, info: &ProcessorInfo) {
        self.timings.lock().insert(
            info.id(),
            NodeTiming { name: info.name().to_owned(), started: Instant::now(), elapsed: None },
        );
    }

    fn on_exit(&self, info: &ProcessorInfo, _status: Status) {
        let mut timings = self.timings.lock();
        if let Some(timing) = timings.get_mut(&info.id()) {
            timing.elapsed = Some(timing.started.elapsed());
        }
    }

    fn dump(&self) {
        let timings = self.timings.lock();
        if !timings.contains_key(&ProcessorId::root()) {
            log::info!("no timing data recorded");
            return;
        }
        log::info!("======= processor timing statistics =======");
        dump_node(&timings, ProcessorId::root(), 0);
    }
}

fn dump_node(timings: &IndexMap<ProcessorId, NodeTiming>, id: ProcessorId, level: usize) {
    let Some(timing) = timings.get(&id) else { return };
    log::info!(
        "{:indent$}[{id}] {}: {:?}",
        "",
        timing.name,
        timing.elapsed.unwrap_or_default(),
        indent = level * 2,
    );

    let mut children: Vec<ProcessorId> =
        timings.keys().copied().filter(|child| child.parent() == Some(id)).collect();
    children.sort_by_key(|child| child.level_value(id.depth()));
    for child in children {
        dump_node(timings, child, level + 1);
    }
}

/// Fans every event out to a list of trackers, in order.
#[derive(Default)]
pub struct GroupTracker {
    trackers: Vec<Box<dyn ProcessTracker>>,
}

impl GroupTracker {
    /// Appends a tracker.
    pub fn add(&mut self, tracker: Box<dyn ProcessTracker>) { self.trackers.push(tracker) }
}

impl ProcessTracker for GroupTracker {
    fn on_enter(&self, info: &ProcessorInfo) {
        for tracker in &self.trackers {
            tracker.on_enter(info);
        }
    }

    fn on_exit(&self, info: &ProcessorInfo, status: Status) {
        for tracker in &self.trackers {
            tracker.on_exit(info, status);
        }
    }

    fn dump(&self) {
        for tracker in &self.trackers {
            tracker.dump();
        }
    }
}
