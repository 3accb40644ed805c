use std::sync::Arc;
use std::thread;

use crossbeam::channel;

use super::{ProcessContext, Processor, ProcessorId, ProcessorInfo, Status};

/// Runs children in declaration order, short-circuiting on the first
/// non-[`Ok`](Status::Ok) status.
pub struct SequentialProcessor {
    info:     ProcessorInfo,
    children: Vec<Arc<dyn Processor>>,
}

impl SequentialProcessor {
    /// Groups `children` under a node named `sequential`.
    pub fn new(children: Vec<Arc<dyn Processor>>) -> Self {
        Self { info: ProcessorInfo::new("sequential", ProcessorId::default()), children }
    }
}

impl Processor for SequentialProcessor {
    fn info(&self) -> &ProcessorInfo { &self.info }

    fn init(&mut self, parent: &ProcessorInfo, child_index: u32) {
        self.info.assign(parent, child_index);
        init_children(&self.info, &mut self.children);
    }

    fn execute(&self, ctx: &ProcessContext) -> Status {
        for child in &self.children {
            let status = child.process(ctx);
            if status != Status::Ok {
                return status;
            }
        }
        Status::Ok
    }
}

/// Runs all children concurrently and joins them all; `Ok` iff every child
/// is `Ok`, otherwise the last observed non-`Ok` status.
pub struct ParallelProcessor {
    info:     ProcessorInfo,
    children: Vec<Arc<dyn Processor>>,
}

impl ParallelProcessor {
    /// Groups `children` under a node named `parallel`.
    pub fn new(children: Vec<Arc<dyn Processor>>) -> Self {
        Self { info: ProcessorInfo::new("parallel", ProcessorId::default()), children }
    }
}

impl Processor for ParallelProcessor {
    fn info(&self) -> &ProcessorInfo { &self.info }

    fn init(&mut self, parent: &ProcessorInfo, child_index: u32) {
        self.info.assign(parent, child_index);
        init_children(&self.info, &mut self.children);
    }

    fn execute(&self, ctx: &ProcessContext) -> Status {
        let handles: Vec<_> = self
            .children
            .iter()
            .map(|child| {
                let child = Arc::clone(child);
                let ctx = ctx.clone();
                let name = child.info().name().to_owned();
                spawn_worker(&name, move || child.process(&ctx))
            })
            .collect();
        join_all(handles)
    }
}

/// Runs all children concurrently under a sibling-scoped sub-context and
/// returns the first `Ok` without waiting for the losers.
pub struct RaceProcessor {
    info:     ProcessorInfo,
    children: Vec<Arc<dyn Processor>>,
}

impl RaceProcessor {
    /// Groups `children` under a node named `race`.
    pub fn new(children: Vec<Arc<dyn Processor>>) -> Self {
        Self { info: ProcessorInfo::new("race", ProcessorId::default()), children }
    }
}

impl Processor for RaceProcessor {
    fn info(&self) -> &ProcessorInfo { &self.info }

    fn init(&mut self, parent: &ProcessorInfo, child_index: u32) {
        self.info.assign(parent, child_index);
        init_children(&self.info, &mut self.children);
    }

    fn execute(&self, ctx: &ProcessContext) -> Status {
        race_children(ctx, &self.children, |_, child, sub, sender| {
            let name = child.info().name().to_owned();
            spawn_worker(&name, move || run_racer(&*child, &sub, &sender));
        })
    }
}

/// Initialises a composite's children in declaration order, 1-based.
pub(super) fn init_children(parent: &ProcessorInfo, children: &mut [Arc<dyn Processor>]) {
    for (index, child) in children.iter_mut().enumerate() {
        Arc::get_mut(child)
            .expect("plan nodes must not be shared before initialisation")
            .init(parent, index as u32 + 1);
    }
}

/// Spawns a named worker thread.
pub(super) fn spawn_worker<R: Send + 'static>(
    name: &str,
    work: impl FnOnce() -> R + Send + 'static,
) -> thread::JoinHandle<R> {
    thread::Builder::new()
        .name(format!("treeflow worker: {name}"))
        .spawn(work)
        .expect("failed to spawn worker thread")
}

/// Joins every handle; `Ok` iff all `Ok`, else the last observed non-`Ok`.
pub(super) fn join_all(handles: Vec<thread::JoinHandle<Status>>) -> Status {
    let mut overall = Status::Ok;
    for handle in handles {
        let status = handle.join().expect("worker thread panicked");
        if status != Status::Ok {
            overall = status;
        }
    }
    overall
}

/// The body of one detached race branch: run the child, claim the win on
/// `Ok`, report the outcome.
pub(super) fn run_racer(
    child: &dyn Processor,
    sub: &ProcessContext,
    sender: &channel::Sender<Status>,
) {
    let status = child.process(sub);
    if status == Status::Ok {
        // The first Ok flips the sibling stop flag; late Oks lose.
        sub.try_stop();
    }
    sender.send(status).ok();
}

/// Runs every child detached under a sibling-scoped sub-context and waits
/// only for a winner.
///
/// `spawn` receives the child's instance index, the child itself, the
/// sub-context and the result sender, and must detach the actual work. The
/// first `Ok` received wins and the remaining branches are left to observe
/// the stop flag on their own; when every branch completes without `Ok`, the
/// last observed status is returned.
pub(super) fn race_children(
    ctx: &ProcessContext,
    children: &[Arc<dyn Processor>],
    spawn: impl Fn(usize, Arc<dyn Processor>, ProcessContext, channel::Sender<Status>),
) -> Status {
    if children.is_empty() {
        return Status::Ok;
    }

    let sub = ctx.sub_context();
    let (sender, receiver) = channel::bounded(children.len());

    for (index, child) in children.iter().enumerate() {
        spawn(index, Arc::clone(child), sub.clone(), sender.clone());
    }
    drop(sender);

    let mut last = Status::Error;
    for status in receiver {
        if status == Status::Ok {
            sub.stop();
            return Status::Ok;
        }
        last = status;
    }
    last
}
