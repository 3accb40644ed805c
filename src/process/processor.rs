use parking_lot::Mutex;

use super::{ProcessContext, ProcessorId, ProcessorInfo, Status};
use crate::data::DataContext;
use crate::util;

/// A user algorithm adapted into the plan tree.
///
/// Algorithms are plain types; the framework owns one instance per plan node
/// (data groups build one per data instance through their factory).
pub trait Algorithm: Send + 'static {
    /// One-time initialisation when the plan is built.
    fn init(&mut self) {}

    /// Runs the algorithm against the shared data context.
    ///
    /// Domain failures are usually signalled by storing no output, which
    /// downstream algorithms observe as absent references; returning a
    /// non-[`Ok`](Status::Ok) status additionally short-circuits the
    /// enclosing sequence.
    fn execute(&mut self, data: &DataContext) -> Status;
}

/// A node of the plan tree.
///
/// [`process`](Self::process) is the only entry point used at run time;
/// [`execute`](Self::execute) is the per-variant behaviour. Nodes are
/// initialised exactly once, before the plan is shared with any worker.
pub trait Processor: Send + Sync {
    /// Name path and id of the node; placeholder identity until `init`.
    fn info(&self) -> &ProcessorInfo;

    /// Assigns identity from the parent and initialises children.
    fn init(&mut self, parent: &ProcessorInfo, child_index: u32);

    /// The variant behaviour, called by `process` on a live context.
    fn execute(&self, ctx: &ProcessContext) -> Status;

    /// Runs the node under the context: tracker enter, cancellation
    /// short-circuit, `execute`, tracker exit.
    fn process(&self, ctx: &ProcessContext) -> Status {
        let info = self.info();
        ctx.enter(info);
        let status = if ctx.is_stopped() { Status::Cancelled } else { self.execute(ctx) };
        ctx.exit(info, status);
        status
    }
}

/// Adapts an [`Algorithm`] into a leaf processor.
pub struct AlgoProcessor<A: Algorithm> {
    info: ProcessorInfo,
    algo: Mutex<A>,
}

impl<A: Algorithm> AlgoProcessor<A> {
    /// Wraps `algo` in a leaf named after its type.
    pub fn new(algo: A) -> Self { Self::named(util::short_type_name::<A>(), algo) }

    /// Wraps `algo` in a leaf with an explicit name.
    pub fn named(name: impl Into<String>, algo: A) -> Self {
        Self { info: ProcessorInfo::new(name, ProcessorId::default()), algo: Mutex::new(algo) }
    }
}

impl<A: Algorithm> Processor for AlgoProcessor<A> {
    fn info(&self) -> &ProcessorInfo { &self.info }

    fn init(&mut self, parent: &ProcessorInfo, child_index: u32) {
        self.info.assign(parent, child_index);
        self.algo.get_mut().init();
    }

    fn execute(&self, ctx: &ProcessContext) -> Status {
        let mut algo = self
            .algo
            .try_lock()
            .expect("an algorithm should only be scheduled to one task at a time");
        algo.execute(ctx.data())
    }
}
