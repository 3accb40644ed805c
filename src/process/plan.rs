//! The plan construction surface.
//!
//! Plans are built bottom-up from these free functions and handed to
//! [`Scheduler::new`](super::Scheduler::new), which assigns identity and
//! runs per-algorithm initialisation:
//!
//! ```
//! use treeflow::process::{parallel, process, sequence, Scheduler, Status};
//! use treeflow::{DataContext, DataFramework};
//!
//! struct Noop;
//!
//! impl treeflow::Algorithm for Noop {
//!     fn execute(&mut self, _data: &DataContext) -> Status { Status::Ok }
//! }
//!
//! let scheduler = Scheduler::new(sequence([
//!     process(Noop),
//!     parallel([process(Noop), process(Noop)]),
//! ]));
//!
//! let framework = DataFramework::new();
//! assert_eq!(scheduler.run(&framework.context()), Status::Ok);
//! ```

use std::sync::Arc;

use super::data_group::{DataParallelProcessor, DataRaceProcessor, ProcessorFactory};
use super::group::{ParallelProcessor, RaceProcessor, SequentialProcessor};
use super::processor::{AlgoProcessor, Algorithm};
use super::{Processor, Scheduler};

/// Wraps an algorithm as a leaf processor named after its type.
pub fn process<A: Algorithm>(algo: A) -> Arc<dyn Processor> {
    Arc::new(AlgoProcessor::new(algo))
}

/// Wraps an algorithm as a leaf processor with an explicit name.
pub fn process_named<A: Algorithm>(name: &str, algo: A) -> Arc<dyn Processor> {
    Arc::new(AlgoProcessor::named(name, algo))
}

/// Runs children one after another, stopping at the first non-`Ok`.
pub fn sequence(children: impl IntoIterator<Item = Arc<dyn Processor>>) -> Arc<dyn Processor> {
    Arc::new(SequentialProcessor::new(children.into_iter().collect()))
}

/// Runs children concurrently and waits for all of them.
pub fn parallel(children: impl IntoIterator<Item = Arc<dyn Processor>>) -> Arc<dyn Processor> {
    Arc::new(ParallelProcessor::new(children.into_iter().collect()))
}

/// Runs children concurrently; the first `Ok` wins and cancels the rest.
pub fn race(children: impl IntoIterator<Item = Arc<dyn Processor>>) -> Arc<dyn Processor> {
    Arc::new(RaceProcessor::new(children.into_iter().collect()))
}

/// Fans out over `count` children built by `factory`, tagging each task
/// with its instance index for `T` (see
/// [`parallel_index`](super::parallel_index)).
pub fn data_parallel<T: 'static>(
    count: usize,
    factory: impl Fn() -> Arc<dyn Processor> + Send + Sync + 'static,
) -> Arc<dyn Processor> {
    Arc::new(DataParallelProcessor::<T>::new(count, Box::new(factory) as ProcessorFactory))
}

/// As [`data_parallel`], with race semantics.
pub fn data_race<T: 'static>(
    count: usize,
    factory: impl Fn() -> Arc<dyn Processor> + Send + Sync + 'static,
) -> Arc<dyn Processor> {
    Arc::new(DataRaceProcessor::<T>::new(count, Box::new(factory) as ProcessorFactory))
}

/// Wraps a root processor into an initialised [`Scheduler`].
pub fn schedule(root: Arc<dyn Processor>) -> Scheduler { Scheduler::new(root) }
