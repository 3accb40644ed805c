//! The processor scheduling framework: a plan tree of algorithm adapters and
//! concurrency composites, executed under a cancellable context with
//! hierarchical identity and pluggable tracing.
//!
//! A plan is built bottom-up from the [`plan`] surface (re-exported here),
//! wrapped into a [`Scheduler`] that assigns every node its
//! [`ProcessorId`] and name path, and run against a shared
//! [`DataContext`](crate::data::DataContext). Cancellation and tracing flow
//! top-down through the [`ProcessContext`].

use std::fmt;

mod id;
pub use id::{ProcessorId, ProcessorInfo};
mod context;
pub use context::ProcessContext;
mod processor;
pub use processor::{AlgoProcessor, Algorithm, Processor};
mod group;
pub use group::{ParallelProcessor, RaceProcessor, SequentialProcessor};
mod data_group;
pub use data_group::{parallel_index, DataParallelProcessor, DataRaceProcessor, ProcessorFactory};
mod tracker;
pub use tracker::{GroupTracker, LogTracker, ProcessTracker, TimingTracker};
mod scheduler;
pub use scheduler::Scheduler;
pub mod plan;
pub use plan::{
    data_parallel, data_race, parallel, process, process_named, race, schedule, sequence,
};


/// Outcome of a processor run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    /// The processor and all the children it waited for succeeded.
    Ok,
    /// The processor observed a stop request before running its behaviour.
    Cancelled,
    /// The processor or one of the children it waited for failed.
    Error,
}

impl Status {
    /// Process exit semantics: `Ok = 0`, `Cancelled = 1`, `Error = 2`.
    pub fn exit_code(self) -> i32 {
        match self {
            Status::Ok => 0,
            Status::Cancelled => 1,
            Status::Error => 2,
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match self {
            Status::Ok => "OK",
            Status::Cancelled => "CANCELLED",
            Status::Error => "ERROR",
        })
    }
}
