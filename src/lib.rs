//! A composable execution engine for algorithm pipelines.
//!
//! Two tightly coupled subsystems:
//!
//! - [`data`] — a process-wide, type-keyed repository partitioned by life
//!   span (frame / cache / global) with per-user access-mode enforcement.
//!   Algorithms exchange typed payloads through a shared [`DataContext`]
//!   without ad-hoc globals; who may read, mutate or produce each datum is
//!   declared up front and checked on every access.
//! - [`process`] — a tree of processors (algorithm adapters plus
//!   sequential, parallel, race, data-parallel and data-race composites)
//!   executed under a cancellable [`ProcessContext`] with hierarchical
//!   identity, tracing hooks and structured concurrency.
//!
//! The plan tree is fixed after construction; data dependencies are
//! expressed by pipeline order, not by a dependency solver.

#![deny(
    anonymous_parameters,
    bare_trait_objects,
    clippy::clone_on_ref_ptr,
    clippy::float_cmp_const,
    clippy::if_not_else,
    clippy::unwrap_used
)]
#![cfg_attr(
    debug_assertions,
    allow(
        dead_code,
        unused_imports,
        unused_variables,
        clippy::match_single_binding,
    )
)]
#![cfg_attr(any(doc, not(debug_assertions)), deny(missing_docs))]

pub mod data;
#[doc(inline)]
pub use data::{
    Access, AccessMode, Data, DataContext, DataFramework, DataType, Grant, LifeSpan, Schema,
    UserId,
};

pub mod process;
#[doc(inline)]
pub use process::{
    Algorithm, ProcessContext, ProcessTracker, Processor, ProcessorId, ProcessorInfo, Scheduler,
    Status,
};

pub mod optref;
#[doc(inline)]
pub use optref::{OptMut, OptRef};

mod util;
pub use util::DbgTypeId;

#[cfg(test)]
pub(crate) mod test_util;
